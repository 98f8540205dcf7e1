//! Inspect command implementation.

use super::catalogue::Catalogue;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tsmerge_core::{CostModel, FileResource, MergeResource};
use tsmerge_index::FileTimeIndex;

/// Catalogue inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Catalogue path.
    pub path: String,
    /// Sequential files in chronological order.
    pub seq_files: Vec<FileSummary>,
    /// Unsequential files in catalogue order.
    pub unseq_files: Vec<FileSummary>,
    /// Estimated cost of merging every sealed file at once.
    pub total_cost: u64,
    /// Number of files still being written.
    pub open_files: usize,
}

/// Summary of a single file.
#[derive(Debug, Serialize)]
pub struct FileSummary {
    /// File id.
    pub id: u64,
    /// File version.
    pub version: u64,
    /// Whether the file is sealed.
    pub closed: bool,
    /// Number of devices.
    pub device_count: usize,
    /// Measurements per device.
    pub measurements: u32,
    /// Estimated merge cost in bytes.
    pub cost: u64,
    /// Union of all device ranges.
    pub range: Option<String>,
    /// Per-device ranges (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<BTreeMap<String, String>>,
}

/// Validates `catalogue` and summarizes its files.
pub fn execute(
    path: &Path,
    catalogue: &Catalogue,
    show_devices: bool,
) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let (seq, unseq) = catalogue.to_resources()?;
    let model = CostModel::default();

    let (seq_files, unseq_files) = MergeResource::scoped(&seq, &unseq, None, |resource| {
        let summarize_all = |files: &[&FileResource]| {
            files
                .iter()
                .map(|file| summarize(resource, &model, file, show_devices))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok((
            summarize_all(resource.seq_files())?,
            summarize_all(resource.unseq_files())?,
        ))
    })?;

    let total_cost = seq_files
        .iter()
        .chain(unseq_files.iter())
        .filter(|f| f.closed)
        .fold(0u64, |acc, f| acc.saturating_add(f.cost));
    let open_files = seq_files
        .iter()
        .chain(unseq_files.iter())
        .filter(|f| !f.closed)
        .count();

    Ok(InspectResult {
        path: path.display().to_string(),
        seq_files,
        unseq_files,
        total_cost,
        open_files,
    })
}

/// Runs the inspect command.
pub fn run(path: &Path, show_devices: bool, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let catalogue = Catalogue::load(path)?;
    let result = execute(path, &catalogue, show_devices)?;

    // Output
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn summarize(
    resource: &MergeResource<'_>,
    model: &CostModel,
    file: &FileResource,
    show_devices: bool,
) -> tsmerge_core::MergeResult<FileSummary> {
    let devices = resource.devices(file)?;
    let range = FileTimeIndex::degrade(file.time_index())?
        .file_range()
        .map(|r| r.to_string());

    let device_ranges = if show_devices {
        let mut ranges = BTreeMap::new();
        for device in &devices {
            let range = resource.device_time_range(file, device)?;
            ranges.insert(device.clone(), range.to_string());
        }
        Some(ranges)
    } else {
        None
    };

    Ok(FileSummary {
        id: file.id().as_u64(),
        version: file.version().as_u64(),
        closed: file.is_closed(),
        device_count: devices.len(),
        measurements: file.measurement_count(),
        cost: model.file_cost(file),
        range,
        devices: device_ranges,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("Catalogue Inspection");
    println!("====================");
    println!();
    println!("Path:        {}", result.path);
    println!("Seq files:   {}", result.seq_files.len());
    println!("Unseq files: {}", result.unseq_files.len());
    println!("Open files:  {}", result.open_files);
    println!("Total cost:  {} bytes", result.total_cost);

    for (title, files) in [
        ("Sequential", &result.seq_files),
        ("Unsequential", &result.unseq_files),
    ] {
        if files.is_empty() {
            continue;
        }
        println!();
        println!("{title}:");
        for file in files {
            println!(
                "  file:{} v{} {:>8} devices={} cost={} range={}",
                file.id,
                file.version,
                if file.closed { "sealed" } else { "open" },
                file.device_count,
                file.cost,
                file.range.as_deref().unwrap_or("-")
            );
            if let Some(devices) = &file.devices {
                for (device, range) in devices {
                    println!("    {device}: {range}");
                }
            }
        }
    }
}
