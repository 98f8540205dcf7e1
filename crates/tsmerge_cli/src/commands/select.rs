//! Select command implementation.

use super::catalogue::Catalogue;
use serde::Serialize;
use std::path::Path;
use tracing::info;
use tsmerge_core::{FileResource, MaxFileSelector, MergeResource, SelectorConfig};

/// Flags of the select command.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// Memory budget override.
    pub budget: Option<u64>,
    /// Unsequential file cap override.
    pub max_unseq: Option<usize>,
    /// Optional time lower bound.
    pub time_lower_bound: Option<i64>,
}

impl SelectOptions {
    fn config(&self) -> SelectorConfig {
        let mut config = SelectorConfig::new();
        if let Some(budget) = self.budget {
            config = config.with_budget(budget);
        }
        if let Some(max) = self.max_unseq {
            config = config.with_max_unseq_files(max);
        }
        config
    }
}

/// Selection result.
#[derive(Debug, Serialize)]
pub struct SelectResult {
    /// Memory budget in effect.
    pub budget: u64,
    /// Unsequential file cap in effect.
    pub max_unseq_files: usize,
    /// Selected sequential file ids; empty if nothing was chosen.
    pub seq_files: Vec<u64>,
    /// Selected unsequential file ids; empty if nothing was chosen.
    pub unseq_files: Vec<u64>,
    /// Why the selection pass stopped.
    pub stop_reason: String,
    /// Sequential files examined.
    pub seq_examined: usize,
    /// Estimated cost of the selection in bytes.
    pub total_cost: u64,
    /// Sequential files dropped because nothing folded into them.
    pub trimmed_seq_files: usize,
}

/// Runs the selector over `catalogue`.
pub fn execute(
    catalogue: &Catalogue,
    options: &SelectOptions,
) -> Result<SelectResult, Box<dyn std::error::Error>> {
    let (seq, unseq) = catalogue.to_resources()?;
    let selector = MaxFileSelector::new(options.config())?;

    let result = MergeResource::scoped(&seq, &unseq, options.time_lower_bound, |resource| {
        let (selection, report) = selector.select_with_report(resource)?;
        Ok(SelectResult {
            budget: selector.config().budget,
            max_unseq_files: selector.config().max_unseq_files,
            seq_files: ids(selection.seq_files()),
            unseq_files: ids(selection.unseq_files()),
            stop_reason: report.stop_reason.to_string(),
            seq_examined: report.seq_examined,
            total_cost: report.total_cost,
            trimmed_seq_files: report.trimmed_seq_files,
        })
    })?;

    info!(
        seq_files = result.seq_files.len(),
        unseq_files = result.unseq_files.len(),
        "selection finished"
    );
    Ok(result)
}

/// Runs the select command.
pub fn run(
    path: &Path,
    options: &SelectOptions,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalogue = Catalogue::load(path)?;
    let result = execute(&catalogue, options)?;

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

fn ids(files: &[&FileResource]) -> Vec<u64> {
    files.iter().map(|f| f.id().as_u64()).collect()
}

fn print_text_output(result: &SelectResult) {
    println!("Merge File Selection");
    println!("====================");
    println!();
    println!("Budget:          {} bytes", result.budget);
    println!("Unseq file cap:  {}", result.max_unseq_files);
    println!();
    if result.unseq_files.is_empty() {
        println!("Nothing to merge this cycle.");
    } else {
        println!("Sequential:      {:?}", result.seq_files);
        println!("Unsequential:    {:?}", result.unseq_files);
        println!("Estimated cost:  {} bytes", result.total_cost);
    }
    println!();
    println!("Stop reason:     {}", result.stop_reason);
    println!("Seq examined:    {}", result.seq_examined);
    println!("Seq trimmed:     {}", result.trimmed_seq_files);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue(json: &str) -> Catalogue {
        serde_json::from_str(json).unwrap()
    }

    const CHAIN: &str = r#"{
        "seq": [
            { "id": 0, "devices": { "d0": { "start": 0, "end": 9 } } },
            { "id": 1, "devices": { "d0": { "start": 10, "end": 19 } } },
            { "id": 2, "devices": { "d0": { "start": 20, "end": 29 } } }
        ],
        "unseq": [
            { "id": 10, "devices": { "d0": { "start": 3, "end": 12 } } },
            { "id": 11, "devices": { "d0": { "start": 25, "end": 26 } } }
        ]
    }"#;

    #[test]
    fn selects_with_defaults() {
        let result = execute(&catalogue(CHAIN), &SelectOptions::default()).unwrap();
        assert_eq!(result.seq_files, vec![0, 1, 2]);
        assert_eq!(result.unseq_files, vec![10, 11]);
        assert_eq!(result.stop_reason, "exhausted");
        assert_eq!(result.max_unseq_files, 100);
    }

    #[test]
    fn cap_override_is_applied() {
        let options = SelectOptions {
            max_unseq: Some(1),
            ..SelectOptions::default()
        };
        let result = execute(&catalogue(CHAIN), &options).unwrap();
        assert_eq!(result.seq_files, vec![0, 1]);
        assert_eq!(result.unseq_files, vec![10]);
        assert_eq!(result.stop_reason, "cap-reached");
    }

    #[test]
    fn tiny_budget_selects_nothing() {
        let options = SelectOptions {
            budget: Some(10),
            ..SelectOptions::default()
        };
        let result = execute(&catalogue(CHAIN), &options).unwrap();
        assert!(result.seq_files.is_empty());
        assert!(result.unseq_files.is_empty());
        assert_eq!(result.stop_reason, "budget-exceeded");
    }

    #[test]
    fn time_lower_bound_prunes_old_files() {
        let options = SelectOptions {
            time_lower_bound: Some(19),
            ..SelectOptions::default()
        };
        let result = execute(&catalogue(CHAIN), &options).unwrap();
        assert_eq!(result.seq_files, vec![2]);
        assert_eq!(result.unseq_files, vec![11]);
    }

    #[test]
    fn overlapping_chain_is_rejected() {
        let json = r#"{
            "seq": [
                { "id": 0, "devices": { "d0": { "start": 0, "end": 9 } } },
                { "id": 1, "devices": { "d0": { "start": 5, "end": 19 } } }
            ]
        }"#;
        assert!(execute(&catalogue(json), &SelectOptions::default()).is_err());
    }
}
