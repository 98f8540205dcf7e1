//! Inclusive time ranges.

use std::fmt;

/// A point in time, in the engine's timestamp precision.
pub type Timestamp = i64;

/// An inclusive `[start, end]` time range recorded for one device.
///
/// A file that is still being written only knows where its data starts, so
/// `end` is `None` until the file is sealed. An unknown end is treated as
/// unbounded by every comparison below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeRange {
    /// First timestamp present.
    pub start: Timestamp,
    /// Last timestamp present, if known.
    pub end: Option<Timestamp>,
}

impl TimeRange {
    /// Creates a closed range.
    #[must_use]
    pub const fn new(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Creates a range whose end is not known yet.
    #[must_use]
    pub const fn open(start: Timestamp) -> Self {
        Self { start, end: None }
    }

    /// Creates a range holding a single timestamp.
    #[must_use]
    pub const fn point(time: Timestamp) -> Self {
        Self::new(time, time)
    }

    /// Returns true if the end of the range is known.
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        self.end.is_some()
    }

    /// Returns false if the range ends before it starts.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.end.map_or(true, |end| end >= self.start)
    }

    /// Returns the last timestamp known to be covered.
    ///
    /// For an open range this is the start, the only timestamp recorded so far.
    #[must_use]
    pub fn known_end(&self) -> Timestamp {
        self.end.unwrap_or(self.start)
    }

    /// Returns true if every timestamp of the range is at or before `bound`.
    #[must_use]
    pub fn ends_at_or_before(&self, bound: Timestamp) -> bool {
        self.end.is_some_and(|end| end <= bound)
    }

    /// Extends the range so it starts no later than `time`.
    pub fn extend_start(&mut self, time: Timestamp) {
        self.start = self.start.min(time);
    }

    /// Extends the range so it ends no earlier than `time`.
    pub fn extend_end(&mut self, time: Timestamp) {
        self.end = Some(self.end.map_or(time, |end| end.max(time)));
    }

    /// Returns the smallest range covering both ranges.
    #[must_use]
    pub fn union(&self, other: &TimeRange) -> TimeRange {
        TimeRange {
            start: self.start.min(other.start),
            end: match (self.end, other.end) {
                (Some(a), Some(b)) => Some(a.max(b)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "[{}, {}]", self.start, end),
            None => write!(f, "[{}, ?]", self.start),
        }
    }
}
