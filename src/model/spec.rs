// Per-file report tree: suites plus the per-environment timing matrix

use crate::model::suite::Suite;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Fixed leading label of the timing-matrix header row
pub const TIME_HEADER_LEAD: &str = "Suite";

/// One cell of the timing matrix: duration text plus the display color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogTimeCell {
    pub log_time: String,
    pub color: String,
}

/// One matrix row, keyed by environment label
pub type LogTimeRow = IndexMap<String, LogTimeCell>;

/// The report's representation of one test file.
///
/// Suite insertion order is meaningful: it is the execution order the
/// timing-matrix rows are labelled by.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    #[serde(default)]
    pub suites: IndexMap<String, Suite>,

    /// Rows of the timing matrix, indexed by 1-based suite sequence number.
    /// Rows are dense; gaps are back-filled with empty placeholders.
    #[serde(default)]
    pub log_times: Vec<LogTimeRow>,

    /// Distinct environment labels in first-seen order, led by
    /// [`TIME_HEADER_LEAD`].
    #[serde(default)]
    pub log_time_header: Vec<String>,
}

impl Spec {
    /// Record one timing sample for `suite_number` (1-based) under the given
    /// environment label, growing the header and row table as needed.
    pub fn record_log_time(&mut self, label: &str, suite_number: u32, cell: LogTimeCell) {
        if self.log_time_header.is_empty() {
            self.log_time_header.push(TIME_HEADER_LEAD.to_string());
        }
        if !self.log_time_header.iter().any(|existing| existing == label) {
            self.log_time_header.push(label.to_string());
        }

        let index = (suite_number - 1) as usize;
        while self.log_times.len() <= index {
            self.log_times.push(LogTimeRow::new());
        }
        self.log_times[index].insert(label.to_string(), cell);
    }
}
