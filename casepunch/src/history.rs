//! In-memory record of the runs made during one session.

use crate::outcome::{PunchOutcome, RunSummary};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionHistoryEntry {
    /// Local time the run finished, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    pub results: Vec<PunchOutcome>,
    pub success_count: usize,
    pub total_count: usize,
    pub mode: String,
}

impl ExecutionHistoryEntry {
    pub fn from_summary(summary: &RunSummary, finished_at: DateTime<Local>) -> Self {
        let mode = if summary.aborted { "aborted" } else { "normal" };
        Self {
            timestamp: finished_at.format(TIMESTAMP_FORMAT).to_string(),
            results: summary.results.clone(),
            success_count: summary.success_count,
            total_count: summary.total_count,
            mode: mode.to_string(),
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.success_count as f64 / self.total_count as f64 * 100.0
        }
    }
}

/// Document written by [`ExecutionHistory::export`]
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryExport {
    pub export_time: String,
    pub total_executions: usize,
    pub history: Vec<ExecutionHistoryEntry>,
}

#[derive(Debug, Default, Clone)]
pub struct ExecutionHistory {
    entries: Vec<ExecutionHistoryEntry>,
}

impl ExecutionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, summary: &RunSummary) -> &ExecutionHistoryEntry {
        self.entries
            .push(ExecutionHistoryEntry::from_summary(summary, Local::now()));
        &self.entries[self.entries.len() - 1]
    }

    pub fn latest(&self) -> Option<&ExecutionHistoryEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[ExecutionHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_export(&self) -> HistoryExport {
        HistoryExport {
            export_time: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            total_executions: self.entries.len(),
            history: self.entries.clone(),
        }
    }

    /// Write the history as pretty-printed JSON.
    pub fn export(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.to_export())?;
        std::fs::write(path, json)
    }
}

/// Default export file name, stamped with the current local time.
pub fn export_file_name(now: DateTime<Local>) -> String {
    format!("punch_log_{}.json", now.format("%Y%m%d_%H%M%S"))
}
