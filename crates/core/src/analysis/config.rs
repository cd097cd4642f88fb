//! Analysis settings and the report they produce

use super::capture::{analyze, analyze_by_group, CaptureAnalysis};
use crate::error::Result;
use crate::tracking::{EventReason, EventTable, ReasonCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Settings for one analysis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Reason code marking a particle's terminal event
    pub terminal_reason: ReasonCode,
    /// Report one result per release group instead of one overall
    pub by_group: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            terminal_reason: EventReason::Termination.code(),
            by_group: false,
        }
    }
}

/// Output of [`AnalysisConfig::run`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    Single(CaptureAnalysis),
    ByGroup(BTreeMap<i64, CaptureAnalysis>),
}

impl AnalysisConfig {
    pub fn with_terminal_reason(mut self, code: ReasonCode) -> Self {
        self.terminal_reason = code;
        self
    }

    pub fn with_by_group(mut self, by_group: bool) -> Self {
        self.by_group = by_group;
        self
    }

    /// Analyze `table` with these settings.
    ///
    /// # Errors
    /// See [`analyze`] and [`analyze_by_group`].
    pub fn run(&self, table: &EventTable) -> Result<AnalysisReport> {
        if self.by_group {
            analyze_by_group(table, self.terminal_reason).map(AnalysisReport::ByGroup)
        } else {
            analyze(table, self.terminal_reason).map(AnalysisReport::Single)
        }
    }

    /// Load settings from a JSON file; absent fields take their defaults.
    ///
    /// # Errors
    /// Returns `Io` or `Json` if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
