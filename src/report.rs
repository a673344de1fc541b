use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a unique run ID (UUID v4)
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Summary of one full merge run.
///
/// Serialized as the `--json` output of the binary; the human-readable
/// rendering in `main` uses the same fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Whether the run completed (fatal errors set this to false)
    pub success: bool,
    /// Unique identifier for this run
    pub run_id: String,
    /// Number of modules loaded
    pub modules: usize,
    /// Total rows across all modules
    pub total_rows: usize,
    /// Locale codes merged into the outputs, in processing order
    pub locales_merged: Vec<String>,
    /// Locale codes skipped by validation, in processing order
    pub locales_skipped: Vec<String>,
    /// Count of per-module reference-text mismatches across all locales
    pub alignment_warnings: usize,
    /// Output tables written successfully
    pub tables_written: usize,
    /// Output tables that failed to write
    pub write_failures: usize,
    /// Error message when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    /// Create an empty report for a run that has just started.
    pub fn new(run_id: String) -> Self {
        Self {
            success: true,
            run_id,
            modules: 0,
            total_rows: 0,
            locales_merged: Vec::new(),
            locales_skipped: Vec::new(),
            alignment_warnings: 0,
            tables_written: 0,
            write_failures: 0,
            error: None,
        }
    }

    /// Create a report for a run that aborted fatally.
    pub fn failure(run_id: String, error: String) -> Self {
        let mut report = Self::new(run_id);
        report.success = false;
        report.error = Some(error);
        report
    }
}
