use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One remote file on its way to the download directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferUnit {
    /// Name as listed by the server
    pub name: String,
    /// Size reported by the server, in bytes
    pub size: u64,
    /// Where the file is written locally
    pub local_path: PathBuf,
}

impl TransferUnit {
    pub fn new(name: &str, size: u64, download_dir: &Path) -> Self {
        Self {
            name: name.to_string(),
            size,
            local_path: download_dir.join(name),
        }
    }
}

/// How a single candidate ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransferOutcome {
    Downloaded { name: String, bytes: u64 },
    /// Stored locally, but the copy on the printer could not be removed
    DeleteFailed { name: String, bytes: u64, error: String },
    SkippedEmpty { name: String },
    Failed { name: String, error: String },
}

impl TransferOutcome {
    pub fn name(&self) -> &str {
        match self {
            Self::Downloaded { name, .. }
            | Self::DeleteFailed { name, .. }
            | Self::SkippedEmpty { name }
            | Self::Failed { name, .. } => name,
        }
    }

    /// True when a complete local copy exists after this outcome
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Downloaded { .. } | Self::DeleteFailed { .. })
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub candidates: usize,
    pub outcomes: Vec<TransferOutcome>,
}

impl SyncReport {
    pub fn record(&mut self, outcome: TransferOutcome) {
        self.outcomes.push(outcome);
    }

    /// Names of the files stored locally during the run, in transfer order
    pub fn downloaded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_stored())
            .map(TransferOutcome::name)
            .collect()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TransferOutcome::SkippedEmpty { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TransferOutcome::Failed { .. }))
            .count()
    }

    pub fn delete_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TransferOutcome::DeleteFailed { .. }))
            .count()
    }

    pub fn total_bytes(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o {
                TransferOutcome::Downloaded { bytes, .. }
                | TransferOutcome::DeleteFailed { bytes, .. } => *bytes,
                _ => 0,
            })
            .sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} candidate(s): {} downloaded ({} MB), {} skipped, {} failed, {} not deleted",
            self.candidates,
            self.downloaded().len(),
            format_megabytes(self.total_bytes()),
            self.skipped(),
            self.failed(),
            self.delete_failures()
        )
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Bytes as megabytes rounded to two decimals
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}
