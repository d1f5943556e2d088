//! Built-in lane defaults (layer 1)

use serde::{Deserialize, Serialize};

use crate::cleanup::RemovalPolicy;

/// Built-in default configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneDefaults {
    /// Log filter directive (default: "info")
    pub log_filter: String,

    /// Maximum accepted absolute path length (default: 255)
    pub max_path_length: usize,

    /// Name of the persisted before-snapshot file
    pub snapshot_file: String,

    /// File-removal policy applied during cleanup
    pub removal: RemovalPolicy,

    /// Extension assumed for result files named without one (default: "csv")
    pub default_result_extension: String,

    /// Name of the parameter provenance log
    pub provenance_log: String,
}

impl Default for LaneDefaults {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            max_path_length: 255,
            snapshot_file: "files_before_model_load.txt".to_string(),
            removal: RemovalPolicy::default(),
            default_result_extension: "csv".to_string(),
            provenance_log: "globalParam.log".to_string(),
        }
    }
}

impl LaneDefaults {
    /// Convert to a JSON value for merging.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "log_filter": self.log_filter,
            "max_path_length": self.max_path_length,
            "snapshot": {
                "file": self.snapshot_file
            },
            "removal": {
                "markers": self.removal.markers,
                "retry_delay_seconds": self.removal.retry_delay_seconds,
                "dry_run": self.removal.dry_run
            },
            "result": {
                "default_extension": self.default_result_extension
            },
            "params": {
                "provenance_log": self.provenance_log
            }
        })
    }
}
