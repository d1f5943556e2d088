//! Effective configuration with source provenance
//!
//! Captures the merged configuration plus where each layer came from
//! (file path and content digest for the lane file, variable names for the
//! environment layer), then deserializes it into the typed [`LaneConfig`]
//! the rest of the lane consumes.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::defaults::LaneDefaults;
use super::merge::merge_layers;
use crate::cleanup::RemovalPolicy;

/// Schema version for the effective config.
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier.
pub const SCHEMA_ID: &str = "cosim-lane/effective_config@1";

/// Environment variable overriding the log filter.
pub const ENV_LOG_FILTER: &str = "COSIM_LANE_LOG";

/// Environment variable forcing cleanup dry-run mode.
pub const ENV_DRY_RUN: &str = "COSIM_LANE_DRY_RUN";

/// Default location of the lane config file, relative to the run directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(".cosim/lane.toml")
}

/// Origin of a configuration layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Env,
}

/// A contributing configuration layer with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    /// Origin of this layer.
    pub origin: ConfigOrigin,

    /// File path (file layer only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of the raw file bytes (file layer only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Environment variables that contributed (env layer only).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub variables: Vec<String>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Snapshot-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Name of the persisted before-snapshot file.
    pub file: String,
}

/// Result-file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultConfig {
    /// Extension assumed for result files named without one.
    pub default_extension: String,
}

/// Parameter-resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamsConfig {
    /// Name of the provenance log written next to the assembly.
    pub provenance_log: String,
}

/// Typed lane configuration, built once at startup and passed by parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneConfig {
    /// Log filter directive for the tracing subscriber.
    pub log_filter: String,
    /// Maximum accepted absolute path length.
    pub max_path_length: usize,
    /// Snapshot settings.
    pub snapshot: SnapshotConfig,
    /// Cleanup removal policy.
    pub removal: RemovalPolicy,
    /// Result-file settings.
    pub result: ResultConfig,
    /// Parameter-resolution settings.
    pub params: ParamsConfig,
}

impl Default for LaneConfig {
    fn default() -> Self {
        let defaults = LaneDefaults::default();
        Self {
            log_filter: defaults.log_filter,
            max_path_length: defaults.max_path_length,
            snapshot: SnapshotConfig {
                file: defaults.snapshot_file,
            },
            removal: defaults.removal,
            result: ResultConfig {
                default_extension: defaults.default_result_extension,
            },
            params: ParamsConfig {
                provenance_log: defaults.provenance_log,
            },
        }
    }
}

impl LaneConfig {
    /// Path of the before-snapshot file inside `run_dir`.
    pub fn snapshot_path(&self, run_dir: &Path) -> PathBuf {
        run_dir.join(&self.snapshot.file)
    }
}

/// Merged configuration with full layer provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// Schema version.
    pub schema_version: u32,

    /// Schema identifier.
    pub schema_id: String,

    /// When this config was computed.
    pub created_at: DateTime<Utc>,

    /// The merged configuration tree.
    pub config: Value,

    /// Contributing layers in precedence order.
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Build the effective config from defaults, an optional lane file, and
    /// the process environment.
    pub fn build(lane_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        layers.push(LaneDefaults::default().to_value());
        sources.push(ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
            variables: Vec::new(),
        });

        if let Some(path) = lane_file {
            if path.exists() {
                let (value, digest) = load_toml_file(path)?;
                layers.push(value);
                sources.push(ConfigSource {
                    origin: ConfigOrigin::File,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                    variables: Vec::new(),
                });
            }
        }

        let (env_layer, variables) = environment_layer();
        if !variables.is_empty() {
            layers.push(env_layer);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Env,
                path: None,
                digest: None,
                variables,
            });
        }

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: merge_layers(layers),
            sources,
        })
    }

    /// Deserialize the merged tree into the typed lane config.
    pub fn lane(&self) -> Result<LaneConfig, ConfigError> {
        Ok(serde_json::from_value(self.config.clone())?)
    }
}

/// Load a TOML file as a JSON value plus its content digest.
fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let digest = hex::encode(Sha256::digest(raw.as_bytes()));
    let table: toml::Value = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((serde_json::to_value(table)?, digest))
}

/// Build the environment layer from recognized COSIM_LANE_* variables.
fn environment_layer() -> (Value, Vec<String>) {
    let mut layer = serde_json::json!({});
    let mut variables = Vec::new();

    if let Ok(filter) = env::var(ENV_LOG_FILTER) {
        layer["log_filter"] = Value::String(filter);
        variables.push(ENV_LOG_FILTER.to_string());
    }
    if let Ok(flag) = env::var(ENV_DRY_RUN) {
        let on = matches!(flag.as_str(), "1" | "true" | "yes");
        layer["removal"] = serde_json::json!({ "dry_run": on });
        variables.push(ENV_DRY_RUN.to_string());
    }

    (layer, variables)
}
