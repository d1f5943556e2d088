//! Lane configuration
//!
//! Three-layer merge, highest precedence last:
//! 1. Built-in lane defaults
//! 2. Lane config file (.cosim/lane.toml)
//! 3. Environment overrides (COSIM_LANE_*)
//!
//! The merged result is deserialized once into a typed [`LaneConfig`] that
//! is passed to hooks and pipeline steps by parameter; nothing reads the
//! environment or the config file after startup.

mod defaults;
mod effective;
mod merge;

pub use defaults::LaneDefaults;
pub use effective::{
    default_config_path, ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, LaneConfig,
    ParamsConfig, ResultConfig, SnapshotConfig,
};
pub use merge::{deep_merge, merge_layers};
