//! Co-Simulation Support Lane
//!
//! Host-side automation for a co-simulation platform used in automotive
//! model integration: global-parameter resolution across module
//! configuration fragments, before/after snapshots of the run directory,
//! cleanup of files created by the external model load, and the hook entry
//! points the simulation host calls during a run.

pub mod cleanup;
pub mod config;
pub mod hooks;
pub mod params;
pub mod pipeline;
pub mod snapshot;
pub mod support;

pub use cleanup::{select_for_removal, CleanupResult, CleanupRun, RemovalPolicy};
pub use config::{EffectiveConfig, LaneConfig};
pub use hooks::{HookStatus, SimTime};
pub use params::{ParameterDeclaration, Provenance, ResolvedAssignment};
pub use pipeline::{run_transform, TransformError, TransformOutcome, TransformRequest};
pub use snapshot::FileSnapshot;
