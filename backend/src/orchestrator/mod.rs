//! Orchestrator - sweep and sample driver
//!
//! Expands parameter sweeps, seeds each (configuration, sample) pair and
//! runs it through the pipeline.
//!
//! See `engine.rs` for the driver itself.

pub mod engine;
pub mod fingerprint;
pub mod sweep;

pub use engine::{Orchestrator, OrchestratorConfig, SimulationError, SweepResult, TrajectoryFailure};
pub use fingerprint::{compute_config_hash, derive_seed};
pub use sweep::{apply_overrides, build_configurations, Configuration, Overrides, SweepSpec};
