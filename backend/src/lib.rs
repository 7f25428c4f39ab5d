//! Tokenomics Simulator Core - Rust Engine
//!
//! Discrete-time state-transition engine with deterministic, reproducible
//! parameter sweeps, plus a token economy model built on top of it.
//!
//! # Architecture
//!
//! - **core**: Time scale (days, seconds, blocks)
//! - **models**: State, Signal, Trajectory and the run event log
//! - **pipeline**: Blocks, the substep executor and the timestep driver
//! - **orchestrator**: Sweep expansion, Monte Carlo samples and run results
//! - **economy**: Typed economy state, parameters and policy blocks
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (one seeded RNG per trajectory)
//! 2. Blocks run in declaration order; policy signals merge additively
//! 3. No state variable ever holds NaN or ±Inf

// Module declarations
pub mod core;
pub mod economy;
pub mod models;
pub mod orchestrator;
pub mod pipeline;
pub mod rng;

// Re-exports for convenience
pub use crate::core::{TimeScale, DAY_TO_SECONDS};
pub use models::{EventLog, ResultRow, RunEvent, Signal, State, Trajectory};
pub use orchestrator::{
    Orchestrator, OrchestratorConfig, SimulationError, SweepResult, SweepSpec, TrajectoryFailure,
};
pub use pipeline::{Block, Pipeline, StepContext};
pub use rng::RngManager;
