//! Data model shared by the engine: states, signals, trajectories and the run log

pub mod event;
pub mod signal;
pub mod state;
pub mod trajectory;

// Re-exports
pub use event::{EventLog, RunEvent};
pub use signal::Signal;
pub use state::State;
pub use trajectory::{ResultRow, Trajectory};
