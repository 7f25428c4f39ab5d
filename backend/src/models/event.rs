//! Run events for auditing a sweep.
//!
//! Trajectories themselves are pure data; the event log records the
//! lifecycle around them so a caller can see which (configuration, sample)
//! pairs ran, with which seed, and where a failed one stopped.
//!
//! # Example
//!
//! ```rust
//! use tokenomics_simulator_core_rs::models::{EventLog, RunEvent};
//!
//! let mut log = EventLog::new();
//! log.log(RunEvent::TrajectoryStarted {
//!     config_index: 0,
//!     sample_index: 1,
//!     seed: 42,
//! });
//!
//! assert_eq!(log.events_for_pair(0, 1).len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle event of a sweep run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Sweep expanded and about to execute
    SweepStarted {
        run_id: Uuid,
        configurations: usize,
        samples: usize,
        timesteps: usize,
    },

    /// A (configuration, sample) pair began executing
    TrajectoryStarted {
        config_index: usize,
        sample_index: usize,
        seed: u64,
    },

    /// A pair ran every timestep
    TrajectoryCompleted {
        config_index: usize,
        sample_index: usize,
        timesteps: usize,
    },

    /// A pair aborted; siblings are unaffected
    TrajectoryFailed {
        config_index: usize,
        sample_index: usize,
        timestep: usize,
        block: String,
        message: String,
    },
}

impl RunEvent {
    /// Event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            RunEvent::SweepStarted { .. } => "SweepStarted",
            RunEvent::TrajectoryStarted { .. } => "TrajectoryStarted",
            RunEvent::TrajectoryCompleted { .. } => "TrajectoryCompleted",
            RunEvent::TrajectoryFailed { .. } => "TrajectoryFailed",
        }
    }

    /// (configuration, sample) pair the event refers to, if any
    pub fn pair(&self) -> Option<(usize, usize)> {
        match self {
            RunEvent::SweepStarted { .. } => None,
            RunEvent::TrajectoryStarted {
                config_index,
                sample_index,
                ..
            }
            | RunEvent::TrajectoryCompleted {
                config_index,
                sample_index,
                ..
            }
            | RunEvent::TrajectoryFailed {
                config_index,
                sample_index,
                ..
            } => Some((*config_index, *sample_index)),
        }
    }
}

/// Event log for storing and querying run events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<RunEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: RunEvent) {
        self.events.push(event);
    }

    /// Append every event of `other`, preserving order
    pub fn extend(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&RunEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for one (configuration, sample) pair
    pub fn events_for_pair(&self, config_index: usize, sample_index: usize) -> Vec<&RunEvent> {
        self.events
            .iter()
            .filter(|e| e.pair() == Some((config_index, sample_index)))
            .collect()
    }
}
