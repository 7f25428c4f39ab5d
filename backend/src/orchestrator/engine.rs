//! Orchestrator Engine - sweep and sample driver
//!
//! Runs every (configuration, sample) pair of a sweep through the pipeline:
//!
//! ```text
//! 1. Validate the initial state against the pipeline
//! 2. Expand the sweep into configurations (fails before any run)
//! 3. For each configuration c, for each sample s:
//!      seed = derive_seed(rng_seed, c, s)
//!      history = pipeline.run_trajectory(initial, params_c, T, rng(seed))
//! 4. Collect trajectories and failures, ordered by (c, s)
//! ```
//!
//! Pairs share nothing mutable. With the `parallel` feature they run on a
//! rayon pool; results are identical either way.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//! use tokenomics_simulator_core_rs::orchestrator::{Orchestrator, OrchestratorConfig, SweepSpec};
//! use tokenomics_simulator_core_rs::pipeline::{Block, Pipeline};
//! use tokenomics_simulator_core_rs::Signal;
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Params {
//!     step: f64,
//! }
//!
//! let pipeline = Pipeline::new(vec![Block::<BTreeMap<String, f64>, Params>::new("Step")
//!     .policy("step", |ctx, _| Ok(Signal::from_pairs([("x".to_string(), ctx.params.step)])))
//!     .accumulate("x".to_string())])
//! .unwrap();
//!
//! let orchestrator = Orchestrator::new(
//!     OrchestratorConfig { timesteps: 2, samples: 1, rng_seed: 1 },
//!     pipeline,
//! )
//! .unwrap();
//!
//! let initial: BTreeMap<String, f64> = BTreeMap::from([("x".to_string(), 0.0)]);
//! let sweep = SweepSpec::cartesian([("step", vec![json!(1.0), json!(3.0)])]);
//! let result = orchestrator.run(&initial, &Params { step: 0.0 }, &sweep).unwrap();
//!
//! assert_eq!(result.trajectories.len(), 2);
//! assert_eq!(result.trajectories[1].states[2]["x"], 6.0);
//! ```

use crate::models::{EventLog, ResultRow, RunEvent, State, Trajectory};
use crate::orchestrator::fingerprint::derive_seed;
use crate::orchestrator::sweep::{build_configurations, Configuration, SweepSpec};
use crate::pipeline::{Pipeline, TrajectoryError};
use crate::rng::RngManager;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Errors
// ============================================================================

/// Simulation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A policy detected an impossible economic state
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Malformed sweep, pipeline, parameters or initial state
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An update produced NaN or an infinity
    #[error("Numeric degeneracy: '{variable}' evaluated to {value}")]
    NumericDegeneracy { variable: String, value: f64 },

    /// serde_json failure while handling parameters
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// A (configuration, sample) pair that aborted.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("configuration {config_index}, sample {sample_index}: {error}")]
pub struct TrajectoryFailure {
    pub config_index: usize,
    pub sample_index: usize,
    pub seed: u64,
    #[source]
    pub error: TrajectoryError,
}

// ============================================================================
// Configuration Types
// ============================================================================

/// Run-wide settings shared by every configuration of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Timesteps per trajectory (history length is `timesteps + 1`)
    pub timesteps: usize,

    /// Independent stochastic samples per configuration
    pub samples: usize,

    /// Root seed; per-pair seeds are derived from it
    pub rng_seed: u64,
}

// ============================================================================
// Results
// ============================================================================

/// Everything a sweep produced.
#[derive(Debug, Clone)]
pub struct SweepResult<S, P> {
    /// Unique id of this run
    pub run_id: Uuid,

    /// Expanded configurations, by index
    pub configurations: Vec<Configuration<P>>,

    /// Completed trajectories, ordered by (configuration, sample)
    pub trajectories: Vec<Trajectory<S>>,

    /// Aborted pairs, ordered by (configuration, sample)
    pub failures: Vec<TrajectoryFailure>,

    /// Lifecycle events in pair order
    pub events: EventLog,

    /// Pipeline length, reported as the substep of non-initial rows
    pub substeps: usize,
}

impl<S: State, P> SweepResult<S, P> {
    /// True when no pair failed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Trajectory of one pair, if it completed
    pub fn trajectory(&self, config_index: usize, sample_index: usize) -> Option<&Trajectory<S>> {
        self.trajectories
            .iter()
            .find(|t| t.config_index == config_index && t.sample_index == sample_index)
    }

    /// Tabular output: one row per (configuration, sample, timestep)
    pub fn rows(&self) -> Vec<ResultRow> {
        self.trajectories
            .iter()
            .flat_map(|t| t.rows(self.substeps))
            .collect()
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Sweep driver owning a validated pipeline.
pub struct Orchestrator<S: State, P> {
    config: OrchestratorConfig,
    pipeline: Pipeline<S, P>,
}

impl<S, P> Orchestrator<S, P>
where
    S: State,
    P: Serialize + DeserializeOwned + Send + Sync,
{
    /// Create new orchestrator
    ///
    /// # Errors
    ///
    /// `ConfigurationError` when `samples` is zero.
    pub fn new(config: OrchestratorConfig, pipeline: Pipeline<S, P>) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;
        Ok(Self { config, pipeline })
    }

    fn validate_config(config: &OrchestratorConfig) -> Result<(), SimulationError> {
        if config.samples == 0 {
            return Err(SimulationError::ConfigurationError(
                "samples must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline<S, P> {
        &self.pipeline
    }

    /// Run every (configuration, sample) pair of `sweep`.
    ///
    /// Configuration and state problems abort the whole sweep before any
    /// trajectory starts. Errors inside a trajectory are reported in
    /// [`SweepResult::failures`] and leave sibling pairs untouched.
    pub fn run(
        &self,
        initial: &S,
        base_params: &P,
        sweep: &SweepSpec,
    ) -> Result<SweepResult<S, P>, SimulationError> {
        self.pipeline.validate_state(initial)?;
        let configurations = build_configurations(base_params, sweep)?;

        let run_id = Uuid::new_v4();
        info!(
            "sweep {}: {} configuration(s) x {} sample(s), {} timesteps",
            run_id,
            configurations.len(),
            self.config.samples,
            self.config.timesteps
        );

        let mut events = EventLog::new();
        events.log(RunEvent::SweepStarted {
            run_id,
            configurations: configurations.len(),
            samples: self.config.samples,
            timesteps: self.config.timesteps,
        });

        let pairs: Vec<(&Configuration<P>, usize)> = configurations
            .iter()
            .flat_map(|c| (0..self.config.samples).map(move |s| (c, s)))
            .collect();

        let outcomes = self.execute_pairs(initial, &pairs);

        let mut trajectories = Vec::new();
        let mut failures = Vec::new();
        for (pair_events, outcome) in outcomes {
            events.extend(pair_events);
            match outcome {
                Ok(trajectory) => trajectories.push(trajectory),
                Err(failure) => failures.push(failure),
            }
        }

        info!(
            "sweep {}: {} trajectory(ies) completed, {} failed",
            run_id,
            trajectories.len(),
            failures.len()
        );

        Ok(SweepResult {
            run_id,
            configurations,
            trajectories,
            failures,
            events,
            substeps: self.pipeline.len(),
        })
    }

    #[cfg(feature = "parallel")]
    fn execute_pairs(&self, initial: &S, pairs: &[(&Configuration<P>, usize)]) -> Vec<PairOutcome<S>> {
        use rayon::prelude::*;
        pairs
            .par_iter()
            .map(|(configuration, sample)| self.execute_pair(initial, configuration, *sample))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn execute_pairs(&self, initial: &S, pairs: &[(&Configuration<P>, usize)]) -> Vec<PairOutcome<S>> {
        pairs
            .iter()
            .map(|(configuration, sample)| self.execute_pair(initial, configuration, *sample))
            .collect()
    }

    fn execute_pair(
        &self,
        initial: &S,
        configuration: &Configuration<P>,
        sample_index: usize,
    ) -> PairOutcome<S> {
        let config_index = configuration.index;
        let seed = derive_seed(self.config.rng_seed, config_index, sample_index);

        let mut events = EventLog::new();
        events.log(RunEvent::TrajectoryStarted {
            config_index,
            sample_index,
            seed,
        });
        debug!(
            "trajectory ({}, {}) started with seed {}",
            config_index, sample_index, seed
        );

        let outcome = self.run_pair(initial, &configuration.params, config_index, sample_index, seed);
        match &outcome {
            Ok(trajectory) => {
                events.log(RunEvent::TrajectoryCompleted {
                    config_index,
                    sample_index,
                    timesteps: trajectory.timesteps(),
                });
                debug!("trajectory ({}, {}) completed", config_index, sample_index);
            }
            Err(failure) => {
                events.log(RunEvent::TrajectoryFailed {
                    config_index,
                    sample_index,
                    timestep: failure.error.timestep,
                    block: failure.error.error.block.clone(),
                    message: failure.error.error.to_string(),
                });
                warn!("{}", failure);
            }
        }

        (events, outcome)
    }

    /// Run one (configuration, sample) pair from an explicit seed.
    ///
    /// Same seed and parameters always give a bit-identical trajectory.
    pub fn run_pair(
        &self,
        initial: &S,
        params: &P,
        config_index: usize,
        sample_index: usize,
        seed: u64,
    ) -> Result<Trajectory<S>, TrajectoryFailure> {
        let mut rng = RngManager::new(seed);
        match self
            .pipeline
            .run_trajectory(initial, params, self.config.timesteps, &mut rng)
        {
            Ok(states) => Ok(Trajectory {
                config_index,
                sample_index,
                seed,
                states,
            }),
            Err(error) => Err(TrajectoryFailure {
                config_index,
                sample_index,
                seed,
                error,
            }),
        }
    }
}

type PairOutcome<S> = (EventLog, Result<Trajectory<S>, TrajectoryFailure>);
