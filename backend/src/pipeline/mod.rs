//! Pipeline - ordered blocks executed once per timestep
//!
//! # Architecture
//!
//! ```text
//! For each timestep t in 1..=T:
//!   state = history[t - 1]
//!   for each block b (substep 1..=|pipeline|):
//!     state = execute_substep(b, state)     // sees the previous block's output
//!   history.push(state)
//! ```
//!
//! Timesteps are strictly sequential: each one starts from the final state
//! of the previous. Time itself is advanced by a leading block so later
//! blocks can read this timestep's `delta_days` / `delta_blocks`.

pub mod block;
pub mod executor;

pub use block::{Block, PolicyFn, StateUpdate, StepContext, UpdateFn};
pub use executor::{collect_signal, execute_substep, Stage, SubstepError};

use crate::models::State;
use crate::orchestrator::SimulationError;
use crate::rng::RngManager;
use std::collections::BTreeSet;
use thiserror::Error;

/// Error aborting one trajectory, tagged with the timestep it happened in.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("timestep {timestep}: {error}")]
pub struct TrajectoryError {
    pub timestep: usize,
    #[source]
    pub error: SubstepError,
}

/// Immutable, validated sequence of blocks.
///
/// # Example
///
/// ```rust
/// use std::collections::BTreeMap;
/// use tokenomics_simulator_core_rs::pipeline::{Block, Pipeline};
/// use tokenomics_simulator_core_rs::{RngManager, Signal};
///
/// let pipeline = Pipeline::new(vec![Block::<BTreeMap<String, f64>, ()>::new("Constant")
///     .policy("five", |_ctx, _state| Ok(Signal::from_pairs([("x".to_string(), 5.0)])))
///     .replace("x".to_string())])
/// .unwrap();
///
/// let initial = BTreeMap::from([("x".to_string(), 0.0)]);
/// let history = pipeline
///     .run_trajectory(&initial, &(), 3, &mut RngManager::new(1))
///     .unwrap();
///
/// let xs: Vec<f64> = history.iter().map(|s| s["x"]).collect();
/// assert_eq!(xs, vec![0.0, 5.0, 5.0, 5.0]);
/// ```
#[derive(Debug)]
pub struct Pipeline<S: State, P> {
    blocks: Vec<Block<S, P>>,
}

impl<S: State, P> Pipeline<S, P> {
    /// Build a pipeline from blocks in execution order.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` when a block declares the same variable twice or
    /// registers two policies under one name.
    pub fn new(blocks: Vec<Block<S, P>>) -> Result<Self, SimulationError> {
        for block in &blocks {
            let mut variables = BTreeSet::new();
            for (key, _) in block.updates() {
                if !variables.insert(key.clone()) {
                    return Err(SimulationError::ConfigurationError(format!(
                        "block '{}' declares variable '{}' more than once",
                        block.label(),
                        key
                    )));
                }
            }

            let mut policies = BTreeSet::new();
            for (name, _) in block.policies() {
                if !policies.insert(name.as_str()) {
                    return Err(SimulationError::ConfigurationError(format!(
                        "block '{}' declares policy '{}' more than once",
                        block.label(),
                        name
                    )));
                }
            }
        }

        Ok(Self { blocks })
    }

    /// Blocks in execution order
    pub fn blocks(&self) -> &[Block<S, P>] {
        &self.blocks
    }

    /// Number of substeps per timestep
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True for a pipeline without blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Check that every variable any block updates exists in `initial`.
    pub fn validate_state(&self, initial: &S) -> Result<(), SimulationError> {
        for block in &self.blocks {
            for (key, _) in block.updates() {
                if initial.value(key).is_none() {
                    return Err(SimulationError::ConfigurationError(format!(
                        "block '{}' updates '{}' which is missing from the initial state",
                        block.label(),
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    /// Run `timesteps` timesteps from `initial`.
    ///
    /// Returns the history: `timesteps + 1` states, the initial one first.
    pub fn run_trajectory(
        &self,
        initial: &S,
        params: &P,
        timesteps: usize,
        rng: &mut RngManager,
    ) -> Result<Vec<S>, TrajectoryError> {
        let mut history = Vec::with_capacity(timesteps + 1);
        history.push(initial.clone());

        for timestep in 1..=timesteps {
            let next = self.run_timestep(&history[timestep - 1], &history, params, timestep, rng)?;
            history.push(next);
        }

        Ok(history)
    }

    /// Thread `start` through every block once.
    ///
    /// `history` is what policies see as the completed timesteps; it is
    /// normally the trajectory so far, ending in `start`.
    pub fn run_timestep(
        &self,
        start: &S,
        history: &[S],
        params: &P,
        timestep: usize,
        rng: &mut RngManager,
    ) -> Result<S, TrajectoryError> {
        let mut state = start.clone();

        for (index, block) in self.blocks.iter().enumerate() {
            let mut ctx = StepContext::new(params, timestep, index + 1, history, &mut *rng);
            state = execute_substep(block, &mut ctx, &state)
                .map_err(|error| TrajectoryError { timestep, error })?;
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Signal;
    use std::collections::BTreeMap;

    type MapState = BTreeMap<String, f64>;

    #[test]
    fn test_duplicate_variable_rejected() {
        let block = Block::<MapState, ()>::new("dup")
            .replace("x".to_string())
            .accumulate("x".to_string());

        let result = Pipeline::new(vec![block]);
        assert!(matches!(result, Err(SimulationError::ConfigurationError(_))));
    }

    #[test]
    fn test_duplicate_policy_name_rejected() {
        let block = Block::<MapState, ()>::new("dup")
            .policy("p", |_, _| Ok(Signal::new()))
            .policy("p", |_, _| Ok(Signal::new()));

        let result = Pipeline::new(vec![block]);
        assert!(matches!(result, Err(SimulationError::ConfigurationError(_))));
    }

    #[test]
    fn test_same_variable_in_different_blocks_allowed() {
        let pipeline: Pipeline<MapState, ()> = Pipeline::new(vec![
            Block::<MapState, ()>::new("first").accumulate("x".to_string()),
            Block::<MapState, ()>::new("second").accumulate("x".to_string()),
        ])
        .unwrap();
        assert_eq!(pipeline.len(), 2);
    }

    #[test]
    fn test_validate_state_reports_missing_variable() {
        let pipeline: Pipeline<MapState, ()> =
            Pipeline::new(vec![Block::<MapState, ()>::new("b").replace("missing".to_string())]).unwrap();

        let initial: MapState = BTreeMap::from([("x".to_string(), 0.0)]);
        let err = pipeline.validate_state(&initial).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_single_timestep_without_history() {
        let pipeline: Pipeline<MapState, ()> = Pipeline::new(vec![Block::<MapState, ()>::new("b")
            .policy("one", |_, _| Ok(Signal::from_pairs([("x".to_string(), 1.0)])))
            .update_with("seen".to_string(), |ctx, _, _| Ok(ctx.history.len() as f64))
            .accumulate("x".to_string())])
        .unwrap();
        let start: MapState = BTreeMap::from([("x".to_string(), 1.0), ("seen".to_string(), -1.0)]);

        let next = pipeline
            .run_timestep(&start, &[], &(), 1, &mut RngManager::new(1))
            .unwrap();
        assert_eq!(next["x"], 2.0);
        assert_eq!(next["seen"], 0.0);
    }

    #[test]
    fn test_zero_timesteps_returns_initial_state_only() {
        let pipeline: Pipeline<MapState, ()> =
            Pipeline::new(vec![Block::<MapState, ()>::new("b").accumulate("x".to_string())]).unwrap();
        let initial: MapState = BTreeMap::from([("x".to_string(), 1.0)]);

        let history = pipeline
            .run_trajectory(&initial, &(), 0, &mut RngManager::new(1))
            .unwrap();
        assert_eq!(history, vec![initial]);
    }
}
