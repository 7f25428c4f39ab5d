//! Trajectories and tabular result rows.
//!
//! A trajectory is the history produced by one (configuration, sample)
//! pair: the initial state followed by one state per timestep. It is built
//! by appending and never edited once its run finishes.

use crate::models::state::State;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full ordered history of one (configuration, sample) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<S> {
    /// Index of the parameter configuration in the expanded sweep
    pub config_index: usize,

    /// Index of the stochastic sample for that configuration
    pub sample_index: usize,

    /// Seed the pair's RNG was started from
    pub seed: u64,

    /// `states[0]` is the initial state, `states[t]` the state after timestep t
    pub states: Vec<S>,
}

impl<S: State> Trajectory<S> {
    /// Number of timesteps executed (history length minus the initial state)
    pub fn timesteps(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    /// State after the last executed timestep
    pub fn final_state(&self) -> Option<&S> {
        self.states.last()
    }

    /// Flatten into result rows.
    ///
    /// `substeps` is the pipeline length: rows after the initial one report
    /// the last substep executed in their timestep.
    pub fn rows(&self, substeps: usize) -> Vec<ResultRow> {
        self.states
            .iter()
            .enumerate()
            .map(|(timestep, state)| ResultRow {
                config_index: self.config_index,
                sample_index: self.sample_index,
                timestep,
                substep: if timestep == 0 { 0 } else { substeps },
                values: state.to_columns(),
            })
            .collect()
    }
}

/// One row of the tabular output: every state variable plus identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub config_index: usize,
    pub sample_index: usize,
    pub timestep: usize,
    pub substep: usize,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_state(x: f64) -> BTreeMap<String, f64> {
        let mut state = BTreeMap::new();
        state.insert("x".to_string(), x);
        state
    }

    #[test]
    fn test_rows_tag_initial_state_with_substep_zero() {
        let trajectory = Trajectory {
            config_index: 1,
            sample_index: 2,
            seed: 9,
            states: vec![map_state(0.0), map_state(5.0)],
        };

        let rows = trajectory.rows(3);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].substep, 0);
        assert_eq!(rows[1].substep, 3);
        assert_eq!(rows[1].timestep, 1);
        assert_eq!(rows[1].config_index, 1);
        assert_eq!(rows[1].sample_index, 2);
        assert_eq!(rows[1].values["x"], 5.0);
        assert_eq!(trajectory.timesteps(), 1);
    }

    #[test]
    fn test_row_serializes_flat() {
        let row = ResultRow {
            config_index: 0,
            sample_index: 0,
            timestep: 4,
            substep: 2,
            values: map_state(1.5),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["timestep"], 4);
        assert_eq!(json["x"], 1.5);
    }
}
