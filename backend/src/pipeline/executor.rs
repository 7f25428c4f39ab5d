//! Substep executor.
//!
//! Runs one block against the current state:
//!
//! ```text
//! 1. Evaluate every policy in declared order
//! 2. Merge their outputs additively into one signal
//! 3. Evaluate every update in declared order against (signal, current state)
//! 4. Write each result into a copy of the current state
//! ```
//!
//! Updates never observe each other's outputs within a block: all of them
//! read the state the block started from. Variables the block does not
//! declare are carried over unchanged.

use crate::models::{Signal, State};
use crate::orchestrator::SimulationError;
use crate::pipeline::block::{Block, StateUpdate, StepContext};
use std::fmt;
use thiserror::Error;

/// Where inside a block an error was raised
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// While evaluating the named policy
    Policy(String),
    /// While computing the named variable's update
    Update(String),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Policy(name) => write!(f, "policy '{}'", name),
            Stage::Update(name) => write!(f, "update of '{}'", name),
        }
    }
}

/// Error raised while executing one substep.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("block '{block}', {stage}: {source}")]
pub struct SubstepError {
    pub block: String,
    pub stage: Stage,
    #[source]
    pub source: SimulationError,
}

/// Execute `block` once and return the successor state.
///
/// # Errors
///
/// Any policy or update error aborts the substep. A non-finite update
/// result is reported as [`SimulationError::NumericDegeneracy`] and never
/// written into the state.
pub fn execute_substep<S: State, P>(
    block: &Block<S, P>,
    ctx: &mut StepContext<'_, S, P>,
    state: &S,
) -> Result<S, SubstepError> {
    let signal = collect_signal(block, ctx, state)?;

    let mut next = state.clone();
    for (key, update) in block.updates() {
        let fail = |source: SimulationError| SubstepError {
            block: block.label().to_string(),
            stage: Stage::Update(key.to_string()),
            source,
        };

        let value = match update {
            StateUpdate::Replace { default } => signal.get_or(key, *default),
            StateUpdate::Accumulate { default } => {
                let current = state.value(key).ok_or_else(|| {
                    fail(SimulationError::ConfigurationError(format!(
                        "variable '{}' is not part of the state",
                        key
                    )))
                })?;
                current + signal.get_or(key, *default)
            }
            StateUpdate::Custom(f) => f(&mut *ctx, state, &signal).map_err(fail)?,
        };

        if !value.is_finite() {
            return Err(fail(SimulationError::NumericDegeneracy {
                variable: key.to_string(),
                value,
            }));
        }

        next.set_value(key, value);
    }

    Ok(next)
}

/// Evaluate every policy of `block` in order and merge their outputs.
pub fn collect_signal<S: State, P>(
    block: &Block<S, P>,
    ctx: &mut StepContext<'_, S, P>,
    state: &S,
) -> Result<Signal<S::Key>, SubstepError> {
    let mut signal = Signal::new();
    for (name, policy) in block.policies() {
        let output = policy(&mut *ctx, state).map_err(|source| SubstepError {
            block: block.label().to_string(),
            stage: Stage::Policy(name.clone()),
            source,
        })?;
        signal.merge(output);
    }
    Ok(signal)
}
