//! Blocks: one coherent economic subsystem per substep.
//!
//! A block holds an ordered list of named policies and an ordered list of
//! variable updates. Policies compute signals from the current state,
//! parameters and history; updates fold the merged signal into the next
//! state.

use crate::models::{Signal, State};
use crate::orchestrator::SimulationError;
use crate::rng::RngManager;
use std::fmt;

/// Everything a policy or update may read besides the current state.
///
/// The RNG is the trajectory's own stream, so two runs with the same seed
/// draw identical values in identical order.
pub struct StepContext<'a, S, P> {
    /// Parameters of the running configuration (read-only)
    pub params: &'a P,

    /// Timestep being computed (1-based; 0 is the initial state)
    pub timestep: usize,

    /// Substep index within the timestep (1-based, pipeline order)
    pub substep: usize,

    /// Final states of every completed timestep, initial state first
    pub history: &'a [S],

    rng: &'a mut RngManager,
}

impl<'a, S, P> StepContext<'a, S, P> {
    pub fn new(
        params: &'a P,
        timestep: usize,
        substep: usize,
        history: &'a [S],
        rng: &'a mut RngManager,
    ) -> Self {
        Self {
            params,
            timestep,
            substep,
            history,
            rng,
        }
    }

    /// The trajectory's random stream
    pub fn rng(&mut self) -> &mut RngManager {
        &mut *self.rng
    }

    /// State at the end of the previous timestep
    pub fn previous_state(&self) -> Option<&S> {
        self.history.last()
    }
}

/// Policy function: `(context, current_state) -> signal`.
pub type PolicyFn<S, P> = Box<
    dyn Fn(&mut StepContext<'_, S, P>, &S) -> Result<Signal<<S as State>::Key>, SimulationError>
        + Send
        + Sync,
>;

/// Custom update function: `(context, current_state, signal) -> new value`.
pub type UpdateFn<S, P> = Box<
    dyn Fn(&mut StepContext<'_, S, P>, &S, &Signal<<S as State>::Key>) -> Result<f64, SimulationError>
        + Send
        + Sync,
>;

/// How a block turns the merged signal into a variable's next value.
pub enum StateUpdate<S: State, P> {
    /// `next = signal.get(var, default)`, ignoring the current value
    Replace { default: f64 },

    /// `next = current + signal.get(var, default)`
    Accumulate { default: f64 },

    /// Arbitrary function of context, current state and signal
    Custom(UpdateFn<S, P>),
}

impl<S: State, P> StateUpdate<S, P> {
    /// Short kind name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            StateUpdate::Replace { .. } => "replace",
            StateUpdate::Accumulate { .. } => "accumulate",
            StateUpdate::Custom(_) => "custom",
        }
    }
}

impl<S: State, P> fmt::Debug for StateUpdate<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateUpdate::Replace { default } => write!(f, "Replace({})", default),
            StateUpdate::Accumulate { default } => write!(f, "Accumulate({})", default),
            StateUpdate::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Named, ordered set of policies plus ordered set of variable updates.
///
/// # Example
///
/// ```rust
/// use std::collections::BTreeMap;
/// use tokenomics_simulator_core_rs::pipeline::Block;
/// use tokenomics_simulator_core_rs::Signal;
///
/// let block = Block::<BTreeMap<String, f64>, ()>::new("Constant")
///     .policy("five", |_ctx, _state| Ok(Signal::from_pairs([("x".to_string(), 5.0)])))
///     .replace("x".to_string());
///
/// assert_eq!(block.label(), "Constant");
/// assert_eq!(block.policies().len(), 1);
/// ```
pub struct Block<S: State, P> {
    label: String,
    policies: Vec<(String, PolicyFn<S, P>)>,
    updates: Vec<(S::Key, StateUpdate<S, P>)>,
}

impl<S: State, P> Block<S, P> {
    /// Create an empty block
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            policies: Vec::new(),
            updates: Vec::new(),
        }
    }

    /// Append a policy; execution follows insertion order
    pub fn policy<F>(mut self, name: impl Into<String>, policy: F) -> Self
    where
        F: Fn(&mut StepContext<'_, S, P>, &S) -> Result<Signal<S::Key>, SimulationError>
            + Send
            + Sync
            + 'static,
    {
        self.policies.push((name.into(), Box::new(policy)));
        self
    }

    /// Declare `key` as replaced by its signal value (default 0.0)
    pub fn replace(self, key: S::Key) -> Self {
        self.replace_or(key, 0.0)
    }

    /// Declare `key` as replaced, falling back to `default` when unsignalled
    pub fn replace_or(self, key: S::Key, default: f64) -> Self {
        self.update(key, StateUpdate::Replace { default })
    }

    /// Declare `key` as accumulating its signal value (default 0.0)
    pub fn accumulate(self, key: S::Key) -> Self {
        self.update(key, StateUpdate::Accumulate { default: 0.0 })
    }

    /// Declare `key` as computed by a custom update function
    pub fn update_with<F>(self, key: S::Key, update: F) -> Self
    where
        F: Fn(&mut StepContext<'_, S, P>, &S, &Signal<S::Key>) -> Result<f64, SimulationError>
            + Send
            + Sync
            + 'static,
    {
        self.update(key, StateUpdate::Custom(Box::new(update)))
    }

    /// Declare an update of any kind
    pub fn update(mut self, key: S::Key, update: StateUpdate<S, P>) -> Self {
        self.updates.push((key, update));
        self
    }

    /// Block label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Policies in execution order
    pub fn policies(&self) -> &[(String, PolicyFn<S, P>)] {
        &self.policies
    }

    /// Updates in execution order
    pub fn updates(&self) -> &[(S::Key, StateUpdate<S, P>)] {
        &self.updates
    }
}

impl<S: State, P> fmt::Debug for Block<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let policy_names: Vec<&str> = self.policies.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("Block")
            .field("label", &self.label)
            .field("policies", &policy_names)
            .field("updates", &self.updates)
            .finish()
    }
}
