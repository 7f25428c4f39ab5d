//! Simulation State
//!
//! A state is a flat ledger of named numeric quantities. The engine never
//! mutates a state in place: every substep clones its input, overwrites the
//! variables its block declares and hands the copy to the next substep.
//!
//! # Critical Invariants
//!
//! 1. **Schema completeness**: every variable a block updates exists in the
//!    initial state. Typed states guarantee this by construction; map-backed
//!    states are checked by [`crate::pipeline::Pipeline::validate_state`]
//!    before a run starts.
//! 2. **Finite values**: no update may write NaN or ±Inf (enforced by the
//!    substep executor).

use std::collections::BTreeMap;
use std::fmt;

/// A state record the pipeline can read and write by key.
///
/// # Example
///
/// ```rust
/// use std::collections::BTreeMap;
/// use tokenomics_simulator_core_rs::State;
///
/// let mut state: BTreeMap<String, f64> = BTreeMap::new();
/// state.insert("x".to_string(), 0.0);
///
/// state.set_value(&"x".to_string(), 5.0);
/// assert_eq!(state.value(&"x".to_string()), Some(5.0));
/// assert_eq!(state.value(&"y".to_string()), None);
/// ```
pub trait State: Clone + fmt::Debug + Send + Sync + 'static {
    /// Variable identifier
    type Key: Clone + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Current value of `key`, `None` if the schema has no such variable
    fn value(&self, key: &Self::Key) -> Option<f64>;

    /// Overwrite `key` with `value`
    fn set_value(&mut self, key: &Self::Key, value: f64);

    /// Every variable of this state, in a stable order
    fn keys(&self) -> Vec<Self::Key>;

    /// All variables rendered as a column map (used for result rows)
    fn to_columns(&self) -> BTreeMap<String, f64> {
        self.keys()
            .into_iter()
            .filter_map(|key| self.value(&key).map(|v| (key.to_string(), v)))
            .collect()
    }
}

/// Ad-hoc state keyed by variable name.
///
/// Handy for small experiments and tests where defining a typed record would
/// be overkill. `set_value` inserts, so schema completeness relies on
/// pipeline validation.
impl State for BTreeMap<String, f64> {
    type Key = String;

    fn value(&self, key: &String) -> Option<f64> {
        self.get(key).copied()
    }

    fn set_value(&mut self, key: &String, value: f64) {
        self.insert(key.clone(), value);
    }

    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).cloned().collect()
    }
}
