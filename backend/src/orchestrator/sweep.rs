//! Sweep expansion: parameter overrides into concrete configurations.
//!
//! # Forms
//!
//! ```text
//! Cartesian  [("a", [1, 2]), ("b", [10, 20])]  ->  (1,10) (1,20) (2,10) (2,20)
//! Zipped     {"a": [1, 2], "b": [10]}           ->  (1,10) (2,10)
//! Explicit   [{"a": 1, "b": 20}, {"a": 2}]      ->  as listed
//! ```
//!
//! The first Cartesian parameter is the outermost loop. Overrides are
//! applied by field name onto the serialized base parameters, so any serde
//! field can be swept, including strategy enums.

use crate::orchestrator::fingerprint::compute_config_hash;
use crate::orchestrator::SimulationError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field name -> replacement value
pub type Overrides = BTreeMap<String, Value>;

/// How to derive configurations from a base parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SweepSpec {
    /// Cartesian product of per-parameter value lists
    Cartesian { parameters: Vec<(String, Vec<Value>)> },

    /// Element-wise pairing of value lists; length-1 lists broadcast
    Zipped { parameters: BTreeMap<String, Vec<Value>> },

    /// Fully specified override dictionaries, one per configuration
    Explicit { overrides: Vec<Overrides> },
}

impl SweepSpec {
    /// Single configuration equal to the base parameters
    pub fn baseline() -> Self {
        SweepSpec::Explicit {
            overrides: vec![Overrides::new()],
        }
    }

    /// Cartesian sweep from `(name, values)` pairs
    pub fn cartesian<I, K>(parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<Value>)>,
        K: Into<String>,
    {
        SweepSpec::Cartesian {
            parameters: parameters.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Expand into one override dictionary per configuration.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` for an empty value list or, in the zipped form,
    /// lists of mismatched length.
    pub fn expand(&self) -> Result<Vec<Overrides>, SimulationError> {
        match self {
            SweepSpec::Cartesian { parameters } => expand_cartesian(parameters),
            SweepSpec::Zipped { parameters } => expand_zipped(parameters),
            SweepSpec::Explicit { overrides } => Ok(overrides.clone()),
        }
    }
}

impl Default for SweepSpec {
    fn default() -> Self {
        Self::baseline()
    }
}

fn expand_cartesian(parameters: &[(String, Vec<Value>)]) -> Result<Vec<Overrides>, SimulationError> {
    let mut configurations = vec![Overrides::new()];

    for (name, values) in parameters {
        if values.is_empty() {
            return Err(SimulationError::ConfigurationError(format!(
                "sweep parameter '{}' has no values",
                name
            )));
        }

        let mut next = Vec::with_capacity(configurations.len() * values.len());
        for partial in &configurations {
            for value in values {
                let mut overrides = partial.clone();
                overrides.insert(name.clone(), value.clone());
                next.push(overrides);
            }
        }
        configurations = next;
    }

    Ok(configurations)
}

fn expand_zipped(parameters: &BTreeMap<String, Vec<Value>>) -> Result<Vec<Overrides>, SimulationError> {
    let mut length = 1;
    for (name, values) in parameters {
        match values.len() {
            0 => {
                return Err(SimulationError::ConfigurationError(format!(
                    "sweep parameter '{}' has no values",
                    name
                )))
            }
            1 => {}
            n if length == 1 => length = n,
            n if n != length => {
                return Err(SimulationError::ConfigurationError(format!(
                    "sweep parameter '{}' has {} values, expected {} (or 1)",
                    name, n, length
                )))
            }
            _ => {}
        }
    }

    Ok((0..length)
        .map(|i| {
            parameters
                .iter()
                .map(|(name, values)| {
                    let value = if values.len() == 1 { &values[0] } else { &values[i] };
                    (name.clone(), value.clone())
                })
                .collect()
        })
        .collect())
}

/// Apply `overrides` to `base` by field name.
///
/// # Errors
///
/// `ConfigurationError` for an unknown field or a value of the wrong
/// shape; `SerializationError` if `base` does not serialize to an object.
pub fn apply_overrides<P>(base: &P, overrides: &Overrides) -> Result<P, SimulationError>
where
    P: Serialize + DeserializeOwned,
{
    let mut value = serde_json::to_value(base).map_err(|e| {
        SimulationError::SerializationError(format!("parameter serialization failed: {}", e))
    })?;

    let fields = value.as_object_mut().ok_or_else(|| {
        SimulationError::SerializationError("parameters must serialize to an object".to_string())
    })?;

    for (name, replacement) in overrides {
        match fields.get_mut(name) {
            Some(slot) => *slot = replacement.clone(),
            None => {
                return Err(SimulationError::ConfigurationError(format!(
                    "unknown parameter '{}'",
                    name
                )))
            }
        }
    }

    serde_json::from_value(value).map_err(|e| {
        SimulationError::ConfigurationError(format!("invalid parameter override: {}", e))
    })
}

/// One concrete parameter set of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration<P> {
    /// Position in the expanded sweep
    pub index: usize,

    /// Overrides this configuration was built from
    pub overrides: Overrides,

    pub params: P,

    /// SHA-256 of the canonical JSON of `params`
    pub fingerprint: String,
}

/// Expand `spec` against `base` into validated configurations.
pub fn build_configurations<P>(base: &P, spec: &SweepSpec) -> Result<Vec<Configuration<P>>, SimulationError>
where
    P: Serialize + DeserializeOwned,
{
    spec.expand()?
        .into_iter()
        .enumerate()
        .map(|(index, overrides)| {
            let params = apply_overrides(base, &overrides)?;
            let fingerprint = compute_config_hash(&params)?;
            Ok(Configuration {
                index,
                overrides,
                params,
                fingerprint,
            })
        })
        .collect()
}
