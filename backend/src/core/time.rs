//! Time scale for the simulation
//!
//! The simulation advances in discrete timesteps measured in days. The chain
//! underneath produces blocks at a fixed average block time, so one timestep
//! may span a fractional or multi-block interval. This module converts
//! between the two clocks deterministically.

use crate::orchestrator::SimulationError;
use std::ops::Range;

/// Seconds in one day.
pub const DAY_TO_SECONDS: f64 = 24.0 * 60.0 * 60.0;

/// Converts timestep durations (days) into elapsed blocks.
///
/// # Example
/// ```
/// use tokenomics_simulator_core_rs::TimeScale;
///
/// let scale = TimeScale::new(1.0, 6.0).unwrap(); // 1-day steps, 6 s blocks
/// assert_eq!(scale.delta_blocks(), 14_400.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    /// Length of one timestep in days
    timestep_in_days: f64,
    /// Average block time in seconds
    block_time_in_seconds: f64,
}

impl TimeScale {
    /// Create a new TimeScale
    ///
    /// # Errors
    /// `ConfigurationError` unless both durations are finite and positive.
    pub fn new(timestep_in_days: f64, block_time_in_seconds: f64) -> Result<Self, SimulationError> {
        if !(timestep_in_days.is_finite() && timestep_in_days > 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "timestep_in_days must be positive, got {}",
                timestep_in_days
            )));
        }
        if !(block_time_in_seconds.is_finite() && block_time_in_seconds > 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "block_time_in_seconds must be positive, got {}",
                block_time_in_seconds
            )));
        }
        Ok(Self {
            timestep_in_days,
            block_time_in_seconds,
        })
    }

    /// Days elapsed per timestep
    pub fn delta_days(&self) -> f64 {
        self.timestep_in_days
    }

    /// Seconds elapsed per timestep
    pub fn delta_seconds(&self) -> f64 {
        self.timestep_in_days * DAY_TO_SECONDS
    }

    /// Blocks produced per timestep (may be fractional)
    pub fn delta_blocks(&self) -> f64 {
        self.delta_seconds() / self.block_time_in_seconds
    }

    /// Average block time in seconds
    pub fn block_time_in_seconds(&self) -> f64 {
        self.block_time_in_seconds
    }

    /// Whole block heights crossed when the cumulative block count moves from
    /// `previous` to `current`.
    ///
    /// The range is `floor(previous)..floor(current)`, so a timestep that
    /// stays inside one block yields an empty range and a timestep spanning
    /// many blocks yields each height exactly once.
    ///
    /// # Example
    /// ```
    /// use tokenomics_simulator_core_rs::TimeScale;
    ///
    /// assert_eq!(TimeScale::blocks_crossed(0.5, 3.2), 0..3);
    /// assert!(TimeScale::blocks_crossed(3.2, 3.9).is_empty());
    /// ```
    pub fn blocks_crossed(previous: f64, current: f64) -> Range<u64> {
        let start = previous.max(0.0).floor() as u64;
        let end = current.max(0.0).floor() as u64;
        start..end.max(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_timestep_rejected() {
        let result = TimeScale::new(0.0, 6.0);
        assert!(matches!(result, Err(SimulationError::ConfigurationError(_))));
    }

    #[test]
    fn test_negative_block_time_rejected() {
        let result = TimeScale::new(1.0, -6.0);
        assert!(matches!(result, Err(SimulationError::ConfigurationError(_))));
    }

    #[test]
    fn test_fractional_timestep_blocks() {
        let scale = TimeScale::new(0.5, 6.0).unwrap();
        assert_eq!(scale.delta_seconds(), 43_200.0);
        assert_eq!(scale.delta_blocks(), 7_200.0);
    }

    #[test]
    fn test_blocks_crossed_never_runs_backwards() {
        assert!(TimeScale::blocks_crossed(5.0, 2.0).is_empty());
        assert_eq!(TimeScale::blocks_crossed(2.0, 5.0), 2..5);
    }
}
