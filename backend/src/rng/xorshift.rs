//! xorshift64* random number generator
//!
//! This is a fast, high-quality PRNG that is deterministic and suitable
//! for simulation purposes.
//!
//! # Algorithm
//!
//! xorshift64* is a variant of xorshift that passes TestU01's BigCrush
//! statistical tests. It uses 64-bit state and produces 64-bit output.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. Each (configuration, sample)
//! pair of a sweep owns one generator seeded from its indices, so a sample
//! can be replayed in isolation.

use serde::{Deserialize, Serialize};

/// Above this rate the Poisson sampler switches to a normal approximation.
const POISSON_NORMAL_THRESHOLD: f64 = 30.0;

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use tokenomics_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let range_value = rng.range(0, 100); // [0, 100)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// # Example
    /// ```
    /// use tokenomics_simulator_core_rs::RngManager;
    ///
    /// let rng = RngManager::new(12345);
    /// ```
    pub fn new(seed: u64) -> Self {
        // Ensure seed is never zero (xorshift requirement)
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Get current RNG state (for replay)
    ///
    /// # Example
    /// ```
    /// use tokenomics_simulator_core_rs::RngManager;
    ///
    /// let rng = RngManager::new(12345);
    /// let state = rng.get_state();
    ///
    /// // Later, can recreate RNG from this state
    /// let rng2 = RngManager::new(state);
    /// ```
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    ///
    /// # Example
    /// ```
    /// use tokenomics_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let probability = rng.next_f64();
    /// assert!(probability >= 0.0 && probability < 1.0);
    /// ```
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Convert to [0.0, 1.0) by dividing by 2^53
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Sample from N(0, 1) using the Box-Muller transform.
    pub fn standard_normal(&mut self) -> f64 {
        // 1 - u keeps the logarithm argument in (0, 1]
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f64::consts::PI * u2;
        r * theta.cos()
    }

    /// Sample from N(mean, std_dev²).
    ///
    /// A non-positive `std_dev` degenerates to `mean` without consuming
    /// randomness.
    pub fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev <= 0.0 {
            return mean;
        }
        mean + std_dev * self.standard_normal()
    }

    /// Sample a Poisson-distributed count with rate `lambda`.
    ///
    /// Knuth's multiplication method for small rates, rounded normal
    /// approximation above 30. Non-positive rates yield 0.
    pub fn poisson(&mut self, lambda: f64) -> u64 {
        if !(lambda > 0.0) {
            return 0;
        }

        if lambda > POISSON_NORMAL_THRESHOLD {
            let sample = self.gaussian(lambda, lambda.sqrt()).round();
            return sample.max(0.0) as u64;
        }

        let limit = (-lambda).exp();
        let mut count = 0u64;
        let mut product = 1.0;
        loop {
            product *= self.next_f64();
            if product <= limit {
                return count;
            }
            count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seed_converted_to_nonzero() {
        let rng = RngManager::new(0);
        assert_ne!(rng.get_state(), 0, "Zero seed should be converted to 1");
    }

    #[test]
    #[should_panic(expected = "min must be less than max")]
    fn test_range_invalid_bounds() {
        let mut rng = RngManager::new(12345);
        rng.range(100, 50);
    }

    #[test]
    fn test_next_f64_in_range() {
        let mut rng = RngManager::new(12345);

        for _ in 0..1000 {
            let val = rng.next_f64();
            assert!(
                (0.0..1.0).contains(&val),
                "next_f64() produced value {} outside [0.0, 1.0)",
                val
            );
        }
    }

    #[test]
    fn test_gaussian_degenerate_std_dev_returns_mean() {
        let mut rng = RngManager::new(7);
        let before = rng.get_state();
        assert_eq!(rng.gaussian(3.5, 0.0), 3.5);
        assert_eq!(rng.get_state(), before, "degenerate draw must not advance state");
    }

    #[test]
    fn test_gaussian_sample_mean_close_to_mean() {
        let mut rng = RngManager::new(2024);
        let n = 20_000;
        let total: f64 = (0..n).map(|_| rng.gaussian(10.0, 2.0)).sum();
        let mean = total / n as f64;
        assert!((mean - 10.0).abs() < 0.1, "sample mean {} too far from 10", mean);
    }

    #[test]
    fn test_poisson_non_positive_rate_is_zero() {
        let mut rng = RngManager::new(1);
        assert_eq!(rng.poisson(0.0), 0);
        assert_eq!(rng.poisson(-4.0), 0);
        assert_eq!(rng.poisson(f64::NAN), 0);
    }

    #[test]
    fn test_poisson_sample_mean_close_to_rate() {
        let mut rng = RngManager::new(99);
        for &lambda in &[0.5, 4.0, 120.0] {
            let n = 20_000;
            let total: u64 = (0..n).map(|_| rng.poisson(lambda)).sum();
            let mean = total as f64 / n as f64;
            assert!(
                (mean - lambda).abs() < 0.05 * lambda.max(1.0),
                "Poisson({}) sample mean {} out of tolerance",
                lambda,
                mean
            );
        }
    }
}
