//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! CRITICAL: Every stochastic policy and state update draws from the
//! `RngManager` owned by its trajectory. Nothing reads ambient randomness.

mod xorshift;

pub use xorshift::RngManager;
