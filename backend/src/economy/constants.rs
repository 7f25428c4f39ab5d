//! Protocol constants of the storage chain.
//!
//! Sizes are in bytes, balances in credits.

pub use crate::core::DAY_TO_SECONDS;

pub const KIB: f64 = 1024.0;
pub const MIB: f64 = 1024.0 * KIB;
pub const GIB: f64 = 1024.0 * MIB;
pub const TIB: f64 = 1024.0 * GIB;

/// Size of one pledged sector
pub const SECTOR_SIZE: f64 = GIB;

/// Raw bytes moved out of the archival buffer per archived segment
pub const SEGMENT_SIZE: f64 = 128.0 * MIB;

/// History bytes produced per archived segment (erasure coded, so 2x)
pub const SEGMENT_HISTORY_SIZE: f64 = 256.0 * MIB;

/// Smallest unit of the credit token
pub const SHANNON_IN_CREDITS: f64 = 1e-18;

/// Hard cap on credits ever issued
pub const MAX_CREDIT_ISSUANCE: f64 = 3e9;

/// Average block time of the reference network
pub const DEFAULT_BLOCK_TIME_IN_SECONDS: f64 = 6.0;

/// Blocks produced in one year at the default block time
pub const BLOCKS_PER_YEAR: f64 = 365.0 * DAY_TO_SECONDS / DEFAULT_BLOCK_TIME_IN_SECONDS;

// Genesis split of the maximum supply
pub const GENESIS_REWARD_ISSUANCE_SHARE: f64 = 0.44;
pub const GENESIS_OTHER_ISSUANCE_SHARE: f64 = 0.49;
pub const GENESIS_FUND_SHARE: f64 = 0.07;
