//! Economy parameters and behavior strategies.
//!
//! Parameters are plain serde data. Behavior that varies between scenarios
//! (issuance rule, stochastic generators, credit supply definition, subsidy
//! components, vesting schedule) is expressed as tagged enums or structs, so
//! a sweep can swap a whole strategy by overriding a single field:
//!
//! ```rust
//! use serde_json::json;
//! use tokenomics_simulator_core_rs::economy::{EconomyParams, IssuanceFunction};
//! use tokenomics_simulator_core_rs::orchestrator::{apply_overrides, Overrides};
//!
//! let overrides = Overrides::from([(
//!     "issuance_function".to_string(),
//!     json!({ "kind": "constant", "per_day": 1000.0 }),
//! )]);
//! let params = apply_overrides(&EconomyParams::default(), &overrides).unwrap();
//! assert_eq!(params.issuance_function, IssuanceFunction::Constant { per_day: 1000.0 });
//! ```

use crate::economy::constants::{
    BLOCKS_PER_YEAR, DEFAULT_BLOCK_TIME_IN_SECONDS, KIB, MAX_CREDIT_ISSUANCE, MIB, SEGMENT_SIZE,
    TIB,
};
use crate::economy::state::EconomyState;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

// ============================================================================
// Strategies
// ============================================================================

/// Generator of one environmental quantity per timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StochasticFunction {
    /// Always `value`; consumes no randomness
    Constant { value: f64 },

    /// Gaussian draw
    Normal { mean: f64, std_dev: f64 },

    /// Poisson count with rate `lambda`
    Poisson { lambda: f64 },

    /// Uniform draw in `[low, high)`
    Uniform { low: f64, high: f64 },

    /// Deterministic ramp from `start` to `end` over `over_days`, flat after
    LinearGrowth { start: f64, end: f64, over_days: f64 },
}

impl StochasticFunction {
    /// Draw a value for a timestep starting at `days_passed`.
    pub fn sample(&self, rng: &mut RngManager, days_passed: f64) -> f64 {
        match self {
            StochasticFunction::Constant { value } => *value,
            StochasticFunction::Normal { mean, std_dev } => rng.gaussian(*mean, *std_dev),
            StochasticFunction::Poisson { lambda } => rng.poisson(*lambda) as f64,
            StochasticFunction::Uniform { low, high } => low + (high - low) * rng.next_f64(),
            StochasticFunction::LinearGrowth {
                start,
                end,
                over_days,
            } => {
                let progress = if *over_days > 0.0 {
                    (days_passed / over_days).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                start + (end - start) * progress
            }
        }
    }
}

/// How much the protocol issues to farmers in one timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssuanceFunction {
    /// Fixed amount per day
    Constant { per_day: f64 },

    /// Multiple of the reference subsidy accrued this timestep
    ScaledReferenceSubsidy { constant: f64 },

    /// Fraction of the remaining reward reserve per day
    ShareOfRemaining { daily_share: f64 },
}

impl IssuanceFunction {
    /// Issuance over the timestep `state` describes, before the reserve cap.
    pub fn issuance(&self, state: &EconomyState) -> f64 {
        match self {
            IssuanceFunction::Constant { per_day } => per_day * state.delta_days,
            IssuanceFunction::ScaledReferenceSubsidy { constant } => constant * state.reference_subsidy,
            IssuanceFunction::ShareOfRemaining { daily_share } => {
                let kept = (1.0 - daily_share.clamp(0.0, 1.0)).powf(state.delta_days);
                state.reward_issuance_balance * (1.0 - kept)
            }
        }
    }
}

/// Definition of "credit supply" used to price storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditSupply {
    Issued,
    Earned,
    EarnedMinusBurned,
    Total,
}

impl CreditSupply {
    pub fn of(&self, state: &EconomyState) -> f64 {
        match self {
            CreditSupply::Issued => state.issued(),
            CreditSupply::Earned => state.earned(),
            CreditSupply::EarnedMinusBurned => state.earned_minus_burned(),
            CreditSupply::Total => state.total(),
        }
    }
}

/// One term of the reference subsidy, evaluated per block.
///
/// Pays `max_reward_per_block` for `initial_period_duration` blocks from
/// `initial_period_start`, then decays exponentially so the cumulative
/// payout approaches `max_cumulative_subsidy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidyComponent {
    pub initial_period_start: f64,
    pub initial_period_duration: f64,
    pub max_cumulative_subsidy: f64,
    pub max_reward_per_block: f64,
}

impl SubsidyComponent {
    /// Reward of this component at block `t`
    pub fn reward_at(&self, t: f64) -> f64 {
        let start = self.initial_period_start;
        let duration = self.initial_period_duration;
        let peak = self.max_reward_per_block;

        if t < start {
            0.0
        } else if t < start + duration {
            peak
        } else {
            let remaining = self.max_cumulative_subsidy - duration * peak;
            if remaining <= 0.0 {
                return 0.0;
            }
            peak * (-peak / remaining * (t - start - duration)).exp()
        }
    }
}

/// A vested allocation: nothing before the cliff, `cliff_fraction` at the
/// cliff, the rest linearly over `linear_days`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VestingTranche {
    /// Share of the maximum credit supply
    pub share_of_supply: f64,
    pub cliff_days: f64,
    pub cliff_fraction: f64,
    pub linear_days: f64,
}

impl VestingTranche {
    /// Fraction of the tranche released after `days_passed`
    pub fn vested_fraction(&self, days_passed: f64) -> f64 {
        if days_passed < self.cliff_days {
            return 0.0;
        }
        let linear = if self.linear_days > 0.0 {
            ((days_passed - self.cliff_days) / self.linear_days).min(1.0)
        } else {
            1.0
        };
        self.cliff_fraction + (1.0 - self.cliff_fraction) * linear
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Immutable configuration of one economy run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyParams {
    pub label: String,
    pub environmental_label: String,

    // Time
    pub timestep_in_days: f64,
    pub block_time_in_seconds: f64,

    // Supply
    pub max_credit_supply: f64,
    pub issuance_function: IssuanceFunction,
    pub reference_subsidy_components: Vec<SubsidyComponent>,
    pub vesting_schedule: Vec<VestingTranche>,
    /// Fraction of the fund disbursed to farmers per day
    pub fund_disbursal_per_day: f64,

    // Reward split
    pub reward_proposer_share: f64,
    pub fund_tax_on_proposer_reward: f64,

    // Storage
    pub initial_space_pledged: f64,
    pub min_replication_factor: f64,
    pub header_size: f64,
    pub archival_buffer_segment_size: f64,
    pub max_block_size: f64,
    pub credit_supply_definition: CreditSupply,
    pub fund_tax_on_storage_fees: f64,

    // Compute
    pub weight_to_fee: f64,
    pub target_block_fullness: f64,
    pub adjustment_variable: f64,
    pub min_compute_weights_per_tx: f64,
    pub min_compute_weights_per_bundle: f64,
    pub min_transaction_size: f64,

    // Environment
    pub priority_fee_function: StochasticFunction,
    pub compute_weights_per_tx_function: StochasticFunction,
    pub compute_weight_per_bundle_function: StochasticFunction,
    pub transaction_size_function: StochasticFunction,
    pub transaction_count_per_day_function: StochasticFunction,
    pub bundle_count_per_day_function: StochasticFunction,
    pub new_sectors_per_day_function: StochasticFunction,

    // Slashing
    pub slash_per_day_function: StochasticFunction,
    pub slash_amount: f64,
    pub slash_to_fund: f64,
    pub slash_to_holders: f64,

    // Behavior
    pub operator_stake_per_ts_function: StochasticFunction,
    pub nominator_stake_per_ts_function: StochasticFunction,
    pub transfer_farmer_to_holder_per_day_function: StochasticFunction,
    pub transfer_operator_to_holder_per_day_function: StochasticFunction,
    pub transfer_holder_to_nominator_per_day_function: StochasticFunction,
    pub transfer_holder_to_operator_per_day_function: StochasticFunction,
}

impl Default for EconomyParams {
    /// Deterministic baseline: every generator is a constant.
    fn default() -> Self {
        let yearly_subsidy = 0.1 * MAX_CREDIT_ISSUANCE;
        Self {
            label: "default".to_string(),
            environmental_label: "constant".to_string(),

            timestep_in_days: 1.0,
            block_time_in_seconds: DEFAULT_BLOCK_TIME_IN_SECONDS,

            max_credit_supply: MAX_CREDIT_ISSUANCE,
            issuance_function: IssuanceFunction::ScaledReferenceSubsidy { constant: 1.0 },
            reference_subsidy_components: vec![SubsidyComponent {
                initial_period_start: 0.0,
                initial_period_duration: BLOCKS_PER_YEAR,
                max_cumulative_subsidy: yearly_subsidy,
                max_reward_per_block: yearly_subsidy / BLOCKS_PER_YEAR / 2.0,
            }],
            vesting_schedule: vec![
                VestingTranche {
                    share_of_supply: 0.22,
                    cliff_days: 365.0,
                    cliff_fraction: 0.25,
                    linear_days: 730.0,
                },
                VestingTranche {
                    share_of_supply: 0.08,
                    cliff_days: 365.0,
                    cliff_fraction: 0.25,
                    linear_days: 1460.0,
                },
            ],
            fund_disbursal_per_day: 0.0005,

            reward_proposer_share: 0.2,
            fund_tax_on_proposer_reward: 0.1,

            initial_space_pledged: 100.0 * TIB,
            min_replication_factor: 10.0,
            header_size: 4.0 * KIB,
            archival_buffer_segment_size: SEGMENT_SIZE,
            max_block_size: 3.75 * MIB,
            credit_supply_definition: CreditSupply::Total,
            fund_tax_on_storage_fees: 0.1,

            weight_to_fee: 1e-9,
            target_block_fullness: 0.25,
            adjustment_variable: 0.00004,
            min_compute_weights_per_tx: 1e7,
            min_compute_weights_per_bundle: 1e8,
            min_transaction_size: 256.0,

            priority_fee_function: StochasticFunction::Constant { value: 0.0 },
            compute_weights_per_tx_function: StochasticFunction::Constant { value: 2e8 },
            compute_weight_per_bundle_function: StochasticFunction::Constant { value: 1e9 },
            transaction_size_function: StochasticFunction::Constant { value: 512.0 },
            transaction_count_per_day_function: StochasticFunction::Constant { value: 100_000.0 },
            bundle_count_per_day_function: StochasticFunction::Constant { value: 14_400.0 },
            new_sectors_per_day_function: StochasticFunction::Constant { value: 1_000.0 },

            slash_per_day_function: StochasticFunction::Constant { value: 0.0 },
            slash_amount: 1_000.0,
            slash_to_fund: 0.0,
            slash_to_holders: 0.05,

            operator_stake_per_ts_function: StochasticFunction::Constant { value: 0.01 },
            nominator_stake_per_ts_function: StochasticFunction::Constant { value: 0.01 },
            transfer_farmer_to_holder_per_day_function: StochasticFunction::Constant { value: 0.1 },
            transfer_operator_to_holder_per_day_function: StochasticFunction::Constant { value: 0.1 },
            transfer_holder_to_nominator_per_day_function: StochasticFunction::Constant { value: 0.01 },
            transfer_holder_to_operator_per_day_function: StochasticFunction::Constant { value: 0.01 },
        }
    }
}

impl EconomyParams {
    /// Baseline economy driven by stochastic environment and behavior.
    pub fn stochastic() -> Self {
        Self {
            environmental_label: "stochastic".to_string(),
            priority_fee_function: StochasticFunction::Normal {
                mean: 1e-6,
                std_dev: 5e-7,
            },
            compute_weights_per_tx_function: StochasticFunction::Normal {
                mean: 2e8,
                std_dev: 5e7,
            },
            compute_weight_per_bundle_function: StochasticFunction::Normal {
                mean: 1e9,
                std_dev: 2e8,
            },
            transaction_size_function: StochasticFunction::Normal {
                mean: 512.0,
                std_dev: 128.0,
            },
            transaction_count_per_day_function: StochasticFunction::Poisson { lambda: 100_000.0 },
            bundle_count_per_day_function: StochasticFunction::Poisson { lambda: 14_400.0 },
            new_sectors_per_day_function: StochasticFunction::Poisson { lambda: 1_000.0 },
            slash_per_day_function: StochasticFunction::Poisson { lambda: 0.1 },
            slash_amount: 10.0,
            // operators keep staking so slashes stay within their leg
            operator_stake_per_ts_function: StochasticFunction::Normal {
                mean: 0.01,
                std_dev: 0.005,
            },
            nominator_stake_per_ts_function: StochasticFunction::Normal {
                mean: 0.01,
                std_dev: 0.02,
            },
            transfer_farmer_to_holder_per_day_function: StochasticFunction::Uniform {
                low: 0.05,
                high: 0.15,
            },
            transfer_operator_to_holder_per_day_function: StochasticFunction::Uniform {
                low: 0.05,
                high: 0.15,
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constant_consumes_no_randomness() {
        let mut rng = RngManager::new(7);
        let before = rng.get_state();
        assert_eq!(StochasticFunction::Constant { value: 3.0 }.sample(&mut rng, 0.0), 3.0);
        assert_eq!(rng.get_state(), before);
    }

    #[test]
    fn test_linear_growth_ramps_then_flattens() {
        let ramp = StochasticFunction::LinearGrowth {
            start: 10.0,
            end: 20.0,
            over_days: 100.0,
        };
        let mut rng = RngManager::new(1);
        assert_eq!(ramp.sample(&mut rng, 0.0), 10.0);
        assert_eq!(ramp.sample(&mut rng, 50.0), 15.0);
        assert_eq!(ramp.sample(&mut rng, 500.0), 20.0);
    }

    #[test]
    fn test_uniform_stays_in_range() {
        let uniform = StochasticFunction::Uniform { low: 2.0, high: 3.0 };
        let mut rng = RngManager::new(11);
        for _ in 0..1000 {
            let x = uniform.sample(&mut rng, 0.0);
            assert!((2.0..3.0).contains(&x));
        }
    }

    #[test]
    fn test_subsidy_component_phases() {
        let component = SubsidyComponent {
            initial_period_start: 10.0,
            initial_period_duration: 100.0,
            max_cumulative_subsidy: 2_000.0,
            max_reward_per_block: 10.0,
        };
        assert_eq!(component.reward_at(5.0), 0.0);
        assert_eq!(component.reward_at(10.0), 10.0);
        assert_eq!(component.reward_at(109.0), 10.0);
        // decay rate 10 / (2000 - 1000) = 0.01
        assert_eq!(component.reward_at(110.0), 10.0);
        let expected = 10.0 * (-0.01_f64 * 100.0).exp();
        assert!((component.reward_at(210.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_subsidy_component_without_tail_budget_stops() {
        // cumulative budget exhausted by the initial period
        let component = SubsidyComponent {
            initial_period_start: 0.0,
            initial_period_duration: 100.0,
            max_cumulative_subsidy: 1_000.0,
            max_reward_per_block: 10.0,
        };
        assert_eq!(component.reward_at(99.0), 10.0);
        assert_eq!(component.reward_at(100.0), 0.0);
    }

    #[test]
    fn test_vesting_tranche() {
        let tranche = VestingTranche {
            share_of_supply: 0.22,
            cliff_days: 365.0,
            cliff_fraction: 0.25,
            linear_days: 730.0,
        };
        assert_eq!(tranche.vested_fraction(364.0), 0.0);
        assert_eq!(tranche.vested_fraction(365.0), 0.25);
        assert_eq!(tranche.vested_fraction(365.0 + 365.0), 0.625);
        assert_eq!(tranche.vested_fraction(10_000.0), 1.0);
    }

    #[test]
    fn test_issuance_functions() {
        let state = EconomyState {
            delta_days: 2.0,
            reference_subsidy: 300.0,
            reward_issuance_balance: 1_000.0,
            ..EconomyState::default()
        };
        assert_eq!(IssuanceFunction::Constant { per_day: 5.0 }.issuance(&state), 10.0);
        assert_eq!(
            IssuanceFunction::ScaledReferenceSubsidy { constant: 0.5 }.issuance(&state),
            150.0
        );
        let share = IssuanceFunction::ShareOfRemaining { daily_share: 0.5 }.issuance(&state);
        assert!((share - 750.0).abs() < 1e-9);
    }

    #[test]
    fn test_strategy_serde_tags() {
        let f: StochasticFunction =
            serde_json::from_value(json!({ "kind": "poisson", "lambda": 3.0 })).unwrap();
        assert_eq!(f, StochasticFunction::Poisson { lambda: 3.0 });

        let supply: CreditSupply = serde_json::from_value(json!("earned_minus_burned")).unwrap();
        assert_eq!(supply, CreditSupply::EarnedMinusBurned);
    }

    #[test]
    fn test_params_round_trip_through_json() {
        let params = EconomyParams::stochastic();
        let value = serde_json::to_value(&params).unwrap();
        let back: EconomyParams = serde_json::from_value(value).unwrap();
        assert_eq!(back.environmental_label, "stochastic");
        assert_eq!(back.transaction_count_per_day_function, params.transaction_count_per_day_function);
        assert_eq!(back.vesting_schedule, params.vesting_schedule);
        assert_eq!(back.credit_supply_definition, CreditSupply::Total);
    }
}
