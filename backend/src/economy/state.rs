//! Typed economy state.
//!
//! Every variable of the token economy is a field of [`EconomyState`] and a
//! variant of [`StateVar`], both generated from one list so they cannot
//! drift apart. A variable therefore always exists and always has a value;
//! there are no runtime key lookups that can miss.
//!
//! # Stocks
//!
//! The nine balances below hold every credit in existence. Flows move
//! credits between them (or into `burnt_balance`), so their sum is constant
//! over a run:
//!
//! ```text
//! reward_issuance  other_issuance  fund
//! farmers  operators  nominators  holders  staking_pool
//! burnt
//! ```

use crate::economy::constants::{
    GENESIS_FUND_SHARE, GENESIS_OTHER_ISSUANCE_SHARE, GENESIS_REWARD_ISSUANCE_SHARE,
};
use crate::economy::params::EconomyParams;
use crate::models::State;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! economy_state {
    ($($(#[$doc:meta])* $field:ident => $variant:ident,)+) => {
        /// Identifier of one economy variable.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum StateVar {
            $($variant,)+
        }

        impl StateVar {
            /// Every variable, in declaration order
            pub const ALL: &'static [StateVar] = &[$(StateVar::$variant,)+];

            /// Column name
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(StateVar::$variant => stringify!($field),)+
                }
            }
        }

        /// Complete state of the token economy at one point in time.
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        pub struct EconomyState {
            $($(#[$doc])* pub $field: f64,)+
        }

        impl EconomyState {
            pub fn get(&self, var: StateVar) -> f64 {
                match var {
                    $(StateVar::$variant => self.$field,)+
                }
            }

            pub fn set(&mut self, var: StateVar, value: f64) {
                match var {
                    $(StateVar::$variant => self.$field = value,)+
                }
            }
        }
    };
}

economy_state! {
    // Time
    /// Days elapsed since genesis
    days_passed => DaysPassed,
    /// Days covered by the current timestep
    delta_days => DeltaDays,
    /// Blocks elapsed since genesis (fractional)
    blocks_passed => BlocksPassed,
    /// Blocks covered by the current timestep
    delta_blocks => DeltaBlocks,

    // Stocks
    reward_issuance_balance => RewardIssuanceBalance,
    other_issuance_balance => OtherIssuanceBalance,
    operators_balance => OperatorsBalance,
    nominators_balance => NominatorsBalance,
    holders_balance => HoldersBalance,
    farmers_balance => FarmersBalance,
    staking_pool_balance => StakingPoolBalance,
    fund_balance => FundBalance,
    burnt_balance => BurntBalance,

    // Staking pool shares
    operator_pool_shares => OperatorPoolShares,
    nominator_pool_shares => NominatorPoolShares,

    // Rewards
    /// Reward emitted to farmers this timestep, before the split
    block_reward => BlockReward,
    /// Reference subsidy accrued over the blocks of this timestep
    reference_subsidy => ReferenceSubsidy,
    /// Vested tokens released to holders so far
    allocated_tokens => AllocatedTokens,

    // Storage
    buffer_size => BufferSize,
    blockchain_history_size => BlockchainHistorySize,
    total_space_pledged => TotalSpacePledged,

    // Environment
    average_priority_fee => AveragePriorityFee,
    average_compute_weight_per_tx => AverageComputeWeightPerTx,
    average_compute_weight_per_bundle => AverageComputeWeightPerBundle,
    average_transaction_size => AverageTransactionSize,
    transaction_count => TransactionCount,
    bundle_count => BundleCount,
    block_utilization => BlockUtilization,

    // Storage fees
    free_space => FreeSpace,
    storage_fee_in_credits_per_bytes => StorageFeeInCreditsPerBytes,
    extrinsic_length_in_bytes => ExtrinsicLengthInBytes,
    storage_fee_volume => StorageFeeVolume,
    storage_fees_to_farmers => StorageFeesToFarmers,
    storage_fees_to_fund => StorageFeesToFund,

    // Compute fees
    target_block_delta => TargetBlockDelta,
    targeted_adjustment_parameter => TargetedAdjustmentParameter,
    compute_fee_multiplier => ComputeFeeMultiplier,
    tx_compute_weight => TxComputeWeight,
    compute_fee_volume => ComputeFeeVolume,
    priority_fee_volume => PriorityFeeVolume,
    fees_to_operators => FeesToOperators,

    // Metrics
    circulating_supply => CirculatingSupply,
    user_supply => UserSupply,
    issued_supply => IssuedSupply,
    earned_supply => EarnedSupply,
    earned_minus_burned_supply => EarnedMinusBurnedSupply,
    total_supply => TotalSupply,
    sum_of_stocks => SumOfStocks,
    storage_fee_per_rewards => StorageFeePerRewards,
}

impl fmt::Display for StateVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl State for EconomyState {
    type Key = StateVar;

    fn value(&self, key: &StateVar) -> Option<f64> {
        Some(self.get(*key))
    }

    fn set_value(&mut self, key: &StateVar, value: f64) {
        self.set(*key, value);
    }

    fn keys(&self) -> Vec<StateVar> {
        StateVar::ALL.to_vec()
    }
}

impl EconomyState {
    /// Genesis state: the whole supply sits in the issuance reserves and the
    /// fund, nothing is staked and `initial_space_pledged` is on the network.
    pub fn genesis(params: &EconomyParams) -> Self {
        let mut state = Self {
            reward_issuance_balance: GENESIS_REWARD_ISSUANCE_SHARE * params.max_credit_supply,
            other_issuance_balance: GENESIS_OTHER_ISSUANCE_SHARE * params.max_credit_supply,
            fund_balance: GENESIS_FUND_SHARE * params.max_credit_supply,
            total_space_pledged: params.initial_space_pledged,
            compute_fee_multiplier: 1.0,
            average_compute_weight_per_tx: params.min_compute_weights_per_tx,
            average_compute_weight_per_bundle: params.min_compute_weights_per_bundle,
            average_transaction_size: params.min_transaction_size,
            ..Self::default()
        };
        state.refresh_metrics();
        state
    }

    /// Sum of every stock
    pub fn stocks(&self) -> f64 {
        self.reward_issuance_balance
            + self.other_issuance_balance
            + self.operators_balance
            + self.nominators_balance
            + self.holders_balance
            + self.farmers_balance
            + self.staking_pool_balance
            + self.fund_balance
            + self.burnt_balance
    }

    /// Liquid balances of network participants
    pub fn circulating(&self) -> f64 {
        self.operators_balance + self.nominators_balance + self.holders_balance + self.farmers_balance
    }

    /// Everything participants own, staked or not
    pub fn user(&self) -> f64 {
        self.circulating() + self.staking_pool_balance
    }

    /// Credits that have left the issuance reserves
    pub fn issued(&self) -> f64 {
        self.stocks() - self.reward_issuance_balance - self.other_issuance_balance
    }

    /// Issued credits that reached participants (burnt ones included)
    pub fn earned(&self) -> f64 {
        self.issued() - self.fund_balance
    }

    pub fn earned_minus_burned(&self) -> f64 {
        self.earned() - self.burnt_balance
    }

    /// Credits in existence
    pub fn total(&self) -> f64 {
        self.stocks() - self.burnt_balance
    }

    /// Storage fees paid per credit of block reward (0 without reward)
    pub fn storage_fee_per_reward(&self) -> f64 {
        if self.block_reward > 0.0 {
            self.storage_fee_volume / self.block_reward
        } else {
            0.0
        }
    }

    fn refresh_metrics(&mut self) {
        self.circulating_supply = self.circulating();
        self.user_supply = self.user();
        self.issued_supply = self.issued();
        self.earned_supply = self.earned();
        self.earned_minus_burned_supply = self.earned_minus_burned();
        self.total_supply = self.total();
        self.sum_of_stocks = self.stocks();
        self.storage_fee_per_rewards = self.storage_fee_per_reward();
    }
}
