//! Block layout of the economy pipeline.
//!
//! Each timestep runs these blocks in order; every block sees the output of
//! the one before it.
//!
//! | # | Block | Writes |
//! |---|-------|--------|
//! | 1 | Time Tracking | clocks |
//! | 2 | Reference Subsidy | `reference_subsidy` |
//! | 3 | Environmental Processes | fee, weight, size and count draws |
//! | 4 | Archival & Block Utilization | buffer, history, utilization |
//! | 5 | Sector Onboarding | `total_space_pledged` |
//! | 6 | Farmer Rewards (Inflow) | `block_reward`, fund, reward reserve |
//! | 7 | Farmer Rewards (Outflow) | farmers, fund |
//! | 8 | Operator Rewards | operators, other reserve |
//! | 9 | Storage Fees | storage fee market |
//! | 10 | Compute Fees | compute fee market |
//! | 11 | Direct Allocations | vesting release |
//! | 12 | Slash | staking pool, fund, holders, burn |
//! | 13 | Staking / Unstaking | balances, pool, shares |
//! | 14 | Transfers | participant balances |
//! | 15 | Metrics | supply aggregates |

use crate::economy::state::{EconomyState, StateVar};
use crate::economy::{environment, fees, rewards, staking, transfers, EconomyParams};
use crate::orchestrator::SimulationError;
use crate::pipeline::{Block, Pipeline};

type EconomyBlock = Block<EconomyState, EconomyParams>;

/// The economy blocks in execution order.
pub fn economy_blocks() -> Vec<EconomyBlock> {
    vec![
        EconomyBlock::new("Time Tracking")
            .policy("evolve_time", environment::evolve_time)
            .replace(StateVar::DeltaDays)
            .accumulate(StateVar::DaysPassed)
            .replace(StateVar::DeltaBlocks)
            .accumulate(StateVar::BlocksPassed),
        EconomyBlock::new("Reference Subsidy")
            .policy("reference_subsidy", rewards::reference_subsidy)
            .replace(StateVar::ReferenceSubsidy),
        EconomyBlock::new("Environmental Processes")
            .update_with(StateVar::AveragePriorityFee, environment::average_priority_fee)
            .update_with(
                StateVar::AverageComputeWeightPerTx,
                environment::average_compute_weight_per_tx,
            )
            .update_with(StateVar::TransactionCount, environment::transaction_count)
            .update_with(
                StateVar::AverageTransactionSize,
                environment::average_transaction_size,
            )
            .update_with(
                StateVar::AverageComputeWeightPerBundle,
                environment::average_compute_weight_per_bundle,
            )
            .update_with(StateVar::BundleCount, environment::bundle_count),
        EconomyBlock::new("Archival & Block Utilization")
            .policy("archive", environment::archive)
            .accumulate(StateVar::BufferSize)
            .accumulate(StateVar::BlockchainHistorySize)
            .update_with(StateVar::BlockUtilization, environment::block_utilization),
        EconomyBlock::new("Sector Onboarding")
            .policy("pledge_sectors", environment::pledge_sectors)
            .accumulate(StateVar::TotalSpacePledged),
        EconomyBlock::new("Farmer Rewards (Inflow)")
            .policy("fund_reward", rewards::fund_reward)
            .policy("issuance_reward", rewards::issuance_reward)
            .replace(StateVar::BlockReward)
            .accumulate(StateVar::FundBalance)
            .accumulate(StateVar::RewardIssuanceBalance),
        EconomyBlock::new("Farmer Rewards (Outflow)")
            .policy("split_farmer_rewards", rewards::split_farmer_rewards)
            .accumulate(StateVar::FarmersBalance)
            .accumulate(StateVar::FundBalance),
        EconomyBlock::new("Operator Rewards")
            .policy("operator_reward", rewards::operator_reward)
            .accumulate(StateVar::OtherIssuanceBalance)
            .accumulate(StateVar::OperatorsBalance),
        EconomyBlock::new("Storage Fees")
            .policy("storage_fees", fees::storage_fees)
            .replace(StateVar::FreeSpace)
            .replace(StateVar::StorageFeeInCreditsPerBytes)
            .replace(StateVar::ExtrinsicLengthInBytes)
            .replace(StateVar::StorageFeeVolume)
            .replace(StateVar::StorageFeesToFarmers)
            .replace(StateVar::StorageFeesToFund)
            .accumulate(StateVar::FarmersBalance)
            .accumulate(StateVar::FundBalance)
            .accumulate(StateVar::HoldersBalance),
        EconomyBlock::new("Compute Fees")
            .policy("compute_fees", fees::compute_fees)
            .replace(StateVar::TargetBlockDelta)
            .replace(StateVar::TargetedAdjustmentParameter)
            .replace(StateVar::ComputeFeeMultiplier)
            .replace(StateVar::TxComputeWeight)
            .replace(StateVar::ComputeFeeVolume)
            .replace(StateVar::PriorityFeeVolume)
            .replace(StateVar::FeesToOperators)
            .accumulate(StateVar::FarmersBalance)
            .accumulate(StateVar::OperatorsBalance)
            .accumulate(StateVar::HoldersBalance),
        EconomyBlock::new("Direct Allocations")
            .policy("unvest", rewards::unvest)
            .accumulate(StateVar::OtherIssuanceBalance)
            .accumulate(StateVar::HoldersBalance)
            .replace(StateVar::AllocatedTokens),
        EconomyBlock::new("Slash")
            .policy("slash", staking::slash)
            .accumulate(StateVar::StakingPoolBalance)
            .accumulate(StateVar::FundBalance)
            .accumulate(StateVar::HoldersBalance)
            .accumulate(StateVar::OperatorPoolShares)
            .accumulate(StateVar::BurntBalance),
        EconomyBlock::new("Staking / Unstaking")
            .policy("staking", staking::staking)
            .accumulate(StateVar::OperatorsBalance)
            .accumulate(StateVar::OperatorPoolShares)
            .accumulate(StateVar::NominatorsBalance)
            .accumulate(StateVar::NominatorPoolShares)
            .accumulate(StateVar::StakingPoolBalance),
        EconomyBlock::new("Transfers")
            .policy("transfers", transfers::transfers)
            .accumulate(StateVar::FarmersBalance)
            .accumulate(StateVar::OperatorsBalance)
            .accumulate(StateVar::NominatorsBalance)
            .accumulate(StateVar::HoldersBalance),
        metrics(),
    ]
}

/// Supply aggregates, recomputed from the stocks at the end of every
/// timestep.
fn metrics() -> EconomyBlock {
    let metrics: [(StateVar, fn(&EconomyState) -> f64); 8] = [
        (StateVar::CirculatingSupply, EconomyState::circulating),
        (StateVar::UserSupply, EconomyState::user),
        (StateVar::IssuedSupply, EconomyState::issued),
        (StateVar::EarnedSupply, EconomyState::earned),
        (StateVar::EarnedMinusBurnedSupply, EconomyState::earned_minus_burned),
        (StateVar::TotalSupply, EconomyState::total),
        (StateVar::SumOfStocks, EconomyState::stocks),
        (StateVar::StorageFeePerRewards, EconomyState::storage_fee_per_reward),
    ];

    metrics
        .into_iter()
        .fold(EconomyBlock::new("Metrics"), |block, (var, metric)| {
            block.update_with(var, move |_ctx, state, _signal| Ok(metric(state)))
        })
}

/// Validated pipeline over [`economy_blocks`].
pub fn build_pipeline() -> Result<Pipeline<EconomyState, EconomyParams>, SimulationError> {
    Pipeline::new(economy_blocks())
}
