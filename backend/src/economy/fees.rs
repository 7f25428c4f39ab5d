//! Storage and compute fee markets.
//!
//! Both fees are paid by holders. Storage fees go to farmers and the fund;
//! compute fees go to farmers, except the share attributable to bundle
//! weight, which goes to operators.

use crate::economy::constants::SHANNON_IN_CREDITS;
use crate::economy::{EconomyContext, EconomyParams, EconomyState, PolicyResult, StateVar};
use crate::models::Signal;
use crate::orchestrator::SimulationError;

// ============================================================================
// Storage Fees
// ============================================================================

/// Outcome of the storage fee market for one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageFees {
    pub free_space: f64,
    pub fee_per_byte: f64,
    pub extrinsic_length: f64,
    /// Fees actually paid (after the holder balance cap)
    pub volume: f64,
    pub to_farmers: f64,
    pub to_fund: f64,
}

/// Price storage by spreading the credit supply over the free space.
///
/// # Errors
///
/// `InvariantViolation` when pledged space does not exceed the replicated
/// history: the storage market cannot exist in that state.
pub fn compute_storage_fees(
    params: &EconomyParams,
    state: &EconomyState,
) -> Result<StorageFees, SimulationError> {
    let replication = params.min_replication_factor;
    if replication <= 0.0 {
        return Err(SimulationError::ConfigurationError(
            "min_replication_factor must be > 0".to_string(),
        ));
    }

    if state.total_space_pledged <= state.blockchain_history_size * replication {
        return Err(SimulationError::InvariantViolation(format!(
            "total_space_pledged ({}) <= blockchain_history_size ({}) * min_replication_factor ({})",
            state.total_space_pledged, state.blockchain_history_size, replication
        )));
    }

    let free_space = (state.total_space_pledged / replication - state.blockchain_history_size).max(1.0);
    let fee_per_byte = params.credit_supply_definition.of(state) / free_space;
    let extrinsic_length = state.transaction_count * state.average_transaction_size;

    // Paid volume never exceeds half of what holders own
    let volume = (fee_per_byte * extrinsic_length).min(state.holders_balance / 2.0);

    let to_fund = params.fund_tax_on_storage_fees * volume;
    Ok(StorageFees {
        free_space,
        fee_per_byte,
        extrinsic_length,
        volume,
        to_farmers: volume - to_fund,
        to_fund,
    })
}

pub fn storage_fees(ctx: &mut EconomyContext<'_>, state: &EconomyState) -> PolicyResult {
    let fees = compute_storage_fees(ctx.params, state)?;

    Ok(Signal::new()
        .with(StateVar::FreeSpace, fees.free_space)
        .with(StateVar::StorageFeeInCreditsPerBytes, fees.fee_per_byte)
        .with(StateVar::ExtrinsicLengthInBytes, fees.extrinsic_length)
        .with(StateVar::StorageFeeVolume, fees.volume)
        .with(StateVar::StorageFeesToFarmers, fees.to_farmers)
        .with(StateVar::FarmersBalance, fees.to_farmers)
        .with(StateVar::StorageFeesToFund, fees.to_fund)
        .with(StateVar::FundBalance, fees.to_fund)
        .with(StateVar::HoldersBalance, -fees.volume))
}

// ============================================================================
// Compute Fees
// ============================================================================

/// Outcome of the compute fee market for one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputeFees {
    pub target_block_delta: f64,
    pub adjustment: f64,
    pub multiplier: f64,
    pub tx_compute_weight: f64,
    pub priority_fee_volume: f64,
    /// Fees actually paid (after the holder balance cap)
    pub volume: f64,
    pub to_farmers: f64,
    pub to_operators: f64,
}

/// Second-order Taylor expansion of `exp(v * d)`.
pub fn fee_adjustment(adjustment_variable: f64, target_block_delta: f64) -> f64 {
    let vd = adjustment_variable * target_block_delta;
    1.0 + vd + vd * vd / 2.0
}

/// Adjust the fee multiplier towards the target fullness and charge for
/// this timestep's compute weight.
pub fn compute_compute_fees(params: &EconomyParams, state: &EconomyState) -> ComputeFees {
    let target_block_delta = params.target_block_fullness - state.block_utilization;
    let adjustment = fee_adjustment(params.adjustment_variable, target_block_delta);
    let multiplier = adjustment * state.compute_fee_multiplier;

    let tx_compute_weight = state.average_compute_weight_per_tx * state.transaction_count;
    let bundle_compute_weight = state.average_compute_weight_per_bundle * state.bundle_count;
    let total_weight = tx_compute_weight + bundle_compute_weight;

    let priority_fee_volume = state.average_priority_fee * state.transaction_count;

    let requested = (multiplier * params.weight_to_fee * total_weight + priority_fee_volume)
        .max(SHANNON_IN_CREDITS);
    let volume = requested.min(state.holders_balance);

    let bundle_share = if total_weight > 0.0 {
        bundle_compute_weight / total_weight
    } else {
        0.0
    };
    let to_operators = volume * bundle_share;

    ComputeFees {
        target_block_delta,
        adjustment,
        multiplier,
        tx_compute_weight,
        priority_fee_volume,
        volume,
        to_farmers: volume - to_operators,
        to_operators,
    }
}

pub fn compute_fees(ctx: &mut EconomyContext<'_>, state: &EconomyState) -> PolicyResult {
    let fees = compute_compute_fees(ctx.params, state);

    Ok(Signal::new()
        .with(StateVar::TargetBlockDelta, fees.target_block_delta)
        .with(StateVar::TargetedAdjustmentParameter, fees.adjustment)
        .with(StateVar::ComputeFeeMultiplier, fees.multiplier)
        .with(StateVar::TxComputeWeight, fees.tx_compute_weight)
        .with(StateVar::ComputeFeeVolume, fees.volume)
        .with(StateVar::PriorityFeeVolume, fees.priority_fee_volume)
        .with(StateVar::FeesToOperators, fees.to_operators)
        .with(StateVar::FarmersBalance, fees.to_farmers)
        .with(StateVar::OperatorsBalance, fees.to_operators)
        .with(StateVar::HoldersBalance, -fees.volume))
}
