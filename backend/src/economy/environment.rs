//! Time, environment and storage growth.
//!
//! - Time tracking advances the two clocks (days and blocks)
//! - Environmental updates draw this timestep's load from the configured
//!   generators, in declaration order
//! - Archival moves full segments from the buffer into history
//! - Sector onboarding keeps pledged space above the replication target

use crate::core::TimeScale;
use crate::economy::constants::{SECTOR_SIZE, SEGMENT_HISTORY_SIZE, SEGMENT_SIZE};
use crate::economy::{EconomyContext, EconomySignal, EconomyState, PolicyResult, StateVar};
use crate::models::Signal;
use crate::orchestrator::SimulationError;

// ============================================================================
// Time Tracking
// ============================================================================

pub fn evolve_time(ctx: &mut EconomyContext<'_>, _state: &EconomyState) -> PolicyResult {
    let scale = TimeScale::new(ctx.params.timestep_in_days, ctx.params.block_time_in_seconds)?;
    Ok(Signal::new()
        .with(StateVar::DeltaDays, scale.delta_days())
        .with(StateVar::DaysPassed, scale.delta_days())
        .with(StateVar::DeltaBlocks, scale.delta_blocks())
        .with(StateVar::BlocksPassed, scale.delta_blocks()))
}

// ============================================================================
// Environmental Processes
// ============================================================================

pub fn average_priority_fee(
    ctx: &mut EconomyContext<'_>,
    state: &EconomyState,
    _signal: &EconomySignal,
) -> Result<f64, SimulationError> {
    let params = ctx.params;
    Ok(params
        .priority_fee_function
        .sample(ctx.rng(), state.days_passed)
        .max(0.0))
}

pub fn average_compute_weight_per_tx(
    ctx: &mut EconomyContext<'_>,
    state: &EconomyState,
    _signal: &EconomySignal,
) -> Result<f64, SimulationError> {
    let params = ctx.params;
    Ok(params
        .compute_weights_per_tx_function
        .sample(ctx.rng(), state.days_passed)
        .max(params.min_compute_weights_per_tx))
}

pub fn average_compute_weight_per_bundle(
    ctx: &mut EconomyContext<'_>,
    state: &EconomyState,
    _signal: &EconomySignal,
) -> Result<f64, SimulationError> {
    let params = ctx.params;
    Ok(params
        .compute_weight_per_bundle_function
        .sample(ctx.rng(), state.days_passed)
        .max(params.min_compute_weights_per_bundle))
}

pub fn average_transaction_size(
    ctx: &mut EconomyContext<'_>,
    state: &EconomyState,
    _signal: &EconomySignal,
) -> Result<f64, SimulationError> {
    let params = ctx.params;
    Ok(params
        .transaction_size_function
        .sample(ctx.rng(), state.days_passed)
        .max(params.min_transaction_size))
}

/// Transactions in this timestep (per-day draw times `delta_days`)
pub fn transaction_count(
    ctx: &mut EconomyContext<'_>,
    state: &EconomyState,
    _signal: &EconomySignal,
) -> Result<f64, SimulationError> {
    let params = ctx.params;
    let per_day = params
        .transaction_count_per_day_function
        .sample(ctx.rng(), state.days_passed)
        .max(0.0);
    Ok(per_day * state.delta_days)
}

/// Bundles in this timestep (per-day draw times `delta_days`)
pub fn bundle_count(
    ctx: &mut EconomyContext<'_>,
    state: &EconomyState,
    _signal: &EconomySignal,
) -> Result<f64, SimulationError> {
    let params = ctx.params;
    let per_day = params
        .bundle_count_per_day_function
        .sample(ctx.rng(), state.days_passed)
        .max(0.0);
    Ok(per_day * state.delta_days)
}

// ============================================================================
// Archival & Block Utilization
// ============================================================================

/// Append this timestep's bytes to the archival buffer and archive every
/// full segment.
pub fn archive(ctx: &mut EconomyContext<'_>, state: &EconomyState) -> PolicyResult {
    let params = ctx.params;
    if params.archival_buffer_segment_size <= 0.0 {
        return Err(SimulationError::ConfigurationError(
            "archival_buffer_segment_size must be > 0".to_string(),
        ));
    }

    let header_volume = state.delta_blocks * params.header_size;
    let tx_volume = state.transaction_count * state.average_transaction_size;
    let new_bytes = tx_volume + header_volume;

    let buffered = state.buffer_size + new_bytes;
    let segments = (buffered / params.archival_buffer_segment_size).floor().max(0.0);

    Ok(Signal::new()
        .with(StateVar::BufferSize, new_bytes - SEGMENT_SIZE * segments)
        .with(StateVar::BlockchainHistorySize, SEGMENT_HISTORY_SIZE * segments))
}

/// Share of block capacity used by transactions (0 when no block elapsed)
pub fn block_utilization(
    ctx: &mut EconomyContext<'_>,
    state: &EconomyState,
    _signal: &EconomySignal,
) -> Result<f64, SimulationError> {
    let capacity = ctx.params.max_block_size * state.delta_blocks;
    if capacity <= 0.0 {
        return Ok(0.0);
    }
    Ok(state.transaction_count * state.average_transaction_size / capacity)
}

// ============================================================================
// Sector Onboarding
// ============================================================================

/// Pledge whatever is missing to replicate history `min_replication_factor`
/// times, plus randomly onboarded sectors.
pub fn pledge_sectors(ctx: &mut EconomyContext<'_>, state: &EconomyState) -> PolicyResult {
    let params = ctx.params;

    let required = state.blockchain_history_size * params.min_replication_factor;
    let shortfall = (required - state.total_space_pledged).max(0.0);

    let sectors = (params
        .new_sectors_per_day_function
        .sample(ctx.rng(), state.days_passed)
        .max(0.0)
        * state.delta_days)
        .floor();

    Ok(Signal::new().with(StateVar::TotalSpacePledged, shortfall + sectors * SECTOR_SIZE))
}
