//! Block rewards, the reference subsidy and vesting.

use crate::core::TimeScale;
use crate::economy::{EconomyContext, EconomyState, PolicyResult, StateVar};
use crate::models::Signal;

// ============================================================================
// Reference Subsidy
// ============================================================================

/// Integrate every subsidy component over each block boundary crossed since
/// the previous timestep.
pub fn reference_subsidy(ctx: &mut EconomyContext<'_>, state: &EconomyState) -> PolicyResult {
    let previous = ctx.previous_state().map_or(0.0, |s| s.blocks_passed);
    let components = &ctx.params.reference_subsidy_components;

    let subsidy: f64 = TimeScale::blocks_crossed(previous, state.blocks_passed)
        .map(|block| {
            let t = block as f64;
            components.iter().map(|c| c.reward_at(t)).sum::<f64>()
        })
        .sum();

    Ok(Signal::new().with(StateVar::ReferenceSubsidy, subsidy))
}

// ============================================================================
// Farmer Rewards (Inflow)
// ============================================================================

/// Disbursement from the fund to farmers.
pub fn fund_reward(ctx: &mut EconomyContext<'_>, state: &EconomyState) -> PolicyResult {
    let daily = ctx.params.fund_disbursal_per_day.clamp(0.0, 1.0);
    let share = 1.0 - (1.0 - daily).powf(state.delta_days);
    let reward = (state.fund_balance * share).max(0.0);

    Ok(Signal::new()
        .with(StateVar::BlockReward, reward)
        .with(StateVar::FundBalance, -reward))
}

/// Protocol issuance to farmers, capped by what is left in the reserve.
pub fn issuance_reward(ctx: &mut EconomyContext<'_>, state: &EconomyState) -> PolicyResult {
    let reward = ctx
        .params
        .issuance_function
        .issuance(state)
        .max(0.0)
        .min(state.reward_issuance_balance.max(0.0));

    Ok(Signal::new()
        .with(StateVar::BlockReward, reward)
        .with(StateVar::RewardIssuanceBalance, -reward))
}

// ============================================================================
// Farmer Rewards (Outflow)
// ============================================================================

/// Division of one block reward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardSplit {
    pub to_fund: f64,
    pub to_farmers: f64,
}

/// The fund taxes the proposer's part of the reward; farmers get the rest.
///
/// The fund's part is derived back from the farmers' part so the two always
/// add up to `block_reward` exactly in floating point.
pub fn split_reward(block_reward: f64, proposer_share: f64, fund_tax_rate: f64) -> RewardSplit {
    let to_farmers = block_reward - block_reward * proposer_share * fund_tax_rate;
    RewardSplit {
        to_fund: block_reward - to_farmers,
        to_farmers,
    }
}

pub fn split_farmer_rewards(ctx: &mut EconomyContext<'_>, state: &EconomyState) -> PolicyResult {
    let split = split_reward(
        state.block_reward,
        ctx.params.reward_proposer_share,
        ctx.params.fund_tax_on_proposer_reward,
    );

    Ok(Signal::new()
        .with(StateVar::FarmersBalance, split.to_farmers)
        .with(StateVar::FundBalance, split.to_fund))
}

// ============================================================================
// Operator Rewards
// ============================================================================

/// Protocol issuance to staked operators. Currently zero.
pub fn operator_reward(_ctx: &mut EconomyContext<'_>, _state: &EconomyState) -> PolicyResult {
    let reward = 0.0;
    Ok(Signal::new()
        .with(StateVar::OtherIssuanceBalance, -reward)
        .with(StateVar::OperatorsBalance, reward))
}

// ============================================================================
// Direct Allocations
// ============================================================================

/// Release vested tranches from the other-issuance reserve to holders.
pub fn unvest(ctx: &mut EconomyContext<'_>, state: &EconomyState) -> PolicyResult {
    let params = ctx.params;
    let vested: f64 = params
        .vesting_schedule
        .iter()
        .map(|tranche| tranche.share_of_supply * tranche.vested_fraction(state.days_passed))
        .sum::<f64>()
        * params.max_credit_supply;

    let release = (vested - state.allocated_tokens)
        .max(0.0)
        .min(state.other_issuance_balance.max(0.0));

    Ok(Signal::new()
        .with(StateVar::OtherIssuanceBalance, -release)
        .with(StateVar::HoldersBalance, release)
        .with(StateVar::AllocatedTokens, state.allocated_tokens + release))
}
