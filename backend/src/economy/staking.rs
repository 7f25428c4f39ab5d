//! Staking pool: deposits, withdrawals and slashing.
//!
//! The pool prices its shares with an invariant product: one share is worth
//! `staking_pool_balance / (operator_pool_shares + nominator_pool_shares)`.
//! Deposits and withdrawals move balance and shares together, so the price
//! is unchanged; slashing shrinks the balance and the operator shares by the
//! same relative amount.

use crate::economy::{EconomyContext, EconomyState, PolicyResult, StateVar};
use crate::models::Signal;
use crate::orchestrator::SimulationError;

/// Credits per pool share. A pool without shares starts at 1.
///
/// # Errors
///
/// `InvariantViolation` when either share leg is negative, or when shares
/// exist but the pool cannot price them (non-positive balance or share
/// total).
pub fn pool_invariant(state: &EconomyState) -> Result<f64, SimulationError> {
    let operator = state.operator_pool_shares;
    let nominator = state.nominator_pool_shares;
    if operator < 0.0 || nominator < 0.0 {
        return Err(SimulationError::InvariantViolation(format!(
            "staking pool share legs must be non-negative (operators {}, nominators {})",
            operator, nominator
        )));
    }
    if operator == 0.0 && nominator == 0.0 {
        return Ok(1.0);
    }

    let total_shares = operator + nominator;
    if total_shares > 0.0 && state.staking_pool_balance > 0.0 {
        Ok(state.staking_pool_balance / total_shares)
    } else {
        Err(SimulationError::InvariantViolation(format!(
            "staking pool of {} credits cannot price {} shares",
            state.staking_pool_balance, total_shares
        )))
    }
}

/// Realized stake movement of one timestep. Positive values deposit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StakeChange {
    pub operator_stake: f64,
    pub nominator_stake: f64,
    /// Net pool balance change
    pub total_stake: f64,
    pub invariant: f64,
}

impl StakeChange {
    pub fn operator_shares(&self) -> f64 {
        self.operator_stake / self.invariant
    }

    pub fn nominator_shares(&self) -> f64 {
        self.nominator_stake / self.invariant
    }
}

/// Stake (positive fraction of free balance) or withdraw (negative fraction
/// of pooled value) for both legs.
///
/// A withdrawal larger than the pool is scaled down on both legs so the pool
/// ends exactly empty.
pub fn stake_change(
    state: &EconomyState,
    operator_fraction: f64,
    nominator_fraction: f64,
) -> Result<StakeChange, SimulationError> {
    let invariant = pool_invariant(state)?;

    let leg = |fraction: f64, balance: f64, shares: f64| {
        if fraction > 0.0 {
            balance * fraction
        } else {
            shares * fraction * invariant
        }
    };

    let mut operator_stake = leg(
        operator_fraction,
        state.operators_balance,
        state.operator_pool_shares,
    );
    let mut nominator_stake = leg(
        nominator_fraction,
        state.nominators_balance,
        state.nominator_pool_shares,
    );
    let mut total_stake = operator_stake + nominator_stake;

    if -total_stake > state.staking_pool_balance && total_stake != 0.0 {
        let capped = -state.staking_pool_balance;
        let scale = capped / total_stake;
        operator_stake *= scale;
        nominator_stake *= scale;
        total_stake = capped;
    }

    Ok(StakeChange {
        operator_stake,
        nominator_stake,
        total_stake,
        invariant,
    })
}

pub fn staking(ctx: &mut EconomyContext<'_>, state: &EconomyState) -> PolicyResult {
    let params = ctx.params;
    let operator_fraction = params
        .operator_stake_per_ts_function
        .sample(ctx.rng(), state.days_passed)
        .clamp(-1.0, 1.0);
    let nominator_fraction = params
        .nominator_stake_per_ts_function
        .sample(ctx.rng(), state.days_passed)
        .clamp(-1.0, 1.0);

    let change = stake_change(state, operator_fraction, nominator_fraction)?;

    Ok(Signal::new()
        .with(StateVar::OperatorsBalance, -change.operator_stake)
        .with(StateVar::OperatorPoolShares, change.operator_shares())
        .with(StateVar::NominatorsBalance, -change.nominator_stake)
        .with(StateVar::NominatorPoolShares, change.nominator_shares())
        .with(StateVar::StakingPoolBalance, change.total_stake))
}

// ============================================================================
// Slash
// ============================================================================

/// Outcome of slashing the pool.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlashOutcome {
    pub value: f64,
    pub to_fund: f64,
    pub to_holders: f64,
    pub to_burn: f64,
    /// Change of operator shares (non-positive)
    pub operator_shares_delta: f64,
}

/// Slash `requested` credits from the pool, at most its whole balance.
///
/// Nothing happens when the pool is empty. The share reduction comes out of
/// the operator leg only, so a slash worth more than the operators' stake
/// leaves that leg negative and the next staking step fails on
/// [`pool_invariant`].
pub fn slash_pool(
    state: &EconomyState,
    requested: f64,
    fund_share: f64,
    holders_share: f64,
) -> SlashOutcome {
    let pool = state.staking_pool_balance;
    if pool <= 0.0 {
        return SlashOutcome::default();
    }

    let value = requested.min(pool);
    if value <= 0.0 {
        return SlashOutcome::default();
    }

    let to_fund = value * fund_share;
    let to_holders = value * holders_share;
    let total_shares = state.operator_pool_shares + state.nominator_pool_shares;
    let pool_after = pool - value;

    SlashOutcome {
        value,
        to_fund,
        to_holders,
        to_burn: value - (to_fund + to_holders),
        operator_shares_delta: total_shares * (pool_after / pool - 1.0),
    }
}

pub fn slash(ctx: &mut EconomyContext<'_>, state: &EconomyState) -> PolicyResult {
    let outcome = if state.staking_pool_balance > 0.0 {
        let params = ctx.params;
        let count = params
            .slash_per_day_function
            .sample(ctx.rng(), state.days_passed)
            .max(0.0)
            * state.delta_days;
        slash_pool(
            state,
            count * params.slash_amount,
            params.slash_to_fund,
            params.slash_to_holders,
        )
    } else {
        SlashOutcome::default()
    };

    Ok(Signal::new()
        .with(StateVar::StakingPoolBalance, -outcome.value)
        .with(StateVar::FundBalance, outcome.to_fund)
        .with(StateVar::HoldersBalance, outcome.to_holders)
        .with(StateVar::OperatorPoolShares, outcome.operator_shares_delta)
        .with(StateVar::BurntBalance, outcome.to_burn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::testing::with_context;
    use crate::economy::{EconomyParams, StochasticFunction};
    use proptest::prelude::*;

    fn pool(balance: f64, operator_shares: f64, nominator_shares: f64) -> EconomyState {
        EconomyState {
            staking_pool_balance: balance,
            operator_pool_shares: operator_shares,
            nominator_pool_shares: nominator_shares,
            operators_balance: 500.0,
            nominators_balance: 300.0,
            delta_days: 1.0,
            ..EconomyState::default()
        }
    }

    #[test]
    fn test_invariant_starts_at_one() {
        assert_eq!(pool_invariant(&pool(0.0, 0.0, 0.0)).unwrap(), 1.0);
        assert_eq!(pool_invariant(&pool(300.0, 100.0, 50.0)).unwrap(), 2.0);
    }

    #[test]
    fn test_unpriceable_pool_raises() {
        assert!(matches!(
            pool_invariant(&pool(0.0, 10.0, 0.0)),
            Err(SimulationError::InvariantViolation(_))
        ));
        assert!(pool_invariant(&pool(100.0, 10.0, -10.0)).is_err());
    }

    #[test]
    fn test_first_deposit_mints_shares_one_to_one() {
        let change = stake_change(&pool(0.0, 0.0, 0.0), 0.1, 0.5).unwrap();
        assert_eq!(change.operator_stake, 50.0);
        assert_eq!(change.nominator_stake, 150.0);
        assert_eq!(change.operator_shares(), 50.0);
        assert_eq!(change.total_stake, 200.0);
    }

    #[test]
    fn test_withdrawal_at_share_price() {
        // price 2.0: withdrawing half of 100 operator shares returns 100 credits
        let change = stake_change(&pool(300.0, 100.0, 50.0), -0.5, 0.0).unwrap();
        assert_eq!(change.operator_stake, -100.0);
        assert_eq!(change.operator_shares(), -50.0);
        assert_eq!(change.nominator_stake, 0.0);
    }

    #[test]
    fn test_oversized_withdrawal_empties_pool_exactly() {
        let state = pool(300.0, 100.0, 50.0);
        let change = stake_change(&state, -2.0, -2.0).unwrap();
        assert_eq!(change.total_stake, -300.0);
        assert_eq!(state.staking_pool_balance + change.total_stake, 0.0);
        // 400 : 200 requested, scaled to 200 : 100
        assert!((change.operator_stake + 200.0).abs() < 1e-9);
        assert!((change.nominator_stake + 100.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_staking_never_overdraws_pool(
            balance in 1.0f64..1e9,
            operator_shares in 0.0f64..1e9,
            nominator_shares in 1.0f64..1e9,
            operator_fraction in -5.0f64..1.0,
            nominator_fraction in -5.0f64..1.0,
        ) {
            let state = pool(balance, operator_shares, nominator_shares);
            let change = stake_change(&state, operator_fraction, nominator_fraction).unwrap();

            let price = pool_invariant(&state).unwrap();
            let leg = |f: f64, b: f64, s: f64| if f > 0.0 { b * f } else { s * f * price };
            let requested = leg(operator_fraction, state.operators_balance, operator_shares)
                + leg(nominator_fraction, state.nominators_balance, nominator_shares);

            if -requested > balance {
                prop_assert_eq!(change.total_stake, -balance);
            }
            prop_assert!(balance + change.total_stake >= 0.0);
        }

        #[test]
        fn prop_slash_is_noop_on_empty_pool(
            balance in -1e9f64..=0.0,
            shares in 0.0f64..1e9,
            requested in 0.0f64..1e9,
        ) {
            let outcome = slash_pool(&pool(balance, shares, shares), requested, 0.3, 0.3);
            prop_assert_eq!(outcome, SlashOutcome::default());
        }
    }

    #[test]
    fn test_slash_policy_emits_zeros_on_empty_pool() {
        let params = EconomyParams {
            slash_per_day_function: StochasticFunction::Constant { value: 10.0 },
            ..EconomyParams::default()
        };
        let state = pool(0.0, 0.0, 0.0);
        let signal = with_context(&params, &state, |ctx| slash(ctx, &state)).unwrap();

        assert_eq!(signal.len(), 5);
        for (_, value) in signal.iter() {
            assert_eq!(value, 0.0);
        }
    }

    #[test]
    fn test_slash_capped_and_shares_shrink_relatively() {
        let state = pool(1_000.0, 300.0, 100.0);
        let outcome = slash_pool(&state, 5_000.0, 0.2, 0.3);

        assert_eq!(outcome.value, 1_000.0);
        assert_eq!(outcome.to_fund, 200.0);
        assert_eq!(outcome.to_holders, 300.0);
        assert_eq!(outcome.to_burn, 500.0);
        // pool emptied: every share is removed from the operator leg
        assert_eq!(outcome.operator_shares_delta, -400.0);

        let partial = slash_pool(&state, 250.0, 0.0, 0.0);
        assert_eq!(partial.operator_shares_delta, -100.0);
        assert_eq!(partial.to_burn, 250.0);
    }

    #[test]
    fn test_withdrawal_after_oversized_slash_raises() {
        let mut state = pool(1_000.0, 100.0, 900.0);
        state.operators_balance = 10.0;

        // 500 credits of shares leave the 100-share operator leg
        let outcome = slash_pool(&state, 500.0, 0.0, 0.0);
        state.staking_pool_balance -= outcome.value;
        state.operator_pool_shares += outcome.operator_shares_delta;
        assert_eq!(state.operator_pool_shares, -400.0);

        assert!(matches!(
            stake_change(&state, -0.5, 0.0),
            Err(SimulationError::InvariantViolation(_))
        ));

        let params = EconomyParams {
            operator_stake_per_ts_function: StochasticFunction::Constant { value: -0.5 },
            nominator_stake_per_ts_function: StochasticFunction::Constant { value: 0.0 },
            ..EconomyParams::default()
        };
        let result = with_context(&params, &state, |ctx| staking(ctx, &state));
        assert!(matches!(result, Err(SimulationError::InvariantViolation(_))));
    }
}
