//! Transfers between participant balances.

use crate::economy::{EconomyContext, EconomyState, PolicyResult, StateVar};
use crate::models::Signal;

/// Fractions of each source balance moved, per day or per timestep.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransferFractions {
    pub farmer_to_holder: f64,
    pub operator_to_holder: f64,
    pub holder_to_nominator: f64,
    pub holder_to_operator: f64,
}

impl TransferFractions {
    /// Clamp every fraction to `[0, 1]` and scale the two holder outflows
    /// down so together they never exceed the holder balance.
    pub fn normalized(self) -> Self {
        let farmer_to_holder = self.farmer_to_holder.clamp(0.0, 1.0);
        let operator_to_holder = self.operator_to_holder.clamp(0.0, 1.0);
        let mut holder_to_nominator = self.holder_to_nominator.clamp(0.0, 1.0);
        let mut holder_to_operator = self.holder_to_operator.clamp(0.0, 1.0);

        let holder_out = holder_to_nominator + holder_to_operator;
        if holder_out > 1.0 {
            holder_to_nominator /= holder_out;
            holder_to_operator /= holder_out;
        }

        Self {
            farmer_to_holder,
            operator_to_holder,
            holder_to_nominator,
            holder_to_operator,
        }
    }

    /// Compound daily fractions over `days`: `1 - (1 - f)^days` each.
    pub fn over_days(self, days: f64) -> Self {
        let compound = |daily: f64| 1.0 - (1.0 - daily.clamp(0.0, 1.0)).powf(days);
        Self {
            farmer_to_holder: compound(self.farmer_to_holder),
            operator_to_holder: compound(self.operator_to_holder),
            holder_to_nominator: compound(self.holder_to_nominator),
            holder_to_operator: compound(self.holder_to_operator),
        }
    }
}

/// Balance changes produced by `fractions`. Empty balances move nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransferDeltas {
    pub farmers: f64,
    pub operators: f64,
    pub nominators: f64,
    pub holders: f64,
}

pub fn transfer_deltas(state: &EconomyState, fractions: TransferFractions) -> TransferDeltas {
    let fractions = fractions.normalized();
    let mut deltas = TransferDeltas::default();

    if state.farmers_balance > 0.0 {
        let amount = state.farmers_balance * fractions.farmer_to_holder;
        deltas.farmers -= amount;
        deltas.holders += amount;
    }

    if state.operators_balance > 0.0 {
        let amount = state.operators_balance * fractions.operator_to_holder;
        deltas.operators -= amount;
        deltas.holders += amount;
    }

    if state.holders_balance > 0.0 {
        let to_nominators = state.holders_balance * fractions.holder_to_nominator;
        let to_operators = state.holders_balance * fractions.holder_to_operator;
        deltas.holders -= to_nominators + to_operators;
        deltas.nominators += to_nominators;
        deltas.operators += to_operators;
    }

    deltas
}

pub fn transfers(ctx: &mut EconomyContext<'_>, state: &EconomyState) -> PolicyResult {
    let params = ctx.params;
    let days = state.days_passed;
    let daily = TransferFractions {
        farmer_to_holder: params
            .transfer_farmer_to_holder_per_day_function
            .sample(ctx.rng(), days),
        operator_to_holder: params
            .transfer_operator_to_holder_per_day_function
            .sample(ctx.rng(), days),
        holder_to_nominator: params
            .transfer_holder_to_nominator_per_day_function
            .sample(ctx.rng(), days),
        holder_to_operator: params
            .transfer_holder_to_operator_per_day_function
            .sample(ctx.rng(), days),
    };

    let deltas = transfer_deltas(state, daily.over_days(state.delta_days));

    Ok(Signal::new()
        .with(StateVar::FarmersBalance, deltas.farmers)
        .with(StateVar::OperatorsBalance, deltas.operators)
        .with(StateVar::NominatorsBalance, deltas.nominators)
        .with(StateVar::HoldersBalance, deltas.holders))
}
