//! End-to-end runs of the token economy pipeline
//!
//! Genesis through many timesteps: conservation of stocks, reproducibility
//! and strategy sweeps.

use serde_json::json;
use tokenomics_simulator_core_rs::economy::{
    self, EconomyParams, EconomyState, IssuanceFunction, StateVar, StochasticFunction,
};
use tokenomics_simulator_core_rs::{OrchestratorConfig, SimulationError, SweepSpec};

fn init_logging() {
    let _ = env_logger::Builder::from_default_env().is_test(true).try_init();
}

fn config(timesteps: usize, samples: usize) -> OrchestratorConfig {
    OrchestratorConfig {
        timesteps,
        samples,
        rng_seed: 42,
    }
}

fn assert_conserved(states: &[EconomyState]) {
    let genesis = states[0].stocks();
    for (t, state) in states.iter().enumerate() {
        let drift = (state.stocks() - genesis).abs();
        assert!(drift <= 1e-9 * genesis, "timestep {}: drift {}", t, drift);
        assert_eq!(state.sum_of_stocks, state.stocks(), "timestep {}", t);
    }
}

#[test]
fn test_default_economy_conserves_stocks() {
    init_logging();
    let params = EconomyParams::default();
    let orchestrator = economy::orchestrator(config(90, 1)).unwrap();

    let result = orchestrator
        .run(&EconomyState::genesis(&params), &params, &SweepSpec::baseline())
        .unwrap();
    assert!(result.is_complete(), "{:?}", result.failures);

    let states = &result.trajectories[0].states;
    assert_eq!(states.len(), 91);
    assert_conserved(states);

    let last = &states[90];
    assert_eq!(last.days_passed, 90.0);
    assert!(last.reward_issuance_balance < states[0].reward_issuance_balance);
    assert!(last.farmers_balance > 0.0);
    assert!(last.holders_balance > 0.0);
    assert!(last.staking_pool_balance > 0.0);
    assert!(last.blockchain_history_size > 0.0);
    assert!(last.total_space_pledged > last.blockchain_history_size * params.min_replication_factor);
    // nothing is slashed in the deterministic baseline
    assert_eq!(last.burnt_balance, 0.0);
}

#[test]
fn test_stocks_never_negative() {
    let params = EconomyParams::default();
    let orchestrator = economy::orchestrator(config(60, 1)).unwrap();
    let result = orchestrator
        .run(&EconomyState::genesis(&params), &params, &SweepSpec::baseline())
        .unwrap();

    let stocks = [
        StateVar::RewardIssuanceBalance,
        StateVar::OtherIssuanceBalance,
        StateVar::OperatorsBalance,
        StateVar::NominatorsBalance,
        StateVar::HoldersBalance,
        StateVar::FarmersBalance,
        StateVar::StakingPoolBalance,
        StateVar::FundBalance,
        StateVar::BurntBalance,
    ];
    for state in &result.trajectories[0].states {
        for var in stocks {
            assert!(state.get(var) >= -1e-6, "{} = {}", var, state.get(var));
        }
    }
}

#[test]
fn test_stochastic_economy_is_reproducible() {
    init_logging();
    let params = EconomyParams::stochastic();
    let genesis = EconomyState::genesis(&params);

    let run = || {
        economy::orchestrator(config(60, 2))
            .unwrap()
            .run(&genesis, &params, &SweepSpec::baseline())
            .unwrap()
    };
    let first = run();
    let second = run();

    assert!(first.is_complete(), "{:?}", first.failures);
    assert_eq!(first.trajectories, second.trajectories);

    for trajectory in &first.trajectories {
        assert_conserved(&trajectory.states);
    }

    let a = first.trajectory(0, 0).unwrap().final_state().unwrap();
    let b = first.trajectory(0, 1).unwrap().final_state().unwrap();
    assert_ne!(a.transaction_count, b.transaction_count);
}

#[test]
fn test_issuance_strategy_sweep() {
    let params = EconomyParams::default();
    let sweep = SweepSpec::cartesian([(
        "issuance_function",
        vec![
            json!({ "kind": "constant", "per_day": 1_000_000.0 }),
            json!({ "kind": "share_of_remaining", "daily_share": 0.001 }),
            json!({ "kind": "scaled_reference_subsidy", "constant": 2.0 }),
        ],
    )]);

    let result = economy::orchestrator(config(10, 1))
        .unwrap()
        .run(&EconomyState::genesis(&params), &params, &sweep)
        .unwrap();
    assert!(result.is_complete());

    assert_eq!(
        result.configurations[0].params.issuance_function,
        IssuanceFunction::Constant { per_day: 1_000_000.0 }
    );

    let issued: Vec<f64> = result
        .trajectories
        .iter()
        .map(|t| {
            let states = &t.states;
            states[0].reward_issuance_balance - states[10].reward_issuance_balance
        })
        .collect();
    assert!((issued[0] - 10.0 * 1_000_000.0).abs() < 1e-3);
    assert!(issued.iter().all(|x| *x > 0.0));
}

#[test]
fn test_exhausted_space_fails_only_that_configuration() {
    init_logging();
    let params = EconomyParams::default();
    let sweep = SweepSpec::cartesian([(
        "new_sectors_per_day_function",
        vec![
            json!({ "kind": "constant", "value": 1000.0 }),
            json!({ "kind": "constant", "value": 0.0 }),
        ],
    )]);

    // history cannot be replicated into a tiny network
    let genesis = EconomyState {
        total_space_pledged: 0.0,
        ..EconomyState::genesis(&params)
    };
    let result = economy::orchestrator(config(5, 1))
        .unwrap()
        .run(&genesis, &params, &sweep)
        .unwrap();

    assert_eq!(result.trajectories.len(), 1);
    assert_eq!(result.trajectories[0].config_index, 0);
    assert_eq!(result.failures.len(), 1);

    let failure = &result.failures[0];
    assert_eq!(failure.config_index, 1);
    assert_eq!(failure.error.error.block, "Storage Fees");
    assert!(matches!(
        failure.error.error.source,
        SimulationError::InvariantViolation(_)
    ));
}

#[test]
fn test_rows_expose_every_state_variable() {
    let params = EconomyParams {
        transaction_count_per_day_function: StochasticFunction::Constant { value: 10.0 },
        ..EconomyParams::default()
    };
    let result = economy::orchestrator(config(3, 1))
        .unwrap()
        .run(&EconomyState::genesis(&params), &params, &SweepSpec::baseline())
        .unwrap();

    let rows = result.rows();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].substep, 0);
    assert_eq!(rows[3].substep, 15);
    assert_eq!(rows[3].values.len(), StateVar::ALL.len());
    assert_eq!(rows[3].values["transaction_count"], 10.0);
    assert_eq!(rows[3].values["days_passed"], 3.0);
}
