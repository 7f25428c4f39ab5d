//! Token economy of a proof-of-storage chain.
//!
//! Issuance, block rewards, storage and compute fee markets, staking,
//! slashing, vesting and user transfers, expressed as pipeline blocks over
//! the typed [`EconomyState`].
//!
//! # Example
//!
//! ```rust
//! use tokenomics_simulator_core_rs::economy::{self, EconomyParams, EconomyState};
//! use tokenomics_simulator_core_rs::orchestrator::{OrchestratorConfig, SweepSpec};
//!
//! let params = EconomyParams::default();
//! let orchestrator = economy::orchestrator(OrchestratorConfig {
//!     timesteps: 30,
//!     samples: 1,
//!     rng_seed: 42,
//! })
//! .unwrap();
//!
//! let result = orchestrator
//!     .run(&EconomyState::genesis(&params), &params, &SweepSpec::baseline())
//!     .unwrap();
//! assert!(result.is_complete());
//! ```

pub mod constants;
pub mod environment;
pub mod fees;
pub mod params;
pub mod rewards;
pub mod staking;
pub mod state;
pub mod structure;
pub mod transfers;

pub use params::{
    CreditSupply, EconomyParams, IssuanceFunction, StochasticFunction, SubsidyComponent,
    VestingTranche,
};
pub use state::{EconomyState, StateVar};
pub use structure::{build_pipeline, economy_blocks};

use crate::models::Signal;
use crate::orchestrator::{Orchestrator, OrchestratorConfig, SimulationError};
use crate::pipeline::StepContext;

/// Step context of an economy run
pub type EconomyContext<'a> = StepContext<'a, EconomyState, EconomyParams>;

/// Signal keyed by economy variables
pub type EconomySignal = Signal<StateVar>;

pub type PolicyResult = Result<EconomySignal, SimulationError>;

/// Orchestrator over the full economy pipeline
pub fn orchestrator(
    config: OrchestratorConfig,
) -> Result<Orchestrator<EconomyState, EconomyParams>, SimulationError> {
    Orchestrator::new(config, build_pipeline()?)
}
