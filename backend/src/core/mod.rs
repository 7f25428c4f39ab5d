//! Core time handling shared by the engine and the economy model

pub mod time;

pub use time::{TimeScale, DAY_TO_SECONDS};
