//! Logistics vehicle-routing environment for the DQN training core
//!
//! Provides the depot/customer routing environment the agent trains
//! against, a time-limit wrapper and reporting helpers for finished runs.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod lvrp;
pub mod report;
pub mod wrappers;

pub use lvrp::{LvrpConfig, LvrpEnv, DEPOT_TRACE};
pub use wrappers::TimeLimit;
