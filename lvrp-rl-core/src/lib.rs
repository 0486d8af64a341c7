//! Core types and traits for the logistics vehicle-routing DQN
//!
//! This crate provides the foundational abstractions shared by the
//! training agent and the environment: observations with a feasibility
//! mask, transitions, rewards, discrete actions and the environment seam.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod config;
pub mod environment;
pub mod error;
pub mod observation;
pub mod reward;
pub mod transition;

// Re-export core traits and types
pub use action::{DiscreteAction, DiscreteSpace};
pub use config::TrainConfig;
pub use environment::{Environment, EpisodeRecord, Step, StepInfo};
pub use error::{Result, RlError};
pub use observation::{RouteObservation, RouteObservationSpace, FEASIBLE_COL, FEATURE_COLS};
pub use reward::Reward;
pub use transition::{NextState, Transition};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        DiscreteAction, DiscreteSpace, Environment, NextState, Result, Reward,
        RouteObservation, RouteObservationSpace, Step, TrainConfig, Transition,
    };
}
