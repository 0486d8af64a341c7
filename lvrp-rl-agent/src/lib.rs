//! Experience-replay DQN training core
//!
//! This crate implements the sequential decision/training loop for the
//! routing environment: replay memory, epsilon-greedy action selection,
//! the TD optimization step against a frozen target network, target
//! synchronization, checkpointing and greedy evaluation.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod checkpoint;
pub mod eval;
pub mod optim;
pub mod qnet;
pub mod replay;
pub mod schedule;
pub mod select;
pub mod trainer;

// Re-export the training surface
pub use checkpoint::{Checkpoint, RunConfig};
pub use eval::{evaluate, EpisodeLog};
#[cfg(feature = "visualization")]
pub use eval::render_routes;
pub use optim::{clip_gradients, optimize_model, td_targets, RmsProp, RmsPropState, GAMMA};
pub use qnet::{MlpQNet, QNetwork};
pub use replay::ReplayMemory;
pub use schedule::{ExponentialDecay, Schedule};
pub use select::ActionSelector;
pub use trainer::{train, TrainingReport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        evaluate, optimize_model, train, ActionSelector, Checkpoint, MlpQNet, QNetwork,
        ReplayMemory, RmsProp, RunConfig,
    };
    pub use lvrp_rl_core::prelude::*;
}
