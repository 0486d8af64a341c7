//! Environment traits and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{DiscreteAction, DiscreteSpace, Reward, RouteObservation, RouteObservationSpace};

/// Result of a single environment step
#[derive(Debug, Clone)]
pub struct Step {
    /// Observation after the step
    pub observation: RouteObservation,
    /// Reward signal
    pub reward: Reward,
    /// Whether the episode is done
    pub done: bool,
    /// Whether the episode was truncated (e.g., time limit)
    pub truncated: bool,
    /// Additional info from the environment
    pub info: StepInfo,
}

/// Additional information from a step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepInfo {
    /// Custom fields
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Bookkeeping record for one finished training episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Episode ID
    pub id: uuid::Uuid,
    /// Number of steps taken
    pub steps: usize,
    /// Sum of rewards over the episode
    pub total_reward: f64,
    /// Start time
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// End time
    pub finished_at: chrono::DateTime<chrono::Utc>,
}

/// Core environment trait.
///
/// The training loop drives this seam strictly sequentially; an
/// implementation never runs concurrently with the optimizer step.
#[async_trait]
pub trait Environment: Send + Sync {
    /// Get the observation space
    fn observation_space(&self) -> RouteObservationSpace;

    /// Get the action space
    fn action_space(&self) -> DiscreteSpace;

    /// Reset the environment and return the initial observation
    async fn reset(&mut self) -> crate::Result<RouteObservation>;

    /// Take a step in the environment
    async fn step(&mut self, action: DiscreteAction) -> crate::Result<Step>;
}
