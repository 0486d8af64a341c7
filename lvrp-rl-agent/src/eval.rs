//! Greedy-policy evaluation from a checkpoint
//!
//! Rebuilds the environment and the Q-network solely from what the
//! checkpoint carries, then rolls out pure-greedy episodes (no
//! exploration, no learning) and records each route and its cost.

use serde::{Deserialize, Serialize};

use lvrp_rl_core::{Environment, Result};
use lvrp_rl_env::LvrpEnv;

use crate::checkpoint::Checkpoint;
use crate::qnet::{MlpQNet, QNetwork};
use crate::select::ActionSelector;

/// Route and cost of one evaluated episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeLog {
    /// Total travel cost of the route
    pub cost: f64,
    /// Visited node sequence, depot returns included
    pub trace: Vec<i64>,
}

/// Roll out `epi_num` greedy episodes from a checkpointed policy.
///
/// Episodes are cut off at the configured `max_steps` (when set), which
/// keeps an untrained unmasked policy from circling forever.
///
/// # Errors
/// Returns environment and parameter-restore failures.
pub async fn evaluate(checkpoint: &Checkpoint, epi_num: usize) -> Result<Vec<EpisodeLog>> {
    let train = &checkpoint.config.train;
    let mut env = LvrpEnv::new(checkpoint.config.env.clone())?;

    let mut net = MlpQNet::new(train.state_dim, &train.hidden_dims, train.action_dim);
    net.load_parameters(&checkpoint.parameters)?;
    let selector = ActionSelector::new(train.mask_greedy);

    let mut logs = Vec::with_capacity(epi_num);
    for episode in 0..epi_num {
        let mut state = env.reset().await?;
        let mut steps = 0usize;
        loop {
            let action = selector.greedy(&state, &net)?;
            let step = env.step(action).await?;
            steps += 1;
            if step.done || train.max_steps.is_some_and(|limit| steps >= limit) {
                break;
            }
            state = step.observation;
        }
        let log = EpisodeLog {
            cost: env.split_cost(),
            trace: env.trace().to_vec(),
        };
        tracing::info!(episode, cost = log.cost, steps, "evaluation episode");
        logs.push(log);
    }
    Ok(logs)
}

/// Render one routing-trace image per evaluated episode, keyed by the
/// episode index (`route_0.png`, `route_1.png`, ...).
///
/// # Errors
/// Propagates drawing and IO failures.
#[cfg(feature = "visualization")]
pub fn render_routes(
    dir: &std::path::Path,
    coords: &[(f64, f64)],
    logs: &[EpisodeLog],
) -> Result<Vec<std::path::PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(logs.len());
    for (episode, log) in logs.iter().enumerate() {
        let path = dir.join(format!("route_{episode}.png"));
        lvrp_rl_env::report::route_trace(&path, coords, &log.trace)?;
        paths.push(path);
    }
    Ok(paths)
}
