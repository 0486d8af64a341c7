//! The DQN training loop
//!
//! Strictly sequential: select, step the environment, store the
//! transition, run one optimizer update, repeat until the episode ends.
//! The target network is re-synced from the policy network after every
//! `update_tgt`-th episode (episode 0 included, so the first sync
//! already carries learned parameters), and checkpoints land every
//! `epi_num / store` episodes.

use std::path::PathBuf;

use serde::Serialize;

use lvrp_rl_core::{Environment, EpisodeRecord, NextState, Result, Transition};

use crate::checkpoint::{Checkpoint, RunConfig};
use crate::optim::{optimize_model, RmsProp};
use crate::qnet::{MlpQNet, QNetwork};
use crate::replay::ReplayMemory;
use crate::select::ActionSelector;

/// Outcome of a full training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    /// Steps taken in each episode, in order
    pub durations: Vec<usize>,
    /// Per-episode bookkeeping
    pub episodes: Vec<EpisodeRecord>,
    /// Checkpoint files written during the run
    pub checkpoints: Vec<PathBuf>,
}

/// Train a fresh policy network on the given environment.
///
/// The observation and action dimensions are resolved from the
/// environment's spaces and written back into the configuration so that
/// checkpoints can rebuild the network on their own.
///
/// # Errors
/// Returns validation, environment, optimization and IO failures; the
/// run stops at the first one.
pub async fn train<E: Environment>(env: &mut E, mut config: RunConfig) -> Result<TrainingReport> {
    config.validate()?;
    config.train.state_dim = env.observation_space().dim();
    config.train.action_dim = env.action_space().n;

    let mut policy_net = MlpQNet::new(
        config.train.state_dim,
        &config.train.hidden_dims,
        config.train.action_dim,
    );
    let mut target_net = MlpQNet::new(
        config.train.state_dim,
        &config.train.hidden_dims,
        config.train.action_dim,
    );
    target_net.load_parameters(&policy_net.parameters())?;

    let mut optimizer = RmsProp::new(config.train.learning_rate, policy_net.num_params());
    let mut memory = ReplayMemory::new(config.train.capacity);
    let selector = ActionSelector::new(config.train.mask_greedy);
    let mut steps_done = 0usize;

    // zero store means no checkpoints; the remainder after division
    // never triggers a write
    let store_step = if config.train.store > 0 {
        config.train.epi_num / config.train.store
    } else {
        0
    };

    let mut report = TrainingReport {
        durations: Vec::with_capacity(config.train.epi_num),
        episodes: Vec::with_capacity(config.train.epi_num),
        checkpoints: Vec::new(),
    };

    for i_episode in 0..config.train.epi_num {
        let started_at = chrono::Utc::now();
        let mut state = env.reset().await?;
        let mut total_reward = 0.0;
        let mut duration = 0usize;

        loop {
            let (action, next_steps_done) = selector.select(&state, steps_done, &policy_net)?;
            steps_done = next_steps_done;

            let step = env.step(action).await?;
            let finished = step.done || step.truncated;
            total_reward += step.reward.value();
            duration += 1;

            let next_state = if finished {
                NextState::Terminal
            } else {
                NextState::Continuing(step.observation.clone())
            };
            memory.push(Transition {
                state: state.clone(),
                action,
                next_state,
                reward: step.reward,
            });

            optimize_model(
                &memory,
                &mut policy_net,
                &target_net,
                &mut optimizer,
                config.train.batch,
            )?;

            if finished {
                break;
            }
            state = step.observation;
        }

        if i_episode % config.train.update_tgt == 0 {
            target_net.load_parameters(&policy_net.parameters())?;
        }

        let finished_at = chrono::Utc::now();
        tracing::info!(
            episode = i_episode,
            steps = duration,
            total_reward,
            epsilon = selector.epsilon(steps_done),
            "episode finished"
        );
        report.durations.push(duration);
        report.episodes.push(EpisodeRecord {
            id: uuid::Uuid::new_v4(),
            steps: duration,
            total_reward,
            started_at,
            finished_at,
        });

        if store_step > 0 && (i_episode + 1) % store_step == 0 {
            let path = Checkpoint::path_for(&config.train.checkpoint_dir, i_episode + 1);
            let checkpoint = Checkpoint {
                config: config.clone(),
                parameters: policy_net.parameters(),
                optimizer: optimizer.state(),
            };
            checkpoint.save(&path).await?;
            tracing::info!(episode = i_episode, path = %path.display(), "checkpoint written");
            report.checkpoints.push(path);
        }
    }

    Ok(report)
}
