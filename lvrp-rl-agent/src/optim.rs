//! One TD optimization step against a frozen target network
//!
//! Samples a minibatch from replay memory, regresses Q(s,a) of the
//! policy network onto `r + GAMMA * max_a' Q_target(s', a')` under the
//! smooth-L1 (Huber) loss, clips every gradient element to [-1, 1] and
//! applies one RMSProp update to the policy network only. The target
//! network and the replay memory are never mutated here.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use lvrp_rl_core::{NextState, Result, Transition};

use crate::qnet::{MlpQNet, QNetwork};
use crate::replay::ReplayMemory;

/// Discount factor for TD targets
pub const GAMMA: f32 = 0.999;

/// RMSProp optimizer over a flat parameter vector.
///
/// Hyperparameters are the conventional defaults (alpha 0.99, eps 1e-8).
#[derive(Debug, Clone)]
pub struct RmsProp {
    lr: f32,
    alpha: f32,
    eps: f32,
    square_avg: Vec<f32>,
}

/// Serializable optimizer internals, carried inside checkpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RmsPropState {
    /// Learning rate
    pub lr: f32,
    /// Smoothing constant of the running square average
    pub alpha: f32,
    /// Denominator fuzz term
    pub eps: f32,
    /// Running average of squared gradients, one per parameter
    pub square_avg: Vec<f32>,
}

impl RmsProp {
    /// Create an optimizer for a network with `num_params` parameters
    #[must_use]
    pub fn new(lr: f32, num_params: usize) -> Self {
        Self {
            lr,
            alpha: 0.99,
            eps: 1e-8,
            square_avg: vec![0.0; num_params],
        }
    }

    /// Snapshot of the optimizer internals
    #[must_use]
    pub fn state(&self) -> RmsPropState {
        RmsPropState {
            lr: self.lr,
            alpha: self.alpha,
            eps: self.eps,
            square_avg: self.square_avg.clone(),
        }
    }

    /// Rebuild an optimizer from a checkpointed state
    #[must_use]
    pub fn from_state(state: RmsPropState) -> Self {
        Self {
            lr: state.lr,
            alpha: state.alpha,
            eps: state.eps,
            square_avg: state.square_avg,
        }
    }

    /// Apply one update to the network from an already-clipped gradient.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the gradient length differs from
    /// the network's parameter count.
    pub fn step(&mut self, net: &mut MlpQNet, grads: &[f32]) -> Result<()> {
        let mut params = net.parameters();
        if grads.len() != params.len() {
            return Err(lvrp_rl_core::RlError::DimensionMismatch {
                expected: params.len(),
                actual: grads.len(),
            });
        }
        for ((p, &g), sq) in params.iter_mut().zip(grads).zip(&mut self.square_avg) {
            *sq = self.alpha * *sq + (1.0 - self.alpha) * g * g;
            *p -= self.lr * g / (sq.sqrt() + self.eps);
        }
        net.load_parameters(&params)
    }
}

/// Clip every gradient element to [-1, 1] in place
pub fn clip_gradients(grads: &mut [f32]) {
    for g in grads.iter_mut() {
        *g = g.clamp(-1.0, 1.0);
    }
}

fn huber(diff: f32) -> f32 {
    let abs = diff.abs();
    if abs < 1.0 {
        0.5 * diff * diff
    } else {
        abs - 0.5
    }
}

fn huber_grad(diff: f32) -> f32 {
    diff.clamp(-1.0, 1.0)
}

/// Bootstrapped regression labels for a sampled batch.
///
/// Non-terminal successors are stacked into one batch and evaluated by
/// the target network, taking the max over actions; terminal successors
/// contribute a state value of exactly zero.
#[must_use]
pub fn td_targets(transitions: &[&Transition], target_net: &MlpQNet, gamma: f32) -> Array1<f32> {
    let n = transitions.len();
    let mut next_values = Array1::<f32>::zeros(n);

    let continuing: Vec<(usize, &lvrp_rl_core::RouteObservation)> = transitions
        .iter()
        .enumerate()
        .filter_map(|(i, t)| match &t.next_state {
            NextState::Terminal => None,
            NextState::Continuing(obs) => Some((i, obs)),
        })
        .collect();

    if !continuing.is_empty() {
        let mut next_states = Array2::<f32>::zeros((continuing.len(), target_net.input_dim()));
        for (row, (_, obs)) in continuing.iter().enumerate() {
            next_states.row_mut(row).assign(&obs.flat());
        }
        let next_q = target_net.forward(&next_states);
        for (row, (i, _)) in continuing.iter().enumerate() {
            next_values[*i] = next_q
                .row(row)
                .iter()
                .copied()
                .fold(f32::NEG_INFINITY, f32::max);
        }
    }

    let mut targets = Array1::<f32>::zeros(n);
    for (i, t) in transitions.iter().enumerate() {
        targets[i] = t.reward.value() as f32 + gamma * next_values[i];
    }
    targets
}

/// Perform one training update on the policy network.
///
/// A no-op returning `Ok(None)` when the replay memory holds fewer than
/// `batch_size` transitions, and likewise (with a warning) when the loss
/// comes out non-finite. Returns the batch loss otherwise.
///
/// # Errors
/// Propagates sampling and parameter-shape failures, and rejects a
/// batch holding an action index the network has no output for.
pub fn optimize_model(
    memory: &ReplayMemory,
    policy_net: &mut MlpQNet,
    target_net: &MlpQNet,
    optimizer: &mut RmsProp,
    batch_size: usize,
) -> Result<Option<f32>> {
    if memory.len() < batch_size {
        return Ok(None);
    }
    let transitions = memory.sample(batch_size)?;

    for t in &transitions {
        if t.action.index() >= policy_net.num_actions() {
            return Err(lvrp_rl_core::RlError::InvalidAction(format!(
                "stored action {} outside the network's {} outputs",
                t.action.index(),
                policy_net.num_actions()
            )));
        }
    }

    let mut states = Array2::<f32>::zeros((batch_size, policy_net.input_dim()));
    for (i, t) in transitions.iter().enumerate() {
        states.row_mut(i).assign(&t.state.flat());
    }

    let (q_all, acts) = policy_net.forward_cached(&states);
    let q_taken: Vec<f32> = transitions
        .iter()
        .enumerate()
        .map(|(i, t)| q_all[[i, t.action.index()]])
        .collect();

    let targets = td_targets(&transitions, target_net, GAMMA);

    let loss = q_taken
        .iter()
        .zip(targets.iter())
        .map(|(&q, &y)| huber(q - y))
        .sum::<f32>()
        / batch_size as f32;
    if !loss.is_finite() {
        tracing::warn!(loss, "non-finite loss, skipping update");
        return Ok(None);
    }

    let mut grad_out = Array2::<f32>::zeros(q_all.raw_dim());
    for (i, t) in transitions.iter().enumerate() {
        grad_out[[i, t.action.index()]] = huber_grad(q_taken[i] - targets[i]) / batch_size as f32;
    }

    let mut grads = policy_net.backward(&acts, &grad_out);
    clip_gradients(&mut grads);
    optimizer.step(policy_net, &grads)?;

    Ok(Some(loss))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lvrp_rl_core::{DiscreteAction, Reward, RouteObservation, FEATURE_COLS};

    const STATE_ROWS: usize = 3;
    const STATE_DIM: usize = STATE_ROWS * FEATURE_COLS;

    fn obs(fill: f32) -> RouteObservation {
        RouteObservation {
            features: Array2::from_elem((STATE_ROWS, FEATURE_COLS), fill),
        }
    }

    fn transition(reward: f64, next_state: NextState) -> Transition {
        Transition {
            state: obs(0.1),
            action: DiscreteAction(0),
            next_state,
            reward: Reward::new(reward),
        }
    }

    fn nets() -> (MlpQNet, MlpQNet) {
        let policy = MlpQNet::new(STATE_DIM, &[8], STATE_ROWS);
        let mut target = MlpQNet::new(STATE_DIM, &[8], STATE_ROWS);
        target.load_parameters(&policy.parameters()).unwrap();
        (policy, target)
    }

    #[test]
    fn terminal_targets_equal_rewards() {
        let (_, target) = nets();
        let batch = vec![
            transition(-3.0, NextState::Terminal),
            transition(2.5, NextState::Terminal),
        ];
        let refs: Vec<&Transition> = batch.iter().collect();
        let targets = td_targets(&refs, &target, GAMMA);
        assert_relative_eq!(targets[0], -3.0);
        assert_relative_eq!(targets[1], 2.5);
    }

    #[test]
    fn continuing_targets_bootstrap_from_the_target_net() {
        let (_, target) = nets();
        let successor = obs(0.4);
        let max_q = target
            .forward(&successor.flat().insert_axis(ndarray::Axis(0)))
            .row(0)
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        let batch = vec![transition(1.0, NextState::Continuing(successor))];
        let refs: Vec<&Transition> = batch.iter().collect();
        let targets = td_targets(&refs, &target, GAMMA);
        assert_relative_eq!(targets[0], 1.0 + GAMMA * max_q, epsilon = 1e-5);
    }

    #[test]
    fn clipping_bounds_every_element() {
        let mut grads = vec![-7.3, -1.0, -0.2, 0.0, 0.4, 1.0, 55.0];
        clip_gradients(&mut grads);
        assert!(grads.iter().all(|g| (-1.0..=1.0).contains(g)));
        assert_relative_eq!(grads[0], -1.0);
        assert_relative_eq!(grads[4], 0.4);
        assert_relative_eq!(grads[6], 1.0);
    }

    #[test]
    fn undersized_memory_is_a_silent_skip() {
        let (mut policy, target) = nets();
        let before = policy.parameters();
        let mut optimizer = RmsProp::new(1e-2, policy.num_params());
        let memory = ReplayMemory::new(64);
        let outcome =
            optimize_model(&memory, &mut policy, &target, &mut optimizer, 4).unwrap();
        assert!(outcome.is_none());
        assert_eq!(policy.parameters(), before, "nothing mutated");
    }

    #[test]
    fn out_of_range_stored_action_is_rejected() {
        let (mut policy, target) = nets();
        let mut optimizer = RmsProp::new(1e-2, policy.num_params());
        let mut memory = ReplayMemory::new(16);
        for _ in 0..4 {
            memory.push(Transition {
                state: obs(0.1),
                action: DiscreteAction(policy.num_actions() + 4),
                next_state: NextState::Terminal,
                reward: Reward::new(-1.0),
            });
        }
        let err = optimize_model(&memory, &mut policy, &target, &mut optimizer, 4).unwrap_err();
        assert!(matches!(err, lvrp_rl_core::RlError::InvalidAction(_)));
    }

    #[test]
    fn update_moves_policy_but_not_target() {
        let (mut policy, target) = nets();
        let target_before = target.parameters();
        let policy_before = policy.parameters();
        let mut optimizer = RmsProp::new(1e-2, policy.num_params());
        let mut memory = ReplayMemory::new(64);
        for i in 0..8 {
            memory.push(transition(-(i as f64), NextState::Continuing(obs(0.3))));
        }
        let loss = optimize_model(&memory, &mut policy, &target, &mut optimizer, 8)
            .unwrap()
            .expect("enough data to step");
        assert!(loss.is_finite());
        assert_ne!(policy.parameters(), policy_before);
        assert_eq!(target.parameters(), target_before);
    }

    #[test]
    fn optimizer_state_round_trips() {
        let mut optimizer = RmsProp::new(5e-3, 4);
        let state = optimizer.state();
        let rebuilt = RmsProp::from_state(state.clone());
        assert_eq!(rebuilt.state().square_avg, state.square_avg);
        assert_relative_eq!(rebuilt.state().lr, 5e-3);
        optimizer.square_avg[0] = 0.5;
        assert_relative_eq!(optimizer.state().square_avg[0], 0.5);
    }
}
