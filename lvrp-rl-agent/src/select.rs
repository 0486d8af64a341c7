//! Epsilon-greedy action selection
//!
//! Exploration draws only from the actions the observation flags as
//! accessible; exploitation argmaxes the full action-value vector and
//! can pick an infeasible action. That asymmetry is deliberate;
//! `mask_greedy` switches it off by masking both branches.

use ndarray::Axis;
use rand::Rng;

use lvrp_rl_core::{DiscreteAction, Result, RlError, RouteObservation};

use crate::qnet::QNetwork;
use crate::schedule::{ExponentialDecay, Schedule};

const EPS_START: f64 = 0.9;
const EPS_END: f64 = 0.05;
const EPS_DECAY: f64 = 200.0;

/// Epsilon-greedy policy over a Q-network
pub struct ActionSelector {
    schedule: ExponentialDecay,
    mask_greedy: bool,
}

impl ActionSelector {
    /// Create a selector with the standard 0.9 → 0.05 decay
    #[must_use]
    pub fn new(mask_greedy: bool) -> Self {
        Self {
            schedule: ExponentialDecay::new(EPS_START, EPS_END, EPS_DECAY),
            mask_greedy,
        }
    }

    /// Create a selector with a custom epsilon schedule
    #[must_use]
    pub fn with_schedule(schedule: ExponentialDecay, mask_greedy: bool) -> Self {
        Self {
            schedule,
            mask_greedy,
        }
    }

    /// Exploration probability at the given step count
    #[must_use]
    pub fn epsilon(&self, steps_done: usize) -> f64 {
        self.schedule.value(steps_done)
    }

    /// Select an action and return it with the incremented step counter.
    ///
    /// The counter increments unconditionally, exploit or explore, and
    /// epsilon is evaluated at the pre-increment count.
    ///
    /// # Errors
    /// Returns `NoFeasibleAction` if an exploration draw finds the
    /// feasibility set empty (or a masked greedy draw does).
    pub fn select(
        &self,
        state: &RouteObservation,
        steps_done: usize,
        policy_net: &dyn QNetwork,
    ) -> Result<(DiscreteAction, usize)> {
        let eps_threshold = self.schedule.value(steps_done);
        let steps_done = steps_done + 1;

        let mut rng = rand::thread_rng();
        let sample: f64 = rng.gen();
        if sample > eps_threshold {
            let action = self.greedy(state, policy_net)?;
            Ok((action, steps_done))
        } else {
            let access = state.accessible();
            if access.is_empty() {
                return Err(RlError::NoFeasibleAction);
            }
            let action = access[rng.gen_range(0..access.len())];
            Ok((DiscreteAction(action), steps_done))
        }
    }

    /// Pure greedy choice: argmax of the network's action values.
    ///
    /// # Errors
    /// Returns `NoFeasibleAction` only when `mask_greedy` is set and the
    /// feasibility set is empty.
    pub fn greedy(
        &self,
        state: &RouteObservation,
        policy_net: &dyn QNetwork,
    ) -> Result<DiscreteAction> {
        let input = state.flat().insert_axis(Axis(0));
        let values = policy_net.forward(&input);
        let row = values.row(0);

        let candidates: Vec<usize> = if self.mask_greedy {
            let access = state.accessible();
            if access.is_empty() {
                return Err(RlError::NoFeasibleAction);
            }
            access
        } else {
            (0..row.len()).collect()
        };

        let mut best = candidates[0];
        let mut best_value = f32::NEG_INFINITY;
        for &idx in &candidates {
            if row[idx] > best_value {
                best_value = row[idx];
                best = idx;
            }
        }
        Ok(DiscreteAction(best))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvrp_rl_core::FEATURE_COLS;
    use ndarray::Array2;

    /// Network whose output is fixed per action, independent of input.
    struct FixedNet {
        values: Vec<f32>,
    }

    impl QNetwork for FixedNet {
        fn forward(&self, batch: &Array2<f32>) -> Array2<f32> {
            Array2::from_shape_fn((batch.nrows(), self.values.len()), |(_, j)| self.values[j])
        }

        fn num_actions(&self) -> usize {
            self.values.len()
        }

        fn parameters(&self) -> Vec<f32> {
            self.values.clone()
        }

        fn load_parameters(&mut self, params: &[f32]) -> Result<()> {
            self.values = params.to_vec();
            Ok(())
        }
    }

    fn state(feasible: &[bool]) -> RouteObservation {
        let mut features = Array2::zeros((feasible.len(), FEATURE_COLS));
        for (i, &f) in feasible.iter().enumerate() {
            features[[i, lvrp_rl_core::FEASIBLE_COL]] = f32::from(u8::from(f));
        }
        RouteObservation { features }
    }

    #[test]
    fn exploring_stays_within_the_accessible_set() {
        // eps pinned at 1.0: every draw explores
        let selector =
            ActionSelector::with_schedule(ExponentialDecay::new(1.0, 1.0, 200.0), false);
        let net = FixedNet {
            values: vec![0.0, 0.0, 9.0, 0.0],
        };
        let obs = state(&[false, true, false, true]);
        for _ in 0..50 {
            let (action, _) = selector.select(&obs, 0, &net).unwrap();
            assert!([1, 3].contains(&action.index()));
        }
    }

    #[test]
    fn exploiting_ignores_the_mask_by_default() {
        // eps pinned at 0.0: every draw exploits
        let selector =
            ActionSelector::with_schedule(ExponentialDecay::new(0.0, 0.0, 200.0), false);
        let net = FixedNet {
            values: vec![0.0, 0.0, 9.0, 0.0],
        };
        // best-valued action is infeasible; the greedy branch picks it anyway
        let obs = state(&[true, true, false, true]);
        let (action, steps) = selector.select(&obs, 41, &net).unwrap();
        assert_eq!(action.index(), 2);
        assert_eq!(steps, 42, "counter increments per call");
    }

    #[test]
    fn mask_greedy_restricts_the_argmax() {
        let selector =
            ActionSelector::with_schedule(ExponentialDecay::new(0.0, 0.0, 200.0), true);
        let net = FixedNet {
            values: vec![1.0, 5.0, 9.0, 3.0],
        };
        let obs = state(&[true, true, false, true]);
        let (action, _) = selector.select(&obs, 0, &net).unwrap();
        assert_eq!(action.index(), 1, "best among feasible");
    }

    #[test]
    fn empty_mask_fails_exploration() {
        let selector =
            ActionSelector::with_schedule(ExponentialDecay::new(1.0, 1.0, 200.0), false);
        let net = FixedNet {
            values: vec![0.0, 0.0],
        };
        let err = selector.select(&state(&[false, false]), 0, &net).unwrap_err();
        assert!(matches!(err, RlError::NoFeasibleAction));
    }

    #[test]
    fn default_schedule_decays_from_point_nine() {
        let selector = ActionSelector::new(false);
        assert!((selector.epsilon(0) - 0.9).abs() < 1e-12);
        assert!(selector.epsilon(10_000) < 0.051);
    }
}
