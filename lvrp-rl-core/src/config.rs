//! Training hyperparameter configuration
//!
//! Resolved once at loop start and threaded explicitly through every
//! call; never global state. The `state_dim`/`action_dim` fields are
//! filled in from the environment's spaces before the first episode and
//! travel inside checkpoints so evaluation can rebuild the network.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hyperparameters of one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Total number of episodes
    pub epi_num: usize,
    /// Minibatch size for the optimizer step
    pub batch: usize,
    /// Target-network sync period, in episodes
    pub update_tgt: usize,
    /// Number of checkpoints to produce across the run
    pub store: usize,
    /// Replay memory capacity
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Hidden layer widths of the Q-network
    #[serde(default = "default_hidden_dims")]
    pub hidden_dims: Vec<usize>,
    /// RMSProp learning rate
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    /// Apply the feasibility mask to the greedy branch as well
    #[serde(default)]
    pub mask_greedy: bool,
    /// Truncate episodes after this many steps
    #[serde(default)]
    pub max_steps: Option<usize>,
    /// Directory checkpoints are written to
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,
    /// Flattened observation dimension, resolved from the environment
    #[serde(default)]
    pub state_dim: usize,
    /// Action space size, resolved from the environment
    #[serde(default)]
    pub action_dim: usize,
}

fn default_capacity() -> usize {
    10_000
}

fn default_hidden_dims() -> Vec<usize> {
    vec![128, 128]
}

fn default_learning_rate() -> f32 {
    1e-2
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("saved")
}

impl TrainConfig {
    /// Check the fields the training loop divides or takes modulo by.
    ///
    /// # Errors
    /// Returns `RlError::Agent` if a period or size is zero.
    pub fn validate(&self) -> crate::Result<()> {
        if self.epi_num == 0 {
            return Err(crate::RlError::Agent("epi_num must be positive".into()));
        }
        if self.batch == 0 {
            return Err(crate::RlError::Agent("batch must be positive".into()));
        }
        if self.update_tgt == 0 {
            return Err(crate::RlError::Agent("update_tgt must be positive".into()));
        }
        if self.capacity == 0 {
            return Err(crate::RlError::Agent("capacity must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TrainConfig {
        serde_json::from_str(r#"{"epi_num": 10, "batch": 4, "update_tgt": 2, "store": 5}"#)
            .unwrap()
    }

    #[test]
    fn defaults_fill_in() {
        let c = config();
        assert_eq!(c.capacity, 10_000);
        assert_eq!(c.hidden_dims, vec![128, 128]);
        assert!(!c.mask_greedy);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_periods_are_rejected() {
        let mut c = config();
        c.update_tgt = 0;
        assert!(c.validate().is_err());
        let mut c = config();
        c.batch = 0;
        assert!(c.validate().is_err());
    }
}
