//! JSON checkpointing of training runs
//!
//! A checkpoint is self-contained: the run configuration, the policy
//! network's flat parameter snapshot and the optimizer internals. That
//! is enough to resume training or to rebuild the greedy policy for
//! evaluation without access to the process that produced it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use lvrp_rl_core::{Result, TrainConfig};
use lvrp_rl_env::LvrpConfig;

use crate::optim::RmsPropState;

/// Everything that defines a run: training knobs plus the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Training hyperparameters
    pub train: TrainConfig,
    /// Routing environment parameters
    pub env: LvrpConfig,
}

impl RunConfig {
    /// Validate the training half of the configuration; the environment
    /// half is checked by the environment's constructor.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        self.train.validate()
    }
}

/// On-disk snapshot of a run at some episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Configuration the run was started with
    pub config: RunConfig,
    /// Flat policy-network parameters
    pub parameters: Vec<f32>,
    /// Optimizer internals at snapshot time
    pub optimizer: RmsPropState,
}

impl Checkpoint {
    /// Path of the checkpoint written after `episode` (1-based)
    #[must_use]
    pub fn path_for(dir: &Path, episode: usize) -> PathBuf {
        dir.join(format!("dqn_{episode}.json"))
    }

    /// Write the checkpoint as pretty JSON, creating parent directories.
    ///
    /// # Errors
    /// Returns IO or serialization failures.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).await?;
        Ok(())
    }

    /// Read a checkpoint back from disk.
    ///
    /// # Errors
    /// Returns IO or deserialization failures.
    pub async fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&json)?)
    }
}
