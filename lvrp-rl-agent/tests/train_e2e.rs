//! End-to-end run: train on a small routing instance, checkpoint,
//! reload and evaluate.

use std::path::PathBuf;

use lvrp_rl_agent::{evaluate, train, Checkpoint, RunConfig};
use lvrp_rl_core::{TrainConfig, FEATURE_COLS};
use lvrp_rl_env::{LvrpConfig, LvrpEnv, TimeLimit};

const STEP_LIMIT: usize = 30;

fn run_config(checkpoint_dir: PathBuf) -> RunConfig {
    RunConfig {
        train: TrainConfig {
            epi_num: 5,
            batch: 4,
            update_tgt: 2,
            store: 5,
            capacity: 256,
            hidden_dims: vec![16],
            learning_rate: 1e-2,
            mask_greedy: false,
            max_steps: Some(STEP_LIMIT),
            checkpoint_dir,
            state_dim: 0,
            action_dim: 0,
        },
        env: LvrpConfig {
            customers: 4,
            capacity: 2,
            region: 10.0,
            seed: 11,
        },
    }
}

#[tokio::test]
async fn five_episode_run_checkpoints_and_evaluates() {
    let dir = std::env::temp_dir().join(format!("lvrp-e2e-{}", uuid::Uuid::new_v4()));
    let config = run_config(dir.clone());

    let env = LvrpEnv::new(config.env.clone()).unwrap();
    let mut env = TimeLimit::new(env, STEP_LIMIT);
    let report = train(&mut env, config.clone()).await.unwrap();

    assert_eq!(report.durations.len(), 5);
    assert!(report
        .durations
        .iter()
        .all(|&d| (1..=STEP_LIMIT).contains(&d)));
    assert_eq!(report.episodes.len(), 5);

    // epi_num / store = 1, so every episode writes a checkpoint
    assert_eq!(report.checkpoints.len(), 5);
    for (i, path) in report.checkpoints.iter().enumerate() {
        assert!(path.exists(), "missing {}", path.display());
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("dqn_{}.json", i + 1)
        );
    }

    let restored = Checkpoint::load(&report.checkpoints[4]).await.unwrap();
    let expected_dim = (config.env.customers + 1) * FEATURE_COLS;
    assert_eq!(restored.config.train.state_dim, expected_dim);
    assert_eq!(restored.config.train.action_dim, config.env.customers + 1);

    let logs = evaluate(&restored, 2).await.unwrap();
    assert_eq!(logs.len(), 2);
    for log in &logs {
        assert!(log.trace.len() <= STEP_LIMIT);
        assert!(log.cost >= 0.0);
    }

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn invalid_config_is_rejected_before_touching_the_env() {
    let dir = std::env::temp_dir().join("lvrp-e2e-invalid");
    let mut config = run_config(dir);
    config.train.update_tgt = 0;

    let mut env = LvrpEnv::new(config.env.clone()).unwrap();
    assert!(train(&mut env, config).await.is_err());
}
