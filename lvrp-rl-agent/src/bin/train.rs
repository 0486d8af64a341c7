//! Training entry point
//!
//! Usage: `train [config.json]`
//!
//! Reads a run configuration (training hyperparameters plus instance
//! geometry), trains a policy on it and writes the training report next
//! to the checkpoints. With the `visualization` feature, also renders
//! the episode-duration curve.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use lvrp_rl_agent::{train, RunConfig};
use lvrp_rl_env::{report, LvrpEnv, TimeLimit};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    let json = tokio::fs::read_to_string(&config_path)
        .await
        .with_context(|| format!("reading run config from {config_path}"))?;
    let config: RunConfig = serde_json::from_str(&json)?;

    tracing::info!(
        episodes = config.train.epi_num,
        customers = config.env.customers,
        "starting training"
    );

    let checkpoint_dir = config.train.checkpoint_dir.clone();
    let env = LvrpEnv::new(config.env.clone())?;
    let outcome = if let Some(limit) = config.train.max_steps {
        train(&mut TimeLimit::new(env, limit), config).await?
    } else {
        let mut env = env;
        train(&mut env, config).await?
    };

    let report_path = checkpoint_dir.join("train_report.json");
    report::write_json(&report_path, &outcome).await?;
    tracing::info!(path = %report_path.display(), "training report written");

    #[cfg(feature = "visualization")]
    {
        let plot_path = checkpoint_dir.join("durations.png");
        report::duration_curve(&plot_path, &outcome.durations)?;
        tracing::info!(path = %plot_path.display(), "duration curve rendered");
    }

    Ok(())
}
