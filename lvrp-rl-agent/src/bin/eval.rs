//! Evaluation entry point
//!
//! Usage: `eval <checkpoint.json> [episodes]`
//!
//! Loads a checkpoint, rolls out greedy episodes on the instance it was
//! trained on and writes the per-episode routes and costs as JSON. With
//! the `visualization` feature, also renders one route image per episode.

use std::path::Path;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use lvrp_rl_agent::{evaluate, Checkpoint};
use lvrp_rl_env::report;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let checkpoint_path = args.next().context("usage: eval <checkpoint.json> [episodes]")?;
    let epi_num: usize = args.next().map_or(Ok(10), |n| n.parse())?;

    let checkpoint = Checkpoint::load(Path::new(&checkpoint_path)).await?;
    tracing::info!(
        checkpoint = %checkpoint_path,
        episodes = epi_num,
        customers = checkpoint.config.env.customers,
        "starting evaluation"
    );

    let logs = evaluate(&checkpoint, epi_num).await?;
    let out_dir = checkpoint.config.train.checkpoint_dir.clone();
    let log_path = out_dir.join("eval_log.json");
    report::write_json(&log_path, &logs).await?;
    tracing::info!(path = %log_path.display(), "evaluation log written");

    #[cfg(feature = "visualization")]
    {
        let env = lvrp_rl_env::LvrpEnv::new(checkpoint.config.env.clone())?;
        let paths = lvrp_rl_agent::render_routes(&out_dir, env.all_coord(), &logs)?;
        tracing::info!(count = paths.len(), dir = %out_dir.display(), "route images rendered");
    }

    Ok(())
}
