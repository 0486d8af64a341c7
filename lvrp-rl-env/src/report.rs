//! Reporting artifacts for finished runs
//!
//! JSON logs are always available; PNG plots (duration curve after
//! training, routing traces after evaluation) are behind the
//! `visualization` feature.

use std::path::Path;

use lvrp_rl_core::Result;
use serde::Serialize;

/// Write any serializable log to a pretty-printed JSON file.
///
/// # Errors
/// Propagates serialization and I/O failures.
pub async fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, json).await?;
    Ok(())
}

#[cfg(feature = "visualization")]
pub use plots::{duration_curve, route_trace};

#[cfg(feature = "visualization")]
mod plots {
    use std::path::Path;

    use plotters::prelude::*;

    use crate::DEPOT_TRACE;

    /// Plot per-episode durations, with a 100-episode running mean once
    /// enough episodes exist.
    ///
    /// # Errors
    /// Fails on drawing-backend errors.
    pub fn duration_curve(path: impl AsRef<Path>, durations: &[usize]) -> anyhow::Result<()> {
        let max = durations.iter().copied().max().unwrap_or(1) as f64;
        let root = BitMapBackend::new(path.as_ref(), (800, 600)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow::anyhow!("{e}"))?;
        let mut chart = ChartBuilder::on(&root)
            .caption("Training", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(40)
            .build_cartesian_2d(0f64..durations.len() as f64, 0f64..max * 1.05)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        chart
            .configure_mesh()
            .x_desc("Episode")
            .y_desc("Duration")
            .draw()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        chart
            .draw_series(LineSeries::new(
                durations
                    .iter()
                    .enumerate()
                    .map(|(i, &d)| (i as f64, d as f64)),
                &BLUE,
            ))
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        if durations.len() >= 100 {
            let means: Vec<(f64, f64)> = durations
                .windows(100)
                .enumerate()
                .map(|(i, w)| {
                    let mean = w.iter().sum::<usize>() as f64 / w.len() as f64;
                    ((i + 99) as f64, mean)
                })
                .collect();
            chart
                .draw_series(LineSeries::new(means, &RED))
                .map_err(|e| anyhow::anyhow!("{e}"))?;
        }
        root.present().map_err(|e| anyhow::anyhow!("{e}"))?;
        Ok(())
    }

    /// Plot one evaluation episode's routing trace over the instance
    /// geometry. Depot visits (`DEPOT_TRACE`) map back to the origin.
    ///
    /// # Errors
    /// Fails on drawing-backend errors.
    pub fn route_trace(
        path: impl AsRef<Path>,
        coords: &[(f64, f64)],
        trace: &[i64],
    ) -> anyhow::Result<()> {
        let reach = coords
            .iter()
            .flat_map(|&(x, y)| [x.abs(), y.abs()])
            .fold(1.0f64, f64::max)
            * 1.1;
        let root = BitMapBackend::new(path.as_ref(), (1000, 1000)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow::anyhow!("{e}"))?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(40)
            .build_cartesian_2d(-reach..reach, -reach..reach)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        chart
            .configure_mesh()
            .draw()
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        chart
            .draw_series(
                coords
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 5, BLUE.filled())),
            )
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        chart
            .draw_series(std::iter::once(TriangleMarker::new((0.0, 0.0), 10, &BLACK)))
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        let point_of = |entry: i64| -> (f64, f64) {
            if entry == DEPOT_TRACE {
                (0.0, 0.0)
            } else {
                coords[entry as usize]
            }
        };
        let mut prev = (0.0, 0.0);
        for &entry in trace {
            let next = point_of(entry);
            chart
                .draw_series(LineSeries::new([prev, next], &RED))
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            prev = next;
        }
        root.present().map_err(|e| anyhow::anyhow!("{e}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_json_round_trips() {
        let path = std::env::temp_dir().join(format!("lvrp-report-{}.json", std::process::id()));
        write_json(&path, &vec![3usize, 1, 4]).await.unwrap();
        let back: Vec<usize> =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(back, vec![3, 1, 4]);
        let _ = tokio::fs::remove_file(&path).await;
    }
}
