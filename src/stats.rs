//! Cross-path statistics per time step
//!
//! Percentiles are order statistics, not interpolated estimates:
//! p = sorted[floor(q * n)], with the index clamped to the last element.

use serde::Serialize;
use tracing::warn;

use crate::simulation::TimeGrid;

/// Lower percentile level
pub const P5_LEVEL: f64 = 0.05;
/// Upper percentile level
pub const P95_LEVEL: f64 = 0.95;

/// Summary of all paths at one grid time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsPoint {
    pub time: f64,
    pub mean: f64,
    pub p5: f64,
    pub p95: f64,
}

/// One [`StatsPoint`] per grid index
pub type StatsSeries = Vec<StatsPoint>;

/// Sorted-index position of quantile `level` in a sample of size `n`
///
/// Clamped so that rounding can never push it past the last element.
pub fn percentile_index(level: f64, n: usize) -> usize {
    let raw = (level * n as f64).floor() as usize;
    raw.min(n.saturating_sub(1))
}

/// Order-statistic percentile of an ascending-sorted slice
pub fn percentile_of_sorted(sorted: &[f64], level: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted[percentile_index(level, sorted.len())]
}

/// Reduces an ensemble to per-time-step statistics
#[derive(Debug, Default, Clone, Copy)]
pub struct StatsAggregator;

impl StatsAggregator {
    /// Computes mean, p5 and p95 for every grid index
    ///
    /// Statistics at each index cover only the paths that reach it. A path
    /// shorter than the grid is logged with `warn!` once per call and its
    /// missing indices are left out; an index no path reaches gets NaN for
    /// all three values. NaN values sort to the top under `total_cmp` and
    /// propagate into the mean.
    pub fn aggregate(&self, ensemble: &[Vec<f64>], grid: &TimeGrid) -> StatsSeries {
        let mut values = Vec::with_capacity(ensemble.len());
        let mut degenerate_steps = 0usize;

        let short_paths = ensemble.iter().filter(|p| p.len() < grid.len()).count();
        if short_paths > 0 {
            warn!(
                short_paths,
                grid_points = grid.len(),
                "Ensemble paths shorter than the time grid, missing points are skipped"
            );
        }

        let series: StatsSeries = grid
            .as_slice()
            .iter()
            .enumerate()
            .map(|(step, &time)| {
                values.clear();
                values.extend(ensemble.iter().filter_map(|path| path.get(step).copied()));

                let mean = if values.is_empty() {
                    f64::NAN
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                };
                if !mean.is_finite() {
                    degenerate_steps += 1;
                }

                values.sort_by(|a, b| a.total_cmp(b));

                StatsPoint {
                    time,
                    mean,
                    p5: percentile_of_sorted(&values, P5_LEVEL),
                    p95: percentile_of_sorted(&values, P95_LEVEL),
                }
            })
            .collect();

        if degenerate_steps > 0 {
            warn!(degenerate_steps, "Ensemble contains non-finite values");
        }

        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ensemble_from_columns(columns: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let n_paths = columns[0].len();
        (0..n_paths)
            .map(|p| columns.iter().map(|c| c[p]).collect())
            .collect()
    }

    #[test]
    fn test_percentile_index_clamps() {
        assert_eq!(percentile_index(0.95, 20), 19);
        assert_eq!(percentile_index(0.95, 19), 18);
        assert_eq!(percentile_index(0.05, 20), 1);
        assert_eq!(percentile_index(0.05, 1), 0);
        assert_eq!(percentile_index(0.95, 1), 0);
        assert_eq!(percentile_index(1.0, 20), 19);
    }

    #[test]
    fn test_known_values() {
        // 20 paths, single time point with values 1..=20 in scrambled order
        let mut column: Vec<f64> = (1..=20).map(f64::from).collect();
        column.reverse();
        column.swap(3, 11);
        let ensemble = ensemble_from_columns(&[column]);
        let grid = TimeGrid::new(1.0, 1);

        // Only grid index 0 exists in these one-point paths
        let stats = StatsAggregator.aggregate(&ensemble, &grid);
        assert_eq!(stats.len(), grid.len());
        assert_relative_eq!(stats[0].mean, 10.5);
        assert_eq!(stats[0].p5, 2.0);
        assert_eq!(stats[0].p95, 20.0);
        assert!(stats[1].mean.is_nan());
    }

    #[test]
    fn test_twenty_paths_five_steps() {
        let grid = TimeGrid::new(1.0, 5);
        let ensemble: Vec<Vec<f64>> = (0..20)
            .map(|p| (0..6).map(|s| (p * 10 + s) as f64).collect())
            .collect();

        let stats = StatsAggregator.aggregate(&ensemble, &grid);
        assert_eq!(stats.len(), 6);
        for (step, point) in stats.iter().enumerate() {
            assert_eq!(point.time, grid.as_slice()[step]);
            assert_eq!(point.p5, (10 + step) as f64);
            assert_eq!(point.p95, (190 + step) as f64);
        }
    }

    #[test]
    fn test_percentiles_come_from_values() {
        let grid = TimeGrid::new(2.0, 3);
        let ensemble = vec![
            vec![1.0, 0.3, -2.0, 8.0],
            vec![1.0, 0.9, 4.0, -1.0],
            vec![1.0, 0.1, 0.5, 2.5],
        ];

        for (step, point) in StatsAggregator.aggregate(&ensemble, &grid).iter().enumerate() {
            let column: Vec<f64> = ensemble.iter().map(|p| p[step]).collect();
            assert!(point.p5 <= point.p95);
            assert!(column.contains(&point.p5));
            assert!(column.contains(&point.p95));
        }
    }

    #[test]
    fn test_single_path() {
        let grid = TimeGrid::new(1.0, 2);
        let stats = StatsAggregator.aggregate(&[vec![3.0, 4.0, 5.0]], &grid);

        for (point, expected) in stats.iter().zip([3.0, 4.0, 5.0]) {
            assert_eq!(point.mean, expected);
            assert_eq!(point.p5, expected);
            assert_eq!(point.p95, expected);
        }
    }

    #[test]
    fn test_ragged_ensemble_uses_present_values() {
        let grid = TimeGrid::new(1.0, 3);
        let ensemble = vec![
            vec![1.0, 2.0, 3.0, 4.0],
            vec![1.0, 6.0],
            vec![1.0, 4.0, 9.0],
            vec![],
        ];

        let stats = StatsAggregator.aggregate(&ensemble, &grid);
        assert_eq!(stats.len(), 4);
        assert_eq!(stats[0].mean, 1.0);
        assert_relative_eq!(stats[1].mean, 4.0);
        assert_eq!((stats[1].p5, stats[1].p95), (2.0, 6.0));
        assert_relative_eq!(stats[2].mean, 6.0);
        assert_eq!((stats[2].p5, stats[2].p95), (3.0, 9.0));
        assert_eq!(stats[3].mean, 4.0);
        assert_eq!((stats[3].p5, stats[3].p95), (4.0, 4.0));

        let empty = StatsAggregator.aggregate(&[], &grid);
        assert!(empty.iter().all(|p| p.mean.is_nan() && p.p5.is_nan() && p.p95.is_nan()));
    }

    #[test]
    fn test_non_finite_values_do_not_fault() {
        let grid = TimeGrid::new(1.0, 1);
        let ensemble = vec![
            vec![1.0, f64::NAN],
            vec![1.0, f64::INFINITY],
            vec![1.0, 2.0],
        ];

        let stats = StatsAggregator.aggregate(&ensemble, &grid);
        assert_eq!(stats[0].mean, 1.0);
        assert!(stats[1].mean.is_nan());
        assert_eq!(stats[1].p5, 2.0);
    }
}
