//! End-to-end scenarios through the public API

use approx::assert_relative_eq;
use derivrisk::config::EngineSettings;
use derivrisk::{
    FxForwardEngine, FxForwardRequest, FxSimulationParameters, FxSpotModel, GaussianSampler,
    GbmParams, GbmRequest, OuParams, OuRequest, PathSimulator, ProcessModel,
    SimulationError, SimulationParameters, Simulator, StatsAggregator,
};

fn seeded_simulator() -> Simulator {
    Simulator::new(EngineSettings {
        parallel: true,
        seed: Some(2024),
        ..EngineSettings::default()
    })
}

#[test]
fn single_path_single_step_without_diffusion() {
    let request = GbmRequest {
        paths: 1,
        steps: 1,
        s0: 100.0,
        mu: 0.0,
        sigma: 0.0,
        t: 1.0,
    };
    let out = seeded_simulator().simulate_gbm(&request).unwrap();

    assert_eq!(out.paths, vec![vec![100.0, 100.0]]);
    assert_eq!(out.time_grid.as_slice(), &[0.0, 1.0]);
}

#[test]
fn paths_start_at_initial_value_and_span_the_grid() {
    for (paths, steps, horizon) in [(1, 1, 0.5), (7, 13, 2.0), (50, 200, 1.0), (3, 365, 10.0)] {
        let params = SimulationParameters::new(
            paths,
            steps,
            1.25,
            horizon,
            ProcessModel::Ou(OuParams::new(3.0, 1.0, 0.15)),
        )
        .unwrap();
        let out = PathSimulator::new(params).simulate(&mut GaussianSampler::from_seed(5));

        assert_eq!(out.paths.len(), paths);
        for path in &out.paths {
            assert_eq!(path.len(), steps + 1);
            assert_eq!(path[0], 1.25);
        }

        let grid = out.time_grid.as_slice();
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[steps], horizon);
        assert!(grid.windows(2).all(|w| w[1] > w[0]));
    }
}

#[test]
fn gbm_without_volatility_grows_at_drift() {
    let params = SimulationParameters::new(
        4,
        100,
        50.0,
        2.0,
        ProcessModel::Gbm(GbmParams::new(0.05, 0.0)),
    )
    .unwrap();
    let out = PathSimulator::new(params).simulate_parallel(1);

    for path in &out.paths {
        for (x, t) in path.iter().zip(out.time_grid.as_slice()) {
            assert_relative_eq!(*x, 50.0 * (0.05 * t).exp(), max_relative = 1e-12);
        }
    }
}

#[test]
fn ou_without_reversion_has_no_pull_to_mean() {
    // κ = 0 with a far-away θ: the mean stays at X0 instead of drifting to θ
    let params = SimulationParameters::new(
        10_000,
        50,
        0.0,
        1.0,
        ProcessModel::Ou(OuParams::new(0.0, 100.0, 0.2)),
    )
    .unwrap();
    let out = PathSimulator::new(params).simulate_parallel(3);
    let stats = StatsAggregator.aggregate(&out.paths, &out.time_grid);

    assert!(stats[50].mean.abs() < 0.02, "mean = {}", stats[50].mean);
    // Random walk variance σ²T = 0.04, so p95 ≈ 1.645 * 0.2
    assert!((stats[50].p95 - 0.329).abs() < 0.03, "p95 = {}", stats[50].p95);
}

#[test]
fn fx_flat_market_scenario() {
    let params = FxSimulationParameters {
        path_count: 25,
        step_count: 40,
        spot: 1.0,
        horizon: 1.0,
        domestic_rate: 0.0,
        foreign_rate: 0.0,
        model: FxSpotModel::Gbm { volatility: 0.0 },
    };
    let result = FxForwardEngine::new(params)
        .unwrap()
        .simulate_forward(&mut GaussianSampler::from_seed(0));

    assert_eq!(result.forward_at_inception, 1.0);
    assert!(result.pv_paths.iter().flatten().all(|&pv| pv == 0.0));
    assert!(result
        .pv_stats
        .iter()
        .all(|s| s.mean == 0.0 && s.p5 == 0.0 && s.p95 == 0.0));
}

#[test]
fn fx_pv_is_zero_at_inception_for_both_models() {
    for model in ["gbm", "ou"] {
        let request = FxForwardRequest {
            model: model.to_string(),
            paths: 30,
            steps: 20,
            ..FxForwardRequest::default()
        };
        let result = seeded_simulator().simulate_fx_forward(&request).unwrap();

        assert!(result.pv_paths.iter().all(|p| p[0] == 0.0));
        assert!(result.underlying_paths.iter().all(|p| p[0] == 1.10));
        assert_eq!(result.initial_present_value, 0.0);
        assert_eq!(result.time_grid.len(), 21);
    }
}

#[test]
fn stats_bounds_are_ordered_and_drawn_from_values() {
    let out = seeded_simulator()
        .simulate_gbm(&GbmRequest {
            paths: 20,
            steps: 5,
            ..GbmRequest::default()
        })
        .unwrap();
    let stats = StatsAggregator.aggregate(&out.paths, &out.time_grid);

    assert_eq!(stats.len(), 6);
    for (step, point) in stats.iter().enumerate() {
        let column: Vec<f64> = out.paths.iter().map(|p| p[step]).collect();
        assert!(point.p5 <= point.p95);
        assert!(column.contains(&point.p5));
        assert!(column.contains(&point.p95));
        assert_eq!(point.time, out.time_grid.as_slice()[step]);
    }
}

#[test]
fn degenerate_paths_flow_through_aggregation() {
    let params = SimulationParameters::new(
        20,
        2,
        1.0,
        1.0,
        ProcessModel::Gbm(GbmParams::new(0.0, 1e6)),
    )
    .unwrap();
    let out = PathSimulator::new(params).simulate(&mut GaussianSampler::from_seed(6));
    let stats = StatsAggregator.aggregate(&out.paths, &out.time_grid);

    assert_eq!(stats.len(), 3);
    assert_eq!(stats[0].mean, 1.0);
}

#[test]
fn invalid_requests_are_rejected_up_front() {
    let simulator = seeded_simulator();

    let err = simulator
        .simulate_gbm(&GbmRequest {
            paths: 0,
            ..GbmRequest::default()
        })
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid parameter `paths` = 0: must be at least 1"
    );

    assert!(simulator
        .simulate_ou(&OuRequest {
            t: 0.0,
            ..OuRequest::default()
        })
        .is_err());

    assert!(matches!(
        simulator.simulate_fx_forward(&FxForwardRequest {
            steps: -1,
            ..FxForwardRequest::default()
        }),
        Err(SimulationError::InvalidParameter { parameter: "steps", .. })
    ));
}
