//! Tests for Gaussian radial influence estimation.

use field_estimator::{EstimatorConfig, EstimatorError, FieldEstimator, RadialInfluenceEstimator};
use survey_common::{Dataset, GridBuilder, MeasurementRecord, ValueField};
use test_utils::{assert_approx_eq, opposite_corners, scattered_survey, single_source};

const DOWNLOAD: ValueField = ValueField::Download;

// ============================================================================
// Single source tests
// ============================================================================

#[test]
fn test_single_source_peak_and_falloff() {
    // Step 50 in both directions puts (100, 100) at row 2, col 2.
    let grid = GridBuilder::build(200, 200, 5).unwrap();
    let estimator = RadialInfluenceEstimator::new(50.0).unwrap();

    let field = estimator
        .estimate(&grid, &single_source(100.0, 100.0, 50.0), DOWNLOAD)
        .unwrap()
        .field;

    assert_eq!(field.get(2, 2), Some(50.0));
    // One sigma away: 50 * exp(-0.5).
    assert_approx_eq!(field.get(2, 3).unwrap(), 30.3265, 1e-4);
    assert_approx_eq!(field.get(1, 2).unwrap(), 30.3265, 1e-4);
    // Two sigma away: 50 * exp(-2).
    assert_approx_eq!(field.get(2, 4).unwrap(), 50.0 * (-2.0f64).exp(), 1e-12);
}

#[test]
fn test_monotonic_decay_with_distance() {
    let grid = GridBuilder::build(800, 600, 81).unwrap();
    let estimator = RadialInfluenceEstimator::new(40.0).unwrap();
    let field = estimator
        .estimate(&grid, &single_source(0.0, 0.0, 75.0), DOWNLOAD)
        .unwrap()
        .field;

    let row: Vec<f64> = (0..grid.cols()).map(|c| field.get(0, c).unwrap()).collect();
    for pair in row.windows(2) {
        assert!(pair[1] <= pair[0]);
    }
    assert_eq!(row[0], 75.0);
}

#[test]
fn test_defined_everywhere() {
    let grid = GridBuilder::build(800, 600, 30).unwrap();
    let estimate = RadialInfluenceEstimator::new(25.0)
        .unwrap()
        .estimate(&grid, &opposite_corners(), DOWNLOAD)
        .unwrap();
    assert_eq!(estimate.field.undefined_count(), 0);
    assert!(estimate.warnings.is_empty());
}

// ============================================================================
// Aggregation tests
// ============================================================================

#[test]
fn test_overlapping_sources_take_maximum() {
    let dataset = Dataset::new(vec![
        MeasurementRecord::at(100.0, 100.0, 50.0),
        MeasurementRecord::at(100.0, 100.0, 80.0),
    ]);
    let grid = GridBuilder::build(200, 200, 5).unwrap();
    let field = RadialInfluenceEstimator::new(50.0)
        .unwrap()
        .estimate(&grid, &dataset, DOWNLOAD)
        .unwrap()
        .field;

    assert_eq!(field.get(2, 2), Some(80.0));
    assert_approx_eq!(field.get(2, 3).unwrap(), 80.0 * (-0.5f64).exp(), 1e-12);
}

#[test]
fn test_nearby_sources_do_not_sum() {
    let dataset = Dataset::new(vec![
        MeasurementRecord::at(0.0, 0.0, 60.0),
        MeasurementRecord::at(10.0, 0.0, 60.0),
    ]);
    let grid = GridBuilder::build(10, 10, 3).unwrap();
    let field = RadialInfluenceEstimator::new(50.0)
        .unwrap()
        .estimate(&grid, &dataset, DOWNLOAD)
        .unwrap()
        .field;

    for v in field.cells().iter().flatten() {
        assert!(*v <= 60.0);
    }
    assert_eq!(field.get(0, 0), Some(60.0));
}

#[test]
fn test_parallel_matches_pointwise() {
    let dataset = scattered_survey(25, 800.0, 600.0, 5);
    let samples = dataset.samples(DOWNLOAD);
    let grid = GridBuilder::build(800, 600, 37).unwrap();
    let estimator = RadialInfluenceEstimator::new(60.0).unwrap();
    let field = estimator.estimate(&grid, &dataset, DOWNLOAD).unwrap().field;

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let (x, y) = grid.point(row, col).unwrap();
            assert_eq!(field.get(row, col), estimator.influence_at(&samples, x, y));
        }
    }
}

// ============================================================================
// Parameter and degenerate tests
// ============================================================================

#[test]
fn test_invalid_sigma_rejected() {
    assert!(matches!(
        RadialInfluenceEstimator::new(0.0),
        Err(EstimatorError::InvalidParameter { .. })
    ));
    assert!(matches!(
        EstimatorConfig::radial(-3.0).build(),
        Err(EstimatorError::InvalidParameter { .. })
    ));
}

#[test]
fn test_no_samples_is_degenerate() {
    let dataset = Dataset::new(vec![MeasurementRecord::at(5.0, 5.0, 1.0)]);
    let grid = GridBuilder::build(10, 10, 4).unwrap();
    let estimate = RadialInfluenceEstimator::new(5.0)
        .unwrap()
        .estimate(&grid, &dataset, ValueField::Ping)
        .unwrap();
    assert!(estimate.field.is_all_undefined());
    assert!(estimate.is_degenerate());
}

#[test]
fn test_baseline_for_negative_rssi() {
    let dataset = Dataset::new(vec![MeasurementRecord::at(0.0, 0.0, 0.0).with_value(ValueField::Rssi, Some(-45.0))]);
    let grid = GridBuilder::build(1000, 1000, 2).unwrap();
    let estimator = RadialInfluenceEstimator::new(20.0).unwrap().with_baseline(-100.0);
    let field = estimator.estimate(&grid, &dataset, ValueField::Rssi).unwrap().field;

    assert_eq!(field.get(0, 0), Some(-45.0));
    assert_approx_eq!(field.get(1, 1).unwrap(), -100.0, 1e-9);
}

#[test]
fn test_config_from_yaml() {
    let config: EstimatorConfig = serde_yaml::from_str("kind: radial\nsigma: 35.0\n").unwrap();
    assert_eq!(
        config,
        EstimatorConfig::Radial {
            sigma: 35.0,
            resolution: 100,
            baseline: 0.0
        }
    );
    assert_eq!(config.build().unwrap().name(), "radial(sigma=35)");
}
