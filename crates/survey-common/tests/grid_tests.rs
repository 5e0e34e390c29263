//! Tests for evaluation grid construction.

use survey_common::grid::{linspace, GridBuilder};
use survey_common::SurveyError;

// ============================================================================
// Shape tests
// ============================================================================

#[test]
fn test_square_grid_shape() {
    let grid = GridBuilder::build(800, 600, 300).unwrap();
    assert_eq!(grid.shape(), (300, 300));
    assert_eq!(grid.x_mesh().len(), 300 * 300);
    assert_eq!(grid.y_mesh().len(), 300 * 300);
}

#[test]
fn test_rectangular_grid_shape() {
    let grid = GridBuilder::build_with_shape(800, 600, 30, 40).unwrap();
    assert_eq!(grid.rows(), 30);
    assert_eq!(grid.cols(), 40);
    assert_eq!(grid.xs().len(), 40);
    assert_eq!(grid.ys().len(), 30);
}

// ============================================================================
// Extent tests
// ============================================================================

#[test]
fn test_grid_spans_raster_inclusive() {
    let grid = GridBuilder::build(800, 600, 300).unwrap();
    assert_eq!(grid.point(0, 0), Some((0.0, 0.0)));
    assert_eq!(grid.point(299, 299), Some((800.0, 600.0)));
    assert_eq!(grid.point(0, 299), Some((800.0, 0.0)));
    assert_eq!(grid.point(299, 0), Some((0.0, 600.0)));
}

#[test]
fn test_grid_uniform_spacing() {
    let grid = GridBuilder::build(100, 100, 11).unwrap();
    for (i, x) in grid.xs().iter().enumerate() {
        assert!((x - 10.0 * i as f64).abs() < 1e-9);
    }
}

#[test]
fn test_mesh_pairs_every_x_with_every_y() {
    let grid = GridBuilder::build_with_shape(10, 20, 3, 2).unwrap();
    let points: Vec<(f64, f64)> = grid.points().collect();
    assert_eq!(
        points,
        vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (0.0, 20.0),
            (10.0, 20.0),
        ]
    );
}

// ============================================================================
// Boundary tests
// ============================================================================

#[test]
fn test_resolution_one_is_single_origin_cell() {
    let grid = GridBuilder::build(800, 600, 1).unwrap();
    assert_eq!(grid.shape(), (1, 1));
    assert_eq!(grid.point(0, 0), Some((0.0, 0.0)));
    assert_eq!(grid.x_mesh(), &[0.0]);
    assert_eq!(grid.y_mesh(), &[0.0]);
}

#[test]
fn test_zero_inputs_rejected() {
    assert!(matches!(
        GridBuilder::build(0, 600, 10),
        Err(SurveyError::InvalidGrid { .. })
    ));
    assert!(GridBuilder::build(800, 0, 10).is_err());
    assert!(GridBuilder::build(800, 600, 0).is_err());
}

#[test]
fn test_grid_is_deterministic() {
    let a = GridBuilder::build(1234, 567, 97).unwrap();
    let b = GridBuilder::build(1234, 567, 97).unwrap();
    let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(a.x_mesh()), bits(b.x_mesh()));
    assert_eq!(bits(a.y_mesh()), bits(b.y_mesh()));
}

#[test]
fn test_linspace_two_points() {
    assert_eq!(linspace(0.0, 5.0, 2), vec![0.0, 5.0]);
}
