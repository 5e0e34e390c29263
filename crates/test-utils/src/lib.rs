//! Test support for the survey heatmap workspace.
//!
//! - [`generators`]: synthetic datasets with known analytic answers
//! - [`fixtures`]: survey tables and base rasters written to temp dirs
//! - [`assert_approx_eq!`]: float comparison with an absolute tolerance

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Assert two numbers differ by at most `tol`.
///
/// ```ignore
/// assert_approx_eq!(field.get(2, 3).unwrap(), 30.3265, 1e-4);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tol:expr) => {{
        let (actual, expected, tol) = ($actual as f64, $expected as f64, $tol as f64);
        assert!(
            (actual - expected).abs() <= tol,
            "assertion failed: {} is not within {} of {} (off by {})",
            actual,
            tol,
            expected,
            (actual - expected).abs()
        );
    }};
}
