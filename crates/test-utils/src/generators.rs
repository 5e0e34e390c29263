//! Synthetic survey generators.
//!
//! These create predictable, verifiable measurement layouts that can be
//! used across the test suite.

use survey_common::{Dataset, MeasurementRecord, ValueField};

/// A single source at `(x, y)` with the given download speed.
pub fn single_source(x: f64, y: f64, download: f64) -> Dataset {
    Dataset::new(vec![MeasurementRecord::at(x, y, download)])
}

/// Two sources in opposite corners of an 800x600 raster: 40 Mbps at the
/// origin and 90 Mbps at the far corner.
pub fn opposite_corners() -> Dataset {
    Dataset::new(vec![
        MeasurementRecord::at(0.0, 0.0, 40.0),
        MeasurementRecord::at(800.0, 600.0, 90.0),
    ])
}

/// A regular lattice of sources whose value is a plane `a*x + b*y + c`.
///
/// Points are spaced `step` apart starting at `(origin, origin)`.
pub fn planar_lattice(nx: usize, ny: usize, origin: f64, step: f64, a: f64, b: f64, c: f64) -> Dataset {
    let mut records = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let x = origin + i as f64 * step;
            let y = origin + j as f64 * step;
            records.push(MeasurementRecord::at(x, y, a * x + b * y + c));
        }
    }
    Dataset::new(records)
}

/// Scattered sources with deterministic pseudo-random placement.
///
/// Uses a fixed linear congruential sequence so runs are repeatable
/// without pulling in a random number crate.
pub fn scattered_survey(count: usize, width: f64, height: f64, seed: u64) -> Dataset {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    let records = (0..count)
        .map(|i| {
            let x = next() * width;
            let y = next() * height;
            let download = 5.0 + next() * 95.0;
            MeasurementRecord::at(x, y, download)
                .with_value(ValueField::Upload, Some(download / 2.0))
                .with_value(ValueField::Ping, Some(10.0 + i as f64))
                .with_value(ValueField::Rssi, Some(-90.0 + next() * 40.0))
        })
        .collect();
    Dataset::new(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_lattice_values() {
        let data = planar_lattice(3, 2, 10.0, 5.0, 1.0, 2.0, 3.0);
        assert_eq!(data.len(), 6);
        let last = &data.records()[5];
        assert_eq!((last.pixel_x, last.pixel_y), (20.0, 15.0));
        assert_eq!(last.download, Some(20.0 + 30.0 + 3.0));
    }

    #[test]
    fn test_scattered_survey_is_repeatable_and_in_bounds() {
        let a = scattered_survey(50, 800.0, 600.0, 7);
        let b = scattered_survey(50, 800.0, 600.0, 7);
        assert_eq!(a, b);
        for r in a.iter() {
            assert!((0.0..=800.0).contains(&r.pixel_x));
            assert!((0.0..=600.0).contains(&r.pixel_y));
        }
    }
}
