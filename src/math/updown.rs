//! Elevation gain/loss accumulation.
//!
//! Small oscillations in a recorded elevation profile inflate the cumulative
//! gain and loss. We use a hysteresis band: a change only counts once the
//! profile has moved at least `min_diff` away from the last confirmed
//! reference elevation.
//!
//! With `min_diff <= 0` this degenerates to summing every positive and every
//! negative step.

use crate::domain::ElevationUpDown;

/// Accumulate elevation gain and loss over `elevation`.
pub fn elevation_up_down(elevation: &[f64], min_diff: f64) -> ElevationUpDown {
    let mut up = 0.0;
    let mut down = 0.0;

    let Some(&first) = elevation.first() else {
        return ElevationUpDown { up, down };
    };

    let threshold = if min_diff.is_finite() { min_diff.max(0.0) } else { 0.0 };
    let mut reference = first;

    for window in elevation.windows(2) {
        let z = window[1];
        if !z.is_finite() {
            continue;
        }

        if threshold <= 0.0 {
            let dz = z - window[0];
            if dz > 0.0 {
                up += dz;
            } else if dz < 0.0 {
                down -= dz;
            }
        } else if z >= reference + threshold {
            up += z - reference;
            reference = z;
        } else if z <= reference - threshold {
            down += reference - z;
            reference = z;
        }
    }

    ElevationUpDown { up, down }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_sum_without_threshold() {
        let ud = elevation_up_down(&[100.0, 110.0, 105.0, 120.0], 0.0);
        assert!((ud.up - 25.0).abs() < 1e-12);
        assert!((ud.down - 5.0).abs() < 1e-12);
    }

    #[test]
    fn hysteresis_ignores_small_noise() {
        let noisy = [100.0, 101.0, 100.0, 101.0, 100.0, 110.0];
        let ud = elevation_up_down(&noisy, 3.0);
        assert!((ud.up - 10.0).abs() < 1e-12);
        assert_eq!(ud.down, 0.0);
    }

    #[test]
    fn empty_series_has_no_gain() {
        let ud = elevation_up_down(&[], 5.0);
        assert_eq!(ud.up, 0.0);
        assert_eq!(ud.down, 0.0);
    }
}
