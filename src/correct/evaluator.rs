//! Reference + spline correction.
//!
//! Inside the correction window every sample receives two terms:
//!
//! - a fade of the first-sample reference gap, full at `x = 0` and gone at the
//!   window's right edge
//! - the value of a natural cubic spline through the model's control points
//!
//! Samples outside the window are passed through unchanged. Both terms come
//! from the unshifted reference; the difference series is measured against
//! the working (possibly shifted) one. Evaluation never fails: a spline that
//! cannot be built, or a query outside its domain, contributes zero.

use crate::domain::{AdjustedElevationResult, CorrectionWindow, XAxis};
use crate::math::{CubicSpline, elevation_up_down};
use crate::series::SeriesStore;

use super::spline_model::SplineModel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineEvaluator {
    pub axis: XAxis,
    /// Hysteresis threshold for the gain/loss summary.
    pub min_alti_diff: f64,
}

impl SplineEvaluator {
    pub fn new(axis: XAxis, min_alti_diff: f64) -> Self {
        Self {
            axis,
            min_alti_diff,
        }
    }

    pub fn evaluate(
        &self,
        window: CorrectionWindow,
        model: &SplineModel,
        store: &SeriesStore,
    ) -> AdjustedElevationResult {
        let source = store.elevation();

        let Some(unit) = store.first_slice_elevation_diff() else {
            log::debug!("spline correction skipped: no reference series");
            return passthrough(store, self.min_alti_diff);
        };
        if window.is_degenerate() || model.is_empty() {
            return passthrough(store, self.min_alti_diff);
        }

        let x = store.x_values(self.axis);
        let bounds = window.bounds(x);
        let (knots_x, knots_y) = model.absolute_knots(bounds);
        let kernel = match CubicSpline::new(&knots_x, &knots_y) {
            Ok(k) => Some(k),
            Err(e) => {
                log::debug!("spline kernel unavailable: {e}");
                None
            }
        };

        let n = source.len();
        let mut corrected = Vec::with_capacity(n);
        let mut curve = vec![0.0; n];

        for i in 0..n {
            let value = if window.contains(i) {
                let xi = x[i];
                let fade = if bounds.right_x != 0.0 { 1.0 - xi / bounds.right_x } else { 0.0 };
                let spline = match &kernel {
                    Some(k) => k.interpolate(xi).unwrap_or_else(|e| {
                        log::debug!("spline query at sample {i} dropped: {e}");
                        0.0
                    }),
                    None => 0.0,
                };
                curve[i] = spline;
                source[i] + fade * unit + spline
            } else {
                source[i]
            };
            corrected.push(value);
        }

        let diff = store.diff_from(&corrected);
        finish(corrected, diff, Some(curve), self.min_alti_diff)
    }
}

/// Result that leaves the working elevation unchanged.
pub fn passthrough(store: &SeriesStore, min_alti_diff: f64) -> AdjustedElevationResult {
    let source = store.elevation().to_vec();
    let diff = store.diff_from(&source);
    finish(source, diff, None, min_alti_diff)
}

/// Wrap a corrected series with its difference and gain/loss summary.
pub fn finish(
    corrected: Vec<f64>,
    diff_to_reference: Vec<f64>,
    spline_curve: Option<Vec<f64>>,
    min_alti_diff: f64,
) -> AdjustedElevationResult {
    let updown = elevation_up_down(&corrected, min_alti_diff);
    AdjustedElevationResult {
        corrected,
        diff_to_reference,
        spline_curve,
        elevation_gain: updown.up,
        elevation_loss: updown.down,
    }
}
