//! Reporting utilities: before/after statistics and formatted terminal output.

use crate::correct::CorrectionEngine;
use crate::domain::{
    AdjustedElevationResult, AdjustmentKind, CorrectionWindow, ElevationMarks, ElevationUpDown,
};
use crate::error::AppError;
use crate::math::elevation_up_down;

pub mod format;

pub use format::*;

/// Spread of `reference - elevation` over the samples with a reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffStats {
    pub min: f64,
    pub max: f64,
    pub mean_abs: f64,
}

/// Everything the summary prints about one correction.
#[derive(Debug, Clone)]
pub struct CorrectionSummary {
    pub kind: AdjustmentKind,
    pub window: CorrectionWindow,
    pub reference_shift: i64,
    pub control_points: usize,
    pub before: ElevationMarks,
    pub after: ElevationMarks,
    pub updown_before: ElevationUpDown,
    pub updown_after: ElevationUpDown,
    pub diff_before: Option<DiffStats>,
    pub diff_after: Option<DiffStats>,
}

/// Compare the engine's working elevation with a corrected preview.
pub fn summarize(
    engine: &CorrectionEngine,
    kind: AdjustmentKind,
    result: &AdjustedElevationResult,
    min_alti_diff: f64,
) -> Result<CorrectionSummary, AppError> {
    let store = engine.store();
    let before = store
        .elevation_marks()
        .ok_or_else(|| AppError::new(4, "Cannot summarize an empty series."))?;
    let after = ElevationMarks::from_series(&result.corrected)
        .ok_or_else(|| AppError::new(4, "Correction produced an empty series."))?;

    // Samples exposed by a reference shift carry no difference.
    let (diff_before, diff_after) = match store.reference() {
        Some(_) => {
            let valid = store.valid_range();
            (
                diff_stats(&store.diff_to_reference()[valid.clone()]),
                result.diff_to_reference.get(valid).and_then(diff_stats),
            )
        }
        None => (None, None),
    };

    Ok(CorrectionSummary {
        kind,
        window: engine.window(),
        reference_shift: store.reference_shift(),
        control_points: engine.model().len(),
        before,
        after,
        updown_before: elevation_up_down(store.elevation(), min_alti_diff),
        updown_after: ElevationUpDown {
            up: result.elevation_gain,
            down: result.elevation_loss,
        },
        diff_before,
        diff_after,
    })
}

/// Min, max and mean absolute value of the finite entries of `diff`.
pub fn diff_stats(diff: &[f64]) -> Option<DiffStats> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum_abs = 0.0;
    let mut n = 0usize;

    for &d in diff.iter().filter(|d| d.is_finite()) {
        min = min.min(d);
        max = max.max(d);
        sum_abs += d.abs();
        n += 1;
    }

    if n == 0 {
        return None;
    }
    Some(DiffStats {
        min,
        max,
        mean_abs: sum_abs / n as f64,
    })
}
