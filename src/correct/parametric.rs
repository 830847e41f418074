//! Whole-series parametric elevation transforms.
//!
//! - `adjust_evenly`: shift every sample by the same amount
//! - `adjust_end`: distribute an end correction proportionally along the x-axis
//! - `adjust_max`: rescale around the minimum so the maximum hits a target
//! - `adjust_start_and_max`: repeated start/max edits through an `EditingSession`
//!
//! All transforms return a new series; the source is never modified.

use crate::domain::ElevationMarks;
use crate::error::CorrectionError;

/// Shift the series so that it starts at `target_start`.
pub fn adjust_evenly(source: &[f64], target_start: f64) -> Vec<f64> {
    let Some(&first) = source.first() else {
        return Vec::new();
    };
    let diff = target_start - first;
    source.iter().map(|v| v + diff).collect()
}

/// Move the end of the series to `target_end`, fading the correction in
/// proportionally to the x position of each sample.
pub fn adjust_end(source: &[f64], x: &[f64], target_end: f64) -> Result<Vec<f64>, CorrectionError> {
    let Some(&last) = source.last() else {
        return Err(CorrectionError::EmptySeries);
    };
    if x.len() != source.len() {
        return Err(CorrectionError::LengthMismatch {
            series: "x-axis",
            expected: source.len(),
            actual: x.len(),
        });
    }

    let last_x = x[x.len() - 1];
    if last_x == 0.0 {
        return Err(CorrectionError::DegenerateAxis);
    }

    let end_diff = target_end - last;
    Ok(source
        .iter()
        .zip(x.iter())
        .map(|(&v, &xv)| v + xv / last_x * end_diff)
        .collect())
}

/// Rescale the series so that its maximum becomes `target_max` while its
/// minimum stays in place.
pub fn adjust_max(source: &[f64], target_max: f64) -> Result<Vec<f64>, CorrectionError> {
    let Some(marks) = ElevationMarks::from_series(source) else {
        return Err(CorrectionError::EmptySeries);
    };
    let (src_min, src_max) = (marks.min, marks.max);

    if target_max == src_min {
        return Err(CorrectionError::InvalidMaxTarget {
            target: target_max,
            min: src_min,
        });
    }
    if src_max == src_min {
        return Err(CorrectionError::FlatSeries { value: src_min });
    }

    let scale = (src_max - src_min) / (target_max - src_min);
    Ok(source.iter().map(|&v| (v - src_min) / scale + src_min).collect())
}

/// Cumulative state for repeated start/max edits.
///
/// Each call compares the new targets with the previous call's targets and
/// folds the delta into `start_diff`/`max_diff`. The transform is then applied
/// with `initial + diff`, so successive edits compose instead of compounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditingSession {
    pub start_diff: f64,
    pub max_diff: f64,
    pub prev_start: f64,
    pub prev_max: f64,
    pub initial_start: f64,
    pub initial_max: f64,
}

impl EditingSession {
    /// Start a session with the given initial start and max elevations.
    pub fn new(initial_start: f64, initial_max: f64) -> Self {
        Self {
            start_diff: 0.0,
            max_diff: 0.0,
            prev_start: initial_start,
            prev_max: initial_max,
            initial_start,
            initial_max,
        }
    }

    /// Start a session from the characteristic values of `source`.
    pub fn begin(source: &[f64]) -> Option<Self> {
        let marks = ElevationMarks::from_series(source)?;
        Some(Self::new(marks.start, marks.max))
    }

    /// Forget all accumulated edits.
    pub fn reset(&mut self) {
        *self = Self::new(self.initial_start, self.initial_max);
    }
}

/// Adjust start and max together, accumulating the edits in `session`.
///
/// The max rescale is applied first, then the start shift. With `keep_start`
/// the start lands on `initial_start + start_diff`; otherwise the start shift
/// induced by the rescale is kept on top of it.
///
/// On error the session is left untouched.
pub fn adjust_start_and_max(
    source: &[f64],
    target_start: f64,
    target_max: f64,
    keep_start: bool,
    session: &mut EditingSession,
) -> Result<Vec<f64>, CorrectionError> {
    let Some(&old_start) = source.first() else {
        return Err(CorrectionError::EmptySeries);
    };

    let max_diff = session.max_diff - (session.prev_max - target_max);
    let start_diff = session.start_diff - (session.prev_start - target_start);

    let scaled = adjust_max(source, session.initial_max + max_diff)?;
    let new_start = scaled[0];

    let induced_shift = if keep_start { 0.0 } else { new_start - old_start };
    let result = adjust_evenly(&scaled, session.initial_start + start_diff + induced_shift);

    session.max_diff = max_diff;
    session.start_diff = start_diff;
    session.prev_max = target_max;
    session.prev_start = target_start;

    Ok(result)
}
