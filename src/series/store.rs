//! Original and working copies of the elevation series.
//!
//! The original track is captured once and never modified. Every edit works
//! on the working copies:
//!
//! - `elevation` changes only through an explicit `commit`
//! - `reference` (and its imperial variant) changes when the reference is
//!   re-aligned, always starting from the original reference
//!
//! Corrections aim at the original, unshifted reference. The shifted copy only
//! drives the difference series, which is masked to the region the shift left
//! valid.

use std::ops::Range;

use crate::correct::aligner;
use crate::domain::{AdjustedElevationResult, ElevationMarks, TrackSeries, XAxis};
use crate::error::CorrectionError;

#[derive(Debug, Clone)]
pub struct SeriesStore {
    original: TrackSeries,
    elevation: Vec<f64>,
    reference: Option<Vec<f64>>,
    reference_imperial: Option<Vec<f64>>,
    diff_to_reference: Vec<f64>,
    reference_shift: i64,
}

impl SeriesStore {
    pub fn new(track: TrackSeries) -> Result<Self, CorrectionError> {
        track.validate()?;
        let elevation = track.elevation.clone();
        let reference = track.reference.clone();
        let reference_imperial = track.reference_imperial.clone();
        let diff_to_reference = diff_series(&elevation, reference.as_deref());
        Ok(Self {
            original: track,
            elevation,
            reference,
            reference_imperial,
            diff_to_reference,
            reference_shift: 0,
        })
    }

    pub fn original(&self) -> &TrackSeries {
        &self.original
    }

    pub fn len(&self) -> usize {
        self.elevation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elevation.is_empty()
    }

    pub fn elevation(&self) -> &[f64] {
        &self.elevation
    }

    pub fn reference(&self) -> Option<&[f64]> {
        self.reference.as_deref()
    }

    pub fn reference_imperial(&self) -> Option<&[f64]> {
        self.reference_imperial.as_deref()
    }

    /// The unshifted reference that corrections are computed against.
    pub fn correction_reference(&self) -> Option<&[f64]> {
        self.original.reference.as_deref()
    }

    /// `reference - elevation` for the working copies.
    pub fn diff_to_reference(&self) -> &[f64] {
        &self.diff_to_reference
    }

    /// Samples covered by the (possibly shifted) working reference.
    pub fn valid_range(&self) -> Range<usize> {
        aligner::valid_range(self.len(), self.reference_shift)
    }

    /// `reference - elevation` of `elevation` against the working reference,
    /// `0.0` outside the valid range or without a reference.
    pub fn diff_from(&self, elevation: &[f64]) -> Vec<f64> {
        match self.reference.as_deref() {
            Some(reference) => aligner::shifted_diff(elevation, reference, self.reference_shift),
            None => vec![0.0; elevation.len()],
        }
    }

    pub fn reference_shift(&self) -> i64 {
        self.reference_shift
    }

    pub fn x_values(&self, axis: XAxis) -> &[f64] {
        self.original.x_values(axis)
    }

    pub fn elevation_marks(&self) -> Option<ElevationMarks> {
        ElevationMarks::from_series(&self.elevation)
    }

    /// Reference minus recorded elevation at the first sample.
    ///
    /// This is the vertical unit of the spline's relative heights. A zero gap
    /// is replaced by `1.0` so the unit never degenerates.
    pub fn first_slice_elevation_diff(&self) -> Option<f64> {
        let reference = self.correction_reference()?;
        let diff = reference.first()? - self.elevation.first()?;
        Some(if diff == 0.0 { 1.0 } else { diff })
    }

    /// Unshifted reference minus recorded elevation at `index`.
    pub fn diff_at(&self, index: usize) -> Option<f64> {
        let reference = self.correction_reference()?;
        Some(reference.get(index)? - self.elevation.get(index)?)
    }

    /// Shift the original reference by `offset` samples.
    ///
    /// Returns the offset actually applied after clamping.
    pub fn shift_reference(&mut self, offset: i64) -> Result<i64, CorrectionError> {
        let reference = self
            .original
            .reference
            .as_deref()
            .ok_or(CorrectionError::MissingReference)?;

        let alignment = aligner::align(
            &self.elevation,
            reference,
            self.original.reference_imperial.as_deref(),
            offset,
        );

        self.reference = Some(alignment.reference);
        self.reference_imperial = alignment.reference_imperial;
        self.diff_to_reference = alignment.diff;
        self.reference_shift = alignment.offset;
        Ok(alignment.offset)
    }

    /// Adopt a corrected series as the new working elevation.
    pub fn commit(&mut self, result: &AdjustedElevationResult) -> Result<(), CorrectionError> {
        if result.corrected.len() != self.len() {
            return Err(CorrectionError::LengthMismatch {
                series: "corrected",
                expected: self.len(),
                actual: result.corrected.len(),
            });
        }
        self.elevation = result.corrected.clone();
        self.diff_to_reference = self.diff_from(&self.elevation);
        log::info!("committed corrected elevation ({} samples)", self.len());
        Ok(())
    }

    /// Discard all working changes.
    pub fn restore(&mut self) {
        self.elevation = self.original.elevation.clone();
        self.reference = self.original.reference.clone();
        self.reference_imperial = self.original.reference_imperial.clone();
        self.diff_to_reference = diff_series(&self.elevation, self.reference.as_deref());
        self.reference_shift = 0;
    }
}

/// `reference - elevation`, or zeros without a reference.
fn diff_series(elevation: &[f64], reference: Option<&[f64]>) -> Vec<f64> {
    match reference {
        Some(r) => elevation.iter().zip(r.iter()).map(|(e, r)| r - e).collect(),
        None => vec![0.0; elevation.len()],
    }
}
