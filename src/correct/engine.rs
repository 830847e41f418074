//! One correction session over a single track.
//!
//! `CorrectionEngine` owns the series store, the spline model and the
//! start/max editing session, and dispatches an `AdjustmentKind` to the
//! matching transform. Results are previews; nothing reaches the working
//! elevation until `commit`.

use crate::domain::{AdjustedElevationResult, AdjustmentKind, CorrectionWindow, TrackSeries, XAxis};
use crate::error::CorrectionError;
use crate::series::SeriesStore;

use super::evaluator::{SplineEvaluator, finish};
use super::parametric::{self, EditingSession};
use super::spline_model::SplineModel;

/// Targets for the parametric adjustments.
///
/// Unset targets default to the current series' own value, so an empty
/// `Targets` leaves the profile unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Targets {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub max: Option<f64>,
    pub keep_start: bool,
}

#[derive(Debug, Clone)]
pub struct CorrectionEngine {
    store: SeriesStore,
    axis: XAxis,
    window: CorrectionWindow,
    model: SplineModel,
    session: EditingSession,
    min_alti_diff: f64,
}

impl CorrectionEngine {
    /// Open a session over `track` with the full window selected.
    pub fn new(track: TrackSeries, axis: XAxis, min_alti_diff: f64) -> Result<Self, CorrectionError> {
        let store = SeriesStore::new(track)?;
        let window = CorrectionWindow::full(store.len());
        let model = SplineModel::reset(&store, window, axis);
        let session = EditingSession::begin(store.elevation()).ok_or(CorrectionError::EmptySeries)?;

        Ok(Self {
            store,
            axis,
            window,
            model,
            session,
            min_alti_diff,
        })
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn axis(&self) -> XAxis {
        self.axis
    }

    pub fn window(&self) -> CorrectionWindow {
        self.window
    }

    pub fn model(&self) -> &SplineModel {
        &self.model
    }

    /// Mutable access for point edits (drag, add, delete).
    pub fn model_mut(&mut self) -> &mut SplineModel {
        &mut self.model
    }

    pub fn session(&self) -> &EditingSession {
        &self.session
    }

    pub fn set_window(&mut self, left: usize, right: usize) -> Result<CorrectionWindow, CorrectionError> {
        self.window = CorrectionWindow::new(left, right, self.store.len())?;
        self.model.sync(&self.store, self.window, self.axis);
        Ok(self.window)
    }

    pub fn set_axis(&mut self, axis: XAxis) {
        self.axis = axis;
        self.model.sync(&self.store, self.window, self.axis);
    }

    /// Re-align the reference; returns the clamped offset.
    pub fn shift_reference(&mut self, offset: i64) -> Result<i64, CorrectionError> {
        let applied = self.store.shift_reference(offset)?;
        self.model.sync(&self.store, self.window, self.axis);
        Ok(applied)
    }

    /// Replace the spline model with the default three points.
    pub fn reset_spline(&mut self) {
        self.model = SplineModel::reset(&self.store, self.window, self.axis);
    }

    /// Lift the spline's rightmost point onto the reference.
    pub fn spline_end_to_reference(&mut self) -> bool {
        self.model.set_end_to_reference(&self.store, self.axis)
    }

    /// Forget accumulated start/max edits.
    pub fn reset_session(&mut self) {
        if let Some(session) = EditingSession::begin(self.store.elevation()) {
            self.session = session;
        }
    }

    /// Compute a corrected preview with the given adjustment.
    pub fn compute(
        &mut self,
        kind: AdjustmentKind,
        targets: &Targets,
    ) -> Result<AdjustedElevationResult, CorrectionError> {
        let source = self.store.elevation();
        let marks = self.store.elevation_marks().ok_or(CorrectionError::EmptySeries)?;
        let target_start = targets.start.unwrap_or(marks.start);
        let target_max = targets.max.unwrap_or(marks.max);

        let corrected = match kind {
            AdjustmentKind::ReferenceSpline => {
                if self.store.correction_reference().is_none() {
                    return Err(CorrectionError::MissingReference);
                }
                let evaluator = SplineEvaluator::new(self.axis, self.min_alti_diff);
                return Ok(evaluator.evaluate(self.window, &self.model, &self.store));
            }
            AdjustmentKind::Reference => {
                let reference = self
                    .store
                    .correction_reference()
                    .ok_or(CorrectionError::MissingReference)?;
                let diff = vec![0.0; reference.len()];
                return Ok(finish(reference.to_vec(), diff, None, self.min_alti_diff));
            }
            AdjustmentKind::WholeTour => parametric::adjust_evenly(source, target_start),
            AdjustmentKind::End => {
                let x = self.store.x_values(self.axis);
                parametric::adjust_end(source, x, targets.end.unwrap_or(marks.end))?
            }
            AdjustmentKind::MaxHeight => start_and_max(
                source,
                target_start,
                target_max,
                targets.keep_start,
                &mut self.session,
            )?,
            AdjustmentKind::StartAndEnd => {
                // The end always closes onto the series' own start.
                let x = self.store.x_values(self.axis);
                let closed = parametric::adjust_end(source, x, marks.start)?;
                start_and_max(
                    &closed,
                    target_start,
                    target_max,
                    targets.keep_start,
                    &mut self.session,
                )?
            }
        };

        log::debug!("computed {} preview", kind.display_name());
        let diff = self.store.diff_from(&corrected);
        Ok(finish(corrected, diff, None, self.min_alti_diff))
    }

    /// Adopt a preview as the new working elevation.
    ///
    /// The editing session restarts from the committed series.
    pub fn commit(&mut self, result: &AdjustedElevationResult) -> Result<(), CorrectionError> {
        self.store.commit(result)?;
        self.reset_session();
        self.model.sync(&self.store, self.window, self.axis);
        Ok(())
    }
}

fn start_and_max(
    source: &[f64],
    target_start: f64,
    target_max: f64,
    keep_start: bool,
    session: &mut EditingSession,
) -> Result<Vec<f64>, CorrectionError> {
    parametric::adjust_start_and_max(source, target_start, target_max, keep_start, session)
        .inspect_err(|e| log::warn!("start/max edit rejected: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> TrackSeries {
        TrackSeries::new(
            vec![0.0, 10.0, 20.0, 30.0],
            Some(vec![0.0, 40.0, 80.0, 120.0]),
            vec![100.0, 110.0, 120.0, 130.0],
            Some(vec![108.0, 119.0, 127.0, 136.0]),
        )
        .unwrap()
    }

    fn engine() -> CorrectionEngine {
        CorrectionEngine::new(track(), XAxis::Time, 0.0).unwrap()
    }

    #[test]
    fn empty_targets_leave_profile_unchanged() {
        let mut e = engine();
        for kind in [
            AdjustmentKind::WholeTour,
            AdjustmentKind::End,
            AdjustmentKind::MaxHeight,
        ] {
            let r = e.compute(kind, &Targets::default()).unwrap();
            for (a, b) in r.corrected.iter().zip(e.store().elevation()) {
                assert!((a - b).abs() < 1e-9, "{kind:?}");
            }
        }
    }

    #[test]
    fn max_height_scenario() {
        let mut e = engine();
        let targets = Targets {
            max: Some(150.0),
            keep_start: true,
            ..Targets::default()
        };
        let r = e.compute(AdjustmentKind::MaxHeight, &targets).unwrap();
        assert!((r.corrected[1] - 116.666_666_666_7).abs() < 1e-6);
        assert!((r.corrected[3] - 150.0).abs() < 1e-9);
        assert!((r.elevation_gain - 50.0).abs() < 1e-9);
    }

    #[test]
    fn rejected_max_keeps_session() {
        let mut e = engine();
        let before = *e.session();
        let targets = Targets {
            max: Some(100.0),
            ..Targets::default()
        };
        let err = e.compute(AdjustmentKind::MaxHeight, &targets).unwrap_err();
        assert!(matches!(err, CorrectionError::InvalidMaxTarget { .. }));
        assert_eq!(*e.session(), before);
    }

    #[test]
    fn start_and_end_closes_the_loop() {
        let t = TrackSeries::new(
            vec![0.0, 10.0, 20.0, 30.0],
            None,
            vec![100.0, 125.0, 115.0, 130.0],
            None,
        )
        .unwrap();
        let mut e = CorrectionEngine::new(t, XAxis::Time, 0.0).unwrap();
        let r = e.compute(AdjustmentKind::StartAndEnd, &Targets::default()).unwrap();
        assert!((r.corrected[0] - r.corrected[3]).abs() < 1e-9);

        // An end target has no say; the loop still closes on the start.
        e.reset_session();
        let targets = Targets {
            end: Some(500.0),
            ..Targets::default()
        };
        let with_end = e.compute(AdjustmentKind::StartAndEnd, &targets).unwrap();
        assert_eq!(with_end.corrected, r.corrected);
    }

    #[test]
    fn reference_kind_copies_reference() {
        let mut e = engine();
        let r = e.compute(AdjustmentKind::Reference, &Targets::default()).unwrap();
        assert_eq!(r.corrected, vec![108.0, 119.0, 127.0, 136.0]);
        assert!(r.diff_to_reference.iter().all(|d| *d == 0.0));
    }

    #[test]
    fn spline_needs_reference() {
        let t = TrackSeries::new(vec![0.0, 1.0, 2.0], None, vec![1.0, 2.0, 3.0], None).unwrap();
        let mut e = CorrectionEngine::new(t, XAxis::Time, 0.0).unwrap();
        let err = e.compute(AdjustmentKind::ReferenceSpline, &Targets::default()).unwrap_err();
        assert_eq!(err, CorrectionError::MissingReference);
    }

    #[test]
    fn spline_preview_then_commit() {
        let mut e = engine();
        let r = e.compute(AdjustmentKind::ReferenceSpline, &Targets::default()).unwrap();
        assert!((r.corrected[0] - 108.0).abs() < 1e-9);
        assert!((r.corrected[3] - 136.0).abs() < 1e-9);
        assert_eq!(e.store().elevation(), &[100.0, 110.0, 120.0, 130.0]);

        e.commit(&r).unwrap();
        assert_eq!(e.store().elevation(), r.corrected.as_slice());
        assert!((e.session().initial_start - r.corrected[0]).abs() < 1e-12);
    }

    #[test]
    fn distance_axis_and_window_change_resync_model() {
        let mut e = engine();
        e.set_axis(XAxis::Distance);
        assert_eq!(e.model().bounds().right_x, 120.0);
        e.set_window(1, 2).unwrap();
        assert_eq!(e.model().bounds().left_x, 40.0);
        assert!(e.set_window(2, 9).is_err());
    }

    #[test]
    fn shift_reference_keeps_spline_unit() {
        let mut e = engine();
        assert_eq!(e.model().unit(), 8.0);
        assert_eq!(e.shift_reference(-1).unwrap(), -1);
        assert_eq!(e.model().unit(), 8.0);
    }

    fn five_sample_engine() -> CorrectionEngine {
        let t = TrackSeries::new(
            vec![0.0, 10.0, 20.0, 30.0, 40.0],
            None,
            vec![100.0, 110.0, 120.0, 130.0, 140.0],
            Some(vec![108.0, 119.0, 127.0, 136.0, 146.0]),
        )
        .unwrap();
        CorrectionEngine::new(t, XAxis::Time, 0.0).unwrap()
    }

    #[test]
    fn spline_after_shift_targets_unshifted_reference() {
        let mut e = five_sample_engine();
        let unshifted = e.compute(AdjustmentKind::ReferenceSpline, &Targets::default()).unwrap();

        e.shift_reference(1).unwrap();
        e.reset_spline();
        assert_eq!(e.model().unit(), 8.0);
        let r = e.compute(AdjustmentKind::ReferenceSpline, &Targets::default()).unwrap();

        assert_eq!(r.corrected, unshifted.corrected);
        assert!((r.corrected[0] - 108.0).abs() < 1e-9);
        assert!((r.corrected[4] - 146.0).abs() < 1e-9);
        assert_eq!(r.diff_to_reference[0], 0.0);

        let copied = e.compute(AdjustmentKind::Reference, &Targets::default()).unwrap();
        assert_eq!(copied.corrected, vec![108.0, 119.0, 127.0, 136.0, 146.0]);
    }

    #[test]
    fn diff_stays_masked_after_shift_and_commit() {
        let mut e = five_sample_engine();
        e.shift_reference(1).unwrap();
        assert_eq!(e.store().diff_to_reference(), &[0.0, -2.0, -1.0, -3.0, -4.0]);

        let r = e.compute(AdjustmentKind::WholeTour, &Targets::default()).unwrap();
        assert_eq!(r.diff_to_reference, vec![0.0, -2.0, -1.0, -3.0, -4.0]);

        let lifted = Targets {
            start: Some(90.0),
            ..Targets::default()
        };
        let r = e.compute(AdjustmentKind::WholeTour, &lifted).unwrap();
        assert_eq!(r.diff_to_reference, vec![0.0, 8.0, 9.0, 7.0, 6.0]);

        e.commit(&r).unwrap();
        assert_eq!(e.store().diff_to_reference(), &[0.0, 8.0, 9.0, 7.0, 6.0]);
    }
}
