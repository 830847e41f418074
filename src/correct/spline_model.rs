//! Editable control points of the spline correction curve.
//!
//! Points are stored in window-relative coordinates:
//!
//! - `relative_x` is `0..=1` across the correction window
//! - `relative_y` is measured in units of the first-sample elevation gap
//!   (`reference[0] - elevation[0]`)
//!
//! Points keep their insertion order so that an index handed out by
//! `hit_test` or `add_point` stays valid for the whole drag. The spline kernel
//! sorts knots itself.

use std::ops::Range;

use crate::domain::{
    CorrectionWindow, DevicePoint, DrawingScale, HitRect, SplineControlPoint, WindowBounds, XAxis,
};
use crate::series::SeriesStore;

/// Relative x of the fixed left anchor.
///
/// Both anchors sit a hair outside `0..=1` so the kernel domain covers the
/// window edges even after rounding.
pub const LEFT_ANCHOR_X: f64 = -0.000_000_000_000_1;
/// Relative x of the fixed right anchor.
pub const RIGHT_ANCHOR_X: f64 = 1.000_000_000_000_1;
/// A model never shrinks below this many points.
pub const MIN_POINTS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct SplineModel {
    points: Vec<SplineControlPoint>,
    unit: f64,
    bounds: WindowBounds,
    deletable: Option<usize>,
}

impl Default for SplineModel {
    fn default() -> Self {
        Self::empty()
    }
}

impl SplineModel {
    /// A model without points (no reference available).
    pub fn empty() -> Self {
        Self {
            points: Vec::new(),
            unit: 1.0,
            bounds: WindowBounds {
                left_x: 0.0,
                right_x: 0.0,
            },
            deletable: None,
        }
    }

    /// Default three-point model for the current series and window.
    ///
    /// The left anchor holds the curve at zero, the right anchor lifts it to
    /// the reference gap at the window end and one movable point sits in the
    /// middle. Without a reference the model is empty.
    pub fn reset(store: &SeriesStore, window: CorrectionWindow, axis: XAxis) -> Self {
        let Some(unit) = store.first_slice_elevation_diff() else {
            log::debug!("no reference series, spline model left empty");
            return Self::empty();
        };
        let bounds = window.bounds(store.x_values(axis));
        let end_diff = store.diff_at(window.right_index).unwrap_or(0.0);

        let point = |relative_x: f64, relative_y: f64, movable: bool| SplineControlPoint {
            relative_x,
            relative_y,
            movable,
            min_absolute_x: bounds.left_x,
            max_absolute_x: bounds.right_x,
        };

        Self {
            points: vec![
                point(LEFT_ANCHOR_X, 0.0, false),
                point(0.5, 0.0, true),
                point(RIGHT_ANCHOR_X, end_diff / unit, false),
            ],
            unit,
            bounds,
            deletable: None,
        }
    }

    /// Re-read the vertical unit and window bounds after the series or
    /// window changed. Relative coordinates are kept.
    pub fn sync(&mut self, store: &SeriesStore, window: CorrectionWindow, axis: XAxis) {
        if let Some(unit) = store.first_slice_elevation_diff() {
            self.unit = unit;
        }
        self.set_bounds(window.bounds(store.x_values(axis)));
    }

    /// Update the window bounds and every point's horizontal clamp.
    pub fn set_bounds(&mut self, bounds: WindowBounds) {
        self.bounds = bounds;
        for p in &mut self.points {
            p.min_absolute_x = bounds.left_x;
            p.max_absolute_x = bounds.right_x;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[SplineControlPoint] {
        &self.points
    }

    pub fn unit(&self) -> f64 {
        self.unit
    }

    pub fn bounds(&self) -> WindowBounds {
        self.bounds
    }

    /// Index flagged for deletion by the last drag, if any.
    pub fn deletable(&self) -> Option<usize> {
        self.deletable
    }

    /// Knots in absolute coordinates: `(x, y)` with `y` in metres.
    pub fn absolute_knots(&self, bounds: WindowBounds) -> (Vec<f64>, Vec<f64>) {
        self.points
            .iter()
            .map(|p| (bounds.absolute_x(p.relative_x), p.relative_y * self.unit))
            .unzip()
    }

    /// Device positions of every handle for the given scale.
    pub fn handle_positions(&self, scale: &DrawingScale) -> Vec<DevicePoint> {
        self.points
            .iter()
            .map(|p| {
                scale.device_point(self.bounds.absolute_x(p.relative_x), p.relative_y * self.unit)
            })
            .collect()
    }

    /// Square hit rectangles around every handle.
    pub fn hit_rects(&self, scale: &DrawingScale, size: f64) -> Vec<HitRect> {
        self.handle_positions(scale)
            .into_iter()
            .map(|c| HitRect::centered(c, size))
            .collect()
    }

    /// First point whose rectangle contains `pos`.
    pub fn hit_test(&self, pos: DevicePoint, rects: &[HitRect]) -> Option<usize> {
        rects
            .iter()
            .take(self.points.len())
            .position(|r| r.contains(pos))
    }

    /// Drag point `index` to the device position `pos`.
    ///
    /// Fixed points only move vertically. A movable point dragged past the
    /// window edge is clamped and flagged for deletion on release.
    pub fn move_point(&mut self, index: usize, pos: DevicePoint, scale: &DrawingScale) -> bool {
        let bounds = self.bounds;
        let unit = self.unit;
        let Some(point) = self.points.get_mut(index) else {
            return false;
        };

        self.deletable = None;

        // Fixed points and an unusable horizontal scale keep the current x.
        if let Some(mut graph_x) = scale.graph_x(pos).filter(|_| point.movable) {
            if graph_x < point.min_absolute_x {
                graph_x = point.min_absolute_x;
                self.deletable = Some(index);
            }
            if graph_x > point.max_absolute_x {
                graph_x = point.max_absolute_x;
                self.deletable = Some(index);
            }
            point.relative_x = bounds.relative_x(graph_x);
        }

        point.relative_y = relative_height(scale.device_height(pos), scale.scale_y, unit);
        true
    }

    /// Finish a drag of point `index`, deleting it if it was dragged out.
    pub fn finish_drag(&mut self, index: usize) -> bool {
        let flagged = self.deletable.take() == Some(index);
        flagged && self.delete_point(index)
    }

    /// Add a movable point at the device position `pos`.
    ///
    /// Rejected when `pos` is not strictly inside the window.
    pub fn add_point(&mut self, pos: DevicePoint, scale: &DrawingScale) -> Option<usize> {
        let graph_x = scale.graph_x(pos)?;
        if self.is_empty() || !self.bounds.contains_open(graph_x) {
            return None;
        }
        let relative_y = relative_height(scale.device_height(pos), scale.scale_y, self.unit);
        self.insert_relative(self.bounds.relative_x(graph_x), relative_y)
    }

    /// Add a movable point from window-relative coordinates.
    pub fn insert_relative(&mut self, relative_x: f64, relative_y: f64) -> Option<usize> {
        if self.is_empty() || !(relative_x > 0.0 && relative_x < 1.0) || !relative_y.is_finite() {
            return None;
        }
        self.points.push(SplineControlPoint {
            relative_x,
            relative_y,
            movable: true,
            min_absolute_x: self.bounds.left_x,
            max_absolute_x: self.bounds.right_x,
        });
        Some(self.points.len() - 1)
    }

    /// Add `count` evenly spaced movable points, all at the height of `pos`.
    ///
    /// Returns the index range of the new points.
    pub fn add_points(
        &mut self,
        count: usize,
        pos: DevicePoint,
        scale: &DrawingScale,
    ) -> Option<Range<usize>> {
        let graph_x = scale.graph_x(pos)?;
        if count == 0 || self.is_empty() || !self.bounds.contains_open(graph_x) {
            return None;
        }
        let relative_y = relative_height(scale.device_height(pos), scale.scale_y, self.unit);
        let first = self.points.len();
        for k in 1..=count {
            self.insert_relative(k as f64 / (count + 1) as f64, relative_y)?;
        }
        Some(first..self.points.len())
    }

    /// Remove point `index`. Refused while only the minimum remains.
    pub fn delete_point(&mut self, index: usize) -> bool {
        if self.points.len() <= MIN_POINTS || index >= self.points.len() {
            return false;
        }
        self.points.remove(index);
        self.deletable = None;
        true
    }

    /// Set every relative height to zero.
    pub fn flatten(&mut self) {
        for p in &mut self.points {
            p.relative_y = 0.0;
        }
    }

    /// Series index at or after each point, in point order.
    ///
    /// Points beyond the last sample map to the last index.
    pub fn sample_indices(&self, x: &[f64]) -> Vec<usize> {
        let last = x.len().saturating_sub(1);
        self.points
            .iter()
            .map(|p| {
                let abs_x = self.bounds.absolute_x(p.relative_x);
                x.iter().position(|&v| v >= abs_x).unwrap_or(last)
            })
            .collect()
    }

    /// Lift the rightmost point onto the reference gap at its sample.
    pub fn set_end_to_reference(&mut self, store: &SeriesStore, axis: XAxis) -> bool {
        let indices = self.sample_indices(store.x_values(axis));
        let mut end: Option<(usize, usize)> = None;
        for (point, &sample) in indices.iter().enumerate() {
            if end.is_none_or(|(_, s)| sample > s) {
                end = Some((point, sample));
            }
        }
        let Some((point, sample)) = end else {
            return false;
        };
        let Some(diff) = store.diff_at(sample) else {
            return false;
        };
        self.points[point].relative_y = diff / self.unit;
        true
    }
}

fn relative_height(device_height: f64, scale_y: f64, unit: f64) -> f64 {
    let denom = scale_y * unit;
    if denom == 0.0 || !denom.is_finite() {
        0.0
    } else {
        device_height / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TrackSeries;

    fn store() -> SeriesStore {
        // Reference sits 10 m above at the start, 4 m above at the end.
        let track = TrackSeries::new(
            vec![0.0, 10.0, 20.0, 30.0, 40.0],
            None,
            vec![100.0, 105.0, 110.0, 108.0, 104.0],
            Some(vec![110.0, 114.0, 117.0, 113.0, 108.0]),
        )
        .unwrap();
        SeriesStore::new(track).unwrap()
    }

    fn model() -> SplineModel {
        let store = store();
        SplineModel::reset(&store, CorrectionWindow::full(store.len()), XAxis::Time)
    }

    // 1 device px per second, 1 device px per metre, baseline at y = 200.
    const SCALE: DrawingScale = DrawingScale {
        scale_x: 1.0,
        scale_y: 1.0,
        x_offset: 0.0,
        y0: 200.0,
    };

    #[test]
    fn reset_builds_three_points() {
        let m = model();
        assert_eq!(m.len(), 3);
        assert_eq!(m.unit(), 10.0);

        let p = m.points();
        assert_eq!(p[0].relative_x, LEFT_ANCHOR_X);
        assert_eq!(p[0].relative_y, 0.0);
        assert!(!p[0].movable);
        assert_eq!(p[1].relative_x, 0.5);
        assert!(p[1].movable);
        assert_eq!(p[2].relative_x, RIGHT_ANCHOR_X);
        assert!((p[2].relative_y - 0.4).abs() < 1e-12);
        assert!(p.iter().all(|p| p.min_absolute_x == 0.0 && p.max_absolute_x == 40.0));
    }

    #[test]
    fn reset_without_reference_is_empty() {
        let track = TrackSeries::new(vec![0.0, 1.0, 2.0], None, vec![1.0, 2.0, 3.0], None).unwrap();
        let store = SeriesStore::new(track).unwrap();
        let m = SplineModel::reset(&store, CorrectionWindow::full(3), XAxis::Time);
        assert!(m.is_empty());
    }

    #[test]
    fn add_then_delete_restores_model() {
        let mut m = model();
        let before = m.clone();
        let idx = m.add_point(DevicePoint { x: 12.0, y: 190.0 }, &SCALE).unwrap();
        assert_eq!(m.len(), 4);
        assert!((m.points()[idx].relative_x - 0.3).abs() < 1e-12);
        assert!((m.points()[idx].relative_y - 1.0).abs() < 1e-12);

        assert!(m.delete_point(idx));
        assert_eq!(m, before);
    }

    #[test]
    fn add_outside_window_is_rejected() {
        let mut m = model();
        assert_eq!(m.add_point(DevicePoint { x: 0.0, y: 190.0 }, &SCALE), None);
        assert_eq!(m.add_point(DevicePoint { x: 40.0, y: 190.0 }, &SCALE), None);
        assert_eq!(m.add_point(DevicePoint { x: 55.0, y: 190.0 }, &SCALE), None);
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn delete_refused_at_minimum() {
        let mut m = model();
        assert!(!m.delete_point(1));
        assert_eq!(m.len(), MIN_POINTS);
    }

    #[test]
    fn fixed_point_moves_only_vertically() {
        let mut m = model();
        assert!(m.move_point(0, DevicePoint { x: 25.0, y: 180.0 }, &SCALE));
        let p = m.points()[0];
        assert_eq!(p.relative_x, LEFT_ANCHOR_X);
        assert!((p.relative_y - 2.0).abs() < 1e-12);
        assert_eq!(m.deletable(), None);
    }

    #[test]
    fn dragging_past_the_edge_clamps_and_deletes_on_release() {
        let mut m = model();
        let idx = m.add_point(DevicePoint { x: 20.0, y: 200.0 }, &SCALE).unwrap();

        m.move_point(idx, DevicePoint { x: 60.0, y: 200.0 }, &SCALE);
        assert_eq!(m.points()[idx].relative_x, 1.0);
        assert_eq!(m.deletable(), Some(idx));

        assert!(m.finish_drag(idx));
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn drag_back_inside_clears_the_delete_flag() {
        let mut m = model();
        m.move_point(1, DevicePoint { x: -5.0, y: 200.0 }, &SCALE);
        assert_eq!(m.deletable(), Some(1));
        m.move_point(1, DevicePoint { x: 10.0, y: 200.0 }, &SCALE);
        assert_eq!(m.deletable(), None);
        assert!(!m.finish_drag(1));
    }

    #[test]
    fn hit_test_finds_handle() {
        let m = model();
        let rects = m.hit_rects(&SCALE, 6.0);
        // Middle point: x = 20, y = baseline.
        assert_eq!(m.hit_test(DevicePoint { x: 21.0, y: 201.0 }, &rects), Some(1));
        assert_eq!(m.hit_test(DevicePoint { x: 30.0, y: 150.0 }, &rects), None);
    }

    #[test]
    fn add_points_spreads_evenly() {
        let mut m = model();
        let range = m.add_points(3, DevicePoint { x: 20.0, y: 195.0 }, &SCALE).unwrap();
        assert_eq!(range, 3..6);
        let xs: Vec<f64> = m.points()[range].iter().map(|p| p.relative_x).collect();
        assert_eq!(xs, vec![0.25, 0.5, 0.75]);
    }

    #[test]
    fn sample_indices_and_end_to_reference() {
        let s = store();
        let mut m = model();
        m.flatten();
        assert!(m.points().iter().all(|p| p.relative_y == 0.0));

        assert_eq!(m.sample_indices(s.x_values(XAxis::Time)), vec![0, 2, 4]);

        assert!(m.set_end_to_reference(&s, XAxis::Time));
        assert!((m.points()[2].relative_y - 0.4).abs() < 1e-12);
    }

    #[test]
    fn zero_horizontal_scale_keeps_point_position() {
        let mut m = model();
        let flat = DrawingScale { scale_x: 0.0, ..SCALE };
        assert!(m.move_point(1, DevicePoint { x: 10.0, y: 190.0 }, &flat));
        let p = m.points()[1];
        assert_eq!(p.relative_x, 0.5);
        assert!((p.relative_y - 1.0).abs() < 1e-12);
        assert_eq!(m.deletable(), None);

        assert_eq!(m.add_point(DevicePoint { x: 10.0, y: 190.0 }, &flat), None);
        assert_eq!(m.add_points(2, DevicePoint { x: 10.0, y: 190.0 }, &flat), None);
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn sync_updates_clamps() {
        let s = store();
        let mut m = model();
        let w = CorrectionWindow::new(1, 3, s.len()).unwrap();
        m.sync(&s, w, XAxis::Time);
        assert_eq!(m.bounds(), WindowBounds { left_x: 10.0, right_x: 30.0 });
        assert!(m.points().iter().all(|p| p.min_absolute_x == 10.0));
    }
}
