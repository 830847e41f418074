//! Shared domain types.
//!
//! These types are kept plain and serializable so they can be:
//!
//! - used in-memory by the correction engine
//! - exported to JSON
//! - handed to a renderer (control points, hit rectangles)

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::CorrectionError;

/// Feet per metre, used for the imperial display variant.
pub const FEET_PER_METRE: f64 = 3.280839895;

/// Which series drives the horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum XAxis {
    /// Elapsed time in seconds.
    Time,
    /// Cumulative distance in metres (falls back to time when absent).
    Distance,
}

/// Unit used for displaying elevations.
///
/// All computation happens in metres; this only affects presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ElevationUnit {
    Metric,
    Imperial,
}

impl ElevationUnit {
    /// Multiply a metric elevation by this factor to get display units.
    pub fn factor(self) -> f64 {
        match self {
            ElevationUnit::Metric => 1.0,
            ElevationUnit::Imperial => FEET_PER_METRE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ElevationUnit::Metric => "m",
            ElevationUnit::Imperial => "ft",
        }
    }
}

/// How the recorded elevation is corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustmentKind {
    /// Fade the start offset to zero and add a spline correction curve.
    ReferenceSpline,
    /// Replace the recorded elevation with the reference profile.
    Reference,
    /// Pull the end back to the start elevation, then adjust start and max.
    StartAndEnd,
    /// Adjust start and max together (cumulative editing session).
    MaxHeight,
    /// Distribute an end correction proportionally along the x-axis.
    End,
    /// Shift the whole profile by a constant.
    WholeTour,
}

impl AdjustmentKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            AdjustmentKind::ReferenceSpline => "Reference + spline",
            AdjustmentKind::Reference => "Reference elevation",
            AdjustmentKind::StartAndEnd => "Start and end",
            AdjustmentKind::MaxHeight => "Max height",
            AdjustmentKind::End => "End",
            AdjustmentKind::WholeTour => "Whole tour",
        }
    }

    pub fn needs_reference(self) -> bool {
        matches!(self, AdjustmentKind::ReferenceSpline | AdjustmentKind::Reference)
    }
}

/// Per-sample track data, stored as parallel series of equal length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSeries {
    /// Elapsed time in seconds (non-decreasing).
    pub time_s: Vec<f64>,
    /// Cumulative distance in metres (non-decreasing), if recorded.
    pub distance_m: Option<Vec<f64>>,
    /// Recorded elevation in metres.
    pub elevation: Vec<f64>,
    /// Independent reference elevation in metres (e.g. a terrain model).
    pub reference: Option<Vec<f64>>,
    /// Reference elevation in feet, kept alongside the metric series.
    pub reference_imperial: Option<Vec<f64>>,
}

impl TrackSeries {
    /// Build and validate a track.
    pub fn new(
        time_s: Vec<f64>,
        distance_m: Option<Vec<f64>>,
        elevation: Vec<f64>,
        reference: Option<Vec<f64>>,
    ) -> Result<Self, CorrectionError> {
        let reference_imperial = reference
            .as_ref()
            .map(|r| r.iter().map(|v| v * FEET_PER_METRE).collect());
        let track = Self {
            time_s,
            distance_m,
            elevation,
            reference,
            reference_imperial,
        };
        track.validate()?;
        Ok(track)
    }

    /// Check the length and monotonicity invariants.
    pub fn validate(&self) -> Result<(), CorrectionError> {
        let n = self.time_s.len();
        if n == 0 {
            return Err(CorrectionError::EmptySeries);
        }
        check_len("elevation", n, self.elevation.len())?;
        if let Some(d) = &self.distance_m {
            check_len("distance", n, d.len())?;
            check_non_decreasing(d)?;
        }
        if let Some(r) = &self.reference {
            check_len("reference", n, r.len())?;
        }
        if let Some(r) = &self.reference_imperial {
            check_len("reference_imperial", n, r.len())?;
        }
        check_non_decreasing(&self.time_s)
    }

    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_s.is_empty()
    }

    /// The x-axis values for the requested mode.
    ///
    /// Distance mode falls back to time when no distance was recorded.
    pub fn x_values(&self, axis: XAxis) -> &[f64] {
        match (axis, &self.distance_m) {
            (XAxis::Distance, Some(d)) => d.as_slice(),
            _ => self.time_s.as_slice(),
        }
    }
}

fn check_len(series: &'static str, expected: usize, actual: usize) -> Result<(), CorrectionError> {
    if expected != actual {
        return Err(CorrectionError::LengthMismatch {
            series,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_non_decreasing(values: &[f64]) -> Result<(), CorrectionError> {
    for (i, w) in values.windows(2).enumerate() {
        if w[1] < w[0] {
            return Err(CorrectionError::NonMonotonicAxis { index: i + 1 });
        }
    }
    Ok(())
}

/// The index range over which spline correction is active.
///
/// `right_index == 0` means "no window selected": nothing is adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionWindow {
    pub left_index: usize,
    pub right_index: usize,
}

impl CorrectionWindow {
    /// The "nothing selected" sentinel.
    pub const NONE: CorrectionWindow = CorrectionWindow {
        left_index: 0,
        right_index: 0,
    };

    /// Validated window over a series of `len` samples.
    pub fn new(left_index: usize, right_index: usize, len: usize) -> Result<Self, CorrectionError> {
        if right_index == 0 {
            return Ok(Self::NONE);
        }
        if left_index >= right_index || right_index >= len {
            return Err(CorrectionError::InvalidWindow {
                left: left_index,
                right: right_index,
                len,
            });
        }
        Ok(Self {
            left_index,
            right_index,
        })
    }

    /// Window covering every sample.
    pub fn full(len: usize) -> Self {
        Self {
            left_index: 0,
            right_index: len.saturating_sub(1),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.right_index == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        !self.is_degenerate() && index >= self.left_index && index <= self.right_index
    }

    /// Absolute x coordinates of the window edges.
    pub fn bounds(&self, x: &[f64]) -> WindowBounds {
        let at = |i: usize| x.get(i).copied().unwrap_or(0.0);
        WindowBounds {
            left_x: at(self.left_index),
            right_x: at(self.right_index),
        }
    }
}

/// Window edges in x-axis units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub left_x: f64,
    pub right_x: f64,
}

impl WindowBounds {
    pub fn span(&self) -> f64 {
        self.right_x - self.left_x
    }

    /// Map a window-relative position to an absolute x value.
    pub fn absolute_x(&self, relative_x: f64) -> f64 {
        self.left_x + self.span() * relative_x
    }

    /// Map an absolute x value to a window-relative position.
    pub fn relative_x(&self, absolute_x: f64) -> f64 {
        let span = self.span();
        if span == 0.0 { 0.0 } else { (absolute_x - self.left_x) / span }
    }

    /// Strictly inside the open interval `(left_x, right_x)`.
    pub fn contains_open(&self, absolute_x: f64) -> bool {
        absolute_x > self.left_x && absolute_x < self.right_x
    }
}

/// One draggable anchor of the correction curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplineControlPoint {
    /// Position within the window, `0..=1` (anchors sit just outside).
    pub relative_x: f64,
    /// Height in units of the first-sample elevation difference.
    pub relative_y: f64,
    /// Whether horizontal dragging is allowed.
    pub movable: bool,
    /// Lower clamp for horizontal dragging (absolute x).
    pub min_absolute_x: f64,
    /// Upper clamp for horizontal dragging (absolute x).
    pub max_absolute_x: f64,
}

/// Total elevation gain and loss, both reported as positive numbers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElevationUpDown {
    pub up: f64,
    pub down: f64,
}

/// Characteristic values of an elevation profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationMarks {
    pub start: f64,
    pub end: f64,
    pub min: f64,
    pub max: f64,
}

impl ElevationMarks {
    pub fn from_series(elevation: &[f64]) -> Option<Self> {
        let start = *elevation.first()?;
        let end = *elevation.last()?;
        let (min, max) = elevation
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Some(Self { start, end, min, max })
    }
}

/// Output of a correction pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustedElevationResult {
    pub corrected: Vec<f64>,
    /// `reference - corrected` (zero where no reference is available).
    pub diff_to_reference: Vec<f64>,
    /// The spline term per sample (spline mode only).
    pub spline_curve: Option<Vec<f64>>,
    pub elevation_gain: f64,
    pub elevation_loss: f64,
}

/// Portable JSON representation of a correction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionFile {
    pub tool: String,
    pub track_start: DateTime<Utc>,
    pub adjustment: AdjustmentKind,
    pub axis: XAxis,
    pub window: CorrectionWindow,
    pub reference_shift: i64,
    pub control_points: Vec<SplineControlPoint>,
    pub x: Vec<f64>,
    pub result: AdjustedElevationResult,
}

/// A position in device (pixel) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DevicePoint {
    pub x: f64,
    pub y: f64,
}

/// A device-space rectangle supplied by the renderer for hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl HitRect {
    /// Square of `size` pixels centred on `center`.
    pub fn centered(center: DevicePoint, size: f64) -> Self {
        Self {
            x: center.x - size / 2.0,
            y: center.y - size / 2.0,
            width: size,
            height: size,
        }
    }

    pub fn contains(&self, p: DevicePoint) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// Pixel-to-graph mapping of the current redraw.
///
/// - `graph_x = (x_offset + device_x) / scale_x`
/// - `graph_y = (y0 - device_y) / scale_y`, relative to the spline baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawingScale {
    pub scale_x: f64,
    pub scale_y: f64,
    /// Device x of graph value 0 (horizontal scroll offset).
    pub x_offset: f64,
    /// Device y of the spline baseline (relative height 0).
    pub y0: f64,
}

impl DrawingScale {
    /// `None` while the horizontal scale is zero or not finite.
    pub fn graph_x(&self, p: DevicePoint) -> Option<f64> {
        let x = (self.x_offset + p.x) / self.scale_x;
        (self.scale_x != 0.0 && x.is_finite()).then_some(x)
    }

    /// Vertical offset from the baseline, in device units (up is positive).
    pub fn device_height(&self, p: DevicePoint) -> f64 {
        self.y0 - p.y
    }

    /// Inverse mapping, used to place handles.
    pub fn device_point(&self, graph_x: f64, graph_y: f64) -> DevicePoint {
        DevicePoint {
            x: graph_x * self.scale_x - self.x_offset,
            y: self.y0 - graph_y * self.scale_y,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sample_count: usize,
    pub sample_seed: u64,
    /// Vertical bias of the recorded track relative to the reference (m).
    pub sample_bias: f64,
    /// Additional bias accumulated by the end of the track (m).
    pub sample_drift: f64,
    /// Sample offset between recorded track and reference.
    pub sample_offset: i64,

    pub axis: XAxis,
    pub adjustment: AdjustmentKind,
    pub window_left: usize,
    /// `None` means "last sample".
    pub window_right: Option<usize>,

    pub target_start: Option<f64>,
    pub target_end: Option<f64>,
    pub target_max: Option<f64>,
    pub keep_start: bool,

    /// Slices to shift the reference by before correcting.
    pub reference_shift: i64,
    /// Extra spline points as `(relative_x, relative_y)`.
    pub spline_points: Vec<(f64, f64)>,
    pub end_to_reference: bool,

    pub min_alti_diff: f64,
    pub unit: ElevationUnit,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_result: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sample_count: 240,
            sample_seed: 42,
            sample_bias: 18.0,
            sample_drift: -9.0,
            sample_offset: 0,
            axis: XAxis::Distance,
            adjustment: AdjustmentKind::ReferenceSpline,
            window_left: 0,
            window_right: None,
            target_start: None,
            target_end: None,
            target_max: None,
            keep_start: false,
            reference_shift: 0,
            spline_points: Vec::new(),
            end_to_reference: false,
            min_alti_diff: 0.0,
            unit: ElevationUnit::Metric,
            plot: true,
            plot_width: 100,
            plot_height: 20,
            export_result: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_rejects_mismatched_lengths() {
        let err = TrackSeries::new(vec![0.0, 1.0], None, vec![1.0], None).unwrap_err();
        assert_eq!(
            err,
            CorrectionError::LengthMismatch {
                series: "elevation",
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn track_rejects_decreasing_time() {
        let err = TrackSeries::new(vec![0.0, 2.0, 1.0], None, vec![0.0; 3], None).unwrap_err();
        assert_eq!(err, CorrectionError::NonMonotonicAxis { index: 2 });
    }

    #[test]
    fn distance_axis_falls_back_to_time() {
        let t = TrackSeries::new(vec![0.0, 5.0], None, vec![1.0, 2.0], None).unwrap();
        assert_eq!(t.x_values(XAxis::Distance), &[0.0, 5.0]);
    }

    #[test]
    fn imperial_reference_is_derived() {
        let t = TrackSeries::new(vec![0.0, 1.0], None, vec![0.0, 0.0], Some(vec![100.0, 0.0])).unwrap();
        let imp = t.reference_imperial.unwrap();
        assert!((imp[0] - 328.0839895).abs() < 1e-9);
    }

    #[test]
    fn window_zero_right_is_degenerate() {
        let w = CorrectionWindow::new(3, 0, 10).unwrap();
        assert!(w.is_degenerate());
        assert!(!w.contains(0));
        assert!(CorrectionWindow::new(4, 4, 10).is_err());
        assert!(CorrectionWindow::new(0, 10, 10).is_err());
    }

    #[test]
    fn hit_rect_contains_center() {
        let r = HitRect::centered(DevicePoint { x: 10.0, y: 20.0 }, 6.0);
        assert!(r.contains(DevicePoint { x: 10.0, y: 20.0 }));
        assert!(!r.contains(DevicePoint { x: 14.0, y: 20.0 }));
    }

    #[test]
    fn drawing_scale_round_trips_device_points() {
        let s = DrawingScale { scale_x: 0.5, scale_y: 2.0, x_offset: 10.0, y0: 100.0 };
        let p = s.device_point(40.0, 5.0);
        assert!((s.graph_x(p).unwrap() - 40.0).abs() < 1e-12);
        assert!((s.device_height(p) / s.scale_y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn zero_horizontal_scale_has_no_graph_x() {
        let p = DevicePoint { x: 40.0, y: 5.0 };
        let flat = DrawingScale { scale_x: 0.0, scale_y: 2.0, x_offset: 10.0, y0: 100.0 };
        assert_eq!(flat.graph_x(p), None);
        let nan = DrawingScale { scale_x: f64::NAN, ..flat };
        assert_eq!(nan.graph_x(p), None);
    }
}
