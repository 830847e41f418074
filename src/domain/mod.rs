//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - the track series and its x-axis modes (`TrackSeries`, `XAxis`)
//! - correction inputs (`CorrectionWindow`, `SplineControlPoint`, `AdjustmentKind`)
//! - correction outputs (`AdjustedElevationResult`, `ElevationUpDown`)
//! - device-space helpers for draggable handles (`DrawingScale`, `HitRect`)

pub mod types;

pub use types::*;
