//! Command-line parsing for the elevation correction tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the correction code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{AdjustmentKind, ElevationUnit, XAxis};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "elevfix", version, about = "Elevation correction against a reference profile")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Correct a synthetic track, print the summary, and optionally plot/export.
    Correct(CorrectArgs),
    /// Print the before/after summary only (useful for scripting).
    Summary(CorrectArgs),
    /// List the spline control points and the samples they map to.
    Points(CorrectArgs),
}

/// Common options for every subcommand.
#[derive(Debug, Parser, Clone)]
pub struct CorrectArgs {
    /// Number of synthetic samples to generate.
    #[arg(short = 'n', long, env = "ELEVFIX_SAMPLES", default_value_t = 240)]
    pub sample_count: usize,

    /// Random seed for sample generation.
    #[arg(long, env = "ELEVFIX_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Vertical bias of the recorded track above the reference (m).
    #[arg(long, default_value_t = 18.0, allow_negative_numbers = true)]
    pub bias: f64,

    /// Extra bias accumulated by the end of the track (m).
    #[arg(long, default_value_t = -9.0, allow_negative_numbers = true)]
    pub drift: f64,

    /// Samples by which the recorded track lags the reference.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub lag: i64,

    /// Horizontal axis for fading and spline placement.
    #[arg(long, value_enum, default_value_t = XAxis::Distance)]
    pub axis: XAxis,

    /// Adjustment to apply.
    #[arg(short = 'a', long, value_enum, default_value_t = AdjustmentKind::ReferenceSpline)]
    pub adjust: AdjustmentKind,

    /// First sample of the correction window.
    #[arg(long, default_value_t = 0)]
    pub left: usize,

    /// Last sample of the correction window (default: last sample; 0 disables).
    #[arg(long)]
    pub right: Option<usize>,

    /// Target start elevation (m).
    #[arg(long, allow_negative_numbers = true)]
    pub start: Option<f64>,

    /// Target end elevation (m).
    #[arg(long, allow_negative_numbers = true)]
    pub end: Option<f64>,

    /// Target max elevation (m).
    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<f64>,

    /// Keep the start elevation when the max is rescaled.
    #[arg(long)]
    pub keep_start: bool,

    /// Shift the reference by this many samples before correcting.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub shift: i64,

    /// Extra spline point as `relative_x:relative_y` (repeatable).
    #[arg(long = "point", value_name = "X:Y", value_parser = parse_spline_point)]
    pub points: Vec<(f64, f64)>,

    /// Lift the last spline point onto the reference.
    #[arg(long)]
    pub end_to_reference: bool,

    /// Minimum elevation change counted for gain/loss (m).
    #[arg(long, default_value_t = 0.0)]
    pub min_diff: f64,

    /// Unit for printed elevations.
    #[arg(long, value_enum, default_value_t = ElevationUnit::Metric)]
    pub unit: ElevationUnit,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the corrected series and control points to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Parse `relative_x:relative_y`.
pub fn parse_spline_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(':')
        .ok_or_else(|| format!("expected X:Y, got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("invalid X in '{s}': {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("invalid Y in '{s}': {e}"))?;
    if !(x > 0.0 && x < 1.0) {
        return Err(format!("X must be strictly between 0 and 1, got {x}"));
    }
    if !y.is_finite() {
        return Err(format!("Y must be finite, got {y}"));
    }
    Ok((x, y))
}
