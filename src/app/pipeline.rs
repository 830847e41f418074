//! Shared "correction pipeline" logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! sample generation -> reference shift -> window -> spline edits -> correction -> summary
//!
//! The subcommands can then focus on presentation.

use crate::correct::{CorrectionEngine, Targets};
use crate::data::{SampleData, generate_sample};
use crate::domain::{AdjustedElevationResult, CorrectionFile, RunConfig};
use crate::error::AppError;
use crate::report::CorrectionSummary;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub sample: SampleData,
    pub engine: CorrectionEngine,
    pub result: AdjustedElevationResult,
    pub summary: CorrectionSummary,
}

impl RunOutput {
    /// Portable JSON form of this run.
    pub fn to_file(&self) -> CorrectionFile {
        CorrectionFile {
            tool: "elevfix".to_string(),
            track_start: self.sample.start_time,
            adjustment: self.summary.kind,
            axis: self.engine.axis(),
            window: self.engine.window(),
            reference_shift: self.engine.store().reference_shift(),
            control_points: self.engine.model().points().to_vec(),
            x: self.engine.store().x_values(self.engine.axis()).to_vec(),
            result: self.result.clone(),
        }
    }
}

/// Execute the full correction pipeline and return the computed outputs.
pub fn run_correction(config: &RunConfig) -> Result<RunOutput, AppError> {
    // 1) Generate the synthetic track.
    let sample = generate_sample(config)?;
    log::info!(
        "generated {} samples over {:.0} m",
        sample.stats.n_samples,
        sample.stats.distance_m
    );

    run_correction_with_sample(config, sample)
}

/// Execute the correction pipeline on a pre-generated track.
pub fn run_correction_with_sample(config: &RunConfig, sample: SampleData) -> Result<RunOutput, AppError> {
    let mut engine = CorrectionEngine::new(sample.track.clone(), config.axis, config.min_alti_diff)?;

    // 2) Re-align the reference before anything depends on it.
    if config.reference_shift != 0 {
        let applied = engine.shift_reference(config.reference_shift)?;
        log::info!("reference shifted by {applied} samples");
    }

    // 3) Window selection; the spline model follows it.
    let right = config
        .window_right
        .unwrap_or_else(|| engine.store().len().saturating_sub(1));
    engine.set_window(config.window_left, right)?;
    engine.reset_spline();

    // 4) Spline edits.
    for &(x, y) in &config.spline_points {
        if engine.model_mut().insert_relative(x, y).is_none() {
            log::warn!("spline point {x}:{y} rejected");
        }
    }
    if config.end_to_reference && !engine.spline_end_to_reference() {
        log::warn!("could not move the last spline point onto the reference");
    }

    // 5) Correct.
    let targets = Targets {
        start: config.target_start,
        end: config.target_end,
        max: config.target_max,
        keep_start: config.keep_start,
    };
    let result = engine.compute(config.adjustment, &targets)?;
    let summary = crate::report::summarize(&engine, config.adjustment, &result, config.min_alti_diff)?;

    Ok(RunOutput {
        sample,
        engine,
        result,
        summary,
    })
}
