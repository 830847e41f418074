//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - generates the synthetic track and runs the correction
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, CorrectArgs};
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::plot::PlotSeries;

pub mod pipeline;

/// Entry point for the `elevfix` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; the flags have defaults.
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // We want `elevfix` and `elevfix -a end` to behave like `elevfix correct ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Correct(args) => handle_correct(args, OutputMode::Full),
        Command::Summary(args) => handle_correct(args, OutputMode::SummaryOnly),
        Command::Points(args) => handle_points(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    SummaryOnly,
}

fn handle_correct(args: CorrectArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_correction(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.summary, &config, Some(&run.sample.stats))
    );

    if mode == OutputMode::Full && config.plot {
        let store = run.engine.store();
        let series = PlotSeries {
            x: store.x_values(config.axis),
            recorded: store.elevation(),
            reference: store.reference(),
            corrected: &run.result.corrected,
        };
        let plot = crate::plot::render_ascii_plot(&series, config.unit, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    if let Some(path) = &config.export_result {
        crate::io::write_result_json(path, &run.to_file())?;
    }

    Ok(())
}

fn handle_points(args: CorrectArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_correction(&config)?;
    let model = run.engine.model();

    if model.is_empty() {
        println!("No spline control points (no reference elevation).");
        return Ok(());
    }

    let x = run.engine.store().x_values(config.axis);
    let indices = model.sample_indices(x);
    let bounds = model.bounds();

    println!(
        "{:>3} {:>10} {:>10} {:>12} {:>12} {:>7} {:>8}",
        "#", "rel_x", "rel_y", "abs_x", "offset", "sample", "movable"
    );
    for (i, (p, sample)) in model.points().iter().zip(indices).enumerate() {
        println!(
            "{i:>3} {:>10.4} {:>10.4} {:>12.1} {:>12} {sample:>7} {:>8}",
            p.relative_x,
            p.relative_y,
            bounds.absolute_x(p.relative_x),
            crate::report::fmt_elev(p.relative_y * model.unit(), config.unit),
            if p.movable { "yes" } else { "no" },
        );
    }
    Ok(())
}

pub fn run_config_from_args(args: &CorrectArgs) -> RunConfig {
    RunConfig {
        sample_count: args.sample_count,
        sample_seed: args.seed,
        sample_bias: args.bias,
        sample_drift: args.drift,
        sample_offset: args.lag,
        axis: args.axis,
        adjustment: args.adjust,
        window_left: args.left,
        window_right: args.right,
        target_start: args.start,
        target_end: args.end,
        target_max: args.max,
        keep_start: args.keep_start,
        reference_shift: args.shift,
        spline_points: args.points.clone(),
        end_to_reference: args.end_to_reference,
        min_alti_diff: args.min_diff,
        unit: args.unit,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_result: args.export.clone(),
    }
}

/// Rewrite argv so `elevfix` defaults to `elevfix correct`.
///
/// Rules:
/// - `elevfix`                     -> `elevfix correct`
/// - `elevfix -a end ...`          -> `elevfix correct -a end ...`
/// - `elevfix --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("correct".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "correct" | "summary" | "points");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "correct flags".
    if arg1.starts_with('-') {
        argv.insert(1, "correct".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_correct() {
        assert_eq!(rewrite_args(argv(&["elevfix"])), argv(&["elevfix", "correct"]));
        assert_eq!(
            rewrite_args(argv(&["elevfix", "-a", "end"])),
            argv(&["elevfix", "correct", "-a", "end"])
        );
        assert_eq!(rewrite_args(argv(&["elevfix", "--help"])), argv(&["elevfix", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["elevfix", "points", "--shift", "2"])),
            argv(&["elevfix", "points", "--shift", "2"])
        );
    }

    #[test]
    fn no_plot_wins_over_plot() {
        let cli = crate::cli::Cli::parse_from(["elevfix", "summary", "--no-plot", "--unit", "imperial"]);
        let Command::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        let config = run_config_from_args(&args);
        assert!(!config.plot);
        assert_eq!(config.unit, crate::domain::ElevationUnit::Imperial);
    }
}
