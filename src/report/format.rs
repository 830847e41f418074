//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the correction code stays clean and testable
//! - output changes are localized (snapshot tests pin them)

use crate::data::TrackStats;
use crate::domain::{AdjustmentKind, ElevationMarks, ElevationUnit, ElevationUpDown, RunConfig, XAxis};

use super::{CorrectionSummary, DiffStats};

/// Format the full run summary (track stats + correction before/after).
pub fn format_run_summary(summary: &CorrectionSummary, config: &RunConfig, stats: Option<&TrackStats>) -> String {
    let unit = config.unit;
    let mut out = String::new();

    out.push_str("=== elevfix - Elevation Correction ===\n");
    out.push_str(&format!("Adjustment: {}\n", summary.kind.display_name()));
    out.push_str(&format!(
        "Axis: {} | window=[{}, {}] | reference shift={}\n",
        axis_label(config.axis),
        summary.window.left_index,
        summary.window.right_index,
        summary.reference_shift,
    ));
    if let Some(s) = stats {
        out.push_str(&format!(
            "Track: n={} | duration={:.0}s | distance={:.0}m\n",
            s.n_samples, s.duration_s, s.distance_m
        ));
    }
    if summary.kind == AdjustmentKind::ReferenceSpline {
        out.push_str(&format!("Spline: {} control points\n", summary.control_points));
    }

    out.push_str(&format!("\nElevation ({}):\n", unit.label()));
    out.push_str(
        format!(
            "{:<8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
            "", "start", "end", "min", "max", "up", "down"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&marks_row("before", &summary.before, &summary.updown_before, unit));
    out.push_str(&marks_row("after", &summary.after, &summary.updown_after, unit));
    out.push_str(&format!(
        "{:<8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
        "change",
        fmt_elev(summary.after.start - summary.before.start, unit),
        fmt_elev(summary.after.end - summary.before.end, unit),
        fmt_elev(summary.after.min - summary.before.min, unit),
        fmt_elev(summary.after.max - summary.before.max, unit),
        fmt_elev(summary.updown_after.up - summary.updown_before.up, unit),
        fmt_elev(summary.updown_after.down - summary.updown_before.down, unit),
    ));

    match (summary.diff_before, summary.diff_after) {
        (Some(before), Some(after)) => {
            out.push_str("\nDifference to reference:\n");
            out.push_str(&diff_row("before", &before, unit));
            out.push_str(&diff_row("after", &after, unit));
        }
        _ => out.push_str("\nNo reference elevation available.\n"),
    }

    out
}

fn marks_row(label: &str, marks: &ElevationMarks, updown: &ElevationUpDown, unit: ElevationUnit) -> String {
    format!(
        "{label:<8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
        fmt_elev(marks.start, unit),
        fmt_elev(marks.end, unit),
        fmt_elev(marks.min, unit),
        fmt_elev(marks.max, unit),
        fmt_elev(updown.up, unit),
        fmt_elev(updown.down, unit),
    )
}

fn diff_row(label: &str, d: &DiffStats, unit: ElevationUnit) -> String {
    format!(
        "{label:<8} min={} max={} mean|d|={}\n",
        fmt_elev(d.min, unit),
        fmt_elev(d.max, unit),
        fmt_elev(d.mean_abs, unit),
    )
}

/// Metric value converted to `unit` with one decimal.
pub fn fmt_elev(metres: f64, unit: ElevationUnit) -> String {
    format!("{:.1}", metres * unit.factor())
}

fn axis_label(axis: XAxis) -> &'static str {
    match axis {
        XAxis::Time => "time",
        XAxis::Distance => "distance",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CorrectionWindow;

    fn summary() -> CorrectionSummary {
        CorrectionSummary {
            kind: AdjustmentKind::WholeTour,
            window: CorrectionWindow::full(4),
            reference_shift: 0,
            control_points: 3,
            before: ElevationMarks { start: 100.0, end: 130.0, min: 100.0, max: 130.0 },
            after: ElevationMarks { start: 110.0, end: 140.0, min: 110.0, max: 140.0 },
            updown_before: ElevationUpDown { up: 30.0, down: 0.0 },
            updown_after: ElevationUpDown { up: 30.0, down: 0.0 },
            diff_before: None,
            diff_after: None,
        }
    }

    fn config(unit: ElevationUnit) -> RunConfig {
        RunConfig {
            axis: XAxis::Time,
            adjustment: AdjustmentKind::WholeTour,
            unit,
            ..RunConfig::default()
        }
    }

    #[test]
    fn summary_lists_before_after_rows() {
        let txt = format_run_summary(&summary(), &config(ElevationUnit::Metric), None);
        assert!(txt.contains("Adjustment: Whole tour\n"));
        assert!(txt.contains("Axis: time | window=[0, 3] | reference shift=0\n"));
        assert!(txt.contains("Elevation (m):\n"));
        assert!(txt.contains(
            "before        100.0      130.0      100.0      130.0       30.0        0.0\n"
        ));
        assert!(txt.contains(
            "change         10.0       10.0       10.0       10.0        0.0        0.0\n"
        ));
        assert!(txt.ends_with("No reference elevation available.\n"));
    }

    #[test]
    fn imperial_output_is_converted() {
        let txt = format_run_summary(&summary(), &config(ElevationUnit::Imperial), None);
        assert!(txt.contains("Elevation (ft):\n"));
        // 100 m = 328.1 ft
        assert!(txt.contains("  328.1 "));
    }
}
