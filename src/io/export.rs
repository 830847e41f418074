//! Export a correction run to JSON.
//!
//! The file carries the corrected series, its difference to the reference,
//! the spline term and the control points, so a run can be inspected or
//! re-plotted without recomputing. The schema is `domain::CorrectionFile`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::CorrectionFile;
use crate::error::AppError;

/// Write a correction JSON file.
pub fn write_result_json(path: &Path, file: &CorrectionFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create result JSON '{}': {e}", path.display())))?;

    let mut writer = BufWriter::new(out);
    serde_json::to_writer_pretty(&mut writer, file)
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;

    log::info!("wrote result JSON to {}", path.display());
    Ok(())
}

/// Read a correction JSON file.
pub fn read_result_json(path: &Path) -> Result<CorrectionFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open result JSON '{}': {e}", path.display())))?;
    let parsed: CorrectionFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid result JSON: {e}")))?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crate::domain::{
        AdjustedElevationResult, AdjustmentKind, CorrectionWindow, SplineControlPoint, XAxis,
    };

    #[test]
    fn written_file_reads_back() {
        let file = CorrectionFile {
            tool: "elevfix".to_string(),
            track_start: Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap(),
            adjustment: AdjustmentKind::ReferenceSpline,
            axis: XAxis::Distance,
            window: CorrectionWindow::full(3),
            reference_shift: -2,
            control_points: vec![SplineControlPoint {
                relative_x: 0.5,
                relative_y: 0.25,
                movable: true,
                min_absolute_x: 0.0,
                max_absolute_x: 20.0,
            }],
            x: vec![0.0, 10.0, 20.0],
            result: AdjustedElevationResult {
                corrected: vec![101.0, 102.5, 99.0],
                diff_to_reference: vec![0.0, -0.5, 1.0],
                spline_curve: Some(vec![0.0, 0.3, 0.0]),
                elevation_gain: 1.5,
                elevation_loss: 3.5,
            },
        };

        let path = std::env::temp_dir().join(format!("elevfix-export-{}.json", std::process::id()));
        write_result_json(&path, &file).unwrap();
        let back = read_result_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.adjustment, AdjustmentKind::ReferenceSpline);
        assert_eq!(back.reference_shift, -2);
        assert_eq!(back.control_points, file.control_points);
        assert_eq!(back.result.corrected, file.result.corrected);
        assert_eq!(back.track_start, file.track_start);
    }

    #[test]
    fn kinds_serialize_in_kebab_case() {
        let json = serde_json::to_string(&AdjustmentKind::ReferenceSpline).unwrap();
        assert_eq!(json, "\"reference-spline\"");
    }
}
