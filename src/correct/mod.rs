//! The elevation correction engine.
//!
//! - `parametric`: whole-series transforms (even shift, end fade, max rescale)
//! - `spline_model`: editable control points of the correction curve
//! - `evaluator`: reference fade plus spline curve over a window
//! - `aligner`: whole-sample reference shifts
//! - `engine`: one session tying the pieces to a `SeriesStore`

pub mod aligner;
pub mod engine;
pub mod evaluator;
pub mod parametric;
pub mod spline_model;

pub use engine::{CorrectionEngine, Targets};
pub use evaluator::SplineEvaluator;
pub use parametric::EditingSession;
pub use spline_model::SplineModel;
