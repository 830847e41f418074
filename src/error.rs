use thiserror::Error;

/// Application-level error carried up to `main`.
///
/// The binary prints the message and exits with `exit_code`.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of the correction engine itself.
///
/// These are all input-validation failures: once a series and a window are
/// accepted, evaluation degrades per sample instead of failing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CorrectionError {
    #[error("series is empty")]
    EmptySeries,

    #[error("series '{series}' has {actual} samples, expected {expected}")]
    LengthMismatch {
        series: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("x-axis values decrease at sample {index}")]
    NonMonotonicAxis { index: usize },

    #[error("x-axis ends at 0, cannot distribute an end correction")]
    DegenerateAxis,

    #[error("target max {target} equals the series minimum {min}")]
    InvalidMaxTarget { target: f64, min: f64 },

    #[error("series is flat (min == max == {value}), cannot rescale its maximum")]
    FlatSeries { value: f64 },

    #[error("no reference elevation series is available")]
    MissingReference,

    #[error("invalid correction window [{left}, {right}] for {len} samples")]
    InvalidWindow { left: usize, right: usize, len: usize },
}

impl From<CorrectionError> for AppError {
    fn from(value: CorrectionError) -> Self {
        AppError::new(4, format!("Elevation correction failed: {value}"))
    }
}
