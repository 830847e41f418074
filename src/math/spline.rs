//! Natural cubic spline kernel.
//!
//! The correction curve is a natural cubic spline through the absolute
//! positions of the control points:
//!
//! - knots are sorted by x on construction, so callers may pass points in
//!   any order (the control-point model appends new points at the end)
//! - knots sharing the same x are merged by averaging their y values
//! - second derivatives are obtained from the tridiagonal system
//!   `h[i-1] M[i-1] + 2 (h[i-1] + h[i]) M[i] + h[i] M[i+1] = 6 (s[i] - s[i-1])`
//!   with the natural end conditions `M[0] = M[n-1] = 0`
//!
//! Queries outside `[x_min, x_max]` return `SplineError::OutOfDomain`, except
//! for overshoots within a tiny rounding tolerance which are snapped onto the
//! boundary knot.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Minimum number of distinct knots the kernel accepts.
pub const MIN_KNOTS: usize = 3;

/// Relative tolerance for snapping out-of-range queries onto the boundary.
const ROUNDING_TOLERANCE: f64 = 5e-15;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplineError {
    #[error("x and y have different lengths ({x_len} vs {y_len})")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("a cubic spline needs at least {MIN_KNOTS} distinct knots, got {found}")]
    TooFewPoints { found: usize },

    #[error("knot values must be finite")]
    NonFinite,

    #[error("second-derivative system is singular")]
    Singular,

    #[error("x ({x}) is outside the range of the knots ({min} to {max})")]
    OutOfDomain { x: f64, min: f64, max: f64 },
}

/// An immutable natural cubic spline.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    d2y: Vec<f64>,
}

impl CubicSpline {
    /// Build a spline through `(x[i], y[i])`.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self, SplineError> {
        if x.len() != y.len() {
            return Err(SplineError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(SplineError::NonFinite);
        }

        let (x, y) = sorted_unique_knots(x, y);
        if x.len() < MIN_KNOTS {
            return Err(SplineError::TooFewPoints { found: x.len() });
        }

        let d2y = natural_second_derivatives(&x, &y)?;
        Ok(Self { x, y, d2y })
    }

    pub fn x_min(&self) -> f64 {
        self.x[0]
    }

    pub fn x_max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// Sorted knot abscissae.
    pub fn knots_x(&self) -> &[f64] {
        &self.x
    }

    /// Evaluate the spline at `xx`.
    pub fn interpolate(&self, xx: f64) -> Result<f64, SplineError> {
        let xx = self.clamp_to_domain(xx)?;

        // Bisection for the bracketing interval.
        let mut klo = 0usize;
        let mut khi = self.x.len() - 1;
        while khi - klo > 1 {
            let k = (khi + klo) >> 1;
            if self.x[k] > xx {
                khi = k;
            } else {
                klo = k;
            }
        }

        let h = self.x[khi] - self.x[klo];
        let a = (self.x[khi] - xx) / h;
        let b = (xx - self.x[klo]) / h;

        Ok(a * self.y[klo]
            + b * self.y[khi]
            + ((a * a * a - a) * self.d2y[klo] + (b * b * b - b) * self.d2y[khi]) * (h * h) / 6.0)
    }

    fn clamp_to_domain(&self, xx: f64) -> Result<f64, SplineError> {
        let min = self.x_min();
        let max = self.x_max();
        if !xx.is_finite() {
            return Err(SplineError::OutOfDomain { x: xx, min, max });
        }
        if xx < min {
            if (min - xx).abs() <= rounding_slack(min) {
                return Ok(min);
            }
            return Err(SplineError::OutOfDomain { x: xx, min, max });
        }
        if xx > max {
            if (xx - max).abs() <= rounding_slack(max) {
                return Ok(max);
            }
            return Err(SplineError::OutOfDomain { x: xx, min, max });
        }
        Ok(xx)
    }
}

/// Rounding slack scaled to the magnitude of the boundary value.
fn rounding_slack(boundary: f64) -> f64 {
    let magnitude = boundary.abs();
    if magnitude == 0.0 {
        return ROUNDING_TOLERANCE;
    }
    10f64.powf(magnitude.log10().floor()) * ROUNDING_TOLERANCE
}

fn sorted_unique_knots(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut out_x: Vec<f64> = Vec::with_capacity(pairs.len());
    let mut out_y: Vec<f64> = Vec::with_capacity(pairs.len());
    let mut run_count = 0usize;

    for (px, py) in pairs {
        match out_x.last() {
            Some(&last) if last == px => {
                // Average the ordinates of identical abscissae.
                let idx = out_y.len() - 1;
                let sum = out_y[idx] * run_count as f64 + py;
                run_count += 1;
                out_y[idx] = sum / run_count as f64;
            }
            _ => {
                out_x.push(px);
                out_y.push(py);
                run_count = 1;
            }
        }
    }

    (out_x, out_y)
}

fn natural_second_derivatives(x: &[f64], y: &[f64]) -> Result<Vec<f64>, SplineError> {
    let n = x.len();
    let mut a = DMatrix::<f64>::zeros(n, n);
    let mut rhs = DVector::<f64>::zeros(n);

    a[(0, 0)] = 1.0;
    a[(n - 1, n - 1)] = 1.0;

    for i in 1..n - 1 {
        let h_prev = x[i] - x[i - 1];
        let h_next = x[i + 1] - x[i];
        a[(i, i - 1)] = h_prev;
        a[(i, i)] = 2.0 * (h_prev + h_next);
        a[(i, i + 1)] = h_next;

        let slope_prev = (y[i] - y[i - 1]) / h_prev;
        let slope_next = (y[i + 1] - y[i]) / h_next;
        rhs[i] = 6.0 * (slope_next - slope_prev);
    }

    let solution = a.lu().solve(&rhs).ok_or(SplineError::Singular)?;
    if solution.iter().any(|v| !v.is_finite()) {
        return Err(SplineError::Singular);
    }
    Ok(solution.iter().copied().collect())
}
