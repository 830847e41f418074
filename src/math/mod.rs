//! Mathematical utilities: the cubic spline kernel and gain/loss accumulation.

pub mod spline;
pub mod updown;

pub use spline::*;
pub use updown::*;
