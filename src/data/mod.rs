//! Input data for a run.

pub mod sample;

pub use sample::*;
