//! Input/output helpers.
//!
//! - result export/read-back as JSON (`export`)

pub mod export;

pub use export::*;
