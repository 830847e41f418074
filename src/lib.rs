//! `elev-fix` library crate.
//!
//! The binary (`elevfix`) is a thin wrapper around this library so that:
//!
//! - the correction engine is testable without spawning processes
//! - the engine can be embedded behind an interactive front-end
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod correct;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod series;
