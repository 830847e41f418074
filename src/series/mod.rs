//! Series storage for one editing session.

pub mod store;

pub use store::*;
