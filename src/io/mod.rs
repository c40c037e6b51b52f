//! Input/output helpers.
//!
//! - merged table / result exports (CSV/JSON) (`export`)

pub mod export;

pub use export::*;
