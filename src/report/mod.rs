//! Reporting utilities: formatted terminal output for analysis runs.

pub mod format;

pub use format::*;
