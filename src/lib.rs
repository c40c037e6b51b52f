//! `estat-correlate` library crate.
//!
//! The binary (`estat`) is a thin wrapper around this library so that:
//!
//! - the fetch/merge/correlate pipeline is testable without a network
//! - the CLI and the TUI share one analysis path
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
