//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the prefecture selector (`Prefecture`)
//! - raw API records and series (`Observation`, `Series`)
//! - analysis outputs (`MergedRecord`, `AnalysisResult`, `Band`)

pub mod types;

pub use types::*;
