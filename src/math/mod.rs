//! Small numeric helpers used by the analysis pipeline.
//!
//! - `correlation`: Pearson coefficient with an explicit "undefined" result

pub mod correlation;

pub use correlation::pearson;
