//! Reporting: formatted summaries for the terminal and the text outputs.

pub mod format;

pub use format::*;
