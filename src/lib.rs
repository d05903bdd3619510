//! `sov-spreads` library crate.
//!
//! The binary (`sov`) is a thin wrapper around this library so that:
//!
//! - scraping, merging and statistics are testable without spawning processes
//! - the HTML/CSV/JSON parsers work on in-memory inputs in tests
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod merge;
pub mod plot;
pub mod rating;
pub mod report;
pub mod scrape;
pub mod stats;
