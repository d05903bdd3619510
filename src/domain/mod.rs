//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - agencies, outlooks and the per-country rating rows (`RatingRecord`)
//! - spread rows and the merged spreads + ratings row (`MergedRecord`)
//! - governance-indicator panel rows (`PanelRow`)
//! - resolved per-command configuration structs

pub mod types;

pub use types::*;
