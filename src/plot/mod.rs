//! PNG charts (plotters bitmap backend).
//!
//! - spread-vs-rating scatter plots with flag labels (`scatter`, `flags`, `layout`)
//! - governance correlation heatmap (`heatmap`)

pub mod flags;
pub mod heatmap;
pub mod layout;
pub mod scatter;

pub use flags::{FlagCache, country_code};
pub use heatmap::render_heatmap;
pub use scatter::{FULL_PLOT_FILE, INVESTMENT_PLOT_FILE, ScatterData, View, prepare, render_scatter};
