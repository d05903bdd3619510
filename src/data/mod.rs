//! Remote data sources.
//!
//! - `endpoints`: URLs, with environment overrides
//! - `http`: shared blocking client + GET helpers
//! - `pages`: World Government Bonds page fetcher
//! - `worldbank`: governance indicator download
//! - `sample`: synthetic governance panel (offline fallback)

pub mod endpoints;
pub mod http;
pub mod pages;
pub mod sample;
pub mod worldbank;

pub use endpoints::Endpoints;
pub use pages::PageFetcher;
pub use sample::generate_panel;
pub use worldbank::WorldBankClient;
