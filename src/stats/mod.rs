//! Statistics for the governance-indicator correlation utility.

pub mod correlation;
pub mod reference;
pub mod summary;

pub use correlation::{CorrelationMatrix, correlate, correlation_matrix, latest_year, pearson};
pub use reference::{Comparison, PairComparison, compare};
pub use summary::{Summary, summarize};
