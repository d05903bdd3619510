//! HTML table parsing for the spreads and ratings pages.
//!
//! - `table`: generic "largest table" extraction (text + outlook icons)
//! - `spreads`: spread table → `BondSpreadRecord`
//! - `ratings`: ratings table → `RatingRecord` (numeric grades included)

pub mod ratings;
pub mod spreads;
pub mod table;

pub use ratings::parse_ratings;
pub use spreads::parse_spreads;
pub use table::{HtmlTable, parse_largest_table};
