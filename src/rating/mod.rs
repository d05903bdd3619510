//! Credit rating normalization.
//!
//! - `scale`: per-agency letter grade → 1–22 lookup tables
//! - `grade`: broad grade categories and the ratings-by-grade summary

pub mod grade;
pub mod scale;

pub use grade::{GradeCategory, GradeGroup, categorize, ratings_by_grade};
pub use scale::{extract_base_grade, grade_label, normalize, parse_agency_cell};
