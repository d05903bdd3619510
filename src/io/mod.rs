//! CSV persistence.
//!
//! - spreads / ratings / merged tables (`tables`)
//! - governance panel input + correlation outputs (`wgi`)
//! - ratings-by-grade summary (`grades`)
//!
//! Writers and readers are generic over `Write` / `Read`; the `save_*` and
//! `load_*` wrappers add the file handling and error context.

use std::collections::HashMap;
use std::fs::{File, create_dir_all};
use std::path::Path;

use csv::StringRecord;

use crate::error::AppError;

pub mod grades;
pub mod tables;
pub mod wgi;

pub use grades::*;
pub use tables::*;
pub use wgi::*;

/// A row that could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Rows read from a CSV plus the rows that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub rows: Vec<T>,
    pub row_errors: Vec<RowError>,
}

/// Create `path` (and its parent directories) for writing.
pub fn create_file(path: &Path) -> Result<File, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)
            .map_err(|e| AppError::input(format!("Failed to create directory '{}': {e}", parent.display())))?;
    }
    File::create(path).map_err(|e| AppError::input(format!("Failed to create '{}': {e}", path.display())))
}

pub fn open_file(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::input(format!("Failed to open '{}': {e}", path.display())))
}

pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_lowercase()
}

pub(crate) fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    get_optional(record, header_map, name).ok_or_else(|| format!("Missing required value: `{name}`"))
}

pub(crate) fn ensure_columns(header_map: &HashMap<String, usize>, required: &[&str]) -> Result<(), AppError> {
    for name in required {
        if !header_map.contains_key(*name) {
            return Err(AppError::input(format!("Missing required column: `{name}`")));
        }
    }
    Ok(())
}

pub(crate) fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Empty cell for `None`; shortest round-trip representation otherwise.
pub(crate) fn fmt_opt_f64(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

pub(crate) fn reader<R: std::io::Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

pub(crate) fn csv_write_err(e: impl std::fmt::Display) -> AppError {
    AppError::input(format!("Failed to write CSV: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_map_is_case_and_bom_insensitive() {
        let headers = StringRecord::from(vec!["\u{feff}Country", " Spread "]);
        let map = build_header_map(&headers);
        assert_eq!(map.get("country"), Some(&0));
        assert_eq!(map.get("spread"), Some(&1));
    }

    #[test]
    fn optional_floats() {
        assert_eq!(parse_opt_f64(Some("1.5")), Some(1.5));
        assert_eq!(parse_opt_f64(Some("NaN")), None);
        assert_eq!(parse_opt_f64(None), None);
        assert_eq!(fmt_opt_f64(Some(-165.3)), "-165.3");
        assert_eq!(fmt_opt_f64(None), "");
    }
}
