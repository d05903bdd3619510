//! Spreads, ratings and merged CSV tables.
//!
//! Column layout (missing values are empty cells):
//!
//! - spreads: `Country,Yield_10Y,Spread`
//! - ratings: `Country,S&P,Moody's,Fitch,S&P_Outlook,Moody's_Outlook,
//!   Fitch_Outlook,S&P_Numeric,Moody's_Numeric,Fitch_Numeric,Average_Rating,
//!   Ratings_Count`
//! - merged: `Country,Yield_10Y,Spread` followed by the ratings columns

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Agency, AgencyRating, BondSpreadRecord, MergedRecord, Outlook, RatingRecord};
use crate::error::AppError;
use crate::io::{
    Loaded, RowError, build_header_map, create_file, csv_write_err, ensure_columns, fmt_opt_f64, get_optional,
    get_required, open_file, parse_opt_f64, reader,
};

pub const SPREADS_FILE: &str = "government_bond_spreads.csv";
pub const RATINGS_FILE: &str = "world_credit_ratings_with_numeric.csv";
pub const MERGED_FILE: &str = "credit_ratings_and_spreads.csv";

const SPREAD_COLUMNS: [&str; 3] = ["Country", "Yield_10Y", "Spread"];

fn rating_columns() -> Vec<String> {
    let mut cols: Vec<String> = Agency::ALL.iter().map(|a| a.label().to_string()).collect();
    cols.extend(Agency::ALL.iter().map(|a| format!("{}_Outlook", a.label())));
    cols.extend(Agency::ALL.iter().map(|a| format!("{}_Numeric", a.label())));
    cols.push("Average_Rating".to_string());
    cols.push("Ratings_Count".to_string());
    cols
}

fn rating_cells(r: Option<&RatingRecord>) -> Vec<String> {
    let Some(r) = r else {
        return vec![String::new(); 11];
    };
    let mut cells: Vec<String> = Agency::ALL
        .iter()
        .map(|&a| r.agency(a).letter.clone().unwrap_or_default())
        .collect();
    cells.extend(Agency::ALL.iter().map(|&a| r.agency(a).outlook.as_str().to_string()));
    cells.extend(
        Agency::ALL
            .iter()
            .map(|&a| r.agency(a).numeric.map(|n| n.to_string()).unwrap_or_default()),
    );
    cells.push(r.average().map(|v| format!("{v:.2}")).unwrap_or_default());
    cells.push(r.ratings_count().to_string());
    cells
}

pub fn write_spreads<W: Write>(out: W, rows: &[BondSpreadRecord]) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record(SPREAD_COLUMNS).map_err(csv_write_err)?;
    for s in rows {
        w.write_record([s.country.clone(), fmt_opt_f64(s.yield_10y), s.spread_bp.to_string()])
            .map_err(csv_write_err)?;
    }
    w.flush().map_err(csv_write_err)
}

pub fn write_ratings<W: Write>(out: W, rows: &[RatingRecord]) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(out);
    let mut header = vec!["Country".to_string()];
    header.extend(rating_columns());
    w.write_record(&header).map_err(csv_write_err)?;
    for r in rows {
        let mut record = vec![r.country.clone()];
        record.extend(rating_cells(Some(r)));
        w.write_record(&record).map_err(csv_write_err)?;
    }
    w.flush().map_err(csv_write_err)
}

pub fn write_merged<W: Write>(out: W, rows: &[MergedRecord]) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(out);
    let mut header: Vec<String> = SPREAD_COLUMNS.iter().map(|s| s.to_string()).collect();
    header.extend(rating_columns());
    w.write_record(&header).map_err(csv_write_err)?;
    for m in rows {
        let mut record = vec![
            m.country.clone(),
            fmt_opt_f64(m.yield_10y),
            fmt_opt_f64(m.spread_bp),
        ];
        record.extend(rating_cells(m.rating.as_ref()));
        w.write_record(&record).map_err(csv_write_err)?;
    }
    w.flush().map_err(csv_write_err)
}

pub fn save_spreads(path: &Path, rows: &[BondSpreadRecord]) -> Result<(), AppError> {
    write_spreads(create_file(path)?, rows)
}

pub fn save_ratings(path: &Path, rows: &[RatingRecord]) -> Result<(), AppError> {
    write_ratings(create_file(path)?, rows)
}

pub fn save_merged(path: &Path, rows: &[MergedRecord]) -> Result<(), AppError> {
    write_merged(create_file(path)?, rows)
}

pub fn read_ratings<R: Read>(input: R) -> Result<Loaded<RatingRecord>, AppError> {
    read_rows(input, &["country"], |record, map| {
        let country = get_required(record, map, "country")?;
        Ok(parse_rating_cells(record, map, country))
    })
}

pub fn read_merged<R: Read>(input: R) -> Result<Loaded<MergedRecord>, AppError> {
    read_rows(input, &["country", "spread"], |record, map| {
        let country = get_required(record, map, "country")?;
        let spread_bp = match get_optional(record, map, "spread") {
            Some(raw) => Some(
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| format!("Invalid `Spread` value '{raw}'"))?,
            ),
            None => None,
        };
        // A row came from the ratings page iff it carries a ratings count.
        let rating = get_optional(record, map, "ratings_count").map(|_| parse_rating_cells(record, map, country));
        Ok(MergedRecord {
            country: country.to_string(),
            yield_10y: parse_opt_f64(get_optional(record, map, "yield_10y")),
            spread_bp,
            rating,
        })
    })
}

pub fn load_ratings(path: &Path) -> Result<Loaded<RatingRecord>, AppError> {
    read_ratings(open_file(path)?)
}

pub fn load_merged(path: &Path) -> Result<Loaded<MergedRecord>, AppError> {
    read_merged(open_file(path)?)
}

fn parse_rating_cells(record: &StringRecord, map: &HashMap<String, usize>, country: &str) -> RatingRecord {
    let mut r = RatingRecord::new(country);
    for agency in Agency::ALL {
        let label = agency.label().to_lowercase();
        *r.agency_mut(agency) = AgencyRating {
            letter: get_optional(record, map, &label).map(str::to_string),
            numeric: get_optional(record, map, &format!("{label}_numeric")).and_then(parse_grade),
            outlook: get_optional(record, map, &format!("{label}_outlook"))
                .map(Outlook::parse)
                .unwrap_or_default(),
        };
    }
    r
}

/// Numeric grades are integers, but accept `"14.0"` from spreadsheet round-trips.
fn parse_grade(raw: &str) -> Option<u8> {
    if let Ok(n) = raw.parse::<u8>() {
        return crate::rating::scale::in_range(n).then_some(n);
    }
    let v = raw.parse::<f64>().ok()?;
    let n = v.round();
    ((v - n).abs() < 1e-9 && (1.0..=22.0).contains(&n)).then_some(n as u8)
}

fn read_rows<R: Read, T>(
    input: R,
    required: &[&str],
    parse: impl Fn(&StringRecord, &HashMap<String, usize>) -> Result<T, String>,
) -> Result<Loaded<T>, AppError> {
    let mut rdr = reader(input);
    let headers = rdr
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let map = build_header_map(&headers);
    ensure_columns(&map, required)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        // +2: 1-based lines, header on line 1.
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        match parse(&record, &map) {
            Ok(row) => rows.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }
    Ok(Loaded { rows, row_errors })
}
