//! Credit ratings table → `RatingRecord`s with numeric grades.

use crate::domain::{Agency, Outlook, RatingRecord};
use crate::error::AppError;
use crate::rating::parse_agency_cell;
use crate::scrape::table::HtmlTable;

/// Column positions resolved from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Columns {
    country: usize,
    agencies: Vec<(Agency, usize)>,
}

fn resolve_columns(header: &[String]) -> Result<Columns, AppError> {
    let country = header
        .iter()
        .position(|h| h.to_lowercase().contains("country"))
        .ok_or_else(|| AppError::external("Ratings table has no `Country` column."))?;

    let mut agencies: Vec<(Agency, usize)> = Vec::new();
    for (idx, h) in header.iter().enumerate() {
        if let Some(agency) = Agency::from_header(h) {
            // Keep the first column per agency.
            if !agencies.iter().any(|(a, _)| *a == agency) {
                agencies.push((agency, idx));
            }
        }
    }
    if agencies.is_empty() {
        return Err(AppError::external(
            "Ratings table has none of the S&P / Moody's / Fitch columns.",
        ));
    }

    Ok(Columns { country, agencies })
}

/// Normalize every body row of the ratings table.
///
/// Other agencies (DBRS) are ignored. Rows without a country name are skipped.
pub fn parse_ratings(table: &HtmlTable) -> Result<Vec<RatingRecord>, AppError> {
    let cols = resolve_columns(table.header())?;

    let mut out = Vec::new();
    for row in table.rows.iter().skip(1) {
        let Some(country) = row.cells.get(cols.country).map(|c| c.text.trim()) else {
            continue;
        };
        if country.is_empty() {
            continue;
        }

        let mut record = RatingRecord::new(country);
        for &(agency, idx) in &cols.agencies {
            let Some(cell) = row.cells.get(idx) else {
                continue;
            };
            let mut rating = parse_agency_cell(agency, &cell.text);
            if cell.outlook != Outlook::Stable {
                rating.outlook = cell.outlook;
            }
            *record.agency_mut(agency) = rating;
        }
        out.push(record);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::table::{Cell, TableRow};

    fn header(names: &[&str]) -> TableRow {
        TableRow {
            headers: names.iter().map(|s| s.to_string()).collect(),
            cells: Vec::new(),
        }
    }

    fn row(cells: &[(&str, Outlook)]) -> TableRow {
        TableRow {
            headers: Vec::new(),
            cells: cells
                .iter()
                .map(|(t, o)| Cell {
                    text: t.to_string(),
                    outlook: *o,
                })
                .collect(),
        }
    }

    #[test]
    fn normalizes_each_agency_and_skips_dbrs() {
        let s = Outlook::Stable;
        let table = HtmlTable {
            rows: vec![
                header(&["Country", "S&P", "Moody's", "Fitch", "DBRS"]),
                row(&[("Germany", s), ("AAA", s), ("Aaa", s), ("AAA", s), ("AAA", s)]),
                row(&[
                    ("Italy", s),
                    ("BBB+", Outlook::Upgrade),
                    ("Baa3", s),
                    ("BBB", s),
                    ("BBB (high)", s),
                ]),
                row(&[("Argentina", s), ("CCC", s), ("Ca", s), ("N/A", s), ("", s)]),
                row(&[("", s)]),
            ],
        };

        let records = parse_ratings(&table).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].numerics(), [Some(1), Some(1), Some(1)]);

        let italy = &records[1];
        assert_eq!(italy.sp.letter.as_deref(), Some("BBB+"));
        assert_eq!(italy.sp.outlook, Outlook::Upgrade);
        assert_eq!(italy.numerics(), [Some(8), Some(10), Some(9)]);
        assert_eq!(italy.average(), Some(9.0));

        let argentina = &records[2];
        assert_eq!(argentina.fitch.letter, None);
        assert_eq!(argentina.fitch.numeric, None);
        assert_eq!(argentina.ratings_count(), 2);
    }

    #[test]
    fn missing_country_column_is_an_error() {
        let table = HtmlTable {
            rows: vec![header(&["Name", "S&P"])],
        };
        assert!(parse_ratings(&table).is_err());
    }
}
