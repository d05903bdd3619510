//! Bond spread table → `BondSpreadRecord`s.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::domain::BondSpreadRecord;
use crate::scrape::table::HtmlTable;

/// The spreads table has two header rows before the data.
const HEADER_ROWS: usize = 2;
const COUNTRY_COL: usize = 1;
const YIELD_COL: usize = 2;
/// Spread vs. the US 10-year, in bp.
const SPREAD_COL: usize = 4;

/// Extract country + spread rows. Rows whose spread is not numeric are
/// dropped.
pub fn parse_spreads(table: &HtmlTable) -> Vec<BondSpreadRecord> {
    let mut out = Vec::new();
    for row in table.rows.iter().skip(HEADER_ROWS) {
        let cells = &row.cells;
        if cells.len() <= SPREAD_COL {
            continue;
        }
        let country = cells[COUNTRY_COL].text.trim();
        let spread_raw = cells[SPREAD_COL].text.trim();
        if country.is_empty() || spread_raw.is_empty() {
            continue;
        }
        let Some(spread_bp) = parse_number(spread_raw) else {
            debug!("Dropping {country}: spread '{spread_raw}' is not numeric");
            continue;
        };
        out.push(BondSpreadRecord {
            country: country.to_string(),
            yield_10y: parse_number(&cells[YIELD_COL].text),
            spread_bp,
        });
    }
    out
}

static UNITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,%\s]|bp").expect("unit pattern is valid"));

/// Parse a number as printed on the site: `"1,234.5 bp"`, `"3.21%"`, `"-12"`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let v = UNITS.replace_all(raw, "").parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Outlook;
    use crate::scrape::table::{Cell, TableRow};

    fn row(cells: &[&str]) -> TableRow {
        TableRow {
            headers: Vec::new(),
            cells: cells
                .iter()
                .map(|t| Cell {
                    text: t.to_string(),
                    outlook: Outlook::Stable,
                })
                .collect(),
        }
    }

    #[test]
    fn parse_number_strips_units() {
        assert_eq!(parse_number("1,234.5 bp"), Some(1234.5));
        assert_eq!(parse_number("3.21%"), Some(3.21));
        assert_eq!(parse_number(" -12 "), Some(-12.0));
        assert_eq!(parse_number("n.a."), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("-1,050 bp"), Some(-1050.0));
        assert_eq!(parse_number("12 bps"), None);
    }

    #[test]
    fn skips_headers_short_rows_and_bad_spreads() {
        let table = HtmlTable {
            rows: vec![
                row(&[]),
                row(&["", "", "", "", "vs USA"]),
                row(&["", "Germany", "2.60%", "", "-165.3 bp"]),
                row(&["", "Italy", "3.55%", "", "n.a."]),
                row(&["", "Short"]),
                row(&["", "Japan", "", "", "-250 bp"]),
            ],
        };
        let spreads = parse_spreads(&table);
        assert_eq!(spreads.len(), 2);
        assert_eq!(spreads[0].country, "Germany");
        assert_eq!(spreads[0].yield_10y, Some(2.6));
        assert_eq!(spreads[0].spread_bp, -165.3);
        assert_eq!(spreads[1].yield_10y, None);
    }
}
