//! Governance panel CSV and correlation outputs.
//!
//! Panel layout: `Country,Country_Code,Year,VA,PSV,GE,RQ,RL,CC`. On input
//! `Country_Code` is optional and indicator columns may be missing (treated
//! as all-empty); `Country` and `Year` are required.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{Indicator, PanelRow};
use crate::error::AppError;
use crate::io::{
    Loaded, RowError, build_header_map, create_file, csv_write_err, ensure_columns, fmt_opt_f64, get_optional,
    get_required, open_file, parse_opt_f64, reader,
};
use crate::stats::CorrelationMatrix;

pub fn raw_data_file(start_year: i32, end_year: i32) -> String {
    format!("wgi_raw_data_{start_year}_{end_year}.csv")
}

pub fn matrix_file(date: NaiveDate) -> String {
    format!("wgi_correlation_matrix_{}.csv", date.format("%Y%m%d"))
}

pub fn summary_file(date: NaiveDate) -> String {
    format!("wgi_correlation_summary_{}.txt", date.format("%Y%m%d"))
}

pub fn heatmap_file(date: NaiveDate) -> String {
    format!("wgi_correlation_heatmap_{}.png", date.format("%Y%m%d"))
}

pub fn read_panel<R: Read>(input: R) -> Result<Loaded<PanelRow>, AppError> {
    let mut rdr = reader(input);
    let headers = rdr
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let map = build_header_map(&headers);
    ensure_columns(&map, &["country", "year"])?;
    if !Indicator::ALL
        .iter()
        .any(|i| map.contains_key(&i.short().to_lowercase()))
    {
        return Err(AppError::input("Panel CSV has none of the indicator columns VA, PSV, GE, RQ, RL, CC"));
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
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

        match parse_panel_row(&record, &map) {
            Ok(row) => rows.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }
    Ok(Loaded { rows, row_errors })
}

fn parse_panel_row(record: &StringRecord, map: &HashMap<String, usize>) -> Result<PanelRow, String> {
    let country = get_required(record, map, "country")?;
    let year_raw = get_required(record, map, "year")?;
    let year = year_raw
        .parse::<f64>()
        .ok()
        .filter(|y| y.is_finite() && y.fract() == 0.0)
        .map(|y| y as i32)
        .ok_or_else(|| format!("Invalid `Year` value '{year_raw}'"))?;
    let values = Indicator::ALL.map(|i| parse_opt_f64(get_optional(record, map, &i.short().to_lowercase())));
    Ok(PanelRow {
        country: country.to_string(),
        country_code: get_optional(record, map, "country_code").unwrap_or_default().to_string(),
        year,
        values,
    })
}

pub fn load_panel(path: &Path) -> Result<Loaded<PanelRow>, AppError> {
    read_panel(open_file(path)?)
}

pub fn write_panel<W: Write>(out: W, rows: &[PanelRow]) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(out);
    let mut header = vec!["Country", "Country_Code", "Year"];
    header.extend(Indicator::ALL.iter().map(|i| i.short()));
    w.write_record(&header).map_err(csv_write_err)?;
    for r in rows {
        let mut record = vec![r.country.clone(), r.country_code.clone(), r.year.to_string()];
        record.extend(r.values.iter().map(|v| fmt_opt_f64(*v)));
        w.write_record(&record).map_err(csv_write_err)?;
    }
    w.flush().map_err(csv_write_err)
}

pub fn save_panel(path: &Path, rows: &[PanelRow]) -> Result<(), AppError> {
    write_panel(create_file(path)?, rows)
}

/// Full 6×6 matrix, three decimals, undefined cells as `NaN`.
pub fn write_matrix<W: Write>(out: W, matrix: &CorrelationMatrix) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(out);
    let mut header = vec![""];
    header.extend(Indicator::ALL.iter().map(|i| i.short()));
    w.write_record(&header).map_err(csv_write_err)?;
    for a in Indicator::ALL {
        let mut record = vec![a.short().to_string()];
        record.extend(Indicator::ALL.iter().map(|&b| {
            let v = matrix.get(a, b);
            if v.is_finite() { format!("{v:.3}") } else { "NaN".to_string() }
        }));
        w.write_record(&record).map_err(csv_write_err)?;
    }
    w.flush().map_err(csv_write_err)
}

pub fn save_matrix(path: &Path, matrix: &CorrelationMatrix) -> Result<(), AppError> {
    write_matrix(create_file(path)?, matrix)
}

pub fn save_text(path: &Path, text: &str) -> Result<(), AppError> {
    let mut file = create_file(path)?;
    file.write_all(text.as_bytes())
        .map_err(|e| AppError::input(format!("Failed to write '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::correlation_matrix;

    #[test]
    fn panel_reads_optional_columns_and_reports_bad_years() {
        let csv = "Country,Year,VA,PSV,GE,RQ,RL,CC\n\
                   Germany,2022,1.3,0.6,1.3,1.5,1.5,1.8\n\
                   France,20x2,1.1,0.3,1.2,1.1,1.3,1.3\n\
                   Spain,2022.0,1.0,,1.0,0.9,0.9,\n";
        let loaded = read_panel(csv.as_bytes()).unwrap();
        assert_eq!(loaded.rows.len(), 2);
        assert_eq!(loaded.row_errors.len(), 1);
        assert_eq!(loaded.row_errors[0].line, 3);
        let spain = &loaded.rows[1];
        assert_eq!(spain.year, 2022);
        assert_eq!(spain.country_code, "");
        assert_eq!(spain.values[1], None);
        assert_eq!(spain.values[5], None);
    }

    #[test]
    fn panel_without_indicators_is_rejected() {
        let err = read_panel("Country,Year,GDP\nX,2020,1\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }

    #[test]
    fn panel_round_trips() {
        let rows = vec![PanelRow {
            country: "Chile".to_string(),
            country_code: "CHL".to_string(),
            year: 2021,
            values: [Some(1.0), Some(0.1), None, Some(1.2), Some(1.0), Some(1.1)],
        }];
        let mut buf = Vec::new();
        write_panel(&mut buf, &rows).unwrap();
        assert_eq!(read_panel(buf.as_slice()).unwrap().rows, rows);
    }

    #[test]
    fn matrix_csv_uses_three_decimals_and_nan() {
        let rows = vec![
            PanelRow {
                country: "A".to_string(),
                country_code: String::new(),
                year: 2020,
                values: [Some(1.0), None, Some(1.0), Some(1.0), Some(1.0), Some(1.0)],
            },
            PanelRow {
                country: "B".to_string(),
                country_code: String::new(),
                year: 2020,
                values: [Some(2.0), Some(1.0), Some(3.0), Some(0.0), Some(2.0), Some(2.5)],
            },
        ];
        let mut buf = Vec::new();
        write_matrix(&mut buf, &correlation_matrix(&rows)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), ",VA,PSV,GE,RQ,RL,CC");
        assert_eq!(lines.next().unwrap(), "VA,1.000,NaN,1.000,-1.000,1.000,1.000");
        assert_eq!(lines.next().unwrap(), "PSV,NaN,NaN,NaN,NaN,NaN,NaN");
    }

    #[test]
    fn dated_file_names() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(matrix_file(date), "wgi_correlation_matrix_20260307.csv");
        assert_eq!(summary_file(date), "wgi_correlation_summary_20260307.txt");
        assert_eq!(heatmap_file(date), "wgi_correlation_heatmap_20260307.png");
        assert_eq!(raw_data_file(2010, 2023), "wgi_raw_data_2010_2023.csv");
    }
}
