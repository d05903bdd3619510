//! World Bank API integration for the Worldwide Governance Indicators.

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use log::{info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::http;
use crate::domain::{Indicator, PanelRow};
use crate::error::AppError;

const PER_PAGE: usize = 20000;

/// Pause between indicator requests.
const REQUEST_GAP: Duration = Duration::from_millis(500);

/// One (country, year, indicator) value.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub country: String,
    pub country_code: String,
    pub year: i32,
    pub indicator: Indicator,
    pub value: f64,
}

pub struct WorldBankClient {
    client: Client,
    api_base: String,
}

impl WorldBankClient {
    pub fn new(api_base: impl Into<String>) -> Result<Self, AppError> {
        Ok(Self {
            client: http::build_client()?,
            api_base: api_base.into(),
        })
    }

    /// Download all six indicators for `start..=end` and pivot them into one
    /// row per country-year.
    ///
    /// A failing indicator is logged and skipped; the result may therefore be
    /// empty, in which case the caller decides on a fallback.
    pub fn fetch_panel(&self, start: i32, end: i32) -> Vec<PanelRow> {
        let mut observations = Vec::new();
        for (i, indicator) in Indicator::ALL.into_iter().enumerate() {
            if i > 0 {
                thread::sleep(REQUEST_GAP);
            }
            match self.fetch_indicator(indicator, start, end) {
                Ok(obs) => {
                    info!("Downloaded {} ({} records)", indicator.display_name(), obs.len());
                    observations.extend(obs);
                }
                Err(e) => warn!("Skipping {}: {e}", indicator.display_name()),
            }
        }
        pivot(observations)
    }

    fn fetch_indicator(&self, indicator: Indicator, start: i32, end: i32) -> Result<Vec<Observation>, AppError> {
        let url = format!(
            "{}/country/all/indicator/{}?format=json&per_page={PER_PAGE}&date={start}:{end}",
            self.api_base.trim_end_matches('/'),
            indicator.api_code(),
        );
        let body = http::get_text(&self.client, &url)?;
        parse_indicator_response(&body, indicator)
    }
}

#[derive(Debug, Deserialize)]
struct Record {
    country: Option<NamedRef>,
    #[serde(rename = "countryiso3code", default)]
    country_iso3: String,
    date: String,
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    value: String,
}

/// Parse one API response body.
///
/// The API answers `[paging, records]` on success and `[{"message": ...}]` on
/// error. Records with a null value are dropped.
pub fn parse_indicator_response(body: &str, indicator: Indicator) -> Result<Vec<Observation>, AppError> {
    let parts: Vec<serde_json::Value> = serde_json::from_str(body)
        .map_err(|e| AppError::external(format!("Invalid World Bank response: {e}")))?;

    let Some(records) = parts.get(1).filter(|v| v.is_array()) else {
        let detail = parts
            .first()
            .and_then(|meta| meta.get("message"))
            .map(|m| m.to_string())
            .unwrap_or_else(|| "no data".to_string());
        return Err(AppError::external(format!(
            "World Bank returned no records for {}: {detail}",
            indicator.api_code()
        )));
    };

    let records: Vec<Record> = serde_json::from_value(records.clone())
        .map_err(|e| AppError::external(format!("Invalid World Bank record list: {e}")))?;

    let mut out = Vec::with_capacity(records.len());
    for r in records {
        let Some(value) = r.value.filter(|v| v.is_finite()) else {
            continue;
        };
        let Ok(year) = r.date.trim().parse::<i32>() else {
            continue;
        };
        out.push(Observation {
            country: r.country.map(|c| c.value).unwrap_or_default(),
            country_code: r.country_iso3,
            year,
            indicator,
            value,
        });
    }
    Ok(out)
}

/// Long → wide: one `PanelRow` per (country, code, year), sorted by those keys.
pub fn pivot(observations: Vec<Observation>) -> Vec<PanelRow> {
    let mut wide: BTreeMap<(String, String, i32), [Option<f64>; 6]> = BTreeMap::new();
    for obs in observations {
        let slot = &mut wide
            .entry((obs.country, obs.country_code, obs.year))
            .or_insert([None; 6])[obs.indicator.index()];
        // First value wins when the API repeats a record.
        if slot.is_none() {
            *slot = Some(obs.value);
        }
    }
    wide.into_iter()
        .map(|((country, country_code, year), values)| PanelRow {
            country,
            country_code,
            year,
            values,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"[
        {"page":1,"pages":1,"per_page":20000,"total":3},
        [
          {"indicator":{"id":"GE.EST","value":"Government Effectiveness"},
           "country":{"id":"DE","value":"Germany"},"countryiso3code":"DEU",
           "date":"2022","value":1.31,"unit":"","obs_status":"","decimal":0},
          {"indicator":{"id":"GE.EST","value":"Government Effectiveness"},
           "country":{"id":"DE","value":"Germany"},"countryiso3code":"DEU",
           "date":"2021","value":null,"unit":"","obs_status":"","decimal":0},
          {"indicator":{"id":"GE.EST","value":"Government Effectiveness"},
           "country":{"id":"FR","value":"France"},"countryiso3code":"FRA",
           "date":"2022","value":1.2,"unit":"","obs_status":"","decimal":0}
        ]
    ]"#;

    #[test]
    fn parses_records_and_drops_nulls() {
        let obs = parse_indicator_response(BODY, Indicator::GovernmentEffectiveness).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].country, "Germany");
        assert_eq!(obs[0].country_code, "DEU");
        assert_eq!(obs[0].year, 2022);
        assert!((obs[1].value - 1.2).abs() < 1e-12);
    }

    #[test]
    fn error_payload_is_reported() {
        let body = r#"[{"message":[{"id":"120","key":"Invalid value","value":"The provided parameter value is not valid"}]}]"#;
        let err = parse_indicator_response(body, Indicator::RuleOfLaw).unwrap_err();
        assert!(err.message().contains("RL.EST"));
    }

    #[test]
    fn pivot_builds_one_row_per_country_year() {
        let obs = |country: &str, year, indicator, value| Observation {
            country: country.to_string(),
            country_code: country[..3].to_uppercase(),
            year,
            indicator,
            value,
        };
        let rows = pivot(vec![
            obs("France", 2022, Indicator::RuleOfLaw, 1.4),
            obs("France", 2022, Indicator::VoiceAccountability, 1.1),
            obs("Austria", 2022, Indicator::RuleOfLaw, 1.8),
            obs("France", 2022, Indicator::RuleOfLaw, 9.9),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].country, "Austria");
        assert_eq!(rows[1].values[Indicator::RuleOfLaw.index()], Some(1.4));
        assert_eq!(rows[1].values[Indicator::VoiceAccountability.index()], Some(1.1));
        assert_eq!(rows[1].values[Indicator::ControlOfCorruption.index()], None);
    }
}
