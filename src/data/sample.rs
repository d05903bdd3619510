//! Synthetic governance-indicator panel used when the World Bank download
//! yields nothing.
//!
//! Each country-year draws a shared "governance level" and perturbs it per
//! indicator, so the indicators come out positively correlated like the real
//! data. Values are clipped to the published WGI range.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Indicator, PanelRow};
use crate::error::AppError;

/// WGI estimates are reported on roughly `[-2.5, 2.5]`.
const WGI_MIN: f64 = -2.5;
const WGI_MAX: f64 = 2.5;

const COUNTRIES: [&str; 10] = [
    "United States",
    "United Kingdom",
    "Germany",
    "France",
    "Japan",
    "Canada",
    "Australia",
    "Brazil",
    "India",
    "China",
];

/// Noise scale per indicator, in `Indicator::ALL` order.
const NOISE: [f64; 6] = [0.3, 0.3, 0.2, 0.2, 0.2, 0.2];

pub fn generate_panel(start: i32, end: i32, seed: u64) -> Result<Vec<PanelRow>, AppError> {
    if end < start {
        return Err(AppError::input(format!("Invalid year range {start}-{end}.")));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::external(format!("Noise distribution error: {e}")))?;

    let mut rows = Vec::with_capacity(COUNTRIES.len() * (end - start + 1) as usize);
    for year in start..=end {
        for country in COUNTRIES {
            let base = normal.sample(&mut rng) * 0.5;
            let mut values = [None; 6];
            for indicator in Indicator::ALL {
                let i = indicator.index();
                let v = base + normal.sample(&mut rng) * NOISE[i];
                values[i] = Some(v.clamp(WGI_MIN, WGI_MAX));
            }
            rows.push(PanelRow {
                country: country.to_string(),
                country_code: country.chars().take(3).collect::<String>().to_uppercase(),
                year,
                values,
            });
        }
    }
    Ok(rows)
}
