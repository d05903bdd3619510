//! Pairwise-complete Pearson correlation over the six governance indicators.
//!
//! Each cell of the matrix uses only the rows where *both* indicators are
//! present. A pair with fewer than two joint observations (or zero variance
//! on either side) is undefined and stored as `NaN`.

use std::collections::BTreeMap;

use crate::domain::{CorrelationMethod, Indicator, PanelRow};

/// Yearly-average mode only uses years with more than this many complete rows.
pub const MIN_ROWS_PER_YEAR: usize = 10;

const K: usize = Indicator::ALL.len();

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    /// Row/column order is `Indicator::ALL`.
    pub cells: [[f64; K]; K],
    /// Rows the matrix was computed from.
    pub n_rows: usize,
    /// Rows with all six indicators present.
    pub n_complete: usize,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Indicator, b: Indicator) -> f64 {
        self.cells[a.index()][b.index()]
    }

    /// Finite values strictly above the diagonal, row-major.
    pub fn upper_triangle(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(K * (K - 1) / 2);
        for i in 0..K {
            for j in (i + 1)..K {
                if self.cells[i][j].is_finite() {
                    out.push(self.cells[i][j]);
                }
            }
        }
        out
    }
}

/// Pearson correlation over the positions where both series are present.
///
/// Returns `None` with fewer than two joint observations or when either
/// series is constant over them.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    // Rounding can push |r| a hair past 1.
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// 6×6 pairwise-complete correlation matrix of `rows`.
///
/// The diagonal is exactly 1.0 for every indicator with at least two
/// non-missing values, `NaN` otherwise.
pub fn correlation_matrix(rows: &[PanelRow]) -> CorrelationMatrix {
    let columns: Vec<Vec<Option<f64>>> = (0..K)
        .map(|i| rows.iter().map(|r| r.values[i].filter(|v| v.is_finite())).collect())
        .collect();

    let mut cells = [[f64::NAN; K]; K];
    for i in 0..K {
        let present = columns[i].iter().flatten().count();
        cells[i][i] = if present >= 2 { 1.0 } else { f64::NAN };
        for j in (i + 1)..K {
            let r = pearson(&columns[i], &columns[j]).unwrap_or(f64::NAN);
            cells[i][j] = r;
            cells[j][i] = r;
        }
    }

    CorrelationMatrix {
        cells,
        n_rows: rows.len(),
        n_complete: rows.iter().filter(|r| r.values.iter().all(Option::is_some)).count(),
    }
}

/// Matrix for one aggregation method. `All` is treated as `Pooled`; the caller
/// runs each method separately when it wants all three.
pub fn correlate(rows: &[PanelRow], method: CorrelationMethod) -> CorrelationMatrix {
    match method {
        CorrelationMethod::Pooled | CorrelationMethod::All => correlation_matrix(rows),
        CorrelationMethod::YearlyAvg => yearly_average(rows).unwrap_or_else(|| correlation_matrix(rows)),
        CorrelationMethod::Latest => {
            let latest: Vec<PanelRow> = match latest_year(rows) {
                Some(year) => rows.iter().filter(|r| r.year == year).cloned().collect(),
                None => Vec::new(),
            };
            correlation_matrix(&latest)
        }
    }
}

pub fn latest_year(rows: &[PanelRow]) -> Option<i32> {
    rows.iter().map(|r| r.year).max()
}

/// Cell-wise mean of the per-year matrices (undefined cells skipped).
///
/// Each year is restricted to rows with all six indicators present.
fn yearly_average(rows: &[PanelRow]) -> Option<CorrelationMatrix> {
    let mut by_year: BTreeMap<i32, Vec<PanelRow>> = BTreeMap::new();
    for r in rows.iter().filter(|r| r.values.iter().all(Option::is_some)) {
        by_year.entry(r.year).or_default().push(r.clone());
    }

    let yearly: Vec<CorrelationMatrix> = by_year
        .values()
        .filter(|year_rows| year_rows.len() > MIN_ROWS_PER_YEAR)
        .map(|year_rows| correlation_matrix(year_rows))
        .collect();
    if yearly.is_empty() {
        return None;
    }

    let mut cells = [[f64::NAN; K]; K];
    for i in 0..K {
        for j in 0..K {
            let vals: Vec<f64> = yearly.iter().map(|m| m.cells[i][j]).filter(|v| v.is_finite()).collect();
            if !vals.is_empty() {
                cells[i][j] = vals.iter().sum::<f64>() / vals.len() as f64;
            }
        }
    }

    Some(CorrelationMatrix {
        cells,
        n_rows: yearly.iter().map(|m| m.n_rows).sum(),
        n_complete: yearly.iter().map(|m| m.n_complete).sum(),
    })
}
