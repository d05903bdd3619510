//! Published pooled correlations (Table 6 of the governance-indicator
//! methodology paper) and a side-by-side comparison against them.

use crate::domain::Indicator;
use crate::domain::Indicator::*;
use crate::stats::CorrelationMatrix;

/// Differences above this are flagged with `*`.
pub const DIFF_THRESHOLD: f64 = 0.05;

pub const PUBLISHED: [(Indicator, Indicator, f64); 15] = [
    (VoiceAccountability, PoliticalStability, 0.51),
    (VoiceAccountability, GovernmentEffectiveness, 0.46),
    (VoiceAccountability, RegulatoryQuality, 0.66),
    (VoiceAccountability, RuleOfLaw, 0.63),
    (VoiceAccountability, ControlOfCorruption, 0.52),
    (PoliticalStability, GovernmentEffectiveness, 0.81),
    (PoliticalStability, RegulatoryQuality, 0.80),
    (PoliticalStability, RuleOfLaw, 0.82),
    (PoliticalStability, ControlOfCorruption, 0.79),
    (GovernmentEffectiveness, RegulatoryQuality, 0.87),
    (GovernmentEffectiveness, RuleOfLaw, 0.89),
    (GovernmentEffectiveness, ControlOfCorruption, 0.86),
    (RegulatoryQuality, RuleOfLaw, 0.87),
    (RegulatoryQuality, ControlOfCorruption, 0.87),
    (RuleOfLaw, ControlOfCorruption, 0.88),
];

#[derive(Debug, Clone, PartialEq)]
pub struct PairComparison {
    pub a: Indicator,
    pub b: Indicator,
    pub published: f64,
    /// `NaN` when the pair is undefined in the computed matrix.
    pub computed: f64,
}

impl PairComparison {
    pub fn difference(&self) -> f64 {
        self.computed - self.published
    }

    pub fn flagged(&self) -> bool {
        self.difference().abs() > DIFF_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub pairs: Vec<PairComparison>,
}

impl Comparison {
    fn abs_diffs(&self) -> impl Iterator<Item = f64> + '_ {
        self.pairs
            .iter()
            .map(|p| p.difference().abs())
            .filter(|d| d.is_finite())
    }

    pub fn mean_abs_difference(&self) -> Option<f64> {
        let diffs: Vec<f64> = self.abs_diffs().collect();
        (!diffs.is_empty()).then(|| diffs.iter().sum::<f64>() / diffs.len() as f64)
    }

    pub fn max_abs_difference(&self) -> Option<f64> {
        self.abs_diffs().reduce(f64::max)
    }
}

pub fn compare(matrix: &CorrelationMatrix) -> Comparison {
    Comparison {
        pairs: PUBLISHED
            .iter()
            .map(|&(a, b, published)| PairComparison {
                a,
                b,
                published,
                computed: matrix.get(a, b),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_with(value: f64) -> CorrelationMatrix {
        let mut cells = [[value; 6]; 6];
        for (i, row) in cells.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        CorrelationMatrix {
            cells,
            n_rows: 0,
            n_complete: 0,
        }
    }

    #[test]
    fn published_pairs_are_the_upper_triangle() {
        for (a, b, r) in PUBLISHED {
            assert!(a.index() < b.index());
            assert!((0.0..=1.0).contains(&r));
        }
    }

    #[test]
    fn differences_are_flagged_above_threshold() {
        let c = compare(&matrix_with(0.85));
        let va_psv = &c.pairs[0];
        assert!((va_psv.difference() - 0.34).abs() < 1e-12);
        assert!(va_psv.flagged());
        // GE-CC: 0.86 vs 0.85.
        assert!(!c.pairs[11].flagged());
        assert!((c.max_abs_difference().unwrap() - 0.39).abs() < 1e-12);
    }

    #[test]
    fn undefined_pairs_are_left_out_of_the_averages() {
        let c = compare(&matrix_with(f64::NAN));
        assert!(!c.pairs[0].flagged());
        assert_eq!(c.mean_abs_difference(), None);
        assert_eq!(c.max_abs_difference(), None);
    }
}
