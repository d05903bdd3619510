//! Broad rating grades (Prime, High Medium Grade, ...) and the
//! ratings-by-grade summary table.

use std::collections::BTreeMap;

use crate::domain::RatingRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GradeCategory {
    Prime,
    HighMedium,
    UpperMedium,
    LowerMedium,
    Speculative,
    HighlySpeculative,
    SubstantialRisk,
    ExtremelySpeculative,
    InDefault,
    NoRating,
}

impl GradeCategory {
    /// Best to worst; `NoRating` last.
    pub const ALL: [GradeCategory; 10] = [
        GradeCategory::Prime,
        GradeCategory::HighMedium,
        GradeCategory::UpperMedium,
        GradeCategory::LowerMedium,
        GradeCategory::Speculative,
        GradeCategory::HighlySpeculative,
        GradeCategory::SubstantialRisk,
        GradeCategory::ExtremelySpeculative,
        GradeCategory::InDefault,
        GradeCategory::NoRating,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            GradeCategory::Prime => "Prime",
            GradeCategory::HighMedium => "High Medium Grade",
            GradeCategory::UpperMedium => "Upper Medium Grade",
            GradeCategory::LowerMedium => "Lower Medium Grade",
            GradeCategory::Speculative => "Speculative",
            GradeCategory::HighlySpeculative => "Highly Speculative",
            GradeCategory::SubstantialRisk => "Substantial Risk",
            GradeCategory::ExtremelySpeculative => "Extremely Speculative",
            GradeCategory::InDefault => "In Default",
            GradeCategory::NoRating => "No Rating",
        }
    }

    /// Inclusive numeric range covered by the category.
    pub fn range(self) -> Option<(u8, u8)> {
        match self {
            GradeCategory::Prime => Some((1, 1)),
            GradeCategory::HighMedium => Some((2, 4)),
            GradeCategory::UpperMedium => Some((5, 7)),
            GradeCategory::LowerMedium => Some((8, 10)),
            GradeCategory::Speculative => Some((11, 13)),
            GradeCategory::HighlySpeculative => Some((14, 16)),
            GradeCategory::SubstantialRisk => Some((17, 19)),
            GradeCategory::ExtremelySpeculative => Some((20, 21)),
            GradeCategory::InDefault => Some((22, 22)),
            GradeCategory::NoRating => None,
        }
    }
}

/// Place an average numeric grade into a category.
///
/// Averages fall between notches (e.g. `4.33`), so the average is rounded to
/// the nearest notch first.
pub fn categorize(average: Option<f64>) -> GradeCategory {
    let Some(avg) = average.filter(|v| v.is_finite()) else {
        return GradeCategory::NoRating;
    };
    let notch = avg.round();
    GradeCategory::ALL
        .into_iter()
        .find(|c| {
            c.range()
                .is_some_and(|(lo, hi)| notch >= lo as f64 && notch <= hi as f64)
        })
        .unwrap_or(GradeCategory::NoRating)
}

/// One line of the ratings-by-grade table.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeGroup {
    pub category: GradeCategory,
    /// Best average first.
    pub countries: Vec<String>,
}

/// Group countries by grade category, best category first. Empty categories
/// are omitted.
pub fn ratings_by_grade(records: &[RatingRecord]) -> Vec<GradeGroup> {
    let mut groups: BTreeMap<GradeCategory, Vec<(f64, &str)>> = BTreeMap::new();
    for r in records {
        let avg = r.average();
        groups
            .entry(categorize(avg))
            .or_default()
            .push((avg.unwrap_or(f64::INFINITY), r.country.as_str()));
    }

    groups
        .into_iter()
        .map(|(category, mut members)| {
            members.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
            GradeGroup {
                category,
                countries: members.into_iter().map(|(_, c)| c.to_string()).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, grades: [Option<u8>; 3]) -> RatingRecord {
        let mut r = RatingRecord::new(country);
        r.sp.numeric = grades[0];
        r.moodys.numeric = grades[1];
        r.fitch.numeric = grades[2];
        r
    }

    #[test]
    fn categorize_rounds_to_nearest_notch() {
        assert_eq!(categorize(Some(1.0)), GradeCategory::Prime);
        assert_eq!(categorize(Some(1.33)), GradeCategory::Prime);
        assert_eq!(categorize(Some(1.67)), GradeCategory::HighMedium);
        assert_eq!(categorize(Some(10.0)), GradeCategory::LowerMedium);
        assert_eq!(categorize(Some(21.5)), GradeCategory::InDefault);
        assert_eq!(categorize(Some(22.0)), GradeCategory::InDefault);
        assert_eq!(categorize(None), GradeCategory::NoRating);
        assert_eq!(categorize(Some(f64::NAN)), GradeCategory::NoRating);
    }

    #[test]
    fn categories_cover_the_whole_scale() {
        for n in 1..=22u8 {
            assert_ne!(categorize(Some(n as f64)), GradeCategory::NoRating, "notch {n}");
        }
    }

    #[test]
    fn groups_are_ordered_best_first() {
        let records = vec![
            record("Italy", [Some(9), Some(9), Some(9)]),
            record("Germany", [Some(1), Some(1), Some(1)]),
            record("Nowhere", [None, None, None]),
            record("Spain", [Some(6), Some(7), Some(6)]),
            record("Portugal", [Some(7), Some(7), Some(7)]),
        ];
        let groups = ratings_by_grade(&records);
        let names: Vec<_> = groups.iter().map(|g| g.category).collect();
        assert_eq!(
            names,
            [
                GradeCategory::Prime,
                GradeCategory::UpperMedium,
                GradeCategory::LowerMedium,
                GradeCategory::NoRating
            ]
        );
        assert_eq!(groups[1].countries, ["Spain", "Portugal"]);
    }
}
