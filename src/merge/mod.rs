//! Spreads + ratings merge.
//!
//! Both tables are keyed by country name, but the two pages spell some
//! countries differently. Names are cleaned (parenthetical notes removed),
//! then passed through a static alias table before joining.
//!
//! The join is a full outer join: a country present on one page only is kept
//! with the other page's columns missing, and is listed in the outcome so the
//! naming gap shows up in the log.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{BondSpreadRecord, MergedRecord, RatingRecord};

/// Alias → canonical name, applied after `clean_country_name`.
pub const COUNTRY_ALIASES: [(&str, &str); 5] = [
    // The spreads page uses "UK" for Ukraine, not the United Kingdom.
    ("UK", "Ukraine"),
    ("USA", "United States"),
    ("Korea, South", "South Korea"),
    ("Czechia", "Czech Republic"),
    ("Bosnia", "Bosnia and Herzegovina"),
];

/// Result of a merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub records: Vec<MergedRecord>,
    /// Countries with a spread but no rating row.
    pub spreads_only: Vec<String>,
    /// Countries with a rating row but no spread.
    pub ratings_only: Vec<String>,
}

impl MergeOutcome {
    pub fn matched(&self) -> usize {
        self.records.len() - self.spreads_only.len() - self.ratings_only.len()
    }
}

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)\s*").expect("parenthetical pattern is valid"));

/// Remove parenthetical notes (`"Ukraine (*)"` → `"Ukraine"`) and trim.
///
/// Only closed groups are removed; an unclosed `(` leaves the name as is.
pub fn clean_country_name(name: &str) -> String {
    PARENTHETICAL.replace_all(name, " ").trim().to_string()
}

/// Cleaned and alias-reconciled merge key.
pub fn merge_key(name: &str) -> String {
    let cleaned = clean_country_name(name);
    COUNTRY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == cleaned)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(cleaned)
}

/// Outer-join spreads and ratings on the reconciled country name.
///
/// Output order is deterministic: best average rating first, unrated rows
/// last, ties broken by country name. Duplicate keys within one input keep
/// the first occurrence.
pub fn merge(spreads: &[BondSpreadRecord], ratings: &[RatingRecord]) -> MergeOutcome {
    let mut by_key: BTreeMap<String, MergedRecord> = BTreeMap::new();

    for s in spreads {
        let key = merge_key(&s.country);
        by_key.entry(key.clone()).or_insert_with(|| MergedRecord {
            country: key,
            yield_10y: s.yield_10y,
            spread_bp: Some(s.spread_bp),
            rating: None,
        });
    }

    for r in ratings {
        let key = merge_key(&r.country);
        let entry = by_key.entry(key.clone()).or_insert_with(|| MergedRecord {
            country: key.clone(),
            yield_10y: None,
            spread_bp: None,
            rating: None,
        });
        if entry.rating.is_none() {
            let mut rating = r.clone();
            rating.country = key;
            entry.rating = Some(rating);
        }
    }

    let mut records: Vec<MergedRecord> = by_key.into_values().collect();
    records.sort_by(compare_merged);

    let spreads_only = records
        .iter()
        .filter(|r| r.rating.is_none())
        .map(|r| r.country.clone())
        .collect();
    let ratings_only = records
        .iter()
        .filter(|r| r.spread_bp.is_none())
        .map(|r| r.country.clone())
        .collect();

    MergeOutcome {
        records,
        spreads_only,
        ratings_only,
    }
}

fn compare_merged(a: &MergedRecord, b: &MergedRecord) -> Ordering {
    match (a.average(), b.average()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.country.cmp(&b.country))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spread(country: &str, bp: f64) -> BondSpreadRecord {
        BondSpreadRecord {
            country: country.to_string(),
            yield_10y: None,
            spread_bp: bp,
        }
    }

    fn rating(country: &str, sp: u8) -> RatingRecord {
        let mut r = RatingRecord::new(country);
        r.sp.numeric = Some(sp);
        r
    }

    #[test]
    fn clean_removes_parentheticals() {
        assert_eq!(clean_country_name("Ukraine (*)"), "Ukraine");
        assert_eq!(clean_country_name("  Hong Kong  (SAR) "), "Hong Kong");
        assert_eq!(clean_country_name("Germany"), "Germany");
    }

    #[test]
    fn clean_keeps_unclosed_parenthesis() {
        assert_eq!(clean_country_name("Congo (Dem. Rep"), "Congo (Dem. Rep");
        assert_eq!(merge_key("Congo (Dem. Rep"), "Congo (Dem. Rep");
        assert_eq!(clean_country_name("Korea (South) Rep."), "Korea Rep.");
    }

    #[test]
    fn aliases_reconcile_names() {
        assert_eq!(merge_key("UK"), "Ukraine");
        assert_eq!(merge_key("USA (*)"), "United States");
        assert_eq!(merge_key("United Kingdom"), "United Kingdom");
    }

    #[test]
    fn usa_and_united_states_merge_into_one_row() {
        let out = merge(&[spread("USA", 0.0)], &[rating("United States", 2)]);
        assert_eq!(out.records.len(), 1);
        let row = &out.records[0];
        assert_eq!(row.country, "United States");
        assert_eq!(row.spread_bp, Some(0.0));
        assert_eq!(row.numeric(crate::domain::Agency::SP), Some(2));
        assert_eq!(out.matched(), 1);
    }

    #[test]
    fn outer_join_keeps_unmatched_rows() {
        let out = merge(
            &[spread("Germany", -160.0), spread("Atlantis", 50.0)],
            &[rating("Germany", 1), rating("Narnia", 12)],
        );
        let names: Vec<_> = out.records.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, ["Germany", "Narnia", "Atlantis"]);
        assert_eq!(out.spreads_only, ["Atlantis"]);
        assert_eq!(out.ratings_only, ["Narnia"]);
        assert_eq!(out.matched(), 1);
        assert_eq!(out.records[1].spread_bp, None);
        assert!(out.records[2].rating.is_none());
    }

    #[test]
    fn merge_is_deterministic() {
        let spreads = [spread("Italy", 120.0), spread("France", 70.0), spread("USA", 0.0)];
        let ratings = [rating("France", 3), rating("Italy", 8), rating("United States", 2)];
        assert_eq!(merge(&spreads, &ratings), merge(&spreads, &ratings));

        let reversed: Vec<_> = spreads.iter().rev().cloned().collect();
        assert_eq!(merge(&spreads, &ratings).records, merge(&reversed, &ratings).records);
    }
}
