//! Letter grade → numeric grade lookup.
//!
//! Each agency has its own fixed table mapping every grade it issues to a
//! notch on a common 1–22 scale (1 = AAA/Aaa, 22 = default). Lookups never
//! fail: anything not in the table degrades to `None`.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Agency, AgencyRating, NUM_GRADES, Outlook};

/// S&P long-term sovereign scale.
const SP_SCALE: [(&str, u8); 22] = [
    ("AAA", 1),
    ("AA+", 2),
    ("AA", 3),
    ("AA-", 4),
    ("A+", 5),
    ("A", 6),
    ("A-", 7),
    ("BBB+", 8),
    ("BBB", 9),
    ("BBB-", 10),
    ("BB+", 11),
    ("BB", 12),
    ("BB-", 13),
    ("B+", 14),
    ("B", 15),
    ("B-", 16),
    ("CCC+", 17),
    ("CCC", 18),
    ("CCC-", 19),
    ("CC", 20),
    ("C", 21),
    ("D", 22),
];

/// Moody's scale. Moody's has no separate "D"; `C` is its default grade.
const MOODYS_SCALE: [(&str, u8); 21] = [
    ("Aaa", 1),
    ("Aa1", 2),
    ("Aa2", 3),
    ("Aa3", 4),
    ("A1", 5),
    ("A2", 6),
    ("A3", 7),
    ("Baa1", 8),
    ("Baa2", 9),
    ("Baa3", 10),
    ("Ba1", 11),
    ("Ba2", 12),
    ("Ba3", 13),
    ("B1", 14),
    ("B2", 15),
    ("B3", 16),
    ("Caa1", 17),
    ("Caa2", 18),
    ("Caa3", 19),
    ("Ca", 20),
    ("C", 22),
];

/// Fitch uses the same symbols as S&P.
const FITCH_SCALE: [(&str, u8); 22] = SP_SCALE;

/// Grades the site prints when an agency does not rate a country.
static RATING_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]{1,3}[+-]?[123]?").expect("rating token pattern is valid"));

const UNRATED: [&str; 4] = ["N/A", "-", "NR", ""];

/// The lookup table for `agency`.
pub fn scale(agency: Agency) -> &'static [(&'static str, u8)] {
    match agency {
        Agency::SP => &SP_SCALE,
        Agency::Moodys => &MOODYS_SCALE,
        Agency::Fitch => &FITCH_SCALE,
    }
}

/// Map a base letter grade to its numeric grade.
///
/// Matching is exact (case-sensitive): `"Baa2"` is a Moody's grade, `"BAA2"`
/// is not on any scale.
pub fn normalize(agency: Agency, grade: &str) -> Option<u8> {
    let grade = grade.trim();
    scale(agency)
        .iter()
        .find(|(letter, _)| *letter == grade)
        .map(|&(_, n)| n)
}

/// S&P-style label for a numeric grade (used on chart axes).
pub fn grade_label(numeric: u8) -> &'static str {
    SP_SCALE
        .iter()
        .find(|&&(_, n)| n == numeric)
        .map(|&(letter, _)| letter)
        .unwrap_or("")
}

/// Strip outlook markers and pick the rating token out of a raw cell.
///
/// - unrated markers (`N/A`, `-`, `NR`, empty) give `None`
/// - selective default (`SD`, `RD`) is reported as `D`
/// - otherwise the first token of up to three letters, an optional `+`/`-`
///   and an optional `1`/`2`/`3` notch digit is returned
pub fn extract_base_grade(raw: &str) -> Option<String> {
    let cleaned = strip_outlook_marker(raw);
    if UNRATED.contains(&cleaned) {
        return None;
    }
    if cleaned == "SD" || cleaned == "RD" {
        return Some("D".to_string());
    }

    RATING_TOKEN.find(cleaned).map(|m| m.as_str().to_string())
}

/// Outlook marker appended to a raw cell by the table parser, if any.
pub fn outlook_of(raw: &str) -> Outlook {
    if raw.contains("[upgrade]") {
        Outlook::Upgrade
    } else if raw.contains("[downgrade]") {
        Outlook::Downgrade
    } else {
        Outlook::Stable
    }
}

/// Parse one agency cell (`"BBB+"`, `"Baa2 [downgrade]"`, `"N/A"`, ...).
pub fn parse_agency_cell(agency: Agency, raw: &str) -> AgencyRating {
    let letter = extract_base_grade(raw);
    let numeric = letter.as_deref().and_then(|l| normalize(agency, l));
    AgencyRating {
        letter,
        numeric,
        outlook: outlook_of(raw),
    }
}

/// `true` if `numeric` is a valid grade on the 1–22 scale.
pub fn in_range(numeric: u8) -> bool {
    (1..=NUM_GRADES).contains(&numeric)
}

fn strip_outlook_marker(raw: &str) -> &str {
    let raw = raw.trim();
    let cut = raw.find('[').unwrap_or(raw.len());
    raw[..cut].trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_entry_is_in_range() {
        for agency in Agency::ALL {
            for (letter, _) in scale(agency) {
                let n = normalize(agency, letter).unwrap();
                assert!(in_range(n), "{letter} -> {n}");
            }
        }
    }

    #[test]
    fn sp_endpoints_and_unknowns() {
        assert_eq!(normalize(Agency::SP, "AAA"), Some(1));
        assert_eq!(normalize(Agency::SP, "D"), Some(22));
        assert_eq!(normalize(Agency::SP, "XYZ"), None);
        assert_eq!(normalize(Agency::SP, ""), None);
        assert_eq!(normalize(Agency::SP, "Baa2"), None);
    }

    #[test]
    fn moodys_scale_lines_up_with_sp() {
        assert_eq!(normalize(Agency::Moodys, "Aaa"), normalize(Agency::SP, "AAA"));
        assert_eq!(normalize(Agency::Moodys, "Baa3"), normalize(Agency::SP, "BBB-"));
        assert_eq!(normalize(Agency::Moodys, "Caa3"), normalize(Agency::SP, "CCC-"));
        assert_eq!(normalize(Agency::Moodys, "C"), Some(22));
        assert_eq!(normalize(Agency::Fitch, "A-"), Some(7));
    }

    #[test]
    fn grade_labels_cover_the_scale() {
        assert_eq!(grade_label(1), "AAA");
        assert_eq!(grade_label(10), "BBB-");
        assert_eq!(grade_label(22), "D");
        assert_eq!(grade_label(0), "");
        assert_eq!(grade_label(23), "");
    }

    #[test]
    fn base_grade_extraction() {
        assert_eq!(extract_base_grade("AA+"), Some("AA+".to_string()));
        assert_eq!(extract_base_grade("  Baa2    [downgrade]"), Some("Baa2".to_string()));
        assert_eq!(extract_base_grade("BBB- [upgrade]"), Some("BBB-".to_string()));
        assert_eq!(extract_base_grade("Caa1"), Some("Caa1".to_string()));
        assert_eq!(extract_base_grade("SD"), Some("D".to_string()));
        assert_eq!(extract_base_grade("RD"), Some("D".to_string()));
        assert_eq!(extract_base_grade("N/A"), None);
        assert_eq!(extract_base_grade("-"), None);
        assert_eq!(extract_base_grade("NR"), None);
        assert_eq!(extract_base_grade(""), None);
    }

    #[test]
    fn base_grade_takes_first_rating_token() {
        assert_eq!(extract_base_grade("* AA- *"), Some("AA-".to_string()));
        assert_eq!(extract_base_grade("Ba12"), Some("Ba1".to_string()));
        assert_eq!(extract_base_grade("CCC+u"), Some("CCC+".to_string()));
        assert_eq!(extract_base_grade("123"), None);
    }

    #[test]
    fn agency_cell_carries_outlook() {
        let r = parse_agency_cell(Agency::Moodys, "A1    [upgrade]");
        assert_eq!(r.letter.as_deref(), Some("A1"));
        assert_eq!(r.numeric, Some(5));
        assert_eq!(r.outlook, Outlook::Upgrade);

        let r = parse_agency_cell(Agency::SP, "weird");
        assert_eq!(r.letter.as_deref(), Some("wei"));
        assert_eq!(r.numeric, None);
        assert_eq!(r.outlook, Outlook::Stable);
    }
}
