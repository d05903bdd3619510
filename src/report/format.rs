//! Formatted terminal / text-file output.
//!
//! Formatting lives here so the scraping, merging and statistics code stays
//! free of presentation concerns, and so output changes stay local.

use std::path::Path;

use crate::domain::{CorrelationMethod, Indicator};
use crate::io::RowError;
use crate::merge::MergeOutcome;
use crate::rating::GradeGroup;
use crate::stats::reference::DIFF_THRESHOLD;
use crate::stats::{Comparison, CorrelationMatrix, Summary};

const RULE: usize = 60;

fn banner(out: &mut String, title: &str) {
    out.push_str(&"=".repeat(RULE));
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(RULE));
    out.push('\n');
}

/// Counts from a scrape run plus any names that failed to join.
pub fn format_scrape_summary(n_spreads: usize, n_ratings: usize, outcome: &MergeOutcome, out_dir: &Path) -> String {
    let mut out = String::new();
    out.push_str("=== sov scrape ===\n");
    out.push_str(&format!("Spreads: {n_spreads} countries\n"));
    out.push_str(&format!("Ratings: {n_ratings} countries\n"));
    out.push_str(&format!(
        "Merged:  {} rows ({} matched, {} spreads only, {} ratings only)\n",
        outcome.records.len(),
        outcome.matched(),
        outcome.spreads_only.len(),
        outcome.ratings_only.len()
    ));
    if !outcome.spreads_only.is_empty() {
        out.push_str(&format!("  no rating: {}\n", outcome.spreads_only.join(", ")));
    }
    if !outcome.ratings_only.is_empty() {
        out.push_str(&format!("  no spread: {}\n", outcome.ratings_only.join(", ")));
    }
    out.push_str(&format!("Output: {}\n", out_dir.display()));
    out
}

pub fn format_grade_table(groups: &[GradeGroup]) -> String {
    let mut out = String::new();
    banner(&mut out, "SOVEREIGN RATINGS BY GRADE");
    let width = groups
        .iter()
        .map(|g| g.category.display_name().len())
        .max()
        .unwrap_or(0);
    for g in groups {
        out.push_str(&format!(
            "{:<width$}  ({:>2})  {}\n",
            g.category.display_name(),
            g.countries.len(),
            g.countries.join(", ")
        ));
    }
    out
}

/// Up to `limit` skipped rows, one per line.
pub fn format_row_errors(errors: &[RowError], limit: usize) -> String {
    let mut out = String::new();
    for e in errors.iter().take(limit) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if errors.len() > limit {
        out.push_str(&format!("  ... and {} more\n", errors.len() - limit));
    }
    out
}

/// Lower-triangular matrix, two decimals.
pub fn format_matrix(matrix: &CorrelationMatrix, method: CorrelationMethod) -> String {
    let mut out = String::new();
    out.push('\n');
    banner(&mut out, method.display_name());
    out.push_str("      ");
    for ind in Indicator::ALL {
        out.push_str(&format!("{:>7}", ind.short()));
    }
    out.push('\n');
    out.push_str(&"-".repeat(48));
    out.push('\n');
    for (i, a) in Indicator::ALL.iter().enumerate() {
        out.push_str(&format!("{:<5} ", a.short()));
        for (j, b) in Indicator::ALL.iter().enumerate() {
            if j > i {
                break;
            }
            let v = matrix.get(*a, *b);
            if v.is_finite() {
                out.push_str(&format!("{v:>7.2}"));
            } else {
                out.push_str(&format!("{:>7}", "NaN"));
            }
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "Rows: {} ({} with all six indicators)\n",
        matrix.n_rows, matrix.n_complete
    ));
    out
}

pub fn format_comparison(comparison: &Comparison) -> String {
    let mut out = String::new();
    out.push('\n');
    banner(&mut out, "COMPARISON WITH PUBLISHED POOLED CORRELATIONS");
    out.push_str(&format!(
        "{:<10} {:>10} {:>10} {:>12}\n",
        "Pair", "Published", "Computed", "Difference"
    ));
    out.push_str(&"-".repeat(45));
    out.push('\n');
    for p in &comparison.pairs {
        let pair = format!("{}-{}", p.a.short(), p.b.short());
        if p.computed.is_finite() {
            out.push_str(&format!(
                "{pair:<10} {:>10.2} {:>10.2} {:>12.3} {}\n",
                p.published,
                p.computed,
                p.difference(),
                if p.flagged() { "*" } else { "" }
            ));
        } else {
            out.push_str(&format!("{pair:<10} {:>10.2} {:>10} {:>12}\n", p.published, "NaN", "-"));
        }
    }
    out.push_str(&"-".repeat(45));
    out.push('\n');
    match (comparison.mean_abs_difference(), comparison.max_abs_difference()) {
        (Some(mean), Some(max)) => {
            out.push_str(&format!("Average absolute difference: {mean:.3}\n"));
            out.push_str(&format!("Maximum absolute difference: {max:.3}\n"));
        }
        _ => out.push_str("No comparable pairs.\n"),
    }
    out.push_str(&format!("\n* indicates difference > {DIFF_THRESHOLD:.2}\n"));
    out
}

pub fn format_summary_stats(summary: Option<&Summary>, n_rows: usize) -> String {
    let mut out = String::new();
    out.push('\n');
    banner(&mut out, "SUMMARY STATISTICS");
    out.push_str(&format!("Number of observations: {n_rows}\n"));
    match summary {
        Some(s) => {
            out.push_str(&format!("Average correlation: {:.3}\n", s.mean));
            out.push_str(&format!("Median correlation: {:.3}\n", s.median));
            out.push_str(&format!("Minimum correlation: {:.3}\n", s.min));
            out.push_str(&format!("Maximum correlation: {:.3}\n", s.max));
            out.push_str(&format!("Standard deviation: {:.3}\n", s.std));
        }
        None => out.push_str("No defined correlations.\n"),
    }
    out
}

/// Body of `wgi_correlation_summary_<date>.txt`.
pub fn format_wgi_summary_file(
    start_year: i32,
    end_year: i32,
    generated: &str,
    matrix: &CorrelationMatrix,
    summary: Option<&Summary>,
) -> String {
    let mut out = String::new();
    out.push_str("WGI Correlation Analysis Summary\n");
    out.push_str(&"=".repeat(50));
    out.push('\n');
    out.push_str(&format!("Date Range: {start_year}-{end_year}\n"));
    out.push_str(&format!("Observations: {}\n", matrix.n_rows));
    out.push_str(&format!("Generated: {generated}\n\n"));
    out.push_str("Correlation Matrix:\n");
    out.push_str(&format!("{:<5}", ""));
    for ind in Indicator::ALL {
        out.push_str(&format!("{:>8}", ind.short()));
    }
    out.push('\n');
    for a in Indicator::ALL {
        out.push_str(&format!("{:<5}", a.short()));
        for b in Indicator::ALL {
            let v = matrix.get(a, b);
            if v.is_finite() {
                out.push_str(&format!("{v:>8.3}"));
            } else {
                out.push_str(&format!("{:>8}", "NaN"));
            }
        }
        out.push('\n');
    }
    out.push_str(&format_summary_stats(summary, matrix.n_rows));
    out
}
