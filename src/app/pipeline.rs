//! The per-command workflows, without any terminal output.
//!
//! - scrape: fetch pages -> largest tables -> spreads / ratings -> merge -> CSVs
//! - plot: merged CSV -> flag icons -> two scatter PNGs
//! - grades: ratings CSV -> grade groups -> CSV
//! - wgi: panel (download, CSV or synthetic) -> correlation matrices -> outputs
//!
//! `app` calls these and does the printing.

use std::path::{Path, PathBuf};

use chrono::Local;
use log::{info, warn};

use crate::data::{PageFetcher, WorldBankClient, generate_panel};
use crate::domain::{
    BondSpreadRecord, CorrelationMethod, GradesConfig, PanelRow, PlotConfig, RatingRecord, ScrapeConfig, WgiConfig,
};
use crate::error::AppError;
use crate::io::{self, Loaded, RowError};
use crate::merge::{MergeOutcome, merge};
use crate::plot::{FlagCache, View, country_code, prepare, render_heatmap, render_scatter};
use crate::rating::{GradeGroup, ratings_by_grade};
use crate::scrape::{parse_largest_table, parse_ratings, parse_spreads};
use crate::stats::{Comparison, CorrelationMatrix, Summary, compare, correlate, summarize};

/// Everything a scrape run produced.
#[derive(Debug, Clone)]
pub struct ScrapeOutput {
    pub spreads: Vec<BondSpreadRecord>,
    pub ratings: Vec<RatingRecord>,
    pub merged: MergeOutcome,
}

/// Parse both pages and merge them.
pub fn parse_pages(spreads_html: &str, ratings_html: &str) -> Result<ScrapeOutput, AppError> {
    let spreads_table = parse_largest_table(spreads_html)?
        .ok_or_else(|| AppError::external("No table found on the spreads page."))?;
    let spreads = parse_spreads(&spreads_table);
    if spreads.is_empty() {
        return Err(AppError::no_data("The spreads table has no rows with a numeric spread."));
    }

    let ratings_table = parse_largest_table(ratings_html)?
        .ok_or_else(|| AppError::external("No table found on the ratings page."))?;
    let ratings = parse_ratings(&ratings_table)?;
    if ratings.is_empty() {
        return Err(AppError::no_data("The ratings table has no country rows."));
    }

    let merged = merge(&spreads, &ratings);
    Ok(ScrapeOutput {
        spreads,
        ratings,
        merged,
    })
}

pub fn run_scrape(cfg: &ScrapeConfig) -> Result<ScrapeOutput, AppError> {
    let fetcher = PageFetcher::new()?;
    let spreads_html = fetcher.fetch(&cfg.spreads_url)?;
    let ratings_html = fetcher.fetch(&cfg.ratings_url)?;

    let out = parse_pages(&spreads_html, &ratings_html)?;
    info!(
        "Parsed {} spreads and {} ratings; {} merged rows",
        out.spreads.len(),
        out.ratings.len(),
        out.merged.records.len()
    );
    for country in &out.merged.spreads_only {
        warn!("No rating row matches spreads country '{country}'");
    }
    for country in &out.merged.ratings_only {
        info!("No spread for rated country '{country}'");
    }

    io::save_spreads(&cfg.out_dir.join(io::SPREADS_FILE), &out.spreads)?;
    io::save_ratings(&cfg.out_dir.join(io::RATINGS_FILE), &out.ratings)?;
    io::save_merged(&cfg.out_dir.join(io::MERGED_FILE), &out.merged.records)?;
    info!("Wrote {}, {} and {}", io::SPREADS_FILE, io::RATINGS_FILE, io::MERGED_FILE);
    Ok(out)
}

fn log_row_errors<T>(loaded: &Loaded<T>, source: &Path) {
    if !loaded.row_errors.is_empty() {
        warn!("Skipped {} malformed rows in {}", loaded.row_errors.len(), source.display());
    }
}

/// Charts written by `run_plot` plus the CSV rows it could not read.
#[derive(Debug, Clone)]
pub struct PlotOutput {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<RowError>,
}

/// Render both charts.
pub fn run_plot(cfg: &PlotConfig) -> Result<PlotOutput, AppError> {
    let loaded = io::load_merged(&cfg.input)?;
    log_row_errors(&loaded, &cfg.input);
    if loaded.rows.is_empty() {
        return Err(AppError::no_data(format!("No rows in {}.", cfg.input.display())));
    }

    let mut flags = FlagCache::new(&cfg.flags_dir, &cfg.flag_cdn, cfg.download_flags, cfg.flag_height)?;
    let codes: Vec<String> = loaded
        .rows
        .iter()
        .filter(|r| r.spread_bp.is_some() && r.best().is_some())
        .map(|r| country_code(&r.country))
        .collect();
    flags.prefetch(codes.iter().map(String::as_str));

    let mut written = Vec::new();
    for view in [View::Full, View::InvestmentGrade] {
        let data = prepare(&loaded.rows, view, cfg)?;
        if view == View::InvestmentGrade && data.raw.is_empty() {
            warn!("No investment-grade countries with a spread; skipping {}", view.file_name());
            continue;
        }
        let path = cfg.out_dir.join(view.file_name());
        render_scatter(&path, &data, &mut flags)?;
        written.push(path);
    }
    Ok(PlotOutput {
        written,
        skipped: loaded.row_errors,
    })
}

#[derive(Debug, Clone)]
pub struct GradesOutput {
    pub groups: Vec<GradeGroup>,
    pub skipped: Vec<RowError>,
}

pub fn run_grades(cfg: &GradesConfig) -> Result<GradesOutput, AppError> {
    let loaded = io::load_ratings(&cfg.input)?;
    log_row_errors(&loaded, &cfg.input);
    if loaded.rows.is_empty() {
        return Err(AppError::no_data(format!("No rows in {}.", cfg.input.display())));
    }
    let groups = ratings_by_grade(&loaded.rows);
    io::save_grades(&cfg.out_dir.join(io::GRADES_FILE), &groups)?;
    Ok(GradesOutput {
        groups,
        skipped: loaded.row_errors,
    })
}

/// Where the governance panel came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelSource {
    File,
    WorldBank,
    Synthetic,
}

#[derive(Debug, Clone)]
pub struct WgiOutput {
    pub source: PanelSource,
    pub n_rows: usize,
    pub n_countries: usize,
    pub years: Option<(i32, i32)>,
    /// One matrix per requested method, in display order.
    pub matrices: Vec<(CorrelationMethod, CorrelationMatrix)>,
    /// The matrix that is compared, summarized and saved.
    pub primary: CorrelationMatrix,
    pub comparison: Comparison,
    pub summary: Option<Summary>,
    pub written: Vec<PathBuf>,
}

/// Methods to compute for a requested method (`All` expands to three).
pub fn methods_for(method: CorrelationMethod) -> Vec<CorrelationMethod> {
    match method {
        CorrelationMethod::All => vec![
            CorrelationMethod::Pooled,
            CorrelationMethod::YearlyAvg,
            CorrelationMethod::Latest,
        ],
        m => vec![m],
    }
}

pub fn load_panel(cfg: &WgiConfig) -> Result<(Vec<PanelRow>, PanelSource), AppError> {
    if cfg.end_year < cfg.start_year {
        return Err(AppError::input(format!(
            "Invalid year range {}-{}.",
            cfg.start_year, cfg.end_year
        )));
    }

    if let Some(path) = &cfg.input {
        let loaded = io::load_panel(path)?;
        log_row_errors(&loaded, path);
        let rows: Vec<PanelRow> = loaded
            .rows
            .into_iter()
            .filter(|r| (cfg.start_year..=cfg.end_year).contains(&r.year))
            .collect();
        if rows.is_empty() {
            return Err(AppError::no_data(format!(
                "No rows for {}-{} in {}.",
                cfg.start_year,
                cfg.end_year,
                path.display()
            )));
        }
        return Ok((rows, PanelSource::File));
    }

    info!("Downloading WGI data for {}-{}", cfg.start_year, cfg.end_year);
    let rows = WorldBankClient::new(&cfg.api_base)?.fetch_panel(cfg.start_year, cfg.end_year);
    if rows.is_empty() {
        warn!("No WGI data downloaded; using a synthetic sample panel");
        return Ok((generate_panel(cfg.start_year, cfg.end_year, cfg.seed)?, PanelSource::Synthetic));
    }
    Ok((rows, PanelSource::WorldBank))
}

/// Correlate `rows` with the requested method(s); no file output.
pub fn analyze(
    rows: &[PanelRow],
    method: CorrelationMethod,
) -> (Vec<(CorrelationMethod, CorrelationMatrix)>, CorrelationMatrix) {
    let matrices: Vec<(CorrelationMethod, CorrelationMatrix)> =
        methods_for(method).into_iter().map(|m| (m, correlate(rows, m))).collect();
    let primary = matrices
        .first()
        .map(|(_, m)| m.clone())
        .unwrap_or_else(|| correlate(rows, CorrelationMethod::Pooled));
    (matrices, primary)
}

pub fn run_wgi(cfg: &WgiConfig) -> Result<WgiOutput, AppError> {
    let (rows, source) = load_panel(cfg)?;

    let mut countries: Vec<&str> = rows.iter().map(|r| r.country.as_str()).collect();
    countries.sort_unstable();
    countries.dedup();
    let years = rows
        .iter()
        .map(|r| r.year)
        .fold(None, |acc: Option<(i32, i32)>, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        });
    info!("Panel: {} rows, {} countries", rows.len(), countries.len());

    let mut written = Vec::new();
    if cfg.save_raw && source != PanelSource::File {
        let path = cfg.out_dir.join(io::raw_data_file(cfg.start_year, cfg.end_year));
        io::save_panel(&path, &rows)?;
        written.push(path);
    }

    let (matrices, primary) = analyze(&rows, cfg.method);
    let comparison = compare(&primary);
    let summary = summarize(&primary.upper_triangle());

    let now = Local::now();
    let today = now.date_naive();

    let matrix_path = cfg.out_dir.join(io::matrix_file(today));
    io::save_matrix(&matrix_path, &primary)?;
    written.push(matrix_path);

    let summary_path = cfg.out_dir.join(io::summary_file(today));
    let text = crate::report::format_wgi_summary_file(
        cfg.start_year,
        cfg.end_year,
        &now.format("%Y-%m-%d %H:%M").to_string(),
        &primary,
        summary.as_ref(),
    );
    io::save_text(&summary_path, &text)?;
    written.push(summary_path);

    if cfg.heatmap {
        let path = cfg.out_dir.join(io::heatmap_file(today));
        let title = format!("WGI Correlations {}-{}", cfg.start_year, cfg.end_year);
        render_heatmap(&path, &primary, &title)?;
        written.push(path);
    }

    Ok(WgiOutput {
        source,
        n_rows: rows.len(),
        n_countries: countries.len(),
        years,
        matrices,
        primary,
        comparison,
        summary,
        written,
    })
}
