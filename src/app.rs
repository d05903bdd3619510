//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - starts logging (stderr + a per-run log file)
//! - resolves CLI flags and environment overrides into config structs
//! - runs the command pipeline and prints its report

use std::path::Path;

use clap::Parser;
use log::info;

use crate::cli::{Cli, Command, GradesArgs, PlotArgs, ScrapeArgs, WgiArgs};
use crate::data::Endpoints;
use crate::domain::{CorrelationMethod, GradesConfig, PlotConfig, ScrapeConfig, WgiConfig};
use crate::error::AppError;
use crate::io::RowError;
use crate::report;

pub mod pipeline;

/// Entry point for the `sov` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let log_path = crate::logging::init(cli.command.name(), cli.command.out_dir())?;
    info!("Logging to {}", log_path.display());

    let endpoints = Endpoints::from_env();
    match cli.command {
        Command::Scrape(args) => handle_scrape(scrape_config(&args, &endpoints)),
        Command::Plot(args) => handle_plot(plot_config(&args, &endpoints)),
        Command::Grades(args) => handle_grades(grades_config(&args)),
        Command::Wgi(args) => handle_wgi(wgi_config(&args, &endpoints)),
    }
}

fn handle_scrape(cfg: ScrapeConfig) -> Result<(), AppError> {
    let out = pipeline::run_scrape(&cfg)?;
    println!(
        "{}",
        report::format_scrape_summary(out.spreads.len(), out.ratings.len(), &out.merged, &cfg.out_dir)
    );
    Ok(())
}

/// Skipped CSV rows shown in the terminal; the rest are only counted.
const ROW_ERROR_LIMIT: usize = 10;

fn print_skipped(errors: &[RowError], source: &Path) {
    if errors.is_empty() {
        return;
    }
    println!("Skipped {} malformed rows in {}:", errors.len(), source.display());
    print!("{}", report::format_row_errors(errors, ROW_ERROR_LIMIT));
}

fn handle_plot(cfg: PlotConfig) -> Result<(), AppError> {
    let out = pipeline::run_plot(&cfg)?;
    print_skipped(&out.skipped, &cfg.input);
    for path in &out.written {
        println!("Saved {}", path.display());
    }
    Ok(())
}

fn handle_grades(cfg: GradesConfig) -> Result<(), AppError> {
    let out = pipeline::run_grades(&cfg)?;
    print_skipped(&out.skipped, &cfg.input);
    println!("{}", report::format_grade_table(&out.groups));
    println!("Saved {}", cfg.out_dir.join(crate::io::GRADES_FILE).display());
    Ok(())
}

fn handle_wgi(cfg: WgiConfig) -> Result<(), AppError> {
    let out = pipeline::run_wgi(&cfg)?;

    println!("WGI CORRELATION ANALYSIS");
    println!("Selected period: {}-{}", cfg.start_year, cfg.end_year);
    let source = match out.source {
        pipeline::PanelSource::File => "input file",
        pipeline::PanelSource::WorldBank => "World Bank API",
        pipeline::PanelSource::Synthetic => "synthetic sample (download failed)",
    };
    println!("Source: {source}");
    match out.years {
        Some((lo, hi)) => println!(
            "Panel: {} countries, years {lo}-{hi}, {} observations",
            out.n_countries, out.n_rows
        ),
        None => println!("Panel: {} observations", out.n_rows),
    }

    for (method, matrix) in &out.matrices {
        print!("{}", report::format_matrix(matrix, *method));
    }
    if cfg.method == CorrelationMethod::All {
        println!("\nUsing pooled correlation for comparison.");
    }
    print!("{}", report::format_comparison(&out.comparison));
    print!("{}", report::format_summary_stats(out.summary.as_ref(), out.primary.n_rows));

    println!("\nResults saved to:");
    for path in &out.written {
        println!("  - {}", path.display());
    }
    Ok(())
}

pub fn scrape_config(args: &ScrapeArgs, endpoints: &Endpoints) -> ScrapeConfig {
    ScrapeConfig {
        out_dir: args.out_dir.clone(),
        spreads_url: endpoints.spreads_url.clone(),
        ratings_url: endpoints.ratings_url.clone(),
    }
}

pub fn plot_config(args: &PlotArgs, endpoints: &Endpoints) -> PlotConfig {
    PlotConfig {
        input: args.input.clone(),
        out_dir: args.out_dir.clone(),
        flags_dir: args.flags_dir.clone(),
        download_flags: !args.no_flag_download,
        flag_cdn: endpoints.flag_cdn.clone(),
        jitter_bp: args.jitter,
        label_dx: args.label_dx,
        flag_height: args.flag_height,
        seed: args.seed,
    }
}

pub fn grades_config(args: &GradesArgs) -> GradesConfig {
    GradesConfig {
        input: args.input.clone(),
        out_dir: args.out_dir.clone(),
    }
}

pub fn wgi_config(args: &WgiArgs, endpoints: &Endpoints) -> WgiConfig {
    WgiConfig {
        start_year: args.start,
        end_year: args.end,
        input: args.input.clone(),
        method: args.method,
        heatmap: args.heatmap,
        save_raw: !args.no_raw,
        out_dir: args.out_dir.clone(),
        api_base: endpoints.worldbank_api.clone(),
        seed: args.seed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_flags_are_resolved() {
        let cli = Cli::parse_from(["sov", "plot", "--no-flag-download", "--jitter", "0"]);
        let Command::Plot(args) = cli.command else {
            panic!("expected plot");
        };
        let cfg = plot_config(&args, &Endpoints::default());
        assert!(!cfg.download_flags);
        assert_eq!(cfg.jitter_bp, 0.0);
        assert_eq!(cfg.flag_cdn, crate::data::endpoints::DEFAULT_FLAG_CDN);

        let cli = Cli::parse_from(["sov", "wgi", "--no-raw", "--start", "2015"]);
        let Command::Wgi(args) = cli.command else {
            panic!("expected wgi");
        };
        let cfg = wgi_config(&args, &Endpoints::default());
        assert!(!cfg.save_raw);
        assert_eq!((cfg.start_year, cfg.end_year), (2015, 2023));
        assert_eq!(cfg.api_base, crate::data::endpoints::DEFAULT_WORLDBANK_API);
    }
}
