//! Command-line parsing for the sovereign spreads / ratings tool.
//!
//! Argument parsing and command dispatch are kept apart from the scraping,
//! statistics and plotting code; `app` turns these args into the resolved
//! config structs in `domain`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::CorrelationMethod;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "sov",
    version,
    about = "Sovereign bond spreads vs. credit ratings, plus WGI correlations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape spreads and ratings, normalize grades, and write the three CSVs.
    Scrape(ScrapeArgs),
    /// Render the spread-vs-rating charts from the merged CSV.
    Plot(PlotArgs),
    /// Group countries by broad rating grade.
    Grades(GradesArgs),
    /// Correlate the six Worldwide Governance Indicators.
    Wgi(WgiArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Scrape(_) => "scrape",
            Command::Plot(_) => "plot",
            Command::Grades(_) => "grades",
            Command::Wgi(_) => "wgi",
        }
    }

    /// Directory the command writes into (also holds the run log).
    pub fn out_dir(&self) -> &PathBuf {
        match self {
            Command::Scrape(a) => &a.out_dir,
            Command::Plot(a) => &a.out_dir,
            Command::Grades(a) => &a.out_dir,
            Command::Wgi(a) => &a.out_dir,
        }
    }
}

#[derive(Debug, Parser, Clone)]
pub struct ScrapeArgs {
    /// Output directory for the CSV files.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct PlotArgs {
    /// Merged CSV produced by `sov scrape`.
    #[arg(long, value_name = "CSV", default_value = "credit_ratings_and_spreads.csv")]
    pub input: PathBuf,

    /// Output directory for the PNG charts.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Directory of cached `<iso2>.png` flag icons.
    #[arg(long, default_value = "flag_icons")]
    pub flags_dir: PathBuf,

    /// Use only icons already in the flags directory.
    #[arg(long)]
    pub no_flag_download: bool,

    /// Std dev of the horizontal point jitter (bp).
    #[arg(long, default_value_t = 5.0)]
    pub jitter: f64,

    /// Horizontal offset of country labels from their point (bp).
    #[arg(long, default_value_t = 8.0)]
    pub label_dx: f64,

    /// Flag icon height (pixels).
    #[arg(long, default_value_t = 24)]
    pub flag_height: u32,

    /// Random seed for the jitter.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Parser, Clone)]
pub struct GradesArgs {
    /// Ratings CSV (`world_credit_ratings_with_numeric.csv`) or the merged CSV.
    #[arg(long, value_name = "CSV", default_value = "world_credit_ratings_with_numeric.csv")]
    pub input: PathBuf,

    /// Output directory for `ratings_by_grade.csv`.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct WgiArgs {
    /// First year of the panel.
    #[arg(long, default_value_t = 2010)]
    pub start: i32,

    /// Last year of the panel (inclusive).
    #[arg(long, default_value_t = 2023)]
    pub end: i32,

    /// Read the panel from a CSV instead of downloading it.
    #[arg(long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// How the matrix is aggregated over years.
    #[arg(long, value_enum, default_value_t = CorrelationMethod::All)]
    pub method: CorrelationMethod,

    /// Also render the correlation heatmap PNG.
    #[arg(long)]
    pub heatmap: bool,

    /// Do not save the downloaded panel.
    #[arg(long)]
    pub no_raw: bool,

    /// Output directory.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Seed for the synthetic fallback panel.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn plot_and_wgi_defaults() {
        let cli = Cli::parse_from(["sov", "plot"]);
        let Command::Plot(args) = cli.command else {
            panic!("expected plot");
        };
        assert_eq!(args.jitter, 5.0);
        assert_eq!(args.label_dx, 8.0);
        assert_eq!(args.flag_height, 24);
        assert_eq!(args.seed, 42);
        assert!(!args.no_flag_download);

        let cli = Cli::parse_from(["sov", "wgi"]);
        let Command::Wgi(args) = cli.command else {
            panic!("expected wgi");
        };
        assert_eq!(args.method, CorrelationMethod::All);
        assert!(!args.heatmap);

        let cli = Cli::parse_from(["sov", "wgi", "--method", "yearly-avg", "--heatmap"]);
        let Command::Wgi(args) = cli.command else {
            panic!("expected wgi");
        };
        assert_eq!((args.start, args.end), (2010, 2023));
        assert_eq!(args.method, CorrelationMethod::YearlyAvg);
        assert!(args.heatmap);
        assert!(!args.no_raw);
    }
}
