//! Shared domain types.
//!
//! These types are kept small and plain so they can be:
//!
//! - built by the HTML table parser
//! - written to / re-read from the intermediate CSV files
//! - handed to the plotting and reporting code without conversion

use std::path::PathBuf;

use clap::ValueEnum;

/// Number of notches on the numeric rating scale (1 = best, 22 = default).
pub const NUM_GRADES: u8 = 22;

/// Worst numeric grade that still counts as investment grade (BBB- / Baa3).
pub const INVESTMENT_GRADE_CUTOFF: u8 = 10;

/// Credit rating agencies tracked by the ratings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Agency {
    SP,
    Moodys,
    Fitch,
}

impl Agency {
    pub const ALL: [Agency; 3] = [Agency::SP, Agency::Moodys, Agency::Fitch];

    /// Column label used in the CSV files and chart legends.
    pub fn label(self) -> &'static str {
        match self {
            Agency::SP => "S&P",
            Agency::Moodys => "Moody's",
            Agency::Fitch => "Fitch",
        }
    }

    /// Detect the agency a ratings-page header refers to.
    ///
    /// Matching is case-insensitive and substring-based because the site
    /// decorates headers (e.g. `"S&P Rating"`). DBRS is deliberately not
    /// recognized.
    pub fn from_header(header: &str) -> Option<Agency> {
        let lower = header.to_lowercase();
        if lower.contains("s&p") {
            Some(Agency::SP)
        } else if lower.contains("moody") {
            Some(Agency::Moodys)
        } else if lower.contains("fitch") {
            Some(Agency::Fitch)
        } else {
            None
        }
    }
}

/// Rating outlook derived from the coloured indicator next to a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outlook {
    #[default]
    Stable,
    Upgrade,
    Downgrade,
}

impl Outlook {
    pub fn as_str(self) -> &'static str {
        match self {
            Outlook::Stable => "",
            Outlook::Upgrade => "upgrade",
            Outlook::Downgrade => "downgrade",
        }
    }

    pub fn parse(raw: &str) -> Outlook {
        match raw.trim().to_ascii_lowercase().as_str() {
            "upgrade" => Outlook::Upgrade,
            "downgrade" => Outlook::Downgrade,
            _ => Outlook::Stable,
        }
    }
}

/// One government bond spread row.
#[derive(Debug, Clone, PartialEq)]
pub struct BondSpreadRecord {
    pub country: String,
    /// 10-year government bond yield in percent (if the page listed one).
    pub yield_10y: Option<f64>,
    /// Spread of the 10-year yield over the US benchmark, in basis points.
    pub spread_bp: f64,
}

/// One agency's view of a country.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgencyRating {
    /// Base letter grade with outlook markers stripped (`None` when unrated).
    pub letter: Option<String>,
    /// Numeric grade in `[1, 22]`; `None` if the letter is not on the scale.
    pub numeric: Option<u8>,
    pub outlook: Outlook,
}

/// One row of the ratings table after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingRecord {
    pub country: String,
    pub sp: AgencyRating,
    pub moodys: AgencyRating,
    pub fitch: AgencyRating,
}

impl RatingRecord {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            sp: AgencyRating::default(),
            moodys: AgencyRating::default(),
            fitch: AgencyRating::default(),
        }
    }

    pub fn agency(&self, agency: Agency) -> &AgencyRating {
        match agency {
            Agency::SP => &self.sp,
            Agency::Moodys => &self.moodys,
            Agency::Fitch => &self.fitch,
        }
    }

    pub fn agency_mut(&mut self, agency: Agency) -> &mut AgencyRating {
        match agency {
            Agency::SP => &mut self.sp,
            Agency::Moodys => &mut self.moodys,
            Agency::Fitch => &mut self.fitch,
        }
    }

    /// Numeric grades in `Agency::ALL` order.
    pub fn numerics(&self) -> [Option<u8>; 3] {
        Agency::ALL.map(|a| self.agency(a).numeric)
    }

    /// Number of agencies with a recognized numeric grade.
    pub fn ratings_count(&self) -> usize {
        self.numerics().iter().flatten().count()
    }

    /// Mean numeric grade over the agencies that rate the country, rounded
    /// to two decimals.
    pub fn average(&self) -> Option<f64> {
        let present: Vec<f64> = self.numerics().iter().flatten().map(|&v| v as f64).collect();
        if present.is_empty() {
            return None;
        }
        let mean = present.iter().sum::<f64>() / present.len() as f64;
        Some((mean * 100.0).round() / 100.0)
    }

    /// Best (lowest) numeric grade across agencies.
    pub fn best(&self) -> Option<u8> {
        self.numerics().iter().flatten().copied().min()
    }
}

/// A merged spreads + ratings row. Either side may be missing (outer join).
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    /// Reconciled country name (merge key).
    pub country: String,
    pub yield_10y: Option<f64>,
    pub spread_bp: Option<f64>,
    pub rating: Option<RatingRecord>,
}

impl MergedRecord {
    pub fn average(&self) -> Option<f64> {
        self.rating.as_ref().and_then(RatingRecord::average)
    }

    pub fn best(&self) -> Option<u8> {
        self.rating.as_ref().and_then(RatingRecord::best)
    }

    pub fn numeric(&self, agency: Agency) -> Option<u8> {
        self.rating.as_ref().and_then(|r| r.agency(agency).numeric)
    }
}

/// Worldwide Governance Indicators, in the fixed order used by every
/// correlation matrix in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    VoiceAccountability,
    PoliticalStability,
    GovernmentEffectiveness,
    RegulatoryQuality,
    RuleOfLaw,
    ControlOfCorruption,
}

impl Indicator {
    pub const ALL: [Indicator; 6] = [
        Indicator::VoiceAccountability,
        Indicator::PoliticalStability,
        Indicator::GovernmentEffectiveness,
        Indicator::RegulatoryQuality,
        Indicator::RuleOfLaw,
        Indicator::ControlOfCorruption,
    ];

    pub fn short(self) -> &'static str {
        match self {
            Indicator::VoiceAccountability => "VA",
            Indicator::PoliticalStability => "PSV",
            Indicator::GovernmentEffectiveness => "GE",
            Indicator::RegulatoryQuality => "RQ",
            Indicator::RuleOfLaw => "RL",
            Indicator::ControlOfCorruption => "CC",
        }
    }

    /// World Bank API indicator code.
    pub fn api_code(self) -> &'static str {
        match self {
            Indicator::VoiceAccountability => "VA.EST",
            Indicator::PoliticalStability => "PV.EST",
            Indicator::GovernmentEffectiveness => "GE.EST",
            Indicator::RegulatoryQuality => "RQ.EST",
            Indicator::RuleOfLaw => "RL.EST",
            Indicator::ControlOfCorruption => "CC.EST",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Indicator::VoiceAccountability => "Voice and Accountability",
            Indicator::PoliticalStability => "Political Stability",
            Indicator::GovernmentEffectiveness => "Government Effectiveness",
            Indicator::RegulatoryQuality => "Regulatory Quality",
            Indicator::RuleOfLaw => "Rule of Law",
            Indicator::ControlOfCorruption => "Control of Corruption",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_short(s: &str) -> Option<Indicator> {
        Indicator::ALL
            .into_iter()
            .find(|i| i.short().eq_ignore_ascii_case(s.trim()))
    }
}

/// One country-year observation of the six governance indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRow {
    pub country: String,
    pub country_code: String,
    pub year: i32,
    /// Indexed by `Indicator::index()`.
    pub values: [Option<f64>; 6],
}

/// How the correlation matrix is aggregated over the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CorrelationMethod {
    /// All country-year observations together.
    Pooled,
    /// Average of the per-year matrices.
    YearlyAvg,
    /// Most recent year only.
    Latest,
    /// Report all three; the pooled matrix is the one saved.
    All,
}

impl CorrelationMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            CorrelationMethod::Pooled => "POOLED CORRELATION",
            CorrelationMethod::YearlyAvg => "AVERAGE YEARLY CORRELATION",
            CorrelationMethod::Latest => "LATEST YEAR ONLY",
            CorrelationMethod::All => "ALL METHODS",
        }
    }
}

/// Resolved settings for `sov scrape`.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub out_dir: PathBuf,
    pub spreads_url: String,
    pub ratings_url: String,
}

/// Resolved settings for `sov plot`.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub flags_dir: PathBuf,
    pub download_flags: bool,
    pub flag_cdn: String,
    /// Std dev of the horizontal jitter, in bp.
    pub jitter_bp: f64,
    /// Horizontal offset of country labels from their point, in bp.
    pub label_dx: f64,
    /// Flag icon height in pixels.
    pub flag_height: u32,
    pub seed: u64,
}

/// Resolved settings for `sov grades`.
#[derive(Debug, Clone)]
pub struct GradesConfig {
    pub input: PathBuf,
    pub out_dir: PathBuf,
}

/// Resolved settings for `sov wgi`.
#[derive(Debug, Clone)]
pub struct WgiConfig {
    pub start_year: i32,
    pub end_year: i32,
    /// Manual panel CSV; when absent the panel is downloaded.
    pub input: Option<PathBuf>,
    pub method: CorrelationMethod,
    pub heatmap: bool,
    pub save_raw: bool,
    pub out_dir: PathBuf,
    pub api_base: String,
    pub seed: u64,
}
