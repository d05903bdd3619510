//! Spread-vs-rating scatter charts.
//!
//! Two views of the merged table:
//!
//! - full plot: every country with a spread and at least one grade
//! - investment-grade plot: countries whose best grade is BBB- or better,
//!   with the x axis fixed to `[-500, 500]` bp
//!
//! Data preparation (`prepare`) is separate from drawing so the jitter, tie
//! lines, trend line and label layout can be tested without rendering.
//!
//! The y axis shows a "score" (`23 - grade`) so the best grade is at the top;
//! tick labels are the S&P letters of the underlying grade.

use std::error::Error;
use std::path::Path;

use log::{debug, info};
use plotters::element::BitMapElement;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Agency, INVESTMENT_GRADE_CUTOFF, MergedRecord, NUM_GRADES, PlotConfig};
use crate::error::AppError;
use crate::math::fit_line;
use crate::plot::flags::{FlagCache, country_code};
use crate::plot::layout::{LabelRule, place_labels};
use crate::rating::grade_label;
use crate::stats::pearson;

pub const FULL_PLOT_FILE: &str = "bond_spreads_vs_ratings.png";
pub const INVESTMENT_PLOT_FILE: &str = "investment_grade_plot.png";

const TITLE: &str = "Bond Spreads vs. Sovereign Credit Ratings";
const X_DESC: &str = "10-Year Bond Spread to US (bp)";
const Y_DESC: &str = "Credit Rating";

/// Seaborn "bright" palette, one colour per agency.
const PALETTE: [RGBColor; 3] = [RGBColor(2, 62, 255), RGBColor(255, 124, 0), RGBColor(26, 201, 56)];
const INVESTMENT_BAND: RGBColor = RGBColor(0xcc, 0xe6, 0xff);
const SPECULATIVE_BAND: RGBColor = RGBColor(0xe8, 0xd5, 0xff);
const TIE_GREY: RGBColor = RGBColor(128, 128, 128);

const INVESTMENT_X_RANGE: (f64, f64) = (-500.0, 500.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Full,
    InvestmentGrade,
}

impl View {
    pub fn file_name(self) -> &'static str {
        match self {
            View::Full => FULL_PLOT_FILE,
            View::InvestmentGrade => INVESTMENT_PLOT_FILE,
        }
    }

    fn size(self) -> (u32, u32) {
        match self {
            View::Full => (1800, 1800),
            View::InvestmentGrade => (1866, 1783),
        }
    }

    fn includes(self, record: &MergedRecord) -> bool {
        match self {
            View::Full => true,
            View::InvestmentGrade => record.best().is_some_and(|b| b <= INVESTMENT_GRADE_CUTOFF),
        }
    }
}

/// Plot-space y value for a numeric grade (best grade highest).
pub fn score(grade: u8) -> f64 {
    (NUM_GRADES + 1 - grade) as f64
}

fn tick_label(y: f64) -> String {
    let r = y.round();
    if (y - r).abs() > 1e-6 || r < 1.0 || r > NUM_GRADES as f64 {
        return String::new();
    }
    grade_label(NUM_GRADES + 1 - r as u8).to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub country: String,
    pub code: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterData {
    pub view: View,
    /// Jittered points per agency, in `Agency::ALL` order.
    pub series: Vec<(Agency, Vec<(f64, f64)>)>,
    /// Un-jittered points used for the trend line and `r`.
    pub raw: Vec<(f64, f64)>,
    /// `(x, low, high)` per country rated by more than one agency.
    pub ties: Vec<(f64, f64, f64)>,
    pub labels: Vec<Label>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl ScatterData {
    pub fn trend(&self) -> Option<(f64, f64)> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = self.raw.iter().copied().unzip();
        fit_line(&xs, &ys)
    }

    pub fn r(&self) -> Option<f64> {
        let xs: Vec<Option<f64>> = self.raw.iter().map(|p| Some(p.0)).collect();
        let ys: Vec<Option<f64>> = self.raw.iter().map(|p| Some(p.1)).collect();
        pearson(&xs, &ys)
    }
}

pub fn prepare(records: &[MergedRecord], view: View, cfg: &PlotConfig) -> Result<ScatterData, AppError> {
    let rows: Vec<(&MergedRecord, f64)> = records
        .iter()
        .filter(|r| view.includes(r))
        .filter_map(|r| Some((r, r.spread_bp.filter(|s| s.is_finite())?)))
        .collect();

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let jitter = Normal::new(0.0, cfg.jitter_bp)
        .map_err(|e| AppError::input(format!("Invalid jitter {}: {e}", cfg.jitter_bp)))?;

    let mut series = Vec::with_capacity(Agency::ALL.len());
    let mut raw = Vec::new();
    for agency in Agency::ALL {
        let mut points = Vec::new();
        for (record, spread) in &rows {
            if let Some(grade) = record.numeric(agency) {
                points.push((spread + jitter.sample(&mut rng), score(grade)));
                raw.push((*spread, score(grade)));
            }
        }
        series.push((agency, points));
    }

    let ties = rows
        .iter()
        .filter_map(|(record, spread)| {
            let scores: Vec<f64> = Agency::ALL
                .iter()
                .filter_map(|&a| record.numeric(a))
                .map(score)
                .collect();
            if scores.len() < 2 {
                return None;
            }
            let lo = scores.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some((*spread, lo, hi))
        })
        .collect();

    let (x_range, y_range) = match view {
        View::Full => (padded_range(raw.iter().map(|p| p.0)), (0.0, NUM_GRADES as f64 + 1.5)),
        View::InvestmentGrade => (INVESTMENT_X_RANGE, (score(INVESTMENT_GRADE_CUTOFF) - 0.2, NUM_GRADES as f64 + 0.5)),
    };

    let mut anchors: Vec<(f64, f64, &str)> = rows
        .iter()
        .filter_map(|(record, spread)| Some((spread + cfg.label_dx, score(record.best()?), record.country.as_str())))
        .collect();
    anchors.sort_by(|a, b| match view {
        View::Full => a.0.total_cmp(&b.0),
        View::InvestmentGrade => a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)),
    });
    let rule = match view {
        View::Full => LabelRule::full_plot(),
        View::InvestmentGrade => LabelRule::investment_plot(y_range),
    };
    let positions = place_labels(&anchors.iter().map(|a| (a.0, a.1)).collect::<Vec<_>>(), rule);
    let labels = anchors
        .iter()
        .zip(positions)
        .map(|(&(_, _, country), (x, y))| Label {
            country: country.to_string(),
            code: country_code(country),
            x,
            y,
        })
        .collect();

    Ok(ScatterData {
        view,
        series,
        raw,
        ties,
        labels,
        x_range,
        y_range,
    })
}

/// Data range padded by 5% on each side.
fn padded_range(xs: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
    if !lo.is_finite() || !hi.is_finite() {
        return INVESTMENT_X_RANGE;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 50.0 };
    (lo - pad, hi + pad)
}

/// Draw `data` to `path` as a PNG.
pub fn render_scatter(path: &Path, data: &ScatterData, flags: &mut FlagCache) -> Result<(), AppError> {
    if data.raw.is_empty() {
        return Err(AppError::no_data(format!(
            "No countries with both a spread and a rating for {}.",
            data.view.file_name()
        )));
    }
    draw(path, data, flags)
        .map_err(|e| AppError::external(format!("Failed to render '{}': {e}", path.display())))?;
    info!("Saved chart {}", path.display());
    Ok(())
}

fn draw(path: &Path, data: &ScatterData, flags: &mut FlagCache) -> Result<(), Box<dyn Error>> {
    let (x0, x1) = data.x_range;
    let (y0, y1) = data.y_range;
    let cutoff = score(INVESTMENT_GRADE_CUTOFF);

    let root = BitMapBackend::new(path, data.view.size()).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", 40).into_font().style(FontStyle::Bold))
        .margin(30)
        .x_label_area_size(90)
        .y_label_area_size(120)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    // Background bands first so everything else draws on top.
    match data.view {
        View::Full => {
            let boundary = cutoff - 0.5;
            chart.draw_series([
                Rectangle::new([(x0, boundary), (x1, NUM_GRADES as f64)], INVESTMENT_BAND.mix(0.25).filled()),
                Rectangle::new([(x0, 1.0), (x1, boundary)], SPECULATIVE_BAND.mix(0.25).filled()),
            ])?;
            let tx = x1 - (x1 - x0) * 0.015;
            chart.draw_series([
                Text::new(
                    "Investment Grade",
                    (tx, boundary + 0.2),
                    ("sans-serif", 18)
                        .into_font()
                        .color(&RGBColor(0, 0, 128))
                        .pos(Pos::new(HPos::Right, VPos::Bottom)),
                ),
                Text::new(
                    "Speculative Grade",
                    (tx, boundary - 0.2),
                    ("sans-serif", 18)
                        .into_font()
                        .color(&RGBColor(0x5e, 0x3b, 0x7f))
                        .pos(Pos::new(HPos::Right, VPos::Top)),
                ),
            ])?;
        }
        View::InvestmentGrade => {
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x0, cutoff), (x1, NUM_GRADES as f64)],
                INVESTMENT_BAND.mix(0.25).filled(),
            )))?;
        }
    }

    chart
        .configure_mesh()
        .x_desc(X_DESC)
        .y_desc(Y_DESC)
        .axis_desc_style(("sans-serif", 32))
        .label_style(("sans-serif", 24))
        .y_labels(((y1 - y0).ceil() as usize) + 1)
        .y_label_formatter(&|v| tick_label(*v))
        .x_label_formatter(&|v| format!("{v:.0}"))
        .light_line_style(&WHITE)
        .bold_line_style(&BLACK.mix(0.1))
        .draw()?;

    if x0 < 0.0 && x1 > 0.0 {
        chart.draw_series(LineSeries::new([(0.0, y0), (0.0, y1)], BLACK.mix(0.4).stroke_width(2)))?;
    }

    chart.draw_series(
        data.ties
            .iter()
            .map(|&(x, lo, hi)| PathElement::new(vec![(x, lo), (x, hi)], TIE_GREY.mix(0.55).stroke_width(2))),
    )?;

    if let Some((slope, intercept)) = data.trend() {
        let (lx0, lx1) = match data.view {
            View::Full => data
                .raw
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.0), hi.max(p.0))),
            View::InvestmentGrade => INVESTMENT_X_RANGE,
        };
        let steps = 100;
        let line = (0..=steps).map(|i| {
            let x = lx0 + (lx1 - lx0) * i as f64 / steps as f64;
            (x, slope * x + intercept)
        });
        chart.draw_series(DashedLineSeries::new(line, 12, 8, BLACK.stroke_width(2)))?;
    }

    for (i, (agency, points)) in data.series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        chart
            .draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 7, color.mix(0.85).filled())),
            )?
            .label(agency.label())
            .legend(move |(x, y)| Circle::new((x, y), 7, color.filled()));
    }

    for label in &data.labels {
        match flags.icon(&label.code) {
            Some(icon) => {
                let offset = -(icon.height as i32) / 2;
                let bitmap = BitMapElement::with_owned_buffer((0, offset), (icon.width, icon.height), icon.rgb.clone())
                    .ok_or("flag buffer does not match its size")?;
                chart.draw_series(std::iter::once(EmptyElement::at((label.x, label.y)) + bitmap))?;
            }
            None => {
                debug!("No flag for {} ({}), drawing the code", label.country, label.code);
                chart.draw_series(std::iter::once(Text::new(
                    label.code.to_uppercase(),
                    (label.x, label.y),
                    ("sans-serif", 14)
                        .into_font()
                        .style(FontStyle::Bold)
                        .color(&BLACK)
                        .pos(Pos::new(HPos::Left, VPos::Center)),
                )))?;
            }
        }
    }

    if let Some(r) = data.r() {
        chart.draw_series(std::iter::once(Text::new(
            format!("r = {r:.2}"),
            (x1 - (x1 - x0) * 0.05, y0 + (y1 - y0) * 0.05),
            ("sans-serif", 20)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Right, VPos::Bottom)),
        )))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(("sans-serif", 24))
        .background_style(&WHITE.mix(0.9))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::RatingRecord;

    fn config() -> PlotConfig {
        PlotConfig {
            input: PathBuf::new(),
            out_dir: PathBuf::new(),
            flags_dir: PathBuf::new(),
            download_flags: false,
            flag_cdn: String::new(),
            jitter_bp: 5.0,
            label_dx: 8.0,
            flag_height: 24,
            seed: 42,
        }
    }

    fn record(country: &str, spread: Option<f64>, grades: [Option<u8>; 3]) -> MergedRecord {
        let mut r = RatingRecord::new(country);
        r.sp.numeric = grades[0];
        r.moodys.numeric = grades[1];
        r.fitch.numeric = grades[2];
        MergedRecord {
            country: country.to_string(),
            yield_10y: None,
            spread_bp: spread,
            rating: Some(r),
        }
    }

    fn sample() -> Vec<MergedRecord> {
        vec![
            record("Germany", Some(-160.0), [Some(1), Some(1), Some(1)]),
            record("Italy", Some(120.0), [Some(9), Some(10), Some(9)]),
            record("Brazil", Some(700.0), [Some(12), None, Some(12)]),
            record("Nowhere", None, [Some(5), None, None]),
        ]
    }

    #[test]
    fn score_puts_best_grade_on_top() {
        assert_eq!(score(1), 22.0);
        assert_eq!(score(22), 1.0);
        assert_eq!(tick_label(22.0), "AAA");
        assert_eq!(tick_label(13.0), "BBB-");
        assert_eq!(tick_label(12.5), "");
        assert_eq!(tick_label(0.0), "");
    }

    #[test]
    fn full_view_points_and_ties() {
        let data = prepare(&sample(), View::Full, &config()).unwrap();
        let counts: Vec<usize> = data.series.iter().map(|(_, p)| p.len()).collect();
        assert_eq!(counts, [3, 2, 3]);
        assert_eq!(data.raw.len(), 8);
        // Italy spans BBB+ .. BBB-.
        assert!(data.ties.contains(&(120.0, score(10), score(9))));
        // Germany's three identical grades still form a (zero-length) tie.
        assert_eq!(data.ties.len(), 3);
        assert_eq!(data.labels.len(), 3);
        assert_eq!(data.labels[0].code, "de");
        assert_eq!(data.labels[0].x, -152.0);
    }

    #[test]
    fn jitter_is_reproducible_and_small() {
        let a = prepare(&sample(), View::Full, &config()).unwrap();
        let b = prepare(&sample(), View::Full, &config()).unwrap();
        assert_eq!(a, b);
        for (_, points) in &a.series {
            for &(x, _) in points {
                assert!([-160.0, 120.0, 700.0].iter().any(|s| (x - s).abs() < 50.0));
            }
        }
    }

    #[test]
    fn investment_view_keeps_only_investment_grade() {
        let data = prepare(&sample(), View::InvestmentGrade, &config()).unwrap();
        let countries: Vec<&str> = data.labels.iter().map(|l| l.country.as_str()).collect();
        assert_eq!(countries, ["Germany", "Italy"]);
        assert_eq!(data.x_range, (-500.0, 500.0));
        assert!((data.y_range.0 - 12.8).abs() < 1e-12);
        assert_eq!(data.y_range.1, 22.5);
    }

    #[test]
    fn trend_slopes_down_as_spreads_widen() {
        let data = prepare(&sample(), View::Full, &config()).unwrap();
        let (slope, _) = data.trend().unwrap();
        assert!(slope < 0.0);
        assert!(data.r().unwrap() < -0.8);
    }

    #[test]
    fn empty_chart_is_no_data() {
        let data = prepare(&[], View::Full, &config()).unwrap();
        let mut flags = FlagCache::new(Path::new("flags"), "", false, 24).unwrap();
        let err = render_scatter(Path::new("unused.png"), &data, &mut flags).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_NO_DATA);
    }
}
