//! Annotated correlation heatmap.

use std::error::Error;
use std::path::Path;

use log::info;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::domain::Indicator;
use crate::error::AppError;
use crate::stats::CorrelationMatrix;

const NEGATIVE: (f64, f64, f64) = (59.0, 76.0, 192.0);
const POSITIVE: (f64, f64, f64) = (180.0, 4.0, 38.0);

/// Diverging blue-white-red colour for a correlation in `[-1, 1]`; grey for NaN.
pub fn diverging_color(r: f64) -> RGBColor {
    if !r.is_finite() {
        return RGBColor(200, 200, 200);
    }
    let t = r.clamp(-1.0, 1.0);
    let (end, w) = if t < 0.0 { (NEGATIVE, -t) } else { (POSITIVE, t) };
    let mix = |c: f64| (255.0 + (c - 255.0) * w).round() as u8;
    RGBColor(mix(end.0), mix(end.1), mix(end.2))
}

pub fn render_heatmap(path: &Path, matrix: &CorrelationMatrix, title: &str) -> Result<(), AppError> {
    draw(path, matrix, title)
        .map_err(|e| AppError::external(format!("Failed to render '{}': {e}", path.display())))?;
    info!("Saved heatmap {}", path.display());
    Ok(())
}

fn draw(path: &Path, matrix: &CorrelationMatrix, title: &str) -> Result<(), Box<dyn Error>> {
    let n = Indicator::ALL.len() as i32;
    let root = BitMapBackend::new(path, (1000, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    // y runs top-down so row 0 (VA) is the top row.
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 32).into_font().style(FontStyle::Bold))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0..n, n..0)?;

    let (w, h) = chart.plotting_area().dim_in_pixel();
    let (cell_w, cell_h) = ((w as i32) / n, (h as i32) / n);
    let name = |v: &i32| {
        usize::try_from(*v)
            .ok()
            .and_then(|i| Indicator::ALL.get(i))
            .map(|ind| ind.short().to_string())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(n as usize + 1)
        .y_labels(n as usize + 1)
        .x_label_offset(cell_w / 2)
        .y_label_offset(cell_h / 2)
        .x_label_formatter(&name)
        .y_label_formatter(&name)
        .label_style(("sans-serif", 22))
        .draw()?;

    for (row, a) in Indicator::ALL.iter().enumerate() {
        for (col, b) in Indicator::ALL.iter().enumerate() {
            let (x, y) = (col as i32, row as i32);
            let r = matrix.get(*a, *b);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x, y), (x + 1, y + 1)],
                diverging_color(r).filled(),
            )))?;

            let text = if r.is_finite() { format!("{r:.2}") } else { "NaN".to_string() };
            let ink = if r.is_finite() && r.abs() > 0.6 { &WHITE } else { &BLACK };
            let style = ("sans-serif", 24)
                .into_font()
                .color(ink)
                .pos(Pos::new(HPos::Center, VPos::Center));
            chart.draw_series(std::iter::once(
                EmptyElement::at((x, y)) + Text::new(text, (cell_w / 2, cell_h / 2), style),
            ))?;
        }
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_scale_endpoints() {
        assert_eq!(diverging_color(0.0), RGBColor(255, 255, 255));
        assert_eq!(diverging_color(1.0), RGBColor(180, 4, 38));
        assert_eq!(diverging_color(-1.0), RGBColor(59, 76, 192));
        assert_eq!(diverging_color(5.0), diverging_color(1.0));
        assert_eq!(diverging_color(f64::NAN), RGBColor(200, 200, 200));
    }

    #[test]
    fn colour_scale_is_graded() {
        let RGBColor(_, g_weak, _) = diverging_color(0.3);
        let RGBColor(_, g_strong, _) = diverging_color(0.9);
        assert!(g_weak > g_strong);
    }
}
