// src/render/mod.rs
//! Chart drawing.
//!
//! All series share one time X-axis and one plot area. Internally every
//! series is normalized to a 0..1 Y coordinate; the mesh draws the first
//! series' axis on the left (relabeled back into its own units) and each
//! further series gets a hand-drawn axis on the right, offset outward so
//! the scales don't overlap.

use anyhow::Result;
use chrono::{Duration, NaiveDateTime};
use plotters::backend::DrawingBackend;
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingErrorKind,
};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use std::ops::Range;
use std::panic;
use std::path::Path;

use crate::config::ChartConfig;
use crate::resolve::SeriesSpec;

/// Tick labels drawn on each hand-rolled right-hand axis.
const TICKS_PER_AXIS: usize = 5;

/// Render one chart to a PNG at `out_path`. `series` must be non-empty and
/// every range must satisfy `lo < hi` (the planner guarantees both).
pub fn render_chart(
    out_path: &Path,
    title: &str,
    series: &[SeriesSpec],
    cfg: &ChartConfig,
) -> Result<()> {
    anyhow::ensure!(!series.is_empty(), "no series to draw");
    anyhow::ensure!(
        series.iter().any(|s| !s.points.is_empty()),
        "no points to draw"
    );

    let (t0, t1) = time_extent(series);
    let extra_axes = series.len().saturating_sub(1) as u32;
    let right_area = 10 + cfg.axis_offset_px as u32 * extra_axes;

    let backend = FontTolerantBackend::new(BitMapBackend::new(out_path, cfg.size));
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;

    let first = &series[0];
    let (lo0, hi0) = first.range;

    let label_font = FontDesc::new(FontFamily::SansSerif, 15.0, FontStyle::Normal);
    let x_label_font = if cfg.rotate_x_labels {
        label_font.clone().transform(FontTransform::Rotate90)
    } else {
        label_font.clone()
    };

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(title, ("sans-serif", 24))
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 70)
        .set_label_area_size(LabelAreaPosition::Right, right_area)
        .build_cartesian_2d(RangedDateTime::from(t0..t1), 0f64..1f64)?;

    let x_formatter = |t: &NaiveDateTime| t.format(&cfg.time_format).to_string();
    let y_formatter = |v: &f64| format!("{:.1}", lo0 + v * (hi0 - lo0));
    {
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(8)
            .y_labels(6)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .x_label_style(x_label_font.clone().color(&BLACK.mix(0.85)))
            .y_label_style(label_font.clone().color(&first.color))
            .y_desc(first.name.clone())
            .axis_desc_style(label_font.clone().color(&first.color));
        if !cfg.grid {
            mesh.light_line_style(&TRANSPARENT)
                .bold_line_style(&TRANSPARENT);
        }
        mesh.draw()?;
    }

    for s in series {
        let (lo, hi) = s.range;
        let span = hi - lo;
        let color = s.color;
        chart
            .draw_series(LineSeries::new(
                s.points.iter().map(|(t, v)| (*t, (v - lo) / span)),
                Color::stroke_width(&color, 2),
            ))?
            .label(s.name.clone())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], Color::stroke_width(&color, 2))
            });
    }

    if cfg.legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK.mix(0.4))
            .label_font(label_font.clone().color(&BLACK))
            .draw()?;
    }

    let (x_px, y_px) = chart.plotting_area().get_pixel_range();
    for (idx, s) in series.iter().enumerate().skip(1) {
        let x = x_px.end + cfg.axis_offset_px * (idx as i32 - 1);
        draw_offset_axis(&root, x, &y_px, s)?;
    }

    root.present()?;
    Ok(())
}

/// Overall time window of the chart. A single-point window is widened by a
/// minute on each side so the coordinate stays well-formed.
fn time_extent(series: &[SeriesSpec]) -> (NaiveDateTime, NaiveDateTime) {
    let mut min = NaiveDateTime::MAX;
    let mut max = NaiveDateTime::MIN;
    for s in series {
        for (t, _) in &s.points {
            min = min.min(*t);
            max = max.max(*t);
        }
    }
    if min >= max {
        (min - Duration::minutes(1), max + Duration::minutes(1))
    } else {
        (min, max)
    }
}

/// One vertical axis at pixel column `x`: axis line, tick marks, tick
/// labels in the series' own units, series name on top. Everything in the
/// series color so the scale is attributable at a glance.
fn draw_offset_axis<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    x: i32,
    y_px: &Range<i32>,
    series: &SeriesSpec,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (lo, hi) = series.range;
    let color = series.color;
    let axis_style = Color::stroke_width(&color, 1);

    root.draw(&PathElement::new(
        vec![(x, y_px.start), (x, y_px.end)],
        axis_style,
    ))?;

    let tick_font = FontDesc::new(FontFamily::SansSerif, 13.0, FontStyle::Normal);
    let tick_style = tick_font
        .clone()
        .color(&color)
        .pos(Pos::new(HPos::Left, VPos::Center));
    let height = (y_px.end - y_px.start) as f64;

    for k in 0..TICKS_PER_AXIS {
        let f = k as f64 / (TICKS_PER_AXIS - 1) as f64;
        let y = y_px.end - (f * height).round() as i32;
        root.draw(&PathElement::new(vec![(x, y), (x + 4, y)], axis_style))?;
        let value = lo + f * (hi - lo);
        root.draw(&Text::new(
            format!("{value:.1}"),
            (x + 6, y),
            tick_style.clone(),
        ))?;
    }

    let name_style = tick_font
        .color(&color)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    root.draw(&Text::new(series.name.clone(), (x, y_px.start - 4), name_style))?;
    Ok(())
}

/// Backend wrapper that keeps rendering alive on hosts without usable
/// system fonts: failed text draws are dropped (the chart loses labels but
/// the lines and axes still land), and size estimation falls back to a
/// character-count approximation.
pub struct FontTolerantBackend<DB> {
    inner: DB,
}

impl<DB> FontTolerantBackend<DB> {
    pub fn new(inner: DB) -> Self {
        Self { inner }
    }
}

impl<DB: DrawingBackend> DrawingBackend for FontTolerantBackend<DB> {
    type ErrorType = DB::ErrorType;

    fn get_size(&self) -> (u32, u32) {
        self.inner.get_size()
    }

    fn ensure_prepared(&mut self) -> std::result::Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.ensure_prepared()
    }

    fn present(&mut self) -> std::result::Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.present()
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> std::result::Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_pixel(point, color)
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> std::result::Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_line(from, to, style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> std::result::Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_rect(upper_left, bottom_right, style, fill)
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> std::result::Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_path(path, style)
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> std::result::Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_circle(center, radius, style, fill)
    }

    fn blit_bitmap(
        &mut self,
        pos: BackendCoord,
        (iw, ih): (u32, u32),
        src: &[u8],
    ) -> std::result::Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.blit_bitmap(pos, (iw, ih), src)
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> std::result::Result<(), DrawingErrorKind<Self::ErrorType>> {
        match panic::catch_unwind(panic::AssertUnwindSafe(|| {
            self.inner.draw_text(text, style, pos)
        })) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(DrawingErrorKind::FontError(_))) | Err(_) => Ok(()),
            Ok(Err(other)) => Err(other),
        }
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> std::result::Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        match panic::catch_unwind(panic::AssertUnwindSafe(|| {
            self.inner.estimate_text_size(text, style)
        })) {
            Ok(Ok(size)) => Ok(size),
            Ok(Err(_)) | Err(_) => {
                let h = style.size().round().max(1.0) as u32;
                Ok((text.chars().count() as u32 * h / 2, h))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::SeriesSpec;
    use chrono::NaiveDate;
    use plotters::style::RGBColor;
    use tempfile::TempDir;

    fn stamp(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, 22)
            .unwrap()
            .and_hms_opt(0, minute, 0)
            .unwrap()
    }

    fn sample(name: &str, color: RGBColor, values: &[f64]) -> SeriesSpec {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min) - 0.1;
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 0.1;
        SeriesSpec {
            name: name.to_string(),
            color,
            range: (lo, hi),
            points: values
                .iter()
                .enumerate()
                .map(|(i, v)| (stamp(i as u32 * 15), *v))
                .collect(),
        }
    }

    #[test]
    fn renders_multi_axis_chart_to_png() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let out = dir.path().join("chart.png");
        let series = vec![
            sample("pH", RGBColor(0x1f, 0x77, 0xb4), &[7.0, 7.2, 7.1]),
            sample("µS/cm", RGBColor(0xd6, 0x27, 0x28), &[410.0, 415.0, 409.0]),
            sample("°C", RGBColor(0x2c, 0xa0, 0x2c), &[4.5, 4.6, 4.4]),
        ];

        render_chart(&out, "W4007C04428", &series, &ChartConfig::default())?;

        let meta = std::fs::metadata(&out)?;
        assert!(meta.len() > 0, "png should not be empty");
        Ok(())
    }

    #[test]
    fn renders_single_point_series() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let out = dir.path().join("single.png");
        let series = vec![sample("pH", RGBColor(0x1f, 0x77, 0xb4), &[7.0])];

        render_chart(&out, "single", &series, &ChartConfig::default())?;
        assert!(out.exists());
        Ok(())
    }

    #[test]
    fn refuses_empty_series_list() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("none.png");
        assert!(render_chart(&out, "none", &[], &ChartConfig::default()).is_err());
    }
}
