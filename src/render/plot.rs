use std::error::Error;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use log::{debug, warn};
use plotters::backend::BitMapBackend;
use plotters::chart::ChartBuilder;
use plotters::drawing::IntoDrawingArea;
use plotters::element::Rectangle;
use plotters::series::DashedLineSeries;
use plotters::style::colors::WHITE;
use plotters::style::{Color, FontStyle, IntoFont};
use serde::{Deserialize, Serialize};

use super::histogram::{ChartLabels, Histogram, NormalFit};
use crate::color;
use crate::config::RenderConfig;
use crate::data::parameter::Parameter;
use crate::error::RenderError;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

// ---------------------------------------------------------------------------
// RenderSpec / PlotArtifact
// ---------------------------------------------------------------------------

/// Display parameters for one histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSpec {
    pub primary: String,
    pub secondary: String,
    /// Unit suffix for the x axis, e.g. `(°C)`.
    pub units: String,
    /// Overlay a fitted normal density.
    pub norm_curve: bool,
    pub width: u32,
    pub height: u32,
}

impl RenderSpec {
    /// A spec at the default image size; see [`RenderSpec::with_size`].
    pub fn new(primary: &str, secondary: &str, parameter: Parameter, norm_curve: bool) -> Self {
        let (width, height) = RenderConfig::default().size();
        Self {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
            units: parameter.units().to_string(),
            norm_curve,
            width,
            height,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Chart text for a series of `count` values.
    pub fn labels(&self, count: usize) -> ChartLabels {
        ChartLabels::new(&self.primary, &self.secondary, &self.units, count, self.norm_curve)
    }
}

/// An encoded PNG image.
#[derive(Clone, PartialEq, Eq)]
pub struct PlotArtifact(Vec<u8>);

impl PlotArtifact {
    /// Wrap bytes that are expected to hold a PNG; see [`PlotArtifact::is_png`].
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the buffer starts with the PNG file signature.
    pub fn is_png(&self) -> bool {
        self.0.starts_with(&PNG_SIGNATURE)
    }
}

impl std::fmt::Debug for PlotArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PlotArtifact({} bytes)", self.0.len())
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Draw the difference histogram for `series` and encode it as PNG.
///
/// Empty and constant series render as degenerate but valid images. When the
/// normal curve is requested but the series has no spread, the curve is left
/// out. If the bold title face is unavailable the title is drawn in the
/// regular face; if no text can be drawn at all, the chart is redrawn without
/// labels rather than failing.
pub fn render(series: &[f64], spec: &RenderSpec) -> Result<PlotArtifact, RenderError> {
    if spec.width == 0 || spec.height == 0 {
        return Err(RenderError::Draw(format!(
            "invalid image size {}x{}",
            spec.width, spec.height
        )));
    }

    let hist = Histogram::from_values(series);
    let fit = if spec.norm_curve {
        let fit = NormalFit::from_values(series);
        if fit.is_none() {
            warn!(
                "no spread in {} values, skipping normal curve",
                series.len()
            );
        }
        fit
    } else {
        None
    };
    let labels = spec.labels(series.len());
    let size = (spec.width, spec.height);

    let mut pixels = vec![0u8; spec.width as usize * spec.height as usize * 3];
    let lettering = draw_with_fallback(&mut pixels, |pixels, lettering| {
        draw_chart(pixels, size, &labels, lettering, &hist, fit.as_ref(), spec.norm_curve)
    })?;

    let artifact = encode_png(&pixels, spec.width, spec.height)?;
    debug!(
        "rendered '{}' ({} values, {} bytes, {lettering:?})",
        labels.title,
        series.len(),
        artifact.len()
    );
    Ok(artifact)
}

/// How much text a drawing attempt puts on the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lettering {
    BoldTitle,
    PlainTitle,
    Bare,
}

impl Lettering {
    /// Tried in order until one draws.
    const ATTEMPTS: [Lettering; 3] = [Lettering::BoldTitle, Lettering::PlainTitle, Lettering::Bare];
}

/// Run `draw` with less and less text until it succeeds, clearing the buffer
/// between attempts.
fn draw_with_fallback<F>(pixels: &mut [u8], mut draw: F) -> Result<Lettering, RenderError>
where
    F: FnMut(&mut [u8], Lettering) -> Result<(), Box<dyn Error>>,
{
    let mut failure = String::new();
    for lettering in Lettering::ATTEMPTS {
        pixels.fill(0);
        match draw(pixels, lettering) {
            Ok(()) => return Ok(lettering),
            Err(err) => {
                warn!("{lettering:?} chart failed: {err}");
                failure = err.to_string();
            }
        }
    }
    Err(RenderError::Draw(failure))
}

fn draw_chart(
    pixels: &mut [u8],
    size: (u32, u32),
    text: &ChartLabels,
    lettering: Lettering,
    hist: &Histogram,
    fit: Option<&NormalFit>,
    density: bool,
) -> Result<(), Box<dyn Error>> {
    let bars = hist.bars(density);
    let curve = fit.map(|f| f.curve(&hist.edges)).unwrap_or_default();

    let y_top = bars
        .iter()
        .map(|&(_, _, h)| h)
        .chain(curve.iter().map(|&(_, y)| y))
        .fold(0.0, f64::max);
    let y_max = if y_top > 0.0 { y_top * 1.05 } else { 1.0 };

    let root = BitMapBackend::with_buffer(pixels, size).into_drawing_area();
    root.fill(&WHITE)?;

    let labels = (lettering != Lettering::Bare).then_some(text);
    let area = match lettering {
        Lettering::BoldTitle => {
            root.titled(&text.title, ("sans-serif", 18).into_font().style(FontStyle::Bold))?
        }
        Lettering::PlainTitle => root.titled(&text.title, ("sans-serif", 18))?,
        Lettering::Bare => root.clone(),
    };

    let mut builder = ChartBuilder::on(&area);
    builder.margin(12);
    if let Some(l) = labels {
        builder
            .caption(&l.subtitle, ("sans-serif", 14))
            .x_label_area_size(40)
            .y_label_area_size(64);
    }
    let mut chart = builder.build_cartesian_2d(hist.range(), 0.0..y_max)?;

    if let Some(l) = labels {
        chart
            .configure_mesh()
            .x_desc(l.x_label.as_str())
            .y_desc(l.y_label.as_str())
            .bold_line_style(&color::grid_line())
            .light_line_style(&WHITE)
            .label_style(("sans-serif", 12))
            .draw()?;
    }

    let fill = color::bar_fill();
    chart.draw_series(
        bars.iter()
            .map(|&(left, right, h)| Rectangle::new([(left, 0.0), (right, h)], fill.filled())),
    )?;

    if !curve.is_empty() {
        chart.draw_series(DashedLineSeries::new(
            curve,
            6,
            4,
            color::curve_stroke().stroke_width(1),
        ))?;
    }

    root.present()?;
    Ok(())
}

fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<PlotArtifact, RenderError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(pixels, width, height, ExtendedColorType::Rgb8)?;
    Ok(PlotArtifact(png))
}
