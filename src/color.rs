use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Histogram colours
// ---------------------------------------------------------------------------

/// Opacity of the histogram bars over the white background.
pub const BAR_ALPHA: f32 = 0.75;

/// Green bars, pre-blended onto white so the bitmap stays opaque.
pub fn bar_fill() -> RGBColor {
    over_white(Hsl::new(120.0_f32, 1.0, 0.25), BAR_ALPHA)
}

/// Red for the fitted normal curve.
pub fn curve_stroke() -> RGBColor {
    let red: Hsl = Hsl::new(0.0_f32, 1.0, 0.5);
    to_rgb(red.into_color())
}

/// Light grey for grid lines.
pub fn grid_line() -> RGBColor {
    over_white(Hsl::new(0.0_f32, 0.0, 0.0), 0.15)
}

/// Composite `color` with the given opacity onto a white background.
/// Blending happens in linear light.
pub fn over_white(color: Hsl, alpha: f32) -> RGBColor {
    let fg: Srgb = color.into_color();
    let fg: LinSrgb = fg.into_linear();
    let white = LinSrgb::new(1.0, 1.0, 1.0);
    to_rgb(Srgb::from_linear(white.mix(fg, alpha.clamp(0.0, 1.0))))
}

fn to_rgb(c: Srgb) -> RGBColor {
    let c: Srgb<u8> = c.into_format();
    RGBColor(c.red, c.green, c.blue)
}
