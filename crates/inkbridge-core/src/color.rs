//! CSS color string parsing.

use peniko::color::{Srgb, parse_color as parse_css_color};

use crate::shapes::SerializableColor;

/// Parse a CSS color string.
///
/// Accepts anything CSS Color 4 does: named colors, `transparent`, hex
/// notation and the functional forms (`rgb()`, `hsl()`, `oklch()`, ...).
/// Returns `None` for anything else.
pub fn parse_color(color: &str) -> Option<SerializableColor> {
    let parsed = parse_css_color(&color.trim().to_ascii_lowercase()).ok()?;
    let rgba = parsed.to_alpha_color::<Srgb>().to_rgba8();
    Some(SerializableColor::new(rgba.r, rgba.g, rgba.b, rgba.a))
}
