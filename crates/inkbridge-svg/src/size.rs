//! Length and `viewBox` parsing for the root element's declared size.

/// Absolute units in CSS pixels per unit. Percentages and font-relative
/// units have no fixed size and are rejected.
const UNITS: &[(&str, f64)] = &[
    ("px", 1.0),
    ("pt", 4.0 / 3.0),
    ("pc", 16.0),
    ("in", 96.0),
    ("cm", 96.0 / 2.54),
    ("mm", 96.0 / 25.4),
];

/// Parse an SVG length such as `120`, `12.5px` or `2in` into pixels.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let (number, factor) = UNITS
        .iter()
        .find_map(|(suffix, factor)| value.strip_suffix(suffix).map(|n| (n, *factor)))
        .unwrap_or((value, 1.0));
    let number: f64 = number.trim_end().parse().ok()?;
    let px = number * factor;
    px.is_finite().then_some(px)
}

/// Parse a `viewBox` value into (min-x, min-y, width, height).
pub fn parse_view_box(value: &str) -> Option<(f64, f64, f64, f64)> {
    let mut parts = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse::<f64>);
    let mut next = || parts.next()?.ok();
    let view_box = (next()?, next()?, next()?, next()?);
    if parts.next().is_some() {
        return None;
    }
    Some(view_box)
}
