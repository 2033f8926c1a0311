//! SVG rasterization with resvg.

use inkbridge_core::shapes::Bitmap;
use tiny_skia::{Pixmap, Transform};

use crate::error::{SvgError, SvgResult};

/// Largest raster, in pixels, that [`rasterize`] will allocate (256 MiB of RGBA).
pub const MAX_RASTER_PIXELS: u64 = 8192 * 8192;

/// Parse SVG text into a usvg render tree.
pub fn parse_document(text: &str) -> SvgResult<usvg::Tree> {
    let options = usvg::Options::default();
    usvg::Tree::from_str(text, &options).map_err(|e| SvgError::Parse(e.to_string()))
}

/// Render `tree` scaled to exactly `width` x `height` pixels.
pub fn rasterize(tree: &usvg::Tree, width: u32, height: u32) -> SvgResult<Bitmap> {
    if width == 0 || height == 0 {
        return Err(SvgError::Rasterize(format!(
            "Cannot rasterize to {}x{}",
            width, height
        )));
    }
    if u64::from(width) * u64::from(height) > MAX_RASTER_PIXELS {
        return Err(SvgError::Rasterize(format!(
            "{}x{} exceeds the {} pixel raster limit",
            width, height, MAX_RASTER_PIXELS
        )));
    }
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        SvgError::Rasterize(format!("Cannot allocate {}x{} pixmap", width, height))
    })?;

    let size = tree.size();
    let transform = Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(tree, transform, &mut pixmap.as_mut());

    inkbridge_render::pixmap_to_bitmap(&pixmap).map_err(|e| SvgError::Rasterize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
        <rect x="0" y="0" width="5" height="10" fill="#ff0000"/>
    </svg>"##;

    #[test]
    fn test_rasterize_natural_size() {
        let tree = parse_document(SQUARE).unwrap();
        let bitmap = rasterize(&tree, 10, 10).unwrap();
        assert_eq!(bitmap.dimensions(), (10, 10));
        assert_eq!(bitmap.pixel(2, 5), Some([255, 0, 0, 255]));
        assert_eq!(bitmap.pixel(8, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_rasterize_scales_to_target() {
        let tree = parse_document(SQUARE).unwrap();
        let bitmap = rasterize(&tree, 20, 20).unwrap();
        assert_eq!(bitmap.pixel(8, 10), Some([255, 0, 0, 255]));
        assert_eq!(bitmap.pixel(14, 10), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_rasterize_zero_size_fails() {
        let tree = parse_document(SQUARE).unwrap();
        assert!(matches!(rasterize(&tree, 0, 10), Err(SvgError::Rasterize(_))));
    }

    #[test]
    fn test_rasterize_rejects_oversized_target() {
        let tree = parse_document(SQUARE).unwrap();
        assert!(matches!(rasterize(&tree, 100_000, 100_000), Err(SvgError::Rasterize(_))));
        assert!(matches!(rasterize(&tree, 8193, 8192), Err(SvgError::Rasterize(_))));
        assert!(matches!(rasterize(&tree, u32::MAX, 1), Err(SvgError::Rasterize(_))));
    }

    #[test]
    fn test_parse_document_rejects_garbage() {
        assert!(matches!(parse_document("not svg"), Err(SvgError::Parse(_))));
    }
}
