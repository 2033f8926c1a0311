//! PNG encoding and `data:` URL helpers.

use crate::renderer::{RenderResult, RendererError};
use base64::{Engine, engine::general_purpose::STANDARD};
use inkbridge_core::shapes::Bitmap;

/// MIME type of encoded snapshots.
pub const PNG_MIME: &str = "image/png";

/// Encode a bitmap as an RGBA8 PNG.
pub fn encode_png(bitmap: &Bitmap) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, bitmap.width(), bitmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RendererError::Encode(e.to_string()))?;
        writer
            .write_image_data(bitmap.pixels())
            .map_err(|e| RendererError::Encode(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| RendererError::Encode(e.to_string()))?;
    }
    Ok(png_data)
}

/// Wrap bytes in a base64 `data:` URL.
pub fn data_url(mime: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}

/// Encode a bitmap as a `data:image/png;base64,...` URL.
pub fn png_data_url(bitmap: &Bitmap) -> RenderResult<String> {
    Ok(data_url(PNG_MIME, &encode_png(bitmap)?))
}
