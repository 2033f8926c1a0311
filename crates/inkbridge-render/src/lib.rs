//! InkBridge Render Library
//!
//! Renderer abstraction plus a tiny-skia compositor that flattens a canvas
//! into a bitmap, and PNG / `data:` URL encoding for bitmaps.

pub mod encode;
mod renderer;
mod skia_impl;

pub use encode::{data_url, encode_png, png_data_url, PNG_MIME};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use skia_impl::{SkiaRenderer, bitmap_to_pixmap, pixmap_to_bitmap};
