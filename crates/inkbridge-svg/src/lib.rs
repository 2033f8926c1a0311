//! InkBridge SVG Library
//!
//! Loading SVG from URLs, an editable element tree, and rasterization of
//! the document into canvas bitmaps.

mod error;
mod image;
pub mod loader;
mod rasterize;
mod size;
pub mod tree;

pub use error::{SvgError, SvgResult};
pub use image::{ImageId, VectorImage};
pub use loader::{BoxFuture, DefaultLoader, MemoryLoader, SourceLoader, decode_data_url};
pub use rasterize::{MAX_RASTER_PIXELS, parse_document, rasterize};
pub use size::{parse_length, parse_view_box};
pub use tree::{SvgElement, SvgNode, SvgTree};
