//! InkBridge Core Library
//!
//! Canvas object model for InkBridge: shapes, the z-ordered canvas document,
//! the alignment grid overlay and keyboard input.

pub mod canvas;
pub mod color;
pub mod grid;
pub mod input;
pub mod shapes;

pub use canvas::{Canvas, CanvasDocument, CanvasOptions};
pub use color::parse_color;
pub use grid::{GridChange, GridError, GridOptions, GridOverlay, GridSpec};
pub use input::{InputState, KeyEvent};
pub use shapes::{Bitmap, BitmapError, RasterImage, Shape, ShapeId, ShapeTrait};
