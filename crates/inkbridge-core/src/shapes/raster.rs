//! Raster image shape holding decoded pixels.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect};
use thiserror::Error;
use uuid::Uuid;

/// Errors constructing a bitmap.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitmapError {
    #[error("Invalid pixel data length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Straight-alpha RGBA8 pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

impl Bitmap {
    /// Create a bitmap from raw RGBA pixels.
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self, BitmapError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(BitmapError::InvalidLength {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get dimensions as (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value at a pixel, if in range.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.pixels[offset..offset + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Take ownership of the pixel data.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

/// A raster image placed on the canvas.
///
/// Position and scale belong to the placement, not the pixels, so swapping
/// the source keeps the image where the user put it.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    /// Horizontal scale applied to the source width.
    pub scale_x: f64,
    /// Vertical scale applied to the source height.
    pub scale_y: f64,
    source: Bitmap,
    /// Style properties (opacity is honoured when compositing).
    pub style: ShapeStyle,
}

impl RasterImage {
    /// Create a raster image at `position` with unit scale.
    pub fn new(position: Point, source: Bitmap) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            scale_x: 1.0,
            scale_y: 1.0,
            source,
            style: ShapeStyle::default(),
        }
    }

    /// The pixels currently displayed.
    pub fn source(&self) -> &Bitmap {
        &self.source
    }

    /// Replace the pixel source, returning the previous one.
    pub fn set_source(&mut self, source: Bitmap) -> Bitmap {
        std::mem::replace(&mut self.source, source)
    }

    /// Displayed width (source width times horizontal scale).
    pub fn width(&self) -> f64 {
        self.source.width() as f64 * self.scale_x
    }

    /// Displayed height (source height times vertical scale).
    pub fn height(&self) -> f64 {
        self.source.height() as f64 * self.scale_y
    }

    /// Get the bounding rectangle.
    pub fn as_rect(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width(), self.height()))
    }
}

impl ShapeTrait for RasterImage {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_rect().inflate(tolerance, tolerance).contains(point)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }
}
