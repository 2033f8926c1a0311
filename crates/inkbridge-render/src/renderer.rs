//! Renderer trait abstraction.

use inkbridge_core::canvas::Canvas;
use inkbridge_core::shapes::{Bitmap, ShapeId};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render pass.
pub struct RenderContext<'a> {
    /// The canvas to render.
    pub canvas: &'a Canvas,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Background color.
    pub background_color: Color,
    /// Shapes to leave out of this pass.
    pub hidden: Vec<ShapeId>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context using the canvas background.
    pub fn new(canvas: &'a Canvas) -> Self {
        Self {
            canvas,
            scale_factor: 1.0,
            background_color: canvas.background.into(),
            hidden: Vec::new(),
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Skip a shape in this pass.
    pub fn with_hidden(mut self, id: ShapeId) -> Self {
        self.hidden.push(id);
        self
    }

    /// Output size in device pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let size = self.canvas.size();
        (
            (size.width * self.scale_factor).ceil().max(0.0) as u32,
            (size.height * self.scale_factor).ceil().max(0.0) as u32,
        )
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Composite the canvas into a straight-alpha bitmap.
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<Bitmap>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
