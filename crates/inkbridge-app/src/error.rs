//! Facade error types.

use inkbridge_core::GridError;
use inkbridge_render::RendererError;
use inkbridge_svg::SvgError;
use thiserror::Error;

/// Errors surfaced by [`InkBridge`](crate::InkBridge) and
/// [`CanvasBridge`](crate::CanvasBridge).
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Svg(#[from] SvgError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Render(#[from] RendererError),
}

/// Result type for facade operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
