//! SVG error types

use std::io;
use thiserror::Error;

/// Errors that can occur when loading, editing or rasterizing SVG images
#[derive(Error, Debug)]
pub enum SvgError {
    /// IO error when reading a local source
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The document is not well-formed or not renderable SVG
    #[error("SVG parsing error: {0}")]
    Parse(String),

    /// The URL could not be resolved to any source
    #[error("Load error: {0}")]
    Load(String),

    /// Remote fetch failed or is unavailable
    #[error("Network error: {0}")]
    Network(String),

    /// Rasterization failed
    #[error("Rasterize error: {0}")]
    Rasterize(String),

    /// Encoding the raster snapshot failed
    #[error("Encode error: {0}")]
    Encode(String),
}

/// Result type for SVG operations
pub type SvgResult<T> = Result<T, SvgError>;
