//! InkBridge Application
//!
//! The `InkBridge` facade: loads SVG images, keeps a raster mirror of each
//! one on the canvas, and toggles the alignment grid.

mod bridge;
mod config;
mod error;
mod facade;

pub use bridge::{CanvasBridge, SyncOutcome};
pub use config::{BridgeConfig, ConfigError};
pub use error::{BridgeError, BridgeResult};
pub use facade::{InkBridge, KeyHandler};

pub use inkbridge_core::{CanvasOptions, GridChange, GridOptions, KeyEvent};
pub use inkbridge_svg::{ImageId, SvgTree, VectorImage};
