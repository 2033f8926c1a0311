//! Alignment grid drawn as a group of lines behind canvas content.

use crate::canvas::Canvas;
use crate::color::parse_color;
use crate::shapes::{Group, Line, SerializableColor, Shape, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default distance between grid lines.
pub const DEFAULT_TILE_SIZE: f64 = 1.0;
/// Default grid line color.
pub const DEFAULT_STROKE_COLOR: &str = "green";
/// Default grid line width.
pub const DEFAULT_STROKE_WIDTH: f64 = 0.5;
/// Most lines a single grid may hold.
pub const MAX_GRID_LINES: u64 = 100_000;

/// Grid errors.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("Tile size must be a positive finite number, got {0}")]
    InvalidTileSize(f64),
    #[error("Invalid stroke color: {0}")]
    InvalidColor(String),
    #[error("Grid would need {lines} lines, more than the limit of {max}")]
    TooManyLines { lines: u64, max: u64 },
}

/// Caller-facing grid options. Dimensions always come from the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    /// Distance between lines.
    pub tile_size: f64,
    /// Line color as a CSS color string.
    pub stroke_color: String,
    /// Line width.
    #[serde(alias = "stroke")]
    pub stroke_width: f64,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            stroke_color: DEFAULT_STROKE_COLOR.to_string(),
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

impl GridOptions {
    /// Set the tile size.
    pub fn with_tile_size(mut self, tile_size: f64) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the stroke color.
    pub fn with_stroke_color(mut self, color: impl Into<String>) -> Self {
        self.stroke_color = color.into();
        self
    }

    /// Set the stroke width.
    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }
}

/// Fully resolved description of a generated grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub width: f64,
    pub height: f64,
    pub tile_size: f64,
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
}

impl GridSpec {
    /// Resolve options against a canvas size.
    pub fn resolve(options: &GridOptions, width: f64, height: f64) -> Result<Self, GridError> {
        let tile = options.tile_size;
        if !tile.is_finite() || tile <= 0.0 {
            return Err(GridError::InvalidTileSize(tile));
        }
        let lines = line_count(width, tile).saturating_add(line_count(height, tile));
        if lines > MAX_GRID_LINES {
            return Err(GridError::TooManyLines {
                lines,
                max: MAX_GRID_LINES,
            });
        }
        let stroke_color = parse_color(&options.stroke_color)
            .ok_or_else(|| GridError::InvalidColor(options.stroke_color.clone()))?;
        Ok(Self {
            width,
            height,
            tile_size: options.tile_size,
            stroke_color,
            stroke_width: options.stroke_width,
        })
    }

    /// Whether `other` covers the same canvas area.
    pub fn same_dimensions(&self, other: &GridSpec) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Offsets of the lines crossing an axis of length `extent`.
    ///
    /// Lines sit at `tile, 2*tile, ...` strictly below `extent`.
    fn offsets(&self, extent: f64) -> impl Iterator<Item = f64> + '_ {
        (1u64..)
            .map(move |i| i as f64 * self.tile_size)
            .take_while(move |&offset| offset < extent)
    }

    /// X positions of vertical lines.
    pub fn vertical_offsets(&self) -> Vec<f64> {
        self.offsets(self.width).collect()
    }

    /// Y positions of horizontal lines.
    pub fn horizontal_offsets(&self) -> Vec<f64> {
        self.offsets(self.height).collect()
    }

    /// Build the grid as a single group of line segments.
    pub fn build(&self) -> Group {
        let style = ShapeStyle::stroked(self.stroke_color, self.stroke_width);
        let horizontal = self.offsets(self.height).map(|y| {
            Line::new(Point::new(0.0, y), Point::new(self.width, y)).with_style(style.clone())
        });
        let vertical = self.offsets(self.width).map(|x| {
            Line::new(Point::new(x, 0.0), Point::new(x, self.height)).with_style(style.clone())
        });
        Group::new(horizontal.chain(vertical).map(Shape::Line).collect())
    }
}

/// Number of multiples of `tile` strictly below `extent`.
fn line_count(extent: f64, tile: f64) -> u64 {
    // Float to int casts saturate
    ((extent / tile).ceil() - 1.0).max(0.0) as u64
}

/// What a call to [`GridOverlay::set_visible`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridChange {
    /// A new grid group was generated and inserted.
    Built,
    /// A cached grid group was inserted again.
    Reused,
    /// The grid was already on the canvas and still matches.
    AlreadyVisible,
    /// The grid was removed from the canvas (and kept cached).
    Hidden,
    /// Nothing to hide.
    AlreadyHidden,
}

#[derive(Debug, Clone)]
enum GridState {
    Empty,
    /// Group lives in the canvas document.
    Attached { id: ShapeId, spec: GridSpec },
    /// Group was taken off the canvas and is cached here.
    Detached { group: Group, spec: GridSpec },
}

/// Builds, caches and toggles the alignment grid.
#[derive(Debug, Clone)]
pub struct GridOverlay {
    state: GridState,
}

impl Default for GridOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl GridOverlay {
    /// Create an overlay with no grid built yet.
    pub fn new() -> Self {
        Self {
            state: GridState::Empty,
        }
    }

    /// Whether the grid group is on the canvas.
    pub fn is_visible(&self) -> bool {
        matches!(self.state, GridState::Attached { .. })
    }

    /// Spec of the current (attached or cached) grid.
    pub fn spec(&self) -> Option<&GridSpec> {
        match &self.state {
            GridState::Empty => None,
            GridState::Attached { spec, .. } | GridState::Detached { spec, .. } => Some(spec),
        }
    }

    /// ID of the current (attached or cached) grid group.
    pub fn group_id(&self) -> Option<ShapeId> {
        match &self.state {
            GridState::Empty => None,
            GridState::Attached { id, .. } => Some(*id),
            GridState::Detached { group, .. } => Some(group.id()),
        }
    }

    /// Show or hide the grid on `canvas`.
    ///
    /// Width and height are taken from the canvas. A grid built for other
    /// dimensions is discarded and rebuilt; otherwise the existing group is
    /// reused as is, keeping the style it was built with.
    pub fn set_visible(
        &mut self,
        canvas: &mut Canvas,
        visible: bool,
        options: &GridOptions,
    ) -> Result<GridChange, GridError> {
        if !visible {
            return Ok(self.hide(canvas));
        }

        let wanted = GridSpec::resolve(options, canvas.width(), canvas.height())?;

        let state = std::mem::replace(&mut self.state, GridState::Empty);
        let (next, change) = match state {
            GridState::Attached { id, spec }
                if spec.same_dimensions(&wanted) && canvas.document.contains(id) =>
            {
                (GridState::Attached { id, spec }, GridChange::AlreadyVisible)
            }
            GridState::Detached { group, spec } if spec.same_dimensions(&wanted) => {
                let id = canvas.add_at_back(Shape::Group(group));
                log::debug!("Grid {} re-attached", id);
                (GridState::Attached { id, spec }, GridChange::Reused)
            }
            stale => {
                if let GridState::Attached { id, .. } = stale {
                    canvas.remove(id);
                    log::debug!("Discarded stale grid {}", id);
                }
                let group = wanted.build();
                log::debug!(
                    "Built {}x{} grid with tile {} ({} lines)",
                    wanted.width,
                    wanted.height,
                    wanted.tile_size,
                    group.children().len()
                );
                let id = canvas.add_at_back(Shape::Group(group));
                (GridState::Attached { id, spec: wanted }, GridChange::Built)
            }
        };
        self.state = next;
        Ok(change)
    }

    fn hide(&mut self, canvas: &mut Canvas) -> GridChange {
        let state = std::mem::replace(&mut self.state, GridState::Empty);
        match state {
            GridState::Attached { id, spec } => match canvas.remove(id) {
                Some(Shape::Group(group)) => {
                    self.state = GridState::Detached { group, spec };
                    GridChange::Hidden
                }
                // Removed from the canvas behind our back; nothing left to cache.
                _ => GridChange::AlreadyHidden,
            },
            other => {
                self.state = other;
                GridChange::AlreadyHidden
            }
        }
    }
}
