//! Image-to-mirror bookkeeping.
//!
//! Every [`VectorImage`] synced through the bridge gets at most one raster
//! mirror on the canvas. Later syncs swap the mirror's pixels in place.

use std::collections::HashMap;

use inkbridge_core::shapes::{RasterImage, Shape, ShapeId};
use inkbridge_core::Canvas;
use inkbridge_svg::{ImageId, VectorImage};
use kurbo::Point;

use crate::error::BridgeResult;

/// What [`CanvasBridge::sync`] did with the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new mirror was added to the canvas.
    Inserted(ShapeId),
    /// The existing mirror got new pixels.
    Replaced(ShapeId),
}

impl SyncOutcome {
    /// The mirror's shape ID.
    pub fn shape_id(&self) -> ShapeId {
        match self {
            SyncOutcome::Inserted(id) | SyncOutcome::Replaced(id) => *id,
        }
    }
}

/// Owns the canvas and the image-to-mirror table.
#[derive(Debug)]
pub struct CanvasBridge {
    canvas: Canvas,
    mirrors: HashMap<ImageId, ShapeId>,
}

impl CanvasBridge {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            mirrors: HashMap::new(),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Rasterize `image` and insert or refresh its mirror.
    ///
    /// On error neither the canvas nor the table is touched.
    pub fn sync(&mut self, image: &VectorImage) -> BridgeResult<SyncOutcome> {
        let bitmap = image.to_raster()?;
        let image_id = image.id();

        if let Some(shape_id) = self.mirrors.get(&image_id).copied() {
            if let Some(Shape::Raster(mirror)) = self.canvas.document.get_shape_mut(shape_id) {
                mirror.set_source(bitmap);
                self.canvas.request_render_all();
                log::debug!("Replaced mirror {} of image {}", shape_id, image_id);
                return Ok(SyncOutcome::Replaced(shape_id));
            }
            log::debug!(
                "Mirror {} of image {} left the canvas, inserting a new one",
                shape_id,
                image_id
            );
            self.mirrors.remove(&image_id);
        }

        let shape_id = self
            .canvas
            .add(Shape::Raster(RasterImage::new(Point::ZERO, bitmap)));
        self.mirrors.insert(image_id, shape_id);
        log::debug!("Inserted mirror {} for image {}", shape_id, image_id);
        Ok(SyncOutcome::Inserted(shape_id))
    }

    /// [`sync`](Self::sync), then hand the mirror to `on_done`.
    ///
    /// `on_done` only runs when the sync succeeded.
    pub fn sync_then<F>(&mut self, image: &VectorImage, on_done: F) -> BridgeResult<SyncOutcome>
    where
        F: FnOnce(&mut RasterImage),
    {
        let outcome = self.sync(image)?;
        if let Some(mirror) = self.mirror_mut(image.id()) {
            on_done(mirror);
        }
        Ok(outcome)
    }

    /// Take the mirror off the canvas and forget the mapping.
    pub fn remove(&mut self, image_id: ImageId) -> Option<Shape> {
        let shape_id = self.mirrors.remove(&image_id)?;
        let removed = self.canvas.remove(shape_id);
        log::debug!("Removed mirror {} of image {}", shape_id, image_id);
        removed
    }

    /// Shape ID of the mirror for `image_id`.
    pub fn mirror_id(&self, image_id: ImageId) -> Option<ShapeId> {
        self.mirrors.get(&image_id).copied()
    }

    /// The mirror for `image_id`, if it is still on the canvas.
    pub fn mirror(&self, image_id: ImageId) -> Option<&RasterImage> {
        let shape_id = self.mirror_id(image_id)?;
        self.canvas.document.get_shape(shape_id)?.as_raster()
    }

    /// Mutable mirror, e.g. to move or scale it.
    pub fn mirror_mut(&mut self, image_id: ImageId) -> Option<&mut RasterImage> {
        let shape_id = self.mirror_id(image_id)?;
        self.canvas.document.get_shape_mut(shape_id)?.as_raster_mut()
    }

    /// Which image a canvas shape mirrors.
    pub fn image_for(&self, shape_id: ShapeId) -> Option<ImageId> {
        self.mirrors
            .iter()
            .find(|(_, mirror)| **mirror == shape_id)
            .map(|(image, _)| *image)
    }

    /// Number of mapped images.
    pub fn len(&self) -> usize {
        self.mirrors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }
}
