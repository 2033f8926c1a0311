//! Canvas document and state management.

use crate::color::parse_color;
use crate::shapes::{SerializableColor, Shape, ShapeId};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The shapes on a canvas, in z-order.
#[derive(Debug, Clone)]
pub struct CanvasDocument {
    /// Unique document identifier.
    pub id: String,
    /// All shapes in the document, keyed by ID.
    shapes: HashMap<ShapeId, Shape>,
    /// Z-order of shapes (back to front).
    z_order: Vec<ShapeId>,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            shapes: HashMap::new(),
            z_order: Vec::new(),
        }
    }

    /// Add a shape on top of everything else.
    pub fn add_shape(&mut self, shape: Shape) {
        let id = shape.id();
        self.z_order.retain(|&shape_id| shape_id != id);
        self.z_order.push(id);
        self.shapes.insert(id, shape);
    }

    /// Add a shape behind everything else.
    pub fn insert_at_back(&mut self, shape: Shape) {
        let id = shape.id();
        self.z_order.retain(|&shape_id| shape_id != id);
        self.z_order.insert(0, id);
        self.shapes.insert(id, shape);
    }

    /// Remove a shape from the document.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        self.z_order.retain(|&shape_id| shape_id != id);
        self.shapes.remove(&id)
    }

    /// Check whether a shape is in the document.
    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    /// Get a shape by ID.
    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    /// Get a mutable reference to a shape by ID.
    pub fn get_shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    /// Get shapes in z-order (back to front).
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Z-order of shapes (back to front).
    pub fn z_order(&self) -> &[ShapeId] {
        &self.z_order
    }

    /// Find shapes at a point, front to back.
    pub fn shapes_at_point(&self, point: Point, tolerance: f64) -> Vec<ShapeId> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|&id| {
                self.shapes
                    .get(&id)
                    .filter(|s| s.hit_test(point, tolerance))
                    .map(|_| id)
            })
            .collect()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Get the number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }
}

/// Options used when constructing a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasOptions {
    /// Name of the canvas (the element id in a browser host).
    pub name: String,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Background color as a CSS color string.
    pub background: String,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            name: "canvas".to_string(),
            width: 800.0,
            height: 600.0,
            background: "white".to_string(),
        }
    }
}

/// Runtime canvas state.
#[derive(Debug, Clone)]
pub struct Canvas {
    /// Canvas name.
    pub name: String,
    /// The shapes being displayed.
    pub document: CanvasDocument,
    /// Background fill.
    pub background: SerializableColor,
    size: Size,
    focused: bool,
    /// Bumped each time a full redraw is requested.
    render_generation: u64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a new canvas with default options.
    pub fn new() -> Self {
        Self::with_options(&CanvasOptions::default())
    }

    /// Create a canvas from options.
    ///
    /// An unparsable background falls back to white.
    pub fn with_options(options: &CanvasOptions) -> Self {
        let background = parse_color(&options.background).unwrap_or_else(|| {
            log::warn!("Unknown canvas background {:?}, using white", options.background);
            SerializableColor::white()
        });
        Self {
            name: options.name.clone(),
            document: CanvasDocument::new(),
            background,
            size: Size::new(options.width.max(0.0), options.height.max(0.0)),
            focused: false,
            render_generation: 0,
        }
    }

    /// Current size of the canvas.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Current width of the canvas.
    pub fn width(&self) -> f64 {
        self.size.width
    }

    /// Current height of the canvas.
    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// Resize the canvas and request a redraw.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.size = Size::new(width.max(0.0), height.max(0.0));
        self.request_render_all();
    }

    /// Whether the canvas has keyboard focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Set keyboard focus.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Mark the whole canvas as needing a redraw.
    pub fn request_render_all(&mut self) {
        self.render_generation = self.render_generation.wrapping_add(1);
    }

    /// Number of full redraws requested so far.
    pub fn render_generation(&self) -> u64 {
        self.render_generation
    }

    /// Add a shape on top and request a redraw.
    pub fn add(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.document.add_shape(shape);
        self.request_render_all();
        id
    }

    /// Add a shape behind all others and request a redraw.
    pub fn add_at_back(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.document.insert_at_back(shape);
        self.request_render_all();
        id
    }

    /// Remove a shape and request a redraw if it was present.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let removed = self.document.remove_shape(id);
        if removed.is_some() {
            self.request_render_all();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Line, ShapeTrait};

    fn line(x: f64) -> Line {
        Line::new(Point::new(x, 0.0), Point::new(x, 100.0))
    }

    #[test]
    fn test_document_creation() {
        let doc = CanvasDocument::new();
        assert!(doc.is_empty());
        assert!(doc.z_order().is_empty());
    }

    #[test]
    fn test_add_and_remove_shape() {
        let mut doc = CanvasDocument::new();
        let l = line(0.0);
        let id = l.id();

        doc.add_shape(Shape::Line(l));
        assert_eq!(doc.len(), 1);
        assert!(doc.contains(id));

        assert!(doc.remove_shape(id).is_some());
        assert!(doc.is_empty());
        assert!(doc.z_order().is_empty());
    }

    #[test]
    fn test_re_adding_does_not_duplicate_z_entry() {
        let mut doc = CanvasDocument::new();
        let l = line(0.0);
        let id = l.id();

        doc.add_shape(Shape::Line(l.clone()));
        doc.add_shape(Shape::Line(l));
        assert_eq!(doc.z_order(), &[id]);
    }

    #[test]
    fn test_z_order() {
        let mut doc = CanvasDocument::new();
        let l1 = line(0.0);
        let l2 = line(10.0);
        let l3 = line(20.0);
        let (id1, id2, id3) = (l1.id(), l2.id(), l3.id());

        doc.add_shape(Shape::Line(l1));
        doc.add_shape(Shape::Line(l2));
        doc.insert_at_back(Shape::Line(l3));
        assert_eq!(doc.z_order(), &[id3, id1, id2]);

        // Re-adding an existing shape moves it to the front
        let again = doc.remove_shape(id3).unwrap();
        doc.add_shape(again);
        assert_eq!(doc.z_order(), &[id1, id2, id3]);
        let ordered: Vec<_> = doc.shapes_ordered().map(Shape::id).collect();
        assert_eq!(ordered, vec![id1, id2, id3]);
    }

    #[test]
    fn test_shapes_at_point_front_first() {
        let mut doc = CanvasDocument::new();
        let l1 = line(0.0);
        let l2 = line(0.0);
        let (id1, id2) = (l1.id(), l2.id());
        doc.add_shape(Shape::Line(l1));
        doc.add_shape(Shape::Line(l2));

        let hits = doc.shapes_at_point(Point::new(0.0, 50.0), 0.0);
        assert_eq!(hits, vec![id2, id1]);
        assert!(doc.shapes_at_point(Point::new(50.0, 50.0), 0.0).is_empty());
    }

    #[test]
    fn test_canvas_options() {
        let canvas = Canvas::with_options(&CanvasOptions {
            name: "c".to_string(),
            width: 320.0,
            height: 240.0,
            background: "#000".to_string(),
        });
        assert_eq!(canvas.size(), Size::new(320.0, 240.0));
        assert_eq!(canvas.background, SerializableColor::black());
    }

    #[test]
    fn test_unknown_background_falls_back_to_white() {
        let canvas = Canvas::with_options(&CanvasOptions {
            background: "not-a-color".to_string(),
            ..CanvasOptions::default()
        });
        assert_eq!(canvas.background, SerializableColor::white());
    }

    #[test]
    fn test_mutations_request_render() {
        let mut canvas = Canvas::new();
        let start = canvas.render_generation();

        let id = canvas.add(Shape::Line(line(0.0)));
        assert_eq!(canvas.render_generation(), start + 1);

        canvas.remove(id);
        assert_eq!(canvas.render_generation(), start + 2);

        // Removing an absent shape is not a change
        canvas.remove(id);
        assert_eq!(canvas.render_generation(), start + 2);

        canvas.set_size(10.0, 10.0);
        assert_eq!(canvas.render_generation(), start + 3);
    }

    #[test]
    fn test_focus() {
        let mut canvas = Canvas::new();
        assert!(!canvas.is_focused());
        canvas.set_focused(true);
        assert!(canvas.is_focused());
    }
}
