//! Group shape for combining multiple shapes.

use super::{Shape, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect};
use uuid::Uuid;

/// A group of shapes that can be manipulated as a single unit.
/// Groups can contain other groups, enabling nested hierarchies.
#[derive(Debug, Clone)]
pub struct Group {
    pub(crate) id: ShapeId,
    /// Child shapes in this group.
    pub children: Vec<Shape>,
    /// Style properties (not directly used, but kept for consistency).
    style: ShapeStyle,
}

impl Group {
    /// Create a new group from a list of shapes.
    pub fn new(children: Vec<Shape>) -> Self {
        Self {
            id: Uuid::new_v4(),
            children,
            style: ShapeStyle::default(),
        }
    }

    /// Get the children of this group.
    pub fn children(&self) -> &[Shape] {
        &self.children
    }

}

impl ShapeTrait for Group {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let mut iter = self.children.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(first.bounds(), |acc, child| acc.union(child.bounds()))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.children.iter().any(|child| child.hit_test(point, tolerance))
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Line;

    fn two_lines() -> (Line, Line) {
        (
            Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0)),
            Line::new(Point::new(0.0, 50.0), Point::new(0.0, 300.0)),
        )
    }

    #[test]
    fn test_group_creation() {
        let (a, b) = two_lines();
        let group = Group::new(vec![Shape::Line(a), Shape::Line(b)]);
        assert_eq!(group.children().len(), 2);
    }

    #[test]
    fn test_group_bounds() {
        let (a, b) = two_lines();
        let group = Group::new(vec![Shape::Line(a), Shape::Line(b)]);
        let bounds = group.bounds();

        assert!((bounds.x0 - 0.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 0.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_group_bounds() {
        assert_eq!(Group::new(Vec::new()).bounds(), Rect::ZERO);
    }

    #[test]
    fn test_group_hit_test() {
        let (a, b) = two_lines();
        let group = Group::new(vec![Shape::Line(a), Shape::Line(b)]);

        assert!(group.hit_test(Point::new(50.0, 0.0), 0.0));
        assert!(group.hit_test(Point::new(0.0, 200.0), 0.0));
        assert!(!group.hit_test(Point::new(50.0, 100.0), 0.0));
    }

    #[test]
    fn test_nested_group_hit_test() {
        let (a, b) = two_lines();
        let inner = Group::new(vec![Shape::Line(b)]);
        let outer = Group::new(vec![Shape::Group(inner), Shape::Line(a)]);

        assert!(outer.hit_test(Point::new(0.0, 250.0), 0.0));
        assert_eq!(outer.bounds(), Rect::new(0.0, 0.0, 100.0, 300.0));
    }
}
