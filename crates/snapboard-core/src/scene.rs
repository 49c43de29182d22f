//! Scene registry: the shapes on the canvas and the container they live in.

use crate::collision::collides;
use crate::geometry;
use crate::shapes::{Pose, Shape, ShapeId};
use crate::snap::clamp_to_container;
use kurbo::{Point, Rect, Size, Vec2};
use std::collections::HashMap;

/// Slack allowed on the container bounds check to absorb float noise from
/// rotated transforms.
const BOUNDS_EPSILON: f64 = 1e-9;

/// All shapes on the canvas plus the container bounds.
///
/// Shapes are keyed by id; `order` records insertion order so scans are
/// deterministic (and gives a stacking order for hit testing).
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// All shapes, keyed by ID.
    shapes: HashMap<ShapeId, Shape>,
    /// Insertion order (back to front).
    order: Vec<ShapeId>,
    /// Container size.
    container: Size,
}

impl Scene {
    /// Create an empty scene. Negative dimensions are treated as zero.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            shapes: HashMap::new(),
            order: Vec::new(),
            container: Size::new(width.max(0.0), height.max(0.0)),
        }
    }

    /// Container size.
    pub fn container(&self) -> Size {
        self.container
    }

    /// Container bounds as a rect anchored at the origin.
    pub fn container_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.container)
    }

    /// Resize the container (e.g. the host view was resized).
    ///
    /// Shapes left sticking out are clamped back inside, in scene order,
    /// unless the clamped pose would overlap a sibling or still not fit.
    /// Returns the shapes that could not be brought back.
    pub fn set_container_size(&mut self, width: f64, height: f64) -> Vec<ShapeId> {
        self.container = Size::new(width.max(0.0), height.max(0.0));
        log::debug!("Container resized to {}x{}", self.container.width, self.container.height);

        let mut stranded = Vec::new();
        for id in self.order.clone() {
            let Some(shape) = self.shapes.get(&id) else {
                continue;
            };
            if !shape.is_collidable() || self.bounds_contain(geometry::aabb(shape)) {
                continue;
            }
            let pose = shape
                .pose
                .at(clamp_to_container(shape, shape.pose, self.container));
            let fits = self.bounds_contain(geometry::aabb_at(shape, pose))
                && !collides(shape, self, pose);
            if fits {
                self.set_pose(id, pose);
            } else {
                log::warn!("Shape {} does not fit the resized container", id);
                stranded.push(id);
            }
        }
        stranded
    }

    /// Add a shape to the scene. Placement is not validated here.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        if !shape.is_collidable() {
            log::warn!("Shape {} has degenerate geometry and will be ignored by collision", id);
        }
        if self.shapes.insert(id, shape).is_none() {
            self.order.push(id);
        }
        log::info!("Added shape {}", id);
        id
    }

    /// Remove a shape from the scene.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        self.order.retain(|&shape_id| shape_id != id);
        let removed = self.shapes.remove(&id);
        if removed.is_some() {
            log::info!("Removed shape {}", id);
        }
        removed
    }

    /// Get a shape by ID.
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    /// Get a mutable reference to a shape by ID.
    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    /// Check if a shape is registered.
    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    /// Shapes in insertion order (back to front).
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Every shape except `id`, in insertion order.
    pub fn siblings(&self, id: ShapeId) -> impl Iterator<Item = &Shape> {
        self.shapes_ordered().filter(move |shape| shape.id() != id)
    }

    /// Topmost shape whose body contains `point`.
    pub fn shape_at_point(&self, point: Point) -> Option<ShapeId> {
        self.order
            .iter()
            .rev()
            .find(|id| self.shapes.get(id).is_some_and(|s| s.hit_test(point)))
            .copied()
    }

    /// Whether `rect` lies inside the container.
    pub fn bounds_contain(&self, rect: Rect) -> bool {
        let outer = self.container_rect().inflate(BOUNDS_EPSILON, BOUNDS_EPSILON);
        geometry::contains_rect(outer, rect)
    }

    /// Replace a shape's pose. Returns false if the shape is unknown.
    pub fn set_pose(&mut self, id: ShapeId, pose: Pose) -> bool {
        match self.shapes.get_mut(&id) {
            Some(shape) => {
                shape.pose = pose;
                true
            }
            None => false,
        }
    }

    /// Replace pose, size and scale in one step. Returns false if the shape
    /// is unknown.
    pub fn set_geometry(&mut self, id: ShapeId, pose: Pose, size: Size, scale: Vec2) -> bool {
        match self.shapes.get_mut(&id) {
            Some(shape) => {
                shape.pose = pose;
                shape.size = size;
                shape.scale = scale;
                true
            }
            None => false,
        }
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Get the number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut scene = Scene::new(800.0, 600.0);
        let id = scene.add_shape(Shape::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(scene.len(), 1);
        assert!(scene.contains(id));
        assert!(scene.remove_shape(id).is_some());
        assert!(scene.is_empty());
        assert!(scene.remove_shape(id).is_none());
    }

    #[test]
    fn test_order_is_insertion_order() {
        let mut scene = Scene::new(800.0, 600.0);
        let a = scene.add_shape(Shape::new(0.0, 0.0, 10.0, 10.0));
        let b = scene.add_shape(Shape::new(20.0, 0.0, 10.0, 10.0));
        let c = scene.add_shape(Shape::new(40.0, 0.0, 10.0, 10.0));
        let ids: Vec<_> = scene.shapes_ordered().map(Shape::id).collect();
        assert_eq!(ids, vec![a, b, c]);
        let siblings: Vec<_> = scene.siblings(b).map(Shape::id).collect();
        assert_eq!(siblings, vec![a, c]);
    }

    #[test]
    fn test_shape_at_point_prefers_topmost() {
        let mut scene = Scene::new(800.0, 600.0);
        let _back = scene.add_shape(Shape::new(0.0, 0.0, 100.0, 100.0));
        let front = scene.add_shape(Shape::new(50.0, 50.0, 100.0, 100.0));
        assert_eq!(scene.shape_at_point(Point::new(75.0, 75.0)), Some(front));
        assert_eq!(scene.shape_at_point(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_set_geometry() {
        let mut scene = Scene::new(800.0, 600.0);
        let id = scene.add_shape(Shape::new(0.0, 0.0, 10.0, 10.0));
        let pose = Pose::new(Point::new(5.0, 5.0), 0.0);
        assert!(scene.set_geometry(id, pose, Size::new(20.0, 30.0), Vec2::new(1.0, 1.0)));
        let shape = scene.get(id).unwrap();
        assert_eq!(shape.pose, pose);
        assert_eq!(shape.size, Size::new(20.0, 30.0));
        assert!(!scene.set_pose(ShapeId::nil(), pose));
    }

    #[test]
    fn test_negative_container_is_clamped() {
        let scene = Scene::new(-10.0, 20.0);
        assert_eq!(scene.container(), Size::new(0.0, 20.0));
    }

    #[test]
    fn test_set_container_size() {
        let mut scene = Scene::new(800.0, 600.0);
        let rect = Rect::new(700.0, 500.0, 800.0, 600.0);
        assert!(scene.bounds_contain(rect));
        scene.set_container_size(400.0, 300.0);
        assert_eq!(scene.container_rect(), Rect::new(0.0, 0.0, 400.0, 300.0));
        assert!(!scene.bounds_contain(rect));
    }

    #[test]
    fn test_shrinking_container_pulls_shapes_inside() {
        let mut scene = Scene::new(800.0, 600.0);
        let a = scene.add_shape(Shape::new(600.0, 400.0, 100.0, 100.0));
        let b = scene.add_shape(Shape::new(100.0, 100.0, 50.0, 50.0));
        let stranded = scene.set_container_size(500.0, 450.0);
        assert!(stranded.is_empty());
        assert_eq!(scene.get(a).unwrap().pose.position, Point::new(400.0, 350.0));
        assert_eq!(scene.get(b).unwrap().pose.position, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_shrinking_container_reports_blocked_shapes() {
        let mut scene = Scene::new(800.0, 600.0);
        let blocker = scene.add_shape(Shape::new(350.0, 200.0, 150.0, 100.0));
        let a = scene.add_shape(Shape::new(600.0, 200.0, 100.0, 100.0));
        let big = scene.add_shape(Shape::new(0.0, 200.0, 200.0, 350.0));
        let stranded = scene.set_container_size(500.0, 300.0);
        assert_eq!(stranded, vec![a, big]);
        // Blocked shapes stay where they were.
        assert_eq!(scene.get(a).unwrap().pose.position, Point::new(600.0, 200.0));
        assert_eq!(scene.get(blocker).unwrap().pose.position, Point::new(350.0, 200.0));
    }
}
