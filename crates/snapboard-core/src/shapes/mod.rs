//! Shape definitions for the canvas.
//!
//! Every shape is a rectangle body placed by a [`Pose`]. The body lives in
//! the shape's local frame with its top-left corner at the local origin;
//! [`Shape::affine`] maps it into container coordinates.

mod draft;

pub use draft::DraftShape;

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Placement of a shape's local frame in the container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Origin of the local frame (the body's unrotated top-left corner).
    pub position: Point,
    /// Rotation about `position`, in radians.
    pub rotation: f64,
}

impl Pose {
    /// Create a pose.
    pub fn new(position: Point, rotation: f64) -> Self {
        Self { position, rotation }
    }

    /// The same pose moved to another origin.
    pub fn at(self, position: Point) -> Self {
        Self { position, ..self }
    }

    /// The same pose translated by `delta`.
    pub fn translated(self, delta: Vec2) -> Self {
        Self {
            position: self.position + delta,
            ..self
        }
    }

    /// Whether the pose has no rotation (modulo a full turn).
    pub fn is_axis_aligned(&self) -> bool {
        (self.rotation % std::f64::consts::TAU) == 0.0
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Point::ZERO, 0.0)
    }
}

/// A rectangular shape on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub(crate) id: ShapeId,
    /// Current placement.
    pub pose: Pose,
    /// Body size in local, unscaled units.
    pub size: Size,
    /// Scale accumulated by an in-progress resize gesture; identity at rest.
    pub scale: Vec2,
}

impl Shape {
    /// Create an unrotated shape with its body at `(x, y)`.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            pose: Pose::new(Point::new(x, y), 0.0),
            size: Size::new(width, height),
            scale: Vec2::new(1.0, 1.0),
        }
    }

    /// Set the rotation (radians).
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.pose.rotation = rotation;
        self
    }

    /// Get the unique identifier.
    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Transform from the local frame to container coordinates.
    pub fn affine(&self) -> Affine {
        self.affine_at(self.pose)
    }

    /// Transform the shape would have at a hypothetical pose.
    pub fn affine_at(&self, pose: Pose) -> Affine {
        Affine::translate(pose.position.to_vec2())
            * Affine::rotate(pose.rotation)
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
    }

    /// Body size as currently displayed (size × scale).
    pub fn visual_size(&self) -> Size {
        Size::new(self.size.width * self.scale.x, self.size.height * self.scale.y)
    }

    /// Whether the scale factor is the identity.
    pub fn is_unscaled(&self) -> bool {
        self.scale.x == 1.0 && self.scale.y == 1.0
    }

    /// Whether the geometry is usable for collision and snapping.
    ///
    /// Shapes with non-finite or negative dimensions, a non-finite pose, or a
    /// collapsed scale are skipped by scene scans instead of aborting them.
    pub fn is_collidable(&self) -> bool {
        self.pose.position.is_finite()
            && self.pose.rotation.is_finite()
            && self.size.width.is_finite()
            && self.size.height.is_finite()
            && self.size.width >= 0.0
            && self.size.height >= 0.0
            && self.scale.x.is_finite()
            && self.scale.y.is_finite()
            && self.scale.x > 0.0
            && self.scale.y > 0.0
    }

    /// Check if a point (in container coordinates) lies on the body.
    pub fn hit_test(&self, point: Point) -> bool {
        if !self.is_collidable() {
            return false;
        }
        let local = self.affine().inverse() * point;
        let size = self.size;
        local.x >= 0.0 && local.y >= 0.0 && local.x <= size.width && local.y <= size.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_shape_creation() {
        let shape = Shape::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(shape.pose.position, Point::new(10.0, 20.0));
        assert_eq!(shape.size, Size::new(100.0, 50.0));
        assert!(shape.is_unscaled());
        assert!(shape.pose.is_axis_aligned());
    }

    #[test]
    fn test_affine_rotates_about_origin() {
        let shape = Shape::new(100.0, 100.0, 40.0, 20.0).with_rotation(FRAC_PI_2);
        let corner = shape.affine() * Point::new(40.0, 0.0);
        assert!((corner.x - 100.0).abs() < 1e-9);
        assert!((corner.y - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_visual_size() {
        let mut shape = Shape::new(0.0, 0.0, 100.0, 50.0);
        shape.scale = Vec2::new(1.5, 2.0);
        assert_eq!(shape.visual_size(), Size::new(150.0, 100.0));
    }

    #[test]
    fn test_hit_test() {
        let shape = Shape::new(0.0, 0.0, 100.0, 100.0);
        assert!(shape.hit_test(Point::new(50.0, 50.0)));
        assert!(!shape.hit_test(Point::new(150.0, 50.0)));

        let rotated = Shape::new(100.0, 100.0, 40.0, 20.0).with_rotation(FRAC_PI_2);
        assert!(rotated.hit_test(Point::new(90.0, 120.0)));
        assert!(!rotated.hit_test(Point::new(120.0, 120.0)));
    }

    #[test]
    fn test_degenerate_shape_is_not_collidable() {
        let shape = Shape::new(0.0, 0.0, f64::NAN, 10.0);
        assert!(!shape.is_collidable());
        assert!(!shape.hit_test(Point::new(0.0, 0.0)));

        let mut collapsed = Shape::new(0.0, 0.0, 10.0, 10.0);
        collapsed.scale = Vec2::new(0.0, 1.0);
        assert!(!collapsed.is_collidable());
    }
}
