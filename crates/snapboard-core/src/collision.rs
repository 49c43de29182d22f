//! Collision detection against the rest of the scene.

use crate::geometry::{self, aabb_of, overlaps, polygon_with};
use crate::scene::Scene;
use crate::shapes::{Pose, Shape};
use kurbo::Size;

/// Overlap depth below which boxes still count as touching.
pub const CONTACT_EPSILON: f64 = 1e-9;

/// Whether `moving`, placed at `pose`, would overlap any other shape.
///
/// Compares the hypothetical bounding box of `moving` against the current
/// bounding box of every sibling. Nothing is mutated.
pub fn collides(moving: &Shape, scene: &Scene, pose: Pose) -> bool {
    collides_with(moving, scene, pose, moving.size)
}

/// Like [`collides`], with a hypothetical body size as well.
pub fn collides_with(moving: &Shape, scene: &Scene, pose: Pose, size: Size) -> bool {
    let moving_box =
        aabb_of(&polygon_with(moving, pose, size)).inflate(-CONTACT_EPSILON, -CONTACT_EPSILON);
    scene
        .siblings(moving.id())
        .filter(|other| other.is_collidable())
        .any(|other| overlaps(moving_box, geometry::aabb(other)))
}
