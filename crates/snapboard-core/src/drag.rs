//! Drag constraint pipeline.
//!
//! Each pointer sample during a drag proposes a new origin for the shape.
//! The proposal is snapped to the container, then to sibling edges, and
//! finally checked for collisions. A rejected sample leaves the shape where
//! it was last accepted.

use crate::collision::collides;
use crate::config::EngineConfig;
use crate::geometry::aabb_at;
use crate::scene::Scene;
use crate::shapes::{Shape, ShapeId};
use crate::snap::{snap_to_container, snap_to_siblings};
use kurbo::{Point, Vec2};

/// Result of constraining one drag sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// The (possibly snapped) position to move to.
    Accepted(Point),
    /// The sample was rejected; carries the last accepted position.
    Rejected(Point),
}

impl DragOutcome {
    /// The position the shape should end up at.
    pub fn position(&self) -> Point {
        match *self {
            DragOutcome::Accepted(p) | DragOutcome::Rejected(p) => p,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, DragOutcome::Accepted(_))
    }
}

/// Turn a raw proposed origin into an accepted one.
///
/// Rotation is unchanged. The pipeline is a pure function of its inputs, so
/// feeding the same sample twice gives the same outcome.
pub fn constrain_drag(
    shape: &Shape,
    last_accepted: Point,
    proposed: Point,
    scene: &Scene,
    config: &EngineConfig,
) -> DragOutcome {
    let pose = shape.pose.at(proposed);

    let contained = snap_to_container(shape, pose, scene.container(), config.snap);
    let mut candidate = pose.at(contained.point);

    if let Some(edge) = snap_to_siblings(shape, candidate, scene, config) {
        candidate = edge.apply(candidate);
    }

    if !scene.bounds_contain(aabb_at(shape, candidate)) {
        log::debug!("Drag of {} rejected: outside container", shape.id());
        return DragOutcome::Rejected(last_accepted);
    }
    if collides(shape, scene, candidate) {
        log::debug!("Drag of {} rejected: collision", shape.id());
        return DragOutcome::Rejected(last_accepted);
    }
    DragOutcome::Accepted(candidate.position)
}

/// An in-progress drag of a single shape.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    /// The shape being dragged.
    pub shape_id: ShapeId,
    /// Pointer position relative to the shape origin at press time.
    pub grab_offset: Vec2,
    /// Origin of the last accepted sample.
    pub last_accepted: Point,
}

impl DragState {
    /// Start dragging `shape` from the pointer position `pointer`.
    pub fn begin(shape: &Shape, pointer: Point) -> Self {
        Self {
            shape_id: shape.id(),
            grab_offset: pointer - shape.pose.position,
            last_accepted: shape.pose.position,
        }
    }

    /// Proposed origin for a pointer sample.
    pub fn proposed(&self, pointer: Point) -> Point {
        pointer - self.grab_offset
    }

    /// Constrain a pointer sample and write the accepted pose to the scene.
    ///
    /// Returns `None` if the shape has left the scene.
    pub fn update(
        &mut self,
        pointer: Point,
        scene: &mut Scene,
        config: &EngineConfig,
    ) -> Option<DragOutcome> {
        let shape = scene.get(self.shape_id)?;
        let outcome = constrain_drag(shape, self.last_accepted, self.proposed(pointer), scene, config);
        if let DragOutcome::Accepted(position) = outcome {
            let pose = shape.pose.at(position);
            scene.set_pose(self.shape_id, pose);
            self.last_accepted = position;
        }
        Some(outcome)
    }
}
