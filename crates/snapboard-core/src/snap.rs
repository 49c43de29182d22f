//! Snap functionality for aligning shapes to the container and to each other.
//!
//! Two surfaces are considered: the container edges, and the edges of
//! sibling shapes. Sibling snapping works on oriented edges so rotated
//! shapes align flush with each other; when both shapes are unrotated it
//! falls back to comparing box coordinates directly, which yields the same
//! answer.

use crate::config::EngineConfig;
use crate::geometry::{
    aabb, aabb_at, aabb_of, edges_of, interval_overlap, polygon_at, polygon_of, separation, Edge,
};
use crate::scene::Scene;
use crate::shapes::{Pose, Shape, ShapeId};
use kurbo::{Point, Rect, Size, Vec2};

/// Result of a container snap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped origin.
    pub point: Point,
    /// Whether the box ends up flush with a vertical container edge.
    pub snapped_x: bool,
    /// Whether the box ends up flush with a horizontal container edge.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Pull a coordinate onto `min` or `max` when within `snap`, then clamp it
/// into `[min, max]`. Returns the value and whether it sits on a bound.
fn snap_to_range(value: f64, min: f64, max: f64, snap: f64) -> (f64, bool) {
    let mut v = value;
    if (v - min).abs() <= snap {
        v = min;
    }
    if (v - max).abs() <= snap {
        v = max;
    }
    let v = v.max(min).min(max.max(min));
    (v, v == min || v == max)
}

/// Snap one axis of a box: `lo`/`hi` are its extent, `limit` the container size.
fn snap_axis(lo: f64, hi: f64, limit: f64, snap: f64) -> (f64, bool) {
    // Boxes larger than the container pin to the leading edge.
    let max_lo = (limit - (hi - lo)).max(0.0);
    let (new_lo, snapped) = snap_to_range(lo, 0.0, max_lo, snap);
    (new_lo - lo, snapped)
}

fn constrain_box(bounds: Rect, container: Size, snap: f64) -> (Vec2, bool, bool) {
    let (dx, snapped_x) = snap_axis(bounds.x0, bounds.x1, container.width, snap);
    let (dy, snapped_y) = snap_axis(bounds.y0, bounds.y1, container.height, snap);
    (Vec2::new(dx, dy), snapped_x, snapped_y)
}

/// Snap the shape's box at `pose` to the container edges and keep it inside.
///
/// Edges within `snap` of a container edge are made flush with it; the box
/// is then clamped so it never leaves the container.
pub fn snap_to_container(shape: &Shape, pose: Pose, container: Size, snap: f64) -> SnapResult {
    let (delta, snapped_x, snapped_y) = constrain_box(aabb_at(shape, pose), container, snap);
    SnapResult {
        point: pose.position + delta,
        snapped_x,
        snapped_y,
    }
}

/// Clamp the shape's box at `pose` into the container without snapping.
pub fn clamp_to_container(shape: &Shape, pose: Pose, container: Size) -> Point {
    let (delta, _, _) = constrain_box(aabb_at(shape, pose), container, 0.0);
    pose.position + delta
}

/// A sibling-edge alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSnap {
    /// Correction to add to the moving shape's origin.
    pub offset: Vec2,
    /// Absolute perpendicular distance that the correction removes.
    pub distance: f64,
    /// The sibling that was snapped to.
    pub sibling: ShapeId,
}

impl EdgeSnap {
    /// Apply the correction to a pose.
    pub fn apply(&self, pose: Pose) -> Pose {
        pose.translated(self.offset)
    }
}

/// A snap candidate: correction vector and its absolute distance.
type Candidate = (Vec2, f64);

fn keep_closer(best: &mut Option<Candidate>, offset: Vec2, distance: f64) {
    // Strictly closer only, so the first of equal candidates wins.
    if best.is_none_or(|(_, d)| distance < d) {
        *best = Some((offset, distance));
    }
}

/// Best alignment between two sets of oriented edges.
///
/// Pairs must be parallel within the tolerance, their projections onto the
/// sibling edge must overlap by more than `-snap`, and the moving edge's
/// midpoint must lie within `snap` of the sibling edge's line.
pub(crate) fn edge_candidate(
    moving: &[Edge; 4],
    sibling: &[Edge; 4],
    snap: f64,
    parallel_cos: f64,
) -> Option<Candidate> {
    let mut best = None;
    for me in moving {
        if me.tangent == Vec2::ZERO {
            continue;
        }
        for se in sibling {
            if se.tangent == Vec2::ZERO || !me.is_parallel(se, parallel_cos) {
                continue;
            }
            let axis = se.tangent;
            if interval_overlap(me.project(axis), se.project(axis)) <= -snap {
                continue;
            }
            let d = se.signed_distance(me.midpoint());
            if d.abs() <= snap {
                log::trace!("Edge snap candidate at distance {:.3}", d.abs());
                keep_closer(&mut best, se.normal * -d, d.abs());
            }
        }
    }
    best
}

/// Horizontal or vertical edge of an axis-aligned box.
#[derive(Clone, Copy)]
enum BoxEdge {
    /// A horizontal edge at `y`.
    Horizontal(f64),
    /// A vertical edge at `x`.
    Vertical(f64),
}

/// Box edges in the same top, right, bottom, left order as [`edges_of`].
fn box_edges(rect: Rect) -> [BoxEdge; 4] {
    [
        BoxEdge::Horizontal(rect.y0),
        BoxEdge::Vertical(rect.x1),
        BoxEdge::Horizontal(rect.y1),
        BoxEdge::Vertical(rect.x0),
    ]
}

/// Best alignment between two unrotated boxes, by direct coordinate comparison.
pub(crate) fn axis_aligned_candidate(moving: Rect, sibling: Rect, snap: f64) -> Option<Candidate> {
    let x_overlap = interval_overlap((moving.x0, moving.x1), (sibling.x0, sibling.x1));
    let y_overlap = interval_overlap((moving.y0, moving.y1), (sibling.y0, sibling.y1));
    let mut best = None;
    for me in box_edges(moving) {
        for se in box_edges(sibling) {
            match (me, se) {
                (BoxEdge::Horizontal(my), BoxEdge::Horizontal(sy)) if x_overlap > -snap => {
                    let d = sy - my;
                    if d.abs() <= snap {
                        keep_closer(&mut best, Vec2::new(0.0, d), d.abs());
                    }
                }
                (BoxEdge::Vertical(mx), BoxEdge::Vertical(sx)) if y_overlap > -snap => {
                    let d = sx - mx;
                    if d.abs() <= snap {
                        keep_closer(&mut best, Vec2::new(d, 0.0), d.abs());
                    }
                }
                _ => {}
            }
        }
    }
    best
}

/// Find the closest sibling-edge alignment for `moving` at `pose`.
///
/// Siblings whose boxes are further apart than the broad-phase margin on
/// either axis are skipped. Among all remaining candidates the one with the
/// smallest distance wins; ties go to the first found, scanning siblings in
/// scene order, then moving edges, then sibling edges.
pub fn snap_to_siblings(
    moving: &Shape,
    pose: Pose,
    scene: &Scene,
    config: &EngineConfig,
) -> Option<EdgeSnap> {
    resolve_sibling_snap(moving, pose, scene, config, true)
}

pub(crate) fn resolve_sibling_snap(
    moving: &Shape,
    pose: Pose,
    scene: &Scene,
    config: &EngineConfig,
    allow_axis_aligned: bool,
) -> Option<EdgeSnap> {
    if !moving.is_collidable() {
        return None;
    }
    let polygon = polygon_at(moving, pose);
    let moving_box = aabb_of(&polygon);
    let moving_edges = edges_of(&polygon);
    let margin = config.broad_phase_margin();
    let parallel_cos = config.parallel_cos();

    let mut best: Option<EdgeSnap> = None;
    for sibling in scene.siblings(moving.id()) {
        if !sibling.is_collidable() {
            continue;
        }
        let sibling_box = aabb(sibling);
        let gap = separation(moving_box, sibling_box);
        if gap.x > margin || gap.y > margin {
            continue;
        }
        let candidate = if allow_axis_aligned
            && pose.is_axis_aligned()
            && sibling.pose.is_axis_aligned()
        {
            axis_aligned_candidate(moving_box, sibling_box, config.snap)
        } else {
            let sibling_edges = edges_of(&polygon_of(sibling));
            edge_candidate(&moving_edges, &sibling_edges, config.snap, parallel_cos)
        };
        if let Some((offset, distance)) = candidate {
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(EdgeSnap {
                    offset,
                    distance,
                    sibling: sibling.id(),
                });
            }
        }
    }
    if let Some(snap) = &best {
        log::trace!(
            "Snapped {} to {} (distance {:.3})",
            moving.id(),
            snap.sibling,
            snap.distance
        );
    }
    best
}

/// Pull a rotation (radians) onto the nearest stop (degrees) within
/// `tolerance_deg`. Full turns are preserved.
pub fn snap_rotation(rotation: f64, stops_deg: &[f64], tolerance_deg: f64) -> f64 {
    if tolerance_deg <= 0.0 || !rotation.is_finite() {
        return rotation;
    }
    let degrees = rotation.to_degrees();
    let mut best: Option<f64> = None;
    for &stop in stops_deg {
        // Signed difference wrapped into [-180, 180).
        let diff = (stop - degrees + 180.0).rem_euclid(360.0) - 180.0;
        if diff.abs() <= tolerance_deg && best.is_none_or(|b: f64| diff.abs() < b.abs()) {
            best = Some(diff);
        }
    }
    match best {
        Some(diff) => rotation + diff.to_radians(),
        None => rotation,
    }
}
