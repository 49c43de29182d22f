//! Transform constraint gate for resize and rotate gestures.
//!
//! While a handle is dragged the shape carries a temporary scale factor;
//! every frame's proposed box passes through [`gate_bound_box`]. When the
//! gesture ends [`consolidate`] bakes the scale into the body size and
//! settles the pose.

use crate::canvas::CanvasError;
use crate::collision::{collides, collides_with};
use crate::config::EngineConfig;
use crate::factory::Decoration;
use crate::geometry::{aabb, aabb_of, polygon_with};
use crate::scene::Scene;
use crate::shapes::{Pose, Shape, ShapeId};
use crate::snap::{clamp_to_container, snap_rotation, snap_to_siblings};
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in container units.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;
/// Distance from the top edge to the rotation handle.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;
/// Rounding slack when a scale factor is baked into the body size.
const BAKE_EPSILON: f64 = 1e-9;

/// A shape's displayed box in its own frame: origin, visual size and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in radians.
    pub rotation: f64,
}

impl BoundBox {
    /// The box a shape currently displays.
    pub fn of(shape: &Shape) -> Self {
        let size = shape.visual_size();
        Self {
            x: shape.pose.position.x,
            y: shape.pose.position.y,
            width: size.width,
            height: size.height,
            rotation: shape.pose.rotation,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(Point::new(self.x, self.y), self.rotation)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Center of the box in container coordinates.
    pub fn center(&self) -> Point {
        Affine::translate(Vec2::new(self.x, self.y))
            * Affine::rotate(self.rotation)
            * Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// The same box turned to `rotation` about its center.
    pub fn rotated(&self, rotation: f64) -> Self {
        let center = self.center();
        let half = Affine::rotate(rotation) * Point::new(self.width / 2.0, self.height / 2.0);
        let origin = center - half.to_vec2();
        Self {
            x: origin.x,
            y: origin.y,
            rotation,
            ..*self
        }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.rotation.is_finite()
    }
}

/// Kind of transform gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformKind {
    Rotate,
    Scale,
}

/// Validate a proposed box for shape `id`.
///
/// Rotation frames are always accepted. Scale frames have each axis floored
/// at the minimum size, then are rejected if the box would leave the
/// container or overlap a sibling. A rejection returns `old` unchanged.
pub fn gate_bound_box(
    scene: &Scene,
    id: ShapeId,
    kind: TransformKind,
    old: BoundBox,
    new: BoundBox,
    config: &EngineConfig,
) -> BoundBox {
    if !new.is_finite() {
        return old;
    }
    match kind {
        TransformKind::Rotate => new,
        TransformKind::Scale => {
            let Some(shape) = scene.get(id) else {
                return old;
            };
            let clamped = BoundBox {
                width: new.width.max(config.min_size),
                height: new.height.max(config.min_size),
                ..new
            };
            // Test in visual units, independent of the live scale factor.
            let mut unscaled = shape.clone();
            unscaled.scale = Vec2::new(1.0, 1.0);
            let pose = clamped.pose();
            let size = clamped.size();
            if !scene.bounds_contain(aabb_of(&polygon_with(&unscaled, pose, size))) {
                log::debug!("Resize of {} rejected: outside container", id);
                return old;
            }
            if collides_with(&unscaled, scene, pose, size) {
                log::debug!("Resize of {} rejected: collision", id);
                return old;
            }
            clamped
        }
    }
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// The box produced by dragging `corner` of `shape` by `delta` (container
/// units). The opposite corner stays put; the box is normalized if the
/// corner is dragged past it.
pub fn resize_from_corner(shape: &Shape, corner: Corner, delta: Vec2) -> BoundBox {
    let size = shape.visual_size();
    let rotation = shape.pose.rotation;
    let local = Affine::rotate(-rotation) * delta.to_point();
    let (dx, dy) = (local.x, local.y);
    let (w, h) = (size.width, size.height);

    let (new_x0, new_y0, new_x1, new_y1) = match corner {
        Corner::TopLeft => (dx, dy, w, h),
        Corner::TopRight => (0.0, dy, w + dx, h),
        Corner::BottomLeft => (dx, 0.0, w, h + dy),
        Corner::BottomRight => (0.0, 0.0, w + dx, h + dy),
    };
    let (x0, x1) = if new_x0 < new_x1 { (new_x0, new_x1) } else { (new_x1, new_x0) };
    let (y0, y1) = if new_y0 < new_y1 { (new_y0, new_y1) } else { (new_y1, new_y0) };

    let origin = Affine::translate(shape.pose.position.to_vec2())
        * Affine::rotate(rotation)
        * Point::new(x0, y0);
    BoundBox {
        x: origin.x,
        y: origin.y,
        width: (x1 - x0).max(1.0),
        height: (y1 - y0).max(1.0),
        rotation,
    }
}

/// Rotation that points the shape's top edge at `pointer`, pulled onto the
/// configured angle stops.
pub fn rotation_towards(shape: &Shape, pointer: Point, config: &EngineConfig) -> f64 {
    let center = BoundBox::of(shape).center();
    let d = pointer - center;
    // Offset so 0 is straight up.
    let angle = d.y.atan2(d.x) + std::f64::consts::FRAC_PI_2;
    snap_rotation(
        angle,
        &config.rotation_snap_stops_deg,
        config.rotation_snap_tolerance_deg,
    )
}

/// Write a gated box to the shape as pose plus scale factor.
pub fn apply_bound_box(shape: &mut Shape, bound: &BoundBox) {
    shape.pose = bound.pose();
    if shape.size.width > 0.0 && shape.size.height > 0.0 {
        shape.scale = Vec2::new(bound.width / shape.size.width, bound.height / shape.size.height);
    } else {
        shape.size = bound.size();
        shape.scale = Vec2::new(1.0, 1.0);
    }
}

/// What consolidation settled on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Consolidation {
    /// Final pose.
    pub pose: Pose,
    /// Final body size (scale baked in).
    pub size: Size,
    /// Whether the settle step moved the shape.
    pub adjusted: bool,
    /// Whether a rotation was undone because the result was invalid.
    pub reverted: bool,
}

/// Multiply out one axis of the scale factor. Products within
/// `BAKE_EPSILON` of a whole unit are taken as whole, which drops the ulp
/// error of `size × (target / size)`.
fn bake_extent(extent: f64, scale: f64) -> f64 {
    let baked = extent * scale;
    let whole = baked.round();
    if (baked - whole).abs() <= BAKE_EPSILON {
        whole
    } else {
        baked
    }
}

/// Settle a shape after a transform gesture.
///
/// Bakes the scale factor into the body size, keeps the absolute top-left
/// corner where it was, then snaps to siblings and clamps into the
/// container. The settle step is dropped if it would collide. Decoration
/// failures are logged and otherwise ignored.
pub fn consolidate<D: Decoration + ?Sized>(
    scene: &mut Scene,
    id: ShapeId,
    config: &EngineConfig,
    decoration: Option<&mut D>,
) -> Result<Consolidation, CanvasError> {
    let shape = scene.get(id).ok_or(CanvasError::ShapeNotFound(id))?;
    let anchor = shape.affine() * Point::ZERO;

    let mut baked = shape.clone();
    baked.size = Size::new(
        bake_extent(shape.size.width, shape.scale.x),
        bake_extent(shape.size.height, shape.scale.y),
    );
    baked.scale = Vec2::new(1.0, 1.0);
    let drift = anchor - baked.affine() * Point::ZERO;
    baked.pose = baked.pose.translated(drift);
    let anchored = baked.pose;

    let mut settled = anchored;
    if let Some(edge) = snap_to_siblings(&baked, settled, scene, config) {
        settled = edge.apply(settled);
    }
    settled = settled.at(clamp_to_container(&baked, settled, scene.container()));

    let pose = if settled != anchored && collides(&baked, scene, settled) {
        log::debug!("Settle of {} dropped: collision", id);
        anchored
    } else {
        settled
    };

    scene.set_geometry(id, pose, baked.size, Vec2::new(1.0, 1.0));
    log::info!(
        "Consolidated shape {} at ({:.1}, {:.1}), {:.1}x{:.1}",
        id,
        pose.position.x,
        pose.position.y,
        baked.size.width,
        baked.size.height
    );

    if let Some(decoration) = decoration {
        if let Err(err) = decoration.relayout(baked.size) {
            log::warn!("Decoration relayout failed for {}: {}", id, err);
        }
    }

    Ok(Consolidation {
        pose,
        size: baked.size,
        adjusted: pose != anchored,
        reverted: false,
    })
}

/// An in-progress corner resize.
#[derive(Debug, Clone)]
pub struct ResizeState {
    pub shape_id: ShapeId,
    pub corner: Corner,
    /// Pointer position at press time.
    pub start: Point,
    /// The shape as it was when the gesture began.
    pub original: Shape,
    /// Last accepted box.
    pub current: BoundBox,
}

impl ResizeState {
    pub fn begin(shape: &Shape, corner: Corner, pointer: Point) -> Self {
        Self {
            shape_id: shape.id(),
            corner,
            start: pointer,
            original: shape.clone(),
            current: BoundBox::of(shape),
        }
    }

    /// Gate the box for a pointer sample and apply it if accepted.
    pub fn update(&mut self, pointer: Point, scene: &mut Scene, config: &EngineConfig) -> BoundBox {
        let proposed = resize_from_corner(&self.original, self.corner, pointer - self.start);
        let gated = gate_bound_box(
            scene,
            self.shape_id,
            TransformKind::Scale,
            self.current,
            proposed,
            config,
        );
        if gated != self.current {
            if let Some(shape) = scene.get_mut(self.shape_id) {
                apply_bound_box(shape, &gated);
            }
            self.current = gated;
        }
        gated
    }

    pub fn finish<D: Decoration + ?Sized>(
        self,
        scene: &mut Scene,
        config: &EngineConfig,
        decoration: Option<&mut D>,
    ) -> Result<Consolidation, CanvasError> {
        consolidate(scene, self.shape_id, config, decoration)
    }
}

/// An in-progress rotation.
#[derive(Debug, Clone)]
pub struct RotateState {
    pub shape_id: ShapeId,
    /// Pose before the gesture, restored if the result is invalid.
    pub original_pose: Pose,
    pub current: BoundBox,
}

impl RotateState {
    pub fn begin(shape: &Shape) -> Self {
        Self {
            shape_id: shape.id(),
            original_pose: shape.pose,
            current: BoundBox::of(shape),
        }
    }

    /// Turn the shape towards the pointer. Never rejected mid-gesture.
    pub fn update(&mut self, pointer: Point, scene: &mut Scene, config: &EngineConfig) -> BoundBox {
        let Some(shape) = scene.get(self.shape_id) else {
            return self.current;
        };
        let angle = rotation_towards(shape, pointer, config);
        let proposed = self.current.rotated(angle);
        let gated = gate_bound_box(
            scene,
            self.shape_id,
            TransformKind::Rotate,
            self.current,
            proposed,
            config,
        );
        if let Some(shape) = scene.get_mut(self.shape_id) {
            apply_bound_box(shape, &gated);
        }
        self.current = gated;
        gated
    }

    /// Consolidate, then undo the rotation if the shape still overlaps a
    /// sibling or sticks out of the container.
    pub fn finish<D: Decoration + ?Sized>(
        self,
        scene: &mut Scene,
        config: &EngineConfig,
        decoration: Option<&mut D>,
    ) -> Result<Consolidation, CanvasError> {
        let mut result = consolidate(scene, self.shape_id, config, decoration)?;
        let shape = scene
            .get(self.shape_id)
            .ok_or(CanvasError::ShapeNotFound(self.shape_id))?;
        let invalid = !scene.bounds_contain(aabb(shape)) || collides(shape, scene, shape.pose);
        if invalid {
            log::debug!("Rotation of {} reverted", self.shape_id);
            scene.set_pose(self.shape_id, self.original_pose);
            result.pose = self.original_pose;
            result.adjusted = true;
            result.reverted = true;
        }
        Ok(result)
    }
}

/// Type of transform handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Corner resize handle.
    Corner(Corner),
    /// Rotation handle above the top edge.
    Rotate,
}

/// A handle with its position.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in container coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Corner handles plus the rotation handle, following the shape's rotation.
pub fn handles_of(shape: &Shape) -> Vec<Handle> {
    let affine = shape.affine();
    let (w, h) = (shape.size.width, shape.size.height);
    let rotation = shape.pose.rotation;
    let up = Vec2::new(rotation.sin(), -rotation.cos());
    let top_center = affine * Point::new(w / 2.0, 0.0);
    vec![
        Handle::new(affine * Point::new(0.0, 0.0), HandleKind::Corner(Corner::TopLeft)),
        Handle::new(affine * Point::new(w, 0.0), HandleKind::Corner(Corner::TopRight)),
        Handle::new(affine * Point::new(0.0, h), HandleKind::Corner(Corner::BottomLeft)),
        Handle::new(affine * Point::new(w, h), HandleKind::Corner(Corner::BottomRight)),
        Handle::new(top_center + up * ROTATE_HANDLE_OFFSET, HandleKind::Rotate),
    ]
}

/// Find which handle (if any) is hit at the given point.
pub fn hit_test_handles(shape: &Shape, point: Point, tolerance: f64) -> Option<HandleKind> {
    handles_of(shape)
        .into_iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::AvatarLayout;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn setup(shapes: &[Shape]) -> Scene {
        let mut scene = Scene::new(800.0, 600.0);
        for shape in shapes {
            scene.add_shape(shape.clone());
        }
        scene
    }

    fn bound(x: f64, y: f64, width: f64, height: f64) -> BoundBox {
        BoundBox {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    #[test]
    fn test_gate_clamps_to_min_size() {
        let a = Shape::new(100.0, 100.0, 50.0, 50.0);
        let scene = setup(&[a.clone()]);
        let config = EngineConfig::default();
        let old = BoundBox::of(&a);
        let gated = gate_bound_box(&scene, a.id(), TransformKind::Scale, old, bound(100.0, 100.0, 5.0, 5.0), &config);
        assert_eq!(gated, bound(100.0, 100.0, 16.0, 16.0));
    }

    #[test]
    fn test_gate_rejects_overlap() {
        let a = Shape::new(100.0, 100.0, 50.0, 50.0);
        let c = Shape::new(200.0, 100.0, 50.0, 50.0);
        let scene = setup(&[a.clone(), c]);
        let config = EngineConfig::default();
        let old = BoundBox::of(&a);
        let gated = gate_bound_box(&scene, a.id(), TransformKind::Scale, old, bound(100.0, 100.0, 120.0, 50.0), &config);
        assert_eq!(gated, old);
        // Growing up to the sibling is fine.
        let flush = gate_bound_box(&scene, a.id(), TransformKind::Scale, old, bound(100.0, 100.0, 100.0, 50.0), &config);
        assert_eq!(flush, bound(100.0, 100.0, 100.0, 50.0));
    }

    #[test]
    fn test_gate_rejects_out_of_bounds() {
        let a = Shape::new(100.0, 100.0, 50.0, 50.0);
        let scene = setup(&[a.clone()]);
        let config = EngineConfig::default();
        let old = BoundBox::of(&a);
        let gated = gate_bound_box(&scene, a.id(), TransformKind::Scale, old, bound(100.0, 100.0, 800.0, 50.0), &config);
        assert_eq!(gated, old);
        let nan = gate_bound_box(&scene, a.id(), TransformKind::Scale, old, bound(f64::NAN, 100.0, 20.0, 20.0), &config);
        assert_eq!(nan, old);
    }

    #[test]
    fn test_gate_accepts_rotation() {
        let a = Shape::new(100.0, 100.0, 50.0, 50.0);
        let c = Shape::new(150.0, 100.0, 50.0, 50.0);
        let scene = setup(&[a.clone(), c]);
        let config = EngineConfig::default();
        let old = BoundBox::of(&a);
        let turned = old.rotated(FRAC_PI_4);
        let gated = gate_bound_box(&scene, a.id(), TransformKind::Rotate, old, turned, &config);
        assert_eq!(gated, turned);
    }

    #[test]
    fn test_resize_from_corner() {
        let shape = Shape::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(
            resize_from_corner(&shape, Corner::BottomRight, Vec2::new(50.0, 50.0)),
            bound(0.0, 0.0, 150.0, 150.0)
        );
        assert_eq!(
            resize_from_corner(&shape, Corner::TopLeft, Vec2::new(10.0, 20.0)),
            bound(10.0, 20.0, 90.0, 80.0)
        );
        // Dragged past the opposite corner.
        assert_eq!(
            resize_from_corner(&shape, Corner::TopLeft, Vec2::new(150.0, 0.0)),
            bound(100.0, 0.0, 50.0, 100.0)
        );
    }

    #[test]
    fn test_resize_from_corner_rotated() {
        let shape = Shape::new(200.0, 100.0, 100.0, 50.0).with_rotation(FRAC_PI_2);
        // Screen-down is local +x for a quarter turn.
        let b = resize_from_corner(&shape, Corner::BottomRight, Vec2::new(0.0, 30.0));
        assert!((b.width - 130.0).abs() < 1e-9);
        assert!((b.height - 50.0).abs() < 1e-9);
        assert!((b.x - 200.0).abs() < 1e-9);
        assert!((b.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_towards_snaps_to_stops() {
        let shape = Shape::new(100.0, 100.0, 100.0, 100.0);
        let config = EngineConfig::default();
        assert!(rotation_towards(&shape, Point::new(150.0, 50.0), &config).abs() < 1e-12);
        let near_quarter = rotation_towards(&shape, Point::new(250.0, 153.0), &config);
        assert!((near_quarter - FRAC_PI_2).abs() < 1e-9);
        let free = rotation_towards(&shape, Point::new(250.0, 50.0), &config);
        assert!((free - FRAC_PI_4).abs() < 1e-9);
    }

    #[test]
    fn test_rotated_keeps_center() {
        let b = bound(100.0, 100.0, 80.0, 40.0);
        let turned = b.rotated(1.0);
        assert!((turned.center() - b.center()).hypot() < 1e-9);
        assert_eq!(turned.rotation, 1.0);
    }

    #[test]
    fn test_consolidate_bakes_scale() {
        let mut a = Shape::new(100.0, 100.0, 100.0, 100.0);
        apply_bound_box(&mut a, &bound(100.0, 100.0, 150.0, 120.0));
        assert_eq!(a.scale, Vec2::new(1.5, 1.2));
        let id = a.id();
        let mut scene = setup(&[a]);
        let mut avatar = AvatarLayout::default();
        let result = consolidate(&mut scene, id, &EngineConfig::default(), Some(&mut avatar)).unwrap();
        let shape = scene.get(id).unwrap();
        assert_eq!(shape.size, Size::new(150.0, 120.0));
        assert!(shape.is_unscaled());
        assert_eq!(shape.pose.position, Point::new(100.0, 100.0));
        assert!(!result.adjusted);
        assert_eq!(avatar.radius, 24.0);
        assert_eq!(avatar.center, Point::new(75.0, 60.0));
    }

    #[test]
    fn test_consolidate_snaps_to_sibling() {
        let a = Shape::new(100.0, 100.0, 100.0, 100.0);
        let b = Shape::new(203.0, 120.0, 50.0, 50.0);
        let mut scene = setup(&[a, b.clone()]);
        let result = consolidate(&mut scene, b.id(), &EngineConfig::default(), None::<&mut AvatarLayout>).unwrap();
        assert!(result.adjusted);
        assert_eq!(scene.get(b.id()).unwrap().pose.position, Point::new(200.0, 120.0));
    }

    #[test]
    fn test_consolidate_drops_colliding_settle() {
        let a = Shape::new(100.0, 100.0, 100.0, 100.0);
        let b = Shape::new(203.0, 150.0, 50.0, 100.0);
        // Tilted so it offers no parallel edges, but its box sits where B would snap to.
        let c = Shape::new(191.0, 205.0, 15.0, 15.0).with_rotation(FRAC_PI_4);
        let mut scene = setup(&[a, b.clone(), c]);
        let result = consolidate(&mut scene, b.id(), &EngineConfig::default(), None::<&mut AvatarLayout>).unwrap();
        assert!(!result.adjusted);
        assert_eq!(scene.get(b.id()).unwrap().pose.position, Point::new(203.0, 150.0));
    }

    #[test]
    fn test_consolidate_missing_shape() {
        let mut scene = setup(&[]);
        let id = ShapeId::new_v4();
        let err = consolidate(&mut scene, id, &EngineConfig::default(), None::<&mut AvatarLayout>).unwrap_err();
        assert!(matches!(err, CanvasError::ShapeNotFound(missing) if missing == id));
    }

    #[test]
    fn test_resize_state_rejects_and_keeps_last_box() {
        let a = Shape::new(100.0, 100.0, 50.0, 50.0);
        let c = Shape::new(200.0, 100.0, 50.0, 50.0);
        let mut scene = setup(&[a.clone(), c]);
        let config = EngineConfig::default();
        let mut resize = ResizeState::begin(&a, Corner::BottomRight, Point::new(150.0, 150.0));

        let grown = resize.update(Point::new(170.0, 160.0), &mut scene, &config);
        assert_eq!(grown, bound(100.0, 100.0, 70.0, 60.0));
        let blocked = resize.update(Point::new(230.0, 160.0), &mut scene, &config);
        assert_eq!(blocked, grown);
        assert_eq!(scene.get(a.id()).unwrap().visual_size(), Size::new(70.0, 60.0));

        resize.finish(&mut scene, &config, None::<&mut AvatarLayout>).unwrap();
        let shape = scene.get(a.id()).unwrap();
        assert_eq!(shape.size, Size::new(70.0, 60.0));
        assert!(shape.is_unscaled());
    }

    #[test]
    fn test_resize_finish_bakes_flush_against_sibling() {
        let a = Shape::new(100.0, 100.0, 100.0, 100.0);
        let c = Shape::new(210.0, 100.0, 50.0, 50.0);
        let mut scene = setup(&[a.clone(), c]);
        let config = EngineConfig::default();
        let mut resize = ResizeState::begin(&a, Corner::BottomRight, Point::new(200.0, 200.0));
        resize.update(Point::new(210.0, 200.0), &mut scene, &config);
        // Live gesture state is pose plus scale; finish must bake it.
        let live = scene.get(a.id()).unwrap();
        assert_eq!(live.size, Size::new(100.0, 100.0));
        assert_eq!(live.scale.y, 1.0);
        assert!((live.scale.x - 1.1).abs() < 1e-12);

        let result = resize.finish(&mut scene, &config, None::<&mut AvatarLayout>).unwrap();
        let shape = scene.get(a.id()).unwrap();
        assert_eq!(shape.size, Size::new(110.0, 100.0));
        assert_eq!(result.size, shape.size);
        assert!(shape.is_unscaled());
        assert_eq!(shape.pose.position, Point::new(100.0, 100.0));
        assert!(!collides(shape, &scene, shape.pose));
    }

    #[test]
    fn test_resize_finish_from_top_left_keeps_corner() {
        let a = Shape::new(100.0, 100.0, 100.0, 100.0);
        let mut scene = setup(&[a.clone()]);
        let config = EngineConfig::default();
        let mut resize = ResizeState::begin(&a, Corner::TopLeft, Point::new(100.0, 100.0));
        resize.update(Point::new(70.0, 80.0), &mut scene, &config);
        let live = scene.get(a.id()).unwrap();
        assert_eq!(live.pose.position, Point::new(70.0, 80.0));
        assert!(!live.is_unscaled());

        resize.finish(&mut scene, &config, None::<&mut AvatarLayout>).unwrap();
        let shape = scene.get(a.id()).unwrap();
        assert_eq!(shape.pose.position, Point::new(70.0, 80.0));
        assert_eq!(shape.size, Size::new(130.0, 120.0));
        assert!(shape.is_unscaled());
    }

    #[test]
    fn test_bake_extent_absorbs_rounding() {
        assert_eq!(bake_extent(100.0, 110.0 / 100.0), 110.0);
        assert_eq!(bake_extent(50.0, 70.0 / 50.0), 70.0);
        assert_eq!(bake_extent(100.0, 1.255), 100.0 * 1.255);
    }

    #[test]
    fn test_rotate_state_reverts_invalid_result() {
        let a = Shape::new(100.0, 100.0, 100.0, 100.0);
        let b = Shape::new(100.0, 210.0, 100.0, 20.0);
        let mut scene = setup(&[a, b.clone()]);
        let config = EngineConfig::default();
        let mut rotate = RotateState::begin(&b);

        // A quarter turn about (150, 220) makes B overlap A.
        let turned = rotate.update(Point::new(250.0, 220.0), &mut scene, &config);
        assert!((turned.rotation - FRAC_PI_2).abs() < 1e-12);
        assert!((scene.get(b.id()).unwrap().pose.rotation - FRAC_PI_2).abs() < 1e-12);

        let result = rotate.finish(&mut scene, &config, None::<&mut AvatarLayout>).unwrap();
        assert!(result.reverted);
        assert_eq!(scene.get(b.id()).unwrap().pose, b.pose);
    }

    #[test]
    fn test_rotate_state_keeps_valid_result() {
        let b = Shape::new(300.0, 300.0, 100.0, 20.0);
        let mut scene = setup(&[b.clone()]);
        let config = EngineConfig::default();
        let mut rotate = RotateState::begin(&b);
        rotate.update(Point::new(450.0, 310.0), &mut scene, &config);
        let result = rotate.finish(&mut scene, &config, None::<&mut AvatarLayout>).unwrap();
        assert!(!result.reverted);
        assert!((scene.get(b.id()).unwrap().pose.rotation - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_handles() {
        let shape = Shape::new(100.0, 100.0, 100.0, 100.0);
        let handles = handles_of(&shape);
        assert_eq!(handles.len(), 5);
        assert!(matches!(handles[0].kind, HandleKind::Corner(Corner::TopLeft)));
        assert!(matches!(handles[4].kind, HandleKind::Rotate));
        assert_eq!(handles[4].position, Point::new(150.0, 75.0));
        assert_eq!(
            hit_test_handles(&shape, Point::new(150.0, 77.0), HANDLE_HIT_TOLERANCE),
            Some(HandleKind::Rotate)
        );
        assert_eq!(
            hit_test_handles(&shape, Point::new(203.0, 203.0), HANDLE_HIT_TOLERANCE),
            Some(HandleKind::Corner(Corner::BottomRight))
        );
        assert_eq!(hit_test_handles(&shape, Point::new(150.0, 150.0), HANDLE_HIT_TOLERANCE), None);
    }
}
