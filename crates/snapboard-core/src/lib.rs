//! Snapboard Core Library
//!
//! Geometric constraint engine for a bounded canvas of rectangles: shapes
//! never overlap, never leave the container, and snap to the container and
//! to each other's edges while being dragged, resized, rotated or drawn.

pub mod canvas;
pub mod collision;
pub mod config;
pub mod drag;
pub mod draw;
pub mod factory;
pub mod geometry;
pub mod input;
pub mod scene;
pub mod shapes;
pub mod snap;
pub mod transform;

pub use canvas::{Canvas, CanvasError, Gesture, PendingShape};
pub use collision::{collides, collides_with};
pub use config::{ConfigError, EngineConfig, MIN_SIZE, SNAP};
pub use drag::{constrain_drag, DragOutcome, DragState};
pub use draw::{CommitRequest, DrawController, DrawState};
pub use factory::{
    AvatarLayout, BoxFuture, Decoration, DecorationError, FactoryError, RectangleFactory,
    ShapeFactory,
};
pub use geometry::{aabb, aabb_at, aabb_of, edges_of, overlaps, polygon_of, Edge, Polygon};
pub use input::{ClickTracker, HitTarget, PointerEvent};
pub use scene::Scene;
pub use shapes::{DraftShape, Pose, Shape, ShapeId};
pub use snap::{snap_rotation, snap_to_container, snap_to_siblings, EdgeSnap, SnapResult};
pub use transform::{
    consolidate, gate_bound_box, handles_of, hit_test_handles, resize_from_corner,
    rotation_towards, BoundBox, Consolidation, Corner, HandleKind, ResizeState, RotateState,
    TransformKind,
};
