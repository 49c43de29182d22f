//! Canvas controller: owns the scene and routes pointer events to gestures.

use crate::config::EngineConfig;
use crate::draw::{CommitRequest, DrawController, DrawState};
use crate::drag::{constrain_drag, DragOutcome, DragState};
use crate::factory::{BoxFuture, Decoration, FactoryError, ShapeFactory};
use crate::input::{HitTarget, PointerEvent};
use crate::scene::Scene;
use crate::shapes::{DraftShape, Shape, ShapeId};
use crate::transform::{
    hit_test_handles, HandleKind, ResizeState, RotateState, HANDLE_HIT_TOLERANCE,
};
use kurbo::Point;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;

/// Canvas errors.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),
    #[error("A gesture is in progress")]
    GestureInProgress,
    #[error("Canvas has been disposed")]
    Disposed,
    #[error("Shape factory failed: {0}")]
    Factory(#[from] FactoryError),
}

/// The pointer gesture currently manipulating a shape.
#[derive(Debug, Clone)]
pub enum Gesture {
    Drag(DragState),
    Resize(ResizeState),
    Rotate(RotateState),
}

impl Gesture {
    /// The shape being manipulated.
    pub fn shape_id(&self) -> ShapeId {
        match self {
            Gesture::Drag(drag) => drag.shape_id,
            Gesture::Resize(resize) => resize.shape_id,
            Gesture::Rotate(rotate) => rotate.shape_id,
        }
    }
}

/// A shape creation in flight at the factory.
///
/// Resolves to the factory's output. It holds no borrow of the canvas.
pub struct PendingShape {
    request: CommitRequest,
    future: BoxFuture<'static, Result<Shape, FactoryError>>,
}

impl PendingShape {
    /// The request this creation was issued for.
    pub fn request(&self) -> CommitRequest {
        self.request
    }
}

impl Future for PendingShape {
    type Output = Result<Shape, FactoryError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

/// Interactive canvas.
///
/// Events are processed in arrival order and only one gesture is active at
/// a time. Every accepted change keeps shapes inside the container and
/// apart from each other.
pub struct Canvas {
    scene: Scene,
    config: EngineConfig,
    gesture: Option<Gesture>,
    draw: DrawController,
    selection: Option<ShapeId>,
    decorations: HashMap<ShapeId, Box<dyn Decoration>>,
    disposed: bool,
}

impl Canvas {
    /// Create a canvas over `scene`.
    pub fn new(scene: Scene, config: EngineConfig) -> Self {
        let draw = DrawController::new(&config);
        Self {
            scene,
            config,
            gesture: None,
            draw,
            selection: None,
            decorations: HashMap::new(),
            disposed: false,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    pub fn draw_state(&self) -> DrawState {
        self.draw.state()
    }

    /// The draft of an in-progress draw gesture.
    pub fn draft(&self) -> Option<&DraftShape> {
        self.draw.draft()
    }

    pub fn selection(&self) -> Option<ShapeId> {
        self.selection
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Select a shape, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<ShapeId>) -> Result<(), CanvasError> {
        if self.disposed {
            return Err(CanvasError::Disposed);
        }
        if self.gesture.is_some() {
            return Err(CanvasError::GestureInProgress);
        }
        if let Some(id) = id {
            if !self.scene.contains(id) {
                return Err(CanvasError::ShapeNotFound(id));
            }
        }
        self.selection = id;
        Ok(())
    }

    /// Attach a decoration to a shape and lay it out for the current size.
    pub fn set_decoration(
        &mut self,
        id: ShapeId,
        mut decoration: Box<dyn Decoration>,
    ) -> Result<(), CanvasError> {
        let shape = self.scene.get(id).ok_or(CanvasError::ShapeNotFound(id))?;
        if let Err(err) = decoration.relayout(shape.visual_size()) {
            log::warn!("Decoration relayout failed for {}: {}", id, err);
        }
        self.decorations.insert(id, decoration);
        Ok(())
    }

    /// Resolve what lies under `point`: a handle of the selected shape,
    /// then the topmost shape body, then the background.
    pub fn hit_test(&self, point: Point) -> HitTarget {
        if let Some(id) = self.selection {
            if let Some(shape) = self.scene.get(id) {
                if let Some(kind) = hit_test_handles(shape, point, HANDLE_HIT_TOLERANCE) {
                    return HitTarget::Handle(id, kind);
                }
            }
        }
        match self.scene.shape_at_point(point) {
            Some(id) => HitTarget::Shape(id),
            None => HitTarget::Background,
        }
    }

    /// Process one pointer event. Returns a commit request when a draw
    /// gesture completes; pass it to [`Canvas::issue_commit`].
    ///
    /// While drawing is armed, a press on a shape or handle still starts a
    /// gesture on it and drawing stays armed.
    pub fn handle_event(&mut self, event: PointerEvent) -> Option<CommitRequest> {
        if self.disposed {
            return None;
        }
        if self.draw.is_active() && !self.bypasses_draw(&event) {
            return self.draw.handle_event(&event);
        }
        match event {
            PointerEvent::DoubleActivate { position } => {
                if self.gesture.is_none() && self.hit_test(position).is_background() {
                    self.draw.handle_event(&event);
                }
            }
            PointerEvent::Press { position, target } => {
                if self.gesture.is_none() {
                    self.begin_gesture(position, target);
                }
            }
            PointerEvent::Move { position } => self.update_gesture(position),
            PointerEvent::Release { .. } => self.end_gesture(),
        }
        None
    }

    fn bypasses_draw(&self, event: &PointerEvent) -> bool {
        if self.gesture.is_some() {
            return true;
        }
        match (self.draw.state(), event) {
            (DrawState::Armed, PointerEvent::Press { target, .. }) => !target.is_background(),
            _ => false,
        }
    }

    fn begin_gesture(&mut self, position: Point, target: HitTarget) {
        let id = match target {
            HitTarget::Background => {
                self.selection = None;
                return;
            }
            HitTarget::Shape(id) | HitTarget::Handle(id, _) => id,
        };
        let Some(shape) = self.scene.get(id) else {
            log::debug!("Press on unknown shape {}", id);
            return;
        };
        let gesture = match target {
            HitTarget::Handle(_, HandleKind::Corner(corner)) => {
                Gesture::Resize(ResizeState::begin(shape, corner, position))
            }
            HitTarget::Handle(_, HandleKind::Rotate) => Gesture::Rotate(RotateState::begin(shape)),
            _ => Gesture::Drag(DragState::begin(shape, position)),
        };
        log::debug!("Gesture started on {}", id);
        self.selection = Some(id);
        self.gesture = Some(gesture);
    }

    fn update_gesture(&mut self, position: Point) {
        let lost = match &mut self.gesture {
            Some(Gesture::Drag(drag)) => drag.update(position, &mut self.scene, &self.config).is_none(),
            Some(Gesture::Resize(resize)) => {
                resize.update(position, &mut self.scene, &self.config);
                false
            }
            Some(Gesture::Rotate(rotate)) => {
                rotate.update(position, &mut self.scene, &self.config);
                false
            }
            None => false,
        };
        if lost {
            log::debug!("Dragged shape left the scene");
            self.gesture = None;
        }
    }

    fn end_gesture(&mut self) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        let id = gesture.shape_id();
        let decoration = self.decorations.get_mut(&id).map(|d| &mut **d);
        let result = match gesture {
            Gesture::Drag(drag) => {
                log::debug!(
                    "Drag of {} ended at ({:.1}, {:.1})",
                    id,
                    drag.last_accepted.x,
                    drag.last_accepted.y
                );
                return;
            }
            Gesture::Resize(resize) => resize.finish(&mut self.scene, &self.config, decoration),
            Gesture::Rotate(rotate) => rotate.finish(&mut self.scene, &self.config, decoration),
        };
        if let Err(err) = result {
            log::warn!("Failed to settle {}: {}", id, err);
        }
    }

    /// Drop the active gesture without settling it.
    pub fn cancel_gesture(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            log::debug!("Gesture on {} cancelled", gesture.shape_id());
        }
        self.draw.cancel();
    }

    /// Resize the container. Returns the shapes that no longer fit.
    pub fn set_container_size(&mut self, width: f64, height: f64) -> Result<Vec<ShapeId>, CanvasError> {
        if self.disposed {
            return Err(CanvasError::Disposed);
        }
        if self.gesture.is_some() {
            return Err(CanvasError::GestureInProgress);
        }
        Ok(self.scene.set_container_size(width, height))
    }

    /// Add a shape, snapped and clamped like a drag to its own position.
    ///
    /// Returns `None` without touching the scene if the shape is degenerate,
    /// smaller than the minimum size, or cannot be placed without overlap.
    pub fn place_shape(&mut self, mut shape: Shape) -> Option<ShapeId> {
        if self.disposed {
            return None;
        }
        if !shape.is_collidable() {
            log::warn!("Refusing to place degenerate shape {}", shape.id());
            return None;
        }
        let size = shape.visual_size();
        if size.width < self.config.min_size || size.height < self.config.min_size {
            log::debug!("Refusing to place {}: below minimum size", shape.id());
            return None;
        }
        let position = shape.pose.position;
        match constrain_drag(&shape, position, position, &self.scene, &self.config) {
            DragOutcome::Accepted(placed) => {
                shape.pose.position = placed;
                Some(self.scene.add_shape(shape))
            }
            DragOutcome::Rejected(_) => {
                log::debug!("Refusing to place {}: no room", shape.id());
                None
            }
        }
    }

    /// Issue a commit request to `factory`.
    ///
    /// The returned [`PendingShape`] borrows neither the canvas nor the
    /// factory, so events keep flowing while it runs. Hand its output to
    /// [`Canvas::place_committed`] once it resolves.
    pub fn issue_commit<F: ShapeFactory + ?Sized>(
        &self,
        factory: &F,
        request: CommitRequest,
    ) -> Result<PendingShape, CanvasError> {
        if self.disposed {
            return Err(CanvasError::Disposed);
        }
        log::debug!(
            "Commit issued for {:.1}x{:.1} at ({:.1}, {:.1})",
            request.width,
            request.height,
            request.x,
            request.y
        );
        Ok(PendingShape {
            request,
            future: factory.create_shape(request),
        })
    }

    /// Place the output of a resolved [`PendingShape`].
    ///
    /// Placement is validated against the scene as it is now, not as it was
    /// when the request was issued. On a factory error, a rejected placement
    /// or a disposed canvas the scene is unchanged. A rejected placement is
    /// `Ok(None)`.
    pub fn place_committed(
        &mut self,
        created: Result<Shape, FactoryError>,
    ) -> Result<Option<ShapeId>, CanvasError> {
        if self.disposed {
            log::debug!("Dropping committed shape: canvas disposed");
            return Err(CanvasError::Disposed);
        }
        let shape = created.map_err(|err| {
            log::warn!("Shape factory failed: {}", err);
            CanvasError::from(err)
        })?;
        let id = self.place_shape(shape);
        match id {
            Some(id) => log::info!("Committed shape {}", id),
            None => log::info!("Committed shape did not fit and was dropped"),
        }
        Ok(id)
    }

    /// Remove a shape. Fails if a gesture is manipulating it.
    pub fn remove_shape(&mut self, id: ShapeId) -> Result<Shape, CanvasError> {
        if self.gesture.as_ref().is_some_and(|g| g.shape_id() == id) {
            return Err(CanvasError::GestureInProgress);
        }
        let shape = self.scene.remove_shape(id).ok_or(CanvasError::ShapeNotFound(id))?;
        self.decorations.remove(&id);
        if self.selection == Some(id) {
            self.selection = None;
        }
        Ok(shape)
    }

    /// Tear down: drop the gesture and any draft. Later events are ignored.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.gesture = None;
        self.draw.dispose();
        self.selection = None;
        self.disposed = true;
        log::debug!("Canvas disposed");
    }
}
