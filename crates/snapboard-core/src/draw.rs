//! Draw gesture: double-activate to arm, then press, drag and release to
//! draw a new rectangle.

use crate::config::{EngineConfig, DRAFT_MIN_EXTENT};
use crate::input::{HitTarget, PointerEvent};
use crate::shapes::DraftShape;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A request for the shape factory to create a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommitRequest {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CommitRequest {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

impl From<DraftShape> for CommitRequest {
    fn from(draft: DraftShape) -> Self {
        Self::new(draft.origin.x, draft.origin.y, draft.size.width, draft.size.height)
    }
}

/// State of the draw gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawState {
    /// Not drawing.
    #[default]
    Idle,
    /// Waiting for a press on empty canvas.
    Armed,
    /// Dragging out a draft.
    Drawing {
        /// Where the press landed.
        start: Point,
        /// The draft spanning `start` and the latest pointer position.
        draft: DraftShape,
    },
}

/// Turns pointer events into commit requests for new shapes.
///
/// Owns no scene state. Placement validity of the committed shape is the
/// caller's concern.
#[derive(Debug, Clone)]
pub struct DrawController {
    state: DrawState,
    min_size: f64,
    draft_min_extent: f64,
    disposed: bool,
}

impl DrawController {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            state: DrawState::Idle,
            min_size: config.min_size,
            draft_min_extent: DRAFT_MIN_EXTENT,
            disposed: false,
        }
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    /// The draft being drawn, if any.
    pub fn draft(&self) -> Option<&DraftShape> {
        match &self.state {
            DrawState::Drawing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Whether the controller is armed or drawing.
    pub fn is_active(&self) -> bool {
        self.state != DrawState::Idle
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Enter the armed state. Only valid from idle.
    pub fn arm(&mut self) {
        if self.disposed || self.state != DrawState::Idle {
            return;
        }
        log::debug!("Draw armed");
        self.state = DrawState::Armed;
    }

    /// Drop back to idle, discarding any draft without committing.
    pub fn cancel(&mut self) {
        if self.is_active() {
            log::debug!("Draw cancelled");
        }
        self.state = DrawState::Idle;
    }

    /// Tear down. Safe to call more than once; later events are ignored.
    pub fn dispose(&mut self) {
        self.cancel();
        self.disposed = true;
    }

    /// Feed one pointer event. Returns a commit request when a large enough
    /// draft is released.
    pub fn handle_event(&mut self, event: &PointerEvent) -> Option<CommitRequest> {
        if self.disposed {
            return None;
        }
        match (self.state, *event) {
            (DrawState::Idle, PointerEvent::DoubleActivate { .. }) => {
                self.arm();
                None
            }
            (DrawState::Armed, PointerEvent::Press { position, target }) => {
                if target == HitTarget::Background {
                    let draft = DraftShape::spanning(position, position, self.draft_min_extent);
                    self.state = DrawState::Drawing {
                        start: position,
                        draft,
                    };
                    log::debug!("Draw started at ({:.1}, {:.1})", position.x, position.y);
                }
                None
            }
            (DrawState::Drawing { start, .. }, PointerEvent::Move { position }) => {
                let draft = DraftShape::spanning(start, position, self.draft_min_extent);
                self.state = DrawState::Drawing { start, draft };
                None
            }
            (DrawState::Drawing { draft, .. }, PointerEvent::Release { .. }) => {
                self.state = DrawState::Idle;
                if draft.size.width >= self.min_size && draft.size.height >= self.min_size {
                    let request = CommitRequest::from(draft);
                    log::info!(
                        "Draw committed {:.1}x{:.1} at ({:.1}, {:.1})",
                        request.width,
                        request.height,
                        request.x,
                        request.y
                    );
                    Some(request)
                } else {
                    log::debug!(
                        "Draw discarded: {:.1}x{:.1} is below minimum size",
                        draft.size.width,
                        draft.size.height
                    );
                    None
                }
            }
            _ => None,
        }
    }
}
