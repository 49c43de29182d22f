//! Typed pointer events for the canvas.

use crate::config::EngineConfig;
use crate::shapes::ShapeId;
use crate::transform::HandleKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// What a pointer position resolves to on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTarget {
    /// Empty canvas.
    Background,
    /// The body of a shape.
    Shape(ShapeId),
    /// A transform handle of the selected shape.
    Handle(ShapeId, HandleKind),
}

impl HitTarget {
    pub fn is_background(&self) -> bool {
        matches!(self, HitTarget::Background)
    }
}

/// Pointer event, in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Double click / double tap.
    DoubleActivate { position: Point },
    Press { position: Point, target: HitTarget },
    Move { position: Point },
    Release { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::DoubleActivate { position }
            | PointerEvent::Press { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Release { position } => position,
        }
    }
}

/// Detects double activation from consecutive presses.
///
/// Timestamps are passed in so the host's event clock is used.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    max_interval: Duration,
    max_distance: f64,
    last_click: Option<(Instant, Point)>,
}

impl ClickTracker {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_interval: Duration::from_millis(config.double_click_ms),
            max_distance: config.double_click_distance,
            last_click: None,
        }
    }

    /// Record a press. Returns true if it completes a double activation.
    pub fn press(&mut self, position: Point, at: Instant) -> bool {
        if let Some((last_time, last_pos)) = self.last_click {
            let elapsed = at.saturating_duration_since(last_time);
            if elapsed < self.max_interval && position.distance(last_pos) < self.max_distance {
                // Reset so a third press starts a new pair.
                self.last_click = None;
                return true;
            }
        }
        self.last_click = Some((at, position));
        false
    }

    pub fn reset(&mut self) {
        self.last_click = None;
    }
}
