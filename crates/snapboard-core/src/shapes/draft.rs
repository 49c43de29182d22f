//! Draft shape shown while a draw gesture is in progress.

use kurbo::{Point, Rect, Size};

/// An uncommitted rectangle. Never part of a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DraftShape {
    /// Top-left corner.
    pub origin: Point,
    /// Extent, floored at the draft minimum on each axis.
    pub size: Size,
}

impl DraftShape {
    /// Create a draft at `origin`.
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// The rectangle spanning two corner points.
    pub fn spanning(start: Point, current: Point, min_extent: f64) -> Self {
        let origin = Point::new(start.x.min(current.x), start.y.min(current.y));
        let size = Size::new(
            (current.x - start.x).abs().max(min_extent),
            (current.y - start.y).abs().max(min_extent),
        );
        Self { origin, size }
    }

    /// The draft as a rect.
    pub fn as_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }
}
