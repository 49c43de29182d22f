//! Collaborators that create shapes and lay out their decorations.

use crate::draw::CommitRequest;
use crate::shapes::Shape;
use kurbo::{Point, Size};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Shape factory errors.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Shape rejected: {0}")]
    Rejected(String),
    #[error("Factory unavailable: {0}")]
    Unavailable(String),
}

/// Decoration errors.
#[derive(Debug, Error)]
pub enum DecorationError {
    #[error("Layout error: {0}")]
    Layout(String),
}

/// Boxed future for async factory calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Creates shapes for commit requests.
///
/// Creation may be asynchronous (for instance when a decoration image has
/// to be fetched). The returned future owns what it needs and outlives the
/// call. A failed call must not leave anything behind.
pub trait ShapeFactory: Send + Sync {
    fn create_shape(&self, request: CommitRequest) -> BoxFuture<'static, Result<Shape, FactoryError>>;
}

/// Plain rectangle factory.
#[derive(Debug, Default, Clone, Copy)]
pub struct RectangleFactory;

impl RectangleFactory {
    pub fn new() -> Self {
        Self
    }
}

impl ShapeFactory for RectangleFactory {
    fn create_shape(&self, request: CommitRequest) -> BoxFuture<'static, Result<Shape, FactoryError>> {
        Box::pin(async move {
            let valid = [request.x, request.y, request.width, request.height]
                .iter()
                .all(|v| v.is_finite())
                && request.width > 0.0
                && request.height > 0.0;
            if !valid {
                return Err(FactoryError::Rejected(format!(
                    "invalid rectangle {}x{} at ({}, {})",
                    request.width, request.height, request.x, request.y
                )));
            }
            Ok(Shape::new(request.x, request.y, request.width, request.height))
        })
    }
}

/// Per-shape decoration that follows the body size.
pub trait Decoration: Send {
    fn relayout(&mut self, size: Size) -> Result<(), DecorationError>;
}

/// Circular avatar centered on the body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AvatarLayout {
    /// Center in the shape's local frame.
    pub center: Point,
    pub radius: f64,
}

impl AvatarLayout {
    /// Avatar radius relative to the body's shorter side.
    pub const RADIUS_FACTOR: f64 = 0.2;

    /// Layout for a body of `size`.
    pub fn for_size(size: Size) -> Self {
        Self {
            center: Point::new(size.width / 2.0, size.height / 2.0),
            radius: size.width.min(size.height) * Self::RADIUS_FACTOR,
        }
    }
}

impl Decoration for AvatarLayout {
    fn relayout(&mut self, size: Size) -> Result<(), DecorationError> {
        if !(size.width.is_finite() && size.height.is_finite()) || size.width <= 0.0 || size.height <= 0.0 {
            return Err(DecorationError::Layout(format!(
                "cannot fit avatar in {}x{}",
                size.width, size.height
            )));
        }
        *self = Self::for_size(size);
        Ok(())
    }
}
