//! Geometry kernel: oriented body polygons, bounding boxes and edges.
//!
//! Everything here is a pure function of its arguments. Hypothetical poses
//! are evaluated by building the transform for that pose rather than by
//! moving the shape and putting it back.

use crate::shapes::{Pose, Shape};
use kurbo::{Line, Point, Rect, Size, Vec2};

/// The four corners of a body in container coordinates, in
/// top-left, top-right, bottom-right, bottom-left local order.
pub type Polygon = [Point; 4];

/// Corners of the shape's body at its current pose.
pub fn polygon_of(shape: &Shape) -> Polygon {
    polygon_with(shape, shape.pose, shape.size)
}

/// Corners of the shape's body at a hypothetical pose.
pub fn polygon_at(shape: &Shape, pose: Pose) -> Polygon {
    polygon_with(shape, pose, shape.size)
}

/// Corners of the shape's body at a hypothetical pose and body size.
pub fn polygon_with(shape: &Shape, pose: Pose, size: Size) -> Polygon {
    let affine = shape.affine_at(pose);
    [
        affine * Point::new(0.0, 0.0),
        affine * Point::new(size.width, 0.0),
        affine * Point::new(size.width, size.height),
        affine * Point::new(0.0, size.height),
    ]
}

/// Axis-aligned bounding box of a polygon.
pub fn aabb_of(polygon: &Polygon) -> Rect {
    let mut rect = Rect::from_points(polygon[0], polygon[1]);
    rect = rect.union_pt(polygon[2]);
    rect.union_pt(polygon[3])
}

/// Bounding box of the shape at a hypothetical pose.
pub fn aabb_at(shape: &Shape, pose: Pose) -> Rect {
    aabb_of(&polygon_at(shape, pose))
}

/// Current bounding box of the shape.
pub fn aabb(shape: &Shape) -> Rect {
    aabb_of(&polygon_of(shape))
}

/// Half-open overlap test. Boxes that only touch do not overlap.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    !(a.x1 <= b.x0 || b.x1 <= a.x0 || a.y1 <= b.y0 || b.y1 <= a.y0)
}

/// Whether `inner` lies entirely within `outer` (edges may coincide).
pub fn contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Separation between two boxes along each axis; negative when the
/// projections overlap.
pub fn separation(a: Rect, b: Rect) -> Vec2 {
    Vec2::new(
        (b.x0 - a.x1).max(a.x0 - b.x1),
        (b.y0 - a.y1).max(a.y0 - b.y1),
    )
}

/// A directed polygon edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Segment from one corner to the next.
    pub line: Line,
    /// Unit direction of the segment.
    pub tangent: Vec2,
    /// Unit normal, the tangent turned a quarter turn.
    pub normal: Vec2,
    /// Direction angle of the tangent, in radians.
    pub angle: f64,
}

impl Edge {
    /// Build an edge from two points. Zero-length edges get a zero tangent.
    pub fn new(p0: Point, p1: Point) -> Self {
        let delta = p1 - p0;
        let len = delta.hypot();
        let tangent = if len > 0.0 { delta / len } else { Vec2::ZERO };
        Self {
            line: Line::new(p0, p1),
            tangent,
            normal: Vec2::new(-tangent.y, tangent.x),
            angle: tangent.y.atan2(tangent.x),
        }
    }

    /// Midpoint of the segment.
    pub fn midpoint(&self) -> Point {
        self.line.p0.midpoint(self.line.p1)
    }

    /// Interval covered by the segment when projected onto `axis`.
    pub fn project(&self, axis: Vec2) -> (f64, f64) {
        let a = self.line.p0.to_vec2().dot(axis);
        let b = self.line.p1.to_vec2().dot(axis);
        (a.min(b), a.max(b))
    }

    /// Signed distance from `point` to the line through this edge.
    pub fn signed_distance(&self, point: Point) -> f64 {
        (point - self.line.p0).dot(self.normal)
    }

    /// Whether the two edges are parallel within `cos_tolerance`
    /// (`|cos Δangle| >= cos_tolerance`). Either direction counts.
    pub fn is_parallel(&self, other: &Edge, cos_tolerance: f64) -> bool {
        (self.angle - other.angle).cos().abs() >= cos_tolerance
    }
}

/// The four edges of a closed polygon: top, right, bottom, left in local order.
pub fn edges_of(polygon: &Polygon) -> [Edge; 4] {
    [
        Edge::new(polygon[0], polygon[1]),
        Edge::new(polygon[1], polygon[2]),
        Edge::new(polygon[2], polygon[3]),
        Edge::new(polygon[3], polygon[0]),
    ]
}

/// Overlap length of two intervals; negative when they are apart.
pub fn interval_overlap(a: (f64, f64), b: (f64, f64)) -> f64 {
    a.1.min(b.1) - a.0.max(b.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(x, y, x + w, y + h)
    }

    #[test]
    fn test_polygon_of_unrotated() {
        let shape = Shape::new(10.0, 20.0, 100.0, 50.0);
        let poly = polygon_of(&shape);
        assert_eq!(poly[0], Point::new(10.0, 20.0));
        assert_eq!(poly[1], Point::new(110.0, 20.0));
        assert_eq!(poly[2], Point::new(110.0, 70.0));
        assert_eq!(poly[3], Point::new(10.0, 70.0));
    }

    #[test]
    fn test_aabb_of_rotated() {
        let shape = Shape::new(100.0, 100.0, 100.0, 100.0).with_rotation(FRAC_PI_4);
        let bounds = aabb(&shape);
        let diag = 100.0 * std::f64::consts::SQRT_2;
        assert!((bounds.width() - diag).abs() < 1e-9);
        assert!((bounds.height() - diag).abs() < 1e-9);
        assert!((bounds.y0 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_aabb_at_leaves_shape_untouched() {
        let shape = Shape::new(0.0, 0.0, 10.0, 10.0);
        let before = shape.clone();
        let bounds = aabb_at(&shape, Pose::new(Point::new(50.0, 60.0), 0.0));
        assert_eq!(bounds, rect(50.0, 60.0, 10.0, 10.0));
        assert_eq!(shape, before);
    }

    #[test]
    fn test_overlaps_touching_is_not_overlap() {
        let a = rect(0.0, 0.0, 100.0, 100.0);
        let b = rect(100.0, 0.0, 50.0, 50.0);
        assert!(!overlaps(a, b));
        assert!(overlaps(a, rect(99.0, 0.0, 50.0, 50.0)));
    }

    #[test]
    fn test_overlaps_is_symmetric() {
        let boxes = [
            rect(0.0, 0.0, 10.0, 10.0),
            rect(5.0, 5.0, 10.0, 10.0),
            rect(10.0, 0.0, 10.0, 10.0),
            rect(-5.0, -5.0, 30.0, 30.0),
            rect(20.0, 20.0, 1.0, 1.0),
            rect(3.0, 10.0, 2.0, 2.0),
        ];
        for a in boxes {
            for b in boxes {
                assert_eq!(overlaps(a, b), overlaps(b, a));
            }
        }
    }

    #[test]
    fn test_separation() {
        let sep = separation(rect(0.0, 0.0, 10.0, 10.0), rect(15.0, 5.0, 10.0, 10.0));
        assert_eq!(sep, Vec2::new(5.0, -5.0));
    }

    #[test]
    fn test_edges_of_unrotated() {
        let shape = Shape::new(0.0, 0.0, 10.0, 20.0);
        let edges = edges_of(&polygon_of(&shape));
        assert_eq!(edges[0].tangent, Vec2::new(1.0, 0.0));
        assert_eq!(edges[1].tangent, Vec2::new(0.0, 1.0));
        assert_eq!(edges[2].tangent, Vec2::new(-1.0, 0.0));
        assert_eq!(edges[3].tangent, Vec2::new(0.0, -1.0));
        for edge in edges {
            assert!((edge.tangent.dot(edge.normal)).abs() < 1e-12);
            assert!((edge.normal.hypot() - 1.0).abs() < 1e-12);
        }
        assert_eq!(edges[1].midpoint(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_edge_parallel_and_distance() {
        let a = Edge::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let b = Edge::new(Point::new(10.0, 5.0), Point::new(0.0, 5.0));
        let c = Edge::new(Point::new(0.0, 0.0), Point::new(0.0, 10.0));
        let cos = 12f64.to_radians().cos();
        assert!(a.is_parallel(&b, cos));
        assert!(!a.is_parallel(&c, cos));
        assert!((a.signed_distance(Point::new(3.0, 5.0)).abs() - 5.0).abs() < 1e-12);
        assert_eq!(a.project(Vec2::new(1.0, 0.0)), (0.0, 10.0));
        assert_eq!(b.project(Vec2::new(1.0, 0.0)), (0.0, 10.0));
    }

    #[test]
    fn test_edge_angle_of_rotated_shape() {
        let shape = Shape::new(0.0, 0.0, 10.0, 10.0).with_rotation(FRAC_PI_2);
        let edges = edges_of(&polygon_of(&shape));
        assert!((edges[0].angle - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_interval_overlap() {
        assert_eq!(interval_overlap((0.0, 10.0), (5.0, 20.0)), 5.0);
        assert_eq!(interval_overlap((0.0, 10.0), (12.0, 20.0)), -2.0);
    }

    #[test]
    fn test_contains_rect() {
        let outer = rect(0.0, 0.0, 100.0, 100.0);
        assert!(contains_rect(outer, rect(0.0, 0.0, 100.0, 100.0)));
        assert!(!contains_rect(outer, rect(-1.0, 0.0, 10.0, 10.0)));
    }
}
