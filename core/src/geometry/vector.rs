//! 2D vector utilities shared by the solver and hit-testing.
//!
//! All functions are pure. Degenerate inputs (zero-length spans) are
//! explicit `Option`/fallback branches rather than NaN-producing divides.

use super::{Point2, Vector2, EPSILON};

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Point2, b: Point2) -> f64 {
    nalgebra::distance(&a, &b)
}

/// Midpoint between two points.
#[inline]
pub fn midpoint(a: Point2, b: Point2) -> Point2 {
    nalgebra::center(&a, &b)
}

/// Unit vector pointing from `a` to `b`, or `None` when the two points
/// coincide within EPSILON.
#[inline]
pub fn try_direction(a: Point2, b: Point2) -> Option<Vector2> {
    (b - a).try_normalize(EPSILON)
}

/// Perpendicular vector (90° counter-clockwise rotation).
#[inline]
pub fn perpendicular(v: Vector2) -> Vector2 {
    Vector2::new(-v.y, v.x)
}

/// Result of projecting a point onto the infinite line through `a` and `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Closest point on the infinite line.
    pub point: Point2,
    /// Parametric position as a fraction of a -> b (0 at `a`, 1 at `b`).
    pub t: f64,
}

/// Project `p` onto the infinite line through `a` and `b`.
/// Returns `None` when the line is degenerate (`a` ≈ `b`).
pub fn project_onto_line(p: Point2, a: Point2, b: Point2) -> Option<Projection> {
    let direction = try_direction(a, b)?;
    let length = (p - a).dot(&direction);
    Some(Projection {
        point: a + direction * length,
        t: length / distance(a, b),
    })
}

/// Distance from `p` to the line *segment* a-b.
/// A degenerate segment collapses to the distance to `a`.
pub fn distance_to_segment(p: Point2, a: Point2, b: Point2) -> f64 {
    let Some(projection) = project_onto_line(p, a, b) else {
        return distance(p, a);
    };
    if projection.t >= 0.0 && projection.t <= 1.0 {
        distance(p, projection.point)
    } else if projection.t < 0.0 {
        distance(p, a)
    } else {
        distance(p, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert!((distance(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0)) - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_try_direction_degenerate() {
        let p = Point2::new(2.0, 3.0);
        assert!(try_direction(p, p).is_none());
        assert!(try_direction(p, Point2::new(2.0 + 1e-9, 3.0)).is_none());
    }

    #[test]
    fn test_project_onto_line() {
        let proj = project_onto_line(
            Point2::new(5.0, 7.0),
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
        )
        .unwrap();
        assert!((proj.point.x - 5.0).abs() < EPSILON);
        assert!(proj.point.y.abs() < EPSILON);
        assert!((proj.t - 0.5).abs() < EPSILON);

        // Beyond the segment: t exceeds 1.
        let proj = project_onto_line(
            Point2::new(15.0, 1.0),
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
        )
        .unwrap();
        assert!((proj.t - 1.5).abs() < EPSILON);
    }

    #[test]
    fn test_project_onto_degenerate_line() {
        let p = Point2::new(1.0, 1.0);
        assert!(project_onto_line(Point2::new(5.0, 5.0), p, p).is_none());
    }

    #[test]
    fn test_distance_to_segment_clamped() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        // Perpendicular foot inside the segment.
        assert!((distance_to_segment(Point2::new(5.0, 3.0), a, b) - 3.0).abs() < EPSILON);
        // Off the a-end.
        assert!((distance_to_segment(Point2::new(-3.0, 4.0), a, b) - 5.0).abs() < EPSILON);
        // Off the b-end.
        assert!((distance_to_segment(Point2::new(13.0, 4.0), a, b) - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_distance_to_segment_degenerate() {
        let a = Point2::new(2.0, 2.0);
        let p = Point2::new(5.0, 6.0);
        assert!((distance_to_segment(p, a, a) - distance(p, a)).abs() < EPSILON);
    }
}
