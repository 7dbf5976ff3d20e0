//! 2D curve intersection calculations for sketch geometry.
//!
//! Lines here are *infinite* lines carried by two distinct points unless a
//! function says otherwise; the solver's derived line facts are unbounded.

use serde::{Deserialize, Serialize};

use super::{distance, perpendicular, try_direction, Point2, EPSILON};

/// An infinite line carried by two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub a: Point2,
    pub b: Point2,
}

impl Line {
    pub fn new(a: Point2, b: Point2) -> Self {
        Self { a, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Intersection of an infinite line with a circle.
///
/// Substitutes the line's parametric form into the circle equation and
/// solves the quadratic. Returns 0, 1 (tangent, |discriminant| < EPSILON),
/// or 2 points. A degenerate line yields no intersections.
pub fn line_circle_intersection(line: &Line, circle: &Circle) -> Vec<Point2> {
    let Some(direction) = try_direction(line.a, line.b) else {
        return vec![];
    };
    let offset = line.a - circle.center;

    // Unit direction, so the quadratic coefficient on t² is 1.
    let b = 2.0 * offset.dot(&direction);
    let c = offset.norm_squared() - circle.radius * circle.radius;
    let discriminant = b * b - 4.0 * c;

    if discriminant.abs() < EPSILON {
        return vec![line.a + direction * (-b / 2.0)];
    }
    if discriminant < 0.0 {
        return vec![];
    }

    let sqrt_disc = discriminant.sqrt();
    vec![
        line.a + direction * ((-b - sqrt_disc) / 2.0),
        line.a + direction * ((-b + sqrt_disc) / 2.0),
    ]
}

/// Intersection of two circles.
///
/// Returns an empty list when the centers coincide (degenerate) or when the
/// circles are too far apart or nested too deeply to touch; a single point
/// when they are (approximately) tangent; otherwise the two intersection
/// points via the forward/right decomposition along the center line.
pub fn circle_circle_intersection(c1: &Circle, c2: &Circle) -> Vec<Point2> {
    let d = distance(c1.center, c2.center);
    if d < EPSILON {
        return vec![];
    }
    if d > c1.radius + c2.radius + EPSILON {
        return vec![];
    }
    if d < (c1.radius - c2.radius).abs() - EPSILON {
        return vec![];
    }

    // Distance from c1 along the center line to the chord through the
    // intersection points, then the half-chord height.
    let forward = (c1.radius * c1.radius - c2.radius * c2.radius + d * d) / (2.0 * d);
    let height_sq = c1.radius * c1.radius - forward * forward;
    let height = height_sq.max(0.0).sqrt();

    let axis = (c2.center - c1.center) / d;
    let chord_mid = c1.center + axis * forward;

    if height < EPSILON {
        return vec![chord_mid];
    }

    let right = perpendicular(axis) * height;
    vec![chord_mid + right, chord_mid - right]
}

/// Intersection of two *infinite* lines.
///
/// Returns `None` when either carrier segment is degenerate or the lines
/// are parallel (cross product of unit directions within EPSILON of zero).
pub fn line_line_intersection(l1: &Line, l2: &Line) -> Option<Point2> {
    let d1 = try_direction(l1.a, l1.b)?;
    let d2 = try_direction(l2.a, l2.b)?;

    let cross = d1.perp(&d2);
    if cross.abs() < EPSILON {
        return None;
    }

    let delta = l2.a - l1.a;
    let t = delta.perp(&d2) / cross;
    Some(l1.a + d1 * t)
}

/// Intersection of two line *segments*.
///
/// Like [`line_line_intersection`], but the result must lie within both
/// segments' parametric ranges, and an intersection that lands within
/// EPSILON of an existing endpoint snaps exactly onto that endpoint.
pub fn segment_segment_intersection(l1: &Line, l2: &Line) -> Option<Point2> {
    let point = line_line_intersection(l1, l2)?;

    let len1 = distance(l1.a, l1.b);
    let len2 = distance(l2.a, l2.b);
    let t = (point - l1.a).dot(&(l1.b - l1.a)) / (len1 * len1);
    let u = (point - l2.a).dot(&(l2.b - l2.a)) / (len2 * len2);
    if !(-EPSILON..=1.0 + EPSILON).contains(&t) || !(-EPSILON..=1.0 + EPSILON).contains(&u) {
        return None;
    }

    for endpoint in [l1.a, l1.b, l2.a, l2.b] {
        if distance(point, endpoint) < EPSILON {
            return Some(endpoint);
        }
    }
    Some(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_line_line_intersection_basic() {
        // X from (0,0)-(10,10) and (0,10)-(10,0)
        let p = line_line_intersection(
            &Line::new(pt(0.0, 0.0), pt(10.0, 10.0)),
            &Line::new(pt(0.0, 10.0), pt(10.0, 0.0)),
        )
        .unwrap();
        assert!((p.x - 5.0).abs() < EPSILON);
        assert!((p.y - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_line_line_intersection_parallel() {
        let p = line_line_intersection(
            &Line::new(pt(0.0, 0.0), pt(10.0, 0.0)),
            &Line::new(pt(0.0, 5.0), pt(10.0, 5.0)),
        );
        assert!(p.is_none());
    }

    #[test]
    fn test_line_line_intersection_degenerate_segment() {
        let p = line_line_intersection(
            &Line::new(pt(3.0, 3.0), pt(3.0, 3.0)),
            &Line::new(pt(0.0, 0.0), pt(10.0, 0.0)),
        );
        assert!(p.is_none());
    }

    #[test]
    fn test_line_line_intersection_beyond_segments() {
        // Infinite lines intersect at (20, 0), outside both carrier segments.
        let p = line_line_intersection(
            &Line::new(pt(0.0, 0.0), pt(10.0, 0.0)),
            &Line::new(pt(20.0, -5.0), pt(20.0, 5.0)),
        )
        .unwrap();
        assert!((p.x - 20.0).abs() < EPSILON);
        assert!(p.y.abs() < EPSILON);
    }

    #[test]
    fn test_segment_segment_rejects_outside() {
        let p = segment_segment_intersection(
            &Line::new(pt(0.0, 0.0), pt(10.0, 0.0)),
            &Line::new(pt(20.0, -5.0), pt(20.0, 5.0)),
        );
        assert!(p.is_none());
    }

    #[test]
    fn test_segment_segment_snaps_to_shared_endpoint() {
        let shared = pt(10.0, 0.0);
        let p = segment_segment_intersection(
            &Line::new(pt(0.0, 0.0), shared),
            &Line::new(shared, pt(10.0, 10.0)),
        )
        .unwrap();
        assert_eq!(p, shared);
    }

    #[test]
    fn test_line_circle_two_points() {
        let hits = line_circle_intersection(
            &Line::new(pt(-10.0, 0.0), pt(10.0, 0.0)),
            &Circle::new(pt(0.0, 0.0), 5.0),
        );
        assert_eq!(hits.len(), 2);
        assert!((hits[0].x + 5.0).abs() < EPSILON);
        assert!((hits[1].x - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_line_circle_tangent() {
        let hits = line_circle_intersection(
            &Line::new(pt(-10.0, 5.0), pt(10.0, 5.0)),
            &Circle::new(pt(0.0, 0.0), 5.0),
        );
        assert_eq!(hits.len(), 1);
        assert!(hits[0].x.abs() < 1e-2);
        assert!((hits[0].y - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_line_circle_miss() {
        let hits = line_circle_intersection(
            &Line::new(pt(-10.0, 9.0), pt(10.0, 9.0)),
            &Circle::new(pt(0.0, 0.0), 5.0),
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn test_circle_circle_two_points() {
        let hits = circle_circle_intersection(
            &Circle::new(pt(0.0, 0.0), 5.0),
            &Circle::new(pt(6.0, 0.0), 5.0),
        );
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            assert!((distance(*hit, pt(0.0, 0.0)) - 5.0).abs() < EPSILON);
            assert!((distance(*hit, pt(6.0, 0.0)) - 5.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_circle_circle_tangent() {
        let hits = circle_circle_intersection(
            &Circle::new(pt(0.0, 0.0), 5.0),
            &Circle::new(pt(10.0, 0.0), 5.0),
        );
        assert_eq!(hits.len(), 1);
        assert!((hits[0].x - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_circle_circle_coincident_centers() {
        let hits = circle_circle_intersection(
            &Circle::new(pt(0.0, 0.0), 5.0),
            &Circle::new(pt(0.0, 0.0), 3.0),
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn test_circle_circle_apart_and_nested() {
        assert!(circle_circle_intersection(
            &Circle::new(pt(0.0, 0.0), 2.0),
            &Circle::new(pt(10.0, 0.0), 2.0),
        )
        .is_empty());
        assert!(circle_circle_intersection(
            &Circle::new(pt(0.0, 0.0), 10.0),
            &Circle::new(pt(1.0, 0.0), 2.0),
        )
        .is_empty());
    }

    #[test]
    fn test_triangulation_symmetry() {
        // Classic triangulation: the two candidates mirror across the
        // center line.
        let hits = circle_circle_intersection(
            &Circle::new(pt(0.0, 0.0), 60.0),
            &Circle::new(pt(100.0, 0.0), 60.0),
        );
        assert_eq!(hits.len(), 2);
        assert!((hits[0].x - 50.0).abs() < EPSILON);
        assert!((hits[0].y + hits[1].y).abs() < EPSILON);
    }
}
