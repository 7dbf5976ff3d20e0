//! Arc geometry for sketch arcs.
//!
//! Sketch arcs are carried by two endpoints and a center point, with the
//! standing assumption that the endpoints are equidistant from the center.
//! Interactive edits can leave the three slightly inconsistent, so distance
//! queries first re-derive a center that is exactly equidistant.

use super::{distance, midpoint, perpendicular, project_onto_line, try_direction, Point2};

/// The point closest to `center` that is exactly equidistant from `a` and
/// `b`: the projection of `center` onto the perpendicular bisector of a-b.
/// When `a` ≈ `b` every point is equidistant and `center` is returned as-is.
pub fn adjusted_arc_center(a: Point2, b: Point2, center: Point2) -> Point2 {
    let Some(direction) = try_direction(a, b) else {
        return center;
    };
    let mid = midpoint(a, b);
    let bisector_end = mid + perpendicular(direction);
    match project_onto_line(center, mid, bisector_end) {
        Some(projection) => projection.point,
        None => center,
    }
}

/// Distance from `p` to the arc from `a` to `b` around `center`.
///
/// The arc always takes the short way around (sweep ≤ 180°). If the angle
/// of `p` falls within that sweep the distance is measured to the circle,
/// otherwise to the nearest endpoint.
pub fn distance_to_arc(p: Point2, a: Point2, b: Point2, center: Point2) -> f64 {
    if distance(a, b) < super::EPSILON {
        return distance(p, a);
    }

    let center = adjusted_arc_center(a, b, center);
    let radius = distance(center, a);

    let angle_of = |q: Point2| (q.y - center.y).atan2(q.x - center.x);
    let sweep = wrap_angle(angle_of(b) - angle_of(a));
    let offset = wrap_angle(angle_of(p) - angle_of(a));

    let within = if sweep >= 0.0 {
        (0.0..=sweep).contains(&offset)
    } else {
        (sweep..=0.0).contains(&offset)
    };

    if within {
        (distance(p, center) - radius).abs()
    } else {
        distance(p, a).min(distance(p, b))
    }
}

/// Wrap an angle into (-PI, PI].
fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::PI;
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::EPSILON;

    fn pt(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_adjusted_center_already_consistent() {
        let adjusted = adjusted_arc_center(pt(5.0, 0.0), pt(-5.0, 0.0), pt(0.0, 0.0));
        assert!(distance(adjusted, pt(0.0, 0.0)) < EPSILON);
    }

    #[test]
    fn test_adjusted_center_moves_onto_bisector() {
        // A center nudged off the bisector of a horizontal chord keeps its
        // y but has x pulled back to the bisector.
        let adjusted = adjusted_arc_center(pt(5.0, 0.0), pt(-5.0, 0.0), pt(0.3, -1.0));
        assert!(adjusted.x.abs() < EPSILON);
        assert!((adjusted.y + 1.0).abs() < EPSILON);
        assert!(
            (distance(adjusted, pt(5.0, 0.0)) - distance(adjusted, pt(-5.0, 0.0))).abs() < EPSILON
        );
    }

    #[test]
    fn test_distance_to_arc_on_span() {
        // Quarter arc from (5,0) to (0,5): probe along the 45° radial.
        let probe = pt(9.0 / 2f64.sqrt(), 9.0 / 2f64.sqrt());
        let d = distance_to_arc(probe, pt(5.0, 0.0), pt(0.0, 5.0), pt(0.0, 0.0));
        assert!((d - 4.0).abs() < EPSILON);
    }

    #[test]
    fn test_distance_to_arc_off_span() {
        // A probe on the far side of the same quarter arc measures to the
        // nearest endpoint, not to the circle.
        let d = distance_to_arc(pt(-9.0, 0.0), pt(5.0, 0.0), pt(0.0, 5.0), pt(0.0, 0.0));
        let expected = distance(pt(-9.0, 0.0), pt(0.0, 5.0));
        assert!((d - expected).abs() < EPSILON);
    }

    #[test]
    fn test_distance_to_arc_degenerate_endpoints() {
        let a = pt(3.0, 3.0);
        let d = distance_to_arc(pt(0.0, 0.0), a, a, pt(10.0, 10.0));
        assert!((d - distance(pt(0.0, 0.0), a)).abs() < EPSILON);
    }

    #[test]
    fn test_wrap_angle() {
        use std::f64::consts::PI;
        assert!((wrap_angle(3.0 * PI) - PI).abs() < EPSILON);
        assert!((wrap_angle(-3.0 * PI) - PI).abs() < EPSILON);
        assert!((wrap_angle(0.5) - 0.5).abs() < EPSILON);
    }
}
