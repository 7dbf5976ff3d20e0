use crate::geometry::Point2;
use crate::sketch::pick::{find_geometry_near, find_point_near, PickTarget};
use crate::sketch::types::Sketch;

fn pt(x: f64, y: f64) -> Point2 {
    Point2::new(x, y)
}

#[test]
fn test_find_point_near_picks_nearest() {
    let mut sketch = Sketch::new();
    let far = sketch.add_point(pt(10.0, 0.0));
    let near = sketch.add_point(pt(1.0, 0.0));

    assert_eq!(find_point_near(&sketch, pt(0.0, 0.0), 5.0), Some(near));
    assert_eq!(find_point_near(&sketch, pt(9.0, 0.0), 5.0), Some(far));
    assert_eq!(find_point_near(&sketch, pt(100.0, 0.0), 5.0), None);
}

/// Dimension labels win over nearer points: they are small targets and
/// would otherwise be unselectable next to the geometry they annotate.
#[test]
fn test_dimension_label_has_priority() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(10.0, 0.0));
    let dim = sketch.add_point_point_distance(a, b, 10.0).unwrap();
    // Default cosmetic puts the label at (5, 10).
    let decoy = sketch.add_point(pt(5.0, 9.0));

    let probe = pt(5.0, 9.4);
    let pick = find_geometry_near(&sketch, probe, 1.0).unwrap();
    assert_eq!(pick.target, PickTarget::Dimension(dim));
    // The decoy point is actually closer.
    assert_eq!(find_point_near(&sketch, probe, 1.0), Some(decoy));
}

#[test]
fn test_point_beats_segment() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(10.0, 0.0));
    sketch.add_line(a, b).unwrap();

    // Right on the segment but nearer to neither endpoint than the
    // threshold: endpoint a still wins because points rank above lines.
    let pick = find_geometry_near(&sketch, pt(0.5, 0.0), 1.0).unwrap();
    assert_eq!(pick.target, PickTarget::Point(a));
}

#[test]
fn test_segment_hit_away_from_points() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(10.0, 0.0));
    let line = sketch.add_line(a, b).unwrap();

    let pick = find_geometry_near(&sketch, pt(5.0, 0.5), 1.0).unwrap();
    assert_eq!(pick.target, PickTarget::Line(line));
    assert!((pick.distance - 0.5).abs() < 1e-9);
}

#[test]
fn test_arc_hit_on_span() {
    let mut sketch = Sketch::new();
    let center = sketch.add_point(pt(0.0, 0.0));
    let e1 = sketch.add_point(pt(5.0, 0.0));
    let e2 = sketch.add_point(pt(0.0, 5.0));
    let arc = sketch.add_arc(center, e1, e2).unwrap();

    // (3,4) lies on the circle inside the quarter span.
    let pick = find_geometry_near(&sketch, pt(3.3, 4.4), 1.0).unwrap();
    assert_eq!(pick.target, PickTarget::Arc(arc));
}

#[test]
fn test_miss_returns_none() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(10.0, 0.0));
    sketch.add_line(a, b).unwrap();

    assert!(find_geometry_near(&sketch, pt(50.0, 50.0), 2.0).is_none());
}
