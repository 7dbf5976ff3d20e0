use crate::geometry::Point2;
use crate::sketch::solver::solve;
use crate::sketch::types::{Axis, EntityKind, Sketch, SketchError};

fn pt(x: f64, y: f64) -> Point2 {
    Point2::new(x, y)
}

#[test]
fn test_sketch_serde_round_trip_preserves_handles() {
    let mut sketch = Sketch::with_origin();
    let a = sketch.add_point(pt(10.0, 0.0));
    let b = sketch.add_point(pt(10.0, 10.0));
    let line = sketch.add_line(a, b).unwrap();
    sketch.add_axis_aligned(Axis::Vertical, a, b).unwrap();
    let dim = sketch.add_point_point_distance(a, b, 10.0).unwrap();

    let json = serde_json::to_string(&sketch).expect("failed to serialize sketch");
    let restored: Sketch = serde_json::from_str(&json).expect("failed to deserialize sketch");

    assert_eq!(restored, sketch);
    // Handles must stay valid in the restored sketch.
    assert_eq!(restored.point_position(a), Some(pt(10.0, 0.0)));
    assert_eq!(restored.line_endpoints(line), Some((a, b)));
    assert_eq!(restored.dimension_value(dim), Some(10.0));
}

#[test]
fn test_arena_labels_and_kinds() {
    let mut sketch = Sketch::with_origin();
    let (origin, position) = sketch.points().next().unwrap();
    assert_eq!(position, Point2::origin());
    assert_eq!(sketch.arena.label(origin.raw()), Some("Origin"));

    let p = sketch.add_point(pt(1.0, 1.0));
    let q = sketch.add_point(pt(2.0, 2.0));
    let line = sketch.add_line(p, q).unwrap();

    // Auto-generated labels derive from the handle.
    assert_eq!(sketch.arena.label(p.raw()), Some("p1"));
    assert_eq!(sketch.arena.kind(p.raw()), Some(EntityKind::Point));
    assert_eq!(sketch.arena.kind(line.raw()), Some(EntityKind::Line));
    assert_eq!(sketch.arena.len(), 4);
}

#[test]
fn test_with_origin_solves_to_origin() {
    let sketch = Sketch::with_origin();
    let (origin, _) = sketch.points().next().unwrap();

    let outcome = solve(&sketch);
    assert_eq!(outcome.resolved.get(&origin), Some(&Point2::origin()));
}

#[test]
fn test_mutators_reject_foreign_handles() {
    // Handles are plain arena indices, so burn a few slots in the other
    // sketch to guarantee the foreign handles do not exist locally.
    let mut other = Sketch::new();
    let _ = other.add_point(pt(9.0, 9.0));
    let foreign_point = other.add_point(pt(0.0, 0.0));
    let p2 = other.add_point(pt(1.0, 0.0));
    let foreign_line = other.add_line(foreign_point, p2).unwrap();

    let mut sketch = Sketch::new();
    let local = sketch.add_point(pt(0.0, 0.0));

    assert_eq!(
        sketch.add_line(local, foreign_point),
        Err(SketchError::UnknownPoint(foreign_point))
    );
    assert_eq!(
        sketch.add_point_on_line(local, foreign_line),
        Err(SketchError::UnknownLine(foreign_line))
    );
    assert_eq!(
        sketch.move_point(foreign_point, pt(5.0, 5.0)),
        Err(SketchError::UnknownPoint(foreign_point))
    );
}

#[test]
fn test_remove_point_cascades() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(10.0, 0.0));
    let c = sketch.add_point(pt(5.0, 5.0));
    let line = sketch.add_line(a, b).unwrap();
    sketch.add_point_on_line(c, line).unwrap();
    sketch.add_point_point_distance(a, c, 7.0).unwrap();
    sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();

    sketch.remove_point(a).unwrap();

    // The point, its line, and every constraint touching either are gone;
    // unrelated points survive.
    assert_eq!(sketch.point_position(a), None);
    assert_eq!(sketch.line_endpoints(line), None);
    assert_eq!(sketch.point_position(b), Some(pt(10.0, 0.0)));
    assert_eq!(sketch.point_position(c), Some(pt(5.0, 5.0)));
    assert_eq!(sketch.elements.len(), 2);

    // Removing again is an error: the handle no longer resolves.
    assert_eq!(
        sketch.remove_point(a),
        Err(SketchError::UnknownPoint(a))
    );
}

#[test]
fn test_solver_does_not_mutate_input() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(3.0, 4.0));
    sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
    let before = sketch.clone();

    let outcome = solve(&sketch);

    assert_eq!(sketch, before);
    assert_ne!(outcome.sketch, before);
}
