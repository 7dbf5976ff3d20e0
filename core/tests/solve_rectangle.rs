//! End-to-end solve of a dimensioned rectangle through the public API.

use sketch_core::geometry::{distance, Point2};
use sketch_core::sketch::solver::solve;
use sketch_core::sketch::types::{Axis, Sketch};

fn pt(x: f64, y: f64) -> Point2 {
    Point2::new(x, y)
}

#[test]
fn solve_dimensioned_rectangle() {
    // A 40x30 rectangle anchored at the origin, drawn sloppily: every
    // corner except the anchor is off by a few units.
    let mut sketch = Sketch::with_origin();
    let (origin, _) = sketch.points().next().expect("origin point");
    let p10 = sketch.add_point(pt(38.0, 2.0));
    let p01 = sketch.add_point(pt(-1.0, 28.0));
    let p11 = sketch.add_point(pt(41.0, 31.0));

    sketch.add_line(origin, p10).unwrap();
    sketch.add_line(origin, p01).unwrap();
    sketch.add_line(p10, p11).unwrap();
    sketch.add_line(p01, p11).unwrap();

    sketch.add_axis_aligned(Axis::Horizontal, origin, p10).unwrap();
    sketch.add_axis_aligned(Axis::Vertical, origin, p01).unwrap();
    sketch.add_axis_aligned(Axis::Vertical, p10, p11).unwrap();
    sketch.add_axis_aligned(Axis::Horizontal, p01, p11).unwrap();
    sketch.add_point_point_distance(origin, p10, 40.0).unwrap();
    sketch.add_point_point_distance(origin, p01, 30.0).unwrap();

    let outcome = solve(&sketch);

    assert!(distance(outcome.resolved[&origin], pt(0.0, 0.0)) < 1e-6);
    assert!(distance(outcome.resolved[&p10], pt(40.0, 0.0)) < 1e-6);
    assert!(distance(outcome.resolved[&p01], pt(0.0, 30.0)) < 1e-6);
    assert!(distance(outcome.resolved[&p11], pt(40.0, 30.0)) < 1e-6);

    // The far corner needs facts derived from the solved near corners, so
    // this cannot finish in a single pass.
    assert!(outcome.passes > 1);

    // Re-solving the solved sketch is a no-op.
    let again = solve(&outcome.sketch);
    assert_eq!(again.sketch, outcome.sketch);
}
