use crate::geometry::{distance, Point2, EPSILON};
use crate::sketch::solver::{solve, solve_with_config, SolverConfig};
use crate::sketch::types::{Axis, Sketch};

fn pt(x: f64, y: f64) -> Point2 {
    Point2::new(x, y)
}

fn assert_near(actual: Point2, expected: Point2) {
    assert!(
        distance(actual, expected) < 1e-4,
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn test_unconstrained_point_is_left_alone() {
    let mut sketch = Sketch::new();
    let p = sketch.add_point(pt(7.0, -3.0));

    let outcome = solve(&sketch);

    assert!(outcome.resolved.is_empty());
    assert_eq!(outcome.sketch.point_position(p), Some(pt(7.0, -3.0)));
    // Nothing to learn: the loop goes quiescent on the first pass.
    assert_eq!(outcome.passes, 1);
}

#[test]
fn test_fixed_constraint_resolves_point() {
    let mut sketch = Sketch::new();
    let p = sketch.add_point(pt(3.0, 4.0));
    sketch.add_fixed(p, pt(1.0, 2.0)).unwrap();

    let outcome = solve(&sketch);

    assert_eq!(outcome.resolved.get(&p), Some(&pt(1.0, 2.0)));
    assert_eq!(outcome.sketch.point_position(p), Some(pt(1.0, 2.0)));
}

/// Vertical alignment plus a distance pins the partner onto one of two
/// candidates; the one nearer the pre-solve position wins.
#[test]
fn test_vertical_distance_picks_upper_branch() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(3.0, 40.0));
    sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
    sketch.add_axis_aligned(Axis::Vertical, a, b).unwrap();
    sketch.add_point_point_distance(a, b, 50.0).unwrap();

    let outcome = solve(&sketch);
    assert_near(outcome.resolved[&b], pt(0.0, 50.0));
}

#[test]
fn test_vertical_distance_picks_lower_branch() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(3.0, -40.0));
    sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
    sketch.add_axis_aligned(Axis::Vertical, a, b).unwrap();
    sketch.add_point_point_distance(a, b, 50.0).unwrap();

    let outcome = solve(&sketch);
    assert_near(outcome.resolved[&b], pt(0.0, -50.0));
}

#[test]
fn test_horizontal_alignment_uses_y_axis() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(28.0, 3.0));
    sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
    sketch.add_axis_aligned(Axis::Horizontal, a, b).unwrap();
    sketch.add_point_point_distance(a, b, 30.0).unwrap();

    let outcome = solve(&sketch);
    assert_near(outcome.resolved[&b], pt(30.0, 0.0));
}

/// Classic triangulation: two circles around fixed anchors meet twice; the
/// pre-solve position of the third point selects the branch.
#[test]
fn test_circle_circle_disambiguation() {
    let expected_y = (60.0f64 * 60.0 - 50.0 * 50.0).sqrt();

    for (initial_y, expected) in [
        (30.0, pt(50.0, expected_y)),
        (-30.0, pt(50.0, -expected_y)),
    ] {
        let mut sketch = Sketch::new();
        let a = sketch.add_point(pt(0.0, 0.0));
        let b = sketch.add_point(pt(100.0, 0.0));
        let c = sketch.add_point(pt(45.0, initial_y));
        sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
        sketch.add_fixed(b, pt(100.0, 0.0)).unwrap();
        sketch.add_point_point_distance(a, c, 60.0).unwrap();
        sketch.add_point_point_distance(b, c, 60.0).unwrap();

        let outcome = solve(&sketch);
        assert_near(outcome.resolved[&c], expected);
    }
}

/// A point-on-line constraint alone derives the carrier line but cannot
/// position the point along it: the point stays where it was.
#[test]
fn test_collinear_alone_leaves_point_unresolved() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(10.0, 10.0));
    let c = sketch.add_point(pt(4.0, 9.0));
    sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
    sketch.add_fixed(b, pt(10.0, 10.0)).unwrap();
    let line = sketch.add_line(a, b).unwrap();
    sketch.add_point_on_line(c, line).unwrap();

    let outcome = solve(&sketch);
    assert!(!outcome.resolved.contains_key(&c));
    assert_eq!(outcome.sketch.point_position(c), Some(pt(4.0, 9.0)));
}

/// Adding one more constraint (vertical alignment with a fixed point)
/// intersects the collinear carrier line and pins the point onto it.
#[test]
fn test_collinear_with_alignment_resolves_onto_line() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(10.0, 10.0));
    let c = sketch.add_point(pt(4.0, 9.0));
    let d = sketch.add_point(pt(4.0, -5.0));
    sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
    sketch.add_fixed(b, pt(10.0, 10.0)).unwrap();
    sketch.add_fixed(d, pt(4.0, -5.0)).unwrap();
    let line = sketch.add_line(a, b).unwrap();
    sketch.add_point_on_line(c, line).unwrap();
    sketch.add_axis_aligned(Axis::Vertical, d, c).unwrap();

    let outcome = solve(&sketch);
    // On the line y = x, at x = 4.
    assert_near(outcome.resolved[&c], pt(4.0, 4.0));
}

/// Signed point-line distance: the dependent point lands on the offset
/// line, on the side given by the sign.
#[test]
fn test_point_line_distance_offset_line() {
    for (signed, expected) in [(5.0, pt(5.0, 5.0)), (-5.0, pt(5.0, -5.0))] {
        let mut sketch = Sketch::new();
        let a = sketch.add_point(pt(0.0, 0.0));
        let b = sketch.add_point(pt(10.0, 0.0));
        let p = sketch.add_point(pt(5.0, signed * 0.9));
        let anchor = sketch.add_point(pt(5.0, -20.0));
        sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
        sketch.add_fixed(b, pt(10.0, 0.0)).unwrap();
        sketch.add_fixed(anchor, pt(5.0, -20.0)).unwrap();
        let line = sketch.add_line(a, b).unwrap();
        sketch.add_point_line_distance(p, line, signed).unwrap();
        sketch.add_axis_aligned(Axis::Vertical, anchor, p).unwrap();

        let outcome = solve(&sketch);
        assert_near(outcome.resolved[&p], expected);
    }
}

/// The arc element constrains its center onto the perpendicular bisector
/// of its fixed endpoints.
#[test]
fn test_arc_center_lands_on_bisector() {
    let mut sketch = Sketch::new();
    let e1 = sketch.add_point(pt(0.0, 0.0));
    let e2 = sketch.add_point(pt(10.0, 0.0));
    let center = sketch.add_point(pt(4.0, 7.0));
    let anchor = sketch.add_point(pt(-3.0, 4.0));
    sketch.add_fixed(e1, pt(0.0, 0.0)).unwrap();
    sketch.add_fixed(e2, pt(10.0, 0.0)).unwrap();
    sketch.add_fixed(anchor, pt(-3.0, 4.0)).unwrap();
    sketch.add_arc(center, e1, e2).unwrap();
    sketch
        .add_axis_aligned(Axis::Horizontal, anchor, center)
        .unwrap();

    let outcome = solve(&sketch);
    // Bisector of (0,0)-(10,0) is x = 5; horizontal alignment gives y = 4.
    assert_near(outcome.resolved[&center], pt(5.0, 4.0));
}

/// Point-on-arc membership propagates the arc's radius to the new point.
#[test]
fn test_point_on_arc_inherits_radius() {
    let mut sketch = Sketch::new();
    let center = sketch.add_point(pt(0.0, 0.0));
    let e1 = sketch.add_point(pt(5.0, 0.0));
    let e2 = sketch.add_point(pt(0.0, 5.0));
    let p = sketch.add_point(pt(0.2, 5.5));
    sketch.add_fixed(center, pt(0.0, 0.0)).unwrap();
    sketch.add_fixed(e1, pt(5.0, 0.0)).unwrap();
    let arc = sketch.add_arc(center, e1, e2).unwrap();
    sketch.add_point_on_arc(p, arc).unwrap();
    sketch.add_axis_aligned(Axis::Vertical, center, p).unwrap();

    let outcome = solve(&sketch);
    // Radius 5 around the origin, on the vertical axis, nearer the top.
    assert_near(outcome.resolved[&p], pt(0.0, 5.0));
}

/// A driven (measure-only) dimension displays a value but never drives
/// geometry.
#[test]
fn test_measure_only_dimension_does_not_drive() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(3.0, 40.0));
    sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
    sketch.add_axis_aligned(Axis::Vertical, a, b).unwrap();
    sketch.add_point_point_measurement(a, b, 50.0).unwrap();

    let outcome = solve(&sketch);
    assert!(!outcome.resolved.contains_key(&b));
    assert_eq!(outcome.sketch.point_position(b), Some(pt(3.0, 40.0)));
}

/// Re-solving an already-solved sketch changes nothing.
#[test]
fn test_solve_is_idempotent() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(100.0, 0.0));
    let c = sketch.add_point(pt(45.0, 30.0));
    sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
    sketch.add_fixed(b, pt(100.0, 0.0)).unwrap();
    sketch.add_point_point_distance(a, c, 60.0).unwrap();
    sketch.add_point_point_distance(b, c, 60.0).unwrap();

    let first = solve(&sketch);
    let second = solve(&first.sketch);

    assert_eq!(first.sketch, second.sketch);
    assert_eq!(first.resolved.len(), second.resolved.len());
    for (point, position) in &first.resolved {
        assert_near(second.resolved[point], *position);
    }
}

/// Contradictory constraints must not loop forever or crash; the seeded
/// fixed position wins and propagation halts at a fixed point.
#[test]
fn test_contradiction_terminates() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(1.0, 1.0));
    sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
    sketch.add_fixed(b, pt(1.0, 1.0)).unwrap();
    // Impossible: a and b are sqrt(2) apart but constrained to 50.
    sketch.add_point_point_distance(a, b, 50.0).unwrap();

    let outcome = solve(&sketch);
    assert!(outcome.passes <= SolverConfig::default().max_passes);
    assert_eq!(outcome.resolved[&a], pt(0.0, 0.0));
    assert_eq!(outcome.resolved[&b], pt(1.0, 1.0));
}

/// The pass cap is a real bound: a two-hop chain needs two passes, so a
/// one-pass budget resolves only the first hop.
#[test]
fn test_pass_cap_limits_propagation_depth() {
    let build = || {
        let mut sketch = Sketch::new();
        let a = sketch.add_point(pt(0.0, 0.0));
        let b = sketch.add_point(pt(0.0, 9.0));
        let c = sketch.add_point(pt(8.0, 9.0));
        sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
        sketch.add_axis_aligned(Axis::Vertical, a, b).unwrap();
        sketch.add_point_point_distance(a, b, 10.0).unwrap();
        sketch.add_axis_aligned(Axis::Horizontal, b, c).unwrap();
        sketch.add_point_point_distance(b, c, 10.0).unwrap();
        (sketch, b, c)
    };

    let (sketch, b, c) = build();
    let capped = solve_with_config(&sketch, SolverConfig { max_passes: 1 });
    assert!(capped.resolved.contains_key(&b));
    assert!(!capped.resolved.contains_key(&c));

    let (sketch, b, c) = build();
    let full = solve(&sketch);
    assert_near(full.resolved[&b], pt(0.0, 10.0));
    assert_near(full.resolved[&c], pt(10.0, 10.0));
}

#[test]
fn test_fully_constrained_cue() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(5.0, 5.0));
    sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
    sketch.add_fixed(b, pt(1.0, 1.0)).unwrap();

    let outcome = solve(&sketch);
    // a resolved exactly where it is stored; b resolved away from its
    // stored position (still mid-drag, visually "not settled").
    assert!(outcome.is_fully_constrained(a, pt(0.0, 0.0)));
    assert!(!outcome.is_fully_constrained(b, pt(5.0, 5.0)));
    // An unconstrained point is never fully constrained.
    let free = sketch.add_point(pt(2.0, 2.0));
    let outcome = solve(&sketch);
    assert!(!outcome.is_fully_constrained(free, pt(2.0, 2.0)));
}

/// Dragging the free point across the anchor line flips the chosen branch,
/// which is what makes interactive dragging feel continuous.
#[test]
fn test_branch_flip_follows_presolve_position() {
    let solve_with_initial = |y: f64| {
        let mut sketch = Sketch::new();
        let a = sketch.add_point(pt(0.0, 0.0));
        let b = sketch.add_point(pt(30.0, y));
        sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
        sketch.add_axis_aligned(Axis::Horizontal, a, b).unwrap();
        sketch.add_point_point_distance(a, b, 30.0).unwrap();
        let outcome = solve(&sketch);
        outcome.resolved[&b]
    };

    // Either side of the anchor: x keeps its sign.
    assert!(solve_with_initial(1.0).x > 0.0);
    assert!(solve_with_initial(-1.0).x > 0.0);
    let left = {
        let mut sketch = Sketch::new();
        let a = sketch.add_point(pt(0.0, 0.0));
        let b = sketch.add_point(pt(-30.0, 1.0));
        sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
        sketch.add_axis_aligned(Axis::Horizontal, a, b).unwrap();
        sketch.add_point_point_distance(a, b, 30.0).unwrap();
        solve(&sketch).resolved[&b]
    };
    assert!(left.x < 0.0);
    assert!((left.x + 30.0).abs() < EPSILON);
}
