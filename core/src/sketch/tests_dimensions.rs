use crate::geometry::{distance, Point2};
use crate::sketch::dimension::{handle_parameters, handle_position};
use crate::sketch::solver::solve;
use crate::sketch::types::{Axis, DimensionCosmetic, Sketch, SketchError};

fn pt(x: f64, y: f64) -> Point2 {
    Point2::new(x, y)
}

#[test]
fn test_handle_position_along_and_off_the_span() {
    let a = pt(0.0, 0.0);
    let b = pt(10.0, 0.0);
    let handle = handle_position(a, b, DimensionCosmetic { t: 0.3, offset: 4.0 });
    assert!(distance(handle, pt(3.0, 4.0)) < 1e-9);

    // Negative offset sits on the other side of the span.
    let handle = handle_position(a, b, DimensionCosmetic { t: 1.0, offset: -2.0 });
    assert!(distance(handle, pt(10.0, -2.0)) < 1e-9);
}

#[test]
fn test_handle_parameters_inverts_position() {
    let a = pt(2.0, 1.0);
    let b = pt(8.0, 9.0);
    let cosmetic = DimensionCosmetic { t: 0.7, offset: -3.5 };
    let handle = handle_position(a, b, cosmetic);
    let recovered = handle_parameters(a, b, handle).unwrap();
    assert!((recovered.t - cosmetic.t).abs() < 1e-9);
    assert!((recovered.offset - cosmetic.offset).abs() < 1e-9);
}

#[test]
fn test_degenerate_span_collapses() {
    let a = pt(3.0, 3.0);
    let cosmetic = DimensionCosmetic::default();
    assert_eq!(handle_position(a, a, cosmetic), a);
    assert!(handle_parameters(a, a, pt(5.0, 5.0)).is_none());
}

/// Editing a dimension's value re-drives the geometry on the next solve.
#[test]
fn test_set_dimension_value_redrives_geometry() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(0.0, 45.0));
    sketch.add_fixed(a, pt(0.0, 0.0)).unwrap();
    sketch.add_axis_aligned(Axis::Vertical, a, b).unwrap();
    let dim = sketch.add_point_point_distance(a, b, 50.0).unwrap();

    let outcome = solve(&sketch);
    assert!(distance(outcome.resolved[&b], pt(0.0, 50.0)) < 1e-6);

    let mut sketch = outcome.sketch;
    sketch.set_dimension_value(dim, 20.0).unwrap();
    let outcome = solve(&sketch);
    assert!(distance(outcome.resolved[&b], pt(0.0, 20.0)) < 1e-6);
}

#[test]
fn test_set_dimension_cosmetic() {
    let mut sketch = Sketch::new();
    let a = sketch.add_point(pt(0.0, 0.0));
    let b = sketch.add_point(pt(10.0, 0.0));
    let dim = sketch.add_point_point_distance(a, b, 10.0).unwrap();

    let cosmetic = DimensionCosmetic { t: 0.25, offset: -6.0 };
    sketch.set_dimension_cosmetic(dim, cosmetic).unwrap();
    assert_eq!(sketch.dimension_cosmetic(dim), Some(cosmetic));
    assert_eq!(sketch.dimension_value(dim), Some(10.0));
}

#[test]
fn test_dimension_edits_reject_unknown_handles() {
    let mut other = Sketch::new();
    let a = other.add_point(pt(0.0, 0.0));
    let b = other.add_point(pt(1.0, 0.0));
    let foreign = other.add_point_point_distance(a, b, 1.0).unwrap();

    let mut sketch = Sketch::new();
    assert_eq!(
        sketch.set_dimension_value(foreign, 2.0),
        Err(SketchError::UnknownDimension(foreign))
    );
    assert_eq!(
        sketch.remove_dimension(foreign),
        Err(SketchError::UnknownDimension(foreign))
    );
}
