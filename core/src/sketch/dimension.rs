//! Cosmetic placement of dimension labels.
//!
//! A dimension's label sits at `{t, offset}` relative to its measured
//! span: `t` is the ratio along the span, `offset` the perpendicular
//! distance from it, both in sketch units. These parameters only affect
//! rendering and hit-testing, never solving.

use super::types::DimensionCosmetic;
use crate::geometry::{distance, perpendicular, try_direction, Point2};

/// Where a dimension label sits for the span a --> b. A degenerate span
/// collapses the label onto `a`.
pub fn handle_position(a: Point2, b: Point2, cosmetic: DimensionCosmetic) -> Point2 {
    let Some(direction) = try_direction(a, b) else {
        return a;
    };
    a + (b - a) * cosmetic.t + perpendicular(direction) * cosmetic.offset
}

/// Recover `{t, offset}` from a dragged label position, the inverse of
/// [`handle_position`]. Returns `None` for a degenerate span.
pub fn handle_parameters(a: Point2, b: Point2, handle: Point2) -> Option<DimensionCosmetic> {
    let direction = try_direction(a, b)?;
    let t = direction.dot(&(handle - a)) / distance(a, b);
    let offset = perpendicular(direction).dot(&(handle - a));
    Some(DimensionCosmetic { t, offset })
}
