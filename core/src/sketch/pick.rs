//! Hit-testing for editor selection.
//!
//! Finds the sketch element nearest a cursor position, searching in the
//! editor's priority order: dimension labels first (they are small and
//! easily shadowed by the geometry they annotate), then points, then
//! line segments and arcs.

use serde::{Deserialize, Serialize};

use super::dimension::handle_position;
use super::types::{ArcId, DimensionId, LineId, PointId, Sketch, SketchElement};
use crate::geometry::{distance, distance_to_arc, distance_to_segment, project_onto_line, Point2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickTarget {
    Point(PointId),
    Line(LineId),
    Arc(ArcId),
    Dimension(DimensionId),
}

/// A successful hit-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub target: PickTarget,
    pub distance: f64,
}

/// The point nearest `near`, if any lies within `max_distance`.
pub fn find_point_near(sketch: &Sketch, near: Point2, max_distance: f64) -> Option<PointId> {
    let mut closest: Option<(PointId, f64)> = None;
    for (id, position) in sketch.points() {
        let d = distance(near, position);
        if d > max_distance {
            continue;
        }
        if closest.is_none_or(|(_, best)| d < best) {
            closest = Some((id, d));
        }
    }
    closest.map(|(id, _)| id)
}

/// The element nearest `near` within `max_distance`, honoring the
/// dimension > point > segment/arc priority.
pub fn find_geometry_near(sketch: &Sketch, near: Point2, max_distance: f64) -> Option<Pick> {
    // (1/3) The closest dimension label, if any.
    let mut closest: Option<Pick> = None;
    for element in &sketch.elements {
        let (id, handle) = match element {
            SketchElement::PointPointDistance {
                id,
                point_a,
                point_b,
                cosmetic,
                ..
            } => {
                let Some(a) = sketch.point_position(*point_a) else {
                    continue;
                };
                let Some(b) = sketch.point_position(*point_b) else {
                    continue;
                };
                (*id, handle_position(a, b, *cosmetic))
            }
            SketchElement::PointLineDistance {
                id,
                point,
                line,
                cosmetic,
                ..
            } => {
                let Some(p) = sketch.point_position(*point) else {
                    continue;
                };
                let Some((la, lb)) = sketch.line_endpoints(*line) else {
                    continue;
                };
                let Some(a) = sketch.point_position(la) else {
                    continue;
                };
                let Some(b) = sketch.point_position(lb) else {
                    continue;
                };
                // The measured span runs from the point to its projection
                // onto the line.
                let Some(projection) = project_onto_line(p, a, b) else {
                    continue;
                };
                (*id, handle_position(p, projection.point, *cosmetic))
            }
            _ => continue,
        };
        let d = distance(near, handle);
        if d > max_distance {
            continue;
        }
        if closest.is_none_or(|best| d < best.distance) {
            closest = Some(Pick {
                target: PickTarget::Dimension(id),
                distance: d,
            });
        }
    }
    if closest.is_some() {
        return closest;
    }

    // (2/3) The closest point, if any.
    if let Some(id) = find_point_near(sketch, near, max_distance) {
        let d = sketch
            .point_position(id)
            .map(|position| distance(near, position))
            .unwrap_or(max_distance);
        return Some(Pick {
            target: PickTarget::Point(id),
            distance: d,
        });
    }

    // (3/3) The closest line segment or arc.
    let mut closest: Option<Pick> = None;
    for element in &sketch.elements {
        let (target, d) = match element {
            SketchElement::Line {
                id,
                endpoint_a,
                endpoint_b,
            } => {
                let Some(a) = sketch.point_position(*endpoint_a) else {
                    continue;
                };
                let Some(b) = sketch.point_position(*endpoint_b) else {
                    continue;
                };
                (PickTarget::Line(*id), distance_to_segment(near, a, b))
            }
            SketchElement::Arc {
                id,
                center,
                endpoint_a,
                endpoint_b,
            } => {
                let Some(c) = sketch.point_position(*center) else {
                    continue;
                };
                let Some(a) = sketch.point_position(*endpoint_a) else {
                    continue;
                };
                let Some(b) = sketch.point_position(*endpoint_b) else {
                    continue;
                };
                (PickTarget::Arc(*id), distance_to_arc(near, a, b, c))
            }
            _ => continue,
        };
        if d > max_distance {
            continue;
        }
        if closest.is_none_or(|best| d < best.distance) {
            closest = Some(Pick { target, distance: d });
        }
    }
    closest
}
