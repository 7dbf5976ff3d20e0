//! The constraint propagation engine.
//!
//! Every solve is stateless: the engine seeds a fresh [`FactStore`] from
//! the sketch's elements, then runs a bounded forward-chaining loop whose
//! rules only ever add facts, and finally extracts all `Fixed` facts into
//! a resolved-position map. Points that never acquire a `Fixed` fact keep
//! their pre-solve position; under-determination is not an error.
//!
//! When a rule finds several geometrically valid positions for a point
//! (line/circle and circle/circle intersections), it picks the candidate
//! nearest the point's pre-solve position. That keeps dragging continuous:
//! pulling a point through a cusp switches solution branches instead of
//! snapping to a canonical one.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::facts::{Fact, FactPattern, FactStore};
use super::types::{Axis, PointId, Sketch, SketchElement};
use crate::geometry::{
    circle_circle_intersection, distance, line_circle_intersection, line_line_intersection,
    midpoint, perpendicular, try_direction, Circle, Line, Point2, Vector2, EPSILON,
};

/// Carrier length for derived axis-aligned lines; any nonzero value works
/// since line facts are infinite.
const AXIS_SPAN: f64 = 100.0;

#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Hard cap on propagation passes. A safety bound, not a tuning
    /// parameter: facts grow monotonically and realistic sketches reach a
    /// fixed point within a handful of passes.
    pub max_passes: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self { max_passes: 50 }
    }
}

/// Result of one solve.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Every point the engine managed to pin down.
    pub resolved: HashMap<PointId, Point2>,
    /// The input sketch with resolved positions applied; unresolved points
    /// keep their pre-solve position.
    pub sketch: Sketch,
    /// Propagation passes executed (including the quiescent final pass).
    pub passes: usize,
    /// Facts in the store when propagation stopped.
    pub fact_count: usize,
}

impl SolveOutcome {
    /// Whether a point is fully constrained: it resolved, and the resolved
    /// position agrees with the stored one. Consumers use this purely as a
    /// visual cue.
    pub fn is_fully_constrained(&self, point: PointId, stored: Point2) -> bool {
        self.resolved
            .get(&point)
            .is_some_and(|resolved| distance(*resolved, stored) < EPSILON)
    }
}

pub fn solve(sketch: &Sketch) -> SolveOutcome {
    solve_with_config(sketch, SolverConfig::default())
}

pub fn solve_with_config(sketch: &Sketch, config: SolverConfig) -> SolveOutcome {
    let mut store = FactStore::new();
    let original = seed_facts(sketch, &mut store);

    let mut passes = 0;
    for pass in 0..config.max_passes {
        passes = pass + 1;
        let before = store.len();

        derive_from_fixed_anchors(&mut store);
        intersect_lines_with_circles(&mut store, &original);
        intersect_circle_pairs(&mut store, &original);
        intersect_line_pairs(&mut store);
        derive_offset_lines(&mut store);
        derive_collinear_lines(&mut store);
        derive_equidistant_bisectors(&mut store);
        propagate_equidistant_radii(&mut store);

        let learned = store.len() - before;
        trace!(pass, learned, total = store.len(), "propagation pass");
        if learned == 0 {
            break;
        }
    }

    let mut resolved = HashMap::new();
    for fact in store.matching(&FactPattern::any_fixed()) {
        if let Fact::Fixed { point, position } = fact {
            resolved.insert(*point, *position);
        }
    }
    debug!(
        passes,
        facts = store.len(),
        resolved = resolved.len(),
        "solve finished"
    );

    let mut updated = sketch.clone();
    updated.apply_positions(&resolved);

    SolveOutcome {
        resolved,
        sketch: updated,
        passes,
        fact_count: store.len(),
    }
}

/// Translate sketch elements into initial facts and record every point's
/// pre-solve position for the nearest-to-original tie-break.
fn seed_facts(sketch: &Sketch, store: &mut FactStore) -> HashMap<PointId, Point2> {
    let mut original = HashMap::new();

    for element in &sketch.elements {
        match element {
            SketchElement::Point { id, position } => {
                original.insert(*id, *position);
            }
            SketchElement::Line { .. } => {}
            SketchElement::Arc {
                center,
                endpoint_a,
                endpoint_b,
                ..
            } => {
                store.add(Fact::Equidistant {
                    center: *center,
                    point1: *endpoint_a,
                    point2: *endpoint_b,
                });
            }
            SketchElement::Fixed { point, position } => {
                store.add(Fact::Fixed {
                    point: *point,
                    position: *position,
                });
            }
            SketchElement::AxisAligned {
                axis,
                point_a,
                point_b,
            } => {
                // Symmetric relation: insert both directions so either
                // point can serve as the fixed anchor later.
                for (p, q) in [(*point_a, *point_b), (*point_b, *point_a)] {
                    store.add(match axis {
                        Axis::Vertical => Fact::Vertical {
                            point1: p,
                            point2: q,
                        },
                        Axis::Horizontal => Fact::Horizontal {
                            point1: p,
                            point2: q,
                        },
                    });
                }
            }
            SketchElement::PointPointDistance {
                point_a,
                point_b,
                distance,
                measure_only,
                ..
            } => {
                if *measure_only {
                    continue;
                }
                for (p, q) in [(*point_a, *point_b), (*point_b, *point_a)] {
                    store.add(Fact::Distance {
                        point1: p,
                        point2: q,
                        distance: *distance,
                    });
                }
            }
            SketchElement::PointLineDistance {
                point,
                line,
                distance,
                measure_only,
                ..
            } => {
                if *measure_only {
                    continue;
                }
                let Some((line1, line2)) = sketch.line_endpoints(*line) else {
                    continue;
                };
                // The sign flips with the line's orientation.
                store.add(Fact::PointLineDistance {
                    point: *point,
                    line1,
                    line2,
                    distance: *distance,
                });
                store.add(Fact::PointLineDistance {
                    point: *point,
                    line1: line2,
                    line2: line1,
                    distance: -*distance,
                });
            }
            SketchElement::PointOnLine { point, line } => {
                let Some((line1, line2)) = sketch.line_endpoints(*line) else {
                    continue;
                };
                let mut points = vec![*point, line1, line2];
                points.sort();
                store.add(Fact::Collinear { points });
            }
            SketchElement::PointOnArc { point, arc } => {
                let Some((center, endpoint_a, _)) = sketch.arc_points(*arc) else {
                    continue;
                };
                store.add(Fact::Equidistant {
                    center,
                    point1: endpoint_a,
                    point2: *point,
                });
            }
        }
    }

    original
}

/// The first known position of a point, if any. At most one `Fixed` fact
/// exists per point, so "first" is "the" position.
fn first_fixed(store: &FactStore, point: PointId) -> Option<Point2> {
    store
        .matching(&FactPattern::fixed(point))
        .find_map(|fact| match fact {
            Fact::Fixed { position, .. } => Some(*position),
            _ => None,
        })
}

/// The constrained distance between two points, if one can be read off the
/// store: from both points being fixed, or from a distance fact in either
/// direction.
fn known_distance(store: &FactStore, a: PointId, b: PointId) -> Option<f64> {
    if a == b {
        return Some(0.0);
    }
    if let (Some(pa), Some(pb)) = (first_fixed(store, a), first_fixed(store, b)) {
        return Some(distance(pa, pb));
    }
    for (p, q) in [(a, b), (b, a)] {
        let found = store
            .matching(&FactPattern::distance_between(p, q))
            .find_map(|fact| match fact {
                Fact::Distance { distance, .. } => Some(*distance),
                _ => None,
            });
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Among geometrically valid candidates, the one nearest the point's
/// pre-solve position. The first candidate wins ties.
fn nearest_to(candidates: &[Point2], target: Point2) -> Option<Point2> {
    let mut best: Option<Point2> = None;
    for &candidate in candidates {
        let better = match best {
            None => true,
            Some(current) => distance(candidate, target) < distance(current, target),
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

fn collect_fixed(store: &FactStore) -> Vec<(PointId, Point2)> {
    store
        .matching(&FactPattern::any_fixed())
        .filter_map(|fact| match fact {
            Fact::Fixed { point, position } => Some((*point, *position)),
            _ => None,
        })
        .collect()
}

fn collect_on_line(store: &FactStore, pattern: &FactPattern) -> Vec<(PointId, Point2, Point2)> {
    store
        .matching(pattern)
        .filter_map(|fact| match fact {
            Fact::OnLine { point, a, b } => Some((*point, *a, *b)),
            _ => None,
        })
        .collect()
}

fn collect_on_circle(store: &FactStore, pattern: &FactPattern) -> Vec<(PointId, Point2, f64)> {
    store
        .matching(pattern)
        .filter_map(|fact| match fact {
            Fact::OnCircle {
                point,
                center,
                radius,
            } => Some((*point, *center, *radius)),
            _ => None,
        })
        .collect()
}

fn collect_equidistant(store: &FactStore) -> Vec<(PointId, PointId, PointId)> {
    store
        .matching(&FactPattern::any_equidistant())
        .filter_map(|fact| match fact {
            Fact::Equidistant {
                center,
                point1,
                point2,
            } => Some((*center, *point1, *point2)),
            _ => None,
        })
        .collect()
}

/// A fixed anchor turns its axis-alignment partners into line facts and
/// its distance partners into circle facts.
fn derive_from_fixed_anchors(store: &mut FactStore) {
    for (anchor, position) in collect_fixed(store) {
        let verticals: Vec<PointId> = store
            .matching(&FactPattern::vertical_from(anchor))
            .filter_map(|fact| match fact {
                Fact::Vertical { point2, .. } => Some(*point2),
                _ => None,
            })
            .collect();
        for point in verticals {
            store.add(Fact::OnLine {
                point,
                a: position,
                b: position + Vector2::new(0.0, AXIS_SPAN),
            });
        }

        let horizontals: Vec<PointId> = store
            .matching(&FactPattern::horizontal_from(anchor))
            .filter_map(|fact| match fact {
                Fact::Horizontal { point2, .. } => Some(*point2),
                _ => None,
            })
            .collect();
        for point in horizontals {
            store.add(Fact::OnLine {
                point,
                a: position,
                b: position + Vector2::new(AXIS_SPAN, 0.0),
            });
        }

        let distances: Vec<(PointId, f64)> = store
            .matching(&FactPattern::distance_from(anchor))
            .filter_map(|fact| match fact {
                Fact::Distance {
                    point2, distance, ..
                } => Some((*point2, *distance)),
                _ => None,
            })
            .collect();
        for (point, radius) in distances {
            store.add(Fact::OnCircle {
                point,
                center: position,
                radius,
            });
        }
    }
}

/// A point on both a known line and a known circle is fixed at the
/// intersection candidate nearest its pre-solve position.
fn intersect_lines_with_circles(store: &mut FactStore, original: &HashMap<PointId, Point2>) {
    for (point, a, b) in collect_on_line(store, &FactPattern::any_on_line()) {
        let Some(&target) = original.get(&point) else {
            continue;
        };
        let circles = collect_on_circle(store, &FactPattern::on_circle(point));
        for (_, center, radius) in circles {
            let candidates =
                line_circle_intersection(&Line::new(a, b), &Circle::new(center, radius));
            if let Some(position) = nearest_to(&candidates, target) {
                store.add(Fact::Fixed { point, position });
            }
        }
    }
}

/// A point on two distinct known circles is fixed at the intersection
/// candidate nearest its pre-solve position.
fn intersect_circle_pairs(store: &mut FactStore, original: &HashMap<PointId, Point2>) {
    for (point, center1, radius1) in collect_on_circle(store, &FactPattern::any_on_circle()) {
        let Some(&target) = original.get(&point) else {
            continue;
        };
        let others = collect_on_circle(store, &FactPattern::on_circle(point));
        for (_, center2, radius2) in others {
            if distance(center1, center2) <= EPSILON {
                continue;
            }
            let candidates = circle_circle_intersection(
                &Circle::new(center1, radius1),
                &Circle::new(center2, radius2),
            );
            if let Some(position) = nearest_to(&candidates, target) {
                store.add(Fact::Fixed { point, position });
            }
        }
    }
}

/// A point on two known lines is fixed at their intersection. No
/// tie-break is needed: two lines meet at most once.
fn intersect_line_pairs(store: &mut FactStore) {
    for (point, a, b) in collect_on_line(store, &FactPattern::any_on_line()) {
        let others = collect_on_line(store, &FactPattern::on_line(point));
        for (_, a2, b2) in others {
            if let Some(position) =
                line_line_intersection(&Line::new(a, b), &Line::new(a2, b2))
            {
                store.add(Fact::Fixed { point, position });
            }
        }
    }
}

/// A point-line distance whose two line reference points are both fixed
/// pins the dependent point onto the offset line (the base line translated
/// perpendicular by the signed distance).
fn derive_offset_lines(store: &mut FactStore) {
    let facts: Vec<(PointId, PointId, PointId, f64)> = store
        .matching(&FactPattern::any_point_line_distance())
        .filter_map(|fact| match fact {
            Fact::PointLineDistance {
                point,
                line1,
                line2,
                distance,
            } => Some((*point, *line1, *line2, *distance)),
            _ => None,
        })
        .collect();

    for (point, line1, line2, signed_distance) in facts {
        let Some(p1) = first_fixed(store, line1) else {
            continue;
        };
        let Some(p2) = first_fixed(store, line2) else {
            continue;
        };
        let Some(direction) = try_direction(p1, p2) else {
            continue;
        };
        let offset = perpendicular(direction) * signed_distance;
        store.add(Fact::OnLine {
            point,
            a: p1 + offset,
            b: p2 + offset,
        });
    }
}

/// Once a collinear group contains two distinct fixed positions, every
/// member lies on the line through them.
fn derive_collinear_lines(store: &mut FactStore) {
    let groups: Vec<Vec<PointId>> = store
        .matching(&FactPattern::any_collinear())
        .filter_map(|fact| match fact {
            Fact::Collinear { points } => Some(points.clone()),
            _ => None,
        })
        .collect();

    for points in groups {
        let mut fixed_on_line: Vec<Point2> = Vec::new();
        for point in &points {
            if fixed_on_line.len() >= 2 {
                break;
            }
            if let Some(position) = first_fixed(store, *point) {
                let duplicate = fixed_on_line
                    .iter()
                    .any(|existing| distance(*existing, position) < EPSILON);
                if !duplicate {
                    fixed_on_line.push(position);
                }
            }
        }
        if let [a, b] = fixed_on_line[..] {
            for point in points {
                store.add(Fact::OnLine { point, a, b });
            }
        }
    }
}

/// When both satellite points of an equidistance relation are fixed at
/// distinct positions, the center must lie on their perpendicular
/// bisector.
fn derive_equidistant_bisectors(store: &mut FactStore) {
    for (center, point1, point2) in collect_equidistant(store) {
        let Some(f1) = first_fixed(store, point1) else {
            continue;
        };
        let Some(f2) = first_fixed(store, point2) else {
            continue;
        };
        if distance(f1, f2) <= EPSILON {
            continue;
        }
        let mid = midpoint(f1, f2);
        store.add(Fact::OnLine {
            point: center,
            a: mid,
            b: mid + perpendicular(f2 - f1),
        });
    }
}

/// When the radius of an equidistance relation is known on one side,
/// propagate it to the other as a distance fact.
fn propagate_equidistant_radii(store: &mut FactStore) {
    for (center, point1, point2) in collect_equidistant(store) {
        let r1 = known_distance(store, center, point1);
        let r2 = known_distance(store, center, point2);
        match (r1, r2) {
            (Some(radius), None) => {
                store.add(Fact::Distance {
                    point1: center,
                    point2,
                    distance: radius,
                });
            }
            (None, Some(radius)) => {
                store.add(Fact::Distance {
                    point1: center,
                    point2: point1,
                    distance: radius,
                });
            }
            _ => {}
        }
    }
}
