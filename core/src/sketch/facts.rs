//! The fact store: an append-only collection of derived geometric
//! relationships built up during a single solve.
//!
//! Facts are deduplicated on insertion under an approximate-equality rule:
//! scalar and point fields compare within EPSILON, handles compare exactly.
//! A few numeric fields are deliberately *excluded* from a fact's identity
//! (`Fixed.position` and the two `distance` payloads) so that a later
//! derivation of the same relationship cannot pile up near-duplicates:
//! there is at most one `Fixed` fact per point.

use serde::{Deserialize, Serialize};

use super::types::PointId;
use crate::geometry::{ApproxEq, Point2};

/// One derived geometric relationship. Never mutated once stored;
/// propagation only adds facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fact {
    /// The point's position is fully determined.
    Fixed { point: PointId, position: Point2 },

    /// The point lies on the infinite line through `a` and `b`.
    OnLine { point: PointId, a: Point2, b: Point2 },

    /// The point lies on the circle around `center`.
    OnCircle {
        point: PointId,
        center: Point2,
        radius: f64,
    },

    /// The two points share an x coordinate.
    Vertical { point1: PointId, point2: PointId },

    /// The two points share a y coordinate.
    Horizontal { point1: PointId, point2: PointId },

    /// The Euclidean distance between the two points is known.
    Distance {
        point1: PointId,
        point2: PointId,
        distance: f64,
    },

    /// Signed perpendicular distance from `point` to the line through the
    /// points `line1` and `line2`.
    PointLineDistance {
        point: PointId,
        line1: PointId,
        line2: PointId,
        distance: f64,
    },

    /// All listed points lie on one common infinite line. The list is kept
    /// canonically sorted by handle so repeated insertion deduplicates.
    Collinear { points: Vec<PointId> },

    /// `point1` and `point2` are the same distance from `center`.
    Equidistant {
        center: PointId,
        point1: PointId,
        point2: PointId,
    },
}

impl Fact {
    /// The dedup rule: equality with numeric tolerance, with
    /// position/distance payloads excluded where the relationship itself
    /// is the identity.
    pub fn identity_eq(&self, other: &Fact) -> bool {
        match (self, other) {
            (Fact::Fixed { point: p1, .. }, Fact::Fixed { point: p2, .. }) => p1 == p2,
            (
                Fact::OnLine { point, a, b },
                Fact::OnLine {
                    point: point2,
                    a: a2,
                    b: b2,
                },
            ) => point == point2 && a.approx_eq(a2) && b.approx_eq(b2),
            (
                Fact::OnCircle {
                    point,
                    center,
                    radius,
                },
                Fact::OnCircle {
                    point: point2,
                    center: center2,
                    radius: radius2,
                },
            ) => point == point2 && center.approx_eq(center2) && radius.approx_eq(radius2),
            (
                Fact::Vertical { point1, point2 },
                Fact::Vertical {
                    point1: q1,
                    point2: q2,
                },
            ) => point1 == q1 && point2 == q2,
            (
                Fact::Horizontal { point1, point2 },
                Fact::Horizontal {
                    point1: q1,
                    point2: q2,
                },
            ) => point1 == q1 && point2 == q2,
            (
                Fact::Distance { point1, point2, .. },
                Fact::Distance {
                    point1: q1,
                    point2: q2,
                    ..
                },
            ) => point1 == q1 && point2 == q2,
            (
                Fact::PointLineDistance {
                    point,
                    line1,
                    line2,
                    ..
                },
                Fact::PointLineDistance {
                    point: q,
                    line1: l1,
                    line2: l2,
                    ..
                },
            ) => point == q && line1 == l1 && line2 == l2,
            (Fact::Collinear { points }, Fact::Collinear { points: qs }) => points == qs,
            (
                Fact::Equidistant {
                    center,
                    point1,
                    point2,
                },
                Fact::Equidistant {
                    center: c2,
                    point1: q1,
                    point2: q2,
                },
            ) => center == c2 && point1 == q1 && point2 == q2,
            _ => false,
        }
    }
}

/// Field-level comparison used by pattern matching: handles exact,
/// numerics and points within EPSILON.
pub trait FieldEq {
    fn field_eq(&self, other: &Self) -> bool;
}

impl FieldEq for PointId {
    fn field_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl FieldEq for f64 {
    fn field_eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl FieldEq for Point2 {
    fn field_eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl FieldEq for Vec<PointId> {
    fn field_eq(&self, other: &Self) -> bool {
        self == other
    }
}

/// A single pattern field: either a wildcard or a concrete value to match.
#[derive(Debug, Clone, Copy)]
pub enum Match<T> {
    Any,
    Is(T),
}

impl<T> Default for Match<T> {
    fn default() -> Self {
        Match::Any
    }
}

impl<T: FieldEq> Match<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Match::Any => true,
            Match::Is(expected) => expected.field_eq(value),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FixedPattern {
    pub point: Match<PointId>,
    pub position: Match<Point2>,
}

#[derive(Debug, Clone, Default)]
pub struct OnLinePattern {
    pub point: Match<PointId>,
    pub a: Match<Point2>,
    pub b: Match<Point2>,
}

#[derive(Debug, Clone, Default)]
pub struct OnCirclePattern {
    pub point: Match<PointId>,
    pub center: Match<Point2>,
    pub radius: Match<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct AxisPattern {
    pub point1: Match<PointId>,
    pub point2: Match<PointId>,
}

#[derive(Debug, Clone, Default)]
pub struct DistancePattern {
    pub point1: Match<PointId>,
    pub point2: Match<PointId>,
    pub distance: Match<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct PointLineDistancePattern {
    pub point: Match<PointId>,
    pub line1: Match<PointId>,
    pub line2: Match<PointId>,
    pub distance: Match<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct CollinearPattern {
    pub points: Match<Vec<PointId>>,
}

#[derive(Debug, Clone, Default)]
pub struct EquidistantPattern {
    pub center: Match<PointId>,
    pub point1: Match<PointId>,
    pub point2: Match<PointId>,
}

/// A typed partial-record query: one variant per fact kind, every field
/// wildcard-capable. The kind itself is selected by the variant.
#[derive(Debug, Clone)]
pub enum FactPattern {
    Fixed(FixedPattern),
    OnLine(OnLinePattern),
    OnCircle(OnCirclePattern),
    Vertical(AxisPattern),
    Horizontal(AxisPattern),
    Distance(DistancePattern),
    PointLineDistance(PointLineDistancePattern),
    Collinear(CollinearPattern),
    Equidistant(EquidistantPattern),
}

impl FactPattern {
    pub fn matches(&self, fact: &Fact) -> bool {
        match (self, fact) {
            (FactPattern::Fixed(p), Fact::Fixed { point, position }) => {
                p.point.matches(point) && p.position.matches(position)
            }
            (FactPattern::OnLine(p), Fact::OnLine { point, a, b }) => {
                p.point.matches(point) && p.a.matches(a) && p.b.matches(b)
            }
            (
                FactPattern::OnCircle(p),
                Fact::OnCircle {
                    point,
                    center,
                    radius,
                },
            ) => p.point.matches(point) && p.center.matches(center) && p.radius.matches(radius),
            (FactPattern::Vertical(p), Fact::Vertical { point1, point2 }) => {
                p.point1.matches(point1) && p.point2.matches(point2)
            }
            (FactPattern::Horizontal(p), Fact::Horizontal { point1, point2 }) => {
                p.point1.matches(point1) && p.point2.matches(point2)
            }
            (
                FactPattern::Distance(p),
                Fact::Distance {
                    point1,
                    point2,
                    distance,
                },
            ) => p.point1.matches(point1) && p.point2.matches(point2) && p.distance.matches(distance),
            (
                FactPattern::PointLineDistance(p),
                Fact::PointLineDistance {
                    point,
                    line1,
                    line2,
                    distance,
                },
            ) => {
                p.point.matches(point)
                    && p.line1.matches(line1)
                    && p.line2.matches(line2)
                    && p.distance.matches(distance)
            }
            (FactPattern::Collinear(p), Fact::Collinear { points }) => p.points.matches(points),
            (
                FactPattern::Equidistant(p),
                Fact::Equidistant {
                    center,
                    point1,
                    point2,
                },
            ) => p.center.matches(center) && p.point1.matches(point1) && p.point2.matches(point2),
            _ => false,
        }
    }

    // Shorthand constructors for the queries the engine actually runs.

    pub fn any_fixed() -> Self {
        FactPattern::Fixed(FixedPattern::default())
    }

    pub fn fixed(point: PointId) -> Self {
        FactPattern::Fixed(FixedPattern {
            point: Match::Is(point),
            ..Default::default()
        })
    }

    pub fn any_on_line() -> Self {
        FactPattern::OnLine(OnLinePattern::default())
    }

    pub fn on_line(point: PointId) -> Self {
        FactPattern::OnLine(OnLinePattern {
            point: Match::Is(point),
            ..Default::default()
        })
    }

    pub fn any_on_circle() -> Self {
        FactPattern::OnCircle(OnCirclePattern::default())
    }

    pub fn on_circle(point: PointId) -> Self {
        FactPattern::OnCircle(OnCirclePattern {
            point: Match::Is(point),
            ..Default::default()
        })
    }

    pub fn vertical_from(point1: PointId) -> Self {
        FactPattern::Vertical(AxisPattern {
            point1: Match::Is(point1),
            ..Default::default()
        })
    }

    pub fn horizontal_from(point1: PointId) -> Self {
        FactPattern::Horizontal(AxisPattern {
            point1: Match::Is(point1),
            ..Default::default()
        })
    }

    pub fn distance_from(point1: PointId) -> Self {
        FactPattern::Distance(DistancePattern {
            point1: Match::Is(point1),
            ..Default::default()
        })
    }

    pub fn distance_between(point1: PointId, point2: PointId) -> Self {
        FactPattern::Distance(DistancePattern {
            point1: Match::Is(point1),
            point2: Match::Is(point2),
            ..Default::default()
        })
    }

    pub fn any_point_line_distance() -> Self {
        FactPattern::PointLineDistance(PointLineDistancePattern::default())
    }

    pub fn any_collinear() -> Self {
        FactPattern::Collinear(CollinearPattern::default())
    }

    pub fn any_equidistant() -> Self {
        FactPattern::Equidistant(EquidistantPattern::default())
    }
}

/// Append-only store for the working set of one solve.
#[derive(Debug, Default)]
pub struct FactStore {
    facts: Vec<Fact>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fact unless an identity-equal fact is already present.
    /// Returns whether the fact was inserted.
    pub fn add(&mut self, fact: Fact) -> bool {
        if self.facts.iter().any(|existing| existing.identity_eq(&fact)) {
            return false;
        }
        self.facts.push(fact);
        true
    }

    /// All facts matching the pattern. A linear scan: realistic sketches
    /// hold tens to low hundreds of facts.
    pub fn matching<'a>(&'a self, pattern: &'a FactPattern) -> impl Iterator<Item = &'a Fact> {
        self.facts.iter().filter(move |fact| pattern.matches(fact))
    }

    /// Total fact count; the engine compares this across a pass to detect
    /// that nothing new was learned.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }
}
