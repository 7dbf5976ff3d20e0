use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Point2;

/// Errors raised by the sketch mutation API. Referential integrity is
/// enforced here, at the editing boundary; the solver assumes every
/// reference it sees is valid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SketchError {
    #[error("unknown point {0}")]
    UnknownPoint(PointId),

    #[error("unknown line {0}")]
    UnknownLine(LineId),

    #[error("unknown arc {0}")]
    UnknownArc(ArcId),

    #[error("unknown dimension {0}")]
    UnknownDimension(DimensionId),
}

pub type SketchResult<T> = Result<T, SketchError>;

macro_rules! entity_handle {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

entity_handle!(
    /// Opaque handle to a sketch point. Handles are allocated by the
    /// sketch's arena and stay stable across solver runs, so constraints
    /// can reference points by handle.
    PointId, "p"
);
entity_handle!(
    /// Opaque handle to a line element.
    LineId, "g"
);
entity_handle!(
    /// Opaque handle to an arc element.
    ArcId, "a"
);
entity_handle!(
    /// Opaque handle to a dimension (an on-screen selectable distance
    /// annotation).
    DimensionId, "d"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Point,
    Line,
    Arc,
    Dimension,
}

/// Metadata for one allocated handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub kind: EntityKind,
    /// Human-readable identity, used only at the serialization boundary
    /// (JSON output, logs). In-memory identity is the handle itself.
    pub label: String,
}

/// Monotonically growing table mapping opaque integer handles to entity
/// metadata. Handles are never reused, even after an element is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityArena {
    records: Vec<EntityRecord>,
}

impl EntityArena {
    fn alloc(&mut self, kind: EntityKind, label: Option<&str>, prefix: &str) -> u32 {
        let raw = self.records.len() as u32;
        let label = match label {
            Some(label) => label.to_string(),
            None => format!("{prefix}{raw}"),
        };
        self.records.push(EntityRecord { kind, label });
        raw
    }

    pub fn alloc_point(&mut self, label: Option<&str>) -> PointId {
        PointId(self.alloc(EntityKind::Point, label, "p"))
    }

    pub fn alloc_line(&mut self) -> LineId {
        LineId(self.alloc(EntityKind::Line, None, "g"))
    }

    pub fn alloc_arc(&mut self) -> ArcId {
        ArcId(self.alloc(EntityKind::Arc, None, "a"))
    }

    pub fn alloc_dimension(&mut self) -> DimensionId {
        DimensionId(self.alloc(EntityKind::Dimension, None, "d"))
    }

    pub fn label(&self, raw: u32) -> Option<&str> {
        self.records.get(raw as usize).map(|r| r.label.as_str())
    }

    pub fn kind(&self, raw: u32) -> Option<EntityKind> {
        self.records.get(raw as usize).map(|r| r.kind)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Cosmetic placement of a dimension label relative to its measured span.
/// Only affects rendering and hit-testing, never solving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionCosmetic {
    /// Ratio along the measured span a --> b where the label sits.
    pub t: f64,
    /// Perpendicular offset (in sketch units) of the label from the span.
    pub offset: f64,
}

impl Default for DimensionCosmetic {
    fn default() -> Self {
        Self { t: 0.5, offset: 10.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SketchElement {
    /// A movable point.
    Point { id: PointId, position: Point2 },

    /// A line joining two points.
    Line {
        id: LineId,
        endpoint_a: PointId,
        endpoint_b: PointId,
    },

    /// An arc joining two points around a center point. The endpoints are
    /// assumed equidistant from the center; the solver re-derives this as
    /// an equidistance relation rather than trusting the positions.
    Arc {
        id: ArcId,
        center: PointId,
        endpoint_a: PointId,
        endpoint_b: PointId,
    },

    /// Pins a point at an absolute position.
    Fixed { point: PointId, position: Point2 },

    /// Two points share an x (vertical) or y (horizontal) coordinate.
    AxisAligned {
        axis: Axis,
        point_a: PointId,
        point_b: PointId,
    },

    /// Euclidean distance between two points. When `measure_only` the
    /// dimension is driven: it displays a value but never drives geometry.
    PointPointDistance {
        id: DimensionId,
        point_a: PointId,
        point_b: PointId,
        distance: f64,
        cosmetic: DimensionCosmetic,
        measure_only: bool,
    },

    /// Signed perpendicular distance from a point to an infinite line.
    PointLineDistance {
        id: DimensionId,
        point: PointId,
        line: LineId,
        distance: f64,
        cosmetic: DimensionCosmetic,
        measure_only: bool,
    },

    /// The point is collinear with the line's two endpoints.
    PointOnLine { point: PointId, line: LineId },

    /// The point lies on the arc's circle: equidistant from the arc's
    /// center, matching the arc's existing equidistant endpoints.
    PointOnArc { point: PointId, arc: ArcId },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sketch {
    pub arena: EntityArena,
    pub elements: Vec<SketchElement>,
}

impl Sketch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sketch seeded with a fixed origin point, the usual starting state
    /// of the editor.
    pub fn with_origin() -> Self {
        let mut sketch = Self::new();
        let origin = sketch.add_labeled_point("Origin", Point2::origin());
        sketch
            .add_fixed(origin, Point2::origin())
            .expect("origin was just added");
        sketch
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    pub fn add_point(&mut self, position: Point2) -> PointId {
        let id = self.arena.alloc_point(None);
        self.elements.push(SketchElement::Point { id, position });
        id
    }

    pub fn add_labeled_point(&mut self, label: &str, position: Point2) -> PointId {
        let id = self.arena.alloc_point(Some(label));
        self.elements.push(SketchElement::Point { id, position });
        id
    }

    pub fn add_line(&mut self, endpoint_a: PointId, endpoint_b: PointId) -> SketchResult<LineId> {
        self.ensure_point(endpoint_a)?;
        self.ensure_point(endpoint_b)?;
        let id = self.arena.alloc_line();
        self.elements.push(SketchElement::Line {
            id,
            endpoint_a,
            endpoint_b,
        });
        Ok(id)
    }

    pub fn add_arc(
        &mut self,
        center: PointId,
        endpoint_a: PointId,
        endpoint_b: PointId,
    ) -> SketchResult<ArcId> {
        self.ensure_point(center)?;
        self.ensure_point(endpoint_a)?;
        self.ensure_point(endpoint_b)?;
        let id = self.arena.alloc_arc();
        self.elements.push(SketchElement::Arc {
            id,
            center,
            endpoint_a,
            endpoint_b,
        });
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Constraints
    // ------------------------------------------------------------------

    pub fn add_fixed(&mut self, point: PointId, position: Point2) -> SketchResult<()> {
        self.ensure_point(point)?;
        self.elements.push(SketchElement::Fixed { point, position });
        Ok(())
    }

    pub fn add_axis_aligned(
        &mut self,
        axis: Axis,
        point_a: PointId,
        point_b: PointId,
    ) -> SketchResult<()> {
        self.ensure_point(point_a)?;
        self.ensure_point(point_b)?;
        self.elements.push(SketchElement::AxisAligned {
            axis,
            point_a,
            point_b,
        });
        Ok(())
    }

    pub fn add_point_point_distance(
        &mut self,
        point_a: PointId,
        point_b: PointId,
        distance: f64,
    ) -> SketchResult<DimensionId> {
        self.add_point_point_dimension(point_a, point_b, distance, false)
    }

    /// A driven (display-only) point-point dimension: it measures but
    /// never drives geometry.
    pub fn add_point_point_measurement(
        &mut self,
        point_a: PointId,
        point_b: PointId,
        distance: f64,
    ) -> SketchResult<DimensionId> {
        self.add_point_point_dimension(point_a, point_b, distance, true)
    }

    fn add_point_point_dimension(
        &mut self,
        point_a: PointId,
        point_b: PointId,
        distance: f64,
        measure_only: bool,
    ) -> SketchResult<DimensionId> {
        self.ensure_point(point_a)?;
        self.ensure_point(point_b)?;
        let id = self.arena.alloc_dimension();
        self.elements.push(SketchElement::PointPointDistance {
            id,
            point_a,
            point_b,
            distance,
            cosmetic: DimensionCosmetic::default(),
            measure_only,
        });
        Ok(id)
    }

    pub fn add_point_line_distance(
        &mut self,
        point: PointId,
        line: LineId,
        distance: f64,
    ) -> SketchResult<DimensionId> {
        self.add_point_line_dimension(point, line, distance, false)
    }

    pub fn add_point_line_measurement(
        &mut self,
        point: PointId,
        line: LineId,
        distance: f64,
    ) -> SketchResult<DimensionId> {
        self.add_point_line_dimension(point, line, distance, true)
    }

    fn add_point_line_dimension(
        &mut self,
        point: PointId,
        line: LineId,
        distance: f64,
        measure_only: bool,
    ) -> SketchResult<DimensionId> {
        self.ensure_point(point)?;
        self.ensure_line(line)?;
        let id = self.arena.alloc_dimension();
        self.elements.push(SketchElement::PointLineDistance {
            id,
            point,
            line,
            distance,
            cosmetic: DimensionCosmetic::default(),
            measure_only,
        });
        Ok(id)
    }

    pub fn add_point_on_line(&mut self, point: PointId, line: LineId) -> SketchResult<()> {
        self.ensure_point(point)?;
        self.ensure_line(line)?;
        self.elements.push(SketchElement::PointOnLine { point, line });
        Ok(())
    }

    pub fn add_point_on_arc(&mut self, point: PointId, arc: ArcId) -> SketchResult<()> {
        self.ensure_point(point)?;
        self.ensure_arc(arc)?;
        self.elements.push(SketchElement::PointOnArc { point, arc });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    pub fn move_point(&mut self, point: PointId, position: Point2) -> SketchResult<()> {
        for element in &mut self.elements {
            if let SketchElement::Point { id, position: pos } = element {
                if *id == point {
                    *pos = position;
                    return Ok(());
                }
            }
        }
        Err(SketchError::UnknownPoint(point))
    }

    pub fn set_dimension_value(&mut self, dimension: DimensionId, value: f64) -> SketchResult<()> {
        for element in &mut self.elements {
            match element {
                SketchElement::PointPointDistance { id, distance, .. }
                | SketchElement::PointLineDistance { id, distance, .. }
                    if *id == dimension =>
                {
                    *distance = value;
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(SketchError::UnknownDimension(dimension))
    }

    pub fn set_dimension_cosmetic(
        &mut self,
        dimension: DimensionId,
        cosmetic: DimensionCosmetic,
    ) -> SketchResult<()> {
        for element in &mut self.elements {
            match element {
                SketchElement::PointPointDistance { id, cosmetic: c, .. }
                | SketchElement::PointLineDistance { id, cosmetic: c, .. }
                    if *id == dimension =>
                {
                    *c = cosmetic;
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(SketchError::UnknownDimension(dimension))
    }

    pub fn remove_dimension(&mut self, dimension: DimensionId) -> SketchResult<()> {
        let before = self.elements.len();
        self.elements.retain(|element| {
            !matches!(
                element,
                SketchElement::PointPointDistance { id, .. }
                | SketchElement::PointLineDistance { id, .. }
                    if *id == dimension
            )
        });
        if self.elements.len() == before {
            return Err(SketchError::UnknownDimension(dimension));
        }
        Ok(())
    }

    /// Remove a point together with every line, arc, constraint, and
    /// dimension that references it (directly, or through a removed
    /// line/arc).
    pub fn remove_point(&mut self, point: PointId) -> SketchResult<()> {
        self.ensure_point(point)?;

        let dead_lines: Vec<LineId> = self
            .elements
            .iter()
            .filter_map(|element| match element {
                SketchElement::Line {
                    id,
                    endpoint_a,
                    endpoint_b,
                } if *endpoint_a == point || *endpoint_b == point => Some(*id),
                _ => None,
            })
            .collect();
        let dead_arcs: Vec<ArcId> = self
            .elements
            .iter()
            .filter_map(|element| match element {
                SketchElement::Arc {
                    id,
                    center,
                    endpoint_a,
                    endpoint_b,
                } if *center == point || *endpoint_a == point || *endpoint_b == point => Some(*id),
                _ => None,
            })
            .collect();

        self.elements.retain(|element| match element {
            SketchElement::Point { id, .. } => *id != point,
            SketchElement::Line { id, .. } => !dead_lines.contains(id),
            SketchElement::Arc { id, .. } => !dead_arcs.contains(id),
            SketchElement::Fixed { point: p, .. } => *p != point,
            SketchElement::AxisAligned {
                point_a, point_b, ..
            } => *point_a != point && *point_b != point,
            SketchElement::PointPointDistance {
                point_a, point_b, ..
            } => *point_a != point && *point_b != point,
            SketchElement::PointLineDistance { point: p, line, .. } => {
                *p != point && !dead_lines.contains(line)
            }
            SketchElement::PointOnLine { point: p, line } => {
                *p != point && !dead_lines.contains(line)
            }
            SketchElement::PointOnArc { point: p, arc } => {
                *p != point && !dead_arcs.contains(arc)
            }
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub fn point_position(&self, point: PointId) -> Option<Point2> {
        self.elements.iter().find_map(|element| match element {
            SketchElement::Point { id, position } if *id == point => Some(*position),
            _ => None,
        })
    }

    /// The two endpoint handles of a line element.
    pub fn line_endpoints(&self, line: LineId) -> Option<(PointId, PointId)> {
        self.elements.iter().find_map(|element| match element {
            SketchElement::Line {
                id,
                endpoint_a,
                endpoint_b,
            } if *id == line => Some((*endpoint_a, *endpoint_b)),
            _ => None,
        })
    }

    /// The (center, endpoint_a, endpoint_b) handles of an arc element.
    pub fn arc_points(&self, arc: ArcId) -> Option<(PointId, PointId, PointId)> {
        self.elements.iter().find_map(|element| match element {
            SketchElement::Arc {
                id,
                center,
                endpoint_a,
                endpoint_b,
            } if *id == arc => Some((*center, *endpoint_a, *endpoint_b)),
            _ => None,
        })
    }

    pub fn dimension_value(&self, dimension: DimensionId) -> Option<f64> {
        self.elements.iter().find_map(|element| match element {
            SketchElement::PointPointDistance { id, distance, .. }
            | SketchElement::PointLineDistance { id, distance, .. }
                if *id == dimension =>
            {
                Some(*distance)
            }
            _ => None,
        })
    }

    pub fn dimension_cosmetic(&self, dimension: DimensionId) -> Option<DimensionCosmetic> {
        self.elements.iter().find_map(|element| match element {
            SketchElement::PointPointDistance { id, cosmetic, .. }
            | SketchElement::PointLineDistance { id, cosmetic, .. }
                if *id == dimension =>
            {
                Some(*cosmetic)
            }
            _ => None,
        })
    }

    /// Iterate over all point elements as (handle, position) pairs.
    pub fn points(&self) -> impl Iterator<Item = (PointId, Point2)> + '_ {
        self.elements.iter().filter_map(|element| match element {
            SketchElement::Point { id, position } => Some((*id, *position)),
            _ => None,
        })
    }

    /// Overwrite positions of existing points; handles absent from the
    /// sketch are ignored. Used by the solver when producing the updated
    /// sketch.
    pub(crate) fn apply_positions(
        &mut self,
        positions: &std::collections::HashMap<PointId, Point2>,
    ) {
        for element in &mut self.elements {
            if let SketchElement::Point { id, position } = element {
                if let Some(resolved) = positions.get(id) {
                    *position = *resolved;
                }
            }
        }
    }

    fn ensure_point(&self, point: PointId) -> SketchResult<()> {
        if self.point_position(point).is_some() {
            Ok(())
        } else {
            Err(SketchError::UnknownPoint(point))
        }
    }

    fn ensure_line(&self, line: LineId) -> SketchResult<()> {
        if self.line_endpoints(line).is_some() {
            Ok(())
        } else {
            Err(SketchError::UnknownLine(line))
        }
    }

    fn ensure_arc(&self, arc: ArcId) -> SketchResult<()> {
        if self.arc_points(arc).is_some() {
            Ok(())
        } else {
            Err(SketchError::UnknownArc(arc))
        }
    }
}
