use crate::geometry::Point2;
use crate::sketch::facts::{
    Fact, FactPattern, FactStore, Match, DistancePattern, OnCirclePattern,
};
use crate::sketch::types::{PointId, Sketch};

fn pt(x: f64, y: f64) -> Point2 {
    Point2::new(x, y)
}

/// Allocate a few point handles through a throwaway sketch.
fn handles(n: usize) -> Vec<PointId> {
    let mut sketch = Sketch::new();
    (0..n)
        .map(|i| sketch.add_point(pt(i as f64, 0.0)))
        .collect()
}

#[test]
fn test_add_deduplicates_within_epsilon() {
    let ids = handles(1);
    let mut store = FactStore::new();

    assert!(store.add(Fact::OnLine {
        point: ids[0],
        a: pt(0.0, 0.0),
        b: pt(10.0, 0.0),
    }));
    // Same line, numerically indistinguishable endpoint: dropped.
    assert!(!store.add(Fact::OnLine {
        point: ids[0],
        a: pt(0.0, 0.0),
        b: pt(10.0, 1e-7),
    }));
    assert_eq!(store.len(), 1);

    // A genuinely different line is kept.
    assert!(store.add(Fact::OnLine {
        point: ids[0],
        a: pt(0.0, 0.0),
        b: pt(10.0, 1.0),
    }));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_fixed_identity_ignores_position() {
    let ids = handles(1);
    let mut store = FactStore::new();

    assert!(store.add(Fact::Fixed {
        point: ids[0],
        position: pt(0.0, 0.0),
    }));
    // A later derivation of the same point at a different position must
    // not create a second Fixed fact: the first one wins.
    assert!(!store.add(Fact::Fixed {
        point: ids[0],
        position: pt(50.0, 50.0),
    }));
    assert_eq!(store.len(), 1);

    let positions: Vec<_> = store
        .matching(&FactPattern::fixed(ids[0]))
        .filter_map(|fact| match fact {
            Fact::Fixed { position, .. } => Some(*position),
            _ => None,
        })
        .collect();
    assert_eq!(positions, vec![pt(0.0, 0.0)]);
}

#[test]
fn test_distance_identity_ignores_value_but_not_direction() {
    let ids = handles(2);
    let mut store = FactStore::new();

    assert!(store.add(Fact::Distance {
        point1: ids[0],
        point2: ids[1],
        distance: 10.0,
    }));
    // Same ordered pair with a different value: still the same identity.
    assert!(!store.add(Fact::Distance {
        point1: ids[0],
        point2: ids[1],
        distance: 20.0,
    }));
    // The reversed pair is a distinct fact.
    assert!(store.add(Fact::Distance {
        point1: ids[1],
        point2: ids[0],
        distance: 10.0,
    }));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_kind_selection_and_wildcards() {
    let ids = handles(2);
    let mut store = FactStore::new();
    store.add(Fact::Fixed {
        point: ids[0],
        position: pt(1.0, 2.0),
    });
    store.add(Fact::OnCircle {
        point: ids[1],
        center: pt(0.0, 0.0),
        radius: 5.0,
    });
    store.add(Fact::Vertical {
        point1: ids[0],
        point2: ids[1],
    });

    assert_eq!(store.matching(&FactPattern::any_fixed()).count(), 1);
    assert_eq!(store.matching(&FactPattern::any_on_circle()).count(), 1);
    assert_eq!(store.matching(&FactPattern::any_collinear()).count(), 0);
    assert_eq!(store.matching(&FactPattern::vertical_from(ids[0])).count(), 1);
    assert_eq!(store.matching(&FactPattern::vertical_from(ids[1])).count(), 0);
}

#[test]
fn test_numeric_pattern_fields_match_within_epsilon() {
    let ids = handles(1);
    let mut store = FactStore::new();
    store.add(Fact::OnCircle {
        point: ids[0],
        center: pt(0.0, 0.0),
        radius: 5.0,
    });

    let near = FactPattern::OnCircle(OnCirclePattern {
        radius: Match::Is(5.0 + 1e-7),
        ..Default::default()
    });
    assert_eq!(store.matching(&near).count(), 1);

    let far = FactPattern::OnCircle(OnCirclePattern {
        radius: Match::Is(6.0),
        ..Default::default()
    });
    assert_eq!(store.matching(&far).count(), 0);
}

#[test]
fn test_distance_query_joins_on_both_endpoints() {
    let ids = handles(3);
    let mut store = FactStore::new();
    store.add(Fact::Distance {
        point1: ids[0],
        point2: ids[1],
        distance: 10.0,
    });
    store.add(Fact::Distance {
        point1: ids[0],
        point2: ids[2],
        distance: 7.0,
    });

    assert_eq!(store.matching(&FactPattern::distance_from(ids[0])).count(), 2);
    assert_eq!(
        store
            .matching(&FactPattern::distance_between(ids[0], ids[2]))
            .count(),
        1
    );
    let exact = FactPattern::Distance(DistancePattern {
        point1: Match::Is(ids[0]),
        point2: Match::Is(ids[1]),
        distance: Match::Is(10.0),
    });
    assert_eq!(store.matching(&exact).count(), 1);
}

#[test]
fn test_collinear_dedup_relies_on_canonical_order() {
    let ids = handles(3);
    let mut store = FactStore::new();

    let mut sorted = vec![ids[2], ids[0], ids[1]];
    sorted.sort();
    assert!(store.add(Fact::Collinear {
        points: sorted.clone(),
    }));
    // Re-inserting the canonical form is a no-op.
    assert!(!store.add(Fact::Collinear { points: sorted }));
    assert_eq!(store.len(), 1);
}
