use float_cmp::approx_eq;
use physenv_core::Error;
use physenv_engine::{Engine, EngineError, SoftBodyConfig, Vec2};
use test_case::test_case;

fn layout(columns: usize, rows: usize) -> SoftBodyConfig {
    SoftBodyConfig {
        columns,
        rows,
        origin: Vec2::new(0.0, 50.0),
        ..SoftBodyConfig::default()
    }
}

#[test_case(5, 5, 72 ; "default grid")]
#[test_case(3, 2, 11 ; "wide grid")]
#[test_case(2, 4, 16 ; "tall grid")]
#[test_case(1, 1, 0 ; "single point")]
fn grid_counts(columns: usize, rows: usize, springs: usize) {
    let engine = Engine::soft_body(&layout(columns, rows)).expect("soft body");
    assert_eq!(engine.points().len(), columns * rows);
    assert_eq!(engine.springs().len(), springs);
    assert_eq!(engine.polygons().len(), 2);
}

#[test_case(5, 5 ; "square")]
#[test_case(4, 2 ; "wide")]
#[test_case(2, 3 ; "tall")]
fn springs_start_at_rest(columns: usize, rows: usize) {
    let engine = Engine::soft_body(&layout(columns, rows)).expect("soft body");
    for spring in engine.springs().values() {
        let a = &engine.points()[spring.p1];
        let b = &engine.points()[spring.p2];
        let len = (a.pos - b.pos).mag();
        assert!(approx_eq!(f64, len, spring.natural_length, epsilon = 1e-9));
    }
    assert!(approx_eq!(f64, engine.energy(), 0.0, epsilon = 1e-9));
}

#[test]
fn default_layout_matches_the_classic_body() {
    let engine = Engine::soft_body(&SoftBodyConfig::default()).expect("soft body");
    assert_eq!(engine.points().len(), 25);
    assert_eq!(engine.springs().len(), 72);
    assert!(approx_eq!(f64, engine.config().gravity, 10.0));
    assert!(engine.polygons().values().all(|p| p.is_convex()));
}

#[test]
fn body_falls() {
    let mut engine = Engine::soft_body(&layout(5, 5)).expect("soft body");
    let before: f64 = engine.points().values().map(|p| p.pos.y).sum();
    for _ in 0..10 {
        engine.step(0.01);
    }
    let after: f64 = engine.points().values().map(|p| p.pos.y).sum();
    assert!(after < before);
}

#[test]
fn removing_a_corner_drops_its_springs() {
    let mut engine = Engine::soft_body(&layout(5, 5)).expect("soft body");
    let (corner, _) = engine.closest_point(Vec2::new(0.0, 50.0)).expect("points");
    let attached = engine.springs().values().filter(|s| s.connects(corner)).count();
    assert_eq!(attached, 3);

    engine.remove_point(corner).expect("remove");
    assert_eq!(engine.points().len(), 24);
    assert_eq!(engine.springs().len(), 69);
    assert!(engine.springs().values().all(|s| !s.connects(corner)));
    for spring in engine.springs().values() {
        assert!(engine.points().contains(spring.p1));
        assert!(engine.points().contains(spring.p2));
    }
}

#[test]
fn removing_a_centre_point_drops_eight_springs() {
    let mut engine = Engine::soft_body(&layout(5, 5)).expect("soft body");
    let (centre, dist) = engine.closest_point(Vec2::new(20.0, 70.0)).expect("points");
    assert!(approx_eq!(f64, dist, 0.0));
    engine.remove_point(centre).expect("remove");
    assert_eq!(engine.springs().len(), 64);
}

#[test]
fn closest_spring_after_clear_is_empty() {
    let mut engine = Engine::soft_body(&layout(2, 2)).expect("soft body");
    let (_, dist) = engine.closest_spring(Vec2::new(5.0, 40.0)).expect("springs");
    assert!(approx_eq!(f64, dist, 10.0, epsilon = 1e-9));

    engine.clear();
    assert_eq!(
        engine.closest_spring(Vec2::ZERO),
        Err(EngineError::Store(Error::EmptyContainer))
    );
}

#[test]
fn rejects_empty_grid() {
    let result = Engine::soft_body(&layout(0, 3));
    assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
}
