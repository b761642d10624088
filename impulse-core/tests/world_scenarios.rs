//! End-to-end scenarios driving a full world through many steps.

use impulse_core::types::constants;
use impulse_core::{Material, Shape, Vec2, World};

const FLOOR_X: f64 = 400.0;
const FLOOR_Y: f64 = 320.0;
const FLOOR_HALF_HEIGHT: f64 = 20.0;
const FLOOR_TOP: f64 = FLOOR_Y - FLOOR_HALF_HEIGHT;

fn world_with_floor() -> World {
    let mut world = World::new(constants::DEFAULT_DT, constants::DEFAULT_ITERATIONS).unwrap();
    world
        .add(Shape::rect(300.0, FLOOR_HALF_HEIGHT), FLOOR_X, FLOOR_Y)
        .unwrap()
        .set_static()
        .set_orient(0.0);
    world
}

fn run(world: &mut World, steps: usize) {
    for _ in 0..steps {
        world.step();
    }
}

#[test]
fn test_circle_comes_to_rest_on_floor() {
    let mut world = world_with_floor();
    world.add(Shape::circle(20.0), FLOOR_X, 40.0).unwrap();

    run(&mut world, 600);

    // Within slop of the floor and staying there
    let tolerance = constants::PENETRATION_SLOP;
    for _ in 0..120 {
        world.step();
        let bottom = world.bodies()[1].aabb().max.y;
        assert!(
            (bottom - FLOOR_TOP).abs() < tolerance,
            "circle bottom {} should rest at {}",
            bottom,
            FLOOR_TOP
        );
    }

    let circle = &world.bodies()[1];
    assert!((circle.position.x - FLOOR_X).abs() < 1e-6, "no sideways drift");
}

#[test]
fn test_floor_never_moves() {
    let mut world = world_with_floor();
    for i in 0..5 {
        world
            .add(Shape::circle(10.0), FLOOR_X - 100.0 + i as f64 * 50.0, 100.0)
            .unwrap();
    }

    run(&mut world, 300);

    let floor = &world.bodies()[0];
    assert_eq!(floor.position, Vec2::new(FLOOR_X, FLOOR_Y));
    assert_eq!(floor.velocity, Vec2::ZERO);
    assert_eq!(floor.orient(), 0.0);
}

#[test]
fn test_overlapping_static_bodies_stay_put() {
    let mut world = World::new(constants::DEFAULT_DT, constants::DEFAULT_ITERATIONS).unwrap();
    world.add(Shape::rect(50.0, 50.0), 0.0, 0.0).unwrap().set_static();
    world.add(Shape::circle(40.0), 10.0, 10.0).unwrap().set_static();
    let before: Vec<(Vec2, f64)> = world.bodies().iter().map(|b| (b.position, b.orient())).collect();

    run(&mut world, 500);

    let after: Vec<(Vec2, f64)> = world.bodies().iter().map(|b| (b.position, b.orient())).collect();
    assert_eq!(before, after);
}

#[test]
fn test_box_lands_flat() {
    let mut world = world_with_floor();
    world
        .add(Shape::rect(10.0, 10.0), FLOOR_X, 200.0)
        .unwrap()
        .set_orient(0.0);

    run(&mut world, 600);

    let body = &world.bodies()[1];
    let bottom = body.aabb().max.y;
    assert!(
        (bottom - FLOOR_TOP).abs() < 0.5,
        "box bottom {} should rest near {}",
        bottom,
        FLOOR_TOP
    );
    assert!(body.orient().abs() < 0.1, "box tipped over: {}", body.orient());
}

#[test]
fn test_box_stack_keeps_order() {
    let mut world = world_with_floor();
    for level in 0..3 {
        world
            .add(Shape::rect(10.0, 10.0), FLOOR_X, FLOOR_TOP - 11.0 - level as f64 * 21.0)
            .unwrap()
            .set_orient(0.0);
    }

    run(&mut world, 600);

    let ys: Vec<f64> = world.bodies()[1..].iter().map(|b| b.position.y).collect();
    assert!(ys[0] < FLOOR_TOP, "bottom box sank into the floor: {}", ys[0]);
    for pair in ys.windows(2) {
        let gap = pair[0] - pair[1];
        assert!(
            (15.0..25.0).contains(&gap),
            "boxes should stay stacked, centers {} and {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_random_polygon_does_not_tunnel() {
    let mut world = world_with_floor();
    let points = [
        Vec2::new(-12.0, -3.0),
        Vec2::new(-4.0, -14.0),
        Vec2::new(9.0, -10.0),
        Vec2::new(13.0, 4.0),
        Vec2::new(0.0, 12.0),
        Vec2::new(1.0, 1.0), // interior, dropped by the hull
    ];
    world
        .add(Shape::polygon(&points).unwrap(), FLOOR_X, 100.0)
        .unwrap()
        .set_material(Material::debris());

    run(&mut world, 900);

    let body = &world.bodies()[1];
    assert_eq!(body.shape().as_polygon().unwrap().vertex_count(), 5);
    assert!(body.position.y < FLOOR_TOP, "polygon fell through: {:?}", body.position);
    assert!(
        body.aabb().max.y < FLOOR_TOP + 1.0,
        "polygon sank into the floor: {:?}",
        body.aabb()
    );
}

#[test]
fn test_identical_worlds_replay_identically() {
    fn build() -> World {
        let mut world = world_with_floor();
        world.add(Shape::circle(15.0), FLOOR_X - 30.0, 50.0).unwrap();
        world.add(Shape::rect(12.0, 8.0), FLOOR_X + 10.0, 120.0).unwrap();
        world.add(Shape::circle(8.0), FLOOR_X + 5.0, 10.0).unwrap();
        world
    }

    let mut a = build();
    let mut b = build();
    for _ in 0..400 {
        a.step();
        b.step();
        for (x, y) in a.bodies().iter().zip(b.bodies()) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.velocity, y.velocity);
            assert_eq!(x.orient(), y.orient());
        }
    }
}
