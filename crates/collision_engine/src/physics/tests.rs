//! Whole-system scenarios: registration, ticking, resolution and picking

use crate::config::{CollisionConfig, OctreeSettings};
use crate::ecs::{Entity, TransformSource, World};
use crate::events::{CollisionEvent, EventHandler, EventType};
use crate::foundation::math::{Transform, Vec3};
use crate::physics::collision::{AABox, Capsule, Ray, Shape, ShapeKinds, Sphere};
use crate::physics::{Bounder, BounderId, CollisionError, CollisionSystem};
use crate::spatial::OctreeConfig;
use approx::assert_relative_eq;

fn cube(min: f32, max: f32) -> Shape {
    AABox::new(Vec3::repeat(min), Vec3::repeat(max)).into()
}

fn slab(min: Vec3, max: Vec3) -> Shape {
    AABox::new(min, max).into()
}

fn ball(radius: f32) -> Shape {
    Sphere::new(Vec3::zeros(), radius).into()
}

fn position(world: &World, entity: Entity) -> Vec3 {
    world.transform(entity).map(|t| t.position).unwrap()
}

fn adjustments(events: &[CollisionEvent]) -> Vec<(Entity, Vec3)> {
    events
        .iter()
        .filter_map(|e| match e {
            CollisionEvent::ObjectAdjusted { entity, delta } => Some((*entity, *delta)),
            _ => None,
        })
        .collect()
}

fn detections(events: &[CollisionEvent]) -> usize {
    events
        .iter()
        .filter(|e| e.event_type() == EventType::CollisionDetected)
        .count()
}

#[test]
fn test_lighter_box_takes_full_correction() {
    let mut world = World::new();
    let a = world.create_entity();
    let b = world.create_entity();

    let mut system = CollisionSystem::new();
    let id_a = system.add_bounder(&world, a, 1, cube(0.0, 2.0)).unwrap();
    let id_b = system.add_bounder(&world, b, 2, cube(1.0, 3.0)).unwrap();
    system.update(&mut world);

    // All three axes penetrate by 1; x wins the tie
    assert_eq!(position(&world, a), Vec3::new(-1.0, 0.0, 0.0));
    assert_eq!(position(&world, b), Vec3::zeros());

    let events = system.drain_events();
    assert_eq!(events, vec![
        CollisionEvent::CollisionDetected { bounder: id_a, other: id_b, entity: a },
        CollisionEvent::CollisionDetected { bounder: id_b, other: id_a, entity: b },
        CollisionEvent::CollisionNormal { bounder: id_a, entity: a, normal: Vec3::new(-1.0, 0.0, 0.0) },
        CollisionEvent::ObjectAdjusted { entity: a, delta: Vec3::new(-1.0, 0.0, 0.0) },
    ]);

    let ba = system.bounder(id_a).unwrap();
    assert!(ba.was_collision && ba.was_adjusted);
    let bb = system.bounder(id_b).unwrap();
    assert!(bb.was_collision && !bb.was_adjusted);
}

#[test]
fn test_coincident_spheres_push_up() {
    let mut world = World::new();
    let a = world.create_entity();
    let floor = world.create_entity();

    let mut system = CollisionSystem::new();
    system.add_bounder(&world, a, 1, ball(1.0)).unwrap();
    system.add_bounder(&world, floor, Bounder::STATIC, ball(1.0)).unwrap();
    system.update(&mut world);

    assert_eq!(position(&world, a), Vec3::new(0.0, 2.0, 0.0));
    assert_eq!(position(&world, floor), Vec3::zeros());
}

#[test]
fn test_equal_weights_split_the_correction() {
    let mut world = World::new();
    let a = world.create_entity();
    let b = world.create_entity_with(Transform::from_position(Vec3::new(1.5, 0.0, 0.0)));

    let mut system = CollisionSystem::new();
    system.add_bounder(&world, a, 3, cube(-1.0, 1.0)).unwrap();
    system.add_bounder(&world, b, 3, cube(-1.0, 1.0)).unwrap();
    system.update(&mut world);

    assert_eq!(position(&world, a), Vec3::new(-0.25, 0.0, 0.0));
    assert_eq!(position(&world, b), Vec3::new(1.75, 0.0, 0.0));
    assert_eq!(adjustments(&system.drain_events()).len(), 2);
}

#[test]
fn test_ghost_reports_without_moving() {
    let mut world = World::new();
    let ghost = world.create_entity();
    let body = world.create_entity_with(Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));

    let mut system = CollisionSystem::new();
    let id = system.add_bounder(&world, ghost, Bounder::GHOST, ball(1.0)).unwrap();
    system.add_bounder(&world, body, 1, ball(1.0)).unwrap();
    system.update(&mut world);

    assert_eq!(position(&world, ghost), Vec3::zeros());
    assert_eq!(position(&world, body), Vec3::new(1.0, 0.0, 0.0));
    let events = system.drain_events();
    assert_eq!(events.len(), 2);
    assert_eq!(detections(&events), 2);
    assert!(system.bounder(id).unwrap().was_collision);
}

#[test]
fn test_undrained_events_only_keep_last_tick() {
    let mut world = World::new();
    let ghost = world.create_entity();
    let body = world.create_entity_with(Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));

    let mut system = CollisionSystem::new();
    system.add_bounder(&world, ghost, Bounder::GHOST, ball(1.0)).unwrap();
    system.add_bounder(&world, body, 1, ball(1.0)).unwrap();
    for _ in 0..50 {
        system.mark_potential(ghost);
        system.update(&mut world);
    }

    let events = system.drain_events();
    assert_eq!(events.len(), 2);
    assert_eq!(detections(&events), 2);
}

#[test]
fn test_static_pair_is_reported_not_resolved() {
    let mut world = World::new();
    let a = world.create_entity();
    let b = world.create_entity();

    let mut system = CollisionSystem::new();
    system.add_bounder(&world, a, Bounder::STATIC, cube(0.0, 2.0)).unwrap();
    system.add_bounder(&world, b, Bounder::STATIC, cube(1.0, 3.0)).unwrap();
    system.update(&mut world);

    assert_eq!(position(&world, a), Vec3::zeros());
    assert_eq!(position(&world, b), Vec3::zeros());
    let events = system.drain_events();
    assert_eq!(detections(&events), 2);
    assert!(adjustments(&events).is_empty());
}

/// A unit cube pushed out of one wall straight into another
fn wedged(settle_pass: bool) -> (World, CollisionSystem, Entity, BounderId) {
    let mut world = World::new();
    let a = world.create_entity();
    let right = world.create_entity();
    let left = world.create_entity();

    let mut system = CollisionSystem::new();
    system.set_settle_pass(settle_pass);
    let id = system.add_bounder(&world, a, 1, cube(0.0, 1.0)).unwrap();
    system
        .add_bounder(&world, right, Bounder::STATIC, slab(Vec3::new(0.75, -5.0, -5.0), Vec3::new(3.0, 5.0, 5.0)))
        .unwrap();
    system
        .add_bounder(&world, left, Bounder::STATIC, slab(Vec3::new(-3.0, -5.0, -5.0), Vec3::new(-0.125, 5.0, 5.0)))
        .unwrap();
    system.update(&mut world);
    (world, system, a, id)
}

#[test]
fn test_settle_pass_runs_exactly_once() {
    let (world, mut system, a, id) = wedged(true);

    // Out of the right wall, then once out of the left one, back into the right
    assert_eq!(position(&world, a), Vec3::new(-0.125, 0.0, 0.0));
    let moves: Vec<Vec3> = adjustments(&system.drain_events()).into_iter().map(|(_, d)| d).collect();
    assert_eq!(moves, vec![Vec3::new(-0.25, 0.0, 0.0), Vec3::new(0.125, 0.0, 0.0)]);

    // Residual overlap is left for the next tick
    assert!(system.is_potential(id));
}

#[test]
fn test_without_settle_pass() {
    let (world, mut system, a, id) = wedged(false);

    assert_eq!(position(&world, a), Vec3::new(-0.25, 0.0, 0.0));
    assert_eq!(adjustments(&system.drain_events()).len(), 1);
    assert!(system.is_potential(id));
}

#[test]
fn test_entity_bounders_composite_instead_of_summing() {
    let mut world = World::new();
    let body = world.create_entity();
    let wall = world.create_entity();

    let mut system = CollisionSystem::new();
    system.add_bounder(&world, body, 1, ball(1.0)).unwrap();
    system
        .add_bounder(&world, body, 1, Sphere::new(Vec3::new(0.0, 1.5, 0.0), 1.0).into())
        .unwrap();
    system
        .add_bounder(&world, wall, Bounder::STATIC, slab(Vec3::new(0.5, -5.0, -5.0), Vec3::new(5.0, 5.0, 5.0)))
        .unwrap();
    system.update(&mut world);

    // Both spheres need -0.5; the body moves by that once, and its own two
    // overlapping spheres never push each other
    assert_eq!(position(&world, body), Vec3::new(-0.5, 0.0, 0.0));
    let events = system.drain_events();
    assert_eq!(adjustments(&events), vec![(body, Vec3::new(-0.5, 0.0, 0.0))]);
    assert_eq!(detections(&events), 4);
}

#[test]
fn test_pick_nearest_and_filtered() {
    let mut world = World::new();
    let near = world.create_entity();
    let far = world.create_entity_with(Transform::from_position(Vec3::new(5.0, 0.0, 0.0)));

    let mut system = CollisionSystem::new();
    let id_near = system.add_bounder(&world, near, 1, cube(-1.0, 1.0)).unwrap();
    let id_far = system.add_bounder(&world, far, Bounder::STATIC, cube(-1.0, 1.0)).unwrap();

    let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::x());
    let (id, hit) = system.pick(&ray);
    assert_eq!(id, Some(id_near));
    assert!(hit.hit && hit.is_outer_face);
    assert_relative_eq!(hit.distance, 4.0);
    assert_relative_eq!(hit.point, Vec3::new(-1.0, 0.0, 0.0));
    assert_relative_eq!(hit.normal, Vec3::new(-1.0, 0.0, 0.0));

    let (id, hit) = system.pick_ignoring(&ray, near);
    assert_eq!(id, Some(id_far));
    assert_relative_eq!(hit.distance, 9.0);

    let (id, _) = system.pick_with(&ray, |b| !b.is_static());
    assert_eq!(id, Some(id_near));

    let (id, hit) = system.pick(&Ray::new(Vec3::new(-5.0, 3.0, 0.0), Vec3::x()));
    assert_eq!(id, None);
    assert!(!hit.hit);
}

#[test]
fn test_pick_through_octree() {
    let mut world = World::new();
    let near = world.create_entity_with(Transform::from_position(Vec3::new(3.0, 0.0, 0.0)));
    let far = world.create_entity_with(Transform::from_position(Vec3::new(12.0, 0.0, 0.0)));
    let outside = world.create_entity_with(Transform::from_position(Vec3::new(40.0, 0.0, 0.0)));

    let mut system = CollisionSystem::new();
    system.set_octree(
        &AABox::new(Vec3::repeat(-32.0), Vec3::repeat(32.0)),
        OctreeConfig { split_threshold: 1, max_depth: 4, min_radius: 1.0 },
    );
    let id_near = system.add_bounder(&world, near, 1, ball(1.0)).unwrap();
    let id_far = system.add_bounder(&world, far, 1, ball(1.0)).unwrap();
    let id_outside = system.add_bounder(&world, outside, 1, ball(1.0)).unwrap();
    assert!(system.is_outside(id_outside));

    // The ray runs along the octree's center planes
    let ray = Ray::new(Vec3::new(-20.0, 0.0, 0.0), Vec3::x());
    let (id, hit) = system.pick(&ray);
    assert_eq!(id, Some(id_near));
    assert_relative_eq!(hit.distance, 22.0);

    assert_eq!(system.pick_ignoring(&ray, near).0, Some(id_far));
    let (id, hit) = system.pick_with(&ray, |b| b.entity() == outside);
    assert_eq!(id, Some(id_outside));
    assert_relative_eq!(hit.distance, 59.0);
}

#[test]
fn test_destroyed_entity_is_deregistered() {
    let mut world = World::new();
    let doomed = world.create_entity();
    let other = world.create_entity_with(Transform::from_position(Vec3::new(0.5, 0.0, 0.0)));

    let mut system = CollisionSystem::new();
    let head = system.add_bounder(&world, doomed, 1, ball(0.5)).unwrap();
    system.add_bounder(&world, doomed, 1, cube(-0.5, 0.5)).unwrap();
    system.add_bounder(&world, other, 1, ball(0.5)).unwrap();
    assert_eq!(system.bounder_count(), 3);

    world.destroy_entity(doomed);
    system.update(&mut world);

    assert_eq!(system.bounder_count(), 1);
    assert!(system.bounder(head).is_none());
    assert!(system.entity_bounders(doomed).is_empty());
    assert!(system.drain_events().is_empty());
    assert_eq!(system.pick(&Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::x())).1.distance, 5.0);
}

#[test]
fn test_registration_errors() {
    let mut world = World::new();
    let e = world.create_entity();
    let mut system = CollisionSystem::new();

    let ghost_entity = Entity::new(99);
    assert_eq!(
        system.add_bounder(&world, ghost_entity, 1, ball(1.0)),
        Err(CollisionError::UnknownEntity(ghost_entity))
    );
    assert_eq!(
        system.add_bounder(&world, e, 1, ball(0.0)),
        Err(CollisionError::InvalidRadius(0.0))
    );
    assert_eq!(
        system.add_bounder_from_mesh(&world, e, 1, &[], ShapeKinds::empty()),
        Err(CollisionError::EmptyMesh)
    );

    let id = system.add_bounder(&world, e, 1, ball(1.0)).unwrap();
    assert!(system.remove_bounder(id).is_ok());
    assert_eq!(system.remove_bounder(id).unwrap_err(), CollisionError::UnknownBounder);
    assert!(!system.mark_potential(e));
    assert_eq!(system.bounder_count(), 0);
}

#[test]
fn test_bounder_from_mesh_follows_transform() {
    let mut world = World::new();
    let e = world.create_entity_with(Transform::from_position(Vec3::new(10.0, 0.0, 0.0)));
    let vertices = AABox::new(Vec3::repeat(-1.0), Vec3::repeat(1.0)).corners();

    let mut system = CollisionSystem::new();
    let id = system
        .add_bounder_from_mesh(&world, e, 1, &vertices, ShapeKinds::AABB | ShapeKinds::CAPSULE)
        .unwrap();
    let bounder = system.bounder(id).unwrap();
    assert_eq!(*bounder.world_shape(), cube(-1.0, 1.0).to_world_space(&Transform::from_position(Vec3::new(10.0, 0.0, 0.0))));
    assert_relative_eq!(bounder.enclosing_aabox().min, Vec3::new(9.0, -1.0, -1.0));
}

#[test]
fn test_out_of_bounds_reported_once() {
    let mut world = World::new();
    let e = world.create_entity();

    let mut system = CollisionSystem::new();
    system.set_octree(&AABox::new(Vec3::repeat(-10.0), Vec3::repeat(10.0)), OctreeConfig::default());
    let id = system.add_bounder(&world, e, 1, ball(1.0)).unwrap();
    system.update(&mut world);
    assert!(system.drain_events().is_empty());

    world.move_by(e, Vec3::new(20.0, 0.0, 0.0));
    system.update(&mut world);
    assert_eq!(system.drain_events(), vec![CollisionEvent::OutOfBounds { bounder: id, entity: e }]);
    assert!(system.is_outside(id));
    assert!(!system.octree().unwrap().contains(id));

    world.move_by(e, Vec3::new(1.0, 0.0, 0.0));
    system.update(&mut world);
    assert!(system.drain_events().is_empty());

    world.set_position(e, Vec3::zeros());
    system.update(&mut world);
    assert!(!system.is_outside(id));
    assert!(system.octree().unwrap().contains(id));
}

#[test]
fn test_outside_bounders_still_collide() {
    let mut world = World::new();
    let a = world.create_entity_with(Transform::from_position(Vec3::new(50.0, 0.0, 0.0)));
    let b = world.create_entity_with(Transform::from_position(Vec3::new(51.0, 0.0, 0.0)));
    let inside = world.create_entity();

    let mut system = CollisionSystem::new();
    system.set_octree(&AABox::new(Vec3::repeat(-10.0), Vec3::repeat(10.0)), OctreeConfig::default());
    system.add_bounder(&world, a, 1, ball(1.0)).unwrap();
    system.add_bounder(&world, b, Bounder::STATIC, ball(1.0)).unwrap();
    system.add_bounder(&world, inside, 1, ball(1.0)).unwrap();
    system.update(&mut world);

    assert_relative_eq!(position(&world, a), Vec3::new(49.0, 0.0, 0.0));
    assert_eq!(position(&world, inside), Vec3::zeros());
}

fn crowd(world: &mut World, system: &mut CollisionSystem) -> Vec<Entity> {
    let floor = world.create_entity();
    system
        .add_bounder(world, floor, Bounder::STATIC, slab(Vec3::new(-20.0, -1.0, -20.0), Vec3::new(20.0, 0.0, 20.0)))
        .unwrap();

    let mut movers = Vec::new();
    for i in 0..9_u8 {
        let x = f32::from(i) * 1.1 - 4.0;
        let z = f32::from(i % 2) * 0.7;
        let e = world.create_entity_with(Transform::from_position(Vec3::new(x, 0.5, z)));
        let shape: Shape = match i % 3 {
            0 => ball(0.8),
            1 => cube(-0.6, 0.6),
            _ => Capsule::new(Vec3::zeros(), 0.4, 0.8).into(),
        };
        system.add_bounder(world, e, 1 + u32::from(i % 3), shape).unwrap();
        movers.push(e);
    }
    movers
}

#[test]
fn test_octree_matches_linear_sweep() {
    let mut linear_world = World::new();
    let mut linear = CollisionSystem::new();
    let linear_movers = crowd(&mut linear_world, &mut linear);

    let mut tree_world = World::new();
    let mut tree = CollisionSystem::new();
    tree.set_octree(
        &AABox::new(Vec3::repeat(-32.0), Vec3::repeat(32.0)),
        OctreeConfig { split_threshold: 2, max_depth: 6, min_radius: 1.0 },
    );
    let tree_movers = crowd(&mut tree_world, &mut tree);

    for tick in 0..4 {
        for (&l, &t) in linear_movers.iter().zip(&tree_movers) {
            let push = Vec3::new(0.3, -0.2, if tick % 2 == 0 { 0.1 } else { -0.1 });
            linear_world.move_by(l, push);
            tree_world.move_by(t, push);
        }
        linear.update(&mut linear_world);
        tree.update(&mut tree_world);

        for (&l, &t) in linear_movers.iter().zip(&tree_movers) {
            assert_eq!(position(&linear_world, l), position(&tree_world, t), "tick {tick}");
        }
        let linear_events = linear.drain_events();
        assert!(!linear_events.is_empty());
        assert_eq!(adjustments(&linear_events), adjustments(&tree.drain_events()));
    }
}

#[test]
fn test_handlers_consume_events() {
    struct CountAdjustments(std::rc::Rc<std::cell::Cell<usize>>);

    impl EventHandler for CountAdjustments {
        fn on_event(&mut self, _event: &CollisionEvent) -> bool {
            self.0.set(self.0.get() + 1);
            true
        }
    }

    let mut world = World::new();
    let a = world.create_entity();
    let b = world.create_entity();

    let count = std::rc::Rc::new(std::cell::Cell::new(0));
    let mut system = CollisionSystem::new();
    system
        .events_mut()
        .register_handler(EventType::ObjectAdjusted, Box::new(CountAdjustments(count.clone())));
    system.add_bounder(&world, a, 1, cube(0.0, 2.0)).unwrap();
    system.add_bounder(&world, b, 2, cube(1.0, 3.0)).unwrap();
    system.update(&mut world);

    assert_eq!(count.get(), 1);
    let events = system.drain_events();
    assert_eq!(events.len(), 3);
    assert!(adjustments(&events).is_empty());
}

#[test]
fn test_from_config() {
    let config = CollisionConfig {
        settle_pass: false,
        octree: Some(OctreeSettings {
            world_min: Vec3::repeat(-50.0),
            world_max: Vec3::repeat(50.0),
            config: OctreeConfig::default(),
        }),
        ..CollisionConfig::default()
    };
    let system = CollisionSystem::from_config(&config).unwrap();
    assert!(!system.settle_pass());
    assert!(system.octree().is_some());
    assert_relative_eq!(system.spatial_query().unwrap().bounds().max, Vec3::repeat(50.0));

    let inverted = CollisionConfig {
        octree: Some(OctreeSettings {
            world_min: Vec3::repeat(1.0),
            world_max: Vec3::repeat(-1.0),
            config: OctreeConfig::default(),
        }),
        ..CollisionConfig::default()
    };
    assert!(matches!(
        CollisionSystem::from_config(&inverted),
        Err(CollisionError::InvalidBox { .. })
    ));

    let plain = CollisionSystem::from_config(&CollisionConfig::default()).unwrap();
    assert!(plain.settle_pass());
    assert!(plain.spatial_query().is_none());
}
