//! # Lifecycle Scenario Tests
//!
//! End-to-end checks of the tick pipeline through the public API:
//!
//! 1. **Deferred visibility**: structure reaches subscriptions only on update
//! 2. **Batch idempotence**: any attach/detach order yields the same composition
//! 3. **Id safety**: ids are never reissued while their entity is alive
//! 4. **Configuration**: the component-type cap is enforced at registration
//!
//! Run with: cargo test -p tessera_core --test lifecycle_scenarios

use std::cell::RefCell;
use std::rc::Rc;

use tessera_core::{
    Aspect, AspectBuilder, BitMask, Component, ComponentManager, EcsError, EntityId,
    EntityObserver, World, WorldConfig,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}
impl Component for Position {}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity {
    dx: f32,
    dy: f32,
}
impl Component for Velocity {}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Health(u32);
impl Component for Health {}

struct Slot<const N: usize>;
impl<const N: usize> Component for Slot<N> {}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn scenario_a_velocity_attach_joins_subscription_next_tick() {
    let mut world = World::new();
    let movers = world.subscribe(Aspect::all::<(Position, Velocity)>()).unwrap();

    let id = world
        .create_entity()
        .attach(Position { x: 0.0, y: 0.0 })
        .unwrap()
        .id();
    world.update(0.016);
    assert!(world.active_entities(movers).unwrap().is_empty());

    world.attach(id, Velocity { dx: 1.0, dy: 0.0 }).unwrap();
    world.update(0.016);
    assert_eq!(world.active_entities(movers).unwrap(), &[id]);
}

#[test]
fn scenario_b_exclude_health() {
    let mut world = World::new();
    let mortal_free = world.subscribe(Aspect::exclude::<(Health,)>()).unwrap();

    let a = world.create_entity().attach(Health(10)).unwrap().id();
    let b = world.create_entity().id();
    let c = world.create_entity().attach(Health(5)).unwrap().id();
    world.update(0.016);

    let ids = world.active_entities(mortal_free).unwrap();
    assert_eq!(ids, &[b]);
    assert!(!ids.contains(&a) && !ids.contains(&c));
}

#[test]
fn scenario_c_create_destroy_same_tick() {
    let mut world = World::new();
    let everything = world.subscribe(AspectBuilder::new()).unwrap();

    let id = world.create_entity().attach(Health(1)).unwrap().id();
    assert!(world.destroy_entity(id));
    world.update(0.016);

    assert!(!world.is_alive(id));
    assert_eq!(world.entities().iter_alive().count(), 0);
    assert!(world.active_entities(everything).unwrap().is_empty());

    let reused = world.create_entity().id();
    assert_eq!(reused.index(), id.index());
    assert_ne!(reused, id);
}

#[test]
fn scenario_d_thirty_third_type_is_fatal() {
    let mut world = World::new();
    macro_rules! register {
        ($($n:literal)*) => { $( world.register_component::<Slot<$n>>().unwrap(); )* };
    }
    register!(0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31);
    assert_eq!(world.components().type_count(), 32);

    let err = world.register_component::<Slot<32>>().unwrap_err();
    assert!(matches!(err, EcsError::ComponentTypeLimit { limit: 32, .. }));

    // The failure surfaces at the triggering call, not at commit.
    let id = world.create_entity().id();
    assert!(matches!(
        world.attach(id, Slot::<33>),
        Err(EcsError::ComponentTypeLimit { .. })
    ));
}

#[test]
fn wider_bitmask_lifts_the_cap() {
    let config = WorldConfig { component_capacity: 64, ..WorldConfig::default() };
    let mut world = World::with_config(config).unwrap();
    macro_rules! register {
        ($($n:literal)*) => { $( world.register_component::<Slot<$n>>().unwrap(); )* };
    }
    register!(0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31 32 33 34);

    let sub = world.subscribe(Aspect::all::<(Slot<34>,)>()).unwrap();
    let id = world.create_entity().attach(Slot::<34>).unwrap().id();
    world.update(0.0);
    assert_eq!(world.active_entities(sub).unwrap(), &[id]);
    assert!(world.composition(id).unwrap().contains(34));
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn destroyed_before_commit_is_never_observed() {
    let mut world = World::new();
    let positioned = world.subscribe(Aspect::all::<(Position,)>()).unwrap();
    world.active_entities(positioned).unwrap();

    let keep = world.create_entity().attach(Position { x: 1.0, y: 1.0 }).unwrap().id();
    for _ in 0..10 {
        let doomed = world.create_entity().attach(Position { x: 0.0, y: 0.0 }).unwrap().id();
        world.destroy_entity(doomed);
    }
    world.update(0.0);

    assert_eq!(world.active_entities(positioned).unwrap(), &[keep]);
    assert_eq!(world.entity_count(), 1);
}

#[test]
fn attach_detach_order_does_not_matter() {
    let mut world = World::new();
    world.register_component::<Position>().unwrap();
    world.register_component::<Velocity>().unwrap();
    world.register_component::<Health>().unwrap();

    let a = world.create_entity().id();
    let b = world.create_entity().id();
    world.update(0.0);

    world.attach(a, Health(1)).unwrap();
    world.attach(a, Position { x: 0.0, y: 0.0 }).unwrap();
    world.detach::<Health>(a).unwrap();
    world.attach(a, Velocity { dx: 0.0, dy: 0.0 }).unwrap();

    world.attach(b, Velocity { dx: 0.0, dy: 0.0 }).unwrap();
    world.detach::<Position>(b).unwrap();
    world.attach(b, Position { x: 0.0, y: 0.0 }).unwrap();
    world.attach(b, Health(1)).unwrap();
    world.detach::<Health>(b).unwrap();

    world.update(0.0);

    let expected: BitMask = [0, 1].into_iter().collect();
    assert_eq!(world.composition(a).unwrap(), &expected);
    assert_eq!(world.composition(b).unwrap(), &expected);
}

#[test]
fn ids_are_not_reissued_while_alive() {
    let mut world = World::new();
    let a = world.create_entity().id();
    world.update(0.0);

    world.destroy_entity(a);
    let b = world.create_entity().id();
    assert_ne!(b.index(), a.index());
    assert!(world.is_alive(a));

    world.update(0.0);
    assert!(!world.is_alive(a));
    let c = world.create_entity().id();
    assert_eq!(c.index(), a.index());
    assert!(world.entity_mut(a).is_err());
}

#[test]
fn store_ops_are_synchronous() {
    let mut world = World::new();
    let mut entity = world.create_entity();

    entity.attach(Position { x: 3.0, y: 4.0 }).unwrap();
    assert_eq!(entity.get::<Position>(), Some(&Position { x: 3.0, y: 4.0 }));

    entity.detach::<Position>().unwrap();
    assert!(!entity.has::<Position>());
    assert!(entity.get::<Position>().is_none());
}

#[test]
fn overwrite_replaces_value_without_structural_change() {
    let mut world = World::new();
    let healthy = world.subscribe(Aspect::all::<(Health,)>()).unwrap();
    let id = world.create_entity().attach(Health(10)).unwrap().id();
    world.update(0.0);
    world.active_entities(healthy).unwrap();
    let rebuilds = world.subscription(healthy).unwrap().rebuild_count();

    let previous = world.attach(id, Health(3)).unwrap();
    assert_eq!(previous, Some(Health(10)));
    let stats = world.commit();
    assert_eq!(stats.changed, 1);
    assert_eq!(world.active_entities(healthy).unwrap(), &[id]);
    assert_eq!(world.subscription(healthy).unwrap().rebuild_count(), rebuilds);
    assert_eq!(world.get::<Health>(id), Some(&Health(3)));
}

#[test]
fn reads_between_ticks_see_last_commit() {
    let mut world = World::new();
    let healthy = world.subscribe(Aspect::all::<(Health,)>()).unwrap();
    let id = world.create_entity().attach(Health(1)).unwrap().id();
    world.update(0.0);
    assert_eq!(world.active_entities(healthy).unwrap(), &[id]);

    world.detach::<Health>(id).unwrap();
    world.destroy_entity(id);
    // Not committed yet: the subscription still reports the entity.
    assert_eq!(world.active_entities(healthy).unwrap(), &[id]);

    world.update(0.0);
    assert!(world.active_entities(healthy).unwrap().is_empty());
}

#[test]
fn double_destroy_is_a_no_op() {
    let mut world = World::new();
    let id = world.create_entity().id();
    world.update(0.0);

    assert!(world.entity_mut(id).unwrap().destroy());
    assert!(!world.destroy_entity(id));
    let stats = world.commit();
    assert_eq!(stats.removed, 1);
}

#[derive(Default)]
struct Tally {
    changed: Vec<EntityId>,
    removed: Vec<EntityId>,
}

struct TallyObserver(Rc<RefCell<Tally>>);

impl EntityObserver for TallyObserver {
    fn on_changed(&mut self, entity: EntityId, _previous: &BitMask, _current: &BitMask) {
        self.0.borrow_mut().changed.push(entity);
    }

    fn on_removed(&mut self, entity: EntityId, _composition: &BitMask, _components: &ComponentManager) {
        self.0.borrow_mut().removed.push(entity);
    }
}

#[test]
fn every_touched_entity_changes_once_per_tick() {
    let tally = Rc::new(RefCell::new(Tally::default()));
    let mut world = World::new();
    world.entities_mut().add_observer(Box::new(TallyObserver(Rc::clone(&tally))));

    let a = world.create_entity().id();
    let b = world.create_entity().id();
    world.update(0.0);

    // a: attach then detach cancels out; b: attach then destroy.
    world.attach(a, Health(1)).unwrap();
    world.detach::<Health>(a).unwrap();
    world.attach(b, Health(2)).unwrap();
    world.destroy_entity(b);

    let stats = world.commit();
    assert_eq!((stats.changed, stats.removed), (2, 1));
    assert_eq!(tally.borrow().changed, vec![a, b]);
    assert_eq!(tally.borrow().removed, vec![b]);
    assert!(world.composition(a).unwrap().is_empty());
}
