use avian2d::prelude::*;
use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::test_utils::run_system_once;
use crate::plugins::core::{FxCue, Score, ScoreDelta};
use crate::plugins::freeze::{FreezeCategory, FreezeGroup, FreezeSwitch};
use crate::plugins::projectiles::messages::SpawnShotRequest;

use super::{
    apply_damage, resolve_defeats, tick_invulnerability, DamageMessage, Defeated,
    ExplosionPayload, Health, Invulnerability, MercyOnHit, PendingDespawn, ScoreValue,
};

fn combat_world() -> World {
    let mut world = World::new();
    world.insert_resource(Score::default());
    world.init_resource::<Messages<DamageMessage>>();
    world.init_resource::<Messages<FxCue>>();
    world.init_resource::<Messages<ScoreDelta>>();
    world.init_resource::<Messages<SpawnShotRequest>>();
    world
}

fn damage(world: &mut World, target: Entity, amount: i32) {
    world.write_message(DamageMessage {
        target,
        amount,
        source: None,
    });
}

fn spawn_target(world: &mut World, max: i32) -> Entity {
    world
        .spawn((
            Health::new(max),
            ScoreValue(500),
            ExplosionPayload(0),
            Transform::from_xyz(12.0, -3.0, 1.0),
            CollisionLayers::new(Layer::Enemy, [Layer::PlayerShot, Layer::Player]),
        ))
        .id()
}

#[test]
fn health_stays_clamped_over_any_sequence() {
    let mut h = Health::new(10);
    for amount in [3, 0, 200, 1, 5] {
        h.apply(amount);
        assert!((0..=h.max()).contains(&h.current()));
    }
    assert_eq!(h.current(), 0);

    h.refill();
    assert_eq!(h.current(), 10);
}

#[test]
fn invincible_target_rejects_damage_without_state_change() {
    let mut world = combat_world();
    let e = spawn_target(&mut world, 10);
    world.get_mut::<Health>(e).unwrap().invincible = true;

    damage(&mut world, e, 7);
    run_system_once(&mut world, apply_damage);

    assert_eq!(world.get::<Health>(e).unwrap().current(), 10);

    let blocked: Vec<FxCue> = world.resource_mut::<Messages<FxCue>>().drain().collect();
    assert_eq!(blocked, vec![FxCue::DamageBlocked]);
}

#[test]
fn zero_damage_is_a_legal_noop() {
    let mut world = combat_world();
    let e = spawn_target(&mut world, 10);

    damage(&mut world, e, 0);
    run_system_once(&mut world, apply_damage);

    assert_eq!(world.get::<Health>(e).unwrap().current(), 10);
    assert!(world.resource_mut::<Messages<FxCue>>().drain().next().is_none());
}

#[test]
fn one_defeat_even_when_several_hits_cross_zero_together() {
    let mut world = combat_world();
    let e = spawn_target(&mut world, 3);

    // Both messages land in the same tick; both cross (or pass) zero.
    damage(&mut world, e, 3);
    damage(&mut world, e, 50);
    run_system_once(&mut world, apply_damage);
    run_system_once(&mut world, resolve_defeats);
    // A second defeat pass over the same world must change nothing.
    run_system_once(&mut world, resolve_defeats);

    assert_eq!(world.resource::<Score>().0, 500);
    assert!(world.get::<Defeated>(e).is_some());
    assert!(world.get::<PendingDespawn>(e).is_some());

    let explosions: Vec<SpawnShotRequest> = world
        .resource_mut::<Messages<SpawnShotRequest>>()
        .drain()
        .collect();
    assert_eq!(explosions.len(), 1);
    assert_eq!(explosions[0].pos, Vec2::new(12.0, -3.0));
}

#[test]
fn defeat_clears_collision_filters_before_removal() {
    let mut world = combat_world();
    let e = spawn_target(&mut world, 1);

    damage(&mut world, e, 1);
    run_system_once(&mut world, apply_damage);
    run_system_once(&mut world, resolve_defeats);

    let layers = world.get::<CollisionLayers>(e).unwrap();
    assert!(layers.memberships.has_all(Layer::Enemy));
    assert!(!layers.filters.has_all(Layer::PlayerShot));
}

#[test]
fn damage_after_defeat_is_silently_ignored() {
    let mut world = combat_world();
    let e = spawn_target(&mut world, 1);

    damage(&mut world, e, 1);
    run_system_once(&mut world, apply_damage);
    run_system_once(&mut world, resolve_defeats);

    damage(&mut world, e, 99);
    run_system_once(&mut world, apply_damage);
    run_system_once(&mut world, resolve_defeats);

    // Score unchanged, still exactly one defeat.
    assert_eq!(world.resource::<Score>().0, 500);
}

#[test]
fn mercy_window_opens_on_hit_and_closes_on_expiry() {
    let mut world = combat_world();
    world.insert_resource(FreezeSwitch::default());
    world.insert_resource(Time::<Fixed>::from_seconds(0.6));
    world.resource_mut::<Time<Fixed>>().advance_by(std::time::Duration::from_secs_f32(0.6));

    let e = world
        .spawn((
            Health::new(28),
            MercyOnHit(0.5),
            FreezeGroup(FreezeCategory::Player),
            Transform::default(),
            CollisionLayers::new(Layer::Player, [Layer::Enemy]),
        ))
        .id();

    damage(&mut world, e, 4);
    run_system_once(&mut world, apply_damage);

    assert_eq!(world.get::<Health>(e).unwrap().current(), 24);
    assert!(world.get::<Health>(e).unwrap().invincible);
    assert!(world.get::<Invulnerability>(e).is_some());

    // A follow-up hit inside the window bounces off.
    damage(&mut world, e, 4);
    run_system_once(&mut world, apply_damage);
    assert_eq!(world.get::<Health>(e).unwrap().current(), 24);

    // One 0.6s fixed tick outlives the 0.5s window.
    run_system_once(&mut world, tick_invulnerability);

    assert!(!world.get::<Health>(e).unwrap().invincible);
    assert!(world.get::<Invulnerability>(e).is_none());
}

#[test]
fn frozen_mercy_window_does_not_tick() {
    let mut world = combat_world();
    let mut switch = FreezeSwitch::default();
    switch.set(FreezeCategory::Player, true);
    world.insert_resource(switch);
    world.insert_resource(Time::<Fixed>::from_seconds(1.0));
    world.resource_mut::<Time<Fixed>>().advance_by(std::time::Duration::from_secs(1));

    let e = world
        .spawn((
            Health::new(28),
            FreezeGroup(FreezeCategory::Player),
            Invulnerability(Timer::from_seconds(0.5, TimerMode::Once)),
        ))
        .id();
    world.get_mut::<Health>(e).unwrap().invincible = true;

    run_system_once(&mut world, tick_invulnerability);

    let window = world.get::<Invulnerability>(e).unwrap();
    assert_eq!(window.0.elapsed_secs(), 0.0);
    assert!(world.get::<Health>(e).unwrap().invincible);
}
