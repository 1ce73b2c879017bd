//! Projectiles plugin tests — **deterministic**.
//!
//! These tests avoid relying on the full physics pipeline to generate
//! collisions. Instead, they **inject `CollisionStart` messages directly**
//! and then run the relevant systems once.

use avian2d::prelude::*;
use bevy::ecs::message::Messages;
use bevy::prelude::*;
use std::time::Duration;

use crate::common::layers::Layer;
use crate::common::test_utils::run_system_once;
use crate::plugins::combat::DamageMessage;
use crate::plugins::freeze::FreezeSwitch;

use super::components::{Lifetime, Overlapping, PooledShot, Shot, ShotMotion, ShotRole, ShotState};
use super::messages::{MotionSpec, ShotFaction, SpawnShotRequest};
use super::{allocator, collision, commit, motion, pool};

// --------------------------------------------------------------------------
// Helpers
// --------------------------------------------------------------------------

fn shot_world(capacity: usize) -> World {
    let mut world = World::new();
    world.insert_resource(pool::ShotPool::new(capacity));
    world.insert_resource(FreezeSwitch::default());
    world.init_resource::<Messages<SpawnShotRequest>>();
    world.init_resource::<Messages<DamageMessage>>();
    world.init_resource::<Messages<CollisionStart>>();
    world.init_resource::<Messages<CollisionEnd>>();
    run_system_once(&mut world, pool::init_shot_pool);
    world
}

fn set_fixed_delta(world: &mut World, secs: f32) {
    world.insert_resource(Time::<Fixed>::from_seconds(secs.into()));
    world
        .resource_mut::<Time<Fixed>>()
        .advance_by(Duration::from_secs_f32(secs));
}

/// Request a shot and run the allocator; returns the activated entity.
fn launch(world: &mut World, req: SpawnShotRequest) -> Entity {
    world.write_message(req);
    run_system_once(world, allocator::allocate_shots_from_pool);
    let mut q = world.query::<(Entity, &ShotState)>();
    q.iter(world)
        .find(|(_, s)| **s == ShotState::Active)
        .map(|(e, _)| e)
        .expect("allocator should have activated a shot")
}

fn bullet_request(damage: i32) -> SpawnShotRequest {
    SpawnShotRequest {
        faction: ShotFaction::Player,
        role: ShotRole::Bullet,
        pos: Vec2::new(10.0, 20.0),
        motion: MotionSpec::Linear {
            velocity: Vec2::new(600.0, 0.0),
        },
        damage,
        lifetime: 2.0,
        owner: None,
    }
}

fn write_collision_start(world: &mut World, a: Entity, b: Entity) {
    world.write_message(CollisionStart {
        collider1: a,
        collider2: b,
        body1: Some(a),
        body2: Some(b),
    });
}

fn spawn_enemy_collider(world: &mut World) -> Entity {
    world
        .spawn(CollisionLayers::new(
            Layer::Enemy,
            [Layer::PlayerShot, Layer::Player],
        ))
        .id()
}

fn spawn_wall_collider(world: &mut World) -> Entity {
    world
        .spawn(CollisionLayers::new(
            Layer::World,
            [Layer::PlayerShot, Layer::EnemyShot],
        ))
        .id()
}

fn drained_damage(world: &mut World) -> Vec<DamageMessage> {
    world
        .resource_mut::<Messages<DamageMessage>>()
        .drain()
        .collect()
}

// --------------------------------------------------------------------------
// Pooling
// --------------------------------------------------------------------------

#[test]
fn init_shot_pool_spawns_capacity_shots_inactive() {
    let mut world = shot_world(8);

    let pool_res = world.resource::<pool::ShotPool>();
    assert_eq!(pool_res.free_len(), 8);

    let mut q = world.query::<(&PooledShot, &ShotState, &Visibility, &CollisionLayers, &Lifetime)>();
    let mut count = 0;
    for (_ps, state, vis, layers, lifetime) in q.iter(&world) {
        count += 1;
        assert_eq!(*state, ShotState::Inactive);
        assert_eq!(*vis, Visibility::Hidden);
        // Inactive shots collide with nothing.
        assert!(!layers.filters.has_all(Layer::World));
        assert!(!layers.filters.has_all(Layer::Enemy));
        assert!(lifetime.0.is_infinite());
    }
    assert_eq!(count, 8);
}

#[test]
fn allocation_activates_and_resets_state() {
    let mut world = shot_world(1);
    let e = launch(&mut world, bullet_request(3));

    assert_eq!(world.get::<Transform>(e).unwrap().translation.truncate(), Vec2::new(10.0, 20.0));
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::new(600.0, 0.0));
    assert_eq!(*world.get::<Visibility>(e).unwrap(), Visibility::Visible);
    assert_eq!(world.get::<Shot>(e).unwrap().damage, 3);
    assert_eq!(world.get::<Lifetime>(e).unwrap().0, 2.0);
    assert_eq!(world.get::<GravityScale>(e).unwrap().0, 0.0);

    let layers = world.get::<CollisionLayers>(e).unwrap();
    assert!(layers.memberships.has_all(Layer::PlayerShot));
    assert!(layers.filters.has_all(Layer::World));
    assert!(layers.filters.has_all(Layer::Enemy));

    assert_eq!(world.resource::<pool::ShotPool>().free_len(), 0);
}

#[test]
fn arc_launch_enables_gravity() {
    let mut world = shot_world(1);
    let e = launch(
        &mut world,
        SpawnShotRequest {
            faction: ShotFaction::Enemy,
            role: ShotRole::Bomb,
            pos: Vec2::ZERO,
            motion: MotionSpec::Arc {
                velocity: Vec2::new(40.0, 180.0),
            },
            damage: 4,
            lifetime: f32::INFINITY,
            owner: None,
        },
    );

    assert_eq!(world.get::<GravityScale>(e).unwrap().0, 1.0);
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::new(40.0, 180.0));
    let layers = world.get::<CollisionLayers>(e).unwrap();
    assert!(layers.memberships.has_all(Layer::EnemyShot));
    assert!(layers.filters.has_all(Layer::Player));
}

#[test]
fn return_commit_restores_inactive_invariants() {
    let mut world = shot_world(1);
    let e = launch(&mut world, bullet_request(1));

    *world.get_mut::<ShotState>(e).unwrap() = ShotState::PendingReturn;
    world.get_mut::<Overlapping>(e).unwrap().0.push(Entity::PLACEHOLDER);

    run_system_once(&mut world, commit::return_to_pool_commit);

    assert_eq!(*world.get::<ShotState>(e).unwrap(), ShotState::Inactive);
    assert_eq!(*world.get::<Visibility>(e).unwrap(), Visibility::Hidden);
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::ZERO);
    assert!(world.get::<Lifetime>(e).unwrap().0.is_infinite());
    assert!(world.get::<Overlapping>(e).unwrap().0.is_empty());
    assert!(matches!(world.get::<ShotMotion>(e).unwrap(), ShotMotion::Linear));
    assert_eq!(world.resource::<pool::ShotPool>().free_len(), 1);
}

// --------------------------------------------------------------------------
// Impacts
// --------------------------------------------------------------------------

#[test]
fn bullet_delivers_damage_exactly_once_and_retires() {
    let mut world = shot_world(1);
    let shot = launch(&mut world, bullet_request(2));
    let enemy = spawn_enemy_collider(&mut world);

    // Two contacts reported in the same tick; only one may deliver.
    write_collision_start(&mut world, shot, enemy);
    write_collision_start(&mut world, shot, enemy);

    run_system_once(&mut world, collision::process_shot_impacts);

    let delivered = drained_damage(&mut world);
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].target, enemy);
    assert_eq!(delivered[0].amount, 2);
    assert_eq!(*world.get::<ShotState>(shot).unwrap(), ShotState::PendingReturn);
}

#[test]
fn bullet_is_absorbed_by_world_without_damage() {
    let mut world = shot_world(1);
    let shot = launch(&mut world, bullet_request(2));
    let wall = spawn_wall_collider(&mut world);

    write_collision_start(&mut world, shot, wall);
    run_system_once(&mut world, collision::process_shot_impacts);

    assert!(drained_damage(&mut world).is_empty());
    assert_eq!(*world.get::<ShotState>(shot).unwrap(), ShotState::PendingReturn);
}

#[test]
fn bomb_detonates_into_explosion_request_on_world_hit() {
    let mut world = shot_world(1);
    let shot = launch(
        &mut world,
        SpawnShotRequest {
            faction: ShotFaction::Enemy,
            role: ShotRole::Bomb,
            pos: Vec2::new(5.0, 9.0),
            motion: MotionSpec::Arc {
                velocity: Vec2::new(10.0, 100.0),
            },
            damage: 4,
            lifetime: f32::INFINITY,
            owner: None,
        },
    );
    let wall = spawn_wall_collider(&mut world);

    write_collision_start(&mut world, shot, wall);
    run_system_once(&mut world, collision::process_shot_impacts);

    let requests: Vec<SpawnShotRequest> = world
        .resource_mut::<Messages<SpawnShotRequest>>()
        .drain()
        .collect();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].role, ShotRole::Explosion);
    assert_eq!(requests[0].damage, 4);
    assert_eq!(requests[0].pos, Vec2::new(5.0, 9.0));
    assert_eq!(*world.get::<ShotState>(shot).unwrap(), ShotState::PendingReturn);
}

#[test]
fn impact_takes_precedence_over_same_tick_expiry() {
    let mut world = shot_world(1);
    let mut req = bullet_request(2);
    req.lifetime = 0.005;
    let shot = launch(&mut world, req);
    let enemy = spawn_enemy_collider(&mut world);

    write_collision_start(&mut world, shot, enemy);
    set_fixed_delta(&mut world, 0.02);

    run_system_once(&mut world, collision::process_shot_impacts);
    run_system_once(&mut world, motion::tick_lifetimes);
    run_system_once(&mut world, commit::return_to_pool_commit);

    // Damage delivered, and exactly one pool return despite the expired clock.
    assert_eq!(drained_damage(&mut world).len(), 1);
    assert_eq!(world.resource::<pool::ShotPool>().free_len(), 1);
}

// --------------------------------------------------------------------------
// Lifetimes
// --------------------------------------------------------------------------

#[test]
fn expiry_retires_without_damage() {
    let mut world = shot_world(1);
    let mut req = bullet_request(2);
    req.lifetime = 0.1;
    let shot = launch(&mut world, req);

    set_fixed_delta(&mut world, 0.2);
    run_system_once(&mut world, motion::tick_lifetimes);

    assert!(drained_damage(&mut world).is_empty());
    assert_eq!(*world.get::<ShotState>(shot).unwrap(), ShotState::PendingReturn);
}

#[test]
fn infinite_lifetime_never_expires() {
    let mut world = shot_world(1);
    let mut req = bullet_request(2);
    req.lifetime = f32::INFINITY;
    let shot = launch(&mut world, req);

    set_fixed_delta(&mut world, 100.0);
    run_system_once(&mut world, motion::tick_lifetimes);

    assert_eq!(*world.get::<ShotState>(shot).unwrap(), ShotState::Active);
}

#[test]
fn frozen_shots_keep_lifetimes_bit_for_bit() {
    let mut world = shot_world(1);
    let shot = launch(&mut world, bullet_request(1));

    world
        .resource_mut::<FreezeSwitch>()
        .set(crate::plugins::freeze::FreezeCategory::Shots, true);
    set_fixed_delta(&mut world, 0.5);

    for _ in 0..10 {
        run_system_once(&mut world, motion::tick_lifetimes);
    }

    assert_eq!(world.get::<Lifetime>(shot).unwrap().0, 2.0);
}

// --------------------------------------------------------------------------
// Curved motion
// --------------------------------------------------------------------------

#[test]
fn bezier_shot_is_steered_along_the_curve() {
    let mut world = shot_world(1);
    let p0 = Vec2::ZERO;
    let p1 = Vec2::new(50.0, 80.0);
    let p2 = Vec2::new(100.0, 0.0);
    let shot = launch(
        &mut world,
        SpawnShotRequest {
            faction: ShotFaction::Enemy,
            role: ShotRole::Bullet,
            pos: p0,
            motion: MotionSpec::Bezier {
                p1,
                p2,
                flight_time: 1.0,
            },
            damage: 2,
            lifetime: f32::INFINITY,
            owner: None,
        },
    );

    set_fixed_delta(&mut world, 0.1);
    run_system_once(&mut world, motion::steer_bezier_shots);

    // One tick in: velocity carries the body toward the t=0.1 curve point.
    let expected =
        crate::common::trajectory::quadratic_bezier(p0, p1, p2, 0.1) / 0.1;
    let vel = world.get::<LinearVelocity>(shot).unwrap().0;
    assert!((vel - expected).length() < 1e-3, "got {vel}, want {expected}");
}

#[test]
fn completed_curve_retires_like_expiry() {
    let mut world = shot_world(1);
    let shot = launch(
        &mut world,
        SpawnShotRequest {
            faction: ShotFaction::Enemy,
            role: ShotRole::Bullet,
            pos: Vec2::ZERO,
            motion: MotionSpec::Bezier {
                p1: Vec2::new(5.0, 5.0),
                p2: Vec2::new(10.0, 0.0),
                flight_time: 0.05,
            },
            damage: 2,
            lifetime: f32::INFINITY,
            owner: None,
        },
    );

    set_fixed_delta(&mut world, 0.1);
    run_system_once(&mut world, motion::steer_bezier_shots);

    assert_eq!(*world.get::<ShotState>(shot).unwrap(), ShotState::PendingReturn);
    assert!(drained_damage(&mut world).is_empty());
}

// --------------------------------------------------------------------------
// Area shots
// --------------------------------------------------------------------------

#[test]
fn explosion_damages_overlapped_target_every_tick() {
    let mut world = shot_world(1);
    let blast = launch(&mut world, SpawnShotRequest::explosion(Vec2::ZERO, 4));
    let enemy = spawn_enemy_collider(&mut world);

    write_collision_start(&mut world, blast, enemy);
    run_system_once(&mut world, collision::track_area_overlaps);

    run_system_once(&mut world, collision::area_damage);
    run_system_once(&mut world, collision::area_damage);

    let delivered = drained_damage(&mut world);
    assert_eq!(delivered.len(), 2);
    assert!(delivered.iter().all(|d| d.target == enemy && d.amount == 4));
}

#[test]
fn explosion_stops_damaging_after_overlap_ends() {
    let mut world = shot_world(1);
    let blast = launch(&mut world, SpawnShotRequest::explosion(Vec2::ZERO, 4));
    let enemy = spawn_enemy_collider(&mut world);

    write_collision_start(&mut world, blast, enemy);
    run_system_once(&mut world, collision::track_area_overlaps);

    world.write_message(CollisionEnd {
        collider1: blast,
        collider2: enemy,
        body1: Some(blast),
        body2: Some(enemy),
    });
    run_system_once(&mut world, collision::track_area_overlaps);
    run_system_once(&mut world, collision::area_damage);

    assert!(drained_damage(&mut world).is_empty());
}

#[test]
fn cosmetic_explosion_with_zero_payload_hurts_nothing() {
    let mut world = shot_world(1);
    let blast = launch(&mut world, SpawnShotRequest::explosion(Vec2::ZERO, 0));
    let enemy = spawn_enemy_collider(&mut world);

    write_collision_start(&mut world, blast, enemy);
    run_system_once(&mut world, collision::track_area_overlaps);
    run_system_once(&mut world, collision::area_damage);

    assert!(drained_damage(&mut world).is_empty());
}

// --------------------------------------------------------------------------
// Global clear
// --------------------------------------------------------------------------

#[test]
fn clear_returns_every_live_shot_to_the_pool() {
    let mut world = shot_world(3);
    launch(&mut world, bullet_request(1));
    world.write_message(bullet_request(1));
    world.write_message(bullet_request(1));
    run_system_once(&mut world, allocator::allocate_shots_from_pool);

    assert_eq!(world.resource::<pool::ShotPool>().free_len(), 0);

    run_system_once(&mut world, commit::clear_active_shots);
    run_system_once(&mut world, commit::return_to_pool_commit);

    assert_eq!(world.resource::<pool::ShotPool>().free_len(), 3);
    assert!(drained_damage(&mut world).is_empty());
}
