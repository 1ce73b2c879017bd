//! Spawn consumer: activate shots from the pool.
//!
//! # Fail-fast invariants
//! - The pool free list contains only valid pooled shot entities.
//! - Therefore, a pooled entity must match the shot query.
//!
//! If this is violated, we `expect()` and crash loudly.
//! This removes branches from the hot loop and makes invariant violations
//! obvious.

use avian2d::prelude::*;
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use super::components::{
    Lifetime, Overlapping, PooledShot, Shot, ShotEntity, ShotMotion, ShotRole, ShotState,
};
use super::messages::{MotionSpec, SpawnShotRequest};
use super::pool::{active_shot_layers, ShotPool, BULLET_RADIUS, EXPLOSION_RADIUS};

pub fn allocate_shots_from_pool(
    mut pool: ResMut<ShotPool>,
    mut reader: MessageReader<SpawnShotRequest>,
    mut q: Query<
        (
            &mut ShotState,
            &mut Shot,
            &mut ShotMotion,
            &mut Lifetime,
            &mut Overlapping,
            &mut Transform,
            &mut LinearVelocity,
            &mut GravityScale,
            &mut Collider,
            &mut Visibility,
            &mut CollisionLayers,
        ),
        With<PooledShot>,
    >,
) {
    for req in reader.read() {
        let Some(ShotEntity(e)) = pool.pop_free() else {
            // Capacity decision, not a correctness failure.
            continue;
        };

        let (
            mut state,
            mut shot,
            mut motion,
            mut lifetime,
            mut overlapping,
            mut tf,
            mut vel,
            mut gravity,
            mut collider,
            mut vis,
            mut layers,
        ) = q
            .get_mut(e)
            .expect("ShotPool contained an entity missing pooled shot components");

        *state = ShotState::Active;
        shot.damage = req.damage;
        shot.role = req.role;
        tf.translation = req.pos.extend(2.0);
        *lifetime = Lifetime(req.lifetime);
        overlapping.0.clear();
        *vis = Visibility::Visible;

        // Shots are set in motion immediately; there is no arming delay.
        match req.motion {
            MotionSpec::Linear { velocity } => {
                vel.0 = velocity;
                gravity.0 = 0.0;
                *motion = ShotMotion::Linear;
            }
            MotionSpec::Arc { velocity } => {
                vel.0 = velocity;
                gravity.0 = 1.0;
                *motion = ShotMotion::Arc;
            }
            MotionSpec::Bezier {
                p1,
                p2,
                flight_time,
            } => {
                vel.0 = Vec2::ZERO;
                gravity.0 = 0.0;
                *motion = ShotMotion::Bezier {
                    p0: req.pos,
                    p1,
                    p2,
                    flight_time,
                    elapsed: 0.0,
                };
            }
        }

        *collider = match req.role {
            ShotRole::Explosion => Collider::circle(EXPLOSION_RADIUS),
            _ => Collider::circle(BULLET_RADIUS),
        };
        *layers = active_shot_layers(req.faction, req.role);
    }
}
