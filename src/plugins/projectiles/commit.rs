//! Return commit: recycle shots back into the pool.
//!
//! This system is the "owner" of the *Inactive invariants*.
//!
//! Invariant: Inactive shots must be:
//! - hidden
//! - velocity = 0, gravity scale = 0
//! - collide with nothing (filters empty)
//! - carrying no stale motion curve, lifetime, or overlap set
//!
//! Centralizing these writes here prevents inconsistencies.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{
    inactive_shot_layers, Lifetime, Overlapping, PooledShot, ShotEntity, ShotMotion, ShotState,
};
use super::pool::ShotPool;

/// Mark every live shot for return. Used by the global clear paths (player
/// defeat, level restart) — this retires without delivering damage.
pub fn clear_active_shots(mut q: Query<&mut ShotState, With<PooledShot>>) {
    for mut state in &mut q {
        if *state == ShotState::Active {
            *state = ShotState::PendingReturn;
        }
    }
}

pub fn return_to_pool_commit(
    mut pool: ResMut<ShotPool>,
    mut q: Query<
        (
            Entity,
            &mut ShotState,
            &mut ShotMotion,
            &mut Lifetime,
            &mut Overlapping,
            &mut Visibility,
            &mut LinearVelocity,
            &mut GravityScale,
            &mut CollisionLayers,
        ),
        With<PooledShot>,
    >,
) {
    for (
        e,
        mut state,
        mut motion,
        mut lifetime,
        mut overlapping,
        mut vis,
        mut vel,
        mut gravity,
        mut layers,
    ) in &mut q
    {
        if *state != ShotState::PendingReturn {
            continue;
        }

        *state = ShotState::Inactive;
        *motion = ShotMotion::Linear;
        *lifetime = Lifetime::INFINITE;
        overlapping.0.clear();
        *vis = Visibility::Hidden;
        vel.0 = Vec2::ZERO;
        gravity.0 = 0.0;
        *layers = inactive_shot_layers();

        pool.push_free(ShotEntity(e));
    }
}
