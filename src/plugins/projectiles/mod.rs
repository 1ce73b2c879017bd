//! Projectiles plugin: **message-based producer → consumer** spawning +
//! data-driven pooling.
//!
//! # Philosophy: invariants first
//! This module tree pushes correctness checks to boundaries and keeps hot
//! paths (allocation, collision resolve, return commit) as straight-line as
//! possible. The pool free list is trusted: a pooled entity must carry the
//! full shot component set, and a violation is a loud `expect()`, not a
//! branch in the hot loop.
//!
//! # Data flow (big picture)
//! ```text
//!   Update schedule (variable dt)
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │  Producers: behavior phase actions, defeat resolution, bomb impacts    │
//! │      - write: SpawnShotRequest messages                                │
//! │                                                                        │
//! │  Consumer: allocate_shots_from_pool                                    │
//! │      - single writer that pops the pool and resets shot components     │
//! └────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//! FixedUpdate (SimSet::Act)
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │  steer_bezier_shots: evaluate curve at elapsed fraction, set velocity  │
//! └────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//! FixedPostUpdate
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │  (avian emits CollisionStart / CollisionEnd)                           │
//! │  CombatSet::Collide:                                                   │
//! │      track_area_overlaps  → explosion overlap sets                     │
//! │      process_shot_impacts → one-shot delivery, bomb detonation         │
//! │      area_damage          → per-tick continuous delivery               │
//! │  tick_lifetimes (after Collide: impacts win over same-tick expiry)     │
//! │  return_to_pool_commit    → Inactive invariants + pool push            │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Why "Messages" instead of direct pool access?
//! Producers never borrow `ResMut<ShotPool>`. They only enqueue intent; the
//! allocator is the single writer that mutates the pool. It also gives the
//! ordering guarantee the simulation relies on: a shot requested during this
//! tick's behavior evaluation is allocated in `Update` and first collides in
//! the *next* fixed tick, so spawn side effects are never resolved in the
//! same tick that produced them.

pub mod components;
pub mod pool;
pub mod collision;
pub mod motion;

pub mod messages;
pub mod allocator;
pub mod commit;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::combat::CombatSet;
use crate::plugins::core::update_messages;
use crate::plugins::freeze::SimSet;

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        // Pool + pre-spawn
        app.insert_resource(pool::ShotPool::new(256))
            .add_systems(Startup, pool::init_shot_pool);

        // Message storage for spawn requests.
        app.init_resource::<Messages<messages::SpawnShotRequest>>();
        app.add_systems(PostUpdate, update_messages::<messages::SpawnShotRequest>);

        // Spawn pipeline: producers ran in the fixed step; consume here.
        app.add_systems(
            Update,
            allocator::allocate_shots_from_pool.run_if(in_state(GameState::InGame)),
        );

        // Curved motion is part of the acting simulation.
        app.add_systems(
            FixedUpdate,
            motion::steer_bezier_shots
                .in_set(SimSet::Act)
                .run_if(in_state(GameState::InGame)),
        );

        // Fixed collision pipeline.
        app.add_systems(
            FixedPostUpdate,
            (
                collision::track_area_overlaps,
                collision::process_shot_impacts,
                collision::area_damage,
            )
                .chain()
                .in_set(CombatSet::Collide)
                .after(CollisionEventSystems)
                .run_if(in_state(GameState::InGame)),
        );

        app.add_systems(
            FixedPostUpdate,
            motion::tick_lifetimes
                .after(CombatSet::Collide)
                .run_if(in_state(GameState::InGame)),
        );

        app.add_systems(
            FixedPostUpdate,
            commit::return_to_pool_commit.after(motion::tick_lifetimes),
        );

        // Global clears: player defeat and level (re)start drain the field.
        app.add_systems(
            OnEnter(GameState::GameOver),
            (commit::clear_active_shots, commit::return_to_pool_commit).chain(),
        );
        app.add_systems(
            OnEnter(GameState::Ready),
            (commit::clear_active_shots, commit::return_to_pool_commit).chain(),
        );
    }
}

#[cfg(test)]
mod tests;
