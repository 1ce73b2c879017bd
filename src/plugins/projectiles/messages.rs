//! Buffered spawn requests.
//!
//! We use Bevy **Messages** here instead of direct pool access.
//! The key idea is separation of concerns:
//! - producers (behavior actions, defeat resolution, bomb detonation) create
//!   *intent*
//! - the allocator applies intent (pool pop + component writes)
//!
//! Because allocation happens in `Update` and the physics narrow phase runs
//! in the fixed step, a shot requested this tick starts colliding the
//! following fixed tick — a spawner can never be hit by its own shot in the
//! tick that fired it.

use bevy::prelude::*;

use super::components::ShotRole;

/// How long a defeat/bomb explosion keeps its damage sensor alive.
pub const EXPLOSION_LIFETIME: f32 = 0.5;

/// Whose side the shot is on; decides the collision-tag filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShotFaction {
    Player,
    Enemy,
}

/// Launch motion requested by the producer. `Bezier` curves start at the
/// spawn position; control points come from the trajectory solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionSpec {
    Linear { velocity: Vec2 },
    Arc { velocity: Vec2 },
    Bezier { p1: Vec2, p2: Vec2, flight_time: f32 },
}

#[derive(Message, Clone, Copy, Debug)]
pub struct SpawnShotRequest {
    pub faction: ShotFaction,
    pub role: ShotRole,
    pub pos: Vec2,
    pub motion: MotionSpec,
    pub damage: i32,
    pub lifetime: f32,
    pub owner: Option<Entity>,
}

impl SpawnShotRequest {
    /// Stationary area blast. Defeat explosions carry `damage = 0` unless the
    /// defeated entity declared a payload.
    pub fn explosion(pos: Vec2, damage: i32) -> Self {
        Self {
            faction: ShotFaction::Enemy,
            role: ShotRole::Explosion,
            pos,
            motion: MotionSpec::Linear {
                velocity: Vec2::ZERO,
            },
            damage,
            lifetime: EXPLOSION_LIFETIME,
            owner: None,
        }
    }
}
