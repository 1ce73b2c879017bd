use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::plugins::freeze::{FreezeCategory, FreezeGroup};

use super::components::{
    inactive_shot_layers, Lifetime, Overlapping, PooledShot, Shot, ShotEntity, ShotMotion,
    ShotRole, ShotState,
};
use super::messages::ShotFaction;

pub const BULLET_RADIUS: f32 = 4.0;
pub const EXPLOSION_RADIUS: f32 = 22.0;

#[derive(Resource, Debug)]
pub struct ShotPool {
    free: Vec<ShotEntity>,
    pub capacity: usize,
}

impl ShotPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn pop_free(&mut self) -> Option<ShotEntity> {
        self.free.pop()
    }

    #[inline]
    pub fn push_free(&mut self, shot: ShotEntity) {
        self.free.push(shot);
    }

    #[inline]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }
}

/// Active collision filters: which layers this shot can hit.
///
/// Shots always collide with the world; the damageable filter is the opposing
/// faction. Explosions skip the world (they are stationary) and only sense
/// the damageable side.
#[inline]
pub fn active_shot_layers(faction: ShotFaction, role: ShotRole) -> CollisionLayers {
    let (membership, hurts) = match faction {
        ShotFaction::Player => (Layer::PlayerShot, Layer::Enemy),
        ShotFaction::Enemy => (Layer::EnemyShot, Layer::Player),
    };
    match role {
        ShotRole::Explosion => CollisionLayers::new(membership, [hurts]),
        _ => CollisionLayers::new(membership, [Layer::World, hurts]),
    }
}

/// Pre-spawn pooled shots (inactive).
///
/// Physics components stay present for the whole pool lifetime; "disabled"
/// just means empty collision filters, so activation never moves archetypes.
/// All shots are dynamic sensors: gravity applies when a launch asks for it
/// (`GravityScale` 1), and sensors overlap instead of pushing what they hit.
pub fn init_shot_pool(mut commands: Commands, mut pool: ResMut<ShotPool>) {
    let cap = pool.capacity;
    pool.free.clear();
    pool.free.reserve(cap);

    for _ in 0..cap {
        let e = commands
            .spawn((
                Name::new("Shot(Pooled)"),
                PooledShot,
                ShotState::Inactive,
                Shot {
                    damage: 0,
                    role: ShotRole::Bullet,
                },
                ShotMotion::default(),
                Lifetime::INFINITE,
                Overlapping::default(),
                FreezeGroup(FreezeCategory::Shots),
                (
                    Sprite {
                        color: Color::srgb(1.0, 0.85, 0.3),
                        custom_size: Some(Vec2::splat(8.0)),
                        ..default()
                    },
                    Transform::from_xyz(0.0, 0.0, 2.0),
                    Visibility::Hidden,
                ),
                (
                    RigidBody::Dynamic,
                    Collider::circle(BULLET_RADIUS),
                    Sensor,
                    GravityScale(0.0),
                    LinearVelocity(Vec2::ZERO),
                    inactive_shot_layers(),
                    // Keep this always; inactive shots won't collide anyway
                    // because filters are empty.
                    CollisionEventsEnabled,
                ),
            ))
            .id();

        pool.free.push(ShotEntity(e));
    }
}
