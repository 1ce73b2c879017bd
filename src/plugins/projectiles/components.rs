use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;

/// Marker: this entity belongs to the shot pool.
#[derive(Component)]
pub struct PooledShot;

/// Newtype for entities known to carry the full pooled-shot component set.
#[derive(Clone, Copy, Debug)]
pub struct ShotEntity(pub Entity);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShotState {
    #[default]
    Inactive,
    Active,
    PendingReturn,
}

/// What a live shot does when it connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotRole {
    /// One-shot damage carrier: delivers once, retires on first qualifying hit.
    Bullet,
    /// Lobbed shot that detonates into an explosion on any impact.
    Bomb,
    /// Stationary area effect: damages everything overlapping, every fixed
    /// tick, for as long as the overlap persists.
    Explosion,
}

#[derive(Component, Debug, Clone)]
pub struct Shot {
    pub damage: i32,
    pub role: ShotRole,
}

/// Motion model. `Linear` and `Arc` set velocity once at launch and let the
/// physics collaborator integrate; `Bezier` steers velocity every fixed tick
/// so the body tracks the curve without teleporting through colliders.
#[derive(Component, Debug, Clone, Default)]
pub enum ShotMotion {
    #[default]
    Linear,
    Arc,
    Bezier {
        p0: Vec2,
        p1: Vec2,
        p2: Vec2,
        flight_time: f32,
        elapsed: f32,
    },
}

/// Remaining flight time in seconds. `f32::INFINITY` is the sentinel for
/// shots retired only by impact or global clear.
#[derive(Component, Debug, Clone, Copy)]
pub struct Lifetime(pub f32);

impl Lifetime {
    pub const INFINITE: Self = Self(f32::INFINITY);
}

/// Damageable entities currently overlapping this area shot.
///
/// Maintained from collision start/end messages so the per-tick area damage
/// pass is a straight walk over a short list.
#[derive(Component, Debug, Default)]
pub struct Overlapping(pub Vec<Entity>);

/// Layers for a shot that should interact with nothing.
///
/// Empty filters mean an inactive pooled shot generates no collision events.
#[inline]
pub fn inactive_shot_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Default, [] as [Layer; 0])
}
