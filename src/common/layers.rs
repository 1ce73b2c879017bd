//! Collision layers.
//!
//! These double as the spawn-time "collision tag" filters on shots: a shot's
//! filter set decides which layers it can damage.

use avian2d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    World,
    Player,
    Enemy,
    PlayerShot,
    EnemyShot,
    Checkpoint,
}
