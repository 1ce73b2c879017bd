//! Tunable gameplay constants.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    /// Downward gravity magnitude, world units / s².
    pub gravity: f32,
    pub player_speed: f32,
    pub player_jump_speed: f32,
    pub player_max_health: i32,
    /// Mercy window after the player is hit, seconds.
    pub player_mercy_window: f32,
    pub bullet_speed: f32,
    pub bullet_lifetime: f32,
    /// Seconds the ready screen holds before play starts.
    pub ready_delay: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,
            gravity: 980.0,
            player_speed: 220.0,
            player_jump_speed: 560.0,
            player_max_health: 28,
            player_mercy_window: 1.2,
            bullet_speed: 600.0,
            bullet_lifetime: 2.0,
            ready_delay: 2.0,
        }
    }
}
