//! Camera plugin (render-only).
//!
//! Follows the player with exponential smoothing, then clamps to the active
//! checkpoint's camera bounds — the bounds travel with the respawn record, so
//! a restart restores both position and framing together.

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::checkpoint::CheckpointRegistry;
use crate::plugins::player::Player;

#[derive(Component)]
pub struct MainCamera {
    pub responsiveness: f32,
}

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_camera).add_systems(
        PostUpdate,
        follow_player
            .before(TransformSystems::Propagate)
            .run_if(in_state(GameState::InGame).or(in_state(GameState::Ready))),
    );
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera {
            responsiveness: 5.0,
        },
        Transform::from_xyz(0.0, 0.0, 999.0),
    ));
}

fn follow_player(
    time: Res<Time>,
    checkpoints: Res<CheckpointRegistry>,
    // Disjointness proof: Player entities are not MainCamera entities.
    q_player: Query<&Transform, (With<Player>, Without<MainCamera>)>,
    mut q_cam: Query<(&mut Transform, &MainCamera), Without<Player>>,
) {
    let Ok(tf_player) = q_player.single() else {
        return;
    };
    let Ok((mut tf_cam, main_cam)) = q_cam.single_mut() else {
        return;
    };

    let dt = time.delta_secs();
    let alpha = 1.0 - (-main_cam.responsiveness * dt).exp();

    let bounds = checkpoints.active().camera_bounds;
    let target = Vec2::new(
        tf_player.translation.x.clamp(bounds.min.x, bounds.max.x),
        tf_player.translation.y.clamp(bounds.min.y, bounds.max.y),
    );

    tf_cam.translation.x += (target.x - tf_cam.translation.x) * alpha;
    tf_cam.translation.y += (target.y - tf_cam.translation.y) * alpha;
}
