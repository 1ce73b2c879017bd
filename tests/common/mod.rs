//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides the core ECS runtime.
//! - we then call `buster_game::game::configure_headless` to install the
//!   gameplay plugins.

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;

pub fn app_headless() -> App {
    let mut app = App::new();

    // Core ECS + states.
    // Add AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));

    buster_game::game::configure_headless(&mut app);
    app
}

/// Advance virtual time far enough for at least a few fixed ticks, then run
/// one frame.
#[allow(dead_code)]
pub fn run_fixed_frames(app: &mut App, millis: u64) {
    app.world_mut()
        .resource_mut::<Time<Virtual>>()
        .advance_by(std::time::Duration::from_millis(millis));
    app.update();
}
