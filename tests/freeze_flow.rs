mod common;

use bevy::prelude::*;
use buster_game::common::state::GameState;
use buster_game::plugins::freeze::{FreezeCategory, FreezeSwitch};
use buster_game::plugins::projectiles::components::ShotState;

const ALL: [FreezeCategory; 3] = [
    FreezeCategory::Player,
    FreezeCategory::Enemies,
    FreezeCategory::Shots,
];

#[test]
fn ready_screen_holds_the_simulation_frozen() {
    let mut app = common::app_headless();
    app.update(); // Ready entered, freeze requested

    // The switch flips on the next fixed tick.
    common::run_fixed_frames(&mut app, 50);

    let switch = app.world().resource::<FreezeSwitch>();
    for category in ALL {
        assert!(switch.is_frozen(category), "{category:?} should be frozen");
    }
}

#[test]
fn play_thaws_and_game_over_refreezes_with_no_live_shots() {
    let mut app = common::app_headless();
    app.update();

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::InGame);
    app.update();
    common::run_fixed_frames(&mut app, 50);

    {
        let switch = app.world().resource::<FreezeSwitch>();
        for category in ALL {
            assert!(!switch.is_frozen(category), "{category:?} should be thawed");
        }
    }

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::GameOver);
    app.update(); // transition clears live shots immediately
    common::run_fixed_frames(&mut app, 50);

    let switch = app.world().resource::<FreezeSwitch>();
    for category in ALL {
        assert!(switch.is_frozen(category), "{category:?} should be frozen");
    }

    let live = app
        .world_mut()
        .query::<&ShotState>()
        .iter(app.world())
        .filter(|state| **state == ShotState::Active)
        .count();
    assert_eq!(live, 0);
}
