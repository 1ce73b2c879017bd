mod common;

use bevy::prelude::*;
use buster_game::common::state::GameState;
use buster_game::plugins::combat::DamageMessage;
use buster_game::plugins::core::Score;
use buster_game::plugins::projectiles::components::{Shot, ShotRole, ShotState};

/// End-to-end: lethal damage -> defeat -> score -> removal -> death blast.
#[test]
fn defeat_awards_score_and_removes_the_enemy() {
    let mut app = common::app_headless();
    app.update(); // Ready: level built

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::InGame);
    app.update();

    let walker = app
        .world_mut()
        .query::<(Entity, &Name)>()
        .iter(app.world())
        .find(|(_, n)| n.as_str() == "Walker-A")
        .map(|(e, _)| e)
        .expect("Walker-A spawned");

    // Walker-A has 3 health and is worth 500 points.
    app.world_mut().write_message(DamageMessage {
        target: walker,
        amount: 3,
        source: None,
    });

    common::run_fixed_frames(&mut app, 50);

    assert!(
        app.world().get_entity(walker).is_err(),
        "defeated walker should be absent from the active set"
    );
    assert_eq!(app.world().resource::<Score>().0, 500);

    // The defeat left its (harmless) blast behind.
    let blasts = app
        .world_mut()
        .query::<(&Shot, &ShotState)>()
        .iter(app.world())
        .filter(|(shot, state)| **state == ShotState::Active && shot.role == ShotRole::Explosion)
        .count();
    assert_eq!(blasts, 1);
}

/// Overkill in a single tick still produces exactly one defeat.
#[test]
fn overkill_scores_once() {
    let mut app = common::app_headless();
    app.update();

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::InGame);
    app.update();

    let walker = app
        .world_mut()
        .query::<(Entity, &Name)>()
        .iter(app.world())
        .find(|(_, n)| n.as_str() == "Walker-B")
        .map(|(e, _)| e)
        .expect("Walker-B spawned");

    for _ in 0..4 {
        app.world_mut().write_message(DamageMessage {
            target: walker,
            amount: 99,
            source: None,
        });
    }

    common::run_fixed_frames(&mut app, 50);

    assert_eq!(app.world().resource::<Score>().0, 500);
}
