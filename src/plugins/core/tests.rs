use bevy::prelude::*;

use crate::common::test_utils::run_system_once;
use crate::common::tunables::Tunables;
use crate::plugins::core::{self, Score};

#[test]
fn inserts_resources() {
    let mut app = App::new();
    app.add_plugins(bevy::state::app::StatesPlugin);
    app.init_state::<crate::common::state::GameState>();
    core::plugin(&mut app);
    assert!(app.world().get_resource::<Tunables>().is_some());
    assert!(app.world().get_resource::<ClearColor>().is_some());
    assert!(app.world().get_resource::<Score>().is_some());
}

#[test]
fn score_resets_on_fresh_run() {
    let mut world = World::new();
    world.insert_resource(Score(4200));

    run_system_once(&mut world, super::reset_score);

    assert_eq!(world.resource::<Score>().0, 0);
}
