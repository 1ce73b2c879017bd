//! Checkpoints: respawn position + camera bounds, restored verbatim.
//!
//! The registry is the only state that survives a failed attempt. Records are
//! opaque to the rest of the simulation: a name, a player position, a camera
//! rect, and a `reached` flag. Trigger sensors flip the flag; the ready
//! screen rebuild reads the latest reached record back and nothing else.
//!
//! A registry with no reached record is corrupt state — construction always
//! marks the start record reached, so `active()` treats the empty case as a
//! fatal host-level error rather than limping along inconsistently.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::state::GameState;
use crate::plugins::combat::CombatSet;
use crate::plugins::core::{FxCue, ReadyFlow, RunScoped};
use crate::plugins::player::Player;

#[derive(Debug, Clone)]
pub struct CheckpointRecord {
    pub name: String,
    pub player_position: Vec2,
    pub camera_bounds: Rect,
    pub reached: bool,
}

#[derive(Resource, Debug)]
pub struct CheckpointRegistry {
    records: Vec<CheckpointRecord>,
}

impl Default for CheckpointRegistry {
    fn default() -> Self {
        Self {
            records: vec![
                CheckpointRecord {
                    name: "start".into(),
                    player_position: Vec2::new(40.0, -40.0),
                    camera_bounds: Rect::new(-100.0, -160.0, 800.0, 300.0),
                    reached: true,
                },
                CheckpointRecord {
                    name: "midway".into(),
                    player_position: Vec2::new(640.0, -40.0),
                    camera_bounds: Rect::new(400.0, -160.0, 1400.0, 300.0),
                    reached: false,
                },
            ],
        }
    }
}

impl CheckpointRegistry {
    /// The record a respawn restores: the furthest reached checkpoint.
    pub fn active(&self) -> &CheckpointRecord {
        self.records
            .iter()
            .rev()
            .find(|r| r.reached)
            .expect("checkpoint registry must always contain a reached record")
    }

    /// Returns true when this call newly reached the checkpoint.
    pub fn mark_reached(&mut self, name: &str) -> bool {
        for record in &mut self.records {
            if record.name == name && !record.reached {
                record.reached = true;
                return true;
            }
        }
        false
    }

    pub fn records(&self) -> &[CheckpointRecord] {
        &self.records
    }
}

/// Trigger sensor placed in the level.
#[derive(Component, Debug, Clone)]
pub struct Checkpoint {
    pub name: String,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<CheckpointRegistry>();
    app.add_systems(
        OnEnter(GameState::Ready),
        spawn_triggers.in_set(ReadyFlow::Spawn),
    );
    app.add_systems(
        FixedPostUpdate,
        checkpoint_triggers
            .in_set(CombatSet::Collide)
            .run_if(in_state(GameState::InGame)),
    );
}

/// One sensor per not-yet-reached record. Reached checkpoints don't need a
/// trigger again.
fn spawn_triggers(mut commands: Commands, registry: Res<CheckpointRegistry>) {
    for record in registry.records() {
        if record.reached {
            continue;
        }
        commands.spawn((
            Name::new(format!("Checkpoint({})", record.name)),
            Checkpoint {
                name: record.name.clone(),
            },
            RunScoped,
            Transform::from_translation(record.player_position.extend(0.0)),
            Collider::rectangle(24.0, 96.0),
            Sensor,
            RigidBody::Static,
            CollisionLayers::new(Layer::Checkpoint, [Layer::Player]),
            CollisionEventsEnabled,
        ));
    }
}

pub fn checkpoint_triggers(
    mut started: MessageReader<CollisionStart>,
    q_triggers: Query<&Checkpoint>,
    q_player: Query<(), With<Player>>,
    mut registry: ResMut<CheckpointRegistry>,
    mut cues: MessageWriter<FxCue>,
) {
    for ev in started.read() {
        for (trigger, other) in [(ev.collider1, ev.collider2), (ev.collider2, ev.collider1)] {
            let Ok(checkpoint) = q_triggers.get(trigger) else {
                continue;
            };
            if !q_player.contains(other) {
                continue;
            }
            if registry.mark_reached(&checkpoint.name) {
                info!("checkpoint `{}` reached", checkpoint.name);
                cues.write(FxCue::CheckpointReached);
            }
        }
    }
}
