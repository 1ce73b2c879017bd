//! Enemies plugin: the roster, spawn-time validation, patrol movement, and
//! contact damage.
//!
//! There is no per-enemy state machine code here. Every archetype is a
//! `BehaviorTable` registered at startup; an enemy entity is just the data
//! hull (health, score, contact damage, collision layers) plus a
//! `BehaviorMachine` pointing at its table.
//!
//! Spawn-time validation is the configuration boundary: a roster entry whose
//! archetype is missing from the registry is logged and **excluded from the
//! simulation** — the rest of the level spawns normally. After that the tick
//! path can trust every live machine.
//!
//! Defeat is not handled here either: combat's defeat resolver owns score,
//! explosion, and removal for anything with `Health`.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::state::GameState;
use crate::plugins::behavior::table::{BehaviorRegistry, BehaviorTable, Phase, PhaseAction, PhaseCondition};
use crate::plugins::behavior::{BehaviorMachine, Facing};
use crate::plugins::combat::{
    ContactDamage, DamageMessage, Defeated, ExplosionPayload, Health, ScoreValue,
};
use crate::plugins::core::{ReadyFlow, RunScoped};
use crate::plugins::freeze::{FreezeCategory, FreezeGroup, FreezeSwitch, SimSet};
use crate::plugins::player::Player;

#[derive(Component)]
pub struct Enemy;

/// Horizontal patrol speed for walking archetypes.
#[derive(Component, Debug, Clone, Copy)]
pub struct PatrolSpeed(pub f32);

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, register_roster);
    app.add_systems(
        OnEnter(GameState::Ready),
        spawn_level_enemies.in_set(ReadyFlow::Spawn),
    );
    app.add_systems(
        FixedUpdate,
        patrol_movement
            .in_set(SimSet::Act)
            .run_if(in_state(GameState::InGame)),
    );
    app.add_systems(
        FixedPostUpdate,
        contact_damage
            .in_set(crate::plugins::combat::CombatSet::Collide)
            .run_if(in_state(GameState::InGame)),
    );
}

// -----------------------------------------------------------------------------
// Roster
// -----------------------------------------------------------------------------

fn phase(name: &str, duration: f32) -> Phase {
    Phase {
        name: name.into(),
        duration,
        jitter: 0.0,
        invincible: false,
        condition: PhaseCondition::Always,
        on_enter: Vec::new(),
    }
}

/// The built-in archetypes. These are plain data; a themed level could load
/// replacements from RON instead.
fn register_roster(mut registry: ResMut<BehaviorRegistry>) {
    let tables = [
        // Paces a platform, reversing on a jittered cadence.
        BehaviorTable {
            archetype: "walker".into(),
            phases: vec![
                phase("stride", 2.0),
                Phase {
                    jitter: 0.3,
                    on_enter: vec![PhaseAction::TurnAround],
                    ..phase("turn", 0.2)
                },
            ],
        },
        // Shell stays sealed (and invincible) until the player comes close,
        // then opens and fans three shots.
        BehaviorTable {
            archetype: "turret".into(),
            phases: vec![
                Phase {
                    invincible: true,
                    condition: PhaseCondition::PlayerWithin(220.0),
                    on_enter: vec![PhaseAction::PlayAnimation("shell_close".into())],
                    ..phase("closed", 1.5)
                },
                Phase {
                    on_enter: vec![
                        PhaseAction::PlayAnimation("shell_open".into()),
                        PhaseAction::FireFan {
                            speed: 240.0,
                            damage: 3,
                            count: 3,
                            spread_degrees: 40.0,
                        },
                    ],
                    ..phase("open", 1.0)
                },
            ],
        },
        // Lobs ballistic bombs while the player is in range.
        BehaviorTable {
            archetype: "lobber".into(),
            phases: vec![
                Phase {
                    jitter: 0.4,
                    condition: PhaseCondition::PlayerWithin(320.0),
                    ..phase("aim", 1.8)
                },
                Phase {
                    on_enter: vec![
                        PhaseAction::LobBombAtPlayer {
                            apex_height: 120.0,
                            damage: 4,
                        },
                        PhaseAction::PlaySound("lob".into()),
                    ],
                    ..phase("lob", 0.6)
                },
            ],
        },
        // Sends a curved sweep shot on a slow cadence.
        BehaviorTable {
            archetype: "sweeper".into(),
            phases: vec![
                Phase {
                    jitter: 0.5,
                    condition: PhaseCondition::PlayerWithin(360.0),
                    ..phase("drift", 2.2)
                },
                Phase {
                    on_enter: vec![PhaseAction::CurveAtPlayer {
                        arc_height: 80.0,
                        flight_time: 1.2,
                        damage: 2,
                    }],
                    ..phase("sweep", 0.4)
                },
            ],
        },
    ];

    for table in tables {
        if let Err(err) = registry.register(table) {
            error!("built-in archetype rejected: {err}");
        }
    }
}

// -----------------------------------------------------------------------------
// Spawn
// -----------------------------------------------------------------------------

struct RosterEntry {
    name: &'static str,
    archetype: &'static str,
    pos: Vec2,
    health: i32,
    contact: i32,
    score: u32,
    blast: i32,
    patrol: Option<f32>,
}

const LEVEL_ROSTER: [RosterEntry; 5] = [
    RosterEntry {
        name: "Walker-A",
        archetype: "walker",
        pos: Vec2::new(260.0, -64.0),
        health: 3,
        contact: 4,
        score: 500,
        blast: 0,
        patrol: Some(60.0),
    },
    RosterEntry {
        name: "Walker-B",
        archetype: "walker",
        pos: Vec2::new(700.0, -64.0),
        health: 3,
        contact: 4,
        score: 500,
        blast: 0,
        patrol: Some(60.0),
    },
    RosterEntry {
        name: "Turret-A",
        archetype: "turret",
        pos: Vec2::new(480.0, -80.0),
        health: 5,
        contact: 3,
        score: 800,
        blast: 0,
        patrol: None,
    },
    RosterEntry {
        name: "Lobber-A",
        archetype: "lobber",
        pos: Vec2::new(920.0, -80.0),
        health: 4,
        contact: 3,
        score: 1000,
        blast: 2,
        patrol: None,
    },
    RosterEntry {
        name: "Sweeper-A",
        archetype: "sweeper",
        pos: Vec2::new(1180.0, 20.0),
        health: 2,
        contact: 2,
        score: 600,
        blast: 0,
        patrol: None,
    },
];

/// Spawn the level roster. Validation boundary: entries referencing an
/// unregistered archetype are logged and skipped.
pub fn spawn_level_enemies(mut commands: Commands, registry: Res<BehaviorRegistry>) {
    for entry in &LEVEL_ROSTER {
        let Some(table) = registry.get(entry.archetype) else {
            warn!(
                "roster entry `{}` excluded: archetype `{}` is not registered",
                entry.name, entry.archetype
            );
            continue;
        };

        // Spawn into the table's first phase: arm its timer and apply its
        // invincibility coupling up front.
        let opening = &table.phases[0];
        let mut health = Health::new(entry.health);
        health.invincible = opening.invincible;

        let enemy_layers =
            CollisionLayers::new(Layer::Enemy, [Layer::World, Layer::Player, Layer::PlayerShot]);

        let mut spawned = commands.spawn((
            Name::new(entry.name),
            Enemy,
            BehaviorMachine::new(entry.archetype, opening.duration),
            Facing(-1.0),
            health,
            ScoreValue(entry.score),
            ContactDamage(entry.contact),
            ExplosionPayload(entry.blast),
            FreezeGroup(FreezeCategory::Enemies),
            RunScoped,
            (
                Sprite {
                    color: Color::srgb(0.9, 0.25, 0.25),
                    custom_size: Some(Vec2::splat(28.0)),
                    ..default()
                },
                Transform::from_translation(entry.pos.extend(1.0)),
            ),
            Collider::rectangle(26.0, 26.0),
            enemy_layers,
            CollisionEventsEnabled,
        ));

        match entry.patrol {
            Some(speed) => {
                spawned.insert((
                    RigidBody::Dynamic,
                    LockedAxes::ROTATION_LOCKED,
                    GravityScale(1.0),
                    LinearVelocity(Vec2::ZERO),
                    PatrolSpeed(speed),
                ));
            }
            None => {
                spawned.insert(RigidBody::Static);
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Rules
// -----------------------------------------------------------------------------

/// Walking archetypes move along their facing; gravity handles the rest.
pub fn patrol_movement(
    switch: Res<FreezeSwitch>,
    mut q: Query<
        (&Facing, &PatrolSpeed, &mut LinearVelocity),
        (With<Enemy>, Without<Defeated>),
    >,
) {
    if switch.is_frozen(FreezeCategory::Enemies) {
        return;
    }
    for (facing, speed, mut vel) in &mut q {
        vel.0.x = facing.0 * speed.0;
    }
}

/// Touching an enemy hurts. Only enemy → player; the player's body never
/// damages enemies by contact.
pub fn contact_damage(
    mut started: MessageReader<CollisionStart>,
    q_enemy: Query<&ContactDamage, (With<Enemy>, Without<Defeated>)>,
    q_player: Query<(), With<Player>>,
    mut damage: MessageWriter<DamageMessage>,
) {
    for ev in started.read() {
        for (enemy, other) in [(ev.collider1, ev.collider2), (ev.collider2, ev.collider1)] {
            let Ok(contact) = q_enemy.get(enemy) else {
                continue;
            };
            if !q_player.contains(other) {
                continue;
            }
            damage.write(DamageMessage {
                target: other,
                amount: contact.0,
                source: Some(enemy),
            });
        }
    }
}
