//! Generic timed state machines.
//!
//! One machine implementation serves the whole roster; the per-archetype
//! differences live in data (`table::BehaviorTable`). A machine is a ring of
//! phases: the active phase's timer counts down, and when it finishes the
//! machine advances, re-arms the *new* phase's timer (nominal duration plus
//! an additive `0..=jitter` sample), toggles the coupled invincibility flag,
//! and fires the new phase's entry actions.
//!
//! # Tick order, per entity
//! 1. Frozen category → skip everything. No decrement, no transition; the
//!    timer is bit-for-bit untouched.
//! 2. Unresolvable archetype → `warn!` and skip this entity for this frame
//!    only. One broken enemy never takes the global tick down.
//! 3. Entry condition unmet (`PlayerWithin` out of range) → hold in place,
//!    timer does not run.
//! 4. Decrement; transition when the timer finishes.
//!
//! Entry actions of the spawn-time phase do not fire — a table's first phase
//! is its resting pose, and rosters are authored that way.

pub mod table;

use bevy::prelude::*;
use rand::Rng;

use crate::common::state::GameState;
use crate::common::trajectory::{ballistic_launch, bezier_arc_through};
use crate::common::tunables::Tunables;
use crate::plugins::combat::{Defeated, Health};
use crate::plugins::core::{AnimationCue, SoundCue};
use crate::plugins::freeze::{FreezeGroup, FreezeSwitch, SimSet};
use crate::plugins::player::Player;
use crate::plugins::projectiles::components::ShotRole;
use crate::plugins::projectiles::messages::{MotionSpec, ShotFaction, SpawnShotRequest};

use table::{BehaviorRegistry, PhaseAction, PhaseCondition};

/// Which way the entity is pointing along x: `1.0` or `-1.0`.
#[derive(Component, Debug, Clone, Copy)]
pub struct Facing(pub f32);

/// The running machine. Exactly one phase is active at a time.
#[derive(Component, Debug)]
pub struct BehaviorMachine {
    pub archetype: String,
    pub phase: usize,
    pub timer: Timer,
}

impl BehaviorMachine {
    /// Start in phase 0 with its nominal duration. The caller has already
    /// validated the archetype against the registry.
    pub fn new(archetype: impl Into<String>, initial_duration: f32) -> Self {
        Self {
            archetype: archetype.into(),
            phase: 0,
            timer: Timer::from_seconds(initial_duration, TimerMode::Once),
        }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<BehaviorRegistry>();
    app.add_systems(
        FixedUpdate,
        tick_machines
            .in_set(SimSet::Act)
            .run_if(in_state(GameState::InGame)),
    );
}

/// Additive jitter against the nominal delay, never multiplicative.
fn rearm_duration(duration: f32, jitter: f32) -> f32 {
    if jitter > 0.0 {
        duration + rand::thread_rng().gen_range(0.0..=jitter)
    } else {
        duration
    }
}

pub fn tick_machines(
    time: Res<Time<Fixed>>,
    switch: Res<FreezeSwitch>,
    registry: Res<BehaviorRegistry>,
    tunables: Res<Tunables>,
    q_player: Query<&Transform, With<Player>>,
    mut q: Query<
        (
            Entity,
            &mut BehaviorMachine,
            &FreezeGroup,
            &Transform,
            Option<&mut Facing>,
            Option<&mut Health>,
        ),
        Without<Defeated>,
    >,
    mut spawns: MessageWriter<SpawnShotRequest>,
    mut anims: MessageWriter<AnimationCue>,
    mut sounds: MessageWriter<SoundCue>,
) {
    let player_pos = q_player.single().ok().map(|tf| tf.translation.truncate());

    for (entity, mut machine, group, tf, mut facing, mut health) in &mut q {
        if switch.is_frozen(group.0) {
            continue;
        }

        let Some(table) = registry.get(&machine.archetype) else {
            // Fatal for this entity's update, isolated from the global tick.
            warn!("entity {entity} references unknown archetype `{}`", machine.archetype);
            continue;
        };
        let phase = &table.phases[machine.phase];

        // Entry condition gates the countdown.
        if let PhaseCondition::PlayerWithin(range) = phase.condition {
            let in_range = player_pos
                .is_some_and(|p| p.distance(tf.translation.truncate()) <= range);
            if !in_range {
                continue;
            }
        }

        machine.timer.tick(time.delta());
        if !machine.timer.is_finished() {
            continue;
        }

        // Transition: advance the ring and re-arm the NEW phase's timer.
        machine.phase = (machine.phase + 1) % table.phases.len();
        let next = &table.phases[machine.phase];
        machine.timer = Timer::from_seconds(
            rearm_duration(next.duration, next.jitter),
            TimerMode::Once,
        );

        if let Some(health) = health.as_deref_mut() {
            health.invincible = next.invincible;
        }

        let origin = tf.translation.truncate();
        for action in &next.on_enter {
            perform_action(
                action,
                entity,
                origin,
                player_pos,
                facing.as_deref_mut(),
                &tunables,
                &mut spawns,
                &mut anims,
                &mut sounds,
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn perform_action(
    action: &PhaseAction,
    entity: Entity,
    origin: Vec2,
    player_pos: Option<Vec2>,
    facing: Option<&mut Facing>,
    tunables: &Tunables,
    spawns: &mut MessageWriter<SpawnShotRequest>,
    anims: &mut MessageWriter<AnimationCue>,
    sounds: &mut MessageWriter<SoundCue>,
) {
    match action {
        PhaseAction::FireAtPlayer { speed, damage } => {
            let Some(player) = player_pos else { return };
            let dir = (player - origin).normalize_or_zero();
            if dir == Vec2::ZERO {
                return;
            }
            spawns.write(SpawnShotRequest {
                faction: ShotFaction::Enemy,
                role: ShotRole::Bullet,
                pos: origin,
                motion: MotionSpec::Linear {
                    velocity: dir * *speed,
                },
                damage: *damage,
                lifetime: tunables.bullet_lifetime,
                owner: Some(entity),
            });
        }
        PhaseAction::FireFan {
            speed,
            damage,
            count,
            spread_degrees,
        } => {
            let Some(player) = player_pos else { return };
            let aim = (player - origin).normalize_or_zero();
            if aim == Vec2::ZERO {
                return;
            }
            let count = *count as i32;
            let spread = spread_degrees.to_radians();
            for i in 0..count {
                // Evenly distribute across the spread, centered on the aim.
                let t = if count > 1 {
                    i as f32 / (count - 1) as f32 - 0.5
                } else {
                    0.0
                };
                let dir = Vec2::from_angle(t * spread).rotate(aim);
                spawns.write(SpawnShotRequest {
                    faction: ShotFaction::Enemy,
                    role: ShotRole::Bullet,
                    pos: origin,
                    motion: MotionSpec::Linear {
                        velocity: dir * *speed,
                    },
                    damage: *damage,
                    lifetime: tunables.bullet_lifetime,
                    owner: Some(entity),
                });
            }
        }
        PhaseAction::LobBombAtPlayer {
            apex_height,
            damage,
        } => {
            let Some(player) = player_pos else { return };
            // Table validation guarantees apex_height > 0, the solver's
            // precondition.
            let launch = ballistic_launch(origin, player, *apex_height, -tunables.gravity);
            spawns.write(SpawnShotRequest {
                faction: ShotFaction::Enemy,
                role: ShotRole::Bomb,
                pos: origin,
                motion: MotionSpec::Arc {
                    velocity: launch.velocity,
                },
                damage: *damage,
                lifetime: f32::INFINITY,
                owner: Some(entity),
            });
        }
        PhaseAction::CurveAtPlayer {
            arc_height,
            flight_time,
            damage,
        } => {
            let Some(player) = player_pos else { return };
            let [_, p1, p2] = bezier_arc_through(origin, player, *arc_height);
            spawns.write(SpawnShotRequest {
                faction: ShotFaction::Enemy,
                role: ShotRole::Bullet,
                pos: origin,
                motion: MotionSpec::Bezier {
                    p1,
                    p2,
                    flight_time: *flight_time,
                },
                damage: *damage,
                lifetime: f32::INFINITY,
                owner: Some(entity),
            });
        }
        PhaseAction::TurnAround => {
            if let Some(facing) = facing {
                facing.0 = -facing.0;
            }
        }
        PhaseAction::PlayAnimation(clip) => {
            anims.write(AnimationCue {
                target: entity,
                clip: clip.clone(),
            });
        }
        PhaseAction::PlaySound(clip) => {
            sounds.write(SoundCue { clip: clip.clone() });
        }
    }
}
