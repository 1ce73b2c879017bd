//! Freeze coordinator: process-wide pause semantics per entity category.
//!
//! # Contract
//! - `SetFrozenRequest { category, frozen }` messages are the only way to
//!   change the switch. Applying is **idempotent**: freezing an already-frozen
//!   category is a no-op and cannot double-capture snapshots.
//! - Freezing captures each mover's velocity and gravity scale into one
//!   `FrozenMotion` component — a single atomic snapshot per entity, so
//!   restoration can never be partial (restoring velocity but not gravity).
//! - Unfreezing restores the snapshot **verbatim**. It is never recomputed
//!   from direction/speed, which guards against state mutated mid-freeze.
//! - Unfreeze without a prior snapshot is a no-op, never a crash.
//!
//! # Ordering
//! `apply_freeze_requests` runs in `SimSet::Coordinate`, the first set of the
//! fixed tick. Every simulation system that decrements timers or moves
//! entities runs in `SimSet::Act` behind it and checks the switch at the top
//! of its loop. A frozen entity's timers are therefore bit-for-bit unchanged
//! across any number of frozen ticks.

use avian2d::prelude::*;
use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::core::update_messages;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FreezeCategory {
    Player,
    Enemies,
    Shots,
}

const ALL_CATEGORIES: [FreezeCategory; 3] = [
    FreezeCategory::Player,
    FreezeCategory::Enemies,
    FreezeCategory::Shots,
];

/// Which freeze switch governs this entity. Attached at spawn.
#[derive(Component, Clone, Copy, Debug)]
pub struct FreezeGroup(pub FreezeCategory);

/// Process-wide freeze flags, one per category. Never partially applied.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct FreezeSwitch {
    player: bool,
    enemies: bool,
    shots: bool,
}

impl FreezeSwitch {
    #[inline]
    pub fn is_frozen(&self, category: FreezeCategory) -> bool {
        match category {
            FreezeCategory::Player => self.player,
            FreezeCategory::Enemies => self.enemies,
            FreezeCategory::Shots => self.shots,
        }
    }

    #[inline]
    pub(crate) fn set(&mut self, category: FreezeCategory, frozen: bool) {
        match category {
            FreezeCategory::Player => self.player = frozen,
            FreezeCategory::Enemies => self.enemies = frozen,
            FreezeCategory::Shots => self.shots = frozen,
        }
    }
}

#[derive(Message, Clone, Copy, Debug)]
pub struct SetFrozenRequest {
    pub category: FreezeCategory,
    pub frozen: bool,
}

/// Atomic motion snapshot captured on freeze, restored verbatim on unfreeze.
#[derive(Component, Clone, Copy, Debug)]
pub struct FrozenMotion {
    velocity: Vec2,
    gravity_scale: f32,
}

/// Fixed-tick ordering: coordinate (freeze) before anything acts.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimSet {
    Coordinate,
    Act,
}

pub fn plugin(app: &mut App) {
    app.insert_resource(FreezeSwitch::default());
    app.init_resource::<Messages<SetFrozenRequest>>();
    app.add_systems(PostUpdate, update_messages::<SetFrozenRequest>);

    app.configure_sets(FixedUpdate, (SimSet::Coordinate, SimSet::Act).chain());
    app.add_systems(
        FixedUpdate,
        apply_freeze_requests.in_set(SimSet::Coordinate),
    );

    // Ready screen and game-over both hold the whole simulation; play thaws it.
    app.add_systems(OnEnter(GameState::Ready), request_freeze_all);
    app.add_systems(OnEnter(GameState::GameOver), request_freeze_all);
    app.add_systems(OnEnter(GameState::InGame), request_unfreeze_all);
}

fn request_freeze_all(mut writer: MessageWriter<SetFrozenRequest>) {
    for category in ALL_CATEGORIES {
        writer.write(SetFrozenRequest { category, frozen: true });
    }
}

fn request_unfreeze_all(mut writer: MessageWriter<SetFrozenRequest>) {
    for category in ALL_CATEGORIES {
        writer.write(SetFrozenRequest { category, frozen: false });
    }
}

/// Single writer for `FreezeSwitch` and the per-entity snapshots.
pub fn apply_freeze_requests(
    mut commands: Commands,
    mut switch: ResMut<FreezeSwitch>,
    mut reader: MessageReader<SetFrozenRequest>,
    mut q_movers: Query<(
        Entity,
        &FreezeGroup,
        &mut LinearVelocity,
        &mut GravityScale,
        Option<&FrozenMotion>,
    )>,
) {
    for req in reader.read() {
        // Idempotence: repeated freeze (or unfreeze) of a category is a no-op.
        if switch.is_frozen(req.category) == req.frozen {
            continue;
        }
        switch.set(req.category, req.frozen);

        for (entity, group, mut vel, mut gravity, snapshot) in &mut q_movers {
            if group.0 != req.category {
                continue;
            }

            if req.frozen {
                if snapshot.is_some() {
                    continue;
                }
                commands.entity(entity).insert(FrozenMotion {
                    velocity: vel.0,
                    gravity_scale: gravity.0,
                });
                vel.0 = Vec2::ZERO;
                gravity.0 = 0.0;
            } else if let Some(snap) = snapshot {
                vel.0 = snap.velocity;
                gravity.0 = snap.gravity_scale;
                commands.entity(entity).remove::<FrozenMotion>();
            }
            // Unfreeze without a snapshot: nothing to restore.
        }
    }
}
