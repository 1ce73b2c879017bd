//! Combat: health, damage resolution, and the defeat flow.
//!
//! # Data flow
//! Anything that hurts something writes a `DamageMessage`; `apply_damage` is
//! the **single writer** that mutates `Health`. Defeat detection runs behind
//! it in the same fixed tick, and structural removal is deferred to
//! `PostUpdate` (`PendingDespawn`), so no system observes a mid-tick despawn.
//!
//! ```text
//! FixedPostUpdate
//!   CombatSet::Collide   shot/contact systems write DamageMessage
//!   CombatSet::Damage    apply_damage: invincibility gate, clamp to [0, max]
//!   CombatSet::Defeat    resolve_defeats: score, explosion, mark removal
//! PostUpdate
//!   despawn_marked       structural cleanup
//! ```
//!
//! # Defeat ordering
//! `resolve_defeats` bumps the score accumulator in the same invocation that
//! marks the entity for removal, and removal only happens in `PostUpdate`.
//! An outside observer can see "alive + old score" or "removed + new score",
//! never "removed + stale score".

use avian2d::prelude::*;
use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::core::{update_messages, FxCue, Score, ScoreDelta};
use crate::plugins::freeze::{FreezeGroup, FreezeSwitch, SimSet};
use crate::plugins::projectiles::messages::SpawnShotRequest;

// -----------------------------------------------------------------------------
// Components
// -----------------------------------------------------------------------------

/// Hit points. Invariant: `0 <= current <= max`, enforced by clamping on
/// every application — there is no unclamped damage path.
#[derive(Component, Debug, Clone)]
pub struct Health {
    current: i32,
    max: i32,
    pub invincible: bool,
}

impl Health {
    pub fn new(max: i32) -> Self {
        debug_assert!(max > 0);
        Self {
            current: max,
            max,
            invincible: false,
        }
    }

    #[inline]
    pub fn current(&self) -> i32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> i32 {
        self.max
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Clamped damage application. `amount == 0` is a legal no-op; negative
    /// amounts are a caller bug, not a runtime-validated input.
    #[inline]
    pub fn apply(&mut self, amount: i32) {
        debug_assert!(amount >= 0, "negative damage is a caller bug");
        self.current = (self.current - amount).clamp(0, self.max);
    }

    #[inline]
    pub fn refill(&mut self) {
        self.current = self.max;
    }
}

/// Points awarded when this entity is defeated.
#[derive(Component, Debug, Clone, Copy)]
pub struct ScoreValue(pub u32);

/// Damage dealt to whatever this entity touches.
#[derive(Component, Debug, Clone, Copy)]
pub struct ContactDamage(pub i32);

/// Damage carried by the explosion this entity leaves behind on defeat.
/// Zero for entities whose death blast is cosmetic only.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ExplosionPayload(pub i32);

/// Grants a timed invincibility window after each successful hit.
#[derive(Component, Debug, Clone, Copy)]
pub struct MercyOnHit(pub f32);

/// Active post-hit invincibility window.
#[derive(Component, Debug)]
pub struct Invulnerability(pub Timer);

/// Defeat fired. Gates idempotence: a defeated entity takes no further
/// damage and cannot be defeated twice.
#[derive(Component, Debug, Clone, Copy)]
pub struct Defeated;

/// Marker: entity should be removed from the world.
///
/// We don't despawn inside the fixed step; we mark and despawn later in
/// `PostUpdate`. This keeps structural changes centralized and means no
/// entity mid-iteration ever observes a removal from the same tick.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn;

// -----------------------------------------------------------------------------
// Messages
// -----------------------------------------------------------------------------

#[derive(Message, Clone, Copy, Debug)]
pub struct DamageMessage {
    pub target: Entity,
    pub amount: i32,
    pub source: Option<Entity>,
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

/// Damage resolution ordering within `FixedPostUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CombatSet {
    Collide,
    Damage,
    Defeat,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<Messages<DamageMessage>>();
    app.add_systems(PostUpdate, update_messages::<DamageMessage>);

    app.configure_sets(
        FixedPostUpdate,
        (CombatSet::Collide, CombatSet::Damage, CombatSet::Defeat).chain(),
    );

    app.add_systems(
        FixedPostUpdate,
        apply_damage
            .in_set(CombatSet::Damage)
            .run_if(in_state(GameState::InGame)),
    );
    app.add_systems(
        FixedPostUpdate,
        resolve_defeats
            .in_set(CombatSet::Defeat)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedUpdate,
        tick_invulnerability
            .in_set(SimSet::Act)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(PostUpdate, despawn_marked);
}

// -----------------------------------------------------------------------------
// Systems
// -----------------------------------------------------------------------------

/// Single writer for `Health`.
///
/// A target that is already defeated or despawned no longer matches the
/// query, so late damage lands as a silent no-op.
pub fn apply_damage(
    mut commands: Commands,
    mut reader: MessageReader<DamageMessage>,
    mut q_health: Query<(&mut Health, Option<&MercyOnHit>), Without<Defeated>>,
    mut cues: MessageWriter<FxCue>,
) {
    for msg in reader.read() {
        debug_assert!(msg.amount >= 0, "negative damage is a caller bug");

        let Ok((mut health, mercy)) = q_health.get_mut(msg.target) else {
            continue;
        };

        if health.invincible {
            // Rejected outright: no state change, just the blocked cue.
            if msg.amount > 0 {
                cues.write(FxCue::DamageBlocked);
            }
            continue;
        }

        if msg.amount == 0 {
            continue;
        }

        health.apply(msg.amount);

        if let Some(MercyOnHit(window)) = mercy {
            health.invincible = true;
            commands
                .entity(msg.target)
                .insert(Invulnerability(Timer::from_seconds(*window, TimerMode::Once)));
            cues.write(FxCue::PlayerHit);
        }
    }
}

/// Fire the defeat transition for every entity whose health hit zero this
/// tick. Runs once per entity ever: the `Defeated` insert removes it from
/// this query before the next tick, no matter how many damage messages
/// crossed zero together.
pub fn resolve_defeats(
    mut commands: Commands,
    mut score: ResMut<Score>,
    mut deltas: MessageWriter<ScoreDelta>,
    mut cues: MessageWriter<FxCue>,
    mut spawns: MessageWriter<SpawnShotRequest>,
    mut q: Query<
        (
            Entity,
            &Health,
            &Transform,
            Option<&ScoreValue>,
            Option<&ExplosionPayload>,
            &mut CollisionLayers,
        ),
        Without<Defeated>,
    >,
) {
    for (entity, health, tf, points, payload, mut layers) in &mut q {
        if !health.is_depleted() {
            continue;
        }

        // Score first: an observer may see "alive + new score" but never
        // "removed + stale score".
        if let Some(ScoreValue(p)) = points {
            score.0 += u64::from(*p);
            deltas.write(ScoreDelta(*p));
        }

        let blast = payload.map_or(0, |p| p.0);
        spawns.write(SpawnShotRequest::explosion(
            tf.translation.truncate(),
            blast,
        ));
        cues.write(FxCue::Explosion);

        // Stop interacting immediately; membership stays so late queries can
        // still classify the corpse until PostUpdate removes it.
        layers.filters = LayerMask::NONE;

        commands.entity(entity).insert((Defeated, PendingDespawn));
    }
}

/// Count down post-hit mercy windows. Frozen entities keep their window
/// untouched.
pub fn tick_invulnerability(
    time: Res<Time<Fixed>>,
    switch: Res<FreezeSwitch>,
    mut commands: Commands,
    mut q: Query<(Entity, &FreezeGroup, &mut Invulnerability, &mut Health)>,
) {
    for (entity, group, mut window, mut health) in &mut q {
        if switch.is_frozen(group.0) {
            continue;
        }

        window.0.tick(time.delta());
        if window.0.is_finished() {
            health.invincible = false;
            commands.entity(entity).remove::<Invulnerability>();
        }
    }
}

/// Despawn entities marked for removal.
///
/// Centralizing despawn in one system keeps structural changes predictable.
pub fn despawn_marked(mut commands: Commands, q: Query<Entity, With<PendingDespawn>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}

#[cfg(test)]
mod tests;
