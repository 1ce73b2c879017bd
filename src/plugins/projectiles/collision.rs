use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::plugins::combat::DamageMessage;
use crate::plugins::freeze::{FreezeCategory, FreezeSwitch};

use super::components::{Overlapping, PooledShot, Shot, ShotRole, ShotState};
use super::messages::SpawnShotRequest;

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn targets_of(
    collider1: Entity,
    collider2: Entity,
    body1: Option<Entity>,
    body2: Option<Entity>,
) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget {
            collider: collider1,
            body: body1,
        },
        CollisionTarget {
            collider: collider2,
            body: body2,
        },
    )
}

#[inline]
fn is_in_layer(layers: &CollisionLayers, layer: Layer) -> bool {
    layers.memberships.has_all(layer)
}

#[inline]
fn is_damageable(layers: &CollisionLayers) -> bool {
    is_in_layer(layers, Layer::Player) || is_in_layer(layers, Layer::Enemy)
}

/// One-shot impact resolution for bullets and bombs.
///
/// Delivery is exactly once per shot: the `seen` set dedupes multiple
/// contacts reported in the same tick, and flipping to `PendingReturn`
/// removes the shot from every later event this tick. Explosions are ignored
/// here — their continuous-overlap semantics live in `area_damage`.
pub fn process_shot_impacts(
    mut started: MessageReader<CollisionStart>,
    q_is_shot: Query<(), With<PooledShot>>,
    mut q_shots: Query<(&Shot, &mut ShotState, &Transform), With<PooledShot>>,
    q_layers: Query<&CollisionLayers>,
    mut damage: MessageWriter<DamageMessage>,
    mut spawns: MessageWriter<SpawnShotRequest>,
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();

    for ev in started.read() {
        let (t1, t2) = targets_of(ev.collider1, ev.collider2, ev.body1, ev.body2);

        // Identify the shot side without get_mut probing.
        let s1 = q_is_shot.contains(t1.collider);
        let s2 = q_is_shot.contains(t2.collider);
        if !(s1 ^ s2) {
            continue; // must be exactly one shot
        }
        let (shot_side, other_side) = if s1 { (t1, t2) } else { (t2, t1) };

        // Deduplicate per shot collider.
        if !seen.insert(shot_side.collider) {
            continue;
        }

        let Ok(other_layers) = q_layers.get(other_side.collider) else {
            continue;
        };

        let Ok((shot, mut state, tf)) = q_shots.get_mut(shot_side.collider) else {
            continue;
        };

        if *state != ShotState::Active || shot.role == ShotRole::Explosion {
            continue;
        }

        // WORLD: bullets are absorbed, bombs detonate.
        if is_in_layer(other_layers, Layer::World) {
            if shot.role == ShotRole::Bomb {
                spawns.write(SpawnShotRequest::explosion(
                    tf.translation.truncate(),
                    shot.damage,
                ));
            }
            *state = ShotState::PendingReturn;
            continue;
        }

        // DAMAGEABLE: deliver once, then retire (bombs also detonate).
        if is_damageable(other_layers) {
            damage.write(DamageMessage {
                target: other_side.gameplay_owner(),
                amount: shot.damage,
                source: Some(shot_side.collider),
            });
            if shot.role == ShotRole::Bomb {
                spawns.write(SpawnShotRequest::explosion(
                    tf.translation.truncate(),
                    shot.damage,
                ));
            }
            *state = ShotState::PendingReturn;
        }
    }
}

/// Maintain each explosion's set of overlapped damageable owners from the
/// physics start/end messages.
pub fn track_area_overlaps(
    mut started: MessageReader<CollisionStart>,
    mut ended: MessageReader<CollisionEnd>,
    mut q_areas: Query<(&Shot, &mut Overlapping), With<PooledShot>>,
    q_layers: Query<&CollisionLayers>,
) {
    for ev in started.read() {
        let (t1, t2) = targets_of(ev.collider1, ev.collider2, ev.body1, ev.body2);
        for (area, other) in [(t1, t2), (t2, t1)] {
            let Ok((shot, mut overlapping)) = q_areas.get_mut(area.collider) else {
                continue;
            };
            if shot.role != ShotRole::Explosion {
                continue;
            }
            let Ok(layers) = q_layers.get(other.collider) else {
                continue;
            };
            if !is_damageable(layers) {
                continue;
            }
            let owner = other.gameplay_owner();
            if !overlapping.0.contains(&owner) {
                overlapping.0.push(owner);
            }
        }
    }

    for ev in ended.read() {
        let (t1, t2) = targets_of(ev.collider1, ev.collider2, ev.body1, ev.body2);
        for (area, other) in [(t1, t2), (t2, t1)] {
            let Ok((shot, mut overlapping)) = q_areas.get_mut(area.collider) else {
                continue;
            };
            if shot.role != ShotRole::Explosion {
                continue;
            }
            let owner = other.gameplay_owner();
            overlapping.0.retain(|e| *e != owner);
        }
    }
}

/// Area-effect delivery: an active explosion re-damages everything it
/// overlaps, every fixed tick, until it expires. A zero payload is the
/// cosmetic defeat blast — deliberately harmless.
pub fn area_damage(
    switch: Res<FreezeSwitch>,
    q_areas: Query<(Entity, &Shot, &ShotState, &Overlapping), With<PooledShot>>,
    mut damage: MessageWriter<DamageMessage>,
) {
    if switch.is_frozen(FreezeCategory::Shots) {
        return;
    }

    for (e, shot, state, overlapping) in &q_areas {
        if *state != ShotState::Active || shot.role != ShotRole::Explosion {
            continue;
        }
        if shot.damage == 0 {
            continue;
        }
        for &target in &overlapping.0 {
            damage.write(DamageMessage {
                target,
                amount: shot.damage,
                source: Some(e),
            });
        }
    }
}
