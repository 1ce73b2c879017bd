//! Player plugin.
//!
//! Pipeline:
//! - Update: sample input, write the `PlayerInput` resource
//! - FixedUpdate (`SimSet::Act`): apply run/jump velocity to the dynamic body
//! - FixedPostUpdate (after defeat resolution): a defeated player ends the run
//!
//! Grounding uses a downward ray attached to the body (the spatial query
//! collaborator): jump is only honored while the ray reports a world hit.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::{layers::Layer, state::GameState, tunables::Tunables};
use crate::plugins::behavior::Facing;
use crate::plugins::checkpoint::CheckpointRegistry;
use crate::plugins::combat::{CombatSet, Defeated, ExplosionPayload, Health, MercyOnHit};
use crate::plugins::core::{ReadyFlow, RunScoped};
use crate::plugins::freeze::{FreezeCategory, FreezeGroup, FreezeSwitch, SimSet};
use crate::plugins::projectiles::components::ShotRole;
use crate::plugins::projectiles::messages::{MotionSpec, ShotFaction, SpawnShotRequest};

#[derive(Component)]
pub struct Player;

/// Muzzle offset from the body center, along the facing.
const MUZZLE_REACH: f32 = 18.0;

#[derive(Resource, Default, Debug)]
pub struct PlayerInput {
    move_axis: f32,
    /// Set on press, consumed by the next fixed tick that can honor it.
    jump_buffered: bool,
    fire_pressed: bool,
}

pub fn plugin(app: &mut App) {
    app.insert_resource(PlayerInput::default())
        .add_systems(
            OnEnter(GameState::Ready),
            spawn.in_set(ReadyFlow::Spawn),
        )
        .add_systems(Update, gather_input)
        .add_systems(
            Update,
            request_player_shots
                .after(gather_input)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedUpdate,
            apply_movement
                .in_set(SimSet::Act)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            defeat_ends_run
                .after(CombatSet::Defeat)
                .run_if(in_state(GameState::InGame)),
        );
}

/// Spawn at the latest reached checkpoint, restored verbatim.
fn spawn(mut commands: Commands, tunables: Res<Tunables>, checkpoints: Res<CheckpointRegistry>) {
    let spawn_pos = checkpoints.active().player_position;

    commands.spawn((
        Name::new("Player"),
        Player,
        Facing(1.0),
        Health::new(tunables.player_max_health),
        MercyOnHit(tunables.player_mercy_window),
        ExplosionPayload(0),
        FreezeGroup(FreezeCategory::Player),
        RunScoped,
        (
            Sprite {
                color: Color::srgb(0.2, 0.75, 0.9),
                custom_size: Some(Vec2::new(22.0, 28.0)),
                ..default()
            },
            Transform::from_translation(spawn_pos.extend(1.0)),
        ),
        (
            RigidBody::Dynamic,
            LockedAxes::ROTATION_LOCKED,
            GravityScale(1.0),
            Collider::rectangle(20.0, 26.0),
            CollisionLayers::new(
                Layer::Player,
                [Layer::World, Layer::Enemy, Layer::EnemyShot, Layer::Checkpoint],
            ),
            LinearVelocity::ZERO,
            // Ground probe: a short downward ray against world geometry only.
            RayCaster::new(Vec2::ZERO, Dir2::NEG_Y)
                .with_max_distance(16.0)
                .with_query_filter(SpatialQueryFilter::from_mask(Layer::World)),
        ),
    ));
}

fn gather_input(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<PlayerInput>) {
    let mut axis = 0.0;
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        axis -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        axis += 1.0;
    }
    input.move_axis = axis;

    if keys.just_pressed(KeyCode::Space) || keys.just_pressed(KeyCode::KeyK) {
        input.jump_buffered = true;
    }
    input.fire_pressed = keys.just_pressed(KeyCode::KeyJ) || keys.just_pressed(KeyCode::KeyX);
}

/// Producer: turn a fire press into a spawn request along the facing.
///
/// This system intentionally does **not** touch the shot pool.
fn request_player_shots(
    input: Res<PlayerInput>,
    tunables: Res<Tunables>,
    switch: Res<FreezeSwitch>,
    q_player: Query<(Entity, &Transform, &Facing), (With<Player>, Without<Defeated>)>,
    mut writer: MessageWriter<SpawnShotRequest>,
) {
    if !input.fire_pressed || switch.is_frozen(FreezeCategory::Player) {
        return;
    }
    let Ok((player, tf, facing)) = q_player.single() else {
        return;
    };

    let origin = tf.translation.truncate() + Vec2::X * facing.0 * MUZZLE_REACH;
    writer.write(SpawnShotRequest {
        faction: ShotFaction::Player,
        role: ShotRole::Bullet,
        pos: origin,
        motion: MotionSpec::Linear {
            velocity: Vec2::X * facing.0 * tunables.bullet_speed,
        },
        damage: 1,
        lifetime: tunables.bullet_lifetime,
        owner: Some(player),
    });
}

fn apply_movement(
    tunables: Res<Tunables>,
    switch: Res<FreezeSwitch>,
    mut input: ResMut<PlayerInput>,
    mut q_player: Query<
        (&mut LinearVelocity, &mut Facing, Option<&RayHits>),
        (With<Player>, Without<Defeated>),
    >,
) {
    if switch.is_frozen(FreezeCategory::Player) {
        return;
    }
    let Ok((mut vel, mut facing, ground_hits)) = q_player.single_mut() else {
        return;
    };

    vel.0.x = input.move_axis * tunables.player_speed;
    if input.move_axis != 0.0 {
        facing.0 = input.move_axis.signum();
    }

    // The probe component appears once the spatial query pipeline has run;
    // until then the player is simply not grounded.
    let grounded = ground_hits.is_some_and(|hits| hits.iter().next().is_some());
    if input.jump_buffered && grounded {
        vel.0.y = tunables.player_jump_speed;
    }
    // A buffered jump is consumed whether or not it was honored; holding the
    // key does not queue jumps forever.
    input.jump_buffered = false;
}

/// Player defeat ends the attempt: freeze + shot clear happen on the
/// state transition, and combat has already spawned the cosmetic blast.
fn defeat_ends_run(
    q_player: Query<(), (With<Player>, With<Defeated>)>,
    mut next: ResMut<NextState<GameState>>,
) {
    if !q_player.is_empty() {
        next.set(GameState::GameOver);
    }
}
