//! World plugin: spawns the side-scrolling strip.
//!
//! Static geometry only — a long floor, a few platforms, and bounding walls.
//! Everything is asset-free solid-color sprites with static colliders, and it
//! is rebuilt from scratch on every ready screen.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::state::GameState;
use crate::plugins::core::{ReadyFlow, RunScoped};

const STRIP_LEFT: f32 = -160.0;
const STRIP_RIGHT: f32 = 1440.0;
const FLOOR_Y: f32 = -110.0;

pub fn plugin(app: &mut App) {
    app.add_systems(
        OnEnter(GameState::Ready),
        spawn_strip.in_set(ReadyFlow::Spawn),
    );
}

fn spawn_strip(mut commands: Commands) {
    let solid_color = Color::srgb(0.25, 0.27, 0.33);

    let world_layers = CollisionLayers::new(
        Layer::World,
        [
            Layer::Player,
            Layer::Enemy,
            Layer::PlayerShot,
            Layer::EnemyShot,
        ],
    );

    let mut spawn_solid = |name: String, pos: Vec2, size: Vec2| {
        commands.spawn((
            Name::new(name),
            RunScoped,
            Sprite {
                color: solid_color,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(pos.extend(0.0)),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            world_layers,
        ));
    };

    let width = STRIP_RIGHT - STRIP_LEFT;
    let center_x = (STRIP_LEFT + STRIP_RIGHT) * 0.5;

    spawn_solid(
        "Floor".into(),
        Vec2::new(center_x, FLOOR_Y),
        Vec2::new(width, 40.0),
    );
    spawn_solid(
        "WallLeft".into(),
        Vec2::new(STRIP_LEFT, 60.0),
        Vec2::new(30.0, 400.0),
    );
    spawn_solid(
        "WallRight".into(),
        Vec2::new(STRIP_RIGHT, 60.0),
        Vec2::new(30.0, 400.0),
    );

    // Platforms the roster perches on.
    for (i, (x, y, w)) in [
        (380.0, -20.0, 140.0),
        (640.0, 20.0, 120.0),
        (1000.0, -10.0, 180.0),
        (1180.0, 50.0, 110.0),
    ]
    .into_iter()
    .enumerate()
    {
        spawn_solid(
            format!("Platform{i}"),
            Vec2::new(x, y),
            Vec2::new(w, 18.0),
        );
    }
}
