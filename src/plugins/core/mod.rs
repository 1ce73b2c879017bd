//! Core plugin: shared resources, the score accumulator, and the
//! ready / game-over flow.
//!
//! # Score ownership
//! The `Score` resource is simulation truth, written only by the defeat
//! resolver (one writer per tick). `ScoreDelta` messages are the feed for the
//! display collaborator — the HUD formats, gameplay never does.

use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;

/// Global score accumulator. Reset on every fresh run.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct Score(pub u64);

/// Points awarded by a defeat (or pickup). Fire-and-forget.
#[derive(Message, Clone, Copy, Debug)]
pub struct ScoreDelta(pub u32);

/// Fire-and-forget feedback cues for the audio/animation collaborators.
///
/// The simulation never waits on these; a missed cue is at most a missed
/// sound effect.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FxCue {
    DamageBlocked,
    PlayerHit,
    Explosion,
    CheckpointReached,
}

/// "Play named animation" request for the animation collaborator.
#[derive(Message, Clone, Debug)]
pub struct AnimationCue {
    pub target: Entity,
    pub clip: String,
}

/// "Play clip" request for the audio collaborator.
#[derive(Message, Clone, Debug)]
pub struct SoundCue {
    pub clip: String,
}

/// Entities that live for exactly one run attempt. The ready screen tears
/// down the previous attempt before the spawn systems rebuild the level.
#[derive(Component, Debug, Clone, Copy)]
pub struct RunScoped;

/// Ordering inside `OnEnter(Ready)`: tear down, then rebuild.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReadyFlow {
    Cleanup,
    Spawn,
}

/// Countdown that promotes `Ready` to `InGame`.
#[derive(Resource, Debug)]
pub struct ReadyTimer(pub Timer);

/// Countdown that sends `GameOver` back to the ready screen.
#[derive(Resource, Debug)]
pub struct RestartTimer(pub Timer);

/// Maintain a message buffer.
///
/// Messages are double-buffered; `update()` advances buffers.
pub fn update_messages<M: Message>(mut msgs: ResMut<Messages<M>>) {
    msgs.update();
}

pub fn plugin(app: &mut App) {
    app.insert_resource(Tunables::default());
    app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)));
    app.insert_resource(Score::default());

    app.init_resource::<Messages<ScoreDelta>>();
    app.init_resource::<Messages<FxCue>>();
    app.init_resource::<Messages<AnimationCue>>();
    app.init_resource::<Messages<SoundCue>>();
    app.add_systems(
        PostUpdate,
        (
            update_messages::<ScoreDelta>,
            update_messages::<FxCue>,
            update_messages::<AnimationCue>,
            update_messages::<SoundCue>,
        ),
    );

    app.configure_sets(
        OnEnter(GameState::Ready),
        (ReadyFlow::Cleanup, ReadyFlow::Spawn).chain(),
    );
    app.add_systems(
        OnEnter(GameState::Ready),
        (despawn_previous_run, arm_ready_timer, reset_score).in_set(ReadyFlow::Cleanup),
    );
    app.add_systems(OnEnter(GameState::GameOver), arm_restart_timer);
    app.add_systems(
        Update,
        ready_countdown.run_if(in_state(GameState::Ready)),
    );
    app.add_systems(
        Update,
        restart_countdown.run_if(in_state(GameState::GameOver)),
    );
}

fn arm_ready_timer(mut commands: Commands, tunables: Res<Tunables>) {
    commands.insert_resource(ReadyTimer(Timer::from_seconds(
        tunables.ready_delay,
        TimerMode::Once,
    )));
}

fn arm_restart_timer(mut commands: Commands) {
    commands.insert_resource(RestartTimer(Timer::from_seconds(3.0, TimerMode::Once)));
}

/// A fresh run starts from zero; checkpoint restores keep positions, not score.
fn reset_score(mut score: ResMut<Score>) {
    score.0 = 0;
}

fn despawn_previous_run(mut commands: Commands, q: Query<Entity, With<RunScoped>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}

fn ready_countdown(
    time: Res<Time>,
    mut timer: ResMut<ReadyTimer>,
    mut next: ResMut<NextState<GameState>>,
) {
    timer.0.tick(time.delta());
    if timer.0.is_finished() {
        next.set(GameState::InGame);
    }
}

fn restart_countdown(
    time: Res<Time>,
    mut timer: ResMut<RestartTimer>,
    mut next: ResMut<NextState<GameState>>,
) {
    timer.0.tick(time.delta());
    if timer.0.is_finished() {
        next.set(GameState::Ready);
    }
}

#[cfg(test)]
mod tests;
