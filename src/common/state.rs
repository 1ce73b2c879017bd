//! Global state machine.
//!
//! `Ready` is the frozen ready-screen shown before play starts; a short
//! countdown promotes it to `InGame`. `GameOver` freezes the whole
//! simulation and clears live shots before offering a restart.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Ready,
    InGame,
    GameOver,
}
