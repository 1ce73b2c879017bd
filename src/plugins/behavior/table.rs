//! Data-driven behavior tables.
//!
//! Every enemy runs the same machine; what differs is its table: a ring of
//! timed phases, each with an optional entry condition, an invincibility
//! coupling, and entry actions. Tables are plain data — they derive serde and
//! load from RON, so a roster tweak is a data edit, not a new hand-written
//! state machine.
//!
//! Validation happens **once, at registration**. A table that passes
//! `validate()` upholds every precondition the tick path and the trajectory
//! solver rely on (non-empty ring, positive durations, positive apex
//! heights), which keeps the per-tick code free of defensive branches.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Something a phase does the moment it becomes active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PhaseAction {
    /// Fire a straight shot at the player's current position.
    FireAtPlayer { speed: f32, damage: i32 },
    /// Fire `count` shots fanned around the line to the player.
    FireFan {
        speed: f32,
        damage: i32,
        count: u32,
        spread_degrees: f32,
    },
    /// Lob a bomb onto the player along a ballistic arc.
    LobBombAtPlayer { apex_height: f32, damage: i32 },
    /// Sweep a curved shot to the player along a Bézier arc.
    CurveAtPlayer {
        arc_height: f32,
        flight_time: f32,
        damage: i32,
    },
    /// Reverse patrol facing.
    TurnAround,
    /// Fire-and-forget collaborator cues.
    PlayAnimation(String),
    PlaySound(String),
}

/// Gate on the phase countdown: while unmet, the machine holds in place and
/// the timer does not run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub enum PhaseCondition {
    #[default]
    Always,
    PlayerWithin(f32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    /// Nominal phase length in seconds.
    pub duration: f32,
    /// Bounded randomness added to `duration` on each reset: `0..=jitter`
    /// seconds, always additive against the nominal delay.
    #[serde(default)]
    pub jitter: f32,
    /// Couples this phase to the health invincibility flag. Declared per
    /// table — closed phases are conventionally invincible, but some
    /// archetypes invert that.
    #[serde(default)]
    pub invincible: bool,
    #[serde(default)]
    pub condition: PhaseCondition,
    #[serde(default)]
    pub on_enter: Vec<PhaseAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorTable {
    pub archetype: String,
    pub phases: Vec<Phase>,
}

#[derive(Debug, Error)]
pub enum ArchetypeError {
    #[error("archetype `{0}` is not registered")]
    Unknown(String),
    #[error("archetype `{archetype}` has no phases")]
    EmptyTable { archetype: String },
    #[error("archetype `{archetype}`, phase `{phase}`: {reason}")]
    InvalidPhase {
        archetype: String,
        phase: String,
        reason: String,
    },
    #[error("archetype table failed to parse: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

impl BehaviorTable {
    pub fn from_ron(source: &str) -> Result<Self, ArchetypeError> {
        let table: Self = ron::from_str(source)?;
        table.validate()?;
        Ok(table)
    }

    /// Uphold every invariant the tick path assumes.
    pub fn validate(&self) -> Result<(), ArchetypeError> {
        if self.phases.is_empty() {
            return Err(ArchetypeError::EmptyTable {
                archetype: self.archetype.clone(),
            });
        }

        for phase in &self.phases {
            let fail = |reason: String| ArchetypeError::InvalidPhase {
                archetype: self.archetype.clone(),
                phase: phase.name.clone(),
                reason,
            };

            if phase.duration <= 0.0 {
                return Err(fail(format!("duration {} must be positive", phase.duration)));
            }
            if phase.jitter < 0.0 {
                return Err(fail("jitter must not be negative".into()));
            }

            for action in &phase.on_enter {
                match action {
                    PhaseAction::FireAtPlayer { damage, .. }
                    | PhaseAction::FireFan { damage, .. }
                    | PhaseAction::LobBombAtPlayer { damage, .. }
                    | PhaseAction::CurveAtPlayer { damage, .. }
                        if *damage < 0 =>
                    {
                        return Err(fail("negative shot damage".into()));
                    }
                    PhaseAction::FireFan { count, .. } if *count == 0 => {
                        return Err(fail("fan with zero shots".into()));
                    }
                    // The ballistic solver divides by flight time derived
                    // from the apex; zero/negative apex is a math fault.
                    PhaseAction::LobBombAtPlayer { apex_height, .. } if *apex_height <= 0.0 => {
                        return Err(fail("bomb apex height must be positive".into()));
                    }
                    PhaseAction::CurveAtPlayer { flight_time, .. } if *flight_time <= 0.0 => {
                        return Err(fail("curve flight time must be positive".into()));
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}

/// All validated tables, looked up by archetype name each tick.
#[derive(Resource, Debug, Default)]
pub struct BehaviorRegistry {
    tables: HashMap<String, BehaviorTable>,
}

impl BehaviorRegistry {
    pub fn register(&mut self, table: BehaviorTable) -> Result<(), ArchetypeError> {
        table.validate()?;
        self.tables.insert(table.archetype.clone(), table);
        Ok(())
    }

    pub fn get(&self, archetype: &str) -> Option<&BehaviorTable> {
        self.tables.get(archetype)
    }
}
