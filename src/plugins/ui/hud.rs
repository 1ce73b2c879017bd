//! Score display + collaborator cue sink.
//!
//! This is the display side of the score interface: gameplay writes the
//! `Score` resource and fire-and-forget cue messages; everything here only
//! reads and formats. Headless apps have no window, so the HUD systems
//! degrade to no-ops.

use bevy::prelude::*;

use crate::plugins::core::{AnimationCue, FxCue, Score, ScoreDelta, SoundCue};

pub fn plugin(app: &mut App) {
    app.add_systems(Update, (refresh_score_display, drain_collaborator_cues));
}

fn refresh_score_display(
    score: Res<Score>,
    mut deltas: MessageReader<ScoreDelta>,
    mut windows: Query<&mut Window>,
) {
    // The delta feed is what a real HUD would animate; the resource is the
    // authoritative number we render.
    let bumped = deltas.read().count() > 0;
    if !(score.is_changed() || bumped) {
        return;
    }
    for mut window in &mut windows {
        window.title = format!("BUSTER  —  SCORE {:07}", score.0);
    }
}

/// Stand-in for the animation/audio playback services: consume the cues so
/// the buffers drain, and trace them for debugging. Nothing in the
/// simulation ever waits on these.
fn drain_collaborator_cues(
    mut fx: MessageReader<FxCue>,
    mut anims: MessageReader<AnimationCue>,
    mut sounds: MessageReader<SoundCue>,
) {
    for cue in fx.read() {
        debug!("fx cue: {cue:?}");
    }
    for cue in anims.read() {
        debug!("animation cue `{}` on {:?}", cue.clip, cue.target);
    }
    for cue in sounds.read() {
        debug!("sound cue `{}`", cue.clip);
    }
}
