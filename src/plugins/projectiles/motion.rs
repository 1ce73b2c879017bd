//! Fixed-tick shot motion and expiry.
//!
//! Linear and arc shots are carried entirely by the physics collaborator
//! (velocity and gravity scale were set at launch). Curved shots are steered
//! here: each tick we evaluate the Bézier at the elapsed-time fraction and
//! set the velocity that reaches that point, so the body still sweeps through
//! space and collides normally instead of teleporting.
//!
//! Both systems early-out while the shot category is frozen, leaving elapsed
//! time and remaining lifetime untouched.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::trajectory::quadratic_bezier;
use crate::plugins::freeze::{FreezeCategory, FreezeSwitch};

use super::components::{Lifetime, PooledShot, ShotMotion, ShotState};

pub fn steer_bezier_shots(
    time: Res<Time<Fixed>>,
    switch: Res<FreezeSwitch>,
    mut q: Query<
        (&mut ShotMotion, &mut ShotState, &Transform, &mut LinearVelocity),
        With<PooledShot>,
    >,
) {
    if switch.is_frozen(FreezeCategory::Shots) {
        return;
    }
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    for (mut motion, mut state, tf, mut vel) in &mut q {
        if *state != ShotState::Active {
            continue;
        }
        let ShotMotion::Bezier {
            p0,
            p1,
            p2,
            flight_time,
            elapsed,
        } = &mut *motion
        else {
            continue;
        };

        *elapsed += dt;
        if *elapsed >= *flight_time {
            // Curve completed: retire like a lifetime expiry, no damage.
            *state = ShotState::PendingReturn;
            continue;
        }

        let t = *elapsed / *flight_time;
        let target = quadratic_bezier(*p0, *p1, *p2, t);
        vel.0 = (target - tf.translation.truncate()) / dt;
    }
}

/// Count down remaining flight time and retire expired shots.
///
/// Runs after collision resolution: a shot that hit something this tick is
/// already `PendingReturn` and is skipped here, so collision takes precedence
/// and nothing retires twice. Expiry never delivers damage.
pub fn tick_lifetimes(
    time: Res<Time<Fixed>>,
    switch: Res<FreezeSwitch>,
    mut q: Query<(&mut Lifetime, &mut ShotState), With<PooledShot>>,
) {
    if switch.is_frozen(FreezeCategory::Shots) {
        return;
    }
    let dt = time.delta_secs();

    for (mut lifetime, mut state) in &mut q {
        if *state != ShotState::Active {
            continue;
        }
        // The infinite sentinel stays infinite under subtraction.
        lifetime.0 -= dt;
        if lifetime.0 <= 0.0 {
            *state = ShotState::PendingReturn;
        }
    }
}
