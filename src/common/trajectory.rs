//! Closed-form launch math for arcing and curved shots.
//!
//! Pure functions over `Vec2` — no ECS access, so both the allocator and the
//! behavior actions can call them, and tests can check them without a world.
//!
//! Preconditions are the caller's job: `ballistic_launch` divides by the
//! flight time it derives, so `apex_height` must be positive and `gravity`
//! strictly negative. Feeding it a degenerate input is a caller bug, not a
//! runtime-guarded path.

use bevy::prelude::*;

/// Initial velocity + total flight time for a ballistic launch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub velocity: Vec2,
    pub flight_time: f32,
}

/// Solve the launch velocity that carries a body from `source` to `target`
/// under constant `gravity`, peaking `apex_height` above `source.y`.
///
/// The vertical leg fixes time-to-apex from `v_y = sqrt(-2 g h)`; the fall
/// leg from apex down to `target.y` fixes the rest; horizontal velocity is
/// whatever covers the x displacement in that total time.
pub fn ballistic_launch(source: Vec2, target: Vec2, apex_height: f32, gravity: f32) -> Launch {
    let vy = (-2.0 * gravity * apex_height).sqrt();
    let t_rise = vy / -gravity;

    // Height of the apex above the target, for the fall leg.
    let drop = source.y + apex_height - target.y;
    let t_fall = (2.0 * drop / -gravity).sqrt();

    let flight_time = t_rise + t_fall;
    let vx = (target.x - source.x) / flight_time;

    Launch {
        velocity: Vec2::new(vx, vy),
        flight_time,
    }
}

/// Quadratic Bézier point: `(1-t)²·p0 + 2(1-t)t·p1 + t²·p2`.
pub fn quadratic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

/// Control points for an arc from `from` to `to` that bulges `arc_height`
/// above the chord midpoint.
///
/// This is the explicit re-seed operation: a curve cannot resume mid-flight,
/// so a redirected shot gets fresh control points from wherever it is now.
pub fn bezier_arc_through(from: Vec2, to: Vec2, arc_height: f32) -> [Vec2; 3] {
    let mid = (from + to) * 0.5 + Vec2::Y * arc_height;
    [from, mid, to]
}
