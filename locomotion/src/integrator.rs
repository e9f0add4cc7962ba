//! Velocity integration primitives.
//!
//! Every function mutates a single velocity in place and scales by an explicit `dt`.
//! None of them allocate, query the world, or touch anything but the velocity passed in.
//! Policies compose them per medium (e.g., floor movement + surface drag + gravity).

use nalgebra as na;

use crate::types::{Gait, Surface, Vec3, up};

/// Directions shorter than this are treated as "no input".
const WISH_EPS: f32 = 1.0e-6;

/// Move `current` toward `target` by at most `max_delta`, never overshooting.
#[inline]
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let dist = delta.norm();
    if dist <= max_delta || dist <= f32::EPSILON {
        return target;
    }
    current + delta / dist * max_delta.max(0.0)
}

/// Seek the gait's target velocity relative to `surface`.
///
/// The target is the surface velocity plus `normalize(wish) * gait.speed` (or just the
/// surface velocity when there is no wish). Velocity approaches it linearly at
/// `friction * acceleration` (or `deceleration` without a wish).
pub fn move_toward_gait(velocity: &mut Vec3, wish: Vec3, gait: &Gait, surface: &Surface, dt: f32) {
    let (target, rate) = match wish.try_normalize(WISH_EPS) {
        Some(dir) => (surface.moving_velocity + dir * gait.speed, gait.acceleration),
        None => (surface.moving_velocity, gait.deceleration),
    };
    let max_delta = surface.friction() * dt * rate.max(0.0);
    *velocity = move_towards(*velocity, target, max_delta);
}

/// Ground movement: the input is projected onto the floor plane so slopes are followed.
pub fn apply_floor_movement(
    velocity: &mut Vec3,
    input: Vec3,
    gait: &Gait,
    floor: &Surface,
    dt: f32,
) {
    let wish = project_on_plane(input, floor.normal);
    move_toward_gait(velocity, wish, gait, floor, dt);
}

/// Wall climbing: the horizontal input plane is rotated onto the wall plane, so pushing
/// into the wall climbs up and sideways input stays sideways.
pub fn apply_wall_climb_movement(
    velocity: &mut Vec3,
    input: Vec3,
    gait: &Gait,
    wall: &Surface,
    dt: f32,
) {
    let onto_wall = na::UnitQuaternion::rotation_between(&up(), &wall.normal)
        .unwrap_or_else(na::UnitQuaternion::identity);
    move_toward_gait(velocity, onto_wall * input, gait, wall, dt);
}

/// Wall running: run along the wall in the direction of `forward` projected onto it.
///
/// Without input the wish is zero and the runner decelerates toward the wall's velocity.
pub fn apply_wall_run_movement(
    velocity: &mut Vec3,
    input: Vec3,
    forward: Vec3,
    gait: &Gait,
    wall: &Surface,
    dt: f32,
) {
    let wish = if input.norm_squared() > WISH_EPS * WISH_EPS {
        project_on_plane(forward, wall.normal)
    } else {
        Vec3::zeros()
    };
    move_toward_gait(velocity, wish, gait, wall, dt);
}

/// Airborne acceleration: input is added directly, with no target speed.
pub fn apply_air_movement(velocity: &mut Vec3, input: Vec3, acceleration: f32, dt: f32) {
    if input.norm_squared() <= WISH_EPS * WISH_EPS {
        return;
    }
    *velocity += input * acceleration * dt;
}

/// Air control: turn the horizontal heading toward the input direction by at most
/// `air_control * dt` radians. Horizontal speed and vertical velocity are unchanged.
pub fn apply_air_control_movement(velocity: &mut Vec3, input: Vec3, air_control: f32, dt: f32) {
    let Some(heading) = Vec3::new(input.x, 0.0, input.z).try_normalize(WISH_EPS) else {
        return;
    };
    let horizontal = Vec3::new(velocity.x, 0.0, velocity.z);
    let speed = horizontal.norm();
    if speed <= WISH_EPS {
        return;
    }

    let target = heading * speed;
    let cos = (horizontal.dot(&target) / (speed * speed)).clamp(-1.0, 1.0);
    let angle = cos.acos();
    let max_step = air_control.max(0.0) * dt;

    let turned = if angle <= max_step {
        target
    } else {
        // Antiparallel headings have no preferred side; turn left.
        let side = if horizontal.cross(&target).y < 0.0 { -1.0 } else { 1.0 };
        na::UnitQuaternion::from_axis_angle(&Vec3::y_axis(), side * max_step) * horizontal
    };

    velocity.x = turned.x;
    velocity.z = turned.z;
}

/// Quadratic drag: removes `0.5 * drag * |v|² * dt` against the velocity, capped at the
/// current speed so drag can stop the character but never reverse it.
pub fn apply_drag(velocity: &mut Vec3, drag: f32, dt: f32) {
    let drag = drag.max(0.0);
    let speed = velocity.norm();
    if speed <= f32::EPSILON {
        return;
    }
    let loss = (0.5 * drag * speed * speed * dt).min(speed);
    *velocity -= *velocity / speed * loss;
}

/// Drag scaled by the surface friction.
pub fn apply_surface_drag(velocity: &mut Vec3, drag: f32, surface: &Surface, dt: f32) {
    apply_drag(velocity, drag.max(0.0) * surface.friction(), dt);
}

/// Constant downward acceleration. Negative gravity is treated as zero.
pub fn apply_gravity(velocity: &mut Vec3, gravity: f32, dt: f32) {
    velocity.y -= gravity.max(0.0) * dt;
}

/// Gravity with separate rates for rising (`v.y > 0`) and falling, typically so the
/// character falls faster than it rises.
pub fn apply_asymmetric_gravity(velocity: &mut Vec3, descending: f32, ascending: f32, dt: f32) {
    let gravity = if velocity.y > 0.0 { ascending } else { descending };
    apply_gravity(velocity, gravity, dt);
}

/// Remove the component of `v` along `normal`. A zero normal leaves `v` unchanged.
#[inline]
fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    match normal.try_normalize(WISH_EPS) {
        Some(n) => v - n * v.dot(&n),
        None => v,
    }
}
