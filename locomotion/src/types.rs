/*!
Core data types shared by the detector, integrator, jump controller and character.

This module intentionally contains no algorithms beyond trivial accessors. It defines
the data exchanged between:
- surface detection (floor/wall queries against a `CollisionQuery`)
- the velocity integrator (force primitives on a single velocity)
- the jump controller and medium state machine
- the `Character` aggregate and the movement policies plugged into it
*/

use nalgebra as na;

use crate::settings::{FALLBACK_FRICTION, MIN_FRICTION};

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// World up axis. The controller is Y-up.
#[inline]
pub fn up() -> Vec3 {
    Vec3::y()
}

/// A detected contact plane.
///
/// A surface is valid iff its normal is non-zero; [`Surface::INVALID`] stands in for
/// "nothing was hit". Surfaces are recomputed every tick from a fresh query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    /// World-space contact point.
    pub point: Vec3,
    /// World-space surface normal (pointing away from the surface).
    pub normal: Vec3,
    /// Static friction of the attached material, if the collider carries one.
    pub material_friction: Option<f32>,
    /// Velocity of the surface at the contact point (moving platforms).
    pub moving_velocity: Vec3,
}

impl Surface {
    pub const INVALID: Self = Self {
        point: Vec3::new(0.0, 0.0, 0.0),
        normal: Vec3::new(0.0, 0.0, 0.0),
        material_friction: None,
        moving_velocity: Vec3::new(0.0, 0.0, 0.0),
    };

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.normal != Vec3::zeros()
    }

    /// Friction used to scale acceleration and drag on this surface.
    ///
    /// Always within `[MIN_FRICTION, 1.0]`; falls back to `FALLBACK_FRICTION` when no
    /// material is attached (including the invalid surface).
    #[inline]
    pub fn friction(&self) -> f32 {
        let raw = self.material_friction.unwrap_or(FALLBACK_FRICTION);
        if raw.is_nan() {
            return FALLBACK_FRICTION.clamp(MIN_FRICTION, 1.0);
        }
        raw.clamp(MIN_FRICTION, 1.0)
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::INVALID
    }
}

impl From<Hit> for Surface {
    fn from(hit: Hit) -> Self {
        Self {
            point: hit.point,
            normal: hit.normal,
            material_friction: hit.friction,
            moving_velocity: hit.velocity,
        }
    }
}

/// A single hit reported by a [`crate::query::CollisionQuery`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// World-space contact point on the hit collider.
    pub point: Vec3,
    /// World-space outward normal of the hit collider at `point`.
    pub normal: Vec3,
    /// Distance travelled along the cast direction before impact.
    pub distance: f32,
    /// Static friction of the hit collider's material, if any.
    pub friction: Option<f32>,
    /// Velocity of the hit collider at `point`.
    pub velocity: Vec3,
}

/// Movement-speed tuning. Owned by the calling policy, never mutated by the core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gait {
    /// Target speed in meters per second.
    pub speed: f32,
    /// Rate (m/s²) at which velocity approaches the target while input is held.
    pub acceleration: f32,
    /// Rate (m/s²) at which velocity approaches the surface velocity without input.
    pub deceleration: f32,
}

/// Capsule shape a character can switch between (standing, crouching, ...).
///
/// `height` is the full capsule height including both caps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stance {
    pub height: f32,
    pub radius: f32,
}

impl Stance {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.height.is_finite() && self.radius.is_finite() && self.height > 0.0 && self.radius > 0.0
    }
}

/// Y-aligned capsule attached to the character origin.
///
/// The origin sits at the bottom of the capsule, so the center is always `height/2`
/// above it and the origin stays pinned to the contact point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    pub height: f32,
    pub radius: f32,
}

impl Capsule {
    /// Offset of the capsule center from the character origin.
    #[inline]
    pub fn center_offset(&self) -> Vec3 {
        up() * (self.height * 0.5)
    }

    /// Half-length of the cylinder section (rapier's `Capsule::new_y` convention).
    ///
    /// Zero when the stance is so short the capsule degenerates into a sphere.
    #[inline]
    pub fn half_segment(&self) -> f32 {
        (self.height * 0.5 - self.radius).max(0.0)
    }

    #[inline]
    pub fn stance(&self) -> Stance {
        Stance {
            height: self.height,
            radius: self.radius,
        }
    }
}

impl From<Stance> for Capsule {
    fn from(stance: Stance) -> Self {
        Self {
            height: stance.height,
            radius: stance.radius,
        }
    }
}

/// Contact regime a character belongs to during a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MoveMedium {
    #[default]
    Air,
    Ground,
    Wall,
}

impl MoveMedium {
    /// Entering one of these media gives the character its jumps back.
    #[inline]
    pub fn restores_jumps(self) -> bool {
        matches!(self, MoveMedium::Ground | MoveMedium::Wall)
    }
}
