use std::f32::consts::FRAC_1_SQRT_2;

use crate::{
    query::CollisionQuery,
    settings::CharacterSettings,
    types::{Capsule, Quat, Surface, Vec3, up},
};

/// Edge timer value meaning "no floor was left without jumping".
pub const EDGE_TIMER_INACTIVE: f32 = -1.0;

/// Parameters for a single wall query around the capsule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallCheck {
    /// Direction to check; need not be normalized.
    pub direction: Vec3,
    /// How far past the capsule surface a wall still counts (meters).
    pub length: f32,
    /// Height of the probing box (meters).
    pub height: f32,
    /// Vertical offset of the box center from the capsule center (meters).
    pub vertical_offset: f32,
}

/// Floor/wall queries against a [`CollisionQuery`].
///
/// Stateless per call: everything carried between ticks (edge timer, previous wall)
/// is passed in and returned by the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct SurfaceDetector {
    pub settings: CharacterSettings,
}

impl SurfaceDetector {
    pub fn new(settings: CharacterSettings) -> Self {
        Self { settings }
    }

    /// Find the floor under a capsule whose bottom sits at `origin`.
    ///
    /// A sphere the size of the capsule's bottom cap is swept down, starting `epsilon`
    /// above the cap center. The sweep normal averages over the contact patch, so a short
    /// ray from just above the hit point recovers the exact normal there.
    pub fn detect_floor<Q: CollisionQuery + ?Sized>(
        &self,
        query: &Q,
        origin: Vec3,
        capsule: Capsule,
    ) -> Surface {
        let eps = self.settings.query_epsilon;
        let start = origin + up() * (capsule.radius + eps);
        let max_distance = self.settings.max_floor_distance + eps;

        let Some(hit) = query.sweep_sphere(start, capsule.radius, -up(), max_distance) else {
            return Surface::INVALID;
        };

        let refined = query
            .raycast(hit.point + up() * eps, -up(), eps * 2.0)
            .unwrap_or(hit);

        Surface::from(refined)
    }

    /// Advance the walked-off-edge timer after this tick's floor query.
    ///
    /// - Floor valid and nothing directly under the origin: standing on the edge, `0`.
    /// - Floor valid otherwise: unchanged.
    /// - No floor but the timer is running: count up by `dt` (coyote time).
    /// - No floor and no timer: [`EDGE_TIMER_INACTIVE`].
    pub fn update_edge_timer<Q: CollisionQuery + ?Sized>(
        &self,
        query: &Q,
        origin: Vec3,
        floor: &Surface,
        timer: f32,
        dt: f32,
    ) -> f32 {
        let eps = self.settings.query_epsilon;

        if floor.is_valid() {
            let under_origin = query.raycast(
                origin + up() * eps,
                -up(),
                eps + self.settings.max_floor_distance,
            );
            if under_origin.is_none() {
                return 0.0;
            }
            timer
        } else if timer >= 0.0 {
            timer + dt
        } else {
            EDGE_TIMER_INACTIVE
        }
    }

    /// Check for a wall next to the capsule.
    ///
    /// The check is a box inscribed in the capsule's circular cross-section, swept from
    /// the capsule center so that `check.length` is measured from the capsule surface.
    /// `previous` is the wall found last tick; it is accepted for callers that want
    /// hysteresis but does not change the query.
    pub fn detect_wall<Q: CollisionQuery + ?Sized>(
        &self,
        query: &Q,
        origin: Vec3,
        rotation: Quat,
        capsule: Capsule,
        check: WallCheck,
        previous: &Surface,
    ) -> Surface {
        let _ = previous;

        // Zero (or NaN) directions would normalize into NaN and poison the sweep.
        let Some(direction) = check
            .direction
            .try_normalize(f32::EPSILON)
            .filter(|d| d.iter().all(|c| c.is_finite()))
        else {
            return Surface::INVALID;
        };

        let inscribed = capsule.radius * FRAC_1_SQRT_2;
        let half_extents = Vec3::new(inscribed, check.height * 0.5, inscribed);
        let start = origin + capsule.center_offset() + up() * check.vertical_offset;
        let max_distance = (check.length + capsule.radius - inscribed).max(0.0);

        query
            .sweep_box(start, half_extents, direction, rotation, max_distance)
            .map(Surface::from)
            .unwrap_or(Surface::INVALID)
    }
}
