//! Jump requests: multi-jump, coyote time, and surface (wall) jumps.
//!
//! The basic and coyote requests charge a jump taken after walking off an edge through
//! two different mechanisms:
//! - [`CharacterState::jump`] lowers the allowance (`max_jumps - 1`) while the edge
//!   timer is running.
//! - [`CharacterState::coyote_jump`] raises `jump_count` once the coyote window has
//!   closed and no jump was taken yet.
//!
//! Both are kept as-is; they produce different jump budgets in some fall sequences.

use crate::{
    state::CharacterState,
    types::{MoveMedium, Surface, Vec3, up},
};

/// `true` iff a jump at edge-timer value `time_since_walked_off_edge` is still inside
/// the coyote window: `0 <= t < coyote_time`.
#[inline]
pub fn can_coyote_jump(time_since_walked_off_edge: f32, coyote_time: f32) -> bool {
    time_since_walked_off_edge >= 0.0 && time_since_walked_off_edge < coyote_time
}

impl CharacterState {
    /// Jump with `force` if fewer than `max_jumps` jumps were taken.
    ///
    /// After walking off a floor (edge timer running) the allowance is one less.
    /// Returns whether the impulse was applied; a refused jump changes nothing.
    pub fn jump(&mut self, force: f32, max_jumps: u32, reset_vertical: bool) -> bool {
        let mut allowance = max_jumps;
        if !self.floor.is_valid() && self.time_since_walked_off_edge >= 0.0 {
            allowance = allowance.saturating_sub(1);
        }

        if self.jump_count >= allowance {
            log::trace!("jump refused: {} of {} used", self.jump_count, allowance);
            return false;
        }

        self.launch(up() * force, reset_vertical);
        true
    }

    /// Jump with coyote time: within `coyote_time` of walking off an edge the character
    /// jumps as if still grounded.
    ///
    /// Past the window, with no floor and no jump taken yet, the first jump is charged by
    /// raising `jump_count` before the allowance check. That charge sticks even if the
    /// check then refuses the jump.
    pub fn coyote_jump(
        &mut self,
        force: f32,
        max_jumps: u32,
        reset_vertical: bool,
        coyote_time: f32,
    ) -> bool {
        let in_window = can_coyote_jump(self.time_since_walked_off_edge, coyote_time);
        if !self.floor.is_valid() && !in_window && self.jump_count == 0 {
            self.jump_count += 1;
        }

        if self.jump_count >= max_jumps {
            log::trace!("coyote jump refused: {} of {} used", self.jump_count, max_jumps);
            return false;
        }

        self.launch(up() * force, reset_vertical);
        true
    }

    /// Jump off `surface` (typically a wall): up by `upward_force` and away along its
    /// normal by `perpendicular_force`. Never refused.
    pub fn surface_jump(
        &mut self,
        upward_force: f32,
        perpendicular_force: f32,
        reset_vertical: bool,
        surface: &Surface,
    ) {
        let impulse = up() * upward_force + surface.normal * perpendicular_force;
        self.launch(impulse, reset_vertical);
    }

    fn launch(&mut self, impulse: Vec3, reset_vertical: bool) {
        self.force_medium(MoveMedium::Air);

        if reset_vertical && self.velocity.y < 0.0 {
            self.velocity.y = 0.0;
        }
        self.velocity += impulse;
        self.jump_count += 1;

        log::debug!(
            "jump #{} impulse ({:.2}, {:.2}, {:.2})",
            self.jump_count,
            impulse.x,
            impulse.y,
            impulse.z
        );
    }
}
