/*!
Reference movement policy: walking and crouching, air control, coyote multi-jump and
wall running with wall jumps.

Tuning lives in [`PolicyTuning`]; per-tick player intent in [`Controls`].
*/

use locomotion::{
    Gait, MoveMedium, MovementPolicy, Stance, Surface, TickContext, Vec3, WallCheck, up,
};

/// Player intent for the current tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Controls {
    /// Horizontal move direction (world space); zero for no input.
    pub direction: Vec3,
    pub crouch: bool,
    /// Edge-triggered: consumed by the next tick.
    pub jump: bool,
    /// Hold to stick to and run along walls while airborne.
    pub wall_run: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolicyTuning {
    pub walk: Gait,
    pub crouch: Gait,
    pub wall_run: Gait,
    pub stand_stance: Stance,
    pub crouch_stance: Stance,
    /// Max rate at which the airborne heading turns toward the input (rad/s).
    pub air_control: f32,
    pub air_drag: f32,
    pub ground_drag: f32,
    pub fall_gravity: f32,
    pub rise_gravity: f32,
    /// Gravity while attached to a wall; lower than free fall so runs last.
    pub wall_gravity: f32,
    pub jump_force: f32,
    pub max_jumps: u32,
    pub coyote_time: f32,
    pub wall_jump_up: f32,
    pub wall_jump_out: f32,
    pub wall_check_length: f32,
    pub wall_check_height: f32,
}

impl Default for PolicyTuning {
    fn default() -> Self {
        Self {
            walk: Gait {
                speed: 6.0,
                acceleration: 60.0,
                deceleration: 40.0,
            },
            crouch: Gait {
                speed: 2.5,
                acceleration: 40.0,
                deceleration: 40.0,
            },
            wall_run: Gait {
                speed: 7.0,
                acceleration: 30.0,
                deceleration: 10.0,
            },
            stand_stance: Stance {
                height: 1.8,
                radius: 0.35,
            },
            crouch_stance: Stance {
                height: 1.1,
                radius: 0.35,
            },
            air_control: 4.0,
            air_drag: 0.1,
            ground_drag: 0.5,
            fall_gravity: 25.0,
            rise_gravity: 15.0,
            wall_gravity: 4.0,
            jump_force: 7.0,
            max_jumps: 2,
            coyote_time: 0.15,
            wall_jump_up: 6.0,
            wall_jump_out: 5.0,
            wall_check_length: 0.15,
            wall_check_height: 1.0,
        }
    }
}

/// Running totals, reported by the driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PolicyStats {
    pub jumps: u32,
    pub refused_jumps: u32,
    pub wall_jumps: u32,
    pub landings: u32,
    pub wall_attaches: u32,
}

#[derive(Clone, Debug, Default)]
pub struct ReferencePolicy {
    pub tuning: PolicyTuning,
    pub controls: Controls,
    pub stats: PolicyStats,
}

impl ReferencePolicy {
    pub fn new(tuning: PolicyTuning) -> Self {
        Self {
            tuning,
            ..Self::default()
        }
    }

    fn wall_check(&self, ctx: &TickContext<'_>) -> WallCheck {
        // Keep checking into the wall we are on; otherwise check where the player steers.
        let direction = if ctx.wall.is_valid() {
            -ctx.wall.normal
        } else {
            self.controls.direction
        };
        WallCheck {
            direction,
            length: self.tuning.wall_check_length,
            height: self.tuning.wall_check_height,
            vertical_offset: 0.0,
        }
    }

    fn ground(&mut self, ctx: &mut TickContext<'_>) {
        let gait = if self.controls.crouch {
            self.tuning.crouch
        } else {
            self.tuning.walk
        };
        ctx.apply_floor_movement(&gait);
        let floor = ctx.floor;
        ctx.apply_surface_drag(self.tuning.ground_drag, &floor);
        ctx.clear_wall();
    }

    fn air(&mut self, ctx: &mut TickContext<'_>) {
        ctx.apply_air_control_movement(self.tuning.air_control);
        ctx.apply_drag(self.tuning.air_drag);
        ctx.apply_asymmetric_gravity(self.tuning.fall_gravity, self.tuning.rise_gravity);

        if self.controls.wall_run {
            let check = self.wall_check(ctx);
            ctx.detect_wall(check);
        } else {
            ctx.clear_wall();
        }
    }

    fn wall(&mut self, ctx: &mut TickContext<'_>) {
        ctx.apply_wall_run_movement(&self.tuning.wall_run);
        ctx.apply_gravity(self.tuning.wall_gravity);

        if self.controls.wall_run {
            let check = self.wall_check(ctx);
            ctx.detect_wall(check);
        } else {
            ctx.clear_wall();
        }
    }

    fn jump(&mut self, ctx: &mut TickContext<'_>, medium: MoveMedium) {
        let t = &self.tuning;
        if medium == MoveMedium::Wall && ctx.wall.is_valid() {
            let wall: Surface = ctx.wall;
            ctx.surface_jump(t.wall_jump_up, t.wall_jump_out, true, &wall);
            self.stats.wall_jumps += 1;
            return;
        }

        if ctx.coyote_jump(t.jump_force, t.max_jumps, true, t.coyote_time) {
            self.stats.jumps += 1;
        } else {
            self.stats.refused_jumps += 1;
        }
    }
}

impl MovementPolicy for ReferencePolicy {
    fn on_tick(&mut self, ctx: &mut TickContext<'_>, medium: MoveMedium) -> MoveMedium {
        let stance = if self.controls.crouch {
            self.tuning.crouch_stance
        } else {
            self.tuning.stand_stance
        };
        ctx.set_stance(stance);

        match medium {
            MoveMedium::Ground => self.ground(ctx),
            MoveMedium::Air => self.air(ctx),
            MoveMedium::Wall => self.wall(ctx),
        }

        if std::mem::take(&mut self.controls.jump) {
            self.jump(ctx, medium);
        }

        ctx.resolve_medium()
    }

    fn on_medium_changed(&mut self, ctx: &mut TickContext<'_>, from: MoveMedium, to: MoveMedium) {
        match to {
            MoveMedium::Ground => {
                self.stats.landings += 1;
                log::debug!("landed from {:?} at {:.2} m/s", from, ctx.velocity.norm());
            }
            MoveMedium::Wall => {
                self.stats.wall_attaches += 1;
                // Catch the runner: no sliding down faster than wall gravity allows.
                if ctx.velocity.dot(&up()) < 0.0 {
                    ctx.velocity.y = 0.0;
                }
            }
            MoveMedium::Air => {}
        }
    }
}
