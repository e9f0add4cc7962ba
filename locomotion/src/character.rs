use std::ops::{Deref, DerefMut};

use crate::{
    error::CharacterError,
    integrator,
    medium::{MediumTransition, resolve_medium},
    query::CollisionQuery,
    settings::CharacterSettings,
    state::CharacterState,
    surface::{SurfaceDetector, WallCheck},
    types::{Capsule, Gait, MoveMedium, Quat, Stance, Surface, Vec3},
};

/// Game-specific movement behavior plugged into a [`Character`].
///
/// `on_tick` runs once per tick for the current medium, drives the velocity through the
/// [`TickContext`] and returns the medium it wants next (usually
/// [`TickContext::resolve_medium`]). The proposal is discarded while a jump lock is active.
pub trait MovementPolicy {
    fn on_tick(&mut self, ctx: &mut TickContext<'_>, medium: MoveMedium) -> MoveMedium;

    /// Called after a medium change was committed, with the jump count already updated.
    fn on_medium_changed(&mut self, ctx: &mut TickContext<'_>, from: MoveMedium, to: MoveMedium) {
        let _ = (ctx, from, to);
    }
}

fn switch_stance(capsule: &mut Capsule, stance: Stance) -> bool {
    if !stance.is_valid() {
        log::warn!(
            "ignoring invalid stance: height {} radius {}",
            stance.height,
            stance.radius
        );
        return false;
    }
    if capsule.stance() == stance {
        return false;
    }
    *capsule = Capsule::from(stance);
    true
}

/// A character controller: capsule, state, and the per-tick update sequence.
#[derive(Clone, Debug)]
pub struct Character {
    state: CharacterState,
    capsule: Capsule,
    detector: SurfaceDetector,
}

impl Character {
    /// Create a character standing (origin at the capsule bottom) at `position`.
    pub fn new(
        position: Vec3,
        rotation: Quat,
        stance: Stance,
        settings: CharacterSettings,
    ) -> Result<Self, CharacterError> {
        if !stance.is_valid() {
            return Err(CharacterError::InvalidCapsule {
                height: stance.height,
                radius: stance.radius,
            });
        }

        Ok(Self {
            state: CharacterState::new(position, rotation)
                .with_jump_lock_frames(settings.jump_lock_frames),
            capsule: Capsule::from(stance),
            detector: SurfaceDetector::new(settings),
        })
    }

    #[inline]
    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut CharacterState {
        &mut self.state
    }

    #[inline]
    pub fn capsule(&self) -> Capsule {
        self.capsule
    }

    #[inline]
    pub fn medium(&self) -> MoveMedium {
        self.state.medium()
    }

    #[inline]
    pub fn settings(&self) -> &CharacterSettings {
        &self.detector.settings
    }

    /// World-space capsule center.
    #[inline]
    pub fn center(&self) -> Vec3 {
        self.state.position + self.capsule.center_offset()
    }

    /// Host write-back after it moved the body.
    pub fn set_pose(&mut self, position: Vec3, rotation: Quat) {
        self.state.position = position;
        self.state.rotation = rotation;
    }

    /// Set the input as a direction (normalized here) and a magnitude clamped to `[0, 1]`.
    pub fn set_world_input(&mut self, direction: Vec3, magnitude: f32) {
        let magnitude = if magnitude.is_finite() {
            magnitude.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.state.world_input = direction
            .try_normalize(f32::EPSILON)
            .filter(|d| d.iter().all(|c| c.is_finite()))
            .map(|d| d * magnitude)
            .unwrap_or_else(Vec3::zeros);
    }

    /// Switch the capsule shape. The caller is responsible for the new volume being clear.
    ///
    /// Returns whether the capsule changed; invalid stances are ignored.
    pub fn set_stance(&mut self, stance: Stance) -> bool {
        switch_stance(&mut self.capsule, stance)
    }

    #[inline]
    pub fn is_stance(&self, stance: Stance) -> bool {
        self.capsule.stance() == stance
    }

    /// See [`CharacterState::jump`].
    pub fn jump(&mut self, force: f32, max_jumps: u32, reset_vertical: bool) -> bool {
        self.state.jump(force, max_jumps, reset_vertical)
    }

    /// See [`CharacterState::coyote_jump`].
    pub fn coyote_jump(
        &mut self,
        force: f32,
        max_jumps: u32,
        reset_vertical: bool,
        coyote_time: f32,
    ) -> bool {
        self.state
            .coyote_jump(force, max_jumps, reset_vertical, coyote_time)
    }

    /// See [`CharacterState::surface_jump`].
    pub fn surface_jump(
        &mut self,
        upward_force: f32,
        perpendicular_force: f32,
        reset_vertical: bool,
        surface: &Surface,
    ) {
        self.state
            .surface_jump(upward_force, perpendicular_force, reset_vertical, surface)
    }

    /// Run one fixed-timestep update.
    ///
    /// 1. Refresh the floor and the walked-off-edge timer.
    /// 2. Run the policy for the current medium.
    /// 3. Take the medium it proposes.
    /// 4. Commit the proposal unless a jump lock is active (the lock ticks down instead).
    ///
    /// Committed transitions are delivered to `policy.on_medium_changed` in order. Those
    /// committed between ticks (a jump from an input handler) are delivered before step 2.
    pub fn tick(&mut self, dt: f32, query: &dyn CollisionQuery, policy: &mut dyn MovementPolicy) {
        let dt = dt.max(0.0);

        let floor = self
            .detector
            .detect_floor(query, self.state.position, self.capsule);
        self.state.time_since_walked_off_edge = self.detector.update_edge_timer(
            query,
            self.state.position,
            &floor,
            self.state.time_since_walked_off_edge,
            dt,
        );
        self.state.floor = floor;

        self.notify(dt, query, policy);

        let medium = self.state.medium();
        let proposed = policy.on_tick(&mut self.context(dt, query), medium);
        self.state.propose_medium(proposed);

        self.notify(dt, query, policy);
    }

    fn context<'a>(&'a mut self, dt: f32, query: &'a dyn CollisionQuery) -> TickContext<'a> {
        TickContext {
            state: &mut self.state,
            capsule: &mut self.capsule,
            detector: &self.detector,
            query,
            dt,
        }
    }

    /// Deliver queued transitions. Transitions committed by the hooks themselves stay
    /// queued for the next delivery.
    fn notify(&mut self, dt: f32, query: &dyn CollisionQuery, policy: &mut dyn MovementPolicy) {
        let transitions = self.state.take_transitions();
        for MediumTransition { from, to } in transitions {
            policy.on_medium_changed(&mut self.context(dt, query), from, to);
        }
    }
}

/// What a [`MovementPolicy`] can see and drive during a tick.
///
/// Dereferences to the [`CharacterState`], so jumps and raw state are available directly
/// (`ctx.jump(..)`, `ctx.velocity`). The `apply_*` helpers run the integrator on the
/// character's own velocity, input and surfaces.
pub struct TickContext<'a> {
    state: &'a mut CharacterState,
    capsule: &'a mut Capsule,
    detector: &'a SurfaceDetector,
    query: &'a dyn CollisionQuery,
    pub dt: f32,
}

impl Deref for TickContext<'_> {
    type Target = CharacterState;

    fn deref(&self) -> &CharacterState {
        &*self.state
    }
}

impl DerefMut for TickContext<'_> {
    fn deref_mut(&mut self) -> &mut CharacterState {
        &mut *self.state
    }
}

impl TickContext<'_> {
    #[inline]
    pub fn capsule(&self) -> Capsule {
        *self.capsule
    }

    /// See [`Character::set_stance`].
    pub fn set_stance(&mut self, stance: Stance) -> bool {
        switch_stance(self.capsule, stance)
    }

    /// Query for a wall and remember it as the character's wall surface.
    pub fn detect_wall(&mut self, check: WallCheck) -> Surface {
        let wall = self.detector.detect_wall(
            self.query,
            self.state.position,
            self.state.rotation,
            *self.capsule,
            check,
            &self.state.wall,
        );
        self.state.wall = wall;
        wall
    }

    /// Forget the last wall (e.g., when the policy does not check for walls this tick).
    pub fn clear_wall(&mut self) {
        self.state.wall = Surface::INVALID;
    }

    /// Ground if a floor was found, else Wall if a wall was found, else Air.
    pub fn resolve_medium(&self) -> MoveMedium {
        resolve_medium(&self.state.floor, &self.state.wall)
    }

    pub fn apply_floor_movement(&mut self, gait: &Gait) {
        let s = &mut *self.state;
        integrator::apply_floor_movement(&mut s.velocity, s.world_input, gait, &s.floor, self.dt);
    }

    pub fn apply_wall_climb_movement(&mut self, gait: &Gait) {
        let s = &mut *self.state;
        integrator::apply_wall_climb_movement(
            &mut s.velocity,
            s.world_input,
            gait,
            &s.wall,
            self.dt,
        );
    }

    /// Run along the wall toward the character's facing (`rotation * -Z`).
    pub fn apply_wall_run_movement(&mut self, gait: &Gait) {
        let s = &mut *self.state;
        let forward = s.rotation * -Vec3::z();
        integrator::apply_wall_run_movement(
            &mut s.velocity,
            s.world_input,
            forward,
            gait,
            &s.wall,
            self.dt,
        );
    }

    pub fn apply_air_movement(&mut self, acceleration: f32) {
        let s = &mut *self.state;
        integrator::apply_air_movement(&mut s.velocity, s.world_input, acceleration, self.dt);
    }

    pub fn apply_air_control_movement(&mut self, air_control: f32) {
        let s = &mut *self.state;
        integrator::apply_air_control_movement(
            &mut s.velocity,
            s.world_input,
            air_control,
            self.dt,
        );
    }

    pub fn apply_drag(&mut self, drag: f32) {
        integrator::apply_drag(&mut self.state.velocity, drag, self.dt);
    }

    pub fn apply_surface_drag(&mut self, drag: f32, surface: &Surface) {
        integrator::apply_surface_drag(&mut self.state.velocity, drag, surface, self.dt);
    }

    pub fn apply_gravity(&mut self, gravity: f32) {
        integrator::apply_gravity(&mut self.state.velocity, gravity, self.dt);
    }

    pub fn apply_asymmetric_gravity(&mut self, descending: f32, ascending: f32) {
        integrator::apply_asymmetric_gravity(
            &mut self.state.velocity,
            descending,
            ascending,
            self.dt,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        surface::EDGE_TIMER_INACTIVE,
        testing::{FlatWorld, WallPlane},
        types::up,
    };

    const DT: f32 = 0.02;

    const WALK: Gait = Gait {
        speed: 5.0,
        acceleration: 50.0,
        deceleration: 50.0,
    };

    fn stance() -> Stance {
        Stance {
            height: 2.0,
            radius: 0.5,
        }
    }

    fn character_at(position: Vec3) -> Character {
        Character::new(position, Quat::identity(), stance(), CharacterSettings::default())
            .expect("valid stance")
    }

    /// Walks on ground, falls in air, records everything the core tells it.
    #[derive(Default)]
    struct Recorder {
        ticks: Vec<MoveMedium>,
        changes: Vec<(MoveMedium, MoveMedium, u32)>,
        check_walls: bool,
    }

    impl MovementPolicy for Recorder {
        fn on_tick(&mut self, ctx: &mut TickContext<'_>, medium: MoveMedium) -> MoveMedium {
            self.ticks.push(medium);
            match medium {
                MoveMedium::Ground => ctx.apply_floor_movement(&WALK),
                MoveMedium::Air | MoveMedium::Wall => ctx.apply_gravity(9.81),
            }
            if self.check_walls {
                ctx.detect_wall(WallCheck {
                    direction: Vec3::x(),
                    length: 0.2,
                    height: 1.0,
                    vertical_offset: 0.0,
                });
            } else {
                ctx.clear_wall();
            }
            ctx.resolve_medium()
        }

        fn on_medium_changed(
            &mut self,
            ctx: &mut TickContext<'_>,
            from: MoveMedium,
            to: MoveMedium,
        ) {
            self.changes.push((from, to, ctx.jump_count));
        }
    }

    #[test]
    fn rejects_invalid_capsule() {
        let err = Character::new(
            Vec3::zeros(),
            Quat::identity(),
            Stance {
                height: 0.0,
                radius: 0.5,
            },
            CharacterSettings::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CharacterError::InvalidCapsule {
                height: 0.0,
                radius: 0.5
            }
        );
    }

    #[test]
    fn world_input_is_normalized_and_clamped() {
        let mut character = character_at(Vec3::zeros());
        character.set_world_input(Vec3::new(3.0, 0.0, 4.0), 0.5);
        assert!((character.state().world_input - Vec3::new(0.3, 0.0, 0.4)).norm() < 1.0e-6);

        character.set_world_input(Vec3::x(), 7.0);
        assert!((character.state().world_input - Vec3::x()).norm() < 1.0e-6);

        character.set_world_input(Vec3::zeros(), 1.0);
        assert_eq!(character.state().world_input, Vec3::zeros());

        character.set_world_input(Vec3::new(f32::NAN, 0.0, 0.0), 1.0);
        assert_eq!(character.state().world_input, Vec3::zeros());
    }

    #[test]
    fn stance_changes_capsule_immediately() {
        let mut character = character_at(Vec3::zeros());
        let crouch = Stance {
            height: 1.0,
            radius: 0.5,
        };
        assert!(!character.set_stance(stance()));
        assert!(character.set_stance(crouch));
        assert!(character.is_stance(crouch));
        assert!((character.center() - Vec3::new(0.0, 0.5, 0.0)).norm() < 1.0e-6);

        assert!(!character.set_stance(Stance {
            height: -1.0,
            radius: 0.5
        }));
        assert!(character.is_stance(crouch));
    }

    #[test]
    fn lands_on_first_tick_over_floor() {
        let world = FlatWorld::floor(0.0);
        let mut character = character_at(Vec3::zeros());
        let mut policy = Recorder::default();

        character.tick(DT, &world, &mut policy);

        assert_eq!(character.medium(), MoveMedium::Ground);
        assert_eq!(policy.ticks, vec![MoveMedium::Air]);
        assert_eq!(policy.changes, vec![(MoveMedium::Air, MoveMedium::Ground, 0)]);
    }

    #[test]
    fn landing_resets_jump_count() {
        let world = FlatWorld::floor(0.0);
        let mut character = character_at(Vec3::new(0.0, 3.0, 0.0));
        let mut policy = Recorder::default();
        character.state_mut().jump_count = 2;

        character.tick(DT, &world, &mut policy);
        assert_eq!(character.medium(), MoveMedium::Air);
        assert_eq!(character.state().jump_count, 2);

        character.set_pose(Vec3::zeros(), Quat::identity());
        character.tick(DT, &world, &mut policy);
        assert_eq!(character.medium(), MoveMedium::Ground);
        assert_eq!(character.state().jump_count, 0);
    }

    #[test]
    fn touching_wall_resets_jump_count() {
        let world = FlatWorld::empty().with_wall(WallPlane::facing_neg_x(0.6));
        let mut character = character_at(Vec3::new(0.0, 3.0, 0.0));
        let mut policy = Recorder {
            check_walls: true,
            ..Recorder::default()
        };
        character.state_mut().jump_count = 1;

        character.tick(DT, &world, &mut policy);
        assert_eq!(character.medium(), MoveMedium::Wall);
        assert_eq!(character.state().jump_count, 0);
        assert!((character.state().wall.normal + Vec3::x()).norm() < 1.0e-6);
    }

    #[test]
    fn basic_jump_locks_air_for_configured_ticks() {
        let world = FlatWorld::floor(0.0);
        let mut character = character_at(Vec3::zeros());
        let mut policy = Recorder::default();
        character.tick(DT, &world, &mut policy);
        assert_eq!(character.medium(), MoveMedium::Ground);

        let vy = character.state().velocity.y;
        assert!(character.jump(4.0, 2, true));
        assert!((character.state().velocity.y - (vy.max(0.0) + 4.0)).abs() < 1.0e-6);
        assert_eq!(character.state().jump_count, 1);
        assert_eq!(character.medium(), MoveMedium::Air);

        // The floor keeps reading valid (the host never moved the body), yet the medium
        // stays Air for exactly `jump_lock_frames` ticks.
        let lock = character.settings().jump_lock_frames;
        for _ in 0..lock {
            character.tick(DT, &world, &mut policy);
            assert!(character.state().floor.is_valid());
            assert_eq!(character.medium(), MoveMedium::Air);
        }
        character.tick(DT, &world, &mut policy);
        assert_eq!(character.medium(), MoveMedium::Ground);
        assert_eq!(character.state().jump_count, 0);

        // The forced transition was delivered before the next policy run.
        assert!(policy.changes.contains(&(MoveMedium::Ground, MoveMedium::Air, 1)));
    }

    #[test]
    fn coyote_jump_after_walking_off_edge() {
        let platform = FlatWorld::floor(0.0).with_edge_x(0.0);
        let mut character = character_at(Vec3::new(-1.0, 0.0, 0.0));
        let mut policy = Recorder::default();

        character.tick(DT, &platform, &mut policy);
        assert_eq!(character.medium(), MoveMedium::Ground);
        assert_eq!(character.state().time_since_walked_off_edge, EDGE_TIMER_INACTIVE);

        // Origin past the edge, capsule still on it.
        character.set_pose(Vec3::new(0.2, 0.0, 0.0), Quat::identity());
        character.tick(DT, &platform, &mut policy);
        assert_eq!(character.state().time_since_walked_off_edge, 0.0);

        // Off the platform: the timer counts up for 0.2s.
        character.set_pose(Vec3::new(2.0, 0.0, 0.0), Quat::identity());
        for _ in 0..10 {
            character.tick(DT, &platform, &mut policy);
        }
        assert_eq!(character.medium(), MoveMedium::Air);
        let t = character.state().time_since_walked_off_edge;
        assert!((t - 0.2).abs() < 1.0e-4);

        assert!(character.coyote_jump(4.0, 2, true, 0.36));
        assert_eq!(character.state().jump_count, 1);
        assert_eq!(character.state().velocity.y, 4.0);
        assert_eq!(character.state().time_since_walked_off_edge, t);

        // Jumping does not stop the timer; it keeps counting while airborne.
        character.tick(DT, &platform, &mut policy);
        assert!((character.state().time_since_walked_off_edge - (t + DT)).abs() < 1.0e-5);
    }

    #[test]
    fn refused_jump_is_a_no_op() {
        let world = FlatWorld::empty();
        let mut character = character_at(Vec3::new(0.0, 5.0, 0.0));
        let mut policy = Recorder::default();
        character.tick(DT, &world, &mut policy);
        character.state_mut().jump_count = 2;

        let before = character.state().velocity;
        assert!(!character.jump(4.0, 2, true));
        assert_eq!(character.state().velocity, before);
        assert_eq!(character.state().jump_count, 2);
        assert_eq!(character.state().forced_medium_frames(), 0);
    }

    #[test]
    fn wall_jump_pushes_away_from_wall() {
        let world = FlatWorld::empty().with_wall(WallPlane::facing_neg_x(0.6));
        let mut character = character_at(Vec3::new(0.0, 3.0, 0.0));
        let mut policy = Recorder {
            check_walls: true,
            ..Recorder::default()
        };
        character.tick(DT, &world, &mut policy);
        assert_eq!(character.medium(), MoveMedium::Wall);

        let wall = character.state().wall;
        character.surface_jump(6.0, 4.0, true, &wall);
        assert_eq!(character.medium(), MoveMedium::Air);
        assert!(character.state().velocity.x < -3.9);
        assert!(character.state().velocity.y > 5.0);
        assert_eq!(character.state().jump_count, 1);
        assert!(up().dot(&character.state().velocity) > 0.0);
    }

    #[test]
    fn wall_on_other_side_is_not_detected() {
        let world = FlatWorld::empty().with_wall(WallPlane::facing_pos_x(-0.6));
        let mut character = character_at(Vec3::new(0.0, 3.0, 0.0));
        let mut policy = Recorder {
            check_walls: true,
            ..Recorder::default()
        };
        character.tick(DT, &world, &mut policy);
        assert_eq!(character.medium(), MoveMedium::Air);
    }
}
