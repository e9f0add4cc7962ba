/*!
Headless fixed-timestep driver.

Each step:
1. Feed the scripted controls to the policy and the character input.
2. Run `Character::tick` against the static query world.
3. Move the capsule by `velocity * dt` through Rapier's `KinematicCharacterController`.
4. Write the corrected pose back to the character body and the character.

The character body lives in its own `RigidBodySet` so scene queries never see it.
*/

use locomotion::{
    Capsule, Character, CharacterError, CharacterSettings, MoveMedium, RapierQueryWorld, Vec3,
};
use rapier3d::{
    control::{CharacterAutostep, CharacterLength, KinematicCharacterController},
    na::{Translation3, UnitQuaternion, Vector3},
    prelude::*,
};

use crate::{
    policy::{PolicyStats, ReferencePolicy},
    scenario::Script,
};

/// Yaw (radians) facing a horizontal direction; `None` for near-zero input.
fn yaw_from_xz(x: f32, z: f32) -> Option<f32> {
    const YAW_EPS: f32 = 1.0e-6;
    (x * x + z * z > YAW_EPS).then(|| (-x).atan2(-z))
}

/// Counters collected over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u32,
    pub ground_ticks: u32,
    pub air_ticks: u32,
    pub wall_ticks: u32,
    pub max_height: f32,
    pub final_position: Vec3,
    pub policy: PolicyStats,
}

pub struct Sim {
    pub world: RapierQueryWorld,
    pub character: Character,
    pub policy: ReferencePolicy,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    body: RigidBodyHandle,
    kcc: KinematicCharacterController,
    dt: f32,
    tick: u32,
}

impl Sim {
    /// Spawn a character body with its capsule center at `spawn_center`.
    pub fn new(
        world: RapierQueryWorld,
        policy: ReferencePolicy,
        spawn_center: Vec3,
        settings: CharacterSettings,
        dt: f32,
    ) -> Result<Self, CharacterError> {
        let stance = policy.tuning.stand_stance;
        let half_segment = Capsule::from(stance).half_segment();

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let body = bodies.insert(
            RigidBodyBuilder::kinematic_position_based()
                .translation(spawn_center)
                .build(),
        );
        colliders.insert_with_parent(
            ColliderBuilder::capsule_y(half_segment, stance.radius),
            body,
            &mut bodies,
        );

        let character = Character::from_rapier(&bodies, &colliders, body, settings)?;

        let kcc = KinematicCharacterController {
            autostep: Some(CharacterAutostep {
                include_dynamic_bodies: false,
                max_height: CharacterLength::Relative(0.3),
                ..CharacterAutostep::default()
            }),
            offset: CharacterLength::Relative(0.025),
            // Ground adhesion is the controller's job (floor distance and coyote time).
            snap_to_ground: None,
            ..KinematicCharacterController::default()
        };

        Ok(Self {
            world,
            character,
            policy,
            bodies,
            colliders,
            body,
            kcc,
            dt,
            tick: 0,
        })
    }

    /// Advance one fixed tick and return the medium the character ended in.
    pub fn step(&mut self, script: &Script) -> Result<MoveMedium, CharacterError> {
        let controls = script.controls_at(self.tick);
        self.policy.controls.direction = controls.direction;
        self.policy.controls.crouch = controls.crouch;
        self.policy.controls.wall_run = controls.wall_run;
        self.policy.controls.jump |= controls.jump;

        let direction = Vec3::new(controls.direction.x, 0.0, controls.direction.z);
        self.character.set_world_input(direction, direction.norm());
        if let Some(yaw) = yaw_from_xz(direction.x, direction.z) {
            let position = self.character.state().position;
            self.character
                .set_pose(position, UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw));
        }

        let query = self.world.query(QueryFilter::default());
        self.character.tick(self.dt, &query, &mut self.policy);

        self.character
            .write_to_rapier(&mut self.bodies, &mut self.colliders, self.body)?;

        let capsule = self.character.capsule();
        let shape = rapier3d::prelude::Capsule::new_y(capsule.half_segment(), capsule.radius);
        let body = &self.bodies[self.body];
        let pose = Isometry::from_parts(Translation3::from(*body.translation()), *body.rotation());
        let desired = self.character.state().velocity * self.dt;

        let correction = self.kcc.move_shape(
            self.dt,
            query.pipeline(),
            &shape,
            &pose,
            desired,
            |_| {},
        );

        let center = pose.translation.vector + correction.translation;
        self.bodies[self.body].set_translation(center, true);
        self.character.sync_from_rapier(&self.bodies, self.body)?;

        // The controller owns velocity; only cancel what the sweep refused.
        let state = self.character.state_mut();
        if correction.grounded && state.velocity.y < 0.0 {
            state.velocity.y = 0.0;
        }

        self.tick += 1;
        log::trace!(
            "tick {} {:?} pos ({:.2}, {:.2}, {:.2})",
            self.tick,
            self.character.medium(),
            self.character.state().position.x,
            self.character.state().position.y,
            self.character.state().position.z
        );
        Ok(self.character.medium())
    }

    /// Run `ticks` steps of `script`.
    pub fn run(&mut self, script: &Script, ticks: u32) -> Result<RunSummary, CharacterError> {
        let mut summary = RunSummary {
            max_height: self.character.state().position.y,
            ..RunSummary::default()
        };

        for _ in 0..ticks {
            match self.step(script)? {
                MoveMedium::Ground => summary.ground_ticks += 1,
                MoveMedium::Air => summary.air_ticks += 1,
                MoveMedium::Wall => summary.wall_ticks += 1,
            }
            summary.ticks += 1;
            summary.max_height = summary.max_height.max(self.character.state().position.y);
        }

        summary.final_position = self.character.state().position;
        summary.policy = self.policy.stats;
        Ok(summary)
    }
}
