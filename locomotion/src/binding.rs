/*!
Bind a [`Character`] to a Rapier rigid body carrying a Y-aligned capsule collider.

Rapier places the capsule center at the body translation; the character origin is the
capsule bottom. [`Character::from_rapier`] and [`Character::write_to_rapier`] convert between
the two.
*/

use rapier3d::prelude::*;

use crate::{
    character::Character,
    error::CharacterError,
    settings::CharacterSettings,
    types::{Capsule, Stance, Vec3},
};

/// Handle of the first capsule collider attached to `handle`, with its stance.
fn find_capsule(
    bodies: &RigidBodySet,
    colliders: &ColliderSet,
    handle: RigidBodyHandle,
) -> Result<(ColliderHandle, Stance), CharacterError> {
    let body = bodies
        .get(handle)
        .ok_or(CharacterError::MissingRigidBody(handle))?;

    body.colliders()
        .iter()
        .find_map(|&collider_handle| {
            let capsule = colliders.get(collider_handle)?.shape().as_capsule()?;
            let stance = Stance {
                height: 2.0 * (capsule.half_height() + capsule.radius),
                radius: capsule.radius,
            };
            Some((collider_handle, stance))
        })
        .ok_or(CharacterError::MissingCapsuleCollider(handle))
}

impl Character {
    /// Create a character from a body's pose and its capsule collider.
    pub fn from_rapier(
        bodies: &RigidBodySet,
        colliders: &ColliderSet,
        handle: RigidBodyHandle,
        settings: CharacterSettings,
    ) -> Result<Self, CharacterError> {
        let (_, stance) = find_capsule(bodies, colliders, handle)?;
        let body = bodies
            .get(handle)
            .ok_or(CharacterError::MissingRigidBody(handle))?;

        let center: Vec3 = *body.translation();
        let origin = center - Capsule::from(stance).center_offset();

        let mut character = Character::new(origin, *body.rotation(), stance, settings)?;
        character.state_mut().velocity = *body.linvel();
        Ok(character)
    }

    /// Read the body pose back after the physics step moved it.
    pub fn sync_from_rapier(
        &mut self,
        bodies: &RigidBodySet,
        handle: RigidBodyHandle,
    ) -> Result<(), CharacterError> {
        let body = bodies
            .get(handle)
            .ok_or(CharacterError::MissingRigidBody(handle))?;
        let origin = *body.translation() - self.capsule().center_offset();
        self.set_pose(origin, *body.rotation());
        Ok(())
    }

    /// Push velocity, pose and the current capsule shape to the body and its collider.
    pub fn write_to_rapier(
        &self,
        bodies: &mut RigidBodySet,
        colliders: &mut ColliderSet,
        handle: RigidBodyHandle,
    ) -> Result<(), CharacterError> {
        let (collider_handle, stance) = find_capsule(bodies, colliders, handle)?;

        let body = bodies
            .get_mut(handle)
            .ok_or(CharacterError::MissingRigidBody(handle))?;
        body.set_linvel(self.state().velocity, true);
        body.set_translation(self.center(), true);
        body.set_rotation(self.state().rotation, true);

        let capsule = self.capsule();
        if stance != capsule.stance() {
            if let Some(collider) = colliders.get_mut(collider_handle) {
                collider.set_shape(SharedShape::capsule_y(capsule.half_segment(), capsule.radius));
            }
        }
        Ok(())
    }
}
