use rapier3d::prelude::RigidBodyHandle;
use thiserror::Error;

/// Setup-time misconfiguration. Nothing in the per-tick path returns an error.
#[derive(Debug, Error, PartialEq)]
pub enum CharacterError {
    #[error("invalid capsule: height {height} and radius {radius} must be positive and finite")]
    InvalidCapsule { height: f32, radius: f32 },

    #[error("rigid body {0:?} not found")]
    MissingRigidBody(RigidBodyHandle),

    #[error("rigid body {0:?} has no capsule collider attached")]
    MissingCapsuleCollider(RigidBodyHandle),
}
