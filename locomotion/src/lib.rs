/*!
Character-movement core: surface detection, velocity integration, jumps and the
Ground/Air/Wall medium state machine, driven once per fixed tick by a pluggable
[`MovementPolicy`].

The crate performs no geometry of its own. Scene queries go through [`CollisionQuery`];
[`RapierQueryWorld`] implements it over a Rapier scene.
*/

pub mod binding;
pub mod character;
pub mod error;
pub mod integrator;
pub mod jump;
pub mod medium;
pub mod query;
pub mod settings;
pub mod state;
pub mod surface;
pub mod types;

#[cfg(test)]
mod testing;

pub use character::{Character, MovementPolicy, TickContext};
pub use error::CharacterError;
pub use jump::can_coyote_jump;
pub use medium::{MediumState, MediumTransition, resolve_medium};
pub use query::{
    CollisionQuery, ColliderShapeDef, RapierQuery, RapierQueryWorld, WorldStaticDef,
};
pub use settings::{CharacterSettings, DEFAULT_FIXED_DT};
pub use state::CharacterState;
pub use surface::{EDGE_TIMER_INACTIVE, SurfaceDetector, WallCheck};
pub use types::{Capsule, Gait, Hit, MoveMedium, Quat, Stance, Surface, Vec3, up};
