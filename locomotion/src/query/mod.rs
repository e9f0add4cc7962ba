/*!
Collision query boundary.

The controller never performs geometry itself. Everything it needs from the
collision engine goes through [`CollisionQuery`]:

- `sweep_sphere`: floor detection under the capsule
- `sweep_box`:    wall detection around the capsule
- `raycast`:      floor normal refinement and edge probing

All directions passed in are unit length and all distances are non-negative; the
callers in this crate guarantee both. Implementations resolve collider and material
references into the plain [`Hit`] fields (friction, surface velocity).

`rapier_world` provides the rapier-backed implementation.
*/

pub mod rapier_world;

pub use rapier_world::{ColliderShapeDef, RapierQuery, RapierQueryWorld, WorldStaticDef};

use crate::types::{Hit, Quat, Vec3};

/// Scene queries consumed by the character controller.
pub trait CollisionQuery {
    /// Sweep a sphere of `radius` from `origin` along `direction` for at most `max_distance`.
    fn sweep_sphere(&self, origin: Vec3, radius: f32, direction: Vec3, max_distance: f32)
    -> Option<Hit>;

    /// Sweep an oriented box from `origin` along `direction` for at most `max_distance`.
    fn sweep_box(
        &self,
        origin: Vec3,
        half_extents: Vec3,
        direction: Vec3,
        orientation: Quat,
        max_distance: f32,
    ) -> Option<Hit>;

    /// Cast a ray from `origin` along `direction` for at most `max_distance`.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Hit>;
}

impl<T: CollisionQuery + ?Sized> CollisionQuery for &T {
    #[inline]
    fn sweep_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<Hit> {
        (**self).sweep_sphere(origin, radius, direction, max_distance)
    }

    #[inline]
    fn sweep_box(
        &self,
        origin: Vec3,
        half_extents: Vec3,
        direction: Vec3,
        orientation: Quat,
        max_distance: f32,
    ) -> Option<Hit> {
        (**self).sweep_box(origin, half_extents, direction, orientation, max_distance)
    }

    #[inline]
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Hit> {
        (**self).raycast(origin, direction, max_distance)
    }
}
