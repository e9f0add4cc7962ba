//! Rapier-based query world for character surface detection.
//!
//! This module builds an in-memory Rapier scene from a set of collider definitions and
//! exposes it to the controller through [`CollisionQuery`].
//!
//! Design goals
//! - Deterministic: given the same inputs (sorted by `id`), build identical in-memory sets.
//! - Query-focused: supports the controller's sweeps/rays and Rapier's
//!   `KinematicCharacterController`.
//! - Platforms may carry a constant linear velocity; everything else is fixed.

use rapier3d::na::Translation3;
use rapier3d::parry::query::{Ray, ShapeCastOptions};
use rapier3d::prelude::*;

use super::CollisionQuery;
use crate::types::{Hit, Quat, Vec3};

/// Marks colliders built with an explicit material friction.
const MATERIAL_FLAG: u128 = 1;

/// Canonical definition of a world collider.
///
/// Conventions
/// - Units are meters.
/// - Rotation is a unit quaternion.
/// - For planes, the normal is pose-derived: `normal = rotation * +Y`.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    /// World-space translation.
    pub translation: Vec3,
    /// World-space rotation (unit quaternion).
    pub rotation: Quat,
    /// Collider shape parameters.
    pub shape: ColliderShapeDef,
    /// Static friction of the attached material. `None` means no material.
    pub friction: Option<f32>,
    /// Constant linear velocity (m/s). Non-zero makes the collider a moving platform.
    pub linvel: Vec3,
}

impl WorldStaticDef {
    /// A fixed collider without material.
    pub fn fixed(id: u32, translation: Vec3, shape: ColliderShapeDef) -> Self {
        Self {
            id,
            translation,
            rotation: Quat::identity(),
            shape,
            friction: None,
            linvel: Vec3::zeros(),
        }
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = Some(friction);
        self
    }

    pub fn with_linvel(mut self, linvel: Vec3) -> Self {
        self.linvel = linvel;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Supported collider shapes.
///
/// Keep this intentionally small and deterministic. Extend as needed.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space), offset along its pose-derived normal.
    Plane {
        /// Offset along the plane normal (meters).
        offset_along_normal: f32,
    },

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vec3 },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },
}

/// In-memory Rapier structures needed for scene queries against the world.
///
/// For immutable statics, these can be built once at startup and reused.
pub struct RapierQueryWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
}

impl RapierQueryWorld {
    /// Build a query world from a list of collider definitions.
    ///
    /// Determinism
    /// - The input is sorted by `id` before insertion.
    /// - Any NaN/invalid values should be filtered/validated by the caller.
    pub fn build(mut defs: Vec<WorldStaticDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for def in defs.into_iter() {
            let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);

            let rb = if def.linvel == Vec3::zeros() {
                RigidBodyBuilder::fixed().pose(iso).build()
            } else {
                RigidBodyBuilder::kinematic_velocity_based()
                    .pose(iso)
                    .linvel(def.linvel)
                    .build()
            };
            let rb_handle = bodies.insert(rb);

            let collider = collider_from_def(&def);
            colliders.insert_with_parent(collider, rb_handle, &mut bodies);
        }

        // Collision-detection only (no dynamics): updates the broad-phase BVH and the
        // narrow-phase so queries can run.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();

        let hooks = ();
        let events = ();

        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &hooks,
            &events,
        );

        log::debug!("built rapier query world with {} colliders", colliders.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
        }
    }

    /// Create a borrowed `QueryPipeline` view suitable for scene queries and KCC.
    ///
    /// Filters
    /// - Provide a `QueryFilter` to exclude things (e.g., the character collider if you insert it
    ///   into the same scene as the statics).
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    /// Controller-facing view of this world.
    pub fn query<'a>(&'a self, filter: QueryFilter<'a>) -> RapierQuery<'a> {
        RapierQuery {
            world: self,
            pipeline: self.query_pipeline(filter),
        }
    }
}

/// [`CollisionQuery`] over a [`RapierQueryWorld`].
pub struct RapierQuery<'a> {
    world: &'a RapierQueryWorld,
    pipeline: QueryPipeline<'a>,
}

impl RapierQuery<'_> {
    pub fn pipeline(&self) -> &QueryPipeline<'_> {
        &self.pipeline
    }

    /// Resolve collider-side data (material friction, surface velocity) for a hit.
    fn resolve(
        &self,
        handle: ColliderHandle,
        point: Point<Real>,
        normal: Vec3,
        distance: f32,
    ) -> Hit {
        let collider = self.world.colliders.get(handle);

        let friction = collider
            .filter(|c| c.user_data & MATERIAL_FLAG != 0)
            .map(|c| c.friction());

        let velocity = collider
            .and_then(|c| c.parent())
            .and_then(|parent| self.world.bodies.get(parent))
            .map(|body| body.velocity_at_point(&point))
            .unwrap_or_else(Vec3::zeros);

        Hit {
            point: point.coords,
            normal,
            distance,
            friction,
            velocity,
        }
    }

    fn cast(
        &self,
        shape: &dyn Shape,
        pose: Isometry<Real>,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<Hit> {
        let opts = ShapeCastOptions::with_max_time_of_impact(max_distance);
        // `direction` is unit length, so time of impact is a distance.
        let (handle, hit) = self.pipeline.cast_shape(&pose, &direction, shape, opts)?;

        // witness1/normal1 refer to the world collider and are in world space.
        Some(self.resolve(
            handle,
            hit.witness1,
            hit.normal1.into_inner(),
            hit.time_of_impact,
        ))
    }
}

impl CollisionQuery for RapierQuery<'_> {
    fn sweep_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<Hit> {
        let pose = Isometry::from_parts(Translation3::from(origin), Quat::identity());
        self.cast(&Ball::new(radius), pose, direction, max_distance)
    }

    fn sweep_box(
        &self,
        origin: Vec3,
        half_extents: Vec3,
        direction: Vec3,
        orientation: Quat,
        max_distance: f32,
    ) -> Option<Hit> {
        let pose = Isometry::from_parts(Translation3::from(origin), orientation);
        self.cast(&Cuboid::new(half_extents), pose, direction, max_distance)
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Hit> {
        let ray = Ray::new(Point::from(origin), direction);
        let (handle, hit) = self
            .pipeline
            .cast_ray_and_get_normal(&ray, max_distance, true)?;

        Some(self.resolve(
            handle,
            ray.point_at(hit.time_of_impact),
            hit.normal,
            hit.time_of_impact,
        ))
    }
}

/// Build a Rapier collider from a `WorldStaticDef`.
///
/// This uses the pose stored on the rigid-body as the collider parent transform.
/// So the collider is created with identity local transform.
fn collider_from_def(def: &WorldStaticDef) -> Collider {
    let builder = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // The parent body already carries the pose, so the half-space only needs the
            // offset along its local +Y normal.
            ColliderBuilder::new(SharedShape::new(HalfSpace::new(Vector::y_axis())))
                .translation(Vector::y() * *offset_along_normal)
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),
    };

    match def.friction {
        Some(friction) => builder.friction(friction).user_data(MATERIAL_FLAG).build(),
        None => builder.build(),
    }
}
