//! Analytic collision fake for unit tests.
//!
//! A horizontal floor (optionally ending at an edge along +X) plus vertical walls
//! perpendicular to X. Sphere sweeps and rays see the floor, box sweeps and rays see
//! the walls. That is all the detector needs and keeps results exact.

use crate::{
    query::CollisionQuery,
    types::{Hit, Quat, Vec3, up},
};

#[derive(Clone, Copy, Debug)]
struct Floor {
    height: f32,
    /// The floor covers `x <= edge_x`.
    edge_x: f32,
}

/// Vertical plane `x = x` with normal `(facing, 0, 0)`.
#[derive(Clone, Copy, Debug)]
pub struct WallPlane {
    pub x: f32,
    pub facing: f32,
}

impl WallPlane {
    pub fn facing_neg_x(x: f32) -> Self {
        Self { x, facing: -1.0 }
    }

    pub fn facing_pos_x(x: f32) -> Self {
        Self { x, facing: 1.0 }
    }

    fn normal(&self) -> Vec3 {
        Vec3::new(self.facing, 0.0, 0.0)
    }

    /// Distance along `direction` until a point `extent` in front of `origin` reaches the plane.
    fn approach(&self, origin: Vec3, extent: f32, direction: Vec3) -> Option<f32> {
        let in_front = (origin.x - self.x) * self.facing;
        let closing = -direction.x * self.facing;
        if in_front < 0.0 || closing <= 0.0 {
            return None;
        }
        Some(((in_front - extent) / closing).max(0.0))
    }
}

#[derive(Clone, Debug, Default)]
pub struct FlatWorld {
    floor: Option<Floor>,
    walls: Vec<WallPlane>,
    friction: Option<f32>,
    velocity: Vec3,
}

impl FlatWorld {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn floor(height: f32) -> Self {
        Self {
            floor: Some(Floor {
                height,
                edge_x: f32::INFINITY,
            }),
            ..Self::default()
        }
    }

    pub fn with_edge_x(mut self, edge_x: f32) -> Self {
        if let Some(floor) = self.floor.as_mut() {
            floor.edge_x = edge_x;
        }
        self
    }

    pub fn with_wall(mut self, wall: WallPlane) -> Self {
        self.walls.push(wall);
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = Some(friction);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    fn hit(&self, point: Vec3, normal: Vec3, distance: f32) -> Hit {
        Hit {
            point,
            normal,
            distance,
            friction: self.friction,
            velocity: self.velocity,
        }
    }

    fn nearest(hits: impl Iterator<Item = Hit>) -> Option<Hit> {
        hits.min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

impl CollisionQuery for FlatWorld {
    fn sweep_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<Hit> {
        let floor = self.floor?;
        if direction.y >= 0.0 {
            return None;
        }
        let descent = -direction.y;

        // Flat part: the lowest point of the sphere lands on the floor.
        let bottom_gap = origin.y - radius - floor.height;
        let t = (bottom_gap / descent).max(0.0);
        let contact = origin + direction * t - up() * radius;
        if contact.x <= floor.edge_x {
            return (t <= max_distance).then(|| self.hit(contact, up(), t));
        }

        // Past the edge: the sphere can still rest on the edge line.
        let dx = origin.x - floor.edge_x;
        if dx >= radius {
            return None;
        }
        let rest_height = floor.height + (radius * radius - dx * dx).sqrt();
        let t = ((origin.y - rest_height) / descent).max(0.0);
        if t > max_distance {
            return None;
        }
        let corner = Vec3::new(floor.edge_x, floor.height, origin.z);
        let center = origin + direction * t;
        let normal = (center - corner) / radius;
        Some(self.hit(corner, normal, t))
    }

    fn sweep_box(
        &self,
        origin: Vec3,
        half_extents: Vec3,
        direction: Vec3,
        orientation: Quat,
        max_distance: f32,
    ) -> Option<Hit> {
        // Half-width of the oriented box along X.
        let rot = orientation.to_rotation_matrix();
        let extent = (0..3)
            .map(|i| rot.matrix()[(0, i)].abs() * half_extents[i])
            .sum::<f32>();

        Self::nearest(self.walls.iter().filter_map(|wall| {
            let t = wall.approach(origin, extent, direction)?;
            if t > max_distance {
                return None;
            }
            let center = origin + direction * t;
            let point = Vec3::new(wall.x, center.y, center.z);
            Some(self.hit(point, wall.normal(), t))
        }))
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Hit> {
        let floor_hit = self.floor.and_then(|floor| {
            if direction.y >= 0.0 {
                return None;
            }
            let t = (origin.y - floor.height) / -direction.y;
            let point = origin + direction * t;
            (t >= 0.0 && t <= max_distance && point.x <= floor.edge_x)
                .then(|| self.hit(point, up(), t))
        });

        let wall_hits = self.walls.iter().filter_map(|wall| {
            let t = wall.approach(origin, 0.0, direction)?;
            (t <= max_distance).then(|| self.hit(origin + direction * t, wall.normal(), t))
        });

        Self::nearest(floor_hit.into_iter().chain(wall_hits))
    }
}
