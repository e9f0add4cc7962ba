//! Demo world and scripted input for the headless driver.

use locomotion::{ColliderShapeDef, RapierQueryWorld, Vec3, WorldStaticDef};

use crate::policy::Controls;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Segment {
    /// First tick (inclusive).
    start: u32,
    /// Last tick (exclusive).
    end: u32,
    controls: Controls,
}

/// Tick-indexed controls. Overlapping segments merge: the last non-zero direction wins,
/// flags are OR-ed.
#[derive(Clone, Debug, Default)]
pub struct Script {
    segments: Vec<Segment>,
}

impl Script {
    /// Controls held for the single tick `tick` (use for jump presses).
    pub fn at(self, tick: u32, controls: Controls) -> Self {
        self.hold(tick, tick + 1, controls)
    }

    /// Controls held for ticks `start..end`.
    pub fn hold(mut self, start: u32, end: u32, controls: Controls) -> Self {
        self.segments.push(Segment {
            start,
            end,
            controls,
        });
        self
    }

    pub fn controls_at(&self, tick: u32) -> Controls {
        self.segments
            .iter()
            .filter(|s| (s.start..s.end).contains(&tick))
            .fold(Controls::default(), |mut acc, s| {
                if s.controls.direction != Vec3::zeros() {
                    acc.direction = s.controls.direction;
                }
                acc.crouch |= s.controls.crouch;
                acc.jump |= s.controls.jump;
                acc.wall_run |= s.controls.wall_run;
                acc
            })
    }

    /// Settle, walk and double-jump, wall-run along the north wall and kick off it, then
    /// crouch-walk onto the conveyor.
    pub fn demo() -> Self {
        let walk = |direction: Vec3| Controls {
            direction,
            ..Controls::default()
        };
        let jump = Controls {
            jump: true,
            ..Controls::default()
        };
        let diagonal = Vec3::new(1.0, 0.0, 1.0).normalize();

        Script::default()
            .hold(40, 120, walk(Vec3::x()))
            .at(80, jump)
            .at(95, jump)
            .hold(
                140,
                230,
                Controls {
                    direction: diagonal,
                    wall_run: true,
                    ..Controls::default()
                },
            )
            .at(170, jump)
            .at(215, jump)
            .hold(
                250,
                400,
                Controls {
                    direction: -Vec3::x(),
                    crouch: true,
                    ..Controls::default()
                },
            )
    }
}

/// Floor, a raised platform, a long wall and a conveyor strip.
pub fn demo_world() -> RapierQueryWorld {
    RapierQueryWorld::build(vec![
        WorldStaticDef::fixed(
            0,
            Vec3::new(0.0, -0.5, 0.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(30.0, 0.5, 30.0),
            },
        )
        .with_friction(0.8),
        WorldStaticDef::fixed(
            1,
            Vec3::new(10.0, 0.5, 0.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(2.0, 0.5, 2.0),
            },
        ),
        WorldStaticDef::fixed(
            2,
            Vec3::new(5.0, 3.0, 6.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(12.0, 3.0, 0.25),
            },
        )
        .with_friction(0.6),
        WorldStaticDef::fixed(
            3,
            Vec3::new(-8.0, 0.05, 0.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(3.0, 0.05, 2.0),
            },
        )
        .with_friction(1.0)
        .with_linvel(Vec3::new(0.0, 0.0, 2.0)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_merge_and_expire() {
        let script = Script::default()
            .hold(0, 10, Controls {
                direction: Vec3::x(),
                ..Controls::default()
            })
            .at(5, Controls {
                jump: true,
                ..Controls::default()
            });

        let at_5 = script.controls_at(5);
        assert_eq!(at_5.direction, Vec3::x());
        assert!(at_5.jump);

        assert!(!script.controls_at(6).jump);
        assert_eq!(script.controls_at(10), Controls::default());
    }

    #[test]
    fn demo_world_has_every_collider() {
        assert_eq!(demo_world().colliders.len(), 4);
    }
}
