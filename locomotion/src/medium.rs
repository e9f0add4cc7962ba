use crate::types::{MoveMedium, Surface};

/// A committed medium change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MediumTransition {
    pub from: MoveMedium,
    pub to: MoveMedium,
}

/// Pick the medium the current surfaces support.
///
/// Ground wins over Wall, Wall over Air.
#[inline]
pub fn resolve_medium(floor: &Surface, wall: &Surface) -> MoveMedium {
    if floor.is_valid() {
        MoveMedium::Ground
    } else if wall.is_valid() {
        MoveMedium::Wall
    } else {
        MoveMedium::Air
    }
}

/// Active medium plus the forced-duration lock.
///
/// While `forced_frames > 0`, proposals are discarded and the counter ticks down by one
/// per proposal. Forcing bypasses the lock for its own assignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MediumState {
    current: MoveMedium,
    forced_frames: u32,
}

impl MediumState {
    pub fn new(initial: MoveMedium) -> Self {
        Self {
            current: initial,
            forced_frames: 0,
        }
    }

    #[inline]
    pub fn current(&self) -> MoveMedium {
        self.current
    }

    #[inline]
    pub fn forced_frames(&self) -> u32 {
        self.forced_frames
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.forced_frames > 0
    }

    /// Offer this tick's medium. Returns the transition if it was committed and changed
    /// the medium.
    pub fn propose(&mut self, proposed: MoveMedium) -> Option<MediumTransition> {
        if self.is_locked() {
            self.forced_frames -= 1;
            return None;
        }
        self.commit(proposed)
    }

    /// Assign `medium` now and lock it for the next `frames` proposals.
    pub fn force(&mut self, medium: MoveMedium, frames: u32) -> Option<MediumTransition> {
        let transition = self.commit(medium);
        self.forced_frames = frames;
        transition
    }

    fn commit(&mut self, medium: MoveMedium) -> Option<MediumTransition> {
        if medium == self.current {
            return None;
        }
        let transition = MediumTransition {
            from: self.current,
            to: medium,
        };
        self.current = medium;
        Some(transition)
    }
}
