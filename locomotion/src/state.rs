use crate::{
    medium::{MediumState, MediumTransition},
    settings::JUMP_LOCK_FRAMES,
    surface::EDGE_TIMER_INACTIVE,
    types::{MoveMedium, Quat, Surface, Vec3},
};

/// Per-character simulation state, mutated once per tick.
///
/// `velocity` is shared with the host's rigid body: the controller reads and writes it,
/// the host integrates position from it and writes `position`/`rotation` back.
#[derive(Clone, Debug)]
pub struct CharacterState {
    /// Character origin (bottom of the capsule).
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    /// Jumps taken since the character last entered Ground or Wall.
    pub jump_count: u32,
    /// `-1` inactive, `0` standing on a floor edge, `> 0` seconds since walking off one.
    pub time_since_walked_off_edge: f32,
    /// Normalized input direction times magnitude in `[0, 1]`.
    pub world_input: Vec3,
    /// Floor found this tick (or `Surface::INVALID`).
    pub floor: Surface,
    /// Last wall found by a wall query (or `Surface::INVALID`).
    pub wall: Surface,
    medium: MediumState,
    jump_lock_frames: u32,
    /// Committed transitions not yet delivered to the movement policy.
    ///
    /// Drained by every `Character::tick`. Only actual medium changes are queued, so
    /// repeated jumps between two ticks add one entry at most; hosts calling
    /// `force_medium` with alternating media must tick in between to keep it short.
    pending: Vec<MediumTransition>,
}

impl CharacterState {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            velocity: Vec3::zeros(),
            jump_count: 0,
            time_since_walked_off_edge: EDGE_TIMER_INACTIVE,
            world_input: Vec3::zeros(),
            floor: Surface::INVALID,
            wall: Surface::INVALID,
            medium: MediumState::default(),
            jump_lock_frames: JUMP_LOCK_FRAMES,
            pending: Vec::with_capacity(4),
        }
    }

    pub fn with_jump_lock_frames(mut self, frames: u32) -> Self {
        self.jump_lock_frames = frames;
        self
    }

    #[inline]
    pub fn medium(&self) -> MoveMedium {
        self.medium.current()
    }

    #[inline]
    pub fn forced_medium_frames(&self) -> u32 {
        self.medium.forced_frames()
    }

    #[inline]
    pub fn jump_lock_frames(&self) -> u32 {
        self.jump_lock_frames
    }

    /// Assign `medium` immediately, bypassing and then restarting the lock.
    ///
    /// The resulting transition is delivered to the policy on the next tick.
    pub fn force_medium(&mut self, medium: MoveMedium) {
        let transition = self.medium.force(medium, self.jump_lock_frames);
        self.record(transition);
    }

    /// Offer the medium a policy resolved this tick; discarded while locked.
    pub(crate) fn propose_medium(&mut self, medium: MoveMedium) {
        let transition = self.medium.propose(medium);
        self.record(transition);
    }

    pub(crate) fn take_transitions(&mut self) -> Vec<MediumTransition> {
        std::mem::take(&mut self.pending)
    }

    fn record(&mut self, transition: Option<MediumTransition>) {
        let Some(transition) = transition else {
            return;
        };
        if transition.to.restores_jumps() {
            self.jump_count = 0;
        }
        log::debug!("medium {:?} -> {:?}", transition.from, transition.to);
        self.pending.push(transition);
    }
}
