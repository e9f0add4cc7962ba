/*!
Character controller settings and tolerances.

These constants centralize the parameters used by surface detection, the velocity
integrator and the jump lock. Keeping them together makes tuning easier and keeps
the per-tick behavior deterministic across platforms.

Notes
- Distances are in meters, time in seconds.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
- Per-character overrides live in [`CharacterSettings`]; the constants are its defaults.
*/

/// Lower bound for any surface friction (unitless).
/// Keeps acceleration and drag from collapsing to zero on very slippery materials.
pub const MIN_FRICTION: f32 = 0.05;

/// Friction used when a surface has no material attached.
pub const FALLBACK_FRICTION: f32 = 1.0;

/// Max distance below the capsule bottom at which a floor still counts (meters).
pub const MAX_FLOOR_DISTANCE: f32 = 0.1;

/// Small offset applied to query origins (meters).
/// Sweeps start inside this margin so surfaces already touching the capsule are not
/// missed by the initial-overlap blind spot of shape casts.
pub const QUERY_EPSILON: f32 = 0.01;

/// Number of ticks a jump keeps the medium locked to `Air`.
/// Suppresses the floor query of the jump tick from immediately re-grounding.
pub const JUMP_LOCK_FRAMES: u32 = 3;

/// Default fixed timestep (seconds).
pub const DEFAULT_FIXED_DT: f32 = 1.0 / 50.0;

/// Per-character detector and lock parameters.
///
/// Construct with struct-update syntax to override a subset:
/// ```
/// use locomotion::CharacterSettings;
/// let settings = CharacterSettings {
///     max_floor_distance: 0.2,
///     ..CharacterSettings::default()
/// };
/// assert_eq!(settings.jump_lock_frames, 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterSettings {
    /// See [`MAX_FLOOR_DISTANCE`].
    pub max_floor_distance: f32,
    /// See [`QUERY_EPSILON`].
    pub query_epsilon: f32,
    /// See [`JUMP_LOCK_FRAMES`].
    pub jump_lock_frames: u32,
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self {
            max_floor_distance: MAX_FLOOR_DISTANCE,
            query_epsilon: QUERY_EPSILON,
            jump_lock_frames: JUMP_LOCK_FRAMES,
        }
    }
}
