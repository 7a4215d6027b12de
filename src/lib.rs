//! Duck Hunt - a hand-tracked shooting gallery
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (targets, cursor, hit resolution)
//! - `session`: Score, rounds, misses and difficulty
//! - `input`: Validated hand-tracking samples and the pinch trigger
//! - `commentary`: Roast requests, rate limiting, timeouts and fallbacks
//! - `game`: Per-frame orchestration of all of the above
//! - `renderer`: Canvas 2D draw lists
//! - `platform`: Browser/native clocks, timers and speech

pub mod commentary;
pub mod game;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use game::{Game, HudSnapshot};
pub use session::{Difficulty, Session, TauntLevel, calculate_score, taunt_level};
pub use settings::Settings;

/// Game configuration constants
///
/// All positions and velocities are in normalized screen units (0..1, origin
/// top-left); velocities are per rendered frame.
pub mod consts {
    /// Cursor smoothing factor, applied once per frame
    pub const CURSOR_SMOOTHING: f32 = 0.25;
    /// Cursor position before the first aim sample arrives
    pub const CURSOR_START: (f32, f32) = (0.5, 0.5);

    /// Spawn x for targets entering from the left / right
    pub const SPAWN_LEFT_X: f32 = 0.10;
    pub const SPAWN_RIGHT_X: f32 = 0.90;
    /// Spawn height range
    pub const SPAWN_Y_MIN: f32 = 0.60;
    pub const SPAWN_Y_SPREAD: f32 = 0.20;
    /// Horizontal speed: base + per-round increment
    pub const BASE_SPEED: f32 = 0.002;
    pub const SPEED_PER_ROUND: f32 = 0.0003;
    /// Climb speed: min + random spread
    pub const CLIMB_SPEED_MIN: f32 = 0.003;
    pub const CLIMB_SPEED_SPREAD: f32 = 0.003;

    /// Side walls and ceiling targets bounce off
    pub const WALL_LEFT: f32 = 0.05;
    pub const WALL_RIGHT: f32 = 0.95;
    pub const CEILING: f32 = 0.10;
    /// Downward pull on flying targets
    pub const FLIGHT_GRAVITY: f32 = 0.00005;
    /// Flying targets below this have escaped
    pub const ESCAPE_Y: f32 = 1.0;

    /// Initial fall speed after a hit
    pub const FALL_START_SPEED: f32 = 0.015;
    /// Downward pull on falling targets
    pub const FALL_GRAVITY: f32 = 0.0008;
    /// Falling targets below this are removed
    pub const FALL_OUT_Y: f32 = 1.2;

    /// Wing animation: frames in the cycle and ticks per frame
    pub const WING_FRAMES: u8 = 4;
    pub const TICKS_PER_WING_FRAME: u32 = 8;
    /// Sprite frame shown while falling
    pub const FALLING_FRAME: u8 = 2;

    /// Shots closer than this to a flying target hit it
    pub const HIT_RADIUS: f32 = 0.08;
    /// Hits closer than this count as headshots
    pub const HEADSHOT_RADIUS: f32 = 0.025;

    /// Points for a hit in round 1
    pub const BASE_POINTS: u64 = 100;
    /// Flat headshot bonus
    pub const HEADSHOT_BONUS: u64 = 50;
}
