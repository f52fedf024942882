//! Escape The Program - a top-down maze/quiz game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (collision, levels, game state, update rules)
//! - `platform`: Browser/native platform abstraction (input mapping, timer clock)
//! - `settings`: Player preferences

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{KeyLayout, Settings};

/// Game configuration constants
pub mod consts {
    /// Room dimensions (square)
    pub const ROOM_SIZE: i32 = 300;

    /// Player box is PLAYER_SIZE x PLAYER_SIZE
    pub const PLAYER_SIZE: i32 = 30;
    /// Distance moved per directional command
    pub const STEP: i32 = 20;
    /// Spawn / respawn point (both axes)
    pub const PLAYER_ORIGIN: i32 = 10;

    /// Lives at the start of a run
    pub const START_LIVES: u32 = 3;
    /// Countdown per life / per level, in seconds
    pub const LEVEL_TIME_SECS: u32 = 30;
    /// Seconds granted by a time power-up
    pub const TIME_BONUS_SECS: u32 = 10;

    /// Countdown tick interval (1 Hz)
    pub const COUNTDOWN_DT: f32 = 1.0;
    /// Moving obstacle tick interval (20 Hz)
    pub const MOVER_DT: f32 = 0.05;
    /// Maximum catch-up ticks per clock per frame
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Exit door size
    pub const EXIT_SIZE: i32 = 32;
    /// Keep-out margin from the room walls for the randomized exit
    pub const EXIT_MARGIN: i32 = 40;
    /// Code that unlocks a door once its power-ups are collected
    pub const UNLOCK_CODE: &str = "unlockDoor()";

    /// Power-up box size
    pub const POWERUP_SIZE: i32 = 26;
}

/// Clamp a player coordinate so the player box stays inside the room
#[inline]
pub fn clamp_to_room(v: i32) -> i32 {
    v.clamp(0, consts::ROOM_SIZE - consts::PLAYER_SIZE)
}
