//! Abyss Descent - a sonar-driven submarine descent arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (sonar, torpedoes, jellyfish, collisions, progression)
//! - `platform`: Collaborator contracts (input, audio)
//! - `persistence`: Key/value storage back-ends
//! - `save`: Meta-progression save data and upgrade shop
//! - `tuning`: Data-driven game balance

pub mod persistence;
pub mod platform;
pub mod save;
pub mod sim;
pub mod tuning;

pub use save::{SaveData, Upgrade};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Reference frame length in milliseconds; scroll and depth rates are
    /// expressed per frame unit.
    pub const FRAME_UNIT_MS: f32 = 16.66;

    /// Sonar energy bounds
    pub const MAX_ENERGY: f32 = 100.0;

    /// Player bounding box (scaled submarine sprite)
    pub const PLAYER_WIDTH: f32 = 77.0;
    pub const PLAYER_HEIGHT: f32 = 102.0;
    /// Inset of the edge sample points from the player bounding box
    pub const PLAYER_SAMPLE_INSET: f32 = 5.0;
    /// Keep the submarine this far from the top/bottom edges
    pub const PLAYER_VERTICAL_MARGIN: f32 = 50.0;

    /// Jellyfish bounding box
    pub const JELLYFISH_WIDTH: f32 = 48.0;
    pub const JELLYFISH_HEIGHT: f32 = 56.0;
    /// Jellyfish spawn keeps this far from the side edges
    pub const JELLYFISH_SPAWN_MARGIN: f32 = 150.0;
    /// Jellyfish spawn this far below the bottom edge
    pub const JELLYFISH_SPAWN_BELOW: f32 = 50.0;

    /// Torpedo collision radius while in flight
    pub const TORPEDO_RADIUS: f32 = 6.0;
    /// Torpedo sprite extent, used for the off-world check
    pub const TORPEDO_EXTENT: f32 = 12.0;

    /// Trailing sonar echo ring spacing
    pub const SONAR_ECHO_OFFSET: f32 = 20.0;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Unit vector from `from` toward `to` (zero if they coincide)
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Install the wasm32 logger and panic hook
#[cfg(target_arch = "wasm32")]
pub fn init_web_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}
