//! Frame clock and world scroll
//!
//! The submarine stays put on screen while the world slides upward past it.
//! Every world-anchored thing (terrain, enemies, torpedo lights, the sonar
//! origin) moves up by the same amount each frame.

use crate::consts::FRAME_UNIT_MS;

/// One frame's worth of elapsed time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameDelta {
    /// Elapsed seconds
    pub secs: f32,
    /// Elapsed time in reference frame units (1.0 at ~60 fps)
    pub frames: f32,
}

impl FrameDelta {
    pub const ZERO: Self = Self {
        secs: 0.0,
        frames: 0.0,
    };

    pub fn from_secs(secs: f32) -> Self {
        let secs = secs.max(0.0);
        Self {
            secs,
            frames: secs * 1000.0 / FRAME_UNIT_MS,
        }
    }

    pub fn from_millis(ms: f32) -> Self {
        Self::from_secs(ms / 1000.0)
    }

    /// Upward world displacement for this frame
    #[inline]
    pub fn scroll(&self, scroll_speed: f32) -> f32 {
        scroll_speed * self.frames
    }
}
