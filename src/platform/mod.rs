//! Collaborator contracts
//!
//! The simulation never polls devices or plays sounds itself. The host
//! gathers one [`TickInput`] per frame and forwards sound events to an
//! [`AudioSink`].

use glam::Vec2;

use crate::sim::events::{RunEvent, SoundKey};

/// Player input for one frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Steering axis, each component in [-1, 1]
    pub movement: Vec2,
    /// Fire the selected torpedo toward this world point
    pub fire_target: Option<Vec2>,
    /// Sonar button pressed
    pub sonar: bool,
    /// Pause button pressed (toggles the pause menu)
    pub pause: bool,
    /// Raw mouse-wheel delta
    pub weapon_scroll: f32,
    /// Discrete weapon steps (gamepad shoulders), applied immediately
    pub weapon_step: i32,
}

/// Fire-and-forget audio playback
pub trait AudioSink {
    fn play(&mut self, sound: SoundKey);
}

/// Discards every sound (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _sound: SoundKey) {}
}

/// Forward the sound events of a frame
pub fn play_sounds(audio: &mut dyn AudioSink, events: &[RunEvent]) {
    for event in events {
        if let RunEvent::Sound(sound) = event {
            audio.play(*sound);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<SoundKey>);

    impl AudioSink for Recorder {
        fn play(&mut self, sound: SoundKey) {
            self.0.push(sound);
        }
    }

    #[test]
    fn test_only_sound_events_are_played() {
        let mut audio = Recorder::default();
        play_sounds(
            &mut audio,
            &[
                RunEvent::Sound(SoundKey::SonarPing),
                RunEvent::TerrainRevealed,
                RunEvent::Sound(SoundKey::TorpedoLaunch),
            ],
        );
        assert_eq!(audio.0, vec![SoundKey::SonarPing, SoundKey::TorpedoLaunch]);
    }
}
