//! Run progression: depth, pause flags, weapon selection, milestones

use serde::{Deserialize, Serialize};

use super::clock::FrameDelta;
use super::timer::Timer;
use super::torpedo::TorpedoKind;
use crate::tuning::Tuning;

/// Accumulated wheel delta needed for one weapon step
pub const WHEEL_STEP_THRESHOLD: f32 = 50.0;

/// Independent reasons the run can be paused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseFlags {
    /// Pause menu
    pub manual: bool,
    /// Waiting for a power-up choice
    pub power_up: bool,
}

impl PauseFlags {
    pub fn any(&self) -> bool {
        self.manual || self.power_up
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    depth: f32,
    game_over: bool,
    pause: PauseFlags,
    weapons: Vec<TorpedoKind>,
    selected: usize,
    wheel_accumulator: f32,
    next_milestone: f32,
    milestone_interval: f32,
    depth_per_frame: f32,
    regen: Timer,
}

impl Progress {
    pub fn new(weapons: Vec<TorpedoKind>, tuning: &Tuning) -> Self {
        Self {
            depth: 0.0,
            game_over: false,
            pause: PauseFlags::default(),
            weapons,
            selected: 0,
            wheel_accumulator: 0.0,
            next_milestone: tuning.milestone_interval,
            milestone_interval: tuning.milestone_interval,
            depth_per_frame: tuning.depth_per_frame,
            regen: Timer::repeating(tuning.sonar_regen_interval),
        }
    }

    /// The run is simulating (not paused, not over)
    pub fn is_live(&self) -> bool {
        !self.game_over && !self.pause.any()
    }

    /// Climb for one frame; does nothing while paused or over
    pub fn advance(&mut self, frame: FrameDelta) {
        if self.is_live() {
            self.depth += self.depth_per_frame * frame.frames;
        }
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Regen ticks due this frame (none while paused or over)
    pub fn tick_regen(&mut self, dt: f32) -> u32 {
        if !self.is_live() {
            return 0;
        }
        self.regen.tick(dt)
    }

    /// Claim the next milestone if the depth has reached it
    pub fn claim_milestone(&mut self) -> Option<f32> {
        if !self.is_live() || self.depth < self.next_milestone {
            return None;
        }
        let claimed = self.next_milestone;
        self.next_milestone += self.milestone_interval;
        Some(claimed)
    }

    pub fn next_milestone(&self) -> f32 {
        self.next_milestone
    }

    // === Game over ===

    /// Mark the run over; returns true only the first time
    pub fn set_game_over(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        self.game_over = true;
        true
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    // === Pause ===

    pub fn pause_flags(&self) -> PauseFlags {
        self.pause
    }

    pub fn is_paused(&self) -> bool {
        self.pause.any()
    }

    pub fn toggle_manual_pause(&mut self) -> bool {
        self.pause.manual = !self.pause.manual;
        self.pause.manual
    }

    pub fn set_manual_pause(&mut self, paused: bool) {
        self.pause.manual = paused;
    }

    pub fn set_power_up_pause(&mut self, paused: bool) {
        self.pause.power_up = paused;
    }

    // === Weapons ===

    pub fn weapons(&self) -> &[TorpedoKind] {
        &self.weapons
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_weapon(&self) -> Option<TorpedoKind> {
        self.weapons.get(self.selected).copied()
    }

    /// Move the selection by `steps`, wrapping around the list
    pub fn step_weapon(&mut self, steps: i32) {
        if self.weapons.is_empty() || steps == 0 {
            return;
        }
        let len = self.weapons.len() as i64;
        self.selected = (self.selected as i64 + steps as i64).rem_euclid(len) as usize;
    }

    /// Feed a wheel delta; steps once the accumulator passes the threshold
    pub fn accumulate_wheel(&mut self, delta: f32) {
        self.wheel_accumulator += delta;
        if self.wheel_accumulator.abs() >= WHEEL_STEP_THRESHOLD {
            let step = if self.wheel_accumulator > 0.0 { 1 } else { -1 };
            self.wheel_accumulator = 0.0;
            self.step_weapon(step);
        }
    }
}
