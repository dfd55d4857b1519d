//! Data-driven game balance
//!
//! Every gameplay constant lives here so a run can be re-tuned from a JSON
//! file without touching the simulation. Missing fields fall back to the
//! canonical defaults.

use serde::{Deserialize, Serialize};

/// Game balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    /// Visible world width (px)
    pub world_width: f32,
    /// Visible world height (px)
    pub world_height: f32,
    /// World scroll per frame unit (px)
    pub scroll_speed: f32,

    // === Terrain ===
    /// Sampled alpha strictly above this counts as solid rock
    pub solid_alpha_threshold: u8,

    // === Player ===
    /// Base movement speed (px/s)
    pub player_speed: f32,
    /// Invincibility granted after losing a hull point (s)
    pub invincibility_secs: f32,
    /// Player may sit this far below an enemy before contact is a graze (px)
    pub graze_tolerance: f32,

    // === Sonar ===
    /// Radius growth (px/s)
    pub sonar_speed: f32,
    /// Pulse ends at this radius plus any radius bonus (px)
    pub sonar_max_radius: f32,
    /// Energy deducted per activation
    pub sonar_energy_cost: f32,
    /// Energy restored per regen tick
    pub sonar_regen_amount: f32,
    /// Seconds between regen ticks
    pub sonar_regen_interval: f32,

    // === Jellyfish ===
    /// Drift-center horizontal speed (px/s, sign chosen by spawn side)
    pub jellyfish_drift_speed: f32,
    /// Sinusoidal swing amplitude (px)
    pub jellyfish_amplitude: f32,
    /// Sinusoidal frequency (radians per millisecond alive)
    pub jellyfish_frequency: f32,
    /// Rush speed toward the captured player position (px/s)
    pub jellyfish_pursuit_speed: f32,
    /// Pursuit window after an alert (s)
    pub jellyfish_pursuit_secs: f32,
    /// Glow duration after an alert (s)
    pub sonar_effect_secs: f32,
    /// Death animation length (s)
    pub jellyfish_death_secs: f32,

    // === Spawning ===
    /// Seconds between spawn rolls
    pub spawn_interval: f32,
    /// Spawn probability before any depth bonus
    pub spawn_base_chance: f32,
    /// Depth past which the spawn bonus starts
    pub spawn_bonus_start_depth: f32,
    /// Depth units per bonus step
    pub spawn_bonus_step: f32,
    /// Probability added per bonus step
    pub spawn_bonus_per_step: f32,

    // === Progression ===
    /// Depth gained per frame unit
    pub depth_per_frame: f32,
    /// Depth between power-up offers
    pub milestone_interval: f32,
    /// Options shown per power-up offer
    pub power_up_choices: usize,
    /// Delay between the fatal hit and the run-over signal (s)
    pub game_over_delay: f32,

    // === Power-ups ===
    pub sonar_radius_bonus: f32,
    pub speed_bonus: f32,
    pub recharge_bonus: f32,
    pub silent_sonar_secs: f32,
    pub shield_secs: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_width: 800.0,
            world_height: 600.0,
            scroll_speed: 1.0,

            solid_alpha_threshold: 30,

            player_speed: 200.0,
            invincibility_secs: 5.0,
            graze_tolerance: 15.0,

            sonar_speed: 200.0,
            sonar_max_radius: 500.0,
            sonar_energy_cost: 5.0,
            sonar_regen_amount: 1.0,
            sonar_regen_interval: 1.0,

            jellyfish_drift_speed: 20.0,
            jellyfish_amplitude: 40.0,
            jellyfish_frequency: 0.005,
            jellyfish_pursuit_speed: 90.0,
            jellyfish_pursuit_secs: 2.0,
            sonar_effect_secs: 3.0,
            jellyfish_death_secs: 0.8,

            spawn_interval: 2.0,
            spawn_base_chance: 0.6,
            spawn_bonus_start_depth: 100.0,
            spawn_bonus_step: 5.0,
            spawn_bonus_per_step: 0.02,

            depth_per_frame: 0.05,
            milestone_interval: 100.0,
            power_up_choices: 3,
            game_over_delay: 1.5,

            sonar_radius_bonus: 100.0,
            speed_bonus: 50.0,
            recharge_bonus: 1.0,
            silent_sonar_secs: 30.0,
            shield_secs: 10.0,
        }
    }
}

impl Tuning {
    /// Parse a tuning document; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Spawn probability for a roll taken at `depth`
    ///
    /// Step-wise: every `spawn_bonus_step` depth units past the start depth
    /// adds `spawn_bonus_per_step`, capped at 1.
    pub fn spawn_chance(&self, depth: f32) -> f32 {
        let mut chance = self.spawn_base_chance;
        if depth > self.spawn_bonus_start_depth {
            let steps = ((depth - self.spawn_bonus_start_depth) / self.spawn_bonus_step).floor();
            chance += steps * self.spawn_bonus_per_step;
        }
        chance.clamp(0.0, 1.0)
    }

    /// Horizontal center of the world
    pub fn center_x(&self) -> f32 {
        self.world_width / 2.0
    }
}
