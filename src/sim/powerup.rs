//! Milestone power-ups

use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUp {
    SonarBoost,
    SilentSonar,
    HullReinforce,
    PropulsionBoost,
    SonarRecharge,
    ExtraTorpedo,
    TempShield,
}

impl PowerUp {
    pub const ALL: [PowerUp; 7] = [
        PowerUp::SonarBoost,
        PowerUp::SilentSonar,
        PowerUp::HullReinforce,
        PowerUp::PropulsionBoost,
        PowerUp::SonarRecharge,
        PowerUp::ExtraTorpedo,
        PowerUp::TempShield,
    ];

    /// Stable key exchanged with the selection screen
    pub fn key(&self) -> &'static str {
        match self {
            PowerUp::SonarBoost => "sonar_boost",
            PowerUp::SilentSonar => "silent_sonar",
            PowerUp::HullReinforce => "hull_reinforce",
            PowerUp::PropulsionBoost => "propulsion_boost",
            PowerUp::SonarRecharge => "sonar_recharge",
            PowerUp::ExtraTorpedo => "extra_torpedo",
            PowerUp::TempShield => "temp_shield",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PowerUp::SonarBoost => "Enhanced Sonar",
            PowerUp::SilentSonar => "Silent Sonar",
            PowerUp::HullReinforce => "Reinforced Hull",
            PowerUp::PropulsionBoost => "Rapid Propulsion",
            PowerUp::SonarRecharge => "Express Sonar Recharge",
            PowerUp::ExtraTorpedo => "Extra Torpedo",
            PowerUp::TempShield => "Temporary Shield",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PowerUp::SonarBoost => "Increases sonar detection range.",
            PowerUp::SilentSonar => "Your sonar does not alert enemies for 30 seconds.",
            PowerUp::HullReinforce => "Adds +1 hit point, allowing one extra collision.",
            PowerUp::PropulsionBoost => "Increases horizontal speed.",
            PowerUp::SonarRecharge => "Increases sonar recharge.",
            PowerUp::ExtraTorpedo => "Adds a torpedo slot holding a random available torpedo.",
            PowerUp::TempShield => "Become invincible to collisions for 10 seconds.",
        }
    }

    /// Draw `count` distinct power-ups
    pub fn draw(count: usize, rng: &mut Pcg32) -> Vec<PowerUp> {
        let mut all = Self::ALL.to_vec();
        all.shuffle(rng);
        all.truncate(count);
        all
    }
}

/// Why a power-up choice was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowerUpError {
    #[error("no power-up offer is pending")]
    NoPendingOffer,
    #[error("{} was not among the offered power-ups", .0.key())]
    NotOffered(PowerUp),
    #[error("unknown power-up key {0:?}")]
    UnknownKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_draw_has_no_repeats() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            let drawn = PowerUp::draw(3, &mut rng);
            assert_eq!(drawn.len(), 3);
            let unique: HashSet<_> = drawn.iter().collect();
            assert_eq!(unique.len(), 3);
        }
    }

    #[test]
    fn test_draw_more_than_available() {
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(PowerUp::draw(20, &mut rng).len(), PowerUp::ALL.len());
    }

    #[test]
    fn test_keys_round_trip() {
        for power_up in PowerUp::ALL {
            assert_eq!(PowerUp::from_key(power_up.key()), Some(power_up));
        }
        assert_eq!(PowerUp::from_key("warp_drive"), None);
    }

    #[test]
    fn test_every_power_up_has_card_text() {
        let names: HashSet<_> = PowerUp::ALL.iter().map(|p| p.name()).collect();
        assert_eq!(names.len(), PowerUp::ALL.len());
        for power_up in PowerUp::ALL {
            assert!(power_up.description().ends_with('.'));
        }
        assert!(PowerUp::SilentSonar.description().contains("30 seconds"));
    }

    #[test]
    fn test_serde_uses_keys() {
        let json = serde_json::to_string(&PowerUp::TempShield).unwrap();
        assert_eq!(json, "\"temp_shield\"");
    }
}
