//! Meta-progression save data and the upgrade shop
//!
//! Persisted in storage under the `save` key between runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persistence::{Storage, StorageError};
use crate::sim::torpedo::TorpedoKind;

pub const MAX_HULL: u32 = 3;
pub const MIN_SLOTS: u32 = 3;
pub const MAX_SLOTS: u32 = 6;

/// Torpedo type unlocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorpedoUnlocks {
    pub light: bool,
    #[serde(alias = "stun")]
    pub shock: bool,
    #[serde(alias = "blast")]
    pub explosion: bool,
}

impl Default for TorpedoUnlocks {
    fn default() -> Self {
        Self {
            light: true,
            shock: false,
            explosion: false,
        }
    }
}

impl TorpedoUnlocks {
    pub fn is_unlocked(&self, kind: TorpedoKind) -> bool {
        match kind {
            TorpedoKind::Light => self.light,
            TorpedoKind::Shock => self.shock,
            TorpedoKind::Explosion => self.explosion,
        }
    }

    fn unlock(&mut self, kind: TorpedoKind) {
        match kind {
            TorpedoKind::Light => self.light = true,
            TorpedoKind::Shock => self.shock = true,
            TorpedoKind::Explosion => self.explosion = true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub points: u64,
    pub hull: u32,
    pub slots: u32,
    #[serde(default)]
    pub torpedoes: TorpedoUnlocks,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            points: 0,
            hull: 1,
            slots: MIN_SLOTS,
            torpedoes: TorpedoUnlocks::default(),
        }
    }
}

/// Shop items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Upgrade {
    Hull,
    Slots,
    Unlock(TorpedoKind),
}

impl Upgrade {
    pub fn cost(&self) -> u64 {
        match self {
            Upgrade::Hull => 500,
            Upgrade::Slots => 300,
            Upgrade::Unlock(TorpedoKind::Light) => 0,
            Upgrade::Unlock(TorpedoKind::Shock) => 500,
            Upgrade::Unlock(TorpedoKind::Explosion) => 1000,
        }
    }
}

/// Why a purchase was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("need {cost} points, have {points}")]
    InsufficientPoints { cost: u64, points: u64 },
    #[error("upgrade is already at its maximum")]
    AlreadyMaxed,
    #[error("torpedo type is already unlocked")]
    AlreadyUnlocked,
}

impl SaveData {
    pub const STORAGE_KEY: &'static str = "save";

    /// Parse a save document, substituting the default if it is corrupt
    pub fn from_json_or_default(json: &str) -> Self {
        match serde_json::from_str::<SaveData>(json) {
            Ok(save) => save.sanitized(),
            Err(e) => {
                log::warn!("Corrupt save document ({e}), starting from defaults");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Clamp fields into their documented ranges
    fn sanitized(mut self) -> Self {
        self.hull = self.hull.clamp(1, MAX_HULL);
        self.slots = self.slots.clamp(MIN_SLOTS, MAX_SLOTS);
        self.torpedoes.light = true;
        self
    }

    /// Load from storage; a missing or unreadable document yields the default
    pub fn load(storage: &dyn Storage) -> Self {
        match storage.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => {
                let save = Self::from_json_or_default(&json);
                log::info!("Loaded save: {} points, hull {}, {} slots", save.points, save.hull, save.slots);
                save
            }
            Ok(None) => {
                log::info!("No save found, starting fresh");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not read save ({e}), starting fresh");
                Self::default()
            }
        }
    }

    pub fn store(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        let json = self
            .to_json()
            .map_err(|e| StorageError::Unavailable(format!("cannot encode save: {e}")))?;
        storage.set(Self::STORAGE_KEY, &json)?;
        log::info!("Save written ({} points)", self.points);
        Ok(())
    }

    /// Bank a finished run: the depth reached, floored, becomes points
    pub fn record_run(&mut self, depth: f32) -> u64 {
        let earned = depth.max(0.0).floor() as u64;
        self.points += earned;
        earned
    }

    pub fn purchase(&mut self, upgrade: Upgrade) -> Result<(), PurchaseError> {
        match upgrade {
            Upgrade::Hull if self.hull >= MAX_HULL => return Err(PurchaseError::AlreadyMaxed),
            Upgrade::Slots if self.slots >= MAX_SLOTS => return Err(PurchaseError::AlreadyMaxed),
            Upgrade::Unlock(kind) if self.torpedoes.is_unlocked(kind) => {
                return Err(PurchaseError::AlreadyUnlocked);
            }
            _ => {}
        }

        let cost = upgrade.cost();
        if self.points < cost {
            return Err(PurchaseError::InsufficientPoints {
                cost,
                points: self.points,
            });
        }
        self.points -= cost;

        match upgrade {
            Upgrade::Hull => self.hull += 1,
            Upgrade::Slots => self.slots += 1,
            Upgrade::Unlock(kind) => self.torpedoes.unlock(kind),
        }
        log::info!("Purchased {upgrade:?} for {cost} points");
        Ok(())
    }

    /// Unlocked types in canonical order
    pub fn unlocked_kinds(&self) -> Vec<TorpedoKind> {
        TorpedoKind::ALL
            .into_iter()
            .filter(|&kind| self.torpedoes.is_unlocked(kind))
            .collect()
    }

    /// Slots dealt round-robin over the unlocked types
    pub fn loadout(&self) -> Vec<TorpedoKind> {
        let kinds = self.unlocked_kinds();
        if kinds.is_empty() {
            return Vec::new();
        }
        (0..self.slots as usize).map(|i| kinds[i % kinds.len()]).collect()
    }
}
