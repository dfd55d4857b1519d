//! Events a run reports to its collaborators each frame

use glam::Vec2;

use super::powerup::PowerUp;
use super::torpedo::{TorpedoId, TorpedoKind};

/// Audio asset keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKey {
    SonarPing,
    TorpedoLaunch,
    /// Looping soundtrack, started with the run
    Background,
}

impl SoundKey {
    pub fn key(&self) -> &'static str {
        match self {
            SoundKey::SonarPing => "sonar-ping",
            SoundKey::TorpedoLaunch => "torpedo-sound",
            SoundKey::Background => "background-sound",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Sound(SoundKey),
    TorpedoFired { torpedo: TorpedoId, kind: TorpedoKind },
    TorpedoImpact { torpedo: TorpedoId, pos: Vec2 },
    EnemySpawned { enemy: u32 },
    EnemyAlerted { enemy: u32 },
    EnemyStunned { enemy: u32 },
    EnemyKilled { enemy: u32 },
    /// Gone from the world (death animation done or scrolled away)
    EnemyRemoved { enemy: u32 },
    PlayerHit { hull: u32 },
    ParticleBurst { pos: Vec2 },
    TerrainRevealed,
    PowerUpOffered(Vec<PowerUp>),
    /// Emitted exactly once, after the game-over delay
    RunOver { score: f32 },
}
