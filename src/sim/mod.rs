//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame deltas come from the host, nothing reads a clock
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod clock;
pub mod collision;
pub mod events;
pub mod jellyfish;
pub mod player;
pub mod powerup;
pub mod progress;
pub mod run;
pub mod snapshot;
pub mod sonar;
pub mod terrain;
pub mod timer;
pub mod torpedo;

pub use autopilot::autopilot;
pub use clock::FrameDelta;
pub use collision::{Aabb, Contact};
pub use events::{RunEvent, SoundKey};
pub use jellyfish::{Jellyfish, JellyfishAnim, JellyfishSpawner, JellyfishState};
pub use player::{HitOutcome, Player};
pub use powerup::{PowerUp, PowerUpError};
pub use progress::{PauseFlags, Progress};
pub use run::{Run, RunPhase};
pub use snapshot::RenderSnapshot;
pub use sonar::{Sonar, SonarRing};
pub use terrain::{Terrain, TerrainTexture};
pub use timer::Timer;
pub use torpedo::{Ballistics, FireError, TorpedoId, TorpedoKind, TorpedoPool, TorpedoState};

pub use crate::platform::TickInput;
