//! Torpedoes and the torpedo pool
//!
//! Each loadout slot is one pooled torpedo instance. Firing consumes a slot
//! for the rest of the run: an instance that has flown once is recycled to
//! `Idle` (so its light can keep fading in place) but never counts as
//! ammunition again.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::terrain::Terrain;
use super::timer::{Timer, tick_once};
use crate::consts::{TORPEDO_EXTENT, TORPEDO_RADIUS};

/// Torpedo types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TorpedoKind {
    /// Flare: lights up the cavern, harmless to enemies
    Light,
    /// Stuns the jellyfish it hits
    Shock,
    /// Kills the jellyfish it hits
    Explosion,
}

impl TorpedoKind {
    pub const ALL: [TorpedoKind; 3] = [TorpedoKind::Light, TorpedoKind::Shock, TorpedoKind::Explosion];

    pub fn as_str(&self) -> &'static str {
        match self {
            TorpedoKind::Light => "light",
            TorpedoKind::Shock => "shock",
            TorpedoKind::Explosion => "explosion",
        }
    }

    /// Sprite texture key
    pub fn texture_key(&self) -> &'static str {
        match self {
            TorpedoKind::Light => "torpedo",
            TorpedoKind::Shock | TorpedoKind::Explosion => "torped",
        }
    }

    /// Per-type ballistics
    pub fn ballistics(&self) -> Ballistics {
        match self {
            TorpedoKind::Light => Ballistics::Light {
                speed: 400.0,
                light_radius: 80.0,
            },
            TorpedoKind::Shock => Ballistics::Shock {
                speed: 300.0,
                light_radius: 60.0,
                stun_secs: 5.0,
            },
            TorpedoKind::Explosion => Ballistics::Explosion {
                speed: 350.0,
                light_radius: 100.0,
                damage: 50.0,
            },
        }
    }
}

/// Flight and effect parameters, carrying only what each type uses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Ballistics {
    Light { speed: f32, light_radius: f32 },
    Shock { speed: f32, light_radius: f32, stun_secs: f32 },
    Explosion { speed: f32, light_radius: f32, damage: f32 },
}

impl Ballistics {
    pub fn speed(&self) -> f32 {
        match *self {
            Ballistics::Light { speed, .. }
            | Ballistics::Shock { speed, .. }
            | Ballistics::Explosion { speed, .. } => speed,
        }
    }

    pub fn light_radius(&self) -> f32 {
        match *self {
            Ballistics::Light { light_radius, .. }
            | Ballistics::Shock { light_radius, .. }
            | Ballistics::Explosion { light_radius, .. } => light_radius,
        }
    }

    pub fn stun_secs(&self) -> Option<f32> {
        match *self {
            Ballistics::Shock { stun_secs, .. } => Some(stun_secs),
            _ => None,
        }
    }

    pub fn damage(&self) -> Option<f32> {
        match *self {
            Ballistics::Explosion { damage, .. } => Some(damage),
            _ => None,
        }
    }

    /// Collision radius while the hit animation plays
    fn impact_radius(&self) -> f32 {
        match self {
            Ballistics::Light { .. } => TORPEDO_RADIUS,
            Ballistics::Shock { .. } => 30.0,
            Ballistics::Explosion { .. } => 40.0,
        }
    }

    /// Time from impact until the instance returns to the pool
    fn impact_secs(&self) -> f32 {
        match self {
            Ballistics::Light { .. } => 1.0,
            Ballistics::Shock { .. } | Ballistics::Explosion { .. } => 0.6,
        }
    }
}

/// Why a torpedo could not be fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FireError {
    #[error("no {} torpedo left in the pool", .0.as_str())]
    NoAmmo(TorpedoKind),
    #[error("{} torpedoes are not part of this loadout", .0.as_str())]
    NotEquipped(TorpedoKind),
    #[error("no torpedo type is selected")]
    NoWeaponSelected,
    #[error("the run is not accepting input")]
    RunInactive,
}

/// Stable pool slot index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TorpedoId(pub usize);

/// Lifecycle of a pooled torpedo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TorpedoState {
    /// In the pool (never fired, or recycled)
    Idle,
    /// Travelling
    Flight,
    /// Hit animation playing; returns to `Idle` when the timer runs out
    Impact { timer: Timer },
}

/// Point light carried by a torpedo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TorpedoLight {
    pub pos: Vec2,
    pub radius: f32,
    pub intensity: f32,
    /// Set once the light starts dying out after an impact
    fade: Option<Timer>,
}

impl TorpedoLight {
    /// Remaining brightness factor (1 until the fade starts)
    pub fn brightness(&self) -> f32 {
        self.fade.map_or(1.0, |t| 1.0 - t.progress())
    }
}

/// Light flare on impact
const FLARE_RADIUS: f32 = 400.0;
const FLARE_INTENSITY: f32 = 0.4;
/// Fade of the flare after a SHOCK/EXPLOSION impact (outlives the hit animation)
const FLARE_FADE_SECS: f32 = 1.5;

/// What happened to a torpedo this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TorpedoOutcome {
    /// Struck rock
    HitTerrain { pos: Vec2 },
    /// Left the world without hitting anything
    Expired,
    /// Finished its hit animation and went back to the pool
    Recycled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Torpedo {
    pub id: TorpedoId,
    pub kind: TorpedoKind,
    ballistics: Ballistics,
    pub state: TorpedoState,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Sprite rotation (radians)
    pub rotation: f32,
    /// Collision radius
    pub radius: f32,
    /// Set on the first launch and never cleared
    has_been_fired: bool,
    pub light: Option<TorpedoLight>,
}

impl Torpedo {
    pub fn new(id: TorpedoId, kind: TorpedoKind) -> Self {
        Self {
            id,
            kind,
            ballistics: kind.ballistics(),
            state: TorpedoState::Idle,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            rotation: 0.0,
            radius: TORPEDO_RADIUS,
            has_been_fired: false,
            light: None,
        }
    }

    pub fn ballistics(&self) -> &Ballistics {
        &self.ballistics
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == TorpedoState::Flight
    }

    pub fn is_idle(&self) -> bool {
        self.state == TorpedoState::Idle
    }

    pub fn has_been_fired(&self) -> bool {
        self.has_been_fired
    }

    pub fn has_light(&self) -> bool {
        self.light.is_some()
    }

    /// Usable as ammunition right now
    fn is_ready(&self) -> bool {
        self.is_idle() && !self.has_been_fired && !self.has_light()
    }

    fn launch(&mut self, origin: Vec2, target: Vec2) {
        let to_target = target - origin;
        let angle = to_target.y.atan2(to_target.x);
        self.pos = origin;
        self.vel = Vec2::from_angle(angle) * self.ballistics.speed();
        self.rotation = angle + std::f32::consts::FRAC_PI_2;
        self.radius = TORPEDO_RADIUS;
        self.state = TorpedoState::Flight;
        self.has_been_fired = true;
        self.light = Some(TorpedoLight {
            pos: origin,
            radius: self.ballistics.light_radius(),
            intensity: 0.5,
            fade: None,
        });
    }

    /// Switch from flight to the impact animation
    ///
    /// Returns false if the torpedo was not in flight.
    pub fn explode(&mut self) -> bool {
        if !self.is_in_flight() {
            return false;
        }
        self.vel = Vec2::ZERO;
        self.radius = self.ballistics.impact_radius();
        self.state = TorpedoState::Impact {
            timer: Timer::once(self.ballistics.impact_secs()),
        };
        if let Some(light) = self.light.as_mut() {
            light.radius = FLARE_RADIUS;
            light.intensity = FLARE_INTENSITY;
            if !matches!(self.ballistics, Ballistics::Light { .. }) {
                light.fade = Some(Timer::once(FLARE_FADE_SECS));
            }
        }
        true
    }

    /// Drop back into the pool without any effect
    fn reset(&mut self) {
        self.state = TorpedoState::Idle;
        self.vel = Vec2::ZERO;
        self.radius = TORPEDO_RADIUS;
    }

    /// Advance one frame
    pub fn update(&mut self, dt: f32, scroll: f32, terrain: &Terrain, world: Vec2) -> Option<TorpedoOutcome> {
        // Lights stay anchored to the rock, whether or not the torpedo flies
        if let Some(light) = self.light.as_mut() {
            if self.state != TorpedoState::Flight {
                light.pos.y -= scroll;
            }
            if tick_once(&mut light.fade, dt) || light.pos.y < 0.0 {
                self.light = None;
            }
        }

        match self.state {
            TorpedoState::Idle => None,
            TorpedoState::Flight => {
                self.pos += self.vel * dt;
                self.pos.y -= scroll;
                if let Some(light) = self.light.as_mut() {
                    light.pos = self.pos;
                }

                let out_of_world = self.pos.x < -TORPEDO_EXTENT
                    || self.pos.x > world.x + TORPEDO_EXTENT
                    || self.pos.y < -TORPEDO_EXTENT
                    || self.pos.y > world.y + TORPEDO_EXTENT;
                if out_of_world {
                    self.reset();
                    self.light = None;
                    return Some(TorpedoOutcome::Expired);
                }

                if terrain.is_solid(self.pos) {
                    self.explode();
                    return Some(TorpedoOutcome::HitTerrain { pos: self.pos });
                }
                None
            }
            TorpedoState::Impact { mut timer } => {
                self.pos.y -= scroll;
                if timer.tick(dt) > 0 {
                    if matches!(self.ballistics, Ballistics::Light { .. }) {
                        self.light = None;
                    }
                    self.reset();
                    return Some(TorpedoOutcome::Recycled);
                }
                self.state = TorpedoState::Impact { timer };
                None
            }
        }
    }

    /// Cancel everything in flight and extinguish the light
    pub fn teardown(&mut self) {
        self.reset();
        self.light = None;
    }
}

/// All torpedo instances of a run, addressed by slot index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TorpedoPool {
    torpedoes: Vec<Torpedo>,
}

impl TorpedoPool {
    /// One instance per loadout slot
    pub fn new(loadout: &[TorpedoKind]) -> Self {
        let mut pool = Self::default();
        for &kind in loadout {
            pool.add(kind);
        }
        pool
    }

    /// Append a fresh instance
    pub fn add(&mut self, kind: TorpedoKind) -> TorpedoId {
        let id = TorpedoId(self.torpedoes.len());
        self.torpedoes.push(Torpedo::new(id, kind));
        id
    }

    /// Fire a torpedo of `kind` from `origin` toward `target`
    pub fn fire(&mut self, kind: TorpedoKind, origin: Vec2, target: Vec2) -> Result<TorpedoId, FireError> {
        if !self.torpedoes.iter().any(|t| t.kind == kind) {
            log::warn!("Fire rejected: {} torpedoes not equipped", kind.as_str());
            return Err(FireError::NotEquipped(kind));
        }
        let Some(torpedo) = self
            .torpedoes
            .iter_mut()
            .find(|t| t.kind == kind && t.is_ready())
        else {
            log::warn!("Fire rejected: no idle {} torpedo in the pool", kind.as_str());
            return Err(FireError::NoAmmo(kind));
        };
        torpedo.launch(origin, target);
        Ok(torpedo.id)
    }

    /// Advance every instance
    pub fn update(&mut self, dt: f32, scroll: f32, terrain: &Terrain, world: Vec2) -> Vec<(TorpedoId, TorpedoOutcome)> {
        self.torpedoes
            .iter_mut()
            .filter_map(|t| t.update(dt, scroll, terrain, world).map(|o| (t.id, o)))
            .collect()
    }

    /// Unfired instances of `kind`
    pub fn remaining(&self, kind: TorpedoKind) -> usize {
        self.torpedoes
            .iter()
            .filter(|t| t.kind == kind && !t.has_been_fired)
            .count()
    }

    /// Unfired counts for every type, in `TorpedoKind::ALL` order
    pub fn remaining_by_kind(&self) -> [(TorpedoKind, usize); 3] {
        TorpedoKind::ALL.map(|kind| (kind, self.remaining(kind)))
    }

    pub fn get(&self, id: TorpedoId) -> Option<&Torpedo> {
        self.torpedoes.get(id.0)
    }

    pub fn get_mut(&mut self, id: TorpedoId) -> Option<&mut Torpedo> {
        self.torpedoes.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Torpedo> {
        self.torpedoes.iter()
    }

    /// Ids of the torpedoes currently in flight
    pub fn in_flight(&self) -> Vec<TorpedoId> {
        self.torpedoes
            .iter()
            .filter(|t| t.is_in_flight())
            .map(|t| t.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.torpedoes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.torpedoes.is_empty()
    }

    pub fn teardown(&mut self) {
        for torpedo in &mut self.torpedoes {
            torpedo.teardown();
        }
    }
}
