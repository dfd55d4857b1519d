//! Jellyfish enemies and their spawner
//!
//! A jellyfish drifts on a sine wave while the world carries it upward.
//! A sonar ping makes it glow and rush the submarine's last known position
//! for a short window. Shock torpedoes stun it; ramming or explosions kill
//! it.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::timer::{Timer, tick_once};
use crate::consts::*;
use crate::direction_to;
use crate::tuning::Tuning;

/// Animation currently playing on the sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JellyfishAnim {
    Idle,
    Swim,
    Swim2,
    Die,
}

impl JellyfishAnim {
    pub fn key(&self) -> &'static str {
        match self {
            JellyfishAnim::Idle => "jellyfish_idle",
            JellyfishAnim::Swim => "jellyfish_swim",
            JellyfishAnim::Swim2 => "jellyfish_swim2",
            JellyfishAnim::Die => "jellyfish_die",
        }
    }

    fn is_swim(&self) -> bool {
        matches!(self, JellyfishAnim::Swim | JellyfishAnim::Swim2)
    }

    fn random_swim(rng: &mut Pcg32) -> Self {
        if rng.random_bool(0.5) {
            JellyfishAnim::Swim
        } else {
            JellyfishAnim::Swim2
        }
    }
}

/// AI state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JellyfishState {
    /// Sine drift around a slowly moving center
    Drifting,
    /// Rushing toward where the submarine was when the ping hit
    Alerted { target: Vec2, pursuit: Timer },
    /// Shocked: ignores sonar until the timer runs out
    Stunned { timer: Timer },
    /// Death animation; removed when the timer runs out
    Dying { timer: Timer },
}

/// What a jellyfish asks of the world after its update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JellyfishFate {
    Alive,
    /// Scrolled off the top; removed without a death animation
    ScrolledAway,
    /// Death animation finished
    Dead,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jellyfish {
    pub id: u32,
    pub pos: Vec2,
    pub state: JellyfishState,
    pub anim: JellyfishAnim,
    /// Alpha fade (used by the game-over fade)
    pub alpha: f32,
    drift_center_x: f32,
    drift_speed: f32,
    /// Milliseconds spent drifting; drives the sine phase
    time_alive_ms: f32,
    vel: Vec2,
    /// Sonar glow and its duplicate glow sprite
    glow: Option<Timer>,
    /// Fading out with the rest of the group at game over
    frozen: bool,
}

impl Jellyfish {
    pub fn new(id: u32, pos: Vec2, tuning: &Tuning) -> Self {
        // Drift toward the middle of the screen
        let drift_speed = if pos.x > tuning.center_x() {
            -tuning.jellyfish_drift_speed.abs()
        } else {
            tuning.jellyfish_drift_speed.abs()
        };
        Self {
            id,
            pos,
            state: JellyfishState::Drifting,
            anim: JellyfishAnim::Idle,
            alpha: 1.0,
            drift_center_x: pos.x,
            drift_speed,
            time_alive_ms: 0.0,
            vel: Vec2::ZERO,
            glow: None,
            frozen: false,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::new(JELLYFISH_WIDTH, JELLYFISH_HEIGHT))
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.state, JellyfishState::Dying { .. })
    }

    pub fn is_stunned(&self) -> bool {
        matches!(self.state, JellyfishState::Stunned { .. })
    }

    pub fn is_alerted(&self) -> bool {
        matches!(self.state, JellyfishState::Alerted { .. })
    }

    pub fn is_glowing(&self) -> bool {
        self.glow.is_some()
    }

    /// Takes part in collisions
    pub fn is_collidable(&self) -> bool {
        !self.is_dying() && !self.frozen
    }

    pub fn velocity(&self) -> Vec2 {
        self.vel
    }

    /// Advance one frame
    pub fn update(&mut self, dt: f32, scroll: f32, tuning: &Tuning, rng: &mut Pcg32) -> JellyfishFate {
        if tick_once(&mut self.glow, dt) {
            log::debug!("Jellyfish {} glow faded", self.id);
        }

        if self.frozen {
            return JellyfishFate::Alive;
        }

        match self.state {
            JellyfishState::Dying { mut timer } => {
                if timer.tick(dt) > 0 {
                    return JellyfishFate::Dead;
                }
                self.state = JellyfishState::Dying { timer };
            }
            JellyfishState::Stunned { mut timer } => {
                self.vel = Vec2::ZERO;
                if timer.tick(dt) > 0 {
                    self.resume_drift(tuning);
                } else {
                    self.state = JellyfishState::Stunned { timer };
                }
            }
            JellyfishState::Alerted { target, mut pursuit } => {
                // Heading is fixed at alert time; hold position once the target is reached
                let step = self.vel * dt;
                if step.length_squared() >= self.pos.distance_squared(target) {
                    self.pos = target;
                    self.vel = Vec2::ZERO;
                } else {
                    self.pos += step;
                }
                if pursuit.tick(dt) > 0 {
                    self.resume_drift(tuning);
                } else {
                    self.state = JellyfishState::Alerted { target, pursuit };
                }
            }
            JellyfishState::Drifting => {
                self.vel = Vec2::ZERO;
                self.time_alive_ms += dt * 1000.0;
                self.drift_center_x += self.drift_speed * dt;
                self.pos.x = self.drift_center_x
                    + tuning.jellyfish_amplitude * (tuning.jellyfish_frequency * self.time_alive_ms).sin();
                if !self.anim.is_swim() {
                    self.anim = JellyfishAnim::random_swim(rng);
                }
            }
        }

        self.pos.y -= scroll;
        if self.pos.y < -JELLYFISH_HEIGHT {
            self.teardown();
            return JellyfishFate::ScrolledAway;
        }
        JellyfishFate::Alive
    }

    /// Re-anchor the sine drift at the current position so there is no jump
    fn resume_drift(&mut self, tuning: &Tuning) {
        self.state = JellyfishState::Drifting;
        self.vel = Vec2::ZERO;
        // Keep the sine phase; move the center under the current position
        let phase = (self.time_alive_ms * tuning.jellyfish_frequency).sin();
        self.drift_center_x = self.pos.x - phase * tuning.jellyfish_amplitude;
    }

    /// React to a sonar ping
    ///
    /// Only a drifting jellyfish can be alerted. A glow still running from
    /// an earlier ping is left as it is. Returns true if the jellyfish
    /// became alerted.
    pub fn alert(&mut self, player_pos: Vec2, tuning: &Tuning, rng: &mut Pcg32) -> bool {
        if self.frozen || self.state != JellyfishState::Drifting {
            return false;
        }
        self.state = JellyfishState::Alerted {
            target: player_pos,
            pursuit: Timer::once(tuning.jellyfish_pursuit_secs),
        };
        self.vel = direction_to(self.pos, player_pos) * tuning.jellyfish_pursuit_speed;
        if self.glow.is_none() {
            self.glow = Some(Timer::once(tuning.sonar_effect_secs));
        }
        self.anim = JellyfishAnim::random_swim(rng);
        true
    }

    /// Shocked by a torpedo; returns true if the stun took hold
    pub fn stun(&mut self, secs: f32) -> bool {
        if self.is_dying() || self.frozen {
            return false;
        }
        self.state = JellyfishState::Stunned {
            timer: Timer::once(secs),
        };
        self.vel = Vec2::ZERO;
        true
    }

    /// Start the death animation; a no-op if already dying
    pub fn die(&mut self, death_secs: f32) -> bool {
        if self.is_dying() {
            return false;
        }
        self.glow = None;
        self.vel = Vec2::ZERO;
        self.anim = JellyfishAnim::Die;
        self.state = JellyfishState::Dying {
            timer: Timer::once(death_secs),
        };
        true
    }

    /// Stop in place and fade out (game over)
    pub fn freeze_and_fade(&mut self) {
        self.frozen = true;
        self.vel = Vec2::ZERO;
    }

    /// Advance the game-over fade
    pub fn fade(&mut self, dt: f32, duration: f32) {
        if self.frozen {
            self.alpha = (self.alpha - dt / duration).max(0.0);
        }
    }

    /// Drop the glow duplicate and every pending timer
    pub fn teardown(&mut self) {
        self.glow = None;
        self.vel = Vec2::ZERO;
        if let JellyfishState::Alerted { .. } | JellyfishState::Stunned { .. } = self.state {
            self.state = JellyfishState::Drifting;
        }
    }
}

/// Timed, depth-scaled jellyfish spawner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JellyfishSpawner {
    timer: Timer,
}

impl JellyfishSpawner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            timer: Timer::repeating(tuning.spawn_interval),
        }
    }

    /// Advance the spawn timer; returns the spawn positions rolled this frame
    pub fn update(&mut self, dt: f32, depth: f32, tuning: &Tuning, rng: &mut Pcg32) -> Vec<Vec2> {
        let rolls = self.timer.tick(dt);
        let chance = tuning.spawn_chance(depth) as f64;
        let mut spawns = Vec::new();
        for _ in 0..rolls {
            if rng.random_bool(chance) {
                spawns.push(spawn_position(tuning, rng));
            }
        }
        spawns
    }
}

/// Random column inside the safe margins, just below the visible world
fn spawn_position(tuning: &Tuning, rng: &mut Pcg32) -> Vec2 {
    let min_x = JELLYFISH_SPAWN_MARGIN.min(tuning.world_width / 2.0);
    let max_x = (tuning.world_width - JELLYFISH_SPAWN_MARGIN).max(min_x + 1.0);
    Vec2::new(
        rng.random_range(min_x..max_x),
        tuning.world_height + JELLYFISH_SPAWN_BELOW,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn setup() -> (Tuning, Pcg32) {
        (Tuning::default(), Pcg32::seed_from_u64(42))
    }

    #[test]
    fn test_drift_direction_by_spawn_side() {
        let (tuning, mut rng) = setup();
        let mut left = Jellyfish::new(1, Vec2::new(200.0, 650.0), &tuning);
        let mut right = Jellyfish::new(2, Vec2::new(600.0, 650.0), &tuning);
        // Whole sine periods so only the center drift remains
        let period_ms = std::f32::consts::TAU / tuning.jellyfish_frequency;
        let steps = 100;
        let dt = period_ms / 1000.0 / steps as f32;
        for _ in 0..steps {
            left.update(dt, 0.0, &tuning, &mut rng);
            right.update(dt, 0.0, &tuning, &mut rng);
        }
        assert!(left.pos.x > 200.0);
        assert!(right.pos.x < 600.0);
        assert!(left.anim == JellyfishAnim::Swim || left.anim == JellyfishAnim::Swim2);
    }

    #[test]
    fn test_scrolls_up_and_despawns_silently() {
        let (tuning, mut rng) = setup();
        let mut jelly = Jellyfish::new(1, Vec2::new(400.0, 10.0), &tuning);
        assert_eq!(jelly.update(0.016, 5.0, &tuning, &mut rng), JellyfishFate::Alive);
        assert_eq!(jelly.pos.y, 5.0);
        jelly.alert(Vec2::new(400.0, 100.0), &tuning, &mut rng);
        assert_eq!(jelly.update(0.016, 100.0, &tuning, &mut rng), JellyfishFate::ScrolledAway);
        assert!(!jelly.is_glowing());
        assert!(!jelly.is_dying());
    }

    #[test]
    fn test_alert_rushes_target_then_reverts() {
        let (tuning, mut rng) = setup();
        let mut jelly = Jellyfish::new(1, Vec2::new(400.0, 400.0), &tuning);
        assert!(jelly.alert(Vec2::new(400.0, 100.0), &tuning, &mut rng));
        assert!(jelly.is_alerted());
        assert!(jelly.is_glowing());

        jelly.update(0.1, 0.0, &tuning, &mut rng);
        assert!((jelly.velocity().y + tuning.jellyfish_pursuit_speed).abs() < 1e-3);
        assert!(jelly.pos.y < 400.0);

        // Pursuit ends after 2 s, glow lasts until 3 s
        for _ in 0..20 {
            jelly.update(0.1, 0.0, &tuning, &mut rng);
        }
        assert_eq!(jelly.state, JellyfishState::Drifting);
        assert!(jelly.is_glowing());
        for _ in 0..10 {
            jelly.update(0.1, 0.0, &tuning, &mut rng);
        }
        assert!(!jelly.is_glowing());
    }

    #[test]
    fn test_drifting_jellyfish_realerts_while_still_glowing() {
        let (tuning, mut rng) = setup();
        let mut jelly = Jellyfish::new(1, Vec2::new(400.0, 400.0), &tuning);
        jelly.alert(Vec2::new(400.0, 100.0), &tuning, &mut rng);
        for _ in 0..21 {
            jelly.update(0.1, 0.0, &tuning, &mut rng);
        }
        assert_eq!(jelly.state, JellyfishState::Drifting);
        assert!(jelly.is_glowing());

        assert!(jelly.alert(Vec2::new(300.0, 100.0), &tuning, &mut rng));
        assert!(jelly.is_alerted());
        // Original glow keeps running and ends on its own schedule
        for _ in 0..10 {
            jelly.update(0.1, 0.0, &tuning, &mut rng);
        }
        assert!(!jelly.is_glowing());
        assert!(jelly.is_alerted());
    }

    #[test]
    fn test_pursuit_stops_at_target() {
        let (tuning, mut rng) = setup();
        let target = Vec2::new(400.0, 380.0);
        let mut jelly = Jellyfish::new(1, Vec2::new(400.0, 400.0), &tuning);
        jelly.alert(target, &tuning, &mut rng);
        for _ in 0..10 {
            jelly.update(0.1, 0.0, &tuning, &mut rng);
        }
        assert!(jelly.is_alerted());
        assert_eq!(jelly.pos, target);
        assert_eq!(jelly.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_dying_jellyfish_despawns_off_the_top() {
        let (tuning, mut rng) = setup();
        let mut jelly = Jellyfish::new(1, Vec2::new(400.0, 10.0), &tuning);
        jelly.die(10.0);
        assert_eq!(jelly.update(0.016, 100.0, &tuning, &mut rng), JellyfishFate::ScrolledAway);
    }

    #[test]
    fn test_alerted_jellyfish_ignores_second_ping() {
        let (tuning, mut rng) = setup();
        let mut jelly = Jellyfish::new(1, Vec2::new(400.0, 400.0), &tuning);
        jelly.alert(Vec2::new(100.0, 100.0), &tuning, &mut rng);
        assert!(!jelly.alert(Vec2::new(700.0, 100.0), &tuning, &mut rng));
        match jelly.state {
            JellyfishState::Alerted { target, .. } => assert_eq!(target, Vec2::new(100.0, 100.0)),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_stun_blocks_alert_but_not_death() {
        let (tuning, mut rng) = setup();
        let mut jelly = Jellyfish::new(1, Vec2::new(400.0, 400.0), &tuning);
        assert!(jelly.stun(5.0));
        assert!(!jelly.alert(Vec2::ZERO, &tuning, &mut rng));
        assert!(jelly.is_stunned());
        assert!(jelly.die(0.8));
        assert!(jelly.is_dying());
    }

    #[test]
    fn test_stun_wears_off() {
        let (tuning, mut rng) = setup();
        let mut jelly = Jellyfish::new(1, Vec2::new(400.0, 400.0), &tuning);
        jelly.stun(5.0);
        for _ in 0..49 {
            jelly.update(0.1, 0.0, &tuning, &mut rng);
        }
        assert!(jelly.is_stunned());
        jelly.update(0.2, 0.0, &tuning, &mut rng);
        assert_eq!(jelly.state, JellyfishState::Drifting);
    }

    #[test]
    fn test_die_is_idempotent_and_terminal() {
        let (tuning, mut rng) = setup();
        let mut jelly = Jellyfish::new(1, Vec2::new(400.0, 400.0), &tuning);
        jelly.alert(Vec2::ZERO, &tuning, &mut rng);
        assert!(jelly.die(0.8));
        assert!(!jelly.die(0.8));
        assert!(!jelly.is_glowing());
        assert!(!jelly.is_collidable());
        assert!(!jelly.stun(5.0));
        assert!(!jelly.alert(Vec2::ZERO, &tuning, &mut rng));
        assert_eq!(jelly.anim, JellyfishAnim::Die);

        assert_eq!(jelly.update(0.5, 0.0, &tuning, &mut rng), JellyfishFate::Alive);
        assert_eq!(jelly.update(0.5, 0.0, &tuning, &mut rng), JellyfishFate::Dead);
    }

    #[test]
    fn test_spawner_rolls_every_interval() {
        let (mut tuning, mut rng) = setup();
        tuning.spawn_base_chance = 1.0;
        let mut spawner = JellyfishSpawner::new(&tuning);
        assert!(spawner.update(1.9, 0.0, &tuning, &mut rng).is_empty());
        let spawned = spawner.update(0.2, 0.0, &tuning, &mut rng);
        assert_eq!(spawned.len(), 1);
        let pos = spawned[0];
        assert!(pos.x >= 150.0 && pos.x < 650.0);
        assert_eq!(pos.y, tuning.world_height + 50.0);
    }

    #[test]
    fn test_spawner_zero_chance_never_spawns() {
        let (mut tuning, mut rng) = setup();
        tuning.spawn_base_chance = 0.0;
        let mut spawner = JellyfishSpawner::new(&tuning);
        assert!(spawner.update(60.0, 0.0, &tuning, &mut rng).is_empty());
    }
}
