//! The player's submarine

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::timer::{Timer, tick_once};
use crate::consts::*;

/// Result of a hull hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Invincible or already destroyed; nothing changed
    Ignored,
    /// Lost a hull point, still alive
    Damaged { hull: u32 },
    /// Lost the last hull point
    Destroyed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Where the run started; damage resets the submarine to this column
    pub spawn: Vec2,
    pub hull: u32,
    /// Additive horizontal speed upgrade (px/s)
    pub speed_bonus: f32,
    /// Sprite tilt (radians), eased toward the steering direction
    pub rotation: f32,
    invincible: Option<Timer>,
    active: bool,
}

/// Maximum visual tilt while steering (10 degrees)
const MAX_TILT: f32 = 10.0 * std::f32::consts::PI / 180.0;

impl Player {
    pub fn new(spawn: Vec2, hull: u32) -> Self {
        Self {
            pos: spawn,
            spawn,
            hull: hull.max(1),
            speed_bonus: 0.0,
            rotation: 0.0,
            invincible: None,
            active: true,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    /// Center plus the four edge midpoints (inset), sampled against rock
    pub fn sample_points(&self) -> [Vec2; 5] {
        let b = self.bounds();
        let c = b.center();
        [
            c,
            Vec2::new(b.min.x + PLAYER_SAMPLE_INSET, c.y),
            Vec2::new(b.max.x - PLAYER_SAMPLE_INSET, c.y),
            Vec2::new(c.x, b.min.y + PLAYER_SAMPLE_INSET),
            Vec2::new(c.x, b.max.y - PLAYER_SAMPLE_INSET),
        ]
    }

    /// Steer by an input axis in [-1, 1] on each component
    pub fn steer(&mut self, axis: Vec2, base_speed: f32, dt: f32, world: Vec2) {
        if !self.active {
            return;
        }
        let axis = axis.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        let mut vel = Vec2::new(axis.x * (base_speed + self.speed_bonus), axis.y * base_speed);

        // No vertical push past the margins
        if (vel.y < 0.0 && self.pos.y <= PLAYER_VERTICAL_MARGIN)
            || (vel.y > 0.0 && self.pos.y >= world.y - PLAYER_VERTICAL_MARGIN)
        {
            vel.y = 0.0;
        }

        self.pos += vel * dt;
        let half_w = PLAYER_WIDTH / 2.0;
        self.pos.x = self.pos.x.clamp(half_w, world.x - half_w);
        self.pos.y = self.pos.y.clamp(PLAYER_VERTICAL_MARGIN, world.y - PLAYER_VERTICAL_MARGIN);

        let target_tilt = if axis.x < 0.0 {
            -MAX_TILT
        } else if axis.x > 0.0 {
            MAX_TILT
        } else {
            0.0
        };
        self.rotation += (target_tilt - self.rotation) * 0.1;
    }

    /// Count down invincibility
    pub fn update(&mut self, dt: f32) {
        tick_once(&mut self.invincible, dt);
    }

    pub fn grant_invincibility(&mut self, secs: f32) {
        let remaining = self.invincible.map_or(0.0, |t| t.remaining());
        if secs > remaining {
            self.invincible = Some(Timer::once(secs));
        }
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible.is_some()
    }

    /// Sprite alpha: blinks while invincible
    pub fn alpha(&self) -> f32 {
        match self.invincible {
            Some(timer) if ((timer.remaining() * 10.0) as u32).is_multiple_of(2) => 0.4,
            _ => 1.0,
        }
    }

    /// Take one hit
    pub fn take_hit(&mut self, invincibility_secs: f32) -> HitOutcome {
        if !self.active || self.is_invincible() {
            return HitOutcome::Ignored;
        }
        if self.hull > 1 {
            self.hull -= 1;
            self.grant_invincibility(invincibility_secs);
            self.pos.x = self.spawn.x;
            HitOutcome::Damaged { hull: self.hull }
        } else {
            self.hull = 0;
            self.disable();
            HitOutcome::Destroyed
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stop responding to input and collisions
    pub fn disable(&mut self) {
        self.active = false;
        self.invincible = None;
    }
}
