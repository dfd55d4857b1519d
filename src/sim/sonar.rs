//! Sonar pulse
//!
//! A single expanding ring. While active its origin drifts with the world
//! so the pulse stays anchored to the rock it was fired at, and every enemy
//! inside the ring is pinged once per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::timer::{Timer, tick_once};
use crate::consts::{MAX_ENERGY, SONAR_ECHO_OFFSET};
use crate::distance;
use crate::tuning::Tuning;

/// One visible ring of the pulse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SonarRing {
    pub radius: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sonar {
    active: bool,
    radius: f32,
    origin: Vec2,
    energy: f32,
    /// Ring fade (1 at launch, falls toward 0.2 at max radius)
    alpha: f32,
    speed: f32,
    max_radius: f32,
    energy_cost: f32,
    /// Power-up bonuses
    pub radius_bonus: f32,
    pub recharge_bonus: f32,
    /// Silent mode: reveal rock but never alert enemies
    silent: Option<Timer>,
    /// Fade-out of the last ring after deactivation
    fade_out: Option<Timer>,
    /// Radius the pulse ended at, drawn while fading out
    fade_radius: f32,
}

/// Fade-out duration of the ring graphics (s)
const FADE_OUT_SECS: f32 = 0.3;

impl Sonar {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            active: false,
            radius: 0.0,
            origin: Vec2::ZERO,
            energy: MAX_ENERGY,
            alpha: 0.0,
            speed: tuning.sonar_speed,
            max_radius: tuning.sonar_max_radius,
            energy_cost: tuning.sonar_energy_cost,
            radius_bonus: 0.0,
            recharge_bonus: 0.0,
            silent: None,
            fade_out: None,
            fade_radius: 0.0,
        }
    }

    /// Start a pulse at `origin`
    ///
    /// Returns false (and changes nothing) if a pulse is already running or
    /// the tank is empty.
    pub fn activate(&mut self, origin: Vec2) -> bool {
        if self.active || self.energy <= 0.0 {
            return false;
        }
        self.active = true;
        self.radius = 1.0;
        self.alpha = 1.0;
        self.origin = origin;
        self.energy = (self.energy - self.energy_cost).max(0.0);
        self.fade_out = None;
        log::debug!("Sonar ping at ({:.0}, {:.0}), energy {:.0}", origin.x, origin.y, self.energy);
        true
    }

    /// Grow the pulse; returns true if it reached its range and shut off
    pub fn update(&mut self, dt: f32, scroll: f32) -> bool {
        tick_once(&mut self.silent, dt);
        if tick_once(&mut self.fade_out, dt) {
            self.alpha = 0.0;
            self.fade_radius = 0.0;
        }
        if !self.active {
            if self.is_fading_out() {
                self.origin.y -= scroll;
            }
            return false;
        }

        self.origin.y -= scroll;
        self.radius += self.speed * dt;
        let progress = self.radius / self.range();
        self.alpha = (1.0 - progress * 0.8).max(0.0);

        if self.radius >= self.range() {
            self.deactivate();
            return true;
        }
        false
    }

    /// Stop the pulse; the last ring fades out over a short delay
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.fade_radius = self.radius;
        self.radius = 0.0;
        self.fade_out = Some(Timer::once(FADE_OUT_SECS));
    }

    /// Full stop with no fade (game over / teardown)
    pub fn shutdown(&mut self) {
        self.deactivate();
        self.fade_out = None;
        self.fade_radius = 0.0;
        self.silent = None;
        self.alpha = 0.0;
    }

    /// Is `point` inside the current ring?
    pub fn is_point_in_range(&self, point: Vec2) -> bool {
        self.active && distance(self.origin, point) <= self.radius
    }

    /// Top up energy, never past the cap
    pub fn recharge(&mut self, amount: f32) {
        self.energy = (self.energy + amount).clamp(0.0, MAX_ENERGY);
    }

    /// Suppress enemy alerts for `secs`
    pub fn go_silent(&mut self, secs: f32) {
        self.silent = Some(Timer::once(secs));
    }

    pub fn is_silent(&self) -> bool {
        self.silent.is_some()
    }

    /// Should enemies inside the ring react this frame?
    pub fn alerts_enemies(&self) -> bool {
        self.active && !self.is_silent()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Radius at which the pulse ends
    pub fn range(&self) -> f32 {
        self.max_radius + self.radius_bonus
    }

    pub fn is_fading_out(&self) -> bool {
        self.fade_out.is_some()
    }

    /// Primary ring plus trailing echoes, for drawing
    ///
    /// After the pulse ends only the last ring is left, fading to nothing.
    pub fn rings(&self) -> Vec<SonarRing> {
        if !self.active {
            return match self.fade_out {
                Some(timer) => vec![SonarRing {
                    radius: self.fade_radius,
                    alpha: self.alpha * (1.0 - timer.progress()),
                }],
                None => Vec::new(),
            };
        }
        let mut rings = vec![SonarRing {
            radius: self.radius,
            alpha: self.alpha,
        }];
        let echo = self.radius - SONAR_ECHO_OFFSET;
        if echo > 0.0 {
            rings.push(SonarRing {
                radius: echo,
                alpha: self.alpha,
            });
        }
        let third = self.radius - SONAR_ECHO_OFFSET * 2.0;
        if third > 0.0 {
            rings.push(SonarRing {
                radius: third,
                alpha: self.alpha * 0.8,
            });
        }
        rings
    }
}
