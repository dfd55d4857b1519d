//! Demo autopilot
//!
//! Produces input the way a cautious player would: keep to open water,
//! ping when the tank allows, and shoot the closest jellyfish coming up.

use glam::Vec2;

use super::run::Run;
use crate::consts::PLAYER_HEIGHT;
use crate::platform::TickInput;

/// How far ahead (below the submarine) the lane scan looks
const LOOKAHEAD: f32 = 160.0;
/// Ping only with this much energy left
const SONAR_RESERVE: f32 = 40.0;
/// Engage jellyfish closer than this
const FIRE_RANGE: f32 = 260.0;

/// Pick this frame's input for `run`
pub fn autopilot(run: &Run) -> TickInput {
    let mut input = TickInput::default();
    let player = run.player();
    if !player.is_active() {
        return input;
    }

    // Steer toward the clearest lane below
    let lane = best_lane(run);
    let dx = lane - player.pos.x;
    if dx.abs() > 4.0 {
        input.movement.x = dx.signum();
    }

    // Dodge anything rising straight at the hull
    let threat = run
        .enemies()
        .iter()
        .filter(|e| e.is_collidable() && e.pos.y > player.pos.y)
        .min_by(|a, b| {
            a.pos
                .distance_squared(player.pos)
                .partial_cmp(&b.pos.distance_squared(player.pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some(enemy) = threat {
        let distance = enemy.pos.distance(player.pos);
        if distance < FIRE_RANGE && run.torpedoes().in_flight().is_empty() && !enemy.is_stunned() {
            input.fire_target = Some(enemy.pos + enemy.velocity() * 0.2);
        }
        if distance < PLAYER_HEIGHT * 1.5 && (enemy.pos.x - player.pos.x).abs() < 60.0 {
            input.movement.x = if enemy.pos.x > player.pos.x { -1.0 } else { 1.0 };
        }
    }

    let sonar = run.sonar();
    if !sonar.is_active() && sonar.energy() > SONAR_RESERVE && !run.terrain().is_revealed() {
        input.sonar = true;
    }
    input
}

/// Column with the fewest rock samples in the lookahead window
fn best_lane(run: &Run) -> f32 {
    let player = run.player();
    let terrain = run.terrain();
    let width = run.tuning().world_width;
    let half = crate::consts::PLAYER_WIDTH / 2.0;

    let mut best = (usize::MAX, f32::MAX, player.pos.x);
    let mut x = half;
    while x <= width - half {
        let rock = (0..8)
            .flat_map(|row| {
                let y = player.pos.y + row as f32 * LOOKAHEAD / 8.0;
                [-half + 6.0, 0.0, half - 6.0].map(|off| Vec2::new(x + off, y))
            })
            .filter(|p| terrain.is_solid(*p))
            .count();
        let travel = (x - player.pos.x).abs();
        if (rock, travel) < (best.0, best.1) {
            best = (rock, travel, x);
        }
        x += 20.0;
    }
    best.2
}
