//! Collision detection and resolution
//!
//! Terrain contacts go through the pixel oracle in [`Terrain`]; actor versus
//! actor contacts use plain box and circle overlap. Resolution is keyed by
//! torpedo slot and jellyfish id, never by visual objects.

use glam::Vec2;

use super::jellyfish::Jellyfish;
use super::player::Player;
use super::terrain::Terrain;
use super::torpedo::{Ballistics, TorpedoId, TorpedoPool};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Circle overlap via the closest point on the box
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }
}

/// A resolved contact, reported to the run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    /// Submarine hull touched rock
    PlayerTerrain,
    /// Submarine rammed a jellyfish; the jellyfish is dying
    PlayerRammed { enemy: u32 },
    /// Submarine brushed a jellyfish from below; no effect
    Graze { enemy: u32 },
    /// Explosion torpedo killed a jellyfish
    TorpedoKill { torpedo: TorpedoId, enemy: u32, pos: Vec2 },
    /// Shock torpedo stunned a jellyfish
    TorpedoStun { torpedo: TorpedoId, enemy: u32, pos: Vec2 },
}

/// Any solid sample under the submarine hull?
pub fn player_hits_terrain(player: &Player, terrain: &Terrain) -> bool {
    terrain.any_solid(&player.sample_points())
}

/// Torpedo against jellyfish, first pass of the frame
///
/// Only torpedoes in flight count. A torpedo that hits something explodes
/// and cannot hit anything else the same frame.
pub fn resolve_torpedoes(torpedoes: &mut TorpedoPool, enemies: &mut [Jellyfish], death_secs: f32) -> Vec<Contact> {
    let mut contacts = Vec::new();
    for id in torpedoes.in_flight() {
        let Some(torpedo) = torpedoes.get_mut(id) else {
            continue;
        };
        let ballistics = *torpedo.ballistics();
        if matches!(ballistics, Ballistics::Light { .. }) {
            continue;
        }
        let (pos, radius) = (torpedo.pos, torpedo.radius);
        let Some(enemy) = enemies
            .iter_mut()
            .find(|e| e.is_collidable() && e.bounds().overlaps_circle(pos, radius))
        else {
            continue;
        };

        match ballistics {
            Ballistics::Explosion { .. } => {
                enemy.die(death_secs);
                torpedo.explode();
                contacts.push(Contact::TorpedoKill {
                    torpedo: id,
                    enemy: enemy.id,
                    pos,
                });
            }
            Ballistics::Shock { stun_secs, .. } => {
                enemy.stun(stun_secs);
                torpedo.explode();
                contacts.push(Contact::TorpedoStun {
                    torpedo: id,
                    enemy: enemy.id,
                    pos,
                });
            }
            Ballistics::Light { .. } => {}
        }
    }
    contacts
}

/// Submarine against jellyfish and rock, second pass of the frame
///
/// An invincible or disabled submarine collides with nothing.
pub fn resolve_player(
    player: &Player,
    terrain: &Terrain,
    enemies: &mut [Jellyfish],
    graze_tolerance: f32,
    death_secs: f32,
) -> Vec<Contact> {
    let mut contacts = Vec::new();
    if !player.is_active() || player.is_invincible() {
        return contacts;
    }

    let bounds = player.bounds();
    for enemy in enemies.iter_mut().filter(|e| e.is_collidable()) {
        if !bounds.overlaps(&enemy.bounds()) {
            continue;
        }
        if player.pos.y > enemy.pos.y + graze_tolerance {
            contacts.push(Contact::Graze { enemy: enemy.id });
            continue;
        }
        enemy.die(death_secs);
        contacts.push(Contact::PlayerRammed { enemy: enemy.id });
    }

    if player_hits_terrain(player, terrain) {
        contacts.push(Contact::PlayerTerrain);
    }
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::terrain::TerrainTexture;
    use crate::sim::torpedo::TorpedoKind;
    use crate::tuning::Tuning;

    fn open_water() -> Terrain {
        Terrain::new(Some(TerrainTexture::open_water(64, 64)), 30)
    }

    fn solid_rock() -> Terrain {
        Terrain::new(TerrainTexture::from_alpha(2, 2, vec![255; 4]), 30)
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::from_center(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_center(Vec2::new(9.0, 0.0), Vec2::splat(10.0));
        let c = Aabb::from_center(Vec2::new(11.0, 0.0), Vec2::splat(10.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.overlaps_circle(Vec2::new(8.0, 0.0), 3.5));
        assert!(!a.overlaps_circle(Vec2::new(8.0, 8.0), 3.5));
    }

    #[test]
    fn test_shock_stuns_without_killing() {
        let tuning = Tuning::default();
        let mut pool = TorpedoPool::new(&[TorpedoKind::Shock]);
        let mut enemies = vec![Jellyfish::new(7, Vec2::new(400.0, 300.0), &tuning)];
        let id = pool
            .fire(TorpedoKind::Shock, Vec2::new(400.0, 300.0), Vec2::new(400.0, 500.0))
            .unwrap();

        let contacts = resolve_torpedoes(&mut pool, &mut enemies, 0.8);
        assert_eq!(contacts.len(), 1);
        assert!(matches!(contacts[0], Contact::TorpedoStun { enemy: 7, .. }));
        assert!(enemies[0].is_stunned());
        assert!(!enemies[0].is_dying());
        assert!(pool.get(id).is_some_and(|t| !t.is_in_flight() && !t.is_idle()));
    }

    #[test]
    fn test_explosion_kills_single_target() {
        let tuning = Tuning::default();
        let mut pool = TorpedoPool::new(&[TorpedoKind::Explosion]);
        let mut enemies = vec![
            Jellyfish::new(1, Vec2::new(400.0, 300.0), &tuning),
            Jellyfish::new(2, Vec2::new(410.0, 300.0), &tuning),
        ];
        pool.fire(TorpedoKind::Explosion, Vec2::new(400.0, 300.0), Vec2::new(400.0, 500.0))
            .unwrap();

        let contacts = resolve_torpedoes(&mut pool, &mut enemies, 0.8);
        assert_eq!(contacts.len(), 1);
        assert!(enemies[0].is_dying());
        assert!(!enemies[1].is_dying());
    }

    #[test]
    fn test_light_passes_through() {
        let tuning = Tuning::default();
        let mut pool = TorpedoPool::new(&[TorpedoKind::Light]);
        let mut enemies = vec![Jellyfish::new(1, Vec2::new(400.0, 300.0), &tuning)];
        let id = pool
            .fire(TorpedoKind::Light, Vec2::new(400.0, 300.0), Vec2::new(400.0, 500.0))
            .unwrap();

        assert!(resolve_torpedoes(&mut pool, &mut enemies, 0.8).is_empty());
        assert!(pool.get(id).is_some_and(|t| t.is_in_flight()));
        assert_eq!(enemies[0].state, crate::sim::jellyfish::JellyfishState::Drifting);
    }

    #[test]
    fn test_ram_from_above_kills_enemy() {
        let tuning = Tuning::default();
        let player = Player::new(Vec2::new(400.0, 120.0), 2);
        let mut enemies = vec![Jellyfish::new(3, Vec2::new(400.0, 150.0), &tuning)];
        let contacts = resolve_player(&player, &open_water(), &mut enemies, 15.0, 0.8);
        assert_eq!(contacts, vec![Contact::PlayerRammed { enemy: 3 }]);
        assert!(enemies[0].is_dying());

        // Dying enemies no longer collide
        assert!(resolve_player(&player, &open_water(), &mut enemies, 15.0, 0.8).is_empty());
    }

    #[test]
    fn test_contact_from_below_is_a_graze() {
        let tuning = Tuning::default();
        let player = Player::new(Vec2::new(400.0, 200.0), 2);
        let mut enemies = vec![Jellyfish::new(3, Vec2::new(400.0, 150.0), &tuning)];
        let contacts = resolve_player(&player, &open_water(), &mut enemies, 15.0, 0.8);
        assert_eq!(contacts, vec![Contact::Graze { enemy: 3 }]);
        assert!(!enemies[0].is_dying());
    }

    #[test]
    fn test_invincible_player_ignores_everything() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(400.0, 120.0), 2);
        player.grant_invincibility(5.0);
        let mut enemies = vec![Jellyfish::new(3, Vec2::new(400.0, 130.0), &tuning)];
        assert!(resolve_player(&player, &solid_rock(), &mut enemies, 15.0, 0.8).is_empty());
        assert!(!enemies[0].is_dying());
    }

    #[test]
    fn test_terrain_contact() {
        let player = Player::new(Vec2::new(400.0, 120.0), 2);
        assert!(player_hits_terrain(&player, &solid_rock()));
        assert!(!player_hits_terrain(&player, &open_water()));
        assert!(!player_hits_terrain(&player, &Terrain::new(None, 30)));
        assert_eq!(
            resolve_player(&player, &solid_rock(), &mut [], 15.0, 0.8),
            vec![Contact::PlayerTerrain]
        );
    }
}
