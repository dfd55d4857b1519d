//! Plain-data view of a run for the renderer and HUD

use glam::Vec2;
use serde::Serialize;

use super::sonar::SonarRing;
use super::torpedo::{TorpedoId, TorpedoKind, TorpedoLight, TorpedoState};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub rotation: f32,
    pub alpha: f32,
    pub hull: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TorpedoView {
    pub id: TorpedoId,
    pub kind: TorpedoKind,
    pub texture_key: &'static str,
    pub pos: Vec2,
    pub rotation: f32,
    pub state: TorpedoState,
    pub light: Option<TorpedoLight>,
    /// Fade factor of the light (0 when there is none)
    pub light_brightness: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct JellyfishView {
    pub id: u32,
    pub pos: Vec2,
    pub anim: &'static str,
    /// Draw the glow duplicate
    pub glowing: bool,
    pub stunned: bool,
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub player: PlayerView,
    pub sonar_origin: Vec2,
    pub sonar_rings: Vec<SonarRing>,
    pub torpedoes: Vec<TorpedoView>,
    pub jellyfish: Vec<JellyfishView>,
    /// Tile-sprite vertical position of the terrain
    pub terrain_tile_y: f32,
    pub terrain_revealed: bool,
    /// Scene ambient light, darkening with depth
    pub ambient_light: f32,
    pub depth: f32,
    pub energy: f32,
    pub ammo: [(TorpedoKind, usize); 3],
    pub selected_weapon: Option<TorpedoKind>,
    pub paused: bool,
    pub game_over: bool,
}

/// Ambient light intensity at `depth`: full near the surface, dim below
pub fn ambient_light(depth: f32) -> f32 {
    (0.5 + (2.0 - depth / 10.0) * 0.5).clamp(0.05, 1.0)
}
