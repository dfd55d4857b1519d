//! Scrolling terrain and the pixel collision oracle
//!
//! The cavern is a single alpha texture tiled infinitely in both directions.
//! Opaque pixels are rock. Every terrain collision in the game (player hull,
//! torpedo impacts) goes through [`Terrain::query_opacity`].

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::timer::{Timer, tick_once};

/// Alpha channel of the terrain tile
#[derive(Debug, Clone)]
pub struct TerrainTexture {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl TerrainTexture {
    /// Wrap an alpha buffer; `None` if the buffer does not match the size
    pub fn from_alpha(width: u32, height: u32, alpha: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || alpha.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            alpha,
        })
    }

    /// Fully transparent tile (open water)
    pub fn open_water(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; (width as usize) * (height as usize)],
        }
    }

    /// Procedural cavern: rock walls on both sides with a meandering channel
    /// and scattered boulders. Used when no painted texture is supplied.
    pub fn generate_cavern(width: u32, height: u32, rng: &mut Pcg32) -> Self {
        let mut alpha = vec![0u8; (width as usize) * (height as usize)];
        let w = width as f32;
        let phase = rng.random_range(0.0..std::f32::consts::TAU);
        // Full periods keep the tile seamless vertically
        let periods = rng.random_range(1..=3) as f32;
        let half_channel = w * 0.32;

        for y in 0..height {
            let t = y as f32 / height as f32 * std::f32::consts::TAU * periods + phase;
            let center = w / 2.0 + t.sin() * w * 0.08;
            let left = center - half_channel;
            let right = center + half_channel;
            for x in 0..width {
                let xf = x as f32;
                if xf < left || xf > right {
                    alpha[(y * width + x) as usize] = 255;
                }
            }
        }

        let boulders = rng.random_range(2..6);
        for _ in 0..boulders {
            let cx = rng.random_range(w * 0.3..w * 0.7);
            let cy = rng.random_range(0.0..height as f32);
            let r = rng.random_range(10.0..28.0f32);
            let (x0, x1) = ((cx - r).max(0.0) as u32, ((cx + r) as u32).min(width - 1));
            for x in x0..=x1 {
                for dy in -(r as i32)..=(r as i32) {
                    let dx = x as f32 - cx;
                    if dx * dx + (dy * dy) as f32 <= r * r {
                        let y = (cy as i32 + dy).rem_euclid(height as i32) as u32;
                        alpha[(y * width + x) as usize] = 255;
                    }
                }
            }
        }

        Self {
            width,
            height,
            alpha,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Alpha at integer texel coordinates, wrapped toroidally
    pub fn alpha_wrapped(&self, x: i64, y: i64) -> Option<u8> {
        let tx = x.rem_euclid(self.width as i64) as usize;
        let ty = y.rem_euclid(self.height as i64) as usize;
        self.alpha.get(ty * self.width as usize + tx).copied()
    }
}

/// The scrolling terrain layer
#[derive(Debug, Clone)]
pub struct Terrain {
    texture: Option<TerrainTexture>,
    /// World-space vertical displacement of the tile (decreases as the
    /// world scrolls up)
    offset_y: f32,
    threshold: u8,
    /// Sonar highlight of the rock, shown for the sonar-effect duration
    reveal: Option<Timer>,
}

impl Terrain {
    pub fn new(texture: Option<TerrainTexture>, threshold: u8) -> Self {
        Self {
            texture,
            offset_y: 0.0,
            threshold,
            reveal: None,
        }
    }

    /// Swap in the texture once it has finished loading
    pub fn set_texture(&mut self, texture: TerrainTexture) {
        self.texture = Some(texture);
    }

    pub fn is_loaded(&self) -> bool {
        self.texture.is_some()
    }

    /// Shift the tile up by `scroll` pixels
    pub fn scroll(&mut self, scroll: f32) {
        self.offset_y -= scroll;
    }

    /// Tile position for the renderer (grows as the descent continues)
    pub fn tile_position_y(&self) -> f32 {
        -self.offset_y
    }

    /// Alpha (0..=255) of the terrain under a world point, or `None` while
    /// the texture is not available
    pub fn query_opacity(&self, world: Vec2) -> Option<u8> {
        let texture = self.texture.as_ref()?;
        let x = world.x.floor() as i64;
        let y = (world.y - self.offset_y).floor() as i64;
        texture.alpha_wrapped(x, y)
    }

    /// Whether the world point is rock. Missing data is open water.
    pub fn is_solid(&self, world: Vec2) -> bool {
        self.query_opacity(world)
            .is_some_and(|alpha| alpha > self.threshold)
    }

    /// True if any of the points is rock
    pub fn any_solid(&self, points: &[Vec2]) -> bool {
        points.iter().any(|p| self.is_solid(*p))
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Highlight the rock for `secs`; an active highlight is not extended
    pub fn reveal(&mut self, secs: f32) {
        if self.reveal.is_none() {
            self.reveal = Some(Timer::once(secs));
        }
    }

    pub fn clear_reveal(&mut self) {
        self.reveal = None;
    }

    pub fn is_revealed(&self) -> bool {
        self.reveal.is_some()
    }

    /// Advance the highlight timer; returns true when it expires this frame
    pub fn tick_reveal(&mut self, dt: f32) -> bool {
        tick_once(&mut self.reveal, dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    /// 4x4 tile with a single opaque texel at (1, 2)
    fn dot_texture() -> TerrainTexture {
        let mut alpha = vec![0u8; 16];
        alpha[2 * 4 + 1] = 200;
        TerrainTexture::from_alpha(4, 4, alpha).unwrap()
    }

    #[test]
    fn test_unloaded_texture_fails_open() {
        let terrain = Terrain::new(None, 30);
        assert_eq!(terrain.query_opacity(Vec2::new(1.0, 2.0)), None);
        assert!(!terrain.is_solid(Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn test_query_wraps_toroidally() {
        let terrain = Terrain::new(Some(dot_texture()), 30);
        assert_eq!(terrain.query_opacity(Vec2::new(1.5, 2.5)), Some(200));
        assert_eq!(terrain.query_opacity(Vec2::new(5.0, 6.0)), Some(200));
        assert_eq!(terrain.query_opacity(Vec2::new(-3.0, -2.0)), Some(200));
        assert_eq!(terrain.query_opacity(Vec2::new(0.0, 0.0)), Some(0));
    }

    #[test]
    fn test_scroll_moves_rock_up() {
        let mut terrain = Terrain::new(Some(dot_texture()), 30);
        terrain.scroll(1.0);
        // The texel that was at world y=2 is now at world y=1
        assert!(terrain.is_solid(Vec2::new(1.0, 1.0)));
        assert!(!terrain.is_solid(Vec2::new(1.0, 2.0)));
        assert_eq!(terrain.tile_position_y(), 1.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let alpha = vec![30u8; 4];
        let terrain = Terrain::new(TerrainTexture::from_alpha(2, 2, alpha), 30);
        assert!(!terrain.is_solid(Vec2::ZERO));
        let alpha = vec![31u8; 4];
        let terrain = Terrain::new(TerrainTexture::from_alpha(2, 2, alpha), 30);
        assert!(terrain.is_solid(Vec2::ZERO));
    }

    #[test]
    fn test_mismatched_buffer_is_rejected() {
        assert!(TerrainTexture::from_alpha(4, 4, vec![0; 15]).is_none());
        assert!(TerrainTexture::from_alpha(0, 4, vec![]).is_none());
    }

    #[test]
    fn test_cavern_has_open_channel() {
        let mut rng = Pcg32::seed_from_u64(7);
        let texture = TerrainTexture::generate_cavern(800, 600, &mut rng);
        // Walls on the far edges, but the spawn column is mostly water
        assert_eq!(texture.alpha_wrapped(0, 10), Some(255));
        assert_eq!(texture.alpha_wrapped(799, 10), Some(255));
        let open = (0..600)
            .filter(|&y| texture.alpha_wrapped(400, y) == Some(0))
            .count();
        assert!(open > 300);
    }

    #[test]
    fn test_reveal_expires() {
        let mut terrain = Terrain::new(None, 30);
        terrain.reveal(1.0);
        assert!(terrain.is_revealed());
        assert!(!terrain.tick_reveal(0.5));
        assert!(terrain.tick_reveal(0.6));
        assert!(!terrain.is_revealed());
    }
}
