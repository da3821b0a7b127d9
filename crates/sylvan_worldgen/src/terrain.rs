use glam::{IVec2, Vec2};
use sylvan_core::{Color, EntityId, Namespace, Placement, Style};

use crate::noise::NoiseGenerator;
use crate::seed::WorldSeed;

/// Fraction of the window height where the surface sits at x = 0
const BASELINE_FACTOR: f32 = 2.0 / 3.0;
/// Noise amplitude in blocks
const NOISE_BLOCKS: i32 = 7;
const GROUND_COLOR: Color = Color::rgb(212, 123, 74);
const COLOR_JITTER: u8 = 10;

/// Solid terrain cell, identified by its grid-aligned top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub id: EntityId,
    pub position: IVec2,
    pub size: i32,
    pub color: Color,
}

impl Block {
    pub fn placement(&self) -> Placement {
        Placement {
            id: self.id,
            position: self.position.as_vec2(),
            size: Vec2::splat(self.size as f32),
            style: Style::rect(self.color),
        }
    }
}

/// Noise-driven height-field quantized to a block grid
#[derive(Debug, Clone)]
pub struct Terrain {
    seed: WorldSeed,
    noise: NoiseGenerator,
    window: Vec2,
    block_size: i32,
    ground_height_at_x0: i32,
}

impl Terrain {
    pub fn new(seed: WorldSeed, window: Vec2, block_size: i32) -> Self {
        let block_size = block_size.max(1);
        let ground_height_at_x0 = (window.y * BASELINE_FACTOR) as i32;
        log::info!(
            "Terrain: seed {}, window {}x{}, block {}, baseline {}",
            seed.value,
            window.x,
            window.y,
            block_size,
            ground_height_at_x0
        );
        Self {
            seed,
            noise: NoiseGenerator::new(seed, ground_height_at_x0 as f64),
            window,
            block_size,
            ground_height_at_x0,
        }
    }

    pub fn block_size(&self) -> i32 {
        self.block_size
    }

    pub fn ground_height_at_x0(&self) -> i32 {
        self.ground_height_at_x0
    }

    pub fn noise(&self) -> &NoiseGenerator {
        &self.noise
    }

    /// Amplitude handed to the noise generator
    pub fn noise_factor(&self) -> f64 {
        (self.block_size * NOISE_BLOCKS) as f64
    }

    /// Continuous surface height at any x
    pub fn ground_height_at(&self, x: f32) -> f32 {
        (self.ground_height_at_x0 as f64 + self.noise.noise(x as f64, self.noise_factor())) as f32
    }

    /// Surface height snapped down to the block grid
    pub fn surface_y_at(&self, x: i32) -> i32 {
        snap_down(self.ground_height_at(x as f32).floor() as i32, self.block_size)
    }

    /// Grid columns covering `[min_x, max_x)`, with `min_x` snapped down and
    /// `max_x` snapped up.
    pub fn columns(&self, min_x: i32, max_x: i32) -> impl Iterator<Item = i32> {
        grid_columns(min_x, max_x, self.block_size)
    }

    /// Every block from the surface down to the bottom of the window, columns
    /// left to right and rows top to bottom.
    pub fn create_in_range(&self, min_x: i32, max_x: i32) -> Vec<Block> {
        let bottom = self.window.y as i32;
        let mut blocks = Vec::new();

        for x in self.columns(min_x, max_x) {
            let column = x.div_euclid(self.block_size);
            let start_y = self.surface_y_at(x);
            for y in (start_y..bottom).step_by(self.block_size as usize) {
                let mut rng = self.seed.for_layer(x, y, WorldSeed::TERRAIN).rng();
                blocks.push(Block {
                    id: EntityId::pack(Namespace::Block, column, y.div_euclid(self.block_size) as u32),
                    position: IVec2::new(x, y),
                    size: self.block_size,
                    color: GROUND_COLOR.approximate(&mut rng, COLOR_JITTER),
                });
            }
        }

        log::debug!("Terrain [{}, {}): {} blocks", min_x, max_x, blocks.len());
        blocks
    }
}

pub(crate) fn snap_down(value: i32, step: i32) -> i32 {
    value.div_euclid(step) * step
}

pub(crate) fn snap_up(value: i32, step: i32) -> i32 {
    -snap_down(-value, step)
}

pub(crate) fn grid_columns(min_x: i32, max_x: i32, step: i32) -> impl Iterator<Item = i32> {
    let start = snap_down(min_x, step);
    let end = snap_up(max_x, step);
    (start..end).step_by(step as usize)
}
