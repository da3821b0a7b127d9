use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use sylvan_procgen::{generate_tree, Tree, TreeRecipe, TreeSite};

use crate::seed::WorldSeed;
use crate::terrain::Terrain;

/// Vegetation placement parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloraConfig {
    /// Chance that any given column grows a tree
    pub plant_probability: f32,
    /// Tallest trunk allowed anywhere, in blocks
    pub max_height_blocks: i32,
    pub recipe: TreeRecipe,
}

impl Default for FloraConfig {
    fn default() -> Self {
        Self {
            plant_probability: 0.1,
            max_height_blocks: 10,
            recipe: TreeRecipe::default(),
        }
    }
}

/// Places trees over a terrain
#[derive(Debug, Clone)]
pub struct Flora {
    terrain: Arc<Terrain>,
    config: FloraConfig,
    seed: WorldSeed,
    /// Respawn delay handed to every fruit
    day_night_cycle_length: f32,
}

impl Flora {
    pub fn new(
        terrain: Arc<Terrain>,
        config: FloraConfig,
        seed: WorldSeed,
        day_night_cycle_length: f32,
    ) -> Self {
        Self {
            terrain,
            config,
            seed,
            day_night_cycle_length,
        }
    }

    pub fn config(&self) -> &FloraConfig {
        &self.config
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Whether the column at `x` grows a tree. One draw per column from the
    /// column's own stream.
    pub fn is_planted(&self, x: i32) -> bool {
        let column = x.div_euclid(self.terrain.block_size());
        let mut rng = self.seed.for_layer(column, 0, WorldSeed::FLORA).rng();
        rng.gen::<f32>() < self.config.plant_probability
    }

    /// Trees for every planted column in `[min_x, max_x)`, left to right
    pub fn create_in_range(&self, min_x: i32, max_x: i32) -> Vec<Tree> {
        let trees: Vec<Tree> = self
            .terrain
            .columns(min_x, max_x)
            .filter(|&x| self.is_planted(x))
            .filter_map(|x| self.create_tree(x))
            .collect();
        log::debug!("Flora [{}, {}): {} trees", min_x, max_x, trees.len());
        trees
    }

    /// Height of a tree at `x`, in blocks: uniform between the shortest
    /// trunk that fits the canopy and the lower of the global cap and the
    /// local ground height. `None` when that range is empty.
    pub fn height_range(&self, x: i32) -> Option<(i32, i32)> {
        let block = self.terrain.block_size();
        let ground = self.terrain.surface_y_at(x);
        let max = (ground / block).min(self.config.max_height_blocks);
        let min = self.config.recipe.min_height_blocks().max(1);
        if max < min {
            log::warn!(
                "No room for a tree at x={}: height range [{}, {}] blocks is empty",
                x,
                min,
                max
            );
            return None;
        }
        Some((min, max))
    }

    /// Build the tree standing on column `x`, regardless of the plant roll
    pub fn create_tree(&self, x: i32) -> Option<Tree> {
        let block = self.terrain.block_size();
        let x = x.div_euclid(block) * block;
        let (min, max) = self.height_range(x)?;

        let column = x.div_euclid(block);
        let mut rng = self.seed.for_layer(column, 0, WorldSeed::TREE).rng();
        let height = rng.gen_range(min..=max) * block;
        let site = TreeSite {
            x,
            ground_y: self.terrain.surface_y_at(x),
            height,
            block_size: block,
        };
        Some(generate_tree(
            &self.config.recipe,
            site,
            self.day_night_cycle_length,
            rng.gen(),
        ))
    }
}
