use std::sync::Arc;

use glam::Vec2;
use sylvan_worldgen::{Flora, FloraConfig, Terrain, WorldSeed};

fn main() {
    let world_seed = WorldSeed::new(1587);
    let terrain = Arc::new(Terrain::new(world_seed, Vec2::new(800.0, 600.0), 30));

    println!("World Seed: {}", world_seed.value);
    println!("Baseline: {}", terrain.ground_height_at_x0());
    println!("Noise amplitude: {}\n", terrain.noise_factor());

    let flora = Flora::new(Arc::clone(&terrain), FloraConfig::default(), world_seed, 30.0);

    // One row per column, surface drawn as a bar
    for x in terrain.columns(0, 800) {
        let surface = terrain.surface_y_at(x);
        let depth = ((600 - surface) / 30).max(0) as usize;
        let tree = if flora.is_planted(x) { "T" } else { " " };
        println!("x={:>4} surface={:>4} {} {}", x, surface, tree, "#".repeat(depth));
    }

    let blocks = terrain.create_in_range(0, 800);
    let trees = flora.create_in_range(0, 800);
    println!("\n{} blocks, {} trees in the first screen", blocks.len(), trees.len());
    for tree in &trees {
        println!(
            "  tree at x={} height={} leaves={} fruit={}",
            tree.site.x,
            tree.height(),
            tree.leaves.len(),
            tree.fruits.len()
        );
    }
}
