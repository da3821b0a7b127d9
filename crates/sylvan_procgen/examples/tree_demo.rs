use sylvan_core::{RecordingSink, TweenScheduler};
use sylvan_procgen::tree::{generate_tree, TreeRecipe, TreeSite};

fn main() {
    println!("=== Sylvan - Tree Generation Demo ===\n");

    let recipe = TreeRecipe::oak();
    println!("Foliage lattice: {0}x{0} blocks", recipe.foliage_size);
    println!("Leaf probability: {:.2}", recipe.leaf_probability);
    println!("Fruit probability: {:.2}", recipe.fruit_probability);
    println!("Fruit palette: {} colours\n", recipe.fruit_palette.len());

    let site = TreeSite {
        x: 300,
        ground_y: 390,
        height: 240,
        block_size: 30,
    };

    // Demonstrate variation from seeds
    println!("=== Seed Variation Demo ===");
    for seed in [111, 222, 333, 444, 555] {
        let tree = generate_tree(&recipe, site, 30.0, seed);
        println!(
            "Seed {}: {} leaves, {} fruit, trunk {:?}",
            seed,
            tree.leaves.len(),
            tree.fruits.len(),
            tree.trunk.color
        );
    }

    println!("\n=== Jump Reaction ===");
    let mut tree = generate_tree(&recipe, site, 30.0, 12345);
    let mut scheduler = TweenScheduler::new();
    let mut sink = RecordingSink::new();
    tree.place(&mut sink);
    tree.schedule_animations(&mut scheduler);
    scheduler.tick(1.5);

    for jump in 1..=4 {
        tree.update(&mut scheduler, &mut sink);
        println!(
            "Jump {}: fruit colour index {}, {} active tweens",
            jump,
            tree.fruit_color_index(),
            scheduler.active_tweens()
        );
        scheduler.tick(1.0);
    }

    println!("\nPlaced {} parts, {} restyles", sink.len(), sink.restyle_count());
}
