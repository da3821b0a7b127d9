use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sylvan_core::{
    Color, EntityId, Layer, Namespace, Placement, PlacementSink, Style, Tween, TweenScheduler,
};

use crate::fruit::Fruit;
use crate::leaf::{Leaf, LeafAnimation};

/// Everything that shapes a tree once its column and height are known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeRecipe {
    /// Side of the square foliage lattice, in blocks
    pub foliage_size: i32,
    pub leaf_probability: f32,
    pub fruit_probability: f32,
    /// Base sway period of a leaf, in seconds
    pub leaf_cycle_length: f32,
    /// Extra tilt every leaf receives when a jump is broadcast (degrees)
    pub jump_leaf_rotation: f32,
    pub jump_leaf_duration: f32,
    pub trunk_color: Color,
    pub leaf_color: Color,
    /// Fruit colours cycled through on every jump
    pub fruit_palette: Vec<Color>,
    /// Per-channel jitter applied to trunk and leaf colours
    pub color_jitter: u8,
}

impl Default for TreeRecipe {
    fn default() -> Self {
        TreeRecipe::oak()
    }
}

impl TreeRecipe {
    /// Broad-leaved fruit tree
    pub fn oak() -> Self {
        TreeRecipe {
            foliage_size: 7,
            leaf_probability: 0.55,
            fruit_probability: 0.12,
            leaf_cycle_length: 10.0,
            jump_leaf_rotation: 90.0,
            jump_leaf_duration: 1.0,
            trunk_color: Color::rgb(100, 50, 20),
            leaf_color: Color::rgb(50, 200, 30),
            fruit_palette: vec![Color::RED, Color::YELLOW, Color::ORANGE, Color::GREEN],
            color_jitter: 10,
        }
    }

    /// Lattice offsets `[-n/2, n/2)` on both axes, row-major by x then y
    pub fn lattice(&self) -> impl Iterator<Item = IVec2> {
        let half = self.foliage_size / 2;
        (-half..half).flat_map(move |i| (-half..half).map(move |j| IVec2::new(i, j)))
    }

    /// Shortest trunk, in blocks, that still keeps the canopy above ground
    pub fn min_height_blocks(&self) -> i32 {
        self.foliage_size - 1
    }
}

/// Where a tree stands and how tall it is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSite {
    /// Grid-aligned x of the trunk column
    pub x: i32,
    /// Grid-aligned surface y the trunk stands on
    pub ground_y: i32,
    /// Trunk height in world units, a multiple of `block_size`
    pub height: i32,
    pub block_size: i32,
}

impl TreeSite {
    pub fn column(&self) -> i32 {
        self.x.div_euclid(self.block_size)
    }

    /// Top-left corner of the trunk
    pub fn origin(&self) -> IVec2 {
        IVec2::new(self.x, self.ground_y - self.height)
    }
}

/// Immovable column of blocks from the ground up to the canopy
#[derive(Debug, Clone, PartialEq)]
pub struct Trunk {
    pub id: EntityId,
    pub position: Vec2,
    pub size: Vec2,
    pub color: Color,
}

impl Trunk {
    /// Top-left corners of the blocks stacked in this trunk, top to bottom
    pub fn cells(&self, block_size: i32) -> impl Iterator<Item = IVec2> {
        let x = self.position.x as i32;
        let top = self.position.y as i32;
        let bottom = top + self.size.y as i32;
        (top..bottom)
            .step_by(block_size.max(1) as usize)
            .map(move |y| IVec2::new(x, y))
    }
}

/// Trunk, foliage and fruit anchored to one column
#[derive(Debug, Clone)]
pub struct Tree {
    pub site: TreeSite,
    pub trunk: Trunk,
    pub leaves: Vec<Leaf>,
    pub fruits: Vec<Fruit>,
    recipe: TreeRecipe,
    fruit_color_index: usize,
    rng: ChaCha8Rng,
}

/// Part index 0 is the trunk; leaves and fruit are keyed by lattice cell so
/// ids stay stable whatever the random draws were.
fn part_id(column: i32, part: u32) -> EntityId {
    EntityId::pack(Namespace::Tree, column, part)
}

/// Build a tree at `site`, drawing every random decision from `seed`.
pub fn generate_tree(
    recipe: &TreeRecipe,
    site: TreeSite,
    fruit_respawn_delay: f32,
    seed: u64,
) -> Tree {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let column = site.column();
    let block = site.block_size as f32;
    let origin = site.origin();

    let trunk = Trunk {
        id: part_id(column, 0),
        position: origin.as_vec2(),
        size: Vec2::new(block, site.height as f32),
        color: recipe.trunk_color.approximate(&mut rng, recipe.color_jitter),
    };

    let cells = (recipe.foliage_size * recipe.foliage_size).max(0) as u32;
    let initial_fruit_color = recipe.fruit_palette.first().copied().unwrap_or(Color::RED);
    let mut leaves = Vec::new();
    let mut fruits = Vec::new();

    for (cell, offset) in recipe.lattice().enumerate() {
        let cell = cell as u32;
        // Both draws happen for every cell so one decision never shifts the other
        let leaf_roll = rng.gen::<f32>();
        let fruit_roll = rng.gen::<f32>();
        let position = (origin + offset * site.block_size).as_vec2();
        let size = Vec2::splat(block);

        if leaf_roll <= recipe.leaf_probability {
            leaves.push(Leaf {
                id: part_id(column, 1 + cell),
                offset,
                position,
                size,
                color: recipe.leaf_color.approximate(&mut rng, recipe.color_jitter),
                animation: LeafAnimation::roll(&mut rng),
            });
        }
        // The trunk's own column never bears fruit
        if fruit_roll <= recipe.fruit_probability && offset.x != 0 {
            fruits.push(Fruit::new(
                part_id(column, 1 + cells + cell),
                offset,
                position,
                size,
                initial_fruit_color,
                fruit_respawn_delay,
            ));
        }
    }

    log::debug!(
        "Generated tree at x={} height={} ({} leaves, {} fruit)",
        site.x,
        site.height,
        leaves.len(),
        fruits.len()
    );

    Tree {
        site,
        trunk,
        leaves,
        fruits,
        recipe: recipe.clone(),
        fruit_color_index: 0,
        rng,
    }
}

impl Tree {
    pub fn column(&self) -> i32 {
        self.site.column()
    }

    pub fn height(&self) -> i32 {
        self.site.height
    }

    pub fn fruit_color_index(&self) -> usize {
        self.fruit_color_index
    }

    /// Ids of every part, for removal from the host
    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        std::iter::once(self.trunk.id)
            .chain(self.leaves.iter().map(|l| l.id))
            .chain(self.fruits.iter().map(|f| f.id))
    }

    /// Hand every part to the host
    pub fn place(&self, sink: &mut dyn PlacementSink) {
        sink.place(
            Placement {
                id: self.trunk.id,
                position: self.trunk.position,
                size: self.trunk.size,
                style: Style::rect(self.trunk.color),
            },
            Layer::StaticObjects,
        );
        for leaf in &self.leaves {
            sink.place(
                Placement {
                    id: leaf.id,
                    position: leaf.position,
                    size: leaf.size,
                    style: Style::rect(leaf.color),
                },
                Layer::StaticObjects,
            );
        }
        for fruit in &self.fruits {
            sink.place(
                Placement {
                    id: fruit.id,
                    position: fruit.position,
                    size: fruit.size,
                    style: Style::oval(fruit.color),
                },
                Layer::Default,
            );
            sink.set_visible(fruit.id, fruit.is_collidable());
        }
    }

    /// Start every leaf's idle sway
    pub fn schedule_animations(&self, scheduler: &mut TweenScheduler) {
        for leaf in &self.leaves {
            leaf.schedule_sway(scheduler, self.recipe.leaf_cycle_length);
        }
    }

    /// Jump reaction: every leaf tips forward once from where it is now, all
    /// fruit switch to the next palette colour and the trunk gets a fresh
    /// shade of its base colour.
    pub fn update(&mut self, scheduler: &mut TweenScheduler, sink: &mut dyn PlacementSink) {
        for leaf in &self.leaves {
            let current = leaf.current_angle(scheduler);
            scheduler.start(Tween::new(
                leaf.angle_key(),
                current,
                current + self.recipe.jump_leaf_rotation,
                self.recipe.jump_leaf_duration,
            ));
        }

        let palette = &self.recipe.fruit_palette;
        if !palette.is_empty() {
            self.fruit_color_index = (self.fruit_color_index + 1) % palette.len();
            let color = palette[self.fruit_color_index];
            for fruit in &mut self.fruits {
                fruit.color = color;
                sink.restyle(fruit.id, Style::oval(color));
            }
        }

        self.trunk.color = self
            .recipe
            .trunk_color
            .approximate(&mut self.rng, self.recipe.color_jitter);
        sink.restyle(self.trunk.id, Style::rect(self.trunk.color));
    }

    /// Index of the first visible fruit overlapping the given box
    pub fn touching_fruit(&self, position: Vec2, size: Vec2) -> Option<usize> {
        self.fruits
            .iter()
            .position(|f| f.is_collidable() && f.overlaps(position, size))
    }

    /// Eat fruit `index`; hides it on the host when it was visible
    pub fn consume_fruit(
        &mut self,
        index: usize,
        scheduler: &mut TweenScheduler,
        sink: &mut dyn PlacementSink,
    ) -> bool {
        let Some(fruit) = self.fruits.get_mut(index) else {
            return false;
        };
        let eaten = fruit.consume(scheduler);
        if eaten {
            sink.set_visible(fruit.id, false);
        }
        eaten
    }

    /// Respawn timer for one of this tree's fruit fired
    pub fn respawn_fruit(&mut self, id: EntityId, sink: &mut dyn PlacementSink) -> bool {
        let Some(fruit) = self.fruits.iter_mut().find(|f| f.id == id) else {
            return false;
        };
        let respawned = fruit.respawn();
        if respawned {
            sink.set_visible(id, true);
        }
        respawned
    }

    /// Cancel the sway and respawn timers of every part
    pub fn cancel_animations(&self, scheduler: &mut TweenScheduler) {
        for id in self.entity_ids() {
            scheduler.cancel_entity(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sylvan_core::RecordingSink;

    fn site() -> TreeSite {
        TreeSite {
            x: 300,
            ground_y: 390,
            height: 240,
            block_size: 30,
        }
    }

    fn tree(seed: u64) -> Tree {
        generate_tree(&TreeRecipe::oak(), site(), 30.0, seed)
    }

    #[test]
    fn test_lattice_bounds() {
        let recipe = TreeRecipe::oak();
        let cells: Vec<IVec2> = recipe.lattice().collect();
        assert_eq!(cells.len(), 36);
        assert!(cells.iter().all(|c| (-3..3).contains(&c.x) && (-3..3).contains(&c.y)));
        assert_eq!(cells[0], IVec2::new(-3, -3));
        assert_eq!(cells[1], IVec2::new(-3, -2));
    }

    #[test]
    fn test_trunk_geometry() {
        let t = tree(1);
        assert_eq!(t.trunk.position, Vec2::new(300.0, 150.0));
        assert_eq!(t.trunk.size, Vec2::new(30.0, 240.0));
        let cells: Vec<IVec2> = t.trunk.cells(30).collect();
        assert_eq!(cells.len(), 8);
        assert_eq!(cells.first(), Some(&IVec2::new(300, 150)));
        assert_eq!(cells.last(), Some(&IVec2::new(300, 360)));
    }

    #[test]
    fn test_foliage_on_lattice_and_fruit_off_trunk_column() {
        for seed in 0..200 {
            let t = tree(seed);
            let origin = t.trunk.position;
            for leaf in &t.leaves {
                let d = leaf.position - origin;
                assert_eq!(d, (leaf.offset * 30).as_vec2());
                assert_eq!(d.x % 30.0, 0.0);
                assert_eq!(d.y % 30.0, 0.0);
            }
            for fruit in &t.fruits {
                assert_ne!(fruit.offset.x, 0);
                assert_eq!(fruit.position - origin, (fruit.offset * 30).as_vec2());
            }
        }
    }

    #[test]
    fn test_same_seed_same_tree() {
        let a = tree(77);
        let b = tree(77);
        assert_eq!(a.trunk, b.trunk);
        assert_eq!(a.leaves, b.leaves);
        assert_eq!(a.fruits, b.fruits);
    }

    #[test]
    fn test_entity_ids_unique() {
        let t = tree(5);
        let mut ids: Vec<EntityId> = t.entity_ids().collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(total, 1 + t.leaves.len() + t.fruits.len());
    }

    #[test]
    fn test_update_rotates_leaves_and_cycles_fruit() {
        // find a seed with at least one leaf and one fruit
        let mut t = (0..500)
            .map(tree)
            .find(|t| !t.leaves.is_empty() && !t.fruits.is_empty())
            .expect("a tree with leaves and fruit");
        let mut scheduler = TweenScheduler::new();
        let mut sink = RecordingSink::new();
        t.place(&mut sink);
        t.schedule_animations(&mut scheduler);
        scheduler.tick(2.0);

        let before: Vec<f32> = t.leaves.iter().map(|l| l.current_angle(&scheduler)).collect();
        t.update(&mut scheduler, &mut sink);

        for (leaf, angle) in t.leaves.iter().zip(before) {
            let jump = scheduler.tweens_for(leaf.angle_key()).last().copied();
            let jump = jump.expect("jump tween");
            assert_eq!(jump.from, angle);
            assert_eq!(jump.to, angle + 90.0);
            assert_eq!(jump.duration, 1.0);
        }
        assert_eq!(t.fruit_color_index(), 1);
        assert!(t.fruits.iter().all(|f| f.color == Color::YELLOW));
        let first = t.fruits[0].id;
        assert_eq!(sink.get(first).map(|p| p.placement.style.color), Some(Color::YELLOW));

        for _ in 0..3 {
            t.update(&mut scheduler, &mut sink);
        }
        assert_eq!(t.fruit_color_index(), 0);
        assert!(t.fruits.iter().all(|f| f.color == Color::RED));
    }

    #[test]
    fn test_consume_and_respawn_through_tree() {
        let mut t = (0..500).map(tree).find(|t| !t.fruits.is_empty()).expect("fruit");
        let mut scheduler = TweenScheduler::new();
        let mut sink = RecordingSink::new();
        t.place(&mut sink);

        let fruit = t.fruits[0].clone();
        assert_eq!(t.touching_fruit(fruit.position, fruit.size), Some(0));
        assert!(t.consume_fruit(0, &mut scheduler, &mut sink));
        assert_eq!(sink.get(fruit.id).map(|p| p.visible), Some(false));
        assert!(!t.consume_fruit(0, &mut scheduler, &mut sink));

        assert!(t.respawn_fruit(fruit.id, &mut sink));
        assert_eq!(sink.get(fruit.id).map(|p| p.visible), Some(true));
    }

    #[test]
    fn test_respawn_only_hidden_fruit() {
        let mut t = (0..500).map(tree).find(|t| !t.fruits.is_empty()).expect("fruit");
        let mut scheduler = TweenScheduler::new();
        let mut sink = RecordingSink::new();
        t.place(&mut sink);

        let id = t.fruits[0].id;
        assert!(!t.respawn_fruit(id, &mut sink));
        assert!(!t.respawn_fruit(t.trunk.id, &mut sink));

        assert!(t.consume_fruit(0, &mut scheduler, &mut sink));
        assert!(t.respawn_fruit(id, &mut sink));
        assert!(!t.respawn_fruit(id, &mut sink));
        assert_eq!(sink.get(id).map(|p| p.visible), Some(true));
    }

    #[test]
    fn test_place_and_cancel() {
        let t = tree(9);
        let mut scheduler = TweenScheduler::new();
        let mut sink = RecordingSink::new();
        t.place(&mut sink);
        t.schedule_animations(&mut scheduler);
        assert_eq!(sink.len(), 1 + t.leaves.len() + t.fruits.len());
        assert_eq!(scheduler.active_tweens(), 2 * t.leaves.len());

        t.cancel_animations(&mut scheduler);
        assert_eq!(scheduler.active_tweens(), 0);
    }
}
