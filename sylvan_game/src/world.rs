use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;
use sylvan_core::{
    Color, EntityId, EventBus, EventKind, Layer, Namespace, Placement, PlacementSink,
    SchedulerEvent, Style, TweenScheduler,
};
use sylvan_procgen::Tree;
use sylvan_worldgen::{Flora, Terrain, WorldSeed};

use crate::avatar::{Avatar, AvatarInput};
use crate::chunk_manager::{ChunkCoord, ChunkManager, LoadedChunk};
use crate::config::{ConfigError, WorldConfig};
use crate::daynight::DayNight;

pub const AVATAR_ID: EntityId = EntityId::pack(Namespace::Host, 0, 5);
const AVATAR_COLOR: Color = Color::rgb(60, 60, 160);

/// What happened during one frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub jumped: bool,
    /// Trees that received the jump event
    pub trees_notified: usize,
    pub fruit_eaten: usize,
    pub fruit_respawned: usize,
    pub chunks_loaded: usize,
    pub chunks_unloaded: usize,
}

/// A streamed world: terrain, trees, the avatar and the sky, all wired to one
/// placement sink, one tween scheduler and one event bus.
pub struct World<S: PlacementSink> {
    config: WorldConfig,
    terrain: Arc<Terrain>,
    flora: Flora,
    /// Live trees keyed by column; the column doubles as the bus handle
    trees: HashMap<i32, Tree>,
    bus: EventBus<i32>,
    scheduler: TweenScheduler,
    chunks: ChunkManager,
    day_night: DayNight,
    avatar: Avatar,
    sink: S,
    time: f32,
}

impl<S: PlacementSink> World<S> {
    pub fn new(config: WorldConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = WorldSeed::new(config.seed);
        let window = Vec2::new(config.window_width, config.window_height);
        let terrain = Arc::new(Terrain::new(seed, window, config.block_size));
        let flora = Flora::new(
            Arc::clone(&terrain),
            config.flora.clone(),
            seed,
            config.day_night_cycle_length,
        );

        let ground = terrain.surface_y_at(0) as f32;
        let avatar = Avatar::new(Vec2::new(0.0, ground - config.avatar.size), config.avatar.clone());

        let mut world = Self {
            chunks: ChunkManager::new(config.chunk_width(), config.load_radius, config.unload_radius),
            day_night: DayNight::new(window, config.day_night_cycle_length),
            terrain,
            flora,
            trees: HashMap::new(),
            bus: EventBus::new(),
            scheduler: TweenScheduler::new(),
            avatar,
            sink,
            time: 0.0,
            config,
        };

        world.day_night.setup(&mut world.sink, &mut world.scheduler);
        world.sink.place(
            Placement {
                id: AVATAR_ID,
                position: world.avatar.position,
                size: world.avatar.size(),
                style: Style::rect(AVATAR_COLOR),
            },
            Layer::Default,
        );
        world.stream_chunks();

        log::info!(
            "World ready: seed {}, {} chunks, {} trees",
            world.config.seed,
            world.chunks.chunk_count(),
            world.trees.len()
        );
        Ok(world)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn scheduler(&self) -> &TweenScheduler {
        &self.scheduler
    }

    pub fn chunks(&self) -> &ChunkManager {
        &self.chunks
    }

    pub fn bus(&self) -> &EventBus<i32> {
        &self.bus
    }

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub fn avatar_mut(&mut self) -> &mut Avatar {
        &mut self.avatar
    }

    pub fn tree(&self, column: i32) -> Option<&Tree> {
        self.trees.get(&column)
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.values()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Hand a tree to the host, start its sway and subscribe it to jumps.
    /// Returns `false` when its column already has one.
    fn register_tree(&mut self, tree: Tree) -> bool {
        let column = tree.column();
        if self.trees.contains_key(&column) {
            return false;
        }
        tree.place(&mut self.sink);
        tree.schedule_animations(&mut self.scheduler);
        self.bus.subscribe(EventKind::Jump, column);
        self.trees.insert(column, tree);
        true
    }

    fn drop_tree(&mut self, column: i32) {
        if let Some(tree) = self.trees.remove(&column) {
            tree.cancel_animations(&mut self.scheduler);
            for id in tree.entity_ids() {
                self.sink.remove(id);
            }
            self.bus.unsubscribe(EventKind::Jump, column);
        }
    }

    /// Grow a tree at `x` whatever the plant roll says. Returns its column,
    /// or `None` when the column is outside the loaded chunks, already has a
    /// tree or leaves no room for one.
    pub fn plant_tree(&mut self, x: i32) -> Option<i32> {
        let coord = ChunkCoord::from_world_x(x as f32, self.chunks.chunk_width);
        if !self.chunks.is_materialized(coord) {
            log::warn!("Not planting at {}: chunk {} is not loaded", x, coord.x);
            return None;
        }
        let tree = self.flora.create_tree(x)?;
        let column = tree.column();
        if !self.register_tree(tree) {
            return None;
        }
        if let Some(chunk) = self.chunks.get_mut(coord) {
            chunk.tree_columns.push(column);
        }
        Some(column)
    }

    fn load_chunk(&mut self, coord: ChunkCoord) {
        let (min_x, max_x) = coord.span(self.chunks.chunk_width);

        let blocks = self.terrain.create_in_range(min_x, max_x);
        let mut chunk = LoadedChunk {
            block_ids: Vec::with_capacity(blocks.len()),
            tree_columns: Vec::new(),
        };
        for block in &blocks {
            self.sink.place(block.placement(), Layer::StaticObjects);
            chunk.block_ids.push(block.id);
        }

        for tree in self.flora.create_in_range(min_x, max_x) {
            let column = tree.column();
            if self.register_tree(tree) {
                chunk.tree_columns.push(column);
            }
        }

        log::debug!(
            "Chunk {} [{}, {}): {} blocks, {} trees",
            coord.x,
            min_x,
            max_x,
            chunk.block_ids.len(),
            chunk.tree_columns.len()
        );
        self.chunks.add_chunk(coord, chunk);
    }

    fn unload_chunk(&mut self, chunk: LoadedChunk) {
        for id in chunk.block_ids {
            self.sink.remove(id);
        }
        for column in chunk.tree_columns {
            self.drop_tree(column);
        }
    }

    /// Materialize what the avatar needs and drop what it left behind.
    /// Returns (loaded, unloaded).
    fn stream_chunks(&mut self) -> (usize, usize) {
        let update = self.chunks.update(self.avatar.center().x);
        let counts = (update.load.len(), update.unload.len());
        for (_, chunk) in update.unload {
            self.unload_chunk(chunk);
        }
        for coord in update.load {
            self.load_chunk(coord);
        }
        counts
    }

    /// Ground row under the avatar's centre column
    fn ground_under_avatar(&self) -> f32 {
        let block = self.terrain.block_size();
        let x = (self.avatar.center().x / block as f32).floor() as i32 * block;
        self.terrain.surface_y_at(x) as f32
    }

    /// Advance the world by one frame
    pub fn tick(&mut self, dt: f32, input: AvatarInput) -> TickReport {
        let mut report = TickReport::default();

        if let Some(event) = self.avatar.update(input) {
            report.jumped = true;
            let trees = &mut self.trees;
            let scheduler = &mut self.scheduler;
            let sink = &mut self.sink;
            report.trees_notified = self.bus.publish(&event, |column, _| {
                if let Some(tree) = trees.get_mut(&column) {
                    tree.update(scheduler, sink);
                }
            });
        }

        let ground = self.ground_under_avatar();
        self.avatar.integrate(dt, ground);
        self.sink.reposition(AVATAR_ID, self.avatar.position);

        let position = self.avatar.position;
        let size = self.avatar.size();
        for tree in self.trees.values_mut() {
            while let Some(index) = tree.touching_fruit(position, size) {
                if !tree.consume_fruit(index, &mut self.scheduler, &mut self.sink) {
                    break;
                }
                self.avatar.eat();
                report.fruit_eaten += 1;
            }
        }

        for event in self.scheduler.tick(dt) {
            if let SchedulerEvent::TimerFired { token, .. } = event {
                if token.namespace() != Some(Namespace::Tree) {
                    continue;
                }
                if let Some(tree) = self.trees.get_mut(&token.major()) {
                    if tree.respawn_fruit(token, &mut self.sink) {
                        report.fruit_respawned += 1;
                    }
                }
            }
        }

        self.day_night.update(&self.scheduler, &mut self.sink);

        let (loaded, unloaded) = self.stream_chunks();
        report.chunks_loaded = loaded;
        report.chunks_unloaded = unloaded;

        self.time += dt;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sylvan_core::{Property, PropertyKey, RecordingSink};
    use sylvan_worldgen::FloraConfig;

    const DT: f32 = 1.0 / 60.0;

    fn config(plant_probability: f32) -> WorldConfig {
        WorldConfig {
            flora: FloraConfig {
                plant_probability,
                ..FloraConfig::default()
            },
            ..WorldConfig::default()
        }
    }

    fn bare_world() -> World<RecordingSink> {
        World::new(config(0.0), RecordingSink::new()).expect("valid config")
    }

    fn jump() -> AvatarInput {
        AvatarInput {
            jump: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_streaming() {
        let world = World::new(WorldConfig::default(), RecordingSink::new()).expect("valid config");
        assert_eq!(world.chunks().chunk_count(), 3);
        for x in [-480, 0, 959] {
            assert!(world.chunks().is_column_materialized(x));
        }
        assert!(!world.chunks().is_column_materialized(960));
        assert!(world.sink().get(AVATAR_ID).is_some());
        assert_eq!(world.bus().subscribers(EventKind::Jump).len(), world.trees().count());
    }

    #[test]
    fn test_avatar_starts_on_ground() {
        let world = bare_world();
        let ground = world.terrain().surface_y_at(0) as f32;
        assert_eq!(world.avatar().position.y + 50.0, ground);
    }

    #[test]
    fn test_jump_reaches_every_registered_tree_once() {
        let mut world = bare_world();
        let first = world.plant_tree(300).expect("room for a tree");
        let second = world.plant_tree(600).expect("room for a tree");
        world.tick(DT, AvatarInput::default());

        let before: Vec<(i32, Vec<(PropertyKey, f32)>)> = [first, second]
            .iter()
            .map(|&c| {
                let tree = world.tree(c).expect("planted");
                let angles = tree
                    .leaves
                    .iter()
                    .map(|l| (l.angle_key(), l.current_angle(world.scheduler())))
                    .collect();
                (c, angles)
            })
            .collect();

        let report = world.tick(DT, jump());
        assert!(report.jumped);
        assert_eq!(report.trees_notified, 2);

        for (column, angles) in before {
            let tree = world.tree(column).expect("still loaded");
            assert_eq!(tree.fruit_color_index(), 1);
            for (key, angle) in angles {
                assert_eq!(key.property, Property::Angle);
                let tween = world.scheduler().tweens_for(key).last().copied();
                let tween = tween.expect("jump tween running");
                assert_eq!(tween.from, angle);
                assert_eq!(tween.to, angle + 90.0);
            }
        }

        // airborne: holding jump does nothing more
        let report = world.tick(DT, jump());
        assert!(!report.jumped);
        assert_eq!(world.tree(first).map(|t| t.fruit_color_index()), Some(1));
    }

    #[test]
    fn test_fruit_eaten_and_respawned_after_cycle() {
        let mut world = bare_world();
        let mut fruit = None;
        for i in 0..40 {
            let Some(column) = world.plant_tree(i * 30 - 300) else {
                continue;
            };
            fruit = world.tree(column).and_then(|t| t.fruits.first().cloned());
            if fruit.is_some() {
                break;
            }
        }
        let fruit = fruit.expect("a tree with fruit");

        world.avatar_mut().position = fruit.position;
        let report = world.tick(DT, AvatarInput::default());
        assert!(report.fruit_eaten >= 1);
        assert_eq!(world.sink().get(fruit.id).map(|p| p.visible), Some(false));

        // the respawn timer has already seen one DT
        let mut respawned = 0;
        for _ in 0..59 {
            respawned += world.tick(0.5, AvatarInput::default()).fruit_respawned;
        }
        assert_eq!(world.sink().get(fruit.id).map(|p| p.visible), Some(false));
        respawned += world.tick(0.5, AvatarInput::default()).fruit_respawned;
        assert!(respawned >= 1);
        assert_eq!(world.sink().get(fruit.id).map(|p| p.visible), Some(true));
    }

    #[test]
    fn test_far_chunks_are_unloaded() {
        let mut world = World::new(config(1.0), RecordingSink::new()).expect("valid config");
        let old_trees: Vec<i32> = world.trees().map(|t| t.column()).collect();
        assert!(!old_trees.is_empty());

        world.avatar_mut().position.x = 10.0 * 480.0;
        let report = world.tick(DT, AvatarInput::default());
        assert_eq!(report.chunks_unloaded, 3);
        assert_eq!(report.chunks_loaded, 3);

        for column in old_trees {
            assert!(world.tree(column).is_none());
            assert!(!world.bus().subscribers(EventKind::Jump).contains(&column));
        }
        assert!(!world.chunks().is_column_materialized(0));
        let stale = world
            .sink()
            .iter()
            .filter(|p| p.placement.id.namespace() == Some(Namespace::Block))
            .any(|p| p.placement.position.x < 4000.0);
        assert!(!stale);
    }

    #[test]
    fn test_planting_needs_a_loaded_chunk() {
        let mut world = bare_world();
        assert!(!world.chunks().is_column_materialized(3000));
        assert_eq!(world.plant_tree(3000), None);
        assert!(world.tree(100).is_none());
        assert!(world.bus().subscribers(EventKind::Jump).is_empty());

        let column = world.plant_tree(300).expect("room for a tree");
        assert_eq!(world.plant_tree(300), None);

        // walking away tears the planted tree down with its chunk
        world.avatar_mut().position.x = -20000.0;
        world.tick(DT, AvatarInput::default());
        assert!(world.tree(column).is_none());
        assert_eq!(world.trees().count(), 0);
        assert!(world.bus().subscribers(EventKind::Jump).is_empty());
        // only the day-night tweens are left running
        assert_eq!(world.scheduler().active_tweens(), 2);
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = World::new(WorldConfig::default(), RecordingSink::new()).expect("valid config");
        let b = World::new(WorldConfig::default(), RecordingSink::new()).expect("valid config");
        let mut ca: Vec<i32> = a.trees().map(|t| t.column()).collect();
        let mut cb: Vec<i32> = b.trees().map(|t| t.column()).collect();
        ca.sort();
        cb.sort();
        assert_eq!(ca, cb);
        assert_eq!(a.sink().len(), b.sink().len());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = WorldConfig::default();
        bad.block_size = -3;
        assert!(World::new(bad, RecordingSink::new()).is_err());
    }
}
