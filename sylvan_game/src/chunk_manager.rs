use std::collections::{HashMap, HashSet};

use sylvan_core::EntityId;

/// Coordinates for a chunk in chunk space (not world space)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
}

impl ChunkCoord {
    pub fn from_world_x(world_x: f32, chunk_width: i32) -> Self {
        Self {
            x: (world_x / chunk_width as f32).floor() as i32,
        }
    }

    /// World-space span `[min_x, max_x)` covered by this chunk
    pub fn span(&self, chunk_width: i32) -> (i32, i32) {
        let min_x = self.x * chunk_width;
        (min_x, min_x + chunk_width)
    }
}

/// What a materialized chunk put into the world
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoadedChunk {
    pub block_ids: Vec<EntityId>,
    /// Columns of the trees standing in this chunk
    pub tree_columns: Vec<i32>,
}

/// Result of moving the avatar
#[derive(Debug, Default)]
pub struct ChunkUpdate {
    /// Chunks to generate, nearest to the avatar first
    pub load: Vec<ChunkCoord>,
    /// Chunks dropped from the materialized set, with their contents
    pub unload: Vec<(ChunkCoord, LoadedChunk)>,
}

/// Tracks which spans of the world are materialized, so no span is ever
/// generated twice while it is loaded.
pub struct ChunkManager {
    loaded_chunks: HashMap<ChunkCoord, LoadedChunk>,
    loading_chunks: HashSet<ChunkCoord>,
    pub chunk_width: i32,
    pub load_radius: i32,
    pub unload_radius: i32,
    player_chunk: Option<ChunkCoord>,
}

impl ChunkManager {
    pub fn new(chunk_width: i32, load_radius: i32, unload_radius: i32) -> Self {
        Self {
            loaded_chunks: HashMap::new(),
            loading_chunks: HashSet::new(),
            chunk_width: chunk_width.max(1),
            load_radius,
            unload_radius: unload_radius.max(load_radius),
            player_chunk: None,
        }
    }

    /// Work out which chunks to load and unload for an avatar at `world_x`.
    /// Returns nothing new while the avatar stays in the same chunk.
    pub fn update(&mut self, world_x: f32) -> ChunkUpdate {
        let current = ChunkCoord::from_world_x(world_x, self.chunk_width);
        if self.player_chunk == Some(current) {
            return ChunkUpdate::default();
        }
        self.player_chunk = Some(current);

        let mut update = ChunkUpdate::default();

        let mut to_unload: Vec<ChunkCoord> = self
            .loaded_chunks
            .keys()
            .filter(|coord| (coord.x - current.x).abs() > self.unload_radius)
            .cloned()
            .collect();
        to_unload.sort();
        for coord in to_unload {
            if let Some(chunk) = self.loaded_chunks.remove(&coord) {
                log::info!("Unloaded chunk {}", coord.x);
                update.unload.push((coord, chunk));
            }
        }

        let mut offsets: Vec<i32> = (-self.load_radius..=self.load_radius).collect();
        offsets.sort_by_key(|d| d.abs());
        for dx in offsets {
            let coord = ChunkCoord { x: current.x + dx };
            if self.is_materialized(coord) || self.loading_chunks.contains(&coord) {
                continue;
            }
            self.loading_chunks.insert(coord);
            update.load.push(coord);
        }

        if !update.load.is_empty() {
            log::info!("Requesting {} new chunks around {}", update.load.len(), current.x);
        }
        update
    }

    /// Called once a requested chunk has been generated
    pub fn add_chunk(&mut self, coord: ChunkCoord, chunk: LoadedChunk) {
        self.loading_chunks.remove(&coord);
        self.loaded_chunks.insert(coord, chunk);
    }

    pub fn is_materialized(&self, coord: ChunkCoord) -> bool {
        self.loaded_chunks.contains_key(&coord)
    }

    /// Whether the block column at `world_x` is already generated
    pub fn is_column_materialized(&self, world_x: i32) -> bool {
        self.is_materialized(ChunkCoord::from_world_x(world_x as f32, self.chunk_width))
    }

    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut LoadedChunk> {
        self.loaded_chunks.get_mut(&coord)
    }

    /// (loaded, loading)
    pub fn get_stats(&self) -> (usize, usize) {
        (self.loaded_chunks.len(), self.loading_chunks.len())
    }

    pub fn chunk_count(&self) -> usize {
        self.loaded_chunks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn materialize(manager: &mut ChunkManager, update: &ChunkUpdate) {
        for &coord in &update.load {
            manager.add_chunk(coord, LoadedChunk::default());
        }
    }

    #[test]
    fn test_chunk_coord() {
        assert_eq!(ChunkCoord::from_world_x(0.0, 480).x, 0);
        assert_eq!(ChunkCoord::from_world_x(479.9, 480).x, 0);
        assert_eq!(ChunkCoord::from_world_x(-0.1, 480).x, -1);
        assert_eq!(ChunkCoord { x: -2 }.span(480), (-960, -480));
    }

    #[test]
    fn test_initial_load_nearest_first() {
        let mut manager = ChunkManager::new(480, 1, 2);
        let update = manager.update(100.0);
        assert_eq!(update.load.first(), Some(&ChunkCoord { x: 0 }));
        let mut xs: Vec<i32> = update.load.iter().map(|c| c.x).collect();
        xs.sort();
        assert_eq!(xs, vec![-1, 0, 1]);
        assert!(update.unload.is_empty());
    }

    #[test]
    fn test_no_duplicate_requests() {
        let mut manager = ChunkManager::new(480, 1, 2);
        let first = manager.update(100.0);
        materialize(&mut manager, &first);
        assert!(manager.update(200.0).load.is_empty());

        // one chunk right: only the new edge is requested
        let next = manager.update(600.0);
        assert_eq!(next.load, vec![ChunkCoord { x: 2 }]);
        assert!(next.unload.is_empty());
        assert!(manager.is_materialized(ChunkCoord { x: -1 }));
        assert!(manager.is_column_materialized(-30));
    }

    #[test]
    fn test_unload_beyond_radius() {
        let mut manager = ChunkManager::new(480, 1, 2);
        let first = manager.update(100.0);
        materialize(&mut manager, &first);

        let far = manager.update(4.0 * 480.0 + 10.0);
        let unloaded: Vec<i32> = far.unload.iter().map(|(c, _)| c.x).collect();
        assert_eq!(unloaded, vec![-1, 0, 1]);
        assert!(!manager.is_materialized(ChunkCoord { x: 0 }));
        assert_eq!(far.load.len(), 3);
    }
}
