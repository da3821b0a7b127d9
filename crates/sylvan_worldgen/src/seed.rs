use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Golden-ratio constant mixed into every step of the derivation
const GOLDEN: u32 = 0x9e37_79b9;

/// World seed: the only source of randomness for a whole world.
/// Every generator derives its own sub-seed from a grid cell and a layer, so
/// results never depend on the order spans are requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldSeed {
    pub value: u32,
}

impl WorldSeed {
    /// Block colour jitter
    pub const TERRAIN: u32 = 1;
    /// Per-column plant decision
    pub const FLORA: u32 = 2;
    /// Tree height, lattice and animation draws
    pub const TREE: u32 = 3;

    pub fn new(seed: u32) -> Self {
        Self { value: seed }
    }

    /// Sub-seed for the cell `(x, y)` of one generation layer
    pub fn for_layer(&self, x: i32, y: i32, layer: u32) -> WorldSeed {
        let value = [x as u32, y as u32, layer]
            .into_iter()
            .fold(self.value, |acc, part| {
                acc ^ part
                    .wrapping_add(GOLDEN)
                    .wrapping_add(acc << 6)
                    .wrapping_add(acc >> 2)
            });
        WorldSeed::new(value)
    }

    /// Random stream for this (derived) seed
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.value as u64)
    }
}

impl From<u32> for WorldSeed {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}
