pub mod flora;
pub mod noise;
pub mod seed;
pub mod terrain;

// Re-export commonly used items
pub use flora::{Flora, FloraConfig};
pub use noise::{fbm, NoiseGenerator};
pub use seed::WorldSeed;
pub use terrain::{Block, Terrain};
