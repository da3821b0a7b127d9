pub mod avatar;
pub mod chunk_manager;
pub mod config;
pub mod daynight;
pub mod world;

pub use avatar::{Avatar, AvatarInput, AvatarState};
pub use chunk_manager::{ChunkCoord, ChunkManager, LoadedChunk};
pub use config::{AvatarConfig, ConfigError, WorldConfig};
pub use daynight::DayNight;
pub use world::{TickReport, World};
