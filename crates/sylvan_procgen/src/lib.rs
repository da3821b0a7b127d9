pub mod fruit;
pub mod leaf;
pub mod tree;

pub use fruit::*;
pub use leaf::*;
pub use tree::*;
