pub mod app;
pub mod entity;
pub mod event;
pub mod sink;
pub mod style;
pub mod tween;

// Re-export commonly used items
pub use app::{App, Flow};
pub use entity::{EntityId, Namespace};
pub use event::{EventBus, EventKind, WorldEvent};
pub use sink::{Layer, Placement, PlacementSink, RecordingSink};
pub use style::{Color, Shape, Style};
pub use tween::{
    Interpolation, Property, PropertyKey, Repeat, SchedulerEvent, Tween, TweenId, TweenScheduler,
};
