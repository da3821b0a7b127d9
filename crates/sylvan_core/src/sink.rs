use std::collections::HashMap;

use glam::Vec2;

use crate::entity::EntityId;
use crate::style::Style;

/// Layering hint passed along with every placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Background,
    StaticObjects,
    Default,
    Foreground,
    Ui,
}

/// A positioned, sized and styled object ready to be handed to the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub id: EntityId,
    /// Top-left corner in world units (y grows downwards)
    pub position: Vec2,
    pub size: Vec2,
    pub style: Style,
}

/// Where generated objects go once they are built.
///
/// The generation code never inspects what it placed; it only refers back to
/// objects by id to restyle, hide or remove them.
pub trait PlacementSink {
    fn place(&mut self, placement: Placement, layer: Layer);

    fn restyle(&mut self, id: EntityId, style: Style);

    /// Move an already placed object
    fn reposition(&mut self, id: EntityId, position: Vec2);

    fn set_visible(&mut self, id: EntityId, visible: bool);

    fn remove(&mut self, id: EntityId);
}

/// Entry kept by [`RecordingSink`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placed {
    pub placement: Placement,
    pub layer: Layer,
    pub visible: bool,
}

/// In-memory sink used by the headless binary and by tests
#[derive(Debug, Default)]
pub struct RecordingSink {
    objects: HashMap<EntityId, Placed>,
    restyles: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: EntityId) -> Option<&Placed> {
        self.objects.get(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn count_on(&self, layer: Layer) -> usize {
        self.objects.values().filter(|p| p.layer == layer).count()
    }

    /// Number of restyle calls received so far
    pub fn restyle_count(&self) -> usize {
        self.restyles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placed> {
        self.objects.values()
    }
}

impl PlacementSink for RecordingSink {
    fn place(&mut self, placement: Placement, layer: Layer) {
        let previous = self.objects.insert(
            placement.id,
            Placed { placement, layer, visible: true },
        );
        if previous.is_some() {
            log::warn!("Entity {:?} placed twice, replacing", placement.id);
        }
    }

    fn restyle(&mut self, id: EntityId, style: Style) {
        if let Some(placed) = self.objects.get_mut(&id) {
            placed.placement.style = style;
            self.restyles += 1;
        }
    }

    fn reposition(&mut self, id: EntityId, position: Vec2) {
        if let Some(placed) = self.objects.get_mut(&id) {
            placed.placement.position = position;
        }
    }

    fn set_visible(&mut self, id: EntityId, visible: bool) {
        if let Some(placed) = self.objects.get_mut(&id) {
            placed.visible = visible;
        }
    }

    fn remove(&mut self, id: EntityId) {
        self.objects.remove(&id);
    }
}
