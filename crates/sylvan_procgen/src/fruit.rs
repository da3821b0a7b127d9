use glam::{IVec2, Vec2};
use sylvan_core::{Color, EntityId, TweenScheduler};

/// Visibility cycle of a fruit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FruitState {
    Visible,
    /// Eaten; reappears when the respawn timer fires
    Hidden,
}

/// Collectible cell hanging in the foliage lattice
#[derive(Debug, Clone, PartialEq)]
pub struct Fruit {
    pub id: EntityId,
    /// Lattice offset from the trunk top, in blocks. `offset.x` is never 0.
    pub offset: IVec2,
    pub position: Vec2,
    pub size: Vec2,
    pub color: Color,
    /// Seconds until an eaten fruit grows back (one day-night cycle)
    pub respawn_delay: f32,
    state: FruitState,
}

impl Fruit {
    pub fn new(
        id: EntityId,
        offset: IVec2,
        position: Vec2,
        size: Vec2,
        color: Color,
        respawn_delay: f32,
    ) -> Self {
        Self {
            id,
            offset,
            position,
            size,
            color,
            respawn_delay,
            state: FruitState::Visible,
        }
    }

    pub fn state(&self) -> FruitState {
        self.state
    }

    /// Only visible fruit can be touched
    pub fn is_collidable(&self) -> bool {
        self.state == FruitState::Visible
    }

    /// Eat the fruit. Hides it and schedules its reappearance; does nothing
    /// and returns `false` when it is already hidden.
    pub fn consume(&mut self, scheduler: &mut TweenScheduler) -> bool {
        if self.state != FruitState::Visible {
            return false;
        }
        self.state = FruitState::Hidden;
        scheduler.after(self.respawn_delay, self.id);
        true
    }

    /// Called when the respawn timer fires
    pub fn respawn(&mut self) -> bool {
        if self.state == FruitState::Visible {
            return false;
        }
        self.state = FruitState::Visible;
        true
    }

    /// Axis-aligned overlap with a box given by its top-left corner and size
    pub fn overlaps(&self, position: Vec2, size: Vec2) -> bool {
        let a_max = self.position + self.size;
        let b_max = position + size;
        self.position.x < b_max.x
            && position.x < a_max.x
            && self.position.y < b_max.y
            && position.y < a_max.y
    }
}
