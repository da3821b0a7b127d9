use std::collections::HashMap;

use glam::Vec2;

/// Domain events broadcast through the [`EventBus`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldEvent {
    /// The controlled character left the ground
    JumpOccurred { position: Vec2 },
}

impl WorldEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WorldEvent::JumpOccurred { .. } => EventKind::Jump,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Jump,
}

/// Registry of subscriber handles per event kind.
///
/// Handles are plain arena indices (`H: Copy + Eq`); the bus owns nothing but
/// the ordering. Delivery is synchronous, one-to-many, in registration order.
#[derive(Debug)]
pub struct EventBus<H> {
    subscribers: HashMap<EventKind, Vec<H>>,
}

impl<H> Default for EventBus<H> {
    fn default() -> Self {
        Self { subscribers: HashMap::new() }
    }
}

impl<H: Copy + Eq> EventBus<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` for `kind`. Registering twice keeps the original slot.
    pub fn subscribe(&mut self, kind: EventKind, handle: H) -> bool {
        let list = self.subscribers.entry(kind).or_default();
        if list.contains(&handle) {
            return false;
        }
        list.push(handle);
        true
    }

    pub fn unsubscribe(&mut self, kind: EventKind, handle: H) -> bool {
        match self.subscribers.get_mut(&kind) {
            Some(list) => {
                let before = list.len();
                list.retain(|h| *h != handle);
                list.len() != before
            }
            None => false,
        }
    }

    pub fn subscribers(&self, kind: EventKind) -> &[H] {
        self.subscribers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Hand `event` to every subscriber of its kind and return how many
    /// received it.
    pub fn publish(&self, event: &WorldEvent, mut deliver: impl FnMut(H, &WorldEvent)) -> usize {
        let handles = self.subscribers(event.kind());
        for &handle in handles {
            deliver(handle, event);
        }
        handles.len()
    }
}
