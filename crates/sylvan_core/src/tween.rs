//! Time-based property animation and one-shot timers.
//!
//! The scheduler owns the animated values: every tween writes into a
//! `PropertyKey -> f32` table on each [`TweenScheduler::tick`], and callers
//! read the current value back with [`TweenScheduler::value`]. Nothing here
//! blocks; callbacks are replaced by the [`SchedulerEvent`]s returned from
//! `tick`, which the owner matches against the ids it scheduled.

use std::collections::HashMap;

use crate::entity::EntityId;

/// Easing applied to the normalised progress of a tween
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    /// Smoothstep, `t * t * (3 - 2t)`
    Cubic,
}

impl Interpolation {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Interpolation::Linear => t,
            Interpolation::Cubic => t * t * (3.0 - 2.0 * t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Run from `from` to `to` once, then finish
    Once,
    /// Jump back to `from` after every leg
    Loop,
    /// Alternate `from -> to -> from` forever
    BackAndForth,
}

/// Animatable property of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Rotation in degrees
    Angle,
    /// Horizontal size in world units
    Width,
    /// 0 = transparent, 1 = opaque
    Opacity,
    /// Angle in degrees along an orbit
    Orbit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    pub entity: EntityId,
    pub property: Property,
}

impl PropertyKey {
    pub fn new(entity: EntityId, property: Property) -> Self {
        Self { entity, property }
    }
}

/// Description of a single property animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub key: PropertyKey,
    pub from: f32,
    pub to: f32,
    pub interpolation: Interpolation,
    /// Length of one leg in seconds
    pub duration: f32,
    pub repeat: Repeat,
    /// Seconds to wait before the first write
    pub delay: f32,
}

impl Tween {
    /// Linear, run-once tween with no delay
    pub fn new(key: PropertyKey, from: f32, to: f32, duration: f32) -> Self {
        Self {
            key,
            from,
            to,
            interpolation: Interpolation::Linear,
            duration,
            repeat: Repeat::Once,
            delay: 0.0,
        }
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    /// Value at `local` seconds after the delay elapsed, and whether a
    /// run-once tween has completed.
    pub fn sample(&self, local: f32) -> (f32, bool) {
        if self.duration <= 0.0 {
            return (self.to, self.repeat == Repeat::Once);
        }

        let (t, finished) = match self.repeat {
            Repeat::Once => ((local / self.duration).min(1.0), local >= self.duration),
            Repeat::Loop => ((local % self.duration) / self.duration, false),
            Repeat::BackAndForth => {
                let phase = local % (2.0 * self.duration);
                let t = if phase <= self.duration {
                    phase / self.duration
                } else {
                    2.0 - phase / self.duration
                };
                (t, false)
            }
        };

        let eased = self.interpolation.apply(t.clamp(0.0, 1.0));
        (self.from + (self.to - self.from) * eased, finished)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchedulerEvent {
    TweenFinished { id: TweenId, key: PropertyKey },
    TimerFired { id: TimerId, token: EntityId },
}

#[derive(Debug)]
struct ActiveTween {
    id: TweenId,
    tween: Tween,
    elapsed: f32,
    done: bool,
}

#[derive(Debug)]
struct Timer {
    id: TimerId,
    token: EntityId,
    delay: f32,
    elapsed: f32,
}

/// Drives every tween and timer from a single per-frame tick
#[derive(Debug, Default)]
pub struct TweenScheduler {
    next_id: u64,
    tweens: Vec<ActiveTween>,
    timers: Vec<Timer>,
    values: HashMap<PropertyKey, f32>,
}

impl TweenScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Start animating a property. Tweens without a delay write their start
    /// value immediately.
    pub fn start(&mut self, tween: Tween) -> TweenId {
        let id = TweenId(self.allocate());
        if tween.delay <= 0.0 {
            self.values.insert(tween.key, tween.from);
        }
        self.tweens.push(ActiveTween {
            id,
            tween,
            elapsed: 0.0,
            done: false,
        });
        id
    }

    /// Schedule a one-shot timer that reports `token` once `delay` seconds
    /// have been ticked.
    pub fn after(&mut self, delay: f32, token: EntityId) -> TimerId {
        let id = TimerId(self.allocate());
        self.timers.push(Timer { id, token, delay, elapsed: 0.0 });
        id
    }

    /// Drop every tween, timer and stored value belonging to `entity`
    pub fn cancel_entity(&mut self, entity: EntityId) {
        self.tweens.retain(|t| t.tween.key.entity != entity);
        self.timers.retain(|t| t.token != entity);
        self.values.retain(|key, _| key.entity != entity);
    }

    pub fn value(&self, key: PropertyKey) -> Option<f32> {
        self.values.get(&key).copied()
    }

    /// Running tweens on a property, oldest first
    pub fn tweens_for(&self, key: PropertyKey) -> impl Iterator<Item = &Tween> {
        self.tweens
            .iter()
            .filter(move |t| t.tween.key == key)
            .map(|t| &t.tween)
    }

    pub fn active_tweens(&self) -> usize {
        self.tweens.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Advance every tween and timer by `dt` seconds.
    ///
    /// Tweens are evaluated in start order, so when two tweens drive the same
    /// property the one started last wins for this frame.
    pub fn tick(&mut self, dt: f32) -> Vec<SchedulerEvent> {
        let mut events = Vec::new();

        for active in &mut self.tweens {
            active.elapsed += dt;
            if active.elapsed < active.tween.delay {
                continue;
            }
            let (value, finished) = active.tween.sample(active.elapsed - active.tween.delay);
            self.values.insert(active.tween.key, value);
            if finished {
                active.done = true;
                events.push(SchedulerEvent::TweenFinished {
                    id: active.id,
                    key: active.tween.key,
                });
            }
        }
        self.tweens.retain(|active| !active.done);

        for timer in &mut self.timers {
            timer.elapsed += dt;
            if timer.elapsed >= timer.delay {
                events.push(SchedulerEvent::TimerFired {
                    id: timer.id,
                    token: timer.token,
                });
            }
        }
        self.timers.retain(|timer| timer.elapsed < timer.delay);

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Namespace;

    fn key(property: Property) -> PropertyKey {
        PropertyKey::new(EntityId::pack(Namespace::Host, 0, 1), property)
    }

    #[test]
    fn test_once_finishes_at_target() {
        let mut scheduler = TweenScheduler::new();
        let k = key(Property::Angle);
        let id = scheduler.start(Tween::new(k, 10.0, 100.0, 1.0));
        assert_eq!(scheduler.value(k), Some(10.0));

        assert!(scheduler.tick(0.5).is_empty());
        assert_eq!(scheduler.value(k), Some(55.0));

        let events = scheduler.tick(0.5);
        assert_eq!(events, vec![SchedulerEvent::TweenFinished { id, key: k }]);
        assert_eq!(scheduler.value(k), Some(100.0));
        assert_eq!(scheduler.active_tweens(), 0);
    }

    #[test]
    fn test_back_and_forth_returns() {
        let mut scheduler = TweenScheduler::new();
        let k = key(Property::Width);
        scheduler.start(Tween::new(k, 0.0, 10.0, 2.0).with_repeat(Repeat::BackAndForth));

        scheduler.tick(2.0);
        assert_eq!(scheduler.value(k), Some(10.0));
        scheduler.tick(1.0);
        assert_eq!(scheduler.value(k), Some(5.0));
        scheduler.tick(1.0);
        assert_eq!(scheduler.value(k), Some(0.0));
        assert_eq!(scheduler.active_tweens(), 1);
    }

    #[test]
    fn test_loop_wraps() {
        let mut scheduler = TweenScheduler::new();
        let k = key(Property::Orbit);
        scheduler.start(Tween::new(k, 0.0, 360.0, 4.0).with_repeat(Repeat::Loop));
        scheduler.tick(5.0);
        assert_eq!(scheduler.value(k), Some(90.0));
    }

    #[test]
    fn test_cubic_is_eased() {
        let tween = Tween::new(key(Property::Opacity), 0.0, 1.0, 1.0)
            .with_interpolation(Interpolation::Cubic);
        let (quarter, _) = tween.sample(0.25);
        let (half, _) = tween.sample(0.5);
        assert!(quarter < 0.25);
        assert!((half - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_delay_defers_first_write() {
        let mut scheduler = TweenScheduler::new();
        let k = key(Property::Angle);
        scheduler.start(Tween::new(k, -20.0, 20.0, 1.0).with_delay(0.5));
        assert_eq!(scheduler.value(k), None);
        scheduler.tick(0.25);
        assert_eq!(scheduler.value(k), None);
        scheduler.tick(0.25);
        assert_eq!(scheduler.value(k), Some(-20.0));
    }

    #[test]
    fn test_later_tween_wins() {
        let mut scheduler = TweenScheduler::new();
        let k = key(Property::Angle);
        scheduler.start(Tween::new(k, 0.0, 10.0, 10.0).with_repeat(Repeat::BackAndForth));
        scheduler.start(Tween::new(k, 50.0, 150.0, 1.0));
        scheduler.tick(0.5);
        assert_eq!(scheduler.value(k), Some(100.0));
        assert_eq!(scheduler.tweens_for(k).count(), 2);
    }

    #[test]
    fn test_timer_fires_once() {
        let mut scheduler = TweenScheduler::new();
        let token = EntityId::pack(Namespace::Tree, 4, 9);
        let id = scheduler.after(1.0, token);

        assert!(scheduler.tick(0.5).is_empty());
        let events = scheduler.tick(0.5);
        assert_eq!(events, vec![SchedulerEvent::TimerFired { id, token }]);
        assert!(scheduler.tick(1.0).is_empty());
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[test]
    fn test_cancel_entity() {
        let mut scheduler = TweenScheduler::new();
        let k = key(Property::Angle);
        scheduler.start(Tween::new(k, 0.0, 1.0, 1.0).with_repeat(Repeat::Loop));
        scheduler.after(3.0, k.entity);
        scheduler.cancel_entity(k.entity);
        assert_eq!(scheduler.active_tweens(), 0);
        assert_eq!(scheduler.pending_timers(), 0);
        assert_eq!(scheduler.value(k), None);
    }
}
