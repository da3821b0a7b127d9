use glam::{IVec2, Vec2};
use rand::Rng;
use sylvan_core::{
    Color, EntityId, Property, PropertyKey, Repeat, Tween, TweenScheduler,
};

/// Full swing of the idle sway, centred on zero (degrees)
const MAX_ANGLE_CHANGE: f32 = 50.0;
const MIN_SIZE_FACTOR: f32 = 0.6;
const MAX_SIZE_FACTOR: f32 = 1.4;
const MIN_CYCLE_FACTOR: f32 = 0.4;
const MAX_CYCLE_FACTOR: f32 = 1.6;
/// Upper bound of the random phase delay before a leaf starts swaying
const MAX_DELAY: f32 = 0.7;

/// Per-leaf sway parameters, rolled once at creation and never changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafAnimation {
    /// Starting tilt in degrees; the leaf swings between this and its negation
    pub initial_angle: f32,
    /// Width oscillates between `size_factor * S` and `(2 - size_factor) * S`
    pub size_factor: f32,
    /// Seconds before the sway starts
    pub delay: f32,
    /// Multiplier applied to the recipe's base cycle length
    pub cycle_factor: f32,
}

impl LeafAnimation {
    pub fn roll(rng: &mut impl Rng) -> Self {
        let initial_angle = rng.gen::<f32>() * MAX_ANGLE_CHANGE - MAX_ANGLE_CHANGE / 2.0;
        let size_factor =
            rng.gen::<f32>() * (MAX_SIZE_FACTOR - MIN_SIZE_FACTOR) + MIN_SIZE_FACTOR;
        let cycle_factor =
            rng.gen::<f32>() * (MAX_CYCLE_FACTOR - MIN_CYCLE_FACTOR) + MIN_CYCLE_FACTOR;
        let delay = rng.gen::<f32>() * MAX_DELAY;
        Self {
            initial_angle,
            size_factor,
            delay,
            cycle_factor,
        }
    }

    pub fn period(&self, cycle_length: f32) -> f32 {
        cycle_length * self.cycle_factor
    }
}

/// Decorative foliage cell. Never collides with anything.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub id: EntityId,
    /// Lattice offset from the trunk top, in blocks
    pub offset: IVec2,
    pub position: Vec2,
    pub size: Vec2,
    pub color: Color,
    pub animation: LeafAnimation,
}

impl Leaf {
    pub fn angle_key(&self) -> PropertyKey {
        PropertyKey::new(self.id, Property::Angle)
    }

    pub fn width_key(&self) -> PropertyKey {
        PropertyKey::new(self.id, Property::Width)
    }

    /// Start the endless sway: tilt and width both go back and forth over the
    /// leaf's own period, after its phase delay.
    pub fn schedule_sway(&self, scheduler: &mut TweenScheduler, cycle_length: f32) {
        let anim = self.animation;
        let period = anim.period(cycle_length);
        let block = self.size.y;

        scheduler.start(
            Tween::new(self.angle_key(), anim.initial_angle, -anim.initial_angle, period)
                .with_repeat(Repeat::BackAndForth)
                .with_delay(anim.delay),
        );
        scheduler.start(
            Tween::new(
                self.width_key(),
                anim.size_factor * block,
                (2.0 - anim.size_factor) * block,
                period,
            )
            .with_repeat(Repeat::BackAndForth)
            .with_delay(anim.delay),
        );
    }

    /// Current tilt as last written by the scheduler; zero before the sway
    /// has started.
    pub fn current_angle(&self, scheduler: &TweenScheduler) -> f32 {
        scheduler.value(self.angle_key()).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sylvan_core::Namespace;

    fn leaf(animation: LeafAnimation) -> Leaf {
        Leaf {
            id: EntityId::pack(Namespace::Tree, 0, 1),
            offset: IVec2::ZERO,
            position: Vec2::ZERO,
            size: Vec2::splat(30.0),
            color: Color::GREEN,
            animation,
        }
    }

    #[test]
    fn test_roll_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..1000 {
            let a = LeafAnimation::roll(&mut rng);
            assert!(a.initial_angle >= -25.0 && a.initial_angle <= 25.0);
            assert!(a.size_factor >= 0.6 && a.size_factor <= 1.4);
            assert!(a.cycle_factor >= 0.4 && a.cycle_factor <= 1.6);
            assert!(a.delay >= 0.0 && a.delay <= 0.7);
        }
    }

    #[test]
    fn test_sway_schedules_angle_and_width() {
        let anim = LeafAnimation {
            initial_angle: 10.0,
            size_factor: 0.8,
            delay: 0.5,
            cycle_factor: 1.0,
        };
        let leaf = leaf(anim);
        let mut scheduler = TweenScheduler::new();
        leaf.schedule_sway(&mut scheduler, 10.0);

        assert_eq!(leaf.current_angle(&scheduler), 0.0);
        scheduler.tick(0.5);
        assert_eq!(leaf.current_angle(&scheduler), 10.0);

        let width = scheduler.tweens_for(leaf.width_key()).next().copied();
        let width = width.expect("width tween scheduled");
        assert!((width.from - 24.0).abs() < 1e-3);
        assert!((width.to - 36.0).abs() < 1e-3);
        assert_eq!(width.duration, 10.0);
        assert_eq!(width.repeat, Repeat::BackAndForth);

        // halfway through the first leg the tilt crosses zero
        scheduler.tick(5.0);
        assert!(leaf.current_angle(&scheduler).abs() < 1e-4);
    }
}
