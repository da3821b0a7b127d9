use glam::Vec2;
use sylvan_core::{
    Color, EntityId, Interpolation, Layer, Namespace, Placement, PlacementSink, Property,
    PropertyKey, Repeat, Style, Tween, TweenScheduler,
};

const MIDNIGHT_OPACITY: f32 = 0.5;
const SUN_SIZE: f32 = 120.0;
const HALO_SIZE: f32 = 200.0;
const HALO_COLOR: Color = Color::rgba(255, 255, 0, 20);
/// Distance from the orbit centre to the sun
const ORBIT_RADIUS_FACTOR: f32 = 0.5;

pub const SKY_ID: EntityId = EntityId::pack(Namespace::Host, 0, 1);
pub const NIGHT_ID: EntityId = EntityId::pack(Namespace::Host, 0, 2);
pub const SUN_ID: EntityId = EntityId::pack(Namespace::Host, 0, 3);
pub const HALO_ID: EntityId = EntityId::pack(Namespace::Host, 0, 4);

/// Sky, night overlay, sun and halo. Purely cosmetic; driven by the tween
/// scheduler over one day-night cycle.
pub struct DayNight {
    window: Vec2,
    cycle_length: f32,
}

impl DayNight {
    pub fn new(window: Vec2, cycle_length: f32) -> Self {
        Self { window, cycle_length }
    }

    fn opacity_key() -> PropertyKey {
        PropertyKey::new(NIGHT_ID, Property::Opacity)
    }

    fn orbit_key() -> PropertyKey {
        PropertyKey::new(SUN_ID, Property::Orbit)
    }

    /// Point the sun circles around
    pub fn orbit_center(&self) -> Vec2 {
        Vec2::new(self.window.x / 2.0, self.window.y * 2.0 / 3.0)
    }

    /// Place the four objects and start their tweens
    pub fn setup(&self, sink: &mut dyn PlacementSink, scheduler: &mut TweenScheduler) {
        sink.place(
            Placement {
                id: SKY_ID,
                position: Vec2::ZERO,
                size: self.window,
                style: Style::rect(Color::SKY_BLUE),
            },
            Layer::Background,
        );
        sink.place(
            Placement {
                id: HALO_ID,
                position: self.halo_position(0.0),
                size: Vec2::splat(HALO_SIZE),
                style: Style::oval(HALO_COLOR),
            },
            Layer::Background,
        );
        sink.place(
            Placement {
                id: SUN_ID,
                position: self.sun_center(0.0) - Vec2::splat(SUN_SIZE / 2.0),
                size: Vec2::splat(SUN_SIZE),
                style: Style::oval(Color::YELLOW),
            },
            Layer::Background,
        );
        sink.place(
            Placement {
                id: NIGHT_ID,
                position: Vec2::ZERO,
                size: self.window,
                style: Style::rect(Color::rgba(0, 0, 0, 0)),
            },
            Layer::Foreground,
        );

        scheduler.start(
            Tween::new(Self::opacity_key(), 0.0, MIDNIGHT_OPACITY, self.cycle_length / 2.0)
                .with_interpolation(Interpolation::Cubic)
                .with_repeat(Repeat::BackAndForth),
        );
        scheduler.start(
            Tween::new(Self::orbit_key(), 0.0, 360.0, self.cycle_length).with_repeat(Repeat::Loop),
        );
        log::info!("Day-night cycle of {}s started", self.cycle_length);
    }

    pub fn night_opacity(&self, scheduler: &TweenScheduler) -> f32 {
        scheduler.value(Self::opacity_key()).unwrap_or(0.0)
    }

    pub fn sun_angle(&self, scheduler: &TweenScheduler) -> f32 {
        scheduler.value(Self::orbit_key()).unwrap_or(0.0)
    }

    /// Sun centre for an orbit angle in degrees; 0 is straight up
    pub fn sun_center(&self, angle: f32) -> Vec2 {
        let radius = self.window.y * ORBIT_RADIUS_FACTOR;
        let (sin, cos) = angle.to_radians().sin_cos();
        self.orbit_center() + Vec2::new(sin, -cos) * radius
    }

    fn halo_position(&self, angle: f32) -> Vec2 {
        self.sun_center(angle) - Vec2::splat(HALO_SIZE / 2.0)
    }

    /// Push this frame's overlay opacity and sun position to the host. The
    /// halo follows the sun.
    pub fn update(&self, scheduler: &TweenScheduler, sink: &mut dyn PlacementSink) {
        let alpha = (self.night_opacity(scheduler) * 255.0).round().clamp(0.0, 255.0) as u8;
        sink.restyle(NIGHT_ID, Style::rect(Color::rgba(0, 0, 0, alpha)));

        let angle = self.sun_angle(scheduler);
        sink.reposition(SUN_ID, self.sun_center(angle) - Vec2::splat(SUN_SIZE / 2.0));
        sink.reposition(HALO_ID, self.halo_position(angle));
    }
}
