use glam::Vec2;
use sylvan_core::WorldEvent;

use crate::config::AvatarConfig;

/// Keys held this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AvatarInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// What the avatar is doing, derived from its velocity every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvatarState {
    Idle,
    Running,
    Jumping,
}

/// Animation clip per state, indexed by `AvatarState as usize`
const CLIPS: [&str; 3] = ["idle", "run", "jump"];

impl AvatarState {
    pub fn from_velocity(velocity: Vec2) -> Self {
        if velocity.x != 0.0 {
            AvatarState::Running
        } else if velocity.y != 0.0 {
            AvatarState::Jumping
        } else {
            AvatarState::Idle
        }
    }

    pub fn clip(self) -> &'static str {
        CLIPS[self as usize]
    }
}

/// The controlled character: spends energy to run and jump, eats fruit
pub struct Avatar {
    /// Top-left corner (y grows downwards)
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing_left: bool,
    pub on_ground: bool,
    energy: f32,
    state: AvatarState,
    config: AvatarConfig,
}

impl Avatar {
    pub fn new(position: Vec2, config: AvatarConfig) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing_left: false,
            on_ground: false,
            energy: config.max_energy,
            state: AvatarState::Idle,
            config,
        }
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn state(&self) -> AvatarState {
        self.state
    }

    pub fn size(&self) -> Vec2 {
        Vec2::splat(self.config.size)
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size() / 2.0
    }

    /// Apply this frame's input. Returns the jump event when the avatar
    /// leaves the ground.
    pub fn update(&mut self, input: AvatarInput) -> Option<WorldEvent> {
        let cfg = &self.config;

        let mut vx = 0.0;
        if input.left {
            vx -= cfg.run_speed;
        }
        if input.right {
            vx += cfg.run_speed;
        }
        // one charge for the net motion; opposing keys cancel for free
        if vx != 0.0 {
            if self.energy >= cfg.run_cost {
                self.energy -= cfg.run_cost;
            } else {
                vx = 0.0;
            }
        }
        self.velocity.x = vx;
        if vx < 0.0 {
            self.facing_left = true;
        } else if vx > 0.0 {
            self.facing_left = false;
        }

        let mut event = None;
        if input.jump && self.velocity.y == 0.0 {
            if self.energy >= cfg.jump_cost {
                self.energy -= cfg.jump_cost;
                self.velocity.y = -cfg.jump_speed;
                self.on_ground = false;
                log::debug!("Jump at {:?}, energy left {}", self.position, self.energy);
                event = Some(WorldEvent::JumpOccurred {
                    position: self.position,
                });
            } else {
                self.velocity.y = 0.0;
            }
        }

        if self.velocity == Vec2::ZERO && self.energy < cfg.max_energy {
            self.energy += cfg.idle_restore.min(cfg.max_energy - self.energy);
        }

        self.state = AvatarState::from_velocity(self.velocity);
        event
    }

    /// Gravity, motion and landing on the ground row at `ground_y`
    pub fn integrate(&mut self, dt: f32, ground_y: f32) {
        self.velocity.y += self.config.gravity * dt;
        self.position += self.velocity * dt;

        let feet = self.position.y + self.config.size;
        if feet >= ground_y {
            self.position.y = ground_y - self.config.size;
            self.velocity.y = 0.0;
            self.on_ground = true;
        } else {
            self.on_ground = false;
        }
    }

    /// Eating a fruit restores energy up to the maximum
    pub fn eat(&mut self) {
        self.energy = (self.energy + self.config.fruit_energy).min(self.config.max_energy);
    }
}
