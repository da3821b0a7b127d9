use rand::Rng;
use serde::{Deserialize, Serialize};

/// 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const ORANGE: Color = Color::rgb(255, 200, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const SKY_BLUE: Color = Color::rgb(128, 178, 204);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Jitter each RGB channel by a uniform offset in `[-jitter, jitter]`.
    ///
    /// Used to give neighbouring blocks and trunks a slightly different tone
    /// from the same base colour. Alpha is left untouched.
    pub fn approximate(self, rng: &mut impl Rng, jitter: u8) -> Color {
        let jitter = jitter as i16;
        let mut channel = |c: u8| -> u8 {
            let offset = rng.gen_range(-jitter..=jitter);
            (c as i16 + offset).clamp(0, 255) as u8
        };
        Color {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
            a: self.a,
        }
    }
}

/// Outline of a placed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Rectangle,
    Oval,
}

/// Visual style handed to the host; the core never reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    pub color: Color,
    pub shape: Shape,
}

impl Style {
    pub fn rect(color: Color) -> Self {
        Self { color, shape: Shape::Rectangle }
    }

    pub fn oval(color: Color) -> Self {
        Self { color, shape: Shape::Oval }
    }
}
