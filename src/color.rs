//! Display colors carried by bodies and texts.
//!
//! The physics core never interprets these; they ride along as rendering
//! hints for the host.

use rand::Rng;

/// An RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 0-255 component values.
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::new(r / 255.0, g / 255.0, b / 255.0, a / 255.0)
    }

    /// Complementary color with the same alpha.
    pub fn inverted(self) -> Self {
        Self::new(1.0 - self.r, 1.0 - self.g, 1.0 - self.b, self.a)
    }

    /// Sample a cyclic rainbow palette at position `n` of period `m`.
    ///
    /// Three phase-shifted sinusoids, offset so the palette stays bright.
    /// Used for player trails that cycle hue over time.
    pub fn rainbow(n: f64, m: f64) -> Self {
        let a = (5.0 * std::f64::consts::PI * n) / (3.0 * m) + std::f64::consts::FRAC_PI_2;
        let third = 2.0 * std::f64::consts::PI / 3.0;
        let channel = |phase: f64| ((a - phase).sin() * 192.0 + 128.0).clamp(0.0, 255.0) as f32;
        Self::rgba(channel(0.0), channel(third), channel(2.0 * third), 255.0)
    }

    /// A random fully-saturated rainbow color with the given alpha.
    pub fn random(alpha: f32) -> Self {
        let n = rand::rng().random_range(0.0..1000.0);
        Self {
            a: alpha,
            ..Self::rainbow(n, 1000.0)
        }
    }
}
