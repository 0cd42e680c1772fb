//! Scene-owned text handles.
//!
//! Rendering is the host's job; the kernel only tracks placement and the
//! removal-by-duration contract: finite durations count down each tick
//! and the text flags itself removed when they expire. The scene prunes
//! removed texts during its tick.

use glam::DVec2;

use crate::color::Color;

/// A piece of on-screen text with a limited (or infinite) lifetime.
#[derive(Debug, Clone)]
pub struct Text {
    content: String,
    center: DVec2,
    height: f64,
    width: f64,
    color: Color,
    duration: f64,
    removed: bool,
}

impl Text {
    /// Create a text handle. `duration` is the remaining lifetime in
    /// seconds; pass `f64::INFINITY` for text that never expires.
    pub fn new(
        content: impl Into<String>,
        center: DVec2,
        height: f64,
        width: f64,
        color: Color,
        duration: f64,
    ) -> Self {
        Self {
            content: content.into(),
            center,
            height,
            width,
            color,
            duration,
            removed: false,
        }
    }

    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        self.center
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Remaining lifetime in seconds.
    #[inline]
    pub fn remaining(&self) -> f64 {
        self.duration
    }

    /// Replace the displayed string.
    pub fn edit(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn move_to(&mut self, center: DVec2) {
        self.center = center;
    }

    /// Flag for removal. Idempotent; zeroes the remaining duration.
    pub fn remove(&mut self) {
        if !self.removed {
            self.removed = true;
            self.duration = 0.0;
        }
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Count the lifetime down by `dt`. Expired text flags itself
    /// removed; infinite durations never expire.
    pub fn tick(&mut self, dt: f64) {
        if self.duration != f64::INFINITY {
            self.duration -= dt;
            if self.duration <= 0.0 {
                self.duration = 0.0;
                self.remove();
            }
        }
    }
}
