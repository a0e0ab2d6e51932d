//! Straight-line projectiles fired by ranged enemies.

use std::collections::VecDeque;

use bevy::prelude::*;

use crate::gameplay::tick_past;
use crate::geometry::body_at;

// === Constants ===

pub const ARROW_SPEED: f32 = 200.0;
pub const ARROW_LIFETIME: f32 = 100.0;
pub const TRAIL_CAPACITY: usize = 12;
const ARROW_SIZE: Vec2 = Vec2::splat(16.0);

/// An arrow aimed once at launch. It never retargets.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    position: Vec2,
    direction: Vec2,
    speed: f32,
    damage: f32,
    lifetime: Timer,
    trail: VecDeque<Vec2>,
}

impl Arrow {
    /// Aims from `start` at where `target` is now. A zero-length aim falls
    /// back to pointing down.
    #[must_use]
    pub fn new(start: Vec2, target: Vec2, speed: f32, damage: f32) -> Self {
        let direction = (target - start).try_normalize().unwrap_or(Vec2::NEG_Y);
        Self {
            position: start,
            direction,
            speed,
            damage,
            lifetime: Timer::from_seconds(ARROW_LIFETIME, TimerMode::Once),
            trail: VecDeque::with_capacity(TRAIL_CAPACITY),
        }
    }

    #[must_use]
    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = Timer::from_seconds(lifetime, TimerMode::Once);
        self
    }

    /// Advances the arrow. Returns `false` once its lifetime has run out, in
    /// which case it has not moved.
    pub fn update(&mut self, dt: f32) -> bool {
        if tick_past(&mut self.lifetime, dt).is_some() {
            return false;
        }
        if self.trail.len() == TRAIL_CAPACITY {
            self.trail.pop_front();
        }
        self.trail.push_back(self.position);
        self.position += self.direction * self.speed * dt;
        true
    }

    #[must_use]
    pub fn hitbox(&self) -> Rect {
        body_at(self.position, ARROW_SIZE)
    }

    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    pub const fn direction(&self) -> Vec2 {
        self.direction
    }

    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Heading in radians, for sprite rotation.
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.direction.to_angle()
    }

    /// Recent positions, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.trail.iter().copied()
    }
}
