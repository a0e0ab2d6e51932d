//! Axis-aligned boxes and facing directions.
//!
//! World space is y-up: `Facing::Up` is `+Y`. Bodies are stored by their
//! center and converted to a [`Rect`] on demand.

use bevy::prelude::*;

/// Collision resolution axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// One of the four cardinal facings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum Facing {
    Up,
    Down,
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Unit vector pointing in this direction.
    #[must_use]
    pub const fn unit_vector(self) -> Vec2 {
        match self {
            Self::Up => Vec2::Y,
            Self::Down => Vec2::NEG_Y,
            Self::Left => Vec2::NEG_X,
            Self::Right => Vec2::X,
        }
    }

    /// Facing along the dominant component of `v`. Ties go horizontal.
    /// Returns `None` for the zero vector.
    #[must_use]
    pub fn dominant(v: Vec2) -> Option<Self> {
        if v == Vec2::ZERO {
            return None;
        }
        if v.x.abs() >= v.y.abs() {
            Some(if v.x > 0.0 { Self::Right } else { Self::Left })
        } else {
            Some(if v.y > 0.0 { Self::Up } else { Self::Down })
        }
    }

    /// Facing for player input: any horizontal component wins, vertical
    /// only counts when there is no horizontal input.
    #[must_use]
    pub fn from_input(input: Vec2) -> Option<Self> {
        if input.x > 0.0 {
            Some(Self::Right)
        } else if input.x < 0.0 {
            Some(Self::Left)
        } else if input.y > 0.0 {
            Some(Self::Up)
        } else if input.y < 0.0 {
            Some(Self::Down)
        } else {
            None
        }
    }
}

/// Strict overlap test: boxes that only share an edge do not overlap.
#[must_use]
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

/// Box of `size` centered on `center`.
#[must_use]
pub fn body_at(center: Vec2, size: Vec2) -> Rect {
    Rect::from_center_size(center, size)
}

/// `rect` translated by `delta`, size unchanged.
#[must_use]
pub fn shifted(rect: Rect, delta: Vec2) -> Rect {
    Rect {
        min: rect.min + delta,
        max: rect.max + delta,
    }
}

/// Translates `rect` the minimum amount needed to lie inside `bounds`.
///
/// A box larger than `bounds` is pinned to the bounds' minimum corner.
#[must_use]
pub fn clamp_inside(rect: Rect, bounds: Rect) -> Rect {
    let mut delta = Vec2::ZERO;
    for i in 0..2 {
        if rect.max[i] > bounds.max[i] {
            delta[i] = bounds.max[i] - rect.max[i];
        }
        if rect.min[i] + delta[i] < bounds.min[i] {
            delta[i] = bounds.min[i] - rect.min[i];
        }
    }
    shifted(rect, delta)
}

/// Uniform random point inside `region`.
pub fn random_point_in(region: Rect, rng: &mut impl rand::Rng) -> Vec2 {
    Vec2::new(
        rng.random_range(region.min.x..=region.max.x),
        rng.random_range(region.min.y..=region.max.y),
    )
}
