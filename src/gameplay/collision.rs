//! Per-axis box resolution against static obstacles.

use bevy::prelude::*;

use crate::geometry::{Axis, overlaps, shifted};

/// Static, impassable boxes in world space.
#[derive(Resource, Debug, Clone, Default)]
pub struct Obstacles(pub Vec<Rect>);

/// Pushes `moving` out of any obstacle it now overlaps on `axis`.
///
/// `previous` is the box before this axis' displacement. A box is snapped flush
/// to the obstacle edge it crossed; overlaps not caused by crossing an edge on
/// this axis are left alone, and the box size never changes.
pub fn resolve_axis(moving: &mut Rect, previous: Rect, obstacles: &[Rect], axis: Axis) {
    for obstacle in obstacles {
        if !overlaps(*moving, *obstacle) {
            continue;
        }
        let delta = match axis {
            Axis::Horizontal => {
                if moving.max.x >= obstacle.min.x && previous.max.x <= obstacle.min.x {
                    Vec2::new(obstacle.min.x - moving.max.x, 0.0)
                } else if moving.min.x <= obstacle.max.x && previous.min.x >= obstacle.max.x {
                    Vec2::new(obstacle.max.x - moving.min.x, 0.0)
                } else {
                    Vec2::ZERO
                }
            }
            Axis::Vertical => {
                if moving.max.y >= obstacle.min.y && previous.max.y <= obstacle.min.y {
                    Vec2::new(0.0, obstacle.min.y - moving.max.y)
                } else if moving.min.y <= obstacle.max.y && previous.min.y >= obstacle.max.y {
                    Vec2::new(0.0, obstacle.max.y - moving.min.y)
                } else {
                    Vec2::ZERO
                }
            }
        };
        *moving = shifted(*moving, delta);
    }
}

/// Applies `delta` horizontally then vertically, resolving each axis in turn.
#[must_use]
pub fn move_and_collide(body: Rect, delta: Vec2, obstacles: &[Rect]) -> Rect {
    let mut moved = shifted(body, Vec2::new(delta.x, 0.0));
    resolve_axis(&mut moved, body, obstacles, Axis::Horizontal);

    let before_vertical = moved;
    moved = shifted(moved, Vec2::new(0.0, delta.y));
    resolve_axis(&mut moved, before_vertical, obstacles, Axis::Vertical);
    moved
}
