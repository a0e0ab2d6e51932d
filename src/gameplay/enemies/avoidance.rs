//! Pairwise separation for overlapping enemies.
//!
//! A cheap nudge, not physics: every overlapping pair of live, active enemies
//! is pushed apart by a fixed step along the line between their centers.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use super::Enemy;
use crate::geometry::overlaps;

// === Constants ===

/// Distance each enemy of an overlapping pair is pushed per tick.
pub const SEPARATION_PUSH: f32 = 1.5;

/// Separates overlapping live enemies whose body intersects `active_region`.
///
/// Bodies are snapshotted first so the result does not depend on iteration
/// order. Coincident centers are split along a random direction.
pub fn separate(enemies: &mut [Enemy], active_region: Rect, rng: &mut impl Rng) {
    // Phase 1: snapshot candidate bodies
    let snapshots: Vec<(usize, Rect)> = enemies
        .iter()
        .enumerate()
        .filter(|(_, enemy)| !enemy.is_dead() && overlaps(enemy.body(), active_region))
        .map(|(i, enemy)| (i, enemy.body()))
        .collect();

    // Phase 2: accumulate pair pushes
    let mut offsets = vec![Vec2::ZERO; enemies.len()];
    for (a, &(i, body_i)) in snapshots.iter().enumerate() {
        for &(j, body_j) in &snapshots[a + 1..] {
            if !overlaps(body_i, body_j) {
                continue;
            }
            let direction = (body_i.center() - body_j.center())
                .try_normalize()
                .unwrap_or_else(|| Vec2::from_angle(rng.random_range(0.0..TAU)));
            offsets[i] += direction * SEPARATION_PUSH;
            offsets[j] -= direction * SEPARATION_PUSH;
        }
    }

    // Phase 3: apply
    for (enemy, offset) in enemies.iter_mut().zip(offsets) {
        if offset != Vec2::ZERO {
            enemy.set_position(enemy.position() + offset);
        }
    }
}
