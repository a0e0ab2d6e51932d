//! Per-enemy behavior: distance-driven state choice, movement and attacks.

use bevy::prelude::*;

use super::arrow::{ARROW_SPEED, Arrow};
use super::{AttackStyle, Behavior, Enemy, PlayerTarget, RETREAT_SPEED_FACTOR};
use crate::gameplay::collision::move_and_collide;
use crate::gameplay::events::CombatEvent;
use crate::gameplay::{step_duration, tick_past};
use crate::geometry::Facing;

/// Behavior for a living enemy at `distance` from the player.
#[must_use]
pub fn next_behavior(style: AttackStyle, attack_range: f32, distance: f32) -> Behavior {
    match style {
        AttackStyle::Ranged { min_range } if distance < min_range => Behavior::Retreat,
        _ if distance <= attack_range => Behavior::Attack,
        _ => Behavior::Chase,
    }
}

impl Enemy {
    /// Full update for an on-screen enemy.
    pub fn update(
        &mut self,
        dt: f32,
        target: &mut PlayerTarget<'_>,
        obstacles: &[Rect],
        events: &mut Vec<CombatEvent>,
    ) {
        if self.is_dead() {
            self.update_dying(dt);
            return;
        }

        self.health.update(dt);
        let carry = self.tick_attack_cooldown(dt);

        let mut displacement = Vec2::ZERO;
        self.moving = false;
        if target.health.is_alive() {
            displacement = self.think(dt, carry, target, events);
        }
        if let Some(forced) = self.knockback_displacement(dt) {
            displacement = forced;
        }
        self.move_by(displacement, obstacles);

        self.update_arrows(dt);
    }

    /// Update for an off-screen enemy: no AI or voluntary movement, but its
    /// timers, any running knockback and its arrows still advance.
    pub fn update_offscreen(&mut self, dt: f32, obstacles: &[Rect]) {
        if self.is_dead() {
            self.update_dying(dt);
            return;
        }

        self.health.update(dt);
        self.tick_attack_cooldown(dt);
        self.moving = false;
        if let Some(forced) = self.knockback_displacement(dt) {
            self.move_by(forced, obstacles);
        }

        self.update_arrows(dt);
    }

    fn update_dying(&mut self, dt: f32) {
        if let Some(death) = self.death.as_mut() {
            death.tick(step_duration(dt));
        }
        self.update_arrows(dt);
    }

    fn update_arrows(&mut self, dt: f32) {
        self.arrows.retain_mut(|arrow| arrow.update(dt));
    }

    /// Ticks the attack cooldown. When it runs out during this step, returns
    /// the time elapsed since, so the next cooldown can start from there.
    fn tick_attack_cooldown(&mut self, dt: f32) -> f32 {
        if self.attack_cooldown.is_finished() {
            return 0.0;
        }
        tick_past(&mut self.attack_cooldown, dt).unwrap_or(0.0)
    }

    /// Movement forced by an active knockback for this step, clearing it once
    /// spent.
    fn knockback_displacement(&mut self, dt: f32) -> Option<Vec2> {
        let knockback = self.knockback.as_mut()?;
        let displacement = knockback.velocity * dt.min(knockback.timer.remaining_secs());
        if tick_past(&mut knockback.timer, dt).is_some() {
            self.knockback = None;
        }
        Some(displacement)
    }

    fn move_by(&mut self, displacement: Vec2, obstacles: &[Rect]) {
        if displacement != Vec2::ZERO {
            let moved = move_and_collide(self.body(), displacement, obstacles);
            self.position = moved.center();
        }
    }

    /// Picks a behavior, acts on it, and returns the desired displacement.
    fn think(
        &mut self,
        dt: f32,
        cooldown_carry: f32,
        target: &mut PlayerTarget<'_>,
        events: &mut Vec<CombatEvent>,
    ) -> Vec2 {
        let stats = self.archetype.stats();
        let player_center = target.body.center();
        let to_player = player_center - self.position;
        let distance = to_player.length();

        self.behavior = next_behavior(stats.style, stats.attack_range, distance);
        if let Some(facing) = Facing::dominant(to_player) {
            self.facing = facing;
        }

        match self.behavior {
            Behavior::Chase => {
                self.moving = true;
                to_player.normalize_or_zero() * stats.speed * dt
            }
            Behavior::Retreat => {
                self.moving = true;
                -to_player.normalize_or_zero() * stats.speed * RETREAT_SPEED_FACTOR * dt
            }
            Behavior::Attack => {
                if self.attack_cooldown.is_finished() {
                    self.attack_cooldown.reset();
                    self.attack_cooldown.tick(step_duration(cooldown_carry));
                    match stats.style {
                        AttackStyle::Melee => {
                            if target.health.apply_damage(stats.damage).applied() {
                                events.push(CombatEvent::PlayerHurt {
                                    amount: stats.damage,
                                    remaining: target.health.current(),
                                });
                            }
                        }
                        AttackStyle::Ranged { .. } => {
                            self.arrows.push(Arrow::new(
                                self.position,
                                player_center,
                                ARROW_SPEED,
                                stats.damage,
                            ));
                        }
                    }
                }
                Vec2::ZERO
            }
            Behavior::Dead => Vec2::ZERO,
        }
    }
}
