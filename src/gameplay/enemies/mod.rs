//! Enemy archetypes, per-enemy state, and the damage/knockback entry points.

mod ai;
pub mod arrow;
pub mod avoidance;

use bevy::prelude::*;

use crate::gameplay::gauges::{DamageOutcome, Health};
use crate::geometry::{Facing, body_at};

pub use ai::next_behavior;
pub use arrow::Arrow;

// === Constants ===

/// Length of the cosmetic death animation, after which the enemy is removed.
pub const DEATH_DURATION: f32 = 1.0;
pub const KNOCKBACK_SPEED: f32 = 250.0;
pub const KNOCKBACK_DURATION: f32 = 0.15;
/// Retreating ranged enemies move at this fraction of base speed.
pub const RETREAT_SPEED_FACTOR: f32 = 0.8;

// === Archetypes ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Archetype {
    Goblin,
    Archer,
    Warrior,
}

/// How an archetype delivers its attack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackStyle {
    Melee,
    /// Fires arrows and backs off when the player is closer than `min_range`.
    Ranged { min_range: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeStats {
    pub health: f32,
    pub speed: f32,
    pub damage: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub style: AttackStyle,
    pub size: Vec2,
}

impl Archetype {
    pub const ALL: [Self; 3] = [Self::Goblin, Self::Archer, Self::Warrior];

    #[must_use]
    pub const fn stats(self) -> ArchetypeStats {
        match self {
            Self::Goblin => ArchetypeStats {
                health: 30.0,
                speed: 80.0,
                damage: 5.0,
                attack_range: 50.0,
                attack_cooldown: 1.0,
                style: AttackStyle::Melee,
                size: Vec2::splat(32.0),
            },
            Self::Archer => ArchetypeStats {
                health: 20.0,
                speed: 70.0,
                damage: 7.0,
                attack_range: 150.0,
                attack_cooldown: 2.0,
                style: AttackStyle::Ranged { min_range: 80.0 },
                size: Vec2::splat(32.0),
            },
            Self::Warrior => ArchetypeStats {
                health: 50.0,
                speed: 60.0,
                damage: 10.0,
                attack_range: 60.0,
                attack_cooldown: 1.5,
                style: AttackStyle::Melee,
                size: Vec2::splat(48.0),
            },
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Goblin => "Goblin",
            Self::Archer => "Archer",
            Self::Warrior => "Warrior",
        }
    }
}

// === Enemy ===

/// Stable per-session enemy handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct EnemyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Behavior {
    #[default]
    Chase,
    Attack,
    Retreat,
    Dead,
}

/// Forced displacement that overrides AI movement while it lasts.
#[derive(Debug, Clone, PartialEq)]
pub struct Knockback {
    pub velocity: Vec2,
    pub timer: Timer,
}

/// Cosmetic death animation state for renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathPose {
    /// `0..=1` over [`DEATH_DURATION`].
    pub progress: f32,
    pub rotation_degrees: f32,
    pub scale: f32,
    pub alpha: f32,
}

/// Non-owning view of the player handed to enemies for one update.
pub struct PlayerTarget<'a> {
    pub body: Rect,
    pub health: &'a mut Health,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    id: EnemyId,
    archetype: Archetype,
    behavior: Behavior,
    position: Vec2,
    facing: Facing,
    moving: bool,
    health: Health,
    attack_cooldown: Timer,
    knockback: Option<Knockback>,
    /// Death animation, started by the lethal hit.
    death: Option<Timer>,
    arrows: Vec<Arrow>,
}

impl Enemy {
    #[must_use]
    pub fn new(id: EnemyId, archetype: Archetype, position: Vec2) -> Self {
        let stats = archetype.stats();
        Self {
            id,
            archetype,
            behavior: Behavior::Chase,
            position,
            facing: Facing::default(),
            moving: false,
            health: Health::full(stats.health),
            attack_cooldown: Timer::from_seconds(stats.attack_cooldown, TimerMode::Once),
            knockback: None,
            death: None,
            arrows: Vec::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        self.archetype
    }

    #[must_use]
    pub const fn behavior(&self) -> Behavior {
        self.behavior
    }

    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.moving
    }

    #[must_use]
    pub const fn health(&self) -> &Health {
        &self.health
    }

    #[must_use]
    pub fn body(&self) -> Rect {
        body_at(self.position, self.archetype.stats().size)
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.behavior == Behavior::Dead
    }

    /// Dead and done animating; ready to be dropped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.death.as_ref().is_some_and(Timer::is_finished)
    }

    #[must_use]
    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    #[must_use]
    pub const fn knockback(&self) -> Option<&Knockback> {
        self.knockback.as_ref()
    }

    pub(crate) fn arrows_mut(&mut self) -> &mut Vec<Arrow> {
        &mut self.arrows
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Damages the enemy. The lethal hit switches it to [`Behavior::Dead`].
    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.is_dead() {
            return DamageOutcome::Ignored;
        }
        let outcome = self.health.apply_damage(amount);
        if outcome == DamageOutcome::Killed {
            self.behavior = Behavior::Dead;
            self.moving = false;
            self.knockback = None;
            self.death = Some(Timer::from_seconds(DEATH_DURATION, TimerMode::Once));
        }
        outcome
    }

    /// Starts a knockback along `direction`. Ignored for dead enemies or a
    /// zero direction.
    pub fn knock_back(&mut self, direction: Vec2) {
        if self.is_dead() {
            return;
        }
        if let Some(dir) = direction.try_normalize() {
            self.knockback = Some(Knockback {
                velocity: dir * KNOCKBACK_SPEED,
                timer: Timer::from_seconds(KNOCKBACK_DURATION, TimerMode::Once),
            });
        }
    }

    #[must_use]
    pub fn death_pose(&self) -> Option<DeathPose> {
        let progress = self.death.as_ref()?.fraction();
        Some(DeathPose {
            progress,
            rotation_degrees: progress * 360.0,
            scale: 1.0 - 0.5 * progress,
            alpha: 1.0 - progress,
        })
    }
}
