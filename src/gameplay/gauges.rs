//! Bounded resource gauges: health with a post-hit grace window, and the
//! power meter that converts kills into random effects.

use bevy::prelude::*;
use rand::Rng;

use crate::config::{ConfigError, WeightedTable, ensure_positive};
use crate::gameplay::powerups::EffectKind;
use crate::gameplay::tick_past;

// === Constants ===

/// Grace period after any accepted hit during which further damage is ignored.
pub const INVULNERABILITY_WINDOW: f32 = 1.0;

// === Health ===

/// Result of a single [`Health::apply_damage`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Rejected: the owner was dead or inside its grace window.
    Ignored,
    /// Accepted and the owner survived.
    Wounded,
    /// Accepted and this hit was the lethal one. Returned at most once.
    Killed,
}

impl DamageOutcome {
    /// Whether the hit was accepted.
    #[must_use]
    pub const fn applied(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Health gauge clamped to `[0, max]`.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Health {
    current: f32,
    max: f32,
    /// Running grace window; `None` when the owner can be hurt.
    invulnerability: Option<Timer>,
    dead: bool,
}

impl Health {
    pub fn new(max: f32) -> Result<Self, ConfigError> {
        ensure_positive("max_health", max)?;
        Ok(Self::full(max))
    }

    /// Same as [`Health::new`] for values already known to be valid.
    pub(crate) const fn full(max: f32) -> Self {
        Self {
            current: max,
            max,
            invulnerability: None,
            dead: false,
        }
    }

    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    #[must_use]
    pub fn fraction(&self) -> f32 {
        self.current / self.max
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.dead
    }

    #[must_use]
    pub const fn is_invulnerable(&self) -> bool {
        self.invulnerability.is_some()
    }

    #[must_use]
    pub fn invulnerable_remaining(&self) -> f32 {
        self.invulnerability
            .as_ref()
            .map_or(0.0, Timer::remaining_secs)
    }

    /// Subtracts `amount` unless dead or invulnerable.
    ///
    /// An accepted hit opens a fresh [`INVULNERABILITY_WINDOW`]. The first hit
    /// that brings health to zero reports [`DamageOutcome::Killed`]; every
    /// later call is ignored, so the death is observed exactly once.
    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.dead || self.is_invulnerable() {
            return DamageOutcome::Ignored;
        }
        self.current = (self.current - amount.max(0.0)).max(0.0);
        self.invulnerability = Some(Timer::from_seconds(INVULNERABILITY_WINDOW, TimerMode::Once));
        if self.current <= 0.0 {
            self.dead = true;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded
        }
    }

    /// Raises health toward max. Returns `true` when health changed.
    pub fn heal(&mut self, amount: f32) -> bool {
        if self.dead {
            return false;
        }
        let before = self.current;
        self.current = (self.current + amount.max(0.0)).min(self.max);
        self.current > before
    }

    /// Counts the grace window down.
    pub fn update(&mut self, dt: f32) {
        if let Some(timer) = self.invulnerability.as_mut() {
            if tick_past(timer, dt).is_some() {
                self.invulnerability = None;
            }
        }
    }

    /// Holds invulnerability for at least `duration` seconds.
    pub fn grant_invulnerability(&mut self, duration: f32) {
        if self.invulnerable_remaining() < duration {
            self.invulnerability = Some(Timer::from_seconds(duration, TimerMode::Once));
        }
    }

    pub fn clear_invulnerability(&mut self) {
        self.invulnerability = None;
    }

    /// Back to full and alive.
    pub fn reset(&mut self) {
        *self = Self::full(self.max);
    }
}

// === Power ===

/// Power meter. Filling it triggers one random effect and empties it.
#[derive(Debug, Clone)]
pub struct PowerPool {
    current: f32,
    max: f32,
    effects: WeightedTable<EffectKind>,
}

impl PowerPool {
    /// Pool that draws uniformly over every effect kind.
    pub fn new(max: f32) -> Result<Self, ConfigError> {
        let entries: Vec<_> = EffectKind::ALL.iter().map(|&kind| (kind, 1.0)).collect();
        Self::with_effects(max, WeightedTable::new("power_effects", &entries)?)
    }

    pub fn with_effects(max: f32, effects: WeightedTable<EffectKind>) -> Result<Self, ConfigError> {
        ensure_positive("max_power", max)?;
        Ok(Self {
            current: 0.0,
            max,
            effects,
        })
    }

    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    #[must_use]
    pub fn fraction(&self) -> f32 {
        self.current / self.max
    }

    /// Adds power, capped at max. Reaching max draws an effect and resets the
    /// pool to zero in the same call.
    pub fn add_power(&mut self, amount: f32, rng: &mut impl Rng) -> Option<EffectKind> {
        self.current = (self.current + amount.max(0.0)).min(self.max);
        if self.current >= self.max {
            self.current = 0.0;
            Some(self.effects.pick(rng))
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.current = 0.0;
    }
}
