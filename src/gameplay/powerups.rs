//! Timed effect registry and world pickups.
//!
//! Effects are keyed by kind: re-applying an active kind overwrites its
//! remaining time rather than stacking. Health is instant and never stored.

use std::collections::BTreeMap;

use bevy::prelude::*;
use rand::Rng;

use crate::config::{ConfigError, WeightedTable, ensure_positive};
use crate::gameplay::{SimRng, step_duration, tick_past};
use crate::gameplay::events::{CombatEvent, PowerUpSource};
use crate::gameplay::gauges::Health;
use crate::gameplay::player::Player;
use crate::geometry::{body_at, overlaps, random_point_in};
use crate::{GameSet, gameplay_running};

// === Constants ===

const HEALTH_RESTORE: f32 = 50.0;
const DAMAGE_MULTIPLIER: f32 = 2.0;
const DAMAGE_DURATION: f32 = 10.0;
const SPEED_MULTIPLIER: f32 = 1.5;
const SPEED_DURATION: f32 = 8.0;
const INVULNERABILITY_DURATION: f32 = 5.0;
const RAPID_FIRE_COOLDOWN_MULTIPLIER: f32 = 0.3;
const RAPID_FIRE_DURATION: f32 = 12.0;
const AREA_ATTACK_RANGE_MULTIPLIER: f32 = 1.5;
const AREA_ATTACK_DURATION: f32 = 15.0;

const PICKUP_INTERVAL: f32 = 15.0;
const PICKUP_CHANCE: f32 = 0.3;
const PICKUP_SIZE: f32 = 24.0;

// === Effect kinds ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub enum EffectKind {
    Health,
    Speed,
    Damage,
    Invulnerability,
    RapidFire,
    AreaAttack,
}

/// Magnitude and duration of an effect kind. Duration 0 means instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectStats {
    pub magnitude: f32,
    pub duration: f32,
}

impl EffectKind {
    pub const ALL: [Self; 6] = [
        Self::Health,
        Self::Speed,
        Self::Damage,
        Self::Invulnerability,
        Self::RapidFire,
        Self::AreaAttack,
    ];

    #[must_use]
    pub const fn stats(self) -> EffectStats {
        let (magnitude, duration) = match self {
            Self::Health => (HEALTH_RESTORE, 0.0),
            Self::Speed => (SPEED_MULTIPLIER, SPEED_DURATION),
            Self::Damage => (DAMAGE_MULTIPLIER, DAMAGE_DURATION),
            Self::Invulnerability => (1.0, INVULNERABILITY_DURATION),
            Self::RapidFire => (RAPID_FIRE_COOLDOWN_MULTIPLIER, RAPID_FIRE_DURATION),
            Self::AreaAttack => (AREA_ATTACK_RANGE_MULTIPLIER, AREA_ATTACK_DURATION),
        };
        EffectStats {
            magnitude,
            duration,
        }
    }

    #[must_use]
    pub const fn is_instant(self) -> bool {
        matches!(self, Self::Health)
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Health => "Health",
            Self::Speed => "Speed Boost",
            Self::Damage => "Damage Boost",
            Self::Invulnerability => "Invulnerability",
            Self::RapidFire => "Rapid Fire",
            Self::AreaAttack => "Area Attack",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub magnitude: f32,
    pub timer: Timer,
}

impl ActiveEffect {
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.timer.remaining_secs()
    }
}

// === Pickups ===

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupConfig {
    pub interval: f32,
    pub chance: f32,
    pub spawn_region: Rect,
    pub weights: [(EffectKind, f32); 5],
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            interval: PICKUP_INTERVAL,
            chance: PICKUP_CHANCE,
            spawn_region: Rect::new(200.0, 200.0, 1100.0, 600.0),
            weights: [
                (EffectKind::Health, 0.3),
                (EffectKind::Speed, 0.2),
                (EffectKind::Damage, 0.2),
                (EffectKind::Invulnerability, 0.15),
                (EffectKind::RapidFire, 0.15),
            ],
        }
    }
}

/// A collectible lying in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pickup {
    pub kind: EffectKind,
    pub position: Vec2,
}

impl Pickup {
    #[must_use]
    pub fn body(&self) -> Rect {
        body_at(self.position, Vec2::splat(PICKUP_SIZE))
    }
}

// === Registry ===

#[derive(Resource, Debug, Clone)]
pub struct PowerUps {
    active: BTreeMap<EffectKind, ActiveEffect>,
    pickups: Vec<Pickup>,
    pickup_timer: Timer,
    config: PickupConfig,
    pickup_table: WeightedTable<EffectKind>,
}

impl PowerUps {
    pub fn new(config: PickupConfig) -> Result<Self, ConfigError> {
        ensure_positive("pickup_interval", config.interval)?;
        let pickup_table = WeightedTable::new("pickup_weights", &config.weights)?;
        Ok(Self {
            active: BTreeMap::new(),
            pickups: Vec::new(),
            pickup_timer: Timer::from_seconds(config.interval, TimerMode::Repeating),
            config,
            pickup_table,
        })
    }

    /// Applies `kind` to the player. Health heals at once; every other kind is
    /// (re)inserted with its full duration.
    pub fn apply_effect(&mut self, kind: EffectKind, health: &mut Health) {
        let stats = kind.stats();
        if kind.is_instant() {
            health.heal(stats.magnitude);
            return;
        }
        if kind == EffectKind::Invulnerability {
            health.grant_invulnerability(stats.duration);
        }
        self.active.insert(
            kind,
            ActiveEffect {
                kind,
                magnitude: stats.magnitude,
                timer: Timer::from_seconds(stats.duration, TimerMode::Once),
            },
        );
    }

    /// Counts effects down and reverts the ones that ran out.
    /// Returns the kinds that expired this step.
    pub fn update(&mut self, dt: f32, health: &mut Health) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        self.active.retain(|kind, effect| {
            if tick_past(&mut effect.timer, dt).is_some() {
                expired.push(*kind);
                false
            } else {
                true
            }
        });
        for kind in &expired {
            if *kind == EffectKind::Invulnerability {
                health.clear_invulnerability();
            }
        }
        expired
    }

    fn magnitude_or_one(&self, kind: EffectKind) -> f32 {
        self.active.get(&kind).map_or(1.0, |effect| effect.magnitude)
    }

    #[must_use]
    pub fn damage_multiplier(&self) -> f32 {
        self.magnitude_or_one(EffectKind::Damage)
    }

    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.magnitude_or_one(EffectKind::Speed)
    }

    #[must_use]
    pub fn attack_cooldown_multiplier(&self) -> f32 {
        self.magnitude_or_one(EffectKind::RapidFire)
    }

    #[must_use]
    pub fn attack_range_multiplier(&self) -> f32 {
        self.magnitude_or_one(EffectKind::AreaAttack)
    }

    #[must_use]
    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.active.contains_key(&kind)
    }

    #[must_use]
    pub fn remaining(&self, kind: EffectKind) -> Option<f32> {
        self.active.get(&kind).map(ActiveEffect::remaining)
    }

    pub fn active_effects(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.active.values()
    }

    #[must_use]
    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    /// Rolls once for every interval elapsed during `dt` and returns the
    /// pickups that spawned.
    pub fn tick_pickups(&mut self, dt: f32, rng: &mut impl Rng) -> Vec<Pickup> {
        self.pickup_timer.tick(step_duration(dt));
        let mut spawned = Vec::new();
        for _ in 0..self.pickup_timer.times_finished_this_tick() {
            if rng.random::<f32>() >= self.config.chance {
                continue;
            }
            let pickup = Pickup {
                kind: self.pickup_table.pick(rng),
                position: random_point_in(self.config.spawn_region, rng),
            };
            self.pickups.push(pickup);
            spawned.push(pickup);
        }
        spawned
    }

    /// Applies and removes every pickup overlapping `body`.
    pub fn collect_pickups(&mut self, body: Rect, health: &mut Health) -> Vec<EffectKind> {
        let mut collected = Vec::new();
        self.pickups.retain(|pickup| {
            if overlaps(pickup.body(), body) {
                collected.push(pickup.kind);
                false
            } else {
                true
            }
        });
        for &kind in &collected {
            self.apply_effect(kind, health);
        }
        collected
    }

    /// Drops all effects and pickups without reverting them.
    pub fn clear(&mut self) {
        self.active.clear();
        self.pickups.clear();
        self.pickup_timer.reset();
    }
}

// === Systems ===

/// Expires effects, rolls for pickups and collects the ones the player touches.
fn update_power_ups(
    time: Res<Time>,
    mut power_ups: ResMut<PowerUps>,
    mut player: ResMut<Player>,
    mut rng: ResMut<SimRng>,
    mut writer: MessageWriter<CombatEvent>,
) {
    let dt = time.delta_secs();
    for kind in power_ups.update(dt, player.health_mut()) {
        debug!("{} wore off", kind.display_name());
    }

    for pickup in power_ups.tick_pickups(dt, &mut rng.0) {
        debug!("{} pickup at {}", pickup.kind.display_name(), pickup.position);
        writer.write(CombatEvent::PickupSpawned {
            kind: pickup.kind,
            position: pickup.position,
        });
    }

    let body = player.body();
    for kind in power_ups.collect_pickups(body, player.health_mut()) {
        info!("Picked up {}", kind.display_name());
        writer.write(CombatEvent::PowerUpGained {
            kind,
            source: PowerUpSource::Pickup,
        });
    }
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        update_power_ups
            .in_set(GameSet::Effects)
            .run_if(gameplay_running),
    );
}
