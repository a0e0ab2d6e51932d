//! The player: movement, attack requests, hit resolution and run statistics.

pub mod combat;

use bevy::prelude::*;
use rand::Rng;

use self::combat::{CombatTimer, CombatTiming};
use crate::config::{ConfigError, ensure_positive};
use crate::gameplay::collision::{Obstacles, move_and_collide};
use crate::gameplay::enemies::Enemy;
use crate::gameplay::events::{CombatEvent, PowerUpSource};
use crate::gameplay::gauges::{DamageOutcome, Health, PowerPool};
use crate::gameplay::powerups::{EffectKind, PowerUps};
use crate::gameplay::waves::WaveManager;
use crate::gameplay::{CombatConfig, SimRng, publish};
use crate::geometry::{Facing, body_at, clamp_inside, overlaps};
use crate::{GameSet, gameplay_running};

// === Constants ===

const PLAYER_SPEED: f32 = 350.0;
const PLAYER_SIZE: Vec2 = Vec2::splat(48.0);
const BASE_DAMAGE: f32 = 10.0;
const ATTACK_RANGE: f32 = 80.0;
const ATTACK_WIDTH: f32 = 60.0;
const MAX_HEALTH: f32 = 100.0;
const MAX_POWER: f32 = 100.0;
const POWER_PER_KILL: f32 = 15.0;

const WAVE_SCORE: u32 = 100;
const KILL_SCORE: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    pub speed: f32,
    pub size: Vec2,
    pub damage: f32,
    pub attack_range: f32,
    pub attack_width: f32,
    pub max_health: f32,
    pub max_power: f32,
    pub power_per_kill: f32,
    pub timing: CombatTiming,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            size: PLAYER_SIZE,
            damage: BASE_DAMAGE,
            attack_range: ATTACK_RANGE,
            attack_width: ATTACK_WIDTH,
            max_health: MAX_HEALTH,
            max_power: MAX_POWER,
            power_per_kill: POWER_PER_KILL,
            timing: CombatTiming::default(),
        }
    }
}

// === Resources ===

/// Host input for the current tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct PlayerIntent {
    /// Desired direction. Longer than 1 is normalized.
    pub movement: Vec2,
    /// Set on the press transition only. Consumed every tick.
    pub attack: bool,
}

/// Final statistics of a run, handed to persistence on death.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub waves_survived: u32,
    pub enemies_killed: u32,
}

impl RunSummary {
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.waves_survived * WAVE_SCORE + self.enemies_killed * KILL_SCORE
    }
}

#[derive(Resource, Debug, Clone)]
pub struct Player {
    config: PlayerConfig,
    spawn_point: Vec2,
    position: Vec2,
    facing: Facing,
    moving: bool,
    health: Health,
    power: PowerPool,
    combat: CombatTimer,
    stats: RunSummary,
}

impl Player {
    pub fn new(config: PlayerConfig, spawn_point: Vec2) -> Result<Self, ConfigError> {
        ensure_positive("player_speed", config.speed)?;
        ensure_positive("attack_range", config.attack_range)?;
        ensure_positive("attack_duration", config.timing.attack_duration)?;
        ensure_positive("recovery_time", config.timing.recovery_time)?;
        Ok(Self {
            spawn_point,
            position: spawn_point,
            facing: Facing::default(),
            moving: false,
            health: Health::new(config.max_health)?,
            power: PowerPool::new(config.max_power)?,
            combat: CombatTimer::new(config.timing),
            stats: RunSummary::default(),
            config,
        })
    }

    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    pub fn body(&self) -> Rect {
        body_at(self.position, self.config.size)
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

    pub(crate) const fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }

    #[must_use]
    pub const fn power(&self) -> &PowerPool {
        &self.power
    }

    #[must_use]
    pub const fn combat(&self) -> &CombatTimer {
        &self.combat
    }

    #[must_use]
    pub const fn config(&self) -> &PlayerConfig {
        &self.config
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    #[must_use]
    pub const fn summary(&self) -> RunSummary {
        self.stats
    }

    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        self.health.apply_damage(amount)
    }

    pub fn heal(&mut self, amount: f32) -> bool {
        self.health.heal(amount)
    }

    pub fn add_power(&mut self, amount: f32, rng: &mut impl Rng) -> Option<EffectKind> {
        self.power.add_power(amount, rng)
    }

    /// Counts a kill and grants its power reward.
    pub fn on_enemy_killed(&mut self, rng: &mut impl Rng) -> Option<EffectKind> {
        self.stats.enemies_killed += 1;
        self.power.add_power(self.config.power_per_kill, rng)
    }

    pub fn record_wave_survived(&mut self) {
        self.stats.waves_survived += 1;
    }

    pub fn update_timers(&mut self, dt: f32) {
        self.combat.update(dt);
        self.health.update(dt);
    }

    /// Turns toward the input direction unless mid-swing.
    pub fn face_input(&mut self, input: Vec2) {
        if self.combat.is_attacking() {
            return;
        }
        if let Some(facing) = Facing::from_input(input) {
            self.facing = facing;
        }
    }

    /// Starts or chains an attack toward the current facing.
    pub fn try_attack(&mut self, cooldown_multiplier: f32) -> Option<u8> {
        if !self.is_alive() {
            return None;
        }
        self.combat.try_attack(self.facing, cooldown_multiplier)
    }

    /// Strike area: `range × width`, flush against the body on `direction`'s side.
    #[must_use]
    pub fn attack_hitbox(&self, direction: Facing, range_multiplier: f32) -> Rect {
        let body = self.body();
        let center = body.center();
        let range = self.config.attack_range * range_multiplier;
        let half_width = self.config.attack_width / 2.0;
        match direction {
            Facing::Right => Rect::new(
                body.max.x,
                center.y - half_width,
                body.max.x + range,
                center.y + half_width,
            ),
            Facing::Left => Rect::new(
                body.min.x - range,
                center.y - half_width,
                body.min.x,
                center.y + half_width,
            ),
            Facing::Up => Rect::new(
                center.x - half_width,
                body.max.y,
                center.x + half_width,
                body.max.y + range,
            ),
            Facing::Down => Rect::new(
                center.x - half_width,
                body.min.y - range,
                center.x + half_width,
                body.min.y,
            ),
        }
    }

    /// Moves the player for one step.
    ///
    /// Voluntary movement is suppressed mid-swing and slowed during recovery;
    /// the attack push is added on top. The result is resolved against
    /// `obstacles` per axis and kept inside `arena`.
    pub fn step(
        &mut self,
        dt: f32,
        input: Vec2,
        speed_multiplier: f32,
        obstacles: &[Rect],
        arena: Rect,
    ) {
        let direction = input.clamp_length_max(1.0);
        let voluntary = if self.combat.is_attacking() || !self.is_alive() {
            Vec2::ZERO
        } else {
            direction
                * self.config.speed
                * speed_multiplier
                * self.combat.movement_multiplier()
                * dt
        };
        self.moving = voluntary != Vec2::ZERO;

        let displacement = voluntary + self.combat.push_displacement(dt);
        if displacement == Vec2::ZERO {
            return;
        }
        let moved = move_and_collide(self.body(), displacement, obstacles);
        self.position = clamp_inside(moved, arena).center();
    }

    /// Full health, empty power, back at the spawn point, statistics cleared.
    pub fn reset(&mut self) {
        self.position = self.spawn_point;
        self.facing = Facing::default();
        self.moving = false;
        self.health.reset();
        self.power.reset();
        self.combat.reset();
        self.stats = RunSummary::default();
    }
}

// === Systems ===

/// Timers, facing, attack request, then movement.
fn update_player(
    time: Res<Time>,
    config: Res<CombatConfig>,
    mut intent: ResMut<PlayerIntent>,
    mut player: ResMut<Player>,
    power_ups: Res<PowerUps>,
    obstacles: Res<Obstacles>,
    mut writer: MessageWriter<CombatEvent>,
) {
    let dt = time.delta_secs();
    player.update_timers(dt);
    player.face_input(intent.movement);

    if std::mem::take(&mut intent.attack) {
        if let Some(combo) = player.try_attack(power_ups.attack_cooldown_multiplier()) {
            writer.write(CombatEvent::PlayerAttacked {
                combo,
                direction: player.combat().attack_direction(),
            });
        }
    }

    player.step(
        dt,
        intent.movement,
        power_ups.speed_multiplier(),
        &obstacles.0,
        config.arena.bounds,
    );
}

/// Applies the active swing to every live enemy under the hitbox.
fn resolve_player_hits(
    mut player: ResMut<Player>,
    mut waves: ResMut<WaveManager>,
    mut power_ups: ResMut<PowerUps>,
    mut rng: ResMut<SimRng>,
    mut writer: MessageWriter<CombatEvent>,
) {
    if !player.is_alive() || !player.combat().is_attacking() {
        return;
    }
    let direction = player.combat().attack_direction();
    let hitbox = player.attack_hitbox(direction, power_ups.attack_range_multiplier());
    let damage = player.config().damage * power_ups.damage_multiplier();

    let struck: Vec<_> = waves
        .live_enemies()
        .filter(|enemy| overlaps(enemy.body(), hitbox))
        .map(Enemy::id)
        .collect();

    let mut gained = Vec::new();
    for id in struck {
        match waves.hit_enemy(id, damage) {
            Some(DamageOutcome::Wounded) => waves.knock_back_enemy(id, direction.unit_vector()),
            Some(DamageOutcome::Killed) => {
                if let Some(kind) = player.on_enemy_killed(&mut rng.0) {
                    info!("Power meter full: {}", kind.display_name());
                    power_ups.apply_effect(kind, player.health_mut());
                    gained.push(CombatEvent::PowerUpGained {
                        kind,
                        source: PowerUpSource::PowerMeter,
                    });
                }
            }
            _ => {}
        }
    }

    publish(&mut writer, waves.drain_events());
    publish(&mut writer, gained);
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<PlayerIntent>();
    app.init_resource::<PlayerIntent>();
    app.add_systems(
        Update,
        (
            update_player.in_set(GameSet::Player),
            resolve_player_hits.in_set(GameSet::Hits),
        )
            .run_if(gameplay_running),
    );
}
