//! Wave lifecycle: quota, spawn pacing, enemy updates and completion.
//!
//! The manager owns every enemy and, through them, every arrow in flight.

use bevy::prelude::*;
use rand::Rng;

use crate::config::{ConfigError, WeightedTable, ensure_positive};
use crate::gameplay::collision::Obstacles;
use crate::gameplay::enemies::avoidance::separate;
use crate::gameplay::enemies::{Archetype, Enemy, EnemyId, PlayerTarget};
use crate::gameplay::events::CombatEvent;
use crate::gameplay::gauges::DamageOutcome;
use crate::gameplay::player::Player;
use crate::gameplay::{SimRng, publish, step_duration, tick_past};
use crate::geometry::{overlaps, random_point_in};
use crate::{GameSet, gameplay_running};

// === Constants ===

const ENEMIES_PER_WAVE: u32 = 4;
const ENEMY_INCREASE_PER_WAVE: u32 = 1;
const BOSS_WAVE_INTERVAL: u32 = 5;
const SPAWN_INTERVAL: f32 = 1.0;
const WAVE_TRANSITION: f32 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct WaveConfig {
    pub enemies_per_wave: u32,
    pub enemy_increase_per_wave: u32,
    /// Every Nth wave gets one extra, forced boss spawn.
    pub boss_wave_interval: u32,
    pub boss_archetype: Archetype,
    pub spawn_interval: f32,
    pub transition_duration: f32,
    pub spawn_region: Rect,
    /// Enemies outside this box skip AI and movement.
    pub view: Rect,
    pub archetype_weights: Vec<(Archetype, f32)>,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            enemies_per_wave: ENEMIES_PER_WAVE,
            enemy_increase_per_wave: ENEMY_INCREASE_PER_WAVE,
            boss_wave_interval: BOSS_WAVE_INTERVAL,
            boss_archetype: Archetype::Warrior,
            spawn_interval: SPAWN_INTERVAL,
            transition_duration: WAVE_TRANSITION,
            spawn_region: Rect::new(200.0, 200.0, 1100.0, 600.0),
            view: Rect::new(0.0, 0.0, 1280.0, 720.0),
            archetype_weights: vec![
                (Archetype::Goblin, 0.5),
                (Archetype::Archer, 0.3),
                (Archetype::Warrior, 0.2),
            ],
        }
    }
}

impl WaveConfig {
    /// Enemies to spawn in `wave` (1-based), boss included.
    #[must_use]
    pub const fn quota(&self, wave: u32) -> u32 {
        let base = self.enemies_per_wave + wave.saturating_sub(1) * self.enemy_increase_per_wave;
        if self.is_boss_wave(wave) { base + 1 } else { base }
    }

    #[must_use]
    pub const fn is_boss_wave(&self, wave: u32) -> bool {
        wave > 0 && wave % self.boss_wave_interval == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WavePhase {
    #[default]
    NotStarted,
    InProgress,
    /// Between waves, waiting out the transition timer.
    Completed,
}

#[derive(Resource, Debug, Clone)]
pub struct WaveManager {
    config: WaveConfig,
    archetypes: WeightedTable<Archetype>,
    phase: WavePhase,
    wave: u32,
    quota: u32,
    spawned: u32,
    spawn_timer: Timer,
    transition: Timer,
    enemies: Vec<Enemy>,
    next_id: u32,
    events: Vec<CombatEvent>,
}

impl WaveManager {
    pub fn new(config: WaveConfig) -> Result<Self, ConfigError> {
        if config.boss_wave_interval == 0 {
            return Err(ConfigError::ZeroBossInterval);
        }
        ensure_positive("spawn_interval", config.spawn_interval)?;
        if config.spawn_region.is_empty() {
            return Err(ConfigError::DegenerateRegion {
                field: "spawn_region",
            });
        }
        let archetypes = WeightedTable::new("archetype_weights", &config.archetype_weights)?;
        Ok(Self {
            archetypes,
            phase: WavePhase::NotStarted,
            wave: 0,
            quota: 0,
            spawned: 0,
            spawn_timer: Timer::from_seconds(config.spawn_interval, TimerMode::Repeating),
            transition: Timer::from_seconds(config.transition_duration, TimerMode::Once),
            enemies: Vec::new(),
            next_id: 0,
            events: Vec::new(),
            config,
        })
    }

    /// Begins the next wave and returns its number.
    pub fn start_wave(&mut self) -> u32 {
        self.wave += 1;
        self.quota = self.config.quota(self.wave);
        self.spawned = 0;
        self.spawn_timer = Timer::from_seconds(self.config.spawn_interval, TimerMode::Repeating);
        self.phase = WavePhase::InProgress;
        let boss = self.config.is_boss_wave(self.wave);
        if boss {
            info!("Wave {} started: {} enemies, boss included", self.wave, self.quota);
        } else {
            info!("Wave {} started: {} enemies", self.wave, self.quota);
        }
        self.events.push(CombatEvent::WaveStarted {
            wave: self.wave,
            quota: self.quota,
            boss,
        });
        self.wave
    }

    /// One simulation step.
    ///
    /// Order: spawn pacing, per-enemy updates, separation, arrow hits against
    /// the player, removal of finished enemies, completion check. Time left
    /// over when the transition ends is spent on the new wave.
    pub fn update(
        &mut self,
        mut dt: f32,
        mut target: PlayerTarget<'_>,
        obstacles: &[Rect],
        rng: &mut impl Rng,
    ) {
        match self.phase {
            WavePhase::NotStarted => return,
            WavePhase::Completed => {
                let Some(leftover) = tick_past(&mut self.transition, dt) else {
                    return;
                };
                self.start_wave();
                dt = leftover;
            }
            WavePhase::InProgress => {}
        }

        if self.spawned < self.quota {
            self.spawn_timer.tick(step_duration(dt));
            for _ in 0..self.spawn_timer.times_finished_this_tick() {
                if self.spawned >= self.quota {
                    break;
                }
                self.spawn_enemy(rng);
            }
        }

        let view = self.config.view;
        for enemy in &mut self.enemies {
            if overlaps(enemy.body(), view) {
                enemy.update(dt, &mut target, obstacles, &mut self.events);
            } else {
                enemy.update_offscreen(dt, obstacles);
            }
        }

        separate(&mut self.enemies, view, rng);
        self.resolve_arrow_hits(&mut target);

        self.enemies.retain(|enemy| !enemy.is_finished());

        if self.spawned >= self.quota && self.enemies.is_empty() {
            info!("Wave {} complete", self.wave);
            self.phase = WavePhase::Completed;
            self.transition = Timer::from_seconds(self.config.transition_duration, TimerMode::Once);
            self.events.push(CombatEvent::WaveCompleted { wave: self.wave });
        }
    }

    fn spawn_enemy(&mut self, rng: &mut impl Rng) {
        let is_last = self.spawned + 1 == self.quota;
        let archetype = if is_last && self.config.is_boss_wave(self.wave) {
            self.config.boss_archetype
        } else {
            self.archetypes.pick(rng)
        };
        let position = random_point_in(self.config.spawn_region, rng);
        self.spawned += 1;
        self.push_enemy(archetype, position);
    }

    /// Adds an enemy outside the wave's spawn pacing. It does not count
    /// toward the quota but must still be cleared before the wave completes.
    pub(crate) fn push_enemy(&mut self, archetype: Archetype, position: Vec2) -> EnemyId {
        let id = EnemyId(self.next_id);
        self.next_id += 1;
        debug!("Spawned {} {:?} at {position}", archetype.display_name(), id);
        self.enemies.push(Enemy::new(id, archetype, position));
        id
    }

    /// Each arrow touching the player tries its damage once and is removed,
    /// whether or not the damage was accepted.
    fn resolve_arrow_hits(&mut self, target: &mut PlayerTarget<'_>) {
        for enemy in &mut self.enemies {
            enemy.arrows_mut().retain(|arrow| {
                if !overlaps(arrow.hitbox(), target.body) {
                    return true;
                }
                if target.health.apply_damage(arrow.damage()).applied() {
                    self.events.push(CombatEvent::PlayerHurt {
                        amount: arrow.damage(),
                        remaining: target.health.current(),
                    });
                }
                false
            });
        }
    }

    /// Damages enemy `id`. Returns `None` when no such enemy exists.
    pub fn hit_enemy(&mut self, id: EnemyId, amount: f32) -> Option<DamageOutcome> {
        let Some(enemy) = self.enemies.iter_mut().find(|enemy| enemy.id() == id) else {
            warn!("Damage requested for unknown enemy {id:?}");
            return None;
        };
        let outcome = enemy.take_damage(amount);
        if outcome.applied() {
            self.events.push(CombatEvent::EnemyHit { id, amount });
        }
        if outcome == DamageOutcome::Killed {
            debug!("{} {id:?} killed", enemy.archetype().display_name());
            self.events.push(CombatEvent::EnemyKilled {
                id,
                archetype: enemy.archetype(),
            });
        }
        Some(outcome)
    }

    /// Damages enemy `id`. Returns `true` only on the killing blow.
    pub fn apply_damage_to_enemy(&mut self, id: EnemyId, amount: f32) -> bool {
        self.hit_enemy(id, amount) == Some(DamageOutcome::Killed)
    }

    pub fn knock_back_enemy(&mut self, id: EnemyId, direction: Vec2) {
        if let Some(enemy) = self.enemies.iter_mut().find(|enemy| enemy.id() == id) {
            enemy.knock_back(direction);
        }
    }

    /// Enemies that are not dead or dying.
    pub fn live_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|enemy| !enemy.is_dead())
    }

    /// Every held enemy, dying ones included.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Number of held enemies, dying ones included.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Drops every enemy and stops the wave.
    pub fn clear_all_enemies(&mut self) {
        self.enemies.clear();
        self.phase = WavePhase::NotStarted;
    }

    /// Back to before wave 1.
    pub fn reset(&mut self) {
        self.clear_all_enemies();
        self.wave = 0;
        self.quota = 0;
        self.spawned = 0;
        self.spawn_timer.reset();
        self.transition.reset();
        self.events.clear();
    }

    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        self.phase
    }

    #[must_use]
    pub const fn quota(&self) -> u32 {
        self.quota
    }

    #[must_use]
    pub const fn spawned(&self) -> u32 {
        self.spawned
    }

    #[must_use]
    pub const fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// `0..=1` through the between-wave pause, `None` outside it.
    #[must_use]
    pub fn transition_progress(&self) -> Option<f32> {
        (self.phase == WavePhase::Completed).then(|| self.transition.fraction())
    }

    /// Takes the events raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }
}

// === Systems ===

/// Runs the wave step against the player and forwards its events.
fn update_waves(
    time: Res<Time>,
    mut waves: ResMut<WaveManager>,
    mut player: ResMut<Player>,
    obstacles: Res<Obstacles>,
    mut rng: ResMut<SimRng>,
    mut writer: MessageWriter<CombatEvent>,
) {
    let target = PlayerTarget {
        body: player.body(),
        health: player.health_mut(),
    };
    waves.update(time.delta_secs(), target, &obstacles.0, &mut rng.0);

    let events = waves.drain_events();
    for event in &events {
        if matches!(event, CombatEvent::WaveCompleted { .. }) {
            player.record_wave_survived();
        }
    }
    publish(&mut writer, events);
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        update_waves.in_set(GameSet::Waves).run_if(gameplay_running),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::gauges::Health;
    use crate::geometry::body_at;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const FAR_AWAY: Vec2 = Vec2::new(5000.0, 5000.0);

    fn manager() -> WaveManager {
        WaveManager::new(WaveConfig::default()).unwrap()
    }

    fn step(waves: &mut WaveManager, health: &mut Health, at: Vec2, dt: f32, rng: &mut StdRng) {
        let target = PlayerTarget {
            body: body_at(at, Vec2::splat(32.0)),
            health,
        };
        waves.update(dt, target, &[], rng);
    }

    fn kill_all(waves: &mut WaveManager) {
        let ids: Vec<_> = waves.live_enemies().map(Enemy::id).collect();
        for id in ids {
            waves.apply_damage_to_enemy(id, 1000.0);
        }
    }

    #[test]
    fn quota_scales_with_wave_and_boss_interval() {
        let config = WaveConfig::default();
        assert_eq!(config.quota(1), 4);
        assert_eq!(config.quota(2), 5);
        assert_eq!(config.quota(4), 7);
        assert_eq!(config.quota(5), 4 + 4 + 1);
        assert_eq!(config.quota(10), 4 + 9 + 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let zero_boss = WaveConfig {
            boss_wave_interval: 0,
            ..default()
        };
        assert_eq!(
            WaveManager::new(zero_boss).unwrap_err(),
            ConfigError::ZeroBossInterval
        );

        let empty = WaveConfig {
            archetype_weights: Vec::new(),
            ..default()
        };
        assert!(WaveManager::new(empty).is_err());

        let no_interval = WaveConfig {
            spawn_interval: 0.0,
            ..default()
        };
        assert!(WaveManager::new(no_interval).is_err());
    }

    #[test]
    fn not_started_manager_does_nothing() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut health = Health::full(100.0);
        let mut waves = manager();
        step(&mut waves, &mut health, FAR_AWAY, 5.0, &mut rng);
        assert_eq!(waves.enemy_count(), 0);
        assert_eq!(waves.phase(), WavePhase::NotStarted);
    }

    #[test]
    fn spawns_one_enemy_per_interval_inside_region() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut health = Health::full(100.0);
        let mut waves = manager();
        waves.start_wave();
        step(&mut waves, &mut health, FAR_AWAY, 0.5, &mut rng);
        assert_eq!(waves.spawned(), 0);
        step(&mut waves, &mut health, FAR_AWAY, 0.5, &mut rng);
        assert_eq!(waves.spawned(), 1);
        step(&mut waves, &mut health, FAR_AWAY, 1.0, &mut rng);
        assert_eq!(waves.spawned(), 2);
    }

    #[test]
    fn spawn_count_does_not_depend_on_frame_rate() {
        for dt in [0.25_f32, 0.3, 0.5, 1.0 / 60.0] {
            let mut rng = StdRng::seed_from_u64(3);
            let mut health = Health::full(100.0);
            let mut waves = manager();
            waves.start_wave();
            let steps = (3.5 / dt).round() as u32;
            for _ in 0..steps {
                step(&mut waves, &mut health, FAR_AWAY, dt, &mut rng);
            }
            assert_eq!(waves.spawned(), 3, "dt = {dt}");
        }
    }

    #[test]
    fn enemy_knocked_off_screen_can_still_be_finished_off() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut health = Health::full(100.0);
        let config = WaveConfig {
            enemies_per_wave: 1,
            spawn_interval: 1000.0,
            ..default()
        };
        let mut waves = WaveManager::new(config).unwrap();
        waves.start_wave();
        let id = waves.push_enemy(Archetype::Goblin, Vec2::new(640.0, 700.0));

        assert_eq!(waves.hit_enemy(id, 10.0), Some(DamageOutcome::Wounded));
        waves.knock_back_enemy(id, Vec2::Y);
        for _ in 0..600 {
            step(&mut waves, &mut health, Vec2::new(640.0, 650.0), 1.0 / 60.0, &mut rng);
        }

        let enemy = &waves.enemies()[0];
        assert!(!overlaps(enemy.body(), waves.config().view));
        assert!(enemy.knockback().is_none());
        assert!(!enemy.health().is_invulnerable());
        assert_eq!(waves.hit_enemy(id, 100.0), Some(DamageOutcome::Killed));
    }

    #[test]
    fn boss_wave_forces_boss_on_final_spawn() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut health = Health::full(100.0);
        let config = WaveConfig {
            boss_wave_interval: 1,
            archetype_weights: vec![(Archetype::Goblin, 1.0)],
            ..default()
        };
        let mut waves = WaveManager::new(config).unwrap();
        waves.start_wave();
        for _ in 0..5 {
            step(&mut waves, &mut health, FAR_AWAY, 1.0, &mut rng);
        }
        let archetypes: Vec<_> = waves.enemies().iter().map(Enemy::archetype).collect();
        assert_eq!(
            archetypes,
            vec![
                Archetype::Goblin,
                Archetype::Goblin,
                Archetype::Goblin,
                Archetype::Goblin,
                Archetype::Warrior
            ]
        );
    }

    #[test]
    fn wave_completes_only_after_full_quota_is_cleared() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut health = Health::full(100.0);
        let mut waves = manager();
        waves.start_wave();
        let quota = waves.quota();

        for spawned in 1..=quota {
            step(&mut waves, &mut health, FAR_AWAY, 1.0, &mut rng);
            assert_eq!(waves.spawned(), spawned);
            kill_all(&mut waves);
            step(&mut waves, &mut health, FAR_AWAY, 0.0, &mut rng);
            if spawned < quota {
                assert_eq!(waves.phase(), WavePhase::InProgress);
            }
        }

        // Dying enemies finish their animation before the wave can close.
        assert_eq!(waves.phase(), WavePhase::InProgress);
        step(&mut waves, &mut health, FAR_AWAY, 1.0, &mut rng);
        assert_eq!(waves.enemy_count(), 0);
        assert_eq!(waves.phase(), WavePhase::Completed);
        assert!(
            waves
                .drain_events()
                .contains(&CombatEvent::WaveCompleted { wave: 1 })
        );
    }

    #[test]
    fn transition_delay_starts_next_wave() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut health = Health::full(100.0);
        let config = WaveConfig {
            enemies_per_wave: 1,
            ..default()
        };
        let mut waves = WaveManager::new(config).unwrap();
        waves.start_wave();
        step(&mut waves, &mut health, FAR_AWAY, 1.0, &mut rng);
        kill_all(&mut waves);
        step(&mut waves, &mut health, FAR_AWAY, 1.0, &mut rng);
        assert_eq!(waves.phase(), WavePhase::Completed);
        assert_eq!(waves.transition_progress(), Some(0.0));

        step(&mut waves, &mut health, FAR_AWAY, 1.5, &mut rng);
        assert_eq!(waves.transition_progress(), Some(0.5));
        assert_eq!(waves.wave(), 1);

        step(&mut waves, &mut health, FAR_AWAY, 1.5, &mut rng);
        assert_eq!(waves.wave(), 2);
        assert_eq!(waves.phase(), WavePhase::InProgress);
        assert_eq!(waves.quota(), 2);
    }

    #[test]
    fn unknown_enemy_damage_is_a_no_op() {
        let mut waves = manager();
        assert!(!waves.apply_damage_to_enemy(EnemyId(99), 10.0));
        assert_eq!(waves.hit_enemy(EnemyId(99), 10.0), None);
    }

    #[test]
    fn kill_reports_once_and_raises_events() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut health = Health::full(100.0);
        let mut waves = manager();
        waves.start_wave();
        step(&mut waves, &mut health, FAR_AWAY, 1.0, &mut rng);
        let id = waves.enemies()[0].id();
        waves.drain_events();

        assert!(waves.apply_damage_to_enemy(id, 500.0));
        assert!(!waves.apply_damage_to_enemy(id, 500.0));
        let events = waves.drain_events();
        let kills = events
            .iter()
            .filter(|event| matches!(event, CombatEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 1);
        assert_eq!(waves.live_enemies().count(), 0);
        assert_eq!(waves.enemy_count(), 1);
    }

    #[test]
    fn arrow_hit_damages_player_once_and_is_removed() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut health = Health::full(100.0);
        let config = WaveConfig {
            enemies_per_wave: 1,
            archetype_weights: vec![(Archetype::Archer, 1.0)],
            ..default()
        };
        let mut waves = WaveManager::new(config).unwrap();
        waves.start_wave();
        step(&mut waves, &mut health, FAR_AWAY, 1.0, &mut rng);
        let player_at = waves.enemies()[0].position() + Vec2::new(100.0, 0.0);

        // In kiting range: the archer holds still and fires once its cooldown ends.
        let mut hit = false;
        for _ in 0..60 {
            step(&mut waves, &mut health, player_at, 0.05, &mut rng);
            if health.current() < 100.0 {
                hit = true;
                break;
            }
        }

        assert!(hit);
        assert_eq!(health.current(), 93.0);
        assert!(waves.enemies()[0].arrows().is_empty());
    }

    #[test]
    fn clear_and_reset_return_to_not_started() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut health = Health::full(100.0);
        let mut waves = manager();
        waves.start_wave();
        step(&mut waves, &mut health, FAR_AWAY, 1.0, &mut rng);
        waves.clear_all_enemies();
        assert_eq!(waves.enemy_count(), 0);
        assert_eq!(waves.phase(), WavePhase::NotStarted);
        waves.reset();
        assert_eq!(waves.wave(), 0);
        assert_eq!(waves.start_wave(), 1);
    }
}
