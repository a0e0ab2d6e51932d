//! Gameplay domain plugins: waves and enemies, player combat, power-ups, run outcome.

pub mod collision;
pub mod enemies;
pub mod events;
pub mod gauges;
mod outcome;
pub mod player;
pub mod powerups;
pub mod waves;

use std::time::Duration;

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use self::collision::Obstacles;
use self::events::CombatEvent;
use self::player::{Player, PlayerConfig, PlayerIntent};
use self::powerups::{PickupConfig, PowerUps};
use self::waves::{WaveConfig, WaveManager};
use crate::GameState;

// === Configuration ===

#[derive(Debug, Clone, PartialEq)]
pub struct ArenaConfig {
    /// The player is kept inside these bounds.
    pub bounds: Rect,
    pub player_spawn: Vec2,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, 1280.0, 800.0),
            player_spawn: Vec2::new(640.0, 400.0),
        }
    }
}

/// Every tunable of a session. Insert before adding the plugin to override.
#[derive(Resource, Debug, Clone, Default)]
pub struct CombatConfig {
    pub waves: WaveConfig,
    pub player: PlayerConfig,
    pub arena: ArenaConfig,
    pub pickups: PickupConfig,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
}

// === Resources ===

/// The single random source of the simulation.
#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub StdRng);

impl SimRng {
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self(seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64))
    }
}

// === Timers ===

/// `dt` seconds as a timer step. Negative or non-finite input ticks nothing.
pub(crate) fn step_duration(dt: f32) -> Duration {
    Duration::try_from_secs_f32(dt.max(0.0)).unwrap_or(Duration::ZERO)
}

/// Ticks `timer` by `dt`. Once it is finished, returns how much of `dt` was
/// left over past the finishing point.
pub(crate) fn tick_past(timer: &mut Timer, dt: f32) -> Option<f32> {
    let remaining = timer.remaining_secs();
    timer.tick(step_duration(dt));
    timer.is_finished().then(|| (dt - remaining).max(0.0))
}

pub(crate) fn publish(
    writer: &mut MessageWriter<CombatEvent>,
    events: impl IntoIterator<Item = CombatEvent>,
) {
    for event in events {
        writer.write(event);
    }
}

// === Systems ===

/// Builds the session resources from `CombatConfig`. Invalid tables fail here.
fn build_session(mut commands: Commands, config: Res<CombatConfig>) -> Result {
    let waves = WaveManager::new(config.waves.clone())?;
    let player = Player::new(config.player.clone(), config.arena.player_spawn)?;
    let power_ups = PowerUps::new(config.pickups)?;

    commands.insert_resource(waves);
    commands.insert_resource(player);
    commands.insert_resource(power_ups);
    commands.insert_resource(SimRng::new(config.seed));
    info!("Combat session ready");
    Ok(())
}

/// Fresh run: everything reset and wave 1 underway.
fn begin_run(
    mut player: ResMut<Player>,
    mut waves: ResMut<WaveManager>,
    mut power_ups: ResMut<PowerUps>,
    mut intent: ResMut<PlayerIntent>,
    mut writer: MessageWriter<CombatEvent>,
) {
    player.reset();
    power_ups.clear();
    *intent = PlayerIntent::default();
    waves.reset();
    waves.start_wave();
    publish(&mut writer, waves.drain_events());
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CombatConfig>();
    app.init_resource::<Obstacles>();
    app.add_message::<CombatEvent>();
    app.add_systems(Startup, build_session);
    app.add_systems(OnEnter(GameState::InGame), begin_run);

    app.add_plugins((
        waves::plugin,
        player::plugin,
        powerups::plugin,
        outcome::plugin,
    ));
}
