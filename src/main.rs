//! Headless soak run: an autopilot plays until it dies or time runs out.
//!
//! Usage: `survival-sim [seed]`

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use survival_combat::prelude::*;

/// Simulated frame length.
const FRAME: Duration = Duration::from_micros(16_667);
/// Simulated seconds before the run is cut off.
const MAX_SIM_SECONDS: f32 = 600.0;

fn main() -> AppExit {
    let seed = std::env::args().nth(1).and_then(|arg| arg.parse().ok());

    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)),
            StatesPlugin,
            LogPlugin::default(),
        ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
        .insert_resource(CombatConfig { seed, ..default() })
        .add_plugins(survival_combat::plugin)
        .add_systems(Startup, start_run)
        .add_systems(
            Update,
            (
                autopilot.before(GameSet::Waves).run_if(gameplay_running),
                watch_run,
            ),
        )
        .run()
}

fn start_run(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::InGame);
}

/// Walks to the nearest live enemy and swings on alternate frames once in reach.
fn autopilot(
    player: Res<Player>,
    waves: Res<WaveManager>,
    mut intent: ResMut<PlayerIntent>,
    mut swing: Local<bool>,
) {
    let here = player.position();
    let nearest = waves.live_enemies().min_by(|a, b| {
        a.position()
            .distance_squared(here)
            .total_cmp(&b.position().distance_squared(here))
    });
    let Some(enemy) = nearest else {
        *intent = PlayerIntent::default();
        return;
    };

    let offset = enemy.position() - here;
    if offset.length() > player.config().attack_range {
        intent.movement = offset.normalize_or_zero();
        intent.attack = false;
        return;
    }

    // Square up on the dominant axis so the strike box lines up.
    intent.movement = if offset.x.abs() >= offset.y.abs() {
        Vec2::new(offset.x.signum(), 0.0)
    } else {
        Vec2::new(0.0, offset.y.signum())
    };
    *swing = !*swing;
    intent.attack = *swing;
}

fn watch_run(
    time: Res<Time>,
    mut events: MessageReader<CombatEvent>,
    mut exit: MessageWriter<AppExit>,
) {
    for event in events.read() {
        if let CombatEvent::PlayerDied(summary) = event {
            info!("Final score {}", summary.score());
            exit.write(AppExit::Success);
        }
    }
    if time.elapsed_secs() > MAX_SIM_SECONDS {
        info!("Time limit reached");
        exit.write(AppExit::Success);
    }
}
