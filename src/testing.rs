//! Testing utilities for Bevy systems.

#![cfg(test)]

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use crate::GameState;
use crate::gameplay::CombatConfig;
use crate::gameplay::events::CombatEvent;

/// Simulated time per `app.update()`.
pub const TEST_TICK: Duration = Duration::from_millis(100);

/// Every `CombatEvent` seen since the app was created.
#[derive(Resource, Debug, Default)]
pub struct CollectedEvents(pub Vec<CombatEvent>);

fn collect_events(mut reader: MessageReader<CombatEvent>, mut collected: ResMut<CollectedEvents>) {
    collected.0.extend(reader.read().cloned());
}

/// Full game app with a fixed tick and seed, `Startup` already run.
pub fn create_game_app() -> App {
    create_game_app_with(CombatConfig {
        seed: Some(7),
        ..default()
    })
}

/// Like [`create_game_app`], with the session built from `config`.
pub fn create_game_app_with(config: CombatConfig) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(TEST_TICK));
    app.insert_resource(config);
    app.add_plugins(crate::plugin);
    app.init_resource::<CollectedEvents>();
    app.add_systems(Last, collect_events);
    app.update();
    app
}

/// Requests `GameState::InGame` and runs the frame that enters it.
pub fn enter_game(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::InGame);
    app.update();
}

/// Helper to advance the app by multiple frames.
pub fn tick_multiple(app: &mut App, count: usize) {
    for _ in 0..count {
        app.update();
    }
}
