//! Real-time combat core for a top-down survival game.

pub mod config;
pub mod gameplay;
pub mod geometry;
pub mod prelude;
#[cfg(test)]
pub mod testing;

use bevy::prelude::*;

/// Primary game states.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Before the first run.
    #[default]
    Title,
    /// A run is underway.
    InGame,
    /// The player died; the run summary has been published.
    GameOver,
}

/// Sub-states within `InGame`. Only exists while `GameState::InGame` is active.
#[derive(SubStates, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[source(GameState = GameState::InGame)]
pub enum InGameState {
    /// Normal gameplay.
    #[default]
    Playing,
    /// Simulation frozen.
    Paused,
}

/// Per-tick simulation order. Chained: each set runs after the previous one.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSet {
    /// Spawning, enemy AI with their arrows, arrow hits, wave completion.
    Waves,
    /// Player timers, attack requests and movement.
    Player,
    /// Player swing against enemies.
    Hits,
    /// Effect expiry and pickups.
    Effects,
    /// Death detection.
    Outcome,
}

/// Run condition: true only while a run is in progress and not paused.
pub fn gameplay_running(state: Option<Res<State<InGameState>>>) -> bool {
    state.is_some_and(|state| *state.get() == InGameState::Playing)
}

pub fn plugin(app: &mut App) {
    app.init_state::<GameState>();
    app.add_sub_state::<InGameState>();
    app.configure_sets(
        Update,
        (
            GameSet::Waves,
            GameSet::Player,
            GameSet::Hits,
            GameSet::Effects,
            GameSet::Outcome,
        )
            .chain(),
    );
    gameplay::plugin(app);
}
