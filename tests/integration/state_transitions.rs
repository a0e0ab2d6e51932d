//! Tests for game state transitions.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use pretty_assertions::assert_eq;
use survival_combat::{GameState, InGameState};

fn create_game_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.add_plugins(survival_combat::plugin);
    app
}

#[test]
fn game_initializes_in_title_state() {
    let app = create_game_app();
    let state = app.world().resource::<State<GameState>>();
    assert_eq!(*state.get(), GameState::Title);
}

#[test]
fn entering_game_activates_playing_sub_state() {
    let mut app = create_game_app();
    app.update();

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::InGame);
    app.update();

    let state = app.world().resource::<State<GameState>>();
    assert_eq!(*state.get(), GameState::InGame);
    let sub = app.world().resource::<State<InGameState>>();
    assert_eq!(*sub.get(), InGameState::Playing);
}

#[test]
fn sub_state_is_removed_outside_game() {
    let mut app = create_game_app();
    app.update();
    assert!(app.world().get_resource::<State<InGameState>>().is_none());
}
