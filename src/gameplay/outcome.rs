//! Run outcome: player death ends the run.

use bevy::prelude::*;

use crate::gameplay::events::CombatEvent;
use crate::gameplay::player::Player;
use crate::{GameSet, GameState, gameplay_running};

/// Publishes the run summary and moves to `GameOver` once the player is dead.
fn detect_player_death(
    player: Res<Player>,
    mut next_state: ResMut<NextState<GameState>>,
    mut writer: MessageWriter<CombatEvent>,
) {
    if player.is_alive() {
        return;
    }
    let summary = player.summary();
    info!(
        "Game over: {} waves survived, {} enemies killed, score {}",
        summary.waves_survived,
        summary.enemies_killed,
        summary.score()
    );
    writer.write(CombatEvent::PlayerDied(summary));
    next_state.set(GameState::GameOver);
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        detect_player_death
            .in_set(GameSet::Outcome)
            .run_if(gameplay_running),
    );
}
