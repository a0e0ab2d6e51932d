//! Multi-frame runs of the full plugin with a fixed clock and seed.

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use pretty_assertions::assert_eq;
use survival_combat::prelude::*;

#[derive(Resource, Default)]
struct Seen(Vec<CombatEvent>);

fn record(mut reader: MessageReader<CombatEvent>, mut seen: ResMut<Seen>) {
    seen.0.extend(reader.read().cloned());
}

fn create_session(seed: u64) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
    app.insert_resource(CombatConfig {
        seed: Some(seed),
        ..default()
    });
    app.add_plugins(survival_combat::plugin);
    app.init_resource::<Seen>();
    app.add_systems(Last, record);
    app.update();
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::InGame);
    app.update();
    app
}

fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

#[test]
fn first_wave_spawns_its_full_quota() {
    let mut app = create_session(3);
    for _ in 0..60 {
        app.update();
    }
    let waves = app.world().resource::<WaveManager>();
    assert_eq!(waves.wave(), 1);
    assert_eq!(waves.spawned(), waves.quota());
    assert_eq!(waves.phase(), WavePhase::InProgress);
}

#[test]
fn idle_player_is_hurt_by_approaching_enemies() {
    let mut app = create_session(11);
    for _ in 0..200 {
        app.update();
    }
    let player = app.world().resource::<Player>();
    assert!(player.health().current() < player.health().max());
    let hurt = app
        .world()
        .resource::<Seen>()
        .0
        .iter()
        .any(|event| matches!(event, CombatEvent::PlayerHurt { .. }));
    assert!(hurt);
}

#[test]
fn idle_player_is_overrun_and_the_run_ends() {
    let mut app = create_session(5);
    let mut frames = 0;
    while state(&app) != GameState::GameOver {
        app.update();
        frames += 1;
        assert!(frames < 3000, "player never died");
    }

    let summaries: Vec<_> = app
        .world()
        .resource::<Seen>()
        .0
        .iter()
        .filter_map(|event| match event {
            CombatEvent::PlayerDied(summary) => Some(*summary),
            _ => None,
        })
        .collect();
    assert_eq!(summaries, vec![RunSummary::default()]);

    // Nothing moves once the run is over.
    let spawned = app.world().resource::<WaveManager>().spawned();
    for _ in 0..20 {
        app.update();
    }
    assert_eq!(app.world().resource::<WaveManager>().spawned(), spawned);
}

#[test]
fn same_seed_gives_the_same_run() {
    let positions = |seed| {
        let mut app = create_session(seed);
        for _ in 0..40 {
            app.update();
        }
        app.world()
            .resource::<WaveManager>()
            .enemies()
            .iter()
            .map(|enemy| (enemy.archetype(), enemy.position()))
            .collect::<Vec<_>>()
    };
    assert_eq!(positions(99), positions(99));
}
