//! Behavioral guarantees of the combat core, exercised through the public API.

use bevy::prelude::*;
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use survival_combat::gameplay::collision::{move_and_collide, resolve_axis};
use survival_combat::gameplay::enemies::{Arrow, PlayerTarget};
use survival_combat::gameplay::gauges::{DamageOutcome, Health, PowerPool};
use survival_combat::gameplay::player::combat::CombatTimer;
use survival_combat::gameplay::waves::{WaveConfig, WaveManager, WavePhase};
use survival_combat::geometry::{Axis, Facing, body_at};

#[test]
fn damage_floors_at_zero_and_reports_death_once() {
    for amount in [0.0, 1.0, 33.3, 99.9, 100.0, 150.0, 1e6] {
        let mut health = Health::new(100.0).unwrap();
        let outcome = health.apply_damage(amount);
        assert_eq!(health.current(), (100.0_f32 - amount).max(0.0), "amount {amount}");

        let mut deaths = u32::from(outcome == DamageOutcome::Killed);
        for _ in 0..3 {
            health.update(2.0);
            if health.apply_damage(amount) == DamageOutcome::Killed {
                deaths += 1;
            }
        }
        if health.current() == 0.0 {
            assert_eq!(deaths, 1, "amount {amount}");
        }
    }
}

#[test]
fn second_hit_inside_grace_window_is_rejected() {
    let mut health = Health::new(100.0).unwrap();
    assert!(health.apply_damage(5.0).applied());
    for step in 0..9 {
        health.update(0.1);
        assert!(!health.apply_damage(50.0).applied(), "step {step}");
        assert_eq!(health.current(), 95.0);
    }
}

#[test]
fn power_triggers_exactly_once_when_reaching_or_passing_max() {
    let mut rng = StdRng::seed_from_u64(21);

    let mut exact = PowerPool::new(100.0).unwrap();
    let fired: Vec<_> = [25.0, 25.0, 50.0]
        .iter()
        .filter_map(|&amount| exact.add_power(amount, &mut rng))
        .collect();
    assert_eq!(fired.len(), 1);
    assert_eq!(exact.current(), 0.0);

    let mut overshoot = PowerPool::new(100.0).unwrap();
    assert_eq!(overshoot.add_power(90.0, &mut rng), None);
    assert!(overshoot.add_power(30.0, &mut rng).is_some());
    assert_eq!(overshoot.current(), 0.0);

    let mut short = PowerPool::new(100.0).unwrap();
    assert_eq!(short.add_power(60.0, &mut rng), None);
    assert_eq!(short.add_power(39.0, &mut rng), None);
    assert_eq!(short.current(), 99.0);
}

#[test]
fn combo_sequence_caps_at_two() {
    let mut combat = CombatTimer::default();
    let mut sequence = Vec::new();
    for _ in 0..3 {
        combat.try_attack(Facing::Right, 1.0);
        sequence.push(combat.combo());
        combat.update(0.005);
    }
    assert_eq!(sequence, vec![1, 2, 2]);
}

#[test]
fn resolving_a_clear_box_again_changes_nothing() {
    let wall = Rect::new(100.0, 0.0, 140.0, 300.0);
    let start = Rect::new(40.0, 40.0, 80.0, 80.0);
    let resolved = move_and_collide(start, Vec2::new(45.0, 10.0), &[wall]);

    let mut again = resolved;
    resolve_axis(&mut again, resolved, &[wall], Axis::Horizontal);
    resolve_axis(&mut again, resolved, &[wall], Axis::Vertical);
    assert_eq!(again, resolved);
}

#[test]
fn wave_never_completes_before_all_spawns() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut health = Health::new(100.0).unwrap();
    let far = body_at(Vec2::new(9000.0, 9000.0), Vec2::splat(48.0));
    let mut waves = WaveManager::new(WaveConfig::default()).unwrap();
    waves.start_wave();
    let quota = waves.quota();

    let mut ticks = 0;
    while !matches!(waves.phase(), WavePhase::Completed) {
        waves.update(
            0.25,
            PlayerTarget {
                body: far,
                health: &mut health,
            },
            &[],
            &mut rng,
        );
        if matches!(waves.phase(), WavePhase::Completed) {
            break;
        }
        let ids: Vec<_> = waves.live_enemies().map(|enemy| enemy.id()).collect();
        for id in ids {
            waves.apply_damage_to_enemy(id, 1000.0);
        }
        assert!(waves.spawned() <= quota);
        ticks += 1;
        assert!(ticks < 200, "wave never completed");
    }

    assert_eq!(waves.spawned(), quota);
    assert_eq!(waves.enemy_count(), 0);
}

#[test]
fn scenario_a_health_pool() {
    let mut health = Health::new(100.0).unwrap();
    assert!(health.apply_damage(30.0).applied());
    assert_eq!(health.current(), 70.0);
    assert!(health.is_alive());

    assert!(!health.apply_damage(30.0).applied());
    assert_eq!(health.current(), 70.0);

    health.update(1.0);
    assert_eq!(health.apply_damage(100.0), DamageOutcome::Killed);
    assert_eq!(health.current(), 0.0);
    assert!(!health.is_alive());
}

#[test]
fn scenario_b_wave_quotas() {
    let config = WaveConfig {
        enemies_per_wave: 4,
        enemy_increase_per_wave: 1,
        boss_wave_interval: 5,
        ..default()
    };
    assert_eq!(config.quota(1), 4);
    assert_eq!(config.quota(5), 9);
}

#[test]
fn scenario_c_arrow_flight_and_expiry() {
    let mut arrow = Arrow::new(Vec2::ZERO, Vec2::new(100.0, 0.0), 200.0, 7.0);
    assert!(arrow.update(0.5));
    assert!((arrow.position() - Vec2::new(100.0, 0.0)).length() < 1e-3);

    let mut short_lived = Arrow::new(Vec2::ZERO, Vec2::new(100.0, 0.0), 200.0, 7.0)
        .with_lifetime(2.0);
    assert!(short_lived.update(1.0));
    assert!(!short_lived.update(1.0));
}

#[test]
fn scenario_d_power_pool() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut power = PowerPool::new(100.0).unwrap();
    assert_eq!(power.add_power(40.0, &mut rng), None);
    assert_eq!(power.add_power(40.0, &mut rng), None);
    assert_eq!(power.current(), 80.0);
    assert!(power.add_power(40.0, &mut rng).is_some());
    assert_eq!(power.current(), 0.0);
}
