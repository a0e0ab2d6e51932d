//! Discrete combat events for audio, HUD and persistence collaborators.

use bevy::prelude::*;

use crate::gameplay::enemies::{Archetype, EnemyId};
use crate::gameplay::player::RunSummary;
use crate::gameplay::powerups::EffectKind;
use crate::geometry::Facing;

/// Where a power-up came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpSource {
    PowerMeter,
    Pickup,
}

#[derive(Message, Debug, Clone, PartialEq)]
pub enum CombatEvent {
    WaveStarted {
        wave: u32,
        quota: u32,
        boss: bool,
    },
    WaveCompleted {
        wave: u32,
    },
    PlayerAttacked {
        combo: u8,
        direction: Facing,
    },
    PlayerHurt {
        amount: f32,
        remaining: f32,
    },
    EnemyHit {
        id: EnemyId,
        amount: f32,
    },
    EnemyKilled {
        id: EnemyId,
        archetype: Archetype,
    },
    PowerUpGained {
        kind: EffectKind,
        source: PowerUpSource,
    },
    PickupSpawned {
        kind: EffectKind,
        position: Vec2,
    },
    PlayerDied(RunSummary),
}
