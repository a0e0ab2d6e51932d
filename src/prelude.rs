//! Common imports for hosts driving the combat core.

pub use bevy::prelude::*;

pub use crate::gameplay::enemies::{Archetype, Behavior, Enemy, EnemyId};
pub use crate::gameplay::events::{CombatEvent, PowerUpSource};
pub use crate::gameplay::player::{Player, PlayerIntent, RunSummary};
pub use crate::gameplay::powerups::{EffectKind, PowerUps};
pub use crate::gameplay::waves::{WaveManager, WavePhase};
pub use crate::gameplay::{CombatConfig, SimRng};
pub use crate::geometry::Facing;
pub use crate::{GameSet, GameState, InGameState, gameplay_running};
