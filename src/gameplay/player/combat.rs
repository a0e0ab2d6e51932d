//! Player attack timing: swing, recovery, combo chaining and push impulse.

use bevy::prelude::*;

use crate::gameplay::tick_past;
use crate::geometry::Facing;

// === Constants ===

const ATTACK_DURATION: f32 = 0.2;
const ATTACK_COOLDOWN: f32 = 0.025;
const MAX_COMBO: u8 = 2;
const COMBO_WINDOW: f32 = 0.6;
const COMBO_DECAY: f32 = 0.4;
const PUSH_SPEED: f32 = 400.0;
const PUSH_DURATION: f32 = 0.12;
const RECOVERY_TIME: f32 = 0.08;

/// Movement multiplier at the very start of recovery.
pub const RECOVERY_MIN_SPEED: f32 = 0.3;

/// Timing parameters for the player's attack loop.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct CombatTiming {
    pub attack_duration: f32,
    pub attack_cooldown: f32,
    pub max_combo: u8,
    pub combo_window: f32,
    pub combo_decay: f32,
    pub push_speed: f32,
    pub push_duration: f32,
    pub recovery_time: f32,
}

impl Default for CombatTiming {
    fn default() -> Self {
        Self {
            attack_duration: ATTACK_DURATION,
            attack_cooldown: ATTACK_COOLDOWN,
            max_combo: MAX_COMBO,
            combo_window: COMBO_WINDOW,
            combo_decay: COMBO_DECAY,
            push_speed: PUSH_SPEED,
            push_duration: PUSH_DURATION,
            recovery_time: RECOVERY_TIME,
        }
    }
}

/// Exactly one of these holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum CombatPhase {
    #[default]
    Idle,
    Attacking,
    Recovering,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct CombatTimer {
    timing: CombatTiming,
    phase: CombatPhase,
    /// Runs the current swing or recovery; unused while idle.
    phase_timer: Timer,
    combo: u8,
    cooldown: Option<Timer>,
    combo_window: Option<Timer>,
    combo_decay: Option<Timer>,
    attack_direction: Facing,
    push: Vec2,
    push_timer: Option<Timer>,
}

impl CombatTimer {
    #[must_use]
    pub fn new(timing: CombatTiming) -> Self {
        Self {
            timing,
            phase: CombatPhase::Idle,
            phase_timer: Timer::default(),
            combo: 0,
            cooldown: None,
            combo_window: None,
            combo_decay: None,
            attack_direction: Facing::Right,
            push: Vec2::ZERO,
            push_timer: None,
        }
    }

    /// Requests an attack toward `direction`.
    ///
    /// Returns the combo index of the swing that started, or `None` when the
    /// request is dropped. `cooldown_multiplier` scales the post-swing cooldown
    /// (rapid-fire).
    pub fn try_attack(&mut self, direction: Facing, cooldown_multiplier: f32) -> Option<u8> {
        let can_start = self.phase == CombatPhase::Idle && self.cooldown.is_none();
        let can_chain = (self.is_attacking() || self.combo_window.is_some())
            && self.combo < self.timing.max_combo;

        if can_start {
            self.combo = 1;
        } else if can_chain {
            self.combo += 1;
        } else {
            return None;
        }

        let timing = self.timing;
        self.phase = CombatPhase::Attacking;
        self.phase_timer = Timer::from_seconds(timing.attack_duration, TimerMode::Once);
        self.cooldown = Some(Timer::from_seconds(
            timing.attack_cooldown * cooldown_multiplier,
            TimerMode::Once,
        ));
        self.combo_window = Some(Timer::from_seconds(timing.combo_window, TimerMode::Once));
        self.combo_decay = None;
        self.attack_direction = direction;
        self.push = direction.unit_vector() * timing.push_speed;
        self.push_timer = Some(Timer::from_seconds(timing.push_duration, TimerMode::Once));
        Some(self.combo)
    }

    /// Advances every timer by `dt`. A phase that ends mid-step hands the rest
    /// of the step to the phase after it.
    pub fn update(&mut self, dt: f32) {
        match self.phase {
            CombatPhase::Attacking => {
                if let Some(leftover) = tick_past(&mut self.phase_timer, dt) {
                    self.phase = CombatPhase::Recovering;
                    self.phase_timer =
                        Timer::from_seconds(self.timing.recovery_time, TimerMode::Once);
                    if tick_past(&mut self.phase_timer, leftover).is_some() {
                        self.phase = CombatPhase::Idle;
                    }
                }
            }
            CombatPhase::Recovering => {
                if tick_past(&mut self.phase_timer, dt).is_some() {
                    self.phase = CombatPhase::Idle;
                }
            }
            CombatPhase::Idle => {}
        }

        if let Some(cooldown) = self.cooldown.as_mut() {
            if tick_past(cooldown, dt).is_some() {
                self.cooldown = None;
            }
        }

        if let Some(window) = self.combo_window.as_mut() {
            if let Some(leftover) = tick_past(window, dt) {
                self.combo_window = None;
                let mut decay = Timer::from_seconds(self.timing.combo_decay, TimerMode::Once);
                if tick_past(&mut decay, leftover).is_some() {
                    self.combo = 0;
                } else {
                    self.combo_decay = Some(decay);
                }
            }
        } else if let Some(decay) = self.combo_decay.as_mut() {
            if tick_past(decay, dt).is_some() {
                self.combo_decay = None;
                self.combo = 0;
            }
        }

        if let Some(push_timer) = self.push_timer.as_mut() {
            if tick_past(push_timer, dt).is_some() {
                self.push_timer = None;
                self.push = Vec2::ZERO;
            }
        }
    }

    /// Push displacement for a step of `dt`, never more than the impulse has
    /// left and zero once it is spent.
    #[must_use]
    pub fn push_displacement(&self, dt: f32) -> Vec2 {
        self.push_timer.as_ref().map_or(Vec2::ZERO, |push_timer| {
            self.push * dt.min(push_timer.remaining_secs())
        })
    }

    /// Speed multiplier for voluntary movement: ramps linearly from
    /// [`RECOVERY_MIN_SPEED`] to 1.0 across recovery, 1.0 otherwise.
    #[must_use]
    pub fn movement_multiplier(&self) -> f32 {
        match self.phase {
            CombatPhase::Recovering => {
                RECOVERY_MIN_SPEED + (1.0 - RECOVERY_MIN_SPEED) * self.phase_timer.fraction()
            }
            _ => 1.0,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> CombatPhase {
        self.phase
    }

    #[must_use]
    pub const fn is_attacking(&self) -> bool {
        matches!(self.phase, CombatPhase::Attacking)
    }

    #[must_use]
    pub const fn is_recovering(&self) -> bool {
        matches!(self.phase, CombatPhase::Recovering)
    }

    #[must_use]
    pub const fn combo(&self) -> u8 {
        self.combo
    }

    #[must_use]
    pub const fn attack_direction(&self) -> Facing {
        self.attack_direction
    }

    #[must_use]
    pub const fn timing(&self) -> &CombatTiming {
        &self.timing
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.timing);
    }
}

impl Default for CombatTimer {
    fn default() -> Self {
        Self::new(CombatTiming::default())
    }
}
