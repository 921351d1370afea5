//! Health components: Health, Dead, DespawnAfter

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::AgentConfig;

/// Через сколько после смерти агент удаляется (секунды)
pub const DESPAWN_DELAY: f32 = 5.0;

/// Hit counter сбрасывается через секунду без ударов
pub const HIT_COUNTER_RESET_TIME: f32 = 1.0;

/// Здоровье агента
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    /// Flat вычитание из каждого удара
    pub defense: f32,
    /// Ударов подряд (сбрасывается через HIT_COUNTER_RESET_TIME)
    pub hit_counter: u32,
    hit_timer: f32,
}

/// Что сделал удар
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Уже мёртв — удар игнорируется
    Ignored,
    Hit { applied: f32 },
    Killed { applied: f32 },
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0, 0.0)
    }
}

impl Health {
    pub fn new(max: f32, defense: f32) -> Self {
        Self {
            current: max,
            max,
            defense,
            hit_counter: 0,
            hit_timer: 0.0,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.max_health, config.defense)
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn is_dead(&self) -> bool {
        !self.is_alive()
    }

    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    /// Урон за вычетом defense (не меньше нуля)
    pub fn take_damage(&mut self, raw: f32) -> DamageOutcome {
        if self.is_dead() {
            return DamageOutcome::Ignored;
        }

        let applied = (raw - self.defense).max(0.0);
        self.current = (self.current - applied).max(0.0);
        self.hit_counter += 1;
        self.hit_timer = HIT_COUNTER_RESET_TIME;

        if self.is_dead() {
            DamageOutcome::Killed { applied }
        } else {
            DamageOutcome::Hit { applied }
        }
    }

    pub fn heal(&mut self, amount: f32) {
        if self.is_alive() {
            self.current = (self.current + amount).min(self.max);
        }
    }

    pub fn tick_hit_counter(&mut self, delta: f32) {
        if self.hit_timer <= 0.0 {
            return;
        }

        self.hit_timer -= delta;
        if self.hit_timer <= 0.0 {
            self.hit_counter = 0;
        }
    }

    /// Replica: значения с хоста. true если агент только что умер.
    pub fn sync(&mut self, current: f32, max: f32) -> bool {
        let was_dead = self.is_dead();
        self.max = max;
        self.current = current.clamp(0.0, max);
        !was_dead && self.is_dead()
    }
}

/// Компонент-маркер: агент мертв (Health <= 0)
///
/// Логика, сенсор и навигация его пропускают.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Dead;

/// Компонент-маркер: деспавн entity через `remaining` секунд
///
/// Countdown на фиксированном шаге (детерминированно, без wall clock).
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct DespawnAfter {
    pub remaining: f32,
}

impl DespawnAfter {
    pub fn new(delay: f32) -> Self {
        Self { remaining: delay }
    }
}
