//! Animation driver
//!
//! Симуляция не проигрывает анимации — только ставит fire-and-forget команды
//! (`SetTrigger` / `SetBool` / `SetFloat`) в очередь, хост их забирает (`drain`).
//!
//! Архитектура:
//! - Имена параметров из `AnimationConfig` хэшируются один раз при спавне (`AnimKeys`)
//! - `AnimHash` = FNV-1a 32 bit от имени (стабилен между запусками и платформами)
//! - Нет драйвера на entity → команды просто не ставятся (см. `AgentContext`)

use bevy::prelude::*;

use crate::config::AnimationConfig;

/// Хэш имени параметра аниматора
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimHash(pub u32);

impl AnimHash {
    const FNV_OFFSET: u32 = 0x811c_9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;

    pub const fn of(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u32;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }
}

/// Команда аниматору хоста
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimCommand {
    SetTrigger(AnimHash),
    SetBool(AnimHash, bool),
    SetFloat(AnimHash, f32),
}

/// Resolved ключи (из AnimationConfig)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimKeys {
    pub move_speed: AnimHash,
    pub walking: AnimHash,
    pub running: AnimHash,
    pub flying: AnimHash,
    pub landing: AnimHash,
    pub flying_direction: AnimHash,
    pub attack: AnimHash,
    pub hit: AnimHash,
    pub die: AnimHash,
    pub idle: AnimHash,
    pub aim: AnimHash,
    pub snap: AnimHash,
    pub pull: AnimHash,
    pub bite: AnimHash,
    pub stuck: AnimHash,
    pub recover: AnimHash,
    pub camouflage: AnimHash,
}

impl AnimKeys {
    pub fn resolve(config: &AnimationConfig) -> Self {
        Self {
            move_speed: AnimHash::of(&config.move_speed_float),
            walking: AnimHash::of(&config.walking_bool),
            running: AnimHash::of(&config.running_bool),
            flying: AnimHash::of(&config.flying_bool),
            landing: AnimHash::of(&config.landing_bool),
            flying_direction: AnimHash::of(&config.flying_direction_float),
            attack: AnimHash::of(&config.attack_trigger),
            hit: AnimHash::of(&config.hit_trigger),
            die: AnimHash::of(&config.die_trigger),
            idle: AnimHash::of(&config.idle_trigger),
            aim: AnimHash::of(&config.aim_trigger),
            snap: AnimHash::of(&config.snap_trigger),
            pull: AnimHash::of(&config.pull_trigger),
            bite: AnimHash::of(&config.bite_trigger),
            stuck: AnimHash::of(&config.stuck_trigger),
            recover: AnimHash::of(&config.recover_trigger),
            camouflage: AnimHash::of(&config.camouflage_float),
        }
    }
}

/// Per-agent очередь команд аниматору
#[derive(Component, Debug, Clone)]
pub struct AnimationDriver {
    pub keys: AnimKeys,
    queue: Vec<AnimCommand>,
}

impl AnimationDriver {
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            keys: AnimKeys::resolve(config),
            queue: Vec::new(),
        }
    }

    pub fn trigger(&mut self, key: AnimHash) {
        self.queue.push(AnimCommand::SetTrigger(key));
    }

    pub fn set_bool(&mut self, key: AnimHash, value: bool) {
        self.queue.push(AnimCommand::SetBool(key, value));
    }

    pub fn set_float(&mut self, key: AnimHash, value: f32) {
        self.queue.push(AnimCommand::SetFloat(key, value));
    }

    pub fn pending(&self) -> &[AnimCommand] {
        &self.queue
    }

    /// Хост забирает накопленные команды (порядок сохраняется)
    pub fn drain(&mut self) -> Vec<AnimCommand> {
        std::mem::take(&mut self.queue)
    }
}
