//! Базовые компоненты агента: вид, authority, RNG, исходящие команды

use std::sync::Arc;

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ai::AgentCommand;
use crate::config::ArchetypeDefinition;

/// Вид агента (shared immutable config)
#[derive(Component, Debug, Clone)]
pub struct Archetype(pub Arc<ArchetypeDefinition>);

impl Archetype {
    pub fn definition(&self) -> &ArchetypeDefinition {
        &self.0
    }
}

/// Кто решает за агента
///
/// Replica — клиентская копия: логика не тикает, навигация выключена,
/// transform приходит с хоста.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub enum Authority {
    #[default]
    Host,
    Replica,
}

impl Authority {
    pub fn is_host(&self) -> bool {
        matches!(self, Authority::Host)
    }
}

/// Per-agent детерминированный RNG (seed из `DeterministicRng`)
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct AgentRng(pub ChaCha8Rng);

impl AgentRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

/// Исходящие команды состояний (применяются в `AgentSet::Effects`)
///
/// Состояния не трогают чужие entity напрямую — только кладут сюда.
#[derive(Component, Debug, Clone, Default)]
pub struct AgentCommands(pub Vec<AgentCommand>);
