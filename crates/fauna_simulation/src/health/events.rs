//! Health events

use bevy::prelude::*;

use crate::components::PlayerId;

/// Кому адресован урон
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageTarget {
    /// Агент или любой entity с `Health` (применяется здесь)
    Entity(Entity),
    /// Игрок — применяет authoritative session handler хоста
    Player { id: PlayerId, entity: Entity },
}

/// Событие: запрос урона
#[derive(Event, Debug, Clone)]
pub struct DamageRequested {
    pub target: DamageTarget,
    pub attacker: Option<Entity>,
    pub amount: f32,
}

/// Событие: агент получил не-летальный урон
#[derive(Event, Debug, Clone)]
pub struct AgentHit {
    pub agent: Entity,
    pub attacker: Option<Entity>,
    pub damage: f32,
}

/// Событие: агент умер
#[derive(Event, Debug, Clone)]
pub struct AgentDied {
    pub agent: Entity,
    pub killer: Option<Entity>,
}

/// Событие: health replica агента с хоста
#[derive(Event, Debug, Clone)]
pub struct HealthSynced {
    pub agent: Entity,
    pub current: f32,
    pub max: f32,
}

/// Событие: выпал лут (спавн предмета — забота хоста)
#[derive(Event, Debug, Clone)]
pub struct LootDropped {
    pub agent: Entity,
    pub position: Vec3,
}
