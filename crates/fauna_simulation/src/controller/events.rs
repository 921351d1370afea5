//! Controller events (презентация для хоста)

use bevy::prelude::*;

/// Событие: язык вылетел (хост рисует line renderer)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct TongueFired {
    pub agent: Entity,
    pub from: Vec3,
    pub towards: Vec3,
}

/// Событие: язык убран
#[derive(Event, Debug, Clone, PartialEq)]
pub struct TongueRetracted {
    pub agent: Entity,
}

/// Событие: агент улетел и удалён без смерти (Retreat)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AgentDespawned {
    pub agent: Entity,
}
