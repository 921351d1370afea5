//! Health module
//!
//! Архитектура:
//! - `Health` компонент (HP, flat defense, hit counter)
//! - `DamageRequested` — единственный вход урона (от агентов, игроков, хоста)
//! - `AgentHit` / `AgentDied` — уведомления для контроллера и сенсора
//! - `Dead` + `DespawnAfter` — маркеры смерти и отложенной уборки
//! - Loot roll при смерти (`loot.rs`)
//!
//! Урон игрокам не применяется здесь: `DamageTarget::Player` уходит в
//! authoritative session handler хоста по стабильному `PlayerId`.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod loot;
pub mod systems;


pub use components::{DamageOutcome, Dead, DespawnAfter, Health, DESPAWN_DELAY};
pub use events::{AgentDied, AgentHit, DamageRequested, DamageTarget, HealthSynced, LootDropped};
pub use loot::{loot_position, roll_loot, LOOT_DROP_RATE};

use crate::AgentSet;

/// Health Plugin
///
/// Регистрирует события и системы:
/// 1. apply_agent_damage (Damage set) — DamageRequested → Health → AgentHit/AgentDied
/// 2. apply_health_sync (Damage set) — replica health с хоста
/// 3. decay_hit_counters (Damage set)
/// 4. despawn_after_timeout (Cleanup set)
pub struct HealthPlugin;

impl Plugin for HealthPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageRequested>()
            .add_event::<AgentHit>()
            .add_event::<AgentDied>()
            .add_event::<HealthSynced>()
            .add_event::<LootDropped>()
            .add_systems(
                FixedUpdate,
                (
                    systems::apply_agent_damage,
                    systems::apply_health_sync,
                    systems::decay_hit_counters,
                )
                    .chain()
                    .in_set(AgentSet::Damage),
            )
            .add_systems(
                FixedUpdate,
                systems::despawn_after_timeout.in_set(AgentSet::Cleanup),
            );
    }
}
