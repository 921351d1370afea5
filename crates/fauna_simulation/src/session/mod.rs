//! Session — injected target provider
//!
//! Хост регистрирует игроков (stable `PlayerId` → entity).
//! Сенсоры в режиме `TargetSearch::Players` берут кандидатов отсюда,
//! урон игрокам (`DamageTarget::Player`) маршрутизируется по тому же ID.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::components::PlayerId;
use crate::health::{DamageRequested, DamageTarget};
use crate::AgentSet;

/// Событие: урон игроку (authoritative handler хоста применяет его к своему HP)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlayerDamaged {
    pub player: PlayerId,
    pub entity: Entity,
    pub attacker: Option<Entity>,
    pub amount: f32,
}

/// Session Plugin: resource + маршрутизация урона игрокам
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Session>()
            .add_event::<PlayerDamaged>()
            .add_systems(FixedUpdate, route_player_damage.in_set(AgentSet::Damage));
    }
}

/// Система: `DamageTarget::Player` → `PlayerDamaged` по стабильному PlayerId
///
/// Entity берётся из сессии (игрок мог пересоздаться после запроса).
/// Игрок не в сессии → урон отбрасывается.
pub fn route_player_damage(
    session: Res<Session>,
    mut requests: EventReader<DamageRequested>,
    mut damaged: EventWriter<PlayerDamaged>,
) {
    for request in requests.read() {
        let DamageTarget::Player { id, .. } = request.target else {
            continue;
        };

        let Some(entity) = session.player_entity(id) else {
            crate::logger::log_warning(&format!("⚠️ Damage to unknown player {:?} dropped", id));
            continue;
        };

        damaged.write(PlayerDamaged {
            player: id,
            entity,
            attacker: request.attacker,
            amount: request.amount,
        });
    }
}

/// Resource: игроки текущей сессии
///
/// BTreeMap — детерминированный порядок (tie-break сенсора = порядок PlayerId).
#[derive(Resource, Debug, Clone, Default)]
pub struct Session {
    players: BTreeMap<PlayerId, Entity>,
}

impl Session {
    pub fn register_player(&mut self, id: PlayerId, entity: Entity) {
        if let Some(previous) = self.players.insert(id, entity) {
            if previous != entity {
                crate::logger::log(&format!(
                    "Session: player {:?} re-bound {:?} → {:?}",
                    id, previous, entity
                ));
            }
        }
    }

    pub fn unregister_player(&mut self, id: PlayerId) -> Option<Entity> {
        self.players.remove(&id)
    }

    pub fn player_entity(&self, id: PlayerId) -> Option<Entity> {
        self.players.get(&id).copied()
    }

    pub fn players(&self) -> impl Iterator<Item = (PlayerId, Entity)> + '_ {
        self.players.iter().map(|(id, entity)| (*id, *entity))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
