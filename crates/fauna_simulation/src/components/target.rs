//! Target capability: кого агенты могут выбрать целью

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::physics::LayerMask;

/// Стабильный ID игрока (переживает пересоздание entity, маршрутизация урона)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Reflect)]
pub struct PlayerId(pub u64);

/// Вид цели
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum TargetKind {
    /// Игрок — урон уходит в session handler по `PlayerId`
    Player(PlayerId),
    /// World object (навозный шар, приманка) с collision слоями
    Object { layers: LayerMask },
}

/// Capability component: entity может быть целью сенсора
///
/// `active = false` — временно невидим для сенсоров (спрятался, в меню, телепорт).
/// Агенты сами не Targetable (queries полагаются на это разделение).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Targetable {
    pub kind: TargetKind,
    pub active: bool,
}

impl Targetable {
    pub fn player(id: PlayerId) -> Self {
        Self {
            kind: TargetKind::Player(id),
            active: true,
        }
    }

    pub fn object(layers: LayerMask) -> Self {
        Self {
            kind: TargetKind::Object { layers },
            active: true,
        }
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        match self.kind {
            TargetKind::Player(id) => Some(id),
            TargetKind::Object { .. } => None,
        }
    }

    pub fn is_object_on(&self, mask: LayerMask) -> bool {
        matches!(self.kind, TargetKind::Object { layers } if layers.intersects(mask))
    }
}
