//! Collision Layers Constants
//!
//! Centralised битовые маски для всех raycast запросов агентов.
//!
//! ## Слои (1-32):
//! - Layer 1 (0b1 = 1): Reserved
//! - Layer 2 (0b10 = 2): Actors (игроки, агенты)
//! - Layer 3 (0b100 = 4): Environment (стены, скалы, terrain)
//! - Layer 4 (0b1000 = 8): Props (world objects — навозный шар и т.п.)
//!
//! Obstruction mask для LOS по умолчанию = Environment,
//! ground mask = Environment.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Битовая маска слоёв (совместима с rapier `Group` bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Reflect)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// Layer 2: Actors
    pub const ACTORS: LayerMask = LayerMask(0b10);

    /// Layer 3: Environment
    pub const ENVIRONMENT: LayerMask = LayerMask(0b100);

    /// Layer 4: Props (world objects)
    pub const PROPS: LayerMask = LayerMask(0b1000);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        LayerMask(self.0 | rhs.0)
    }
}
