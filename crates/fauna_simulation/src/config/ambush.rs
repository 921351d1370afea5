//! AmbushConfig — засадный архетип (жаба с языком)

use serde::{Deserialize, Serialize};

use super::agent::{non_negative, positive};
use super::archetype::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbushConfig {
    /// Время прицеливания до выстрела языком (секунды)
    pub aiming_time: f32,
    /// Скорость кончика языка (m/s)
    pub tongue_speed: f32,
    pub max_tongue_range: f32,
    pub bite_damage: f32,
    /// Скорость подтягивания цели ко рту (m/s)
    pub pull_speed: f32,
    /// Оглушение после попадания в world object
    pub stun_duration: f32,
    pub cooldown_time: f32,
    pub camouflage_fade_time: f32,
}

impl Default for AmbushConfig {
    fn default() -> Self {
        Self {
            aiming_time: 1.5,
            tongue_speed: 20.0,
            max_tongue_range: 15.0,
            bite_damage: 30.0,
            pull_speed: 5.0,
            stun_duration: 3.0,
            cooldown_time: 5.0,
            camouflage_fade_time: 1.5,
        }
    }
}

impl AmbushConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("aiming_time", self.aiming_time)?;
        positive("tongue_speed", self.tongue_speed)?;
        positive("max_tongue_range", self.max_tongue_range)?;
        non_negative("bite_damage", self.bite_damage)?;
        positive("pull_speed", self.pull_speed)?;
        non_negative("stun_duration", self.stun_duration)?;
        non_negative("cooldown_time", self.cooldown_time)?;
        non_negative("camouflage_fade_time", self.camouflage_fade_time)?;
        Ok(())
    }
}
