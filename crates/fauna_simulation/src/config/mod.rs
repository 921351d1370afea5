//! Archetype configuration (authoring data)
//!
//! Архитектура:
//! - `AgentConfig` — общие параметры вида (HP, FOV, скорости, таймеры)
//! - `AmbushConfig` — только для засадных (язык, камуфляж)
//! - `AnimationConfig` — имена параметров анимации (хэшируются один раз)
//! - `ArchetypeDefinition` — JSON запись (serde_json), валидируется при загрузке
//!
//! Конфиги immutable и шарятся между экземплярами через `Arc`.
//! Runtime код никогда не проверяет "а есть ли конфиг" — валидация один раз.

pub mod agent;
pub mod ambush;
pub mod animation;
pub mod archetype;


pub use agent::{AgentConfig, FlightConfig, TargetSearch};
pub use ambush::AmbushConfig;
pub use animation::AnimationConfig;
pub use archetype::{ArchetypeDefinition, ArchetypeKind, ArchetypeLibrary, ConfigError};
