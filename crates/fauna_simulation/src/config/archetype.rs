//! ArchetypeDefinition — JSON запись вида + загрузка/валидация

use std::collections::BTreeMap;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{AgentConfig, AmbushConfig, AnimationConfig};
use crate::perception::SensorSettings;

/// Набор состояний, которым управляется вид
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeKind {
    /// Наземный (Idle/Patrol/Trace/Attack)
    Ground,
    /// Летающий (Stalk/Dive/Ascend)
    Flyer,
    /// Засадный (Camouflage/Aim/Snap/Pull)
    Ambush,
}

/// Ошибки загрузки конфигурации
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse archetype JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("`{field}` must be non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("invalid `{field}` range: {min} > {max}")]
    InvalidRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("`fov_angle` must be in (0, 360], got {0}")]
    FovAngle(f32),

    #[error("archetype `{archetype}` ({kind:?}) requires the `{section}` section")]
    MissingSection {
        archetype: String,
        kind: ArchetypeKind,
        section: &'static str,
    },

    #[error("archetype `{0}` defined twice")]
    Duplicate(String),
}

/// Полное описание вида (authoring data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeDefinition {
    pub name: String,
    pub kind: ArchetypeKind,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub sensor: SensorSettings,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub ambush: Option<AmbushConfig>,
}

impl ArchetypeDefinition {
    /// Definition с дефолтами для вида (удобно в тестах и demo)
    pub fn new(name: impl Into<String>, kind: ArchetypeKind) -> Self {
        let mut agent = AgentConfig::default();
        let mut ambush = None;

        match kind {
            ArchetypeKind::Ground => {}
            ArchetypeKind::Flyer => agent.flight = Some(Default::default()),
            ArchetypeKind::Ambush => ambush = Some(AmbushConfig::default()),
        }

        Self {
            name: name.into(),
            kind,
            agent,
            sensor: SensorSettings::default(),
            animation: AnimationConfig::default(),
            ambush,
        }
    }

    /// Парсит одну запись и валидирует её
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let definition: Self = serde_json::from_str(json)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.agent.validate()?;
        self.sensor.validate()?;

        match self.kind {
            ArchetypeKind::Ground => {}
            ArchetypeKind::Flyer => {
                if self.agent.flight.is_none() {
                    return Err(self.missing("agent.flight"));
                }
            }
            ArchetypeKind::Ambush => match &self.ambush {
                Some(ambush) => ambush.validate()?,
                None => return Err(self.missing("ambush")),
            },
        }

        Ok(())
    }

    fn missing(&self, section: &'static str) -> ConfigError {
        ConfigError::MissingSection {
            archetype: self.name.clone(),
            kind: self.kind,
            section,
        }
    }
}

/// Resource: все загруженные виды по имени
///
/// BTreeMap — детерминированный порядок итерации.
#[derive(Resource, Debug, Clone, Default)]
pub struct ArchetypeLibrary {
    archetypes: BTreeMap<String, Arc<ArchetypeDefinition>>,
}

impl ArchetypeLibrary {
    /// Парсит JSON массив записей (каждая валидируется)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let definitions: Vec<ArchetypeDefinition> = serde_json::from_str(json)?;
        let mut library = Self::default();
        for definition in definitions {
            library.insert(definition)?;
        }
        Ok(library)
    }

    pub fn insert(&mut self, definition: ArchetypeDefinition) -> Result<Arc<ArchetypeDefinition>, ConfigError> {
        definition.validate()?;
        if self.archetypes.contains_key(&definition.name) {
            return Err(ConfigError::Duplicate(definition.name));
        }

        let shared = Arc::new(definition);
        self.archetypes.insert(shared.name.clone(), shared.clone());
        Ok(shared)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ArchetypeDefinition>> {
        self.archetypes.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}
