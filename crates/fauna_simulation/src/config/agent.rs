//! AgentConfig — параметры вида (общие для всех архетипов)

use serde::{Deserialize, Serialize};

use super::archetype::ConfigError;
use crate::physics::LayerMask;

/// Откуда сенсор берёт кандидатов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TargetSearch {
    /// Игроки из `Session` (основной режим)
    Players,
    /// World objects (`TargetKind::Object`) с пересекающимися слоями
    WorldObjects { layers: LayerMask },
}

impl Default for TargetSearch {
    fn default() -> Self {
        Self::Players
    }
}

/// Параметры полёта (только flyer архетип)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub min_altitude: f32,
    pub max_altitude: f32,
    /// Health порог для отступления после удара (fraction 0..1)
    pub retreat_health_fraction: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            min_altitude: 20.0,
            max_altitude: 40.0,
            retreat_health_fraction: 0.3, // 30% health
        }
    }
}

/// Параметры вида
///
/// Все поля имеют authored defaults (`#[serde(default)]`),
/// JSON запись перекрывает только нужное.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    // Health
    pub max_health: f32,
    /// Flat вычитание из входящего урона
    pub defense: f32,

    // Attack
    pub attack_damage: f32,
    pub attack_range: f32,
    /// Задержка удара от начала атаки (секунды)
    pub attack_delay: f32,
    /// Длительность атаки до возврата в Trace (секунды)
    pub attack_timeout: f32,

    // Perception
    pub fov_range: f32,
    /// Полный угол конуса (градусы)
    pub fov_angle: f32,
    /// Высота глаз над pivot
    pub fov_height: f32,
    pub sound_range: f32,

    // Movement
    pub stopping_distance: f32,
    pub idle_min_time: f32,
    pub idle_max_time: f32,
    pub patrol_min_radius: f32,
    pub patrol_max_radius: f32,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub rotate_speed: f32,

    /// Дружелюбные не атакуют и не преследуют по зрению
    pub friendly: bool,
    pub target_search: TargetSearch,
    pub obstruction_layers: LayerMask,
    pub ground_layers: LayerMask,

    /// Обязателен для flyer архетипа
    pub flight: Option<FlightConfig>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            defense: 0.0,
            attack_damage: 10.0,
            attack_range: 2.0,
            attack_delay: 0.5,
            attack_timeout: 2.0,
            fov_range: 15.0,
            fov_angle: 120.0,
            fov_height: 1.5,
            sound_range: 10.0,
            stopping_distance: 1.5,
            idle_min_time: 2.0,
            idle_max_time: 4.0,
            patrol_min_radius: 5.0,
            patrol_max_radius: 5.0,
            walk_speed: 1.5,
            run_speed: 3.0,
            rotate_speed: 30.0,
            friendly: false,
            target_search: TargetSearch::Players,
            obstruction_layers: LayerMask::ENVIRONMENT,
            ground_layers: LayerMask::ENVIRONMENT,
            flight: None,
        }
    }
}

impl AgentConfig {
    /// Проверяет инварианты (вызывается один раз при загрузке)
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max_health", self.max_health)?;
        non_negative("defense", self.defense)?;
        non_negative("attack_damage", self.attack_damage)?;
        positive("attack_range", self.attack_range)?;
        non_negative("attack_delay", self.attack_delay)?;
        positive("attack_timeout", self.attack_timeout)?;
        positive("fov_range", self.fov_range)?;
        non_negative("sound_range", self.sound_range)?;
        positive("stopping_distance", self.stopping_distance)?;
        positive("walk_speed", self.walk_speed)?;
        positive("run_speed", self.run_speed)?;
        positive("rotate_speed", self.rotate_speed)?;

        if !(self.fov_angle > 0.0 && self.fov_angle <= 360.0) {
            return Err(ConfigError::FovAngle(self.fov_angle));
        }

        ordered("idle_time", self.idle_min_time, self.idle_max_time)?;
        non_negative("idle_min_time", self.idle_min_time)?;
        ordered("patrol_radius", self.patrol_min_radius, self.patrol_max_radius)?;
        non_negative("patrol_min_radius", self.patrol_min_radius)?;

        if let Some(flight) = &self.flight {
            ordered("altitude", flight.min_altitude, flight.max_altitude)?;
            if !(0.0..=1.0).contains(&flight.retreat_health_fraction) {
                return Err(ConfigError::InvalidRange {
                    field: "retreat_health_fraction",
                    min: 0.0,
                    max: flight.retreat_health_fraction,
                });
            }
        }

        Ok(())
    }
}

pub(crate) fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

pub(crate) fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

pub(crate) fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange { field, min, max })
    }
}
