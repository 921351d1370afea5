//! AgentContext — всё, что состояние видит и может сделать за тик
//!
//! Архитектура:
//! - Read-only факты: config, sensor report, цель (live позиция), health fraction
//! - Свои компоненты агента: transform, navigator, nav agent, animation driver, RNG
//! - Чужие entity — только через исходящие `AgentCommand` (урон, подтягивание, despawn)
//!
//! Контроллер собирает контекст из ECS queries, тесты — из обычных локальных переменных.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::animation::AnimationDriver;
use crate::components::{TargetKind, Targetable};
use crate::config::{AgentConfig, AmbushConfig};
use crate::health::DamageTarget;
use crate::navigation::{planar_distance, NavAgent, NavigationService, Navigator};
use crate::perception::SensorReport;
use crate::physics::WorldProbe;

/// Высота луча проверки земли для точки патруля
const PATROL_PROBE_HEIGHT: f32 = 5.0;
const PATROL_PROBE_DISTANCE: f32 = 10.0;

/// Исходящая команда (применяется в `AgentSet::Effects`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentCommand {
    /// Урон цели (игрок → session handler, entity → Health)
    DealDamage { target: DamageTarget, amount: f32 },
    /// Подтянуть цель к точке не больше чем на `max_step`
    PullTarget { target: Entity, towards: Vec3, max_step: f32 },
    /// Камуфляж вкл/выкл (плавный fade)
    SetCamouflage(bool),
    /// Презентация: язык вылетел
    FireTongue { from: Vec3, towards: Vec3 },
    /// Презентация: язык убран
    RetractTongue,
    /// Бросок лута (смерть)
    RollLoot,
    /// Выключить коллайдер (смерть)
    DisableCollision,
    /// Удалить агента немедленно (улетел)
    Despawn,
}

/// Цель с live позицией
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub entity: Entity,
    pub position: Vec3,
    pub kind: TargetKind,
}

impl TargetInfo {
    pub fn new(entity: Entity, position: Vec3, targetable: &Targetable) -> Self {
        Self {
            entity,
            position,
            kind: targetable.kind,
        }
    }

    pub fn damage_target(&self) -> DamageTarget {
        match self.kind {
            TargetKind::Player(id) => DamageTarget::Player {
                id,
                entity: self.entity,
            },
            TargetKind::Object { .. } => DamageTarget::Entity(self.entity),
        }
    }
}

/// Темп движения (скорость из config)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    Walk,
    Run,
}

pub struct AgentContext<'a> {
    pub entity: Entity,
    pub config: &'a AgentConfig,
    pub ambush: Option<&'a AmbushConfig>,
    pub sensor: SensorReport,
    pub target: Option<TargetInfo>,
    pub health_fraction: f32,
    pub delta: f32,
    pub transform: &'a mut Transform,
    pub navigator: &'a mut Navigator,
    pub nav_agent: Option<&'a mut NavAgent>,
    pub animation: Option<&'a mut AnimationDriver>,
    pub rng: &'a mut ChaCha8Rng,
    pub probe: &'a dyn WorldProbe,
    pub commands: &'a mut Vec<AgentCommand>,
}

impl AgentContext<'_> {
    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    pub fn forward(&self) -> Vec3 {
        *self.transform.forward()
    }

    /// Враждебный и видит цель
    pub fn sight_alert(&self) -> bool {
        !self.config.friendly && self.sensor.in_sight
    }

    /// Planar distance до live цели (∞ без цели)
    pub fn distance_to_target(&self) -> f32 {
        self.target
            .map_or(f32::INFINITY, |target| planar_distance(self.position(), target.position))
    }

    /// Куда преследовать: live позиция если цель обнаружена сейчас, иначе last known
    pub fn pursuit_point(&self) -> Option<Vec3> {
        self.sensor.target?;
        match self.target {
            Some(target) if self.sensor.acquired => Some(target.position),
            _ => Some(self.sensor.last_known_position),
        }
    }

    pub fn speed_for(&self, pace: Pace) -> f32 {
        match pace {
            Pace::Walk => self.config.walk_speed,
            Pace::Run => self.config.run_speed,
        }
    }

    pub fn move_to(&mut self, destination: Vec3, pace: Pace) {
        let speed = self.speed_for(pace);
        self.navigator
            .move_to(self.nav_agent.as_deref_mut(), destination, speed);
    }

    pub fn stop_moving(&mut self) {
        self.navigator
            .stop(self.nav_agent.as_deref_mut(), self.transform.translation);
    }

    pub fn arrived_at_destination(&self) -> bool {
        self.navigator
            .has_arrived(self.nav_agent.as_deref(), self.transform.translation)
    }

    /// Остановиться и развернуться к точке (yaw)
    pub fn look_at(&mut self, point: Vec3) {
        self.navigator.turn_towards(
            self.nav_agent.as_deref_mut(),
            self.transform,
            point,
            self.config.rotate_speed,
            self.delta,
        );
    }

    pub fn slow_down(&mut self, multiplier: f32) {
        self.navigator.slow_down(multiplier);
        if let Some(agent) = self.nav_agent.as_deref_mut() {
            let reduced = self.config.run_speed * multiplier;
            agent.set_speed(agent.speed().min(reduced));
        }
    }

    pub fn restore_speed(&mut self) {
        self.navigator.restore_speed();
    }

    pub fn disable_navigation(&mut self) {
        self.navigator.disable(self.nav_agent.as_deref_mut());
    }

    /// Uniform в [min, max] (min == max → min)
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..=max)
        } else {
            min
        }
    }

    /// Случайная точка патруля в кольце [patrol_min, patrol_max]
    ///
    /// Высота — по лучу вниз; земли нет → высота агента.
    pub fn patrol_destination(&mut self) -> Vec3 {
        let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
        let radius = self.random_range(self.config.patrol_min_radius, self.config.patrol_max_radius);
        let position = self.position();
        let candidate = position + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);

        self.probe
            .probe_ground(
                candidate + Vec3::Y * PATROL_PROBE_HEIGHT,
                PATROL_PROBE_DISTANCE,
                self.config.ground_layers,
            )
            .unwrap_or(candidate)
    }

    /// Урон цели если она в attack range. true если запрос ушёл.
    pub fn apply_damage_to_target(&mut self, amount: f32) -> bool {
        let Some(target) = self.target else {
            return false;
        };

        if self.distance_to_target() > self.config.attack_range {
            return false;
        }

        self.deal_damage(target, amount);
        true
    }

    /// Урон без проверки дистанции (укус уже подтянутой цели)
    pub fn deal_damage(&mut self, target: TargetInfo, amount: f32) {
        self.commands.push(AgentCommand::DealDamage {
            target: target.damage_target(),
            amount,
        });
    }

    pub fn push(&mut self, command: AgentCommand) {
        self.commands.push(command);
    }

    /// Команды аниматору (нет драйвера → ничего)
    pub fn animate(&mut self, f: impl FnOnce(&mut AnimationDriver)) {
        if let Some(driver) = self.animation.as_deref_mut() {
            f(driver);
        }
    }
}
