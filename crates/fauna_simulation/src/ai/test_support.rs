//! Harness для unit тестов состояний: AgentContext из локальных значений

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::context::{AgentCommand, AgentContext, TargetInfo};
use super::machine::{AgentError, StateMachine};
use super::state::BehaviorState;
use crate::animation::{AnimCommand, AnimHash, AnimationDriver};
use crate::components::{PlayerId, Targetable};
use crate::config::{AgentConfig, AmbushConfig, AnimationConfig, FlightConfig};
use crate::navigation::{NavAgent, Navigator};
use crate::perception::SensorReport;
use crate::physics::HeadlessGeometry;

pub const DT: f32 = 1.0 / 60.0;

pub struct Harness {
    pub entity: Entity,
    pub config: AgentConfig,
    pub ambush: Option<AmbushConfig>,
    pub sensor: SensorReport,
    pub target: Option<TargetInfo>,
    pub health_fraction: f32,
    pub delta: f32,
    pub transform: Transform,
    pub navigator: Navigator,
    pub nav_agent: Option<NavAgent>,
    pub animation: AnimationDriver,
    pub rng: ChaCha8Rng,
    pub geometry: HeadlessGeometry,
    pub commands: Vec<AgentCommand>,
}

impl Harness {
    /// Наземный агент в начале координат, смотрит в +Z, с NavAgent на плоской земле
    pub fn ground() -> Self {
        let config = AgentConfig::default();
        let transform = Transform::from_xyz(0.0, 0.0, 0.0).looking_to(Vec3::Z, Vec3::Y);

        Self {
            entity: Entity::from_raw(1),
            navigator: Navigator::new(transform.translation, config.stopping_distance, config.ground_layers),
            nav_agent: Some(NavAgent::new(transform.translation, config.stopping_distance)),
            animation: AnimationDriver::new(&AnimationConfig::default()),
            ambush: None,
            sensor: SensorReport::default(),
            target: None,
            health_fraction: 1.0,
            delta: DT,
            transform,
            rng: ChaCha8Rng::seed_from_u64(7),
            geometry: HeadlessGeometry::flat_ground(0.0),
            commands: Vec::new(),
            config,
        }
    }

    /// Летун на высоте 30, без NavAgent
    pub fn flyer() -> Self {
        let mut harness = Self::ground();
        harness.config.flight = Some(FlightConfig::default());
        harness.nav_agent = None;
        harness.transform.translation = Vec3::new(0.0, 30.0, 0.0);
        harness.navigator = Navigator::new(
            harness.transform.translation,
            harness.config.stopping_distance,
            harness.config.ground_layers,
        );
        harness
    }

    /// Жаба без NavAgent
    pub fn ambush() -> Self {
        let mut harness = Self::ground();
        harness.ambush = Some(AmbushConfig::default());
        harness.nav_agent = None;
        harness
    }

    pub fn ctx(&mut self) -> AgentContext<'_> {
        AgentContext {
            entity: self.entity,
            config: &self.config,
            ambush: self.ambush.as_ref(),
            sensor: self.sensor,
            target: self.target,
            health_fraction: self.health_fraction,
            delta: self.delta,
            transform: &mut self.transform,
            navigator: &mut self.navigator,
            nav_agent: self.nav_agent.as_mut(),
            animation: Some(&mut self.animation),
            rng: &mut self.rng,
            probe: &self.geometry,
            commands: &mut self.commands,
        }
    }

    /// Игрок виден в `position`
    pub fn see_player(&mut self, position: Vec3) {
        self.set_player(position, true, false);
    }

    /// Игрок только слышен
    pub fn hear_player(&mut self, position: Vec3) {
        self.set_player(position, false, true);
    }

    fn set_player(&mut self, position: Vec3, in_sight: bool, heard: bool) {
        let entity = Entity::from_raw(100);
        self.target = Some(TargetInfo::new(entity, position, &Targetable::player(PlayerId(1))));
        self.sensor = SensorReport {
            target: Some(entity),
            last_known_position: position,
            in_sight,
            heard,
            any_near: true,
            acquired: true,
        };
    }

    /// Цель пропала совсем (память истекла)
    pub fn lose_target(&mut self) {
        self.target = None;
        self.sensor = SensorReport {
            any_near: self.sensor.any_near,
            ..SensorReport::default()
        };
    }

    pub fn start<S: BehaviorState>(&mut self, start: S) -> StateMachine<S> {
        let mut machine = StateMachine::new();
        let mut ctx = self.ctx();
        machine
            .initialize(start, &mut ctx)
            .expect("fresh machine initializes");
        machine
    }

    /// Один тик: решение состояния + исполнение движения (как Decision → Locomotion)
    pub fn tick<S: BehaviorState>(&mut self, machine: &mut StateMachine<S>) -> Result<bool, AgentError> {
        let changed = {
            let mut ctx = self.ctx();
            machine.step(&mut ctx)?
        };
        self.navigator
            .tick(self.nav_agent.as_mut(), &mut self.transform, &self.geometry, self.delta);
        Ok(changed)
    }

    /// Тики пока `predicate` не станет true; количество тиков или None
    pub fn run_until<S: BehaviorState>(
        &mut self,
        machine: &mut StateMachine<S>,
        max_ticks: usize,
        predicate: impl Fn(&S) -> bool,
    ) -> Option<usize> {
        for tick in 1..=max_ticks {
            self.tick(machine).expect("tick succeeds");
            if machine.current().is_some_and(&predicate) {
                return Some(tick);
            }
        }
        None
    }

    pub fn triggered(&self, key: AnimHash) -> bool {
        self.animation
            .pending()
            .iter()
            .any(|command| matches!(command, AnimCommand::SetTrigger(k) if *k == key))
    }

    pub fn bool_value(&self, key: AnimHash) -> Option<bool> {
        self.animation.pending().iter().rev().find_map(|command| match command {
            AnimCommand::SetBool(k, value) if *k == key => Some(*value),
            _ => None,
        })
    }

    pub fn damage_dealt(&self) -> f32 {
        self.commands
            .iter()
            .filter_map(|command| match command {
                AgentCommand::DealDamage { amount, .. } => Some(*amount),
                _ => None,
            })
            .sum()
    }
}
