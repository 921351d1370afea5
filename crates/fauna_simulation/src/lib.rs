//! FAUNA Simulation Core
//!
//! ECS-симуляция поведения фауны на Bevy 0.16 (strategic layer, headless).
//! Каждый fixed тик решает, что делает каждый не-игровой агент и почему:
//! сенсор (FOV / LOS / звук / память) → машина состояний архетипа → навигация.
//!
//! Хост (движок) владеет рендером, проигрыванием анимаций и navmesh;
//! симуляция отдаёт ему события и очереди команд.

use bevy::ecs::event::Events;
use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod animation;
pub mod components;
pub mod config;
pub mod controller;
pub mod health;
pub mod logger;
pub mod navigation;
pub mod perception;
pub mod physics;
pub mod session;
pub mod snapshot;

// Re-export базовых типов для удобства
pub use ai::{AgentCommand, AgentContext, AmbushState, BehaviorState, FlyerState, GroundState, StateMachine};
pub use components::*;
pub use config::{ArchetypeDefinition, ArchetypeKind, ArchetypeLibrary, ConfigError};
pub use controller::{spawn_agent, AgentPlugin};
pub use health::{AgentDied, AgentHit, DamageRequested, DamageTarget, Dead, DespawnAfter, Health, HealthPlugin};
pub use navigation::NavigationPlugin;
pub use perception::PerceptionPlugin;
pub use session::{PlayerDamaged, Session, SessionPlugin};
pub use snapshot::AgentSnapshot;

/// Порядок систем внутри fixed тика (логика до движения)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentSet {
    /// Урон → Health → AgentHit / AgentDied, маршрутизация урона игрокам
    Damage,
    /// Сенсоры + LOD
    Perception,
    /// Машины состояний (реакции на урон + update)
    Decision,
    /// Исполнение движения навигатором
    Locomotion,
    /// Исходящие команды агентов (урон, язык, лут, despawn)
    Effects,
    /// Отложенный despawn
    Cleanup,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Seed мог поставить хост до плагина
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<ArchetypeLibrary>()
            .configure_sets(
                FixedUpdate,
                (
                    AgentSet::Damage,
                    AgentSet::Perception,
                    AgentSet::Decision,
                    AgentSet::Locomotion,
                    AgentSet::Effects,
                    AgentSet::Cleanup,
                )
                    .chain(),
            )
            .add_plugins((SessionPlugin, HealthPlugin, PerceptionPlugin, NavigationPlugin, AgentPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Выдаёт seed'ы per-agent RNG в порядке спавна.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }
}

/// Создаёт Bevy App для headless симуляции (MinimalPlugins + SimulationPlugin)
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin);

    app
}

/// Прогоняет `ticks` fixed тиков напрямую (без wall clock)
///
/// Тесты и replay: результат не зависит от реального времени кадра.
/// После каждого тика буферы событий симуляции сдвигаются, как это делает `First` у `App::update`:
/// событие живёт два тика, потом отбрасывается.
pub fn run_fixed_ticks(app: &mut App, ticks: usize) {
    let world = app.world_mut();
    for _ in 0..ticks {
        world.run_schedule(FixedUpdate);
        update_simulation_events(world);
    }
}

fn update_simulation_events(world: &mut World) {
    update_events::<DamageRequested>(world);
    update_events::<AgentHit>(world);
    update_events::<AgentDied>(world);
    update_events::<health::HealthSynced>(world);
    update_events::<health::LootDropped>(world);
    update_events::<PlayerDamaged>(world);
    update_events::<controller::TongueFired>(world);
    update_events::<controller::TongueRetracted>(world);
    update_events::<controller::AgentDespawned>(world);
}

fn update_events<E: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.update();
    }
}
