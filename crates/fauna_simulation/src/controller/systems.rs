//! Controller systems: state machine тик, реакции на урон, исходящие команды

use std::collections::BTreeMap;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::events::{AgentDespawned, TongueFired, TongueRetracted};
use crate::ai::helpers::move_towards;
use crate::ai::{AgentCommand, AgentContext, BehaviorState, Camouflage, StateMachine, TargetInfo};
use crate::animation::AnimationDriver;
use crate::components::{AgentCommands, AgentRng, Archetype, Authority, Targetable};
use crate::health::{
    loot_position, roll_loot, AgentDied, AgentHit, DamageRequested, DamageTarget, Dead, DespawnAfter, Health,
    LootDropped, DESPAWN_DELAY,
};
use crate::navigation::{NavAgent, Navigator};
use crate::perception::PerceptionSensor;
use crate::physics::{HeadlessGeometry, WorldRays};

/// Что случилось с агентом на Damage шаге этого тика
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reaction {
    Hit,
    Died,
}

/// Смерть перекрывает удар того же тика
fn collect_reactions(hits: &mut EventReader<AgentHit>, deaths: &mut EventReader<AgentDied>) -> BTreeMap<Entity, Reaction> {
    let mut reactions = BTreeMap::new();

    for hit in hits.read() {
        reactions.entry(hit.agent).or_insert(Reaction::Hit);
    }
    for death in deaths.read() {
        reactions.insert(death.agent, Reaction::Died);
    }

    reactions
}

type AgentData<S> = (
    Entity,
    &'static Archetype,
    &'static Authority,
    &'static PerceptionSensor,
    Option<&'static Health>,
    &'static mut Transform,
    &'static mut Navigator,
    Option<&'static mut NavAgent>,
    Option<&'static mut AnimationDriver>,
    &'static mut AgentRng,
    &'static mut AgentCommands,
    &'static mut StateMachine<S>,
);

/// Система: тик машины состояний архетипа `S`
///
/// Порядок для каждого агента:
/// 1. Ленивая инициализация (`S::initial()`) — Enter нужен контекст
/// 2. Смерть → Die (+ Dead, DespawnAfter), в том числе у replica
/// 3. Удар → Hit (повторный удар во время Hit игнорируется)
/// 4. Иначе update текущего состояния
///
/// Ошибка состояния логируется и откатывает агента в fallback состояние.
/// Другие агенты не затрагиваются.
pub fn update_agents<S: BehaviorState>(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    rapier: ReadRapierContext,
    headless: Option<Res<HeadlessGeometry>>,
    mut hits: EventReader<AgentHit>,
    mut deaths: EventReader<AgentDied>,
    mut agents: Query<AgentData<S>, Without<Dead>>,
    targets: Query<(&Transform, &Targetable), Without<PerceptionSensor>>,
) {
    let delta = time.timestep().as_secs_f32();
    let context = rapier.single().ok();
    let rays = WorldRays::select(context.as_ref(), headless.as_deref());
    let reactions = collect_reactions(&mut hits, &mut deaths);

    for (
        entity,
        archetype,
        authority,
        sensor,
        health,
        mut transform,
        mut navigator,
        mut nav_agent,
        mut animation,
        mut rng,
        mut queue,
        mut machine,
    ) in agents.iter_mut()
    {
        let reaction = reactions.get(&entity).copied();

        // Replica не думает, но смерть с хоста проигрывает
        if !authority.is_host() && reaction != Some(Reaction::Died) {
            continue;
        }

        let definition = archetype.definition();
        let report = sensor.report();
        let target = report.target.and_then(|target| {
            targets
                .get(target)
                .ok()
                .map(|(transform, targetable)| TargetInfo::new(target, transform.translation, targetable))
        });

        let mut ctx = AgentContext {
            entity,
            config: &definition.agent,
            ambush: definition.ambush.as_ref(),
            sensor: report,
            target,
            health_fraction: health.map_or(1.0, Health::fraction),
            delta,
            transform: &mut *transform,
            navigator: &mut *navigator,
            nav_agent: nav_agent.as_deref_mut(),
            animation: animation.as_deref_mut(),
            rng: &mut rng.0,
            probe: &rays,
            commands: &mut queue.0,
        };

        if !machine.is_initialized() {
            if let Err(error) = machine.initialize(S::initial(), &mut ctx) {
                crate::logger::log_error(&format!("❌ {:?}: {}", entity, error));
                continue;
            }
        }

        match reaction {
            Some(Reaction::Died) => {
                if let Err(error) = machine.change_state(S::die(), &mut ctx) {
                    crate::logger::log_warning(&format!("⚠️ {:?}: death transition rejected: {}", entity, error));
                }
                commands
                    .entity(entity)
                    .try_insert((Dead, DespawnAfter::new(DESPAWN_DELAY)));
                continue;
            }
            Some(Reaction::Hit) => {
                let stunned = machine
                    .current()
                    .is_some_and(|state| state.is_hit() || state.is_terminal());

                if !stunned {
                    match machine.change_state(S::hit(), &mut ctx) {
                        Ok(()) => continue,
                        Err(error) => {
                            crate::logger::log_warning(&format!("⚠️ {:?}: hit transition rejected: {}", entity, error));
                        }
                    }
                }
            }
            None => {}
        }

        if let Err(error) = machine.step(&mut ctx) {
            crate::logger::log_error(&format!("❌ {:?}: {}", entity, error));
            machine.recover(&mut ctx);
        }
    }
}

/// Система: исполнение исходящих команд агентов
///
/// Агенты обрабатываются в порядке Entity (детерминизм), команды — в порядке постановки.
#[allow(clippy::too_many_arguments)]
pub fn apply_agent_commands(
    mut commands: Commands,
    rapier: ReadRapierContext,
    headless: Option<Res<HeadlessGeometry>>,
    mut damage: EventWriter<DamageRequested>,
    mut loot: EventWriter<LootDropped>,
    mut tongue_fired: EventWriter<TongueFired>,
    mut tongue_retracted: EventWriter<TongueRetracted>,
    mut despawned: EventWriter<AgentDespawned>,
    mut agents: Query<(
        Entity,
        &Transform,
        &Archetype,
        &mut AgentCommands,
        &mut AgentRng,
        Option<&mut Camouflage>,
    )>,
    mut pulled: Query<&mut Transform, Without<AgentCommands>>,
) {
    let context = rapier.single().ok();
    let rays = WorldRays::select(context.as_ref(), headless.as_deref());

    let mut pending: Vec<(Entity, Vec<AgentCommand>)> = agents
        .iter_mut()
        .filter(|(_, _, _, queue, _, _)| !queue.0.is_empty())
        .map(|(entity, _, _, mut queue, _, _)| (entity, std::mem::take(&mut queue.0)))
        .collect();
    pending.sort_by_key(|(entity, _)| *entity);

    for (agent, queue) in pending {
        let Ok((_, transform, archetype, _, mut rng, mut camouflage)) = agents.get_mut(agent) else {
            continue;
        };

        for command in queue {
            match command {
                AgentCommand::DealDamage { target, amount } => {
                    if let DamageTarget::Player { id, .. } = target {
                        crate::logger::log(&format!("🗡️ {:?} → player {:?}: {:.1}", agent, id, amount));
                    }
                    damage.write(DamageRequested {
                        target,
                        attacker: Some(agent),
                        amount,
                    });
                }
                AgentCommand::PullTarget {
                    target,
                    towards,
                    max_step,
                } => {
                    if let Ok(mut target_transform) = pulled.get_mut(target) {
                        target_transform.translation = move_towards(target_transform.translation, towards, max_step);
                    }
                }
                AgentCommand::SetCamouflage(active) => {
                    if let Some(camouflage) = camouflage.as_deref_mut() {
                        camouflage.set(active);
                    }
                }
                AgentCommand::FireTongue { from, towards } => {
                    tongue_fired.write(TongueFired { agent, from, towards });
                }
                AgentCommand::RetractTongue => {
                    tongue_retracted.write(TongueRetracted { agent });
                }
                AgentCommand::RollLoot => {
                    if roll_loot(&mut rng.0) {
                        let ground_layers = archetype.definition().agent.ground_layers;
                        let position = loot_position(transform.translation, &mut rng.0, &rays, ground_layers);
                        crate::logger::log(&format!("🎁 {:?} dropped loot at {:?}", agent, position));
                        loot.write(LootDropped { agent, position });
                    }
                }
                AgentCommand::DisableCollision => {
                    commands.entity(agent).try_insert(ColliderDisabled);
                }
                AgentCommand::Despawn => {
                    crate::logger::log(&format!("🕊️ {:?} left the area, despawning", agent));
                    despawned.write(AgentDespawned { agent });
                    commands.entity(agent).try_despawn();
                }
            }
        }
    }
}

/// Система: шаг fade камуфляжа → float параметр шейдера/аниматора
pub fn fade_camouflage(
    time: Res<Time<Fixed>>,
    mut agents: Query<(&mut Camouflage, Option<&mut AnimationDriver>)>,
) {
    let delta = time.timestep().as_secs_f32();

    for (mut camouflage, driver) in agents.iter_mut() {
        let Some(alpha) = camouflage.tick(delta) else {
            continue;
        };

        if let Some(mut driver) = driver {
            let key = driver.keys.camouflage;
            driver.set_float(key, alpha);
        }
    }
}
