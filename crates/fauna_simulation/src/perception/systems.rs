//! Perception systems: сбор кандидатов из ECS → PerceptionSensor

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::sensor::{Candidate, PerceptionSensor, SensorPose};
use crate::components::{Archetype, Authority, TargetKind, Targetable};
use crate::config::TargetSearch;
use crate::health::{AgentHit, Dead};
use crate::navigation::{NavAgent, Navigator};
use crate::physics::{HeadlessGeometry, WorldRays};
use crate::session::Session;

/// Система: память сенсора тикает каждый fixed тик (refresh — реже)
pub fn tick_sensor_memory(time: Res<Time<Fixed>>, mut sensors: Query<&mut PerceptionSensor, Without<Dead>>) {
    let delta = time.timestep().as_secs_f32();

    for mut sensor in sensors.iter_mut() {
        sensor.tick_memory(delta);
    }
}

/// Система: throttled refresh сенсоров + LOD переключение навигации
///
/// Кандидаты:
/// - `TargetSearch::Players` — игроки из `Session` (порядок PlayerId)
/// - `TargetSearch::WorldObjects` — Targetable объекты на слоях маски (порядок Entity)
///
/// Мёртвые агенты очищают цель. Replica агенты не думают.
pub fn refresh_sensors(
    time: Res<Time<Fixed>>,
    rapier: ReadRapierContext,
    headless: Option<Res<HeadlessGeometry>>,
    session: Option<Res<Session>>,
    mut degraded_warned: Local<bool>,
    mut agents: Query<(
        Entity,
        &Transform,
        &Archetype,
        &Authority,
        &mut PerceptionSensor,
        &mut Navigator,
        Option<&mut NavAgent>,
        Has<Dead>,
    )>,
    targets: Query<(Entity, &Transform, &Targetable), Without<PerceptionSensor>>,
) {
    let delta = time.timestep().as_secs_f32();
    let context = rapier.single().ok();
    let rays = WorldRays::select(context.as_ref(), headless.as_deref());

    if rays.is_degraded() && !*degraded_warned {
        *degraded_warned = true;
        crate::logger::log_warning("⚠️ Perception: no physics context, line of sight is never obstructed");
    }

    let players: Vec<Candidate> = session
        .as_deref()
        .map(|session| {
            session
                .players()
                .filter_map(|(id, entity)| {
                    let (_, transform, targetable) = targets.get(entity).ok()?;
                    (targetable.kind == TargetKind::Player(id)).then_some(Candidate {
                        entity,
                        position: transform.translation,
                        active: targetable.active,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let mut objects: Vec<(Candidate, Targetable)> = targets
        .iter()
        .filter(|(_, _, targetable)| matches!(targetable.kind, TargetKind::Object { .. }))
        .map(|(entity, transform, targetable)| {
            let candidate = Candidate {
                entity,
                position: transform.translation,
                active: targetable.active,
            };
            (candidate, *targetable)
        })
        .collect();
    objects.sort_by_key(|(candidate, _)| candidate.entity);

    for (entity, transform, archetype, authority, mut sensor, mut navigator, mut nav_agent, dead) in
        agents.iter_mut()
    {
        if !authority.is_host() {
            continue;
        }

        if dead {
            if sensor.report().has_target() {
                sensor.clear();
            }
            continue;
        }

        if !sensor.is_due(delta) {
            continue;
        }

        let config = &archetype.definition().agent;
        let pose = SensorPose::from_transform(transform);
        let before = sensor.report();

        let report = match config.target_search {
            TargetSearch::Players => sensor.refresh(config, pose, players.iter().copied(), &rays),
            TargetSearch::WorldObjects { layers } => sensor.refresh(
                config,
                pose,
                objects
                    .iter()
                    .filter(|(_, targetable)| targetable.is_object_on(layers))
                    .map(|(candidate, _)| *candidate),
                &rays,
            ),
        };

        if report.target != before.target {
            match report.target {
                Some(target) => crate::logger::log(&format!("👁️ {:?} acquired {:?}", entity, target)),
                None => crate::logger::log(&format!("👁️ {:?} lost target", entity)),
            }
        }

        // LOD: навигационный агент включён только когда кто-то рядом
        navigator.set_active(nav_agent.as_deref_mut(), report.any_near, transform.translation);
    }
}

/// Система: "меня ударил X" → forced detection атакующего
pub fn force_detection_on_hit(
    mut hits: EventReader<AgentHit>,
    mut agents: Query<(&Transform, &Archetype, &mut PerceptionSensor), Without<Dead>>,
    targets: Query<(&Transform, &Targetable), Without<PerceptionSensor>>,
) {
    for hit in hits.read() {
        let Some(attacker) = hit.attacker else {
            continue;
        };

        let Ok((transform, archetype, mut sensor)) = agents.get_mut(hit.agent) else {
            continue;
        };

        // Атакующий без Targetable (другой агент, ловушка) — не цель
        let Ok((attacker_transform, targetable)) = targets.get(attacker) else {
            continue;
        };

        let candidate = Candidate {
            entity: attacker,
            position: attacker_transform.translation,
            active: targetable.active,
        };

        let config = &archetype.definition().agent;
        if sensor.force_detection(config, SensorPose::from_transform(transform), candidate) {
            crate::logger::log(&format!("👁️ {:?} forced to notice attacker {:?}", hit.agent, attacker));
        }
    }
}
