//! Health systems

use bevy::prelude::*;

use super::{AgentDied, AgentHit, DamageOutcome, DamageRequested, DamageTarget, Dead, DespawnAfter, Health, HealthSynced};
use crate::components::Authority;

/// Система: apply damage от DamageRequested событий
///
/// 1. Читаем DamageRequested (только `DamageTarget::Entity`)
/// 2. Применяем к Health (defense, hit counter)
/// 3. Генерируем AgentHit или AgentDied
///
/// Replica агенты урон не применяют (health придёт через HealthSynced).
pub fn apply_agent_damage(
    mut requests: EventReader<DamageRequested>,
    mut hit_events: EventWriter<AgentHit>,
    mut died_events: EventWriter<AgentDied>,
    mut targets: Query<(&mut Health, Option<&Authority>)>,
) {
    for request in requests.read() {
        let DamageTarget::Entity(target) = request.target else {
            continue;
        };

        let Ok((mut health, authority)) = targets.get_mut(target) else {
            crate::logger::log_warning(&format!(
                "DamageRequested: target {:?} has no Health component",
                target
            ));
            continue;
        };

        if authority.is_some_and(|a| !a.is_host()) {
            continue;
        }

        match health.take_damage(request.amount) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Hit { applied } => {
                crate::logger::log(&format!(
                    "🩸 {:?} hit by {:?} for {:.1} (hp {:.1}/{:.1})",
                    target, request.attacker, applied, health.current, health.max
                ));
                hit_events.write(AgentHit {
                    agent: target,
                    attacker: request.attacker,
                    damage: applied,
                });
            }
            DamageOutcome::Killed { applied } => {
                crate::logger::log_info(&format!(
                    "💀 {:?} killed by {:?} ({:.1} damage)",
                    target, request.attacker, applied
                ));
                died_events.write(AgentDied {
                    agent: target,
                    killer: request.attacker,
                });
            }
        }
    }
}

/// Система: replica health с хоста (смерть → AgentDied)
pub fn apply_health_sync(
    mut syncs: EventReader<HealthSynced>,
    mut died_events: EventWriter<AgentDied>,
    mut targets: Query<&mut Health>,
) {
    for sync in syncs.read() {
        let Ok(mut health) = targets.get_mut(sync.agent) else {
            continue;
        };

        if health.sync(sync.current, sync.max) {
            crate::logger::log(&format!("💀 {:?} died (synced from host)", sync.agent));
            died_events.write(AgentDied {
                agent: sync.agent,
                killer: None,
            });
        }
    }
}

/// Система: сброс hit counter через секунду без ударов
pub fn decay_hit_counters(time: Res<Time<Fixed>>, mut query: Query<&mut Health, Without<Dead>>) {
    let delta = time.timestep().as_secs_f32();

    for mut health in query.iter_mut() {
        health.tick_hit_counter(delta);
    }
}

/// Система: деспавн entities с истёкшим DespawnAfter
pub fn despawn_after_timeout(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut query: Query<(Entity, &mut DespawnAfter)>,
) {
    let delta = time.timestep().as_secs_f32();

    for (entity, mut despawn_after) in query.iter_mut() {
        despawn_after.remaining -= delta;
        if despawn_after.remaining <= 0.0 {
            crate::logger::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).despawn();
        }
    }
}
