//! Tests for ambush archetype (camouflage, aim, tongue outcomes, pull/bite, stuck/recover).

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::ambush::{mouth_point, AmbushState, BITE_DURATION, PULL_COMPLETE_DISTANCE};
    use super::super::context::{AgentCommand, TargetInfo};
    use super::super::helpers::move_towards;
    use super::super::state::BehaviorState;
    use super::super::test_support::{Harness, DT};
    use crate::components::Targetable;
    use crate::physics::LayerMask;

    fn ambush_config(harness: &Harness) -> crate::config::AmbushConfig {
        harness.ambush.clone().expect("ambush config")
    }

    fn has_command(harness: &Harness, expected: AgentCommand) -> bool {
        harness.commands.contains(&expected)
    }

    fn retract_count(harness: &Harness) -> usize {
        harness
            .commands
            .iter()
            .filter(|command| **command == AgentCommand::RetractTongue)
            .count()
    }

    /// Тик + применение PullTarget к позиции цели (как делает контроллер)
    fn tick_with_pull(harness: &mut Harness, machine: &mut crate::ai::StateMachine<AmbushState>) {
        let before = harness.commands.len();
        harness.tick(machine).expect("tick");

        let pull = harness.commands[before..].iter().find_map(|command| match command {
            AgentCommand::PullTarget { towards, max_step, .. } => Some((*towards, *max_step)),
            _ => None,
        });
        if let (Some((towards, max_step)), Some(target)) = (pull, harness.target.as_mut()) {
            target.position = move_towards(target.position, towards, max_step);
        }
    }

    #[test]
    fn test_camouflage_until_sight_then_aim() {
        let mut harness = Harness::ambush();
        let mut machine = harness.start(AmbushState::Camouflage);
        assert!(has_command(&harness, AgentCommand::SetCamouflage(true)));

        harness.hear_player(Vec3::new(0.0, 0.0, 4.0));
        harness.tick(&mut machine).expect("tick");
        assert_eq!(machine.current(), Some(&AmbushState::Camouflage));

        harness.see_player(Vec3::new(0.0, 0.0, 4.0));
        harness.tick(&mut machine).expect("tick");
        assert!(matches!(machine.current(), Some(AmbushState::Aim { .. })));
        assert!(has_command(&harness, AgentCommand::SetCamouflage(false)));
        assert!(harness.triggered(harness.animation.keys.aim));
    }

    #[test]
    fn test_aim_lost_sight_returns_to_camouflage() {
        let mut harness = Harness::ambush();
        harness.see_player(Vec3::new(0.0, 0.0, 4.0));
        let mut machine = harness.start(AmbushState::aim());

        harness.sensor.in_sight = false;
        harness.tick(&mut machine).expect("tick");
        assert_eq!(machine.current(), Some(&AmbushState::Camouflage));
    }

    #[test]
    fn test_aim_snaps_after_aiming_time() {
        let mut harness = Harness::ambush();
        harness.see_player(Vec3::new(0.0, 0.0, 6.0));
        let mut machine = harness.start(AmbushState::aim());

        let ticks = harness
            .run_until(&mut machine, 600, |s| matches!(s, AmbushState::Snap { .. }))
            .expect("snaps");
        let aiming_time = ambush_config(&harness).aiming_time;
        assert!((ticks as f32 * DT - aiming_time).abs() <= DT + 1e-3);

        let Some(AmbushState::Snap { tongue: Some(shot) }) = machine.current() else {
            panic!("expected Snap with a tongue in flight");
        };
        assert!(has_command(
            &harness,
            AgentCommand::FireTongue {
                from: shot.origin,
                towards: shot.aim,
            }
        ));
    }

    #[test]
    fn test_aim_turns_towards_target() {
        let mut harness = Harness::ambush();
        harness.see_player(Vec3::new(6.0, 0.0, 0.0));
        let mut machine = harness.start(AmbushState::aim());

        for _ in 0..30 {
            harness.tick(&mut machine).expect("tick");
        }
        let forward = harness.transform.forward();
        assert!(forward.x > 0.9, "forward {forward:?}");
    }

    #[test]
    fn test_tongue_catches_player_pulls_and_bites() {
        let mut harness = Harness::ambush();
        harness.see_player(Vec3::new(0.0, 0.0, 6.0));
        let mut machine = harness.start(AmbushState::snap());

        harness
            .run_until(&mut machine, 120, |s| matches!(s, AmbushState::Pull { .. }))
            .expect("tongue connects");
        assert_eq!(retract_count(&harness), 0);

        // Тянем до рта
        let mut pulled = false;
        for _ in 0..600 {
            tick_with_pull(&mut harness, &mut machine);
            if matches!(machine.current(), Some(AmbushState::Bite { .. })) {
                pulled = true;
                break;
            }
        }
        assert!(pulled, "pull never completed");
        assert_eq!(retract_count(&harness), 0, "tongue retracted before the bite ended");

        let mouth = mouth_point(&harness.transform);
        let target = harness.target.expect("target");
        assert!(target.position.distance(mouth) < PULL_COMPLETE_DISTANCE);
        assert_eq!(harness.damage_dealt(), ambush_config(&harness).bite_damage);

        let ticks = harness
            .run_until(&mut machine, 600, |s| matches!(s, AmbushState::Cooldown { .. }))
            .expect("bite ends");
        assert!((ticks as f32 * DT - BITE_DURATION).abs() <= DT + 1e-3);
        assert_eq!(retract_count(&harness), 1);

        let cooldown = ambush_config(&harness).cooldown_time;
        let ticks = harness
            .run_until(&mut machine, 1200, |s| *s == AmbushState::Camouflage)
            .expect("cooldown ends");
        assert!((ticks as f32 * DT - cooldown).abs() <= DT + 1e-3);
    }

    #[test]
    fn test_tongue_sticks_to_world_object_then_recovers() {
        let mut harness = Harness::ambush();
        harness.see_player(Vec3::new(0.0, 0.0, 5.0));
        // Цель — навозный шар, а не игрок
        harness.target = Some(TargetInfo::new(
            Entity::from_raw(200),
            Vec3::new(0.0, 0.0, 5.0),
            &Targetable::object(LayerMask::PROPS),
        ));
        let mut machine = harness.start(AmbushState::snap());

        harness
            .run_until(&mut machine, 120, |s| matches!(s, AmbushState::Stuck { .. }))
            .expect("tongue sticks");
        assert!(!has_command(&harness, AgentCommand::RetractTongue));

        let stun = ambush_config(&harness).stun_duration;
        let ticks = harness
            .run_until(&mut machine, 600, |s| matches!(s, AmbushState::Recover { .. }))
            .expect("stun ends");
        assert!((ticks as f32 * DT - stun).abs() <= DT + 1e-3);
        assert_eq!(retract_count(&harness), 1);

        harness
            .run_until(&mut machine, 120, |s| matches!(s, AmbushState::Cooldown { .. }))
            .expect("recovered");
    }

    #[test]
    fn test_tongue_miss_goes_to_cooldown() {
        let mut harness = Harness::ambush();
        harness.see_player(Vec3::new(0.0, 0.0, 6.0));
        let mut machine = harness.start(AmbushState::snap());

        // Игрок увернулся в сторону после выстрела
        if let Some(target) = harness.target.as_mut() {
            target.position = Vec3::new(4.0, 0.0, 6.0);
        }

        harness
            .run_until(&mut machine, 120, |s| matches!(s, AmbushState::Cooldown { .. }))
            .expect("tongue misses");
        assert_eq!(retract_count(&harness), 1);
        assert_eq!(harness.damage_dealt(), 0.0);
    }

    #[test]
    fn test_snap_without_target_cools_down() {
        let mut harness = Harness::ambush();
        let mut machine = harness.start(AmbushState::snap());

        assert_eq!(machine.current(), Some(&AmbushState::Snap { tongue: None }));
        harness.tick(&mut machine).expect("tick");
        assert!(matches!(machine.current(), Some(AmbushState::Cooldown { .. })));
        // Язык не вылетал
        assert_eq!(retract_count(&harness), 0);
    }

    #[test]
    fn test_hit_while_tongue_in_flight_retracts_once() {
        let mut harness = Harness::ambush();
        harness.see_player(Vec3::new(0.0, 0.0, 6.0));
        let mut machine = harness.start(AmbushState::snap());
        assert!(matches!(machine.current(), Some(AmbushState::Snap { tongue: Some(_) })));
        {
            let mut ctx = harness.ctx();
            machine.change_state(AmbushState::hit(), &mut ctx).expect("snap → hit");
        }

        assert_eq!(retract_count(&harness), 1);
    }

    #[test]
    fn test_hit_retracts_and_returns_to_aim_when_target_visible() {
        let mut harness = Harness::ambush();
        harness.see_player(Vec3::new(0.0, 0.0, 6.0));
        let mut machine = harness.start(AmbushState::pull());
        {
            let mut ctx = harness.ctx();
            machine.change_state(AmbushState::hit(), &mut ctx).expect("pull → hit");
        }
        assert_eq!(retract_count(&harness), 1);

        harness
            .run_until(&mut machine, 120, |s| !s.is_hit())
            .expect("stun ends");
        assert!(matches!(machine.current(), Some(AmbushState::Aim { .. })));
    }

    #[test]
    fn test_die_uncamouflages_and_drops_loot() {
        let mut harness = Harness::ambush();
        let mut machine = harness.start(AmbushState::Camouflage);
        {
            let mut ctx = harness.ctx();
            machine.change_state(AmbushState::die(), &mut ctx).expect("camouflage → die");
        }

        assert!(machine.is_terminal());
        assert!(has_command(&harness, AgentCommand::SetCamouflage(false)));
        assert!(has_command(&harness, AgentCommand::RollLoot));
        assert!(has_command(&harness, AgentCommand::DisableCollision));
    }
}
