//! Tests for ground archetype states (Idle/Patrol/Trace/Attack/Hit/Die).

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::rstest;

    use super::super::context::AgentCommand;
    use super::super::ground::{GroundState, HIT_SPEED_MULTIPLIER, HIT_STUN_DURATION};
    use super::super::state::BehaviorState;
    use super::super::test_support::{Harness, DT};
    use crate::navigation::NavigationService;

    fn is_patrol(state: &GroundState) -> bool {
        matches!(state, GroundState::Patrol { .. })
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(42)]
    #[case(1337)]
    fn test_idle_to_patrol_within_idle_bounds(#[case] seed: u64) {
        let mut harness = Harness::ground();
        harness.rng = ChaCha8Rng::seed_from_u64(seed);
        let mut machine = harness.start(GroundState::idle());

        let ticks = harness
            .run_until(&mut machine, 1000, is_patrol)
            .expect("idle ends by idle_max");

        let elapsed = ticks as f32 * DT;
        assert!(elapsed >= harness.config.idle_min_time - 1e-3, "left idle at {elapsed}");
        assert!(elapsed <= harness.config.idle_max_time + DT + 1e-3, "left idle at {elapsed}");
    }

    #[test]
    fn test_idle_sees_player_goes_to_trace_next_tick() {
        let mut harness = Harness::ground();
        let mut machine = harness.start(GroundState::idle());

        harness.see_player(Vec3::new(0.0, 0.0, 5.0));
        assert!(harness.tick(&mut machine).expect("tick"));
        assert_eq!(machine.current(), Some(&GroundState::Trace));
    }

    #[test]
    fn test_friendly_ignores_sight_in_idle() {
        let mut harness = Harness::ground();
        harness.config.friendly = true;
        let mut machine = harness.start(GroundState::idle());

        harness.see_player(Vec3::new(0.0, 0.0, 5.0));
        assert!(!harness.tick(&mut machine).expect("tick"));
        assert!(matches!(machine.current(), Some(GroundState::Idle { .. })));
    }

    #[test]
    fn test_heard_player_routes_patrol_to_heard_position() {
        let mut harness = Harness::ground();
        let mut machine = harness.start(GroundState::idle());
        let heard_at = Vec3::new(8.0, 0.0, 0.0);

        harness.hear_player(heard_at);
        // Слух не прерывает Idle, но задаёт цель патруля
        harness.run_until(&mut machine, 1000, is_patrol).expect("patrol");

        match machine.current() {
            Some(GroundState::Patrol { destination, .. }) => assert_eq!(*destination, heard_at),
            other => panic!("expected Patrol, got {other:?}"),
        }
        assert_eq!(harness.navigator.destination(), heard_at);
    }

    #[test]
    fn test_patrol_reroutes_to_new_sound() {
        let mut harness = Harness::ground();
        let mut machine = harness.start(GroundState::patrol());

        let heard_at = Vec3::new(-6.0, 0.0, 3.0);
        harness.hear_player(heard_at);
        harness.tick(&mut machine).expect("tick");

        match machine.current() {
            Some(GroundState::Patrol { destination, .. }) => assert_eq!(*destination, heard_at),
            other => panic!("expected Patrol, got {other:?}"),
        }
    }

    #[test]
    fn test_patrol_destination_within_radius_on_ground() {
        let mut harness = Harness::ground();
        let machine = harness.start(GroundState::patrol());

        let Some(GroundState::Patrol { destination, .. }) = machine.current() else {
            panic!("expected Patrol");
        };
        let radius = Vec2::new(destination.x, destination.z).length();
        assert!((radius - harness.config.patrol_min_radius).abs() < 1e-3);
        assert_eq!(destination.y, 0.0);
    }

    #[test]
    fn test_patrol_arrival_returns_to_idle() {
        let mut harness = Harness::ground();
        let mut machine = harness.start(GroundState::patrol());

        let ticks = harness
            .run_until(&mut machine, 600, |s| matches!(s, GroundState::Idle { .. }))
            .expect("arrives");

        // Walk 1.5 m/s, 5 m радиус, остановка за 1.5 m
        assert!(ticks > 100);
        assert!(!harness.navigator.is_moving());
    }

    #[test]
    fn test_trace_to_attack_in_range() {
        let mut harness = Harness::ground();
        let mut machine = harness.start(GroundState::Trace);

        harness.see_player(Vec3::new(0.0, 0.0, 1.5));
        harness.tick(&mut machine).expect("tick");

        assert!(matches!(machine.current(), Some(GroundState::Attack { .. })));
        assert!(harness.triggered(harness.animation.keys.attack));
    }

    #[test]
    fn test_friendly_trace_in_range_goes_idle() {
        let mut harness = Harness::ground();
        harness.config.friendly = true;
        let mut machine = harness.start(GroundState::Trace);

        harness.see_player(Vec3::new(0.0, 0.0, 1.5));
        harness.tick(&mut machine).expect("tick");

        assert!(matches!(machine.current(), Some(GroundState::Idle { .. })));
        assert_eq!(harness.damage_dealt(), 0.0);
    }

    #[test]
    fn test_attack_damages_once_then_returns_to_trace() {
        let mut harness = Harness::ground();
        let mut machine = harness.start(GroundState::attack());
        harness.see_player(Vec3::new(0.0, 0.0, 1.5));

        let ticks = harness
            .run_until(&mut machine, 600, |s| *s == GroundState::Trace)
            .expect("attack times out");

        let elapsed = ticks as f32 * DT;
        assert!((elapsed - harness.config.attack_timeout).abs() <= DT + 1e-3);
        assert_eq!(harness.damage_dealt(), harness.config.attack_damage);
    }

    #[test]
    fn test_attack_misses_when_target_left_range() {
        let mut harness = Harness::ground();
        let mut machine = harness.start(GroundState::attack());
        harness.see_player(Vec3::new(0.0, 0.0, 6.0));

        harness
            .run_until(&mut machine, 600, |s| *s == GroundState::Trace)
            .expect("attack times out");

        assert_eq!(harness.damage_dealt(), 0.0);
    }

    #[test]
    fn test_trace_loses_sight_and_idles_at_last_known_position() {
        let mut harness = Harness::ground();
        let mut machine = harness.start(GroundState::Trace);

        harness.see_player(Vec3::new(0.0, 0.0, 6.0));
        harness.tick(&mut machine).expect("tick");
        // Вне зрения, но ещё в памяти: идём к last known
        harness.target = None;
        harness.sensor.in_sight = false;
        harness.sensor.acquired = false;

        let ticks = harness
            .run_until(&mut machine, 600, |s| matches!(s, GroundState::Idle { .. }))
            .expect("gives up");
        assert!(ticks > 1);
        assert!(harness.transform.translation.z > 4.0);
    }

    #[test]
    fn test_trace_forgotten_target_idles_next_tick() {
        let mut harness = Harness::ground();
        let mut machine = harness.start(GroundState::Trace);

        harness.see_player(Vec3::new(0.0, 0.0, 6.0));
        harness.tick(&mut machine).expect("tick");
        harness.lose_target();

        assert!(harness.tick(&mut machine).expect("tick"));
        assert!(matches!(machine.current(), Some(GroundState::Idle { .. })));
    }

    #[test]
    fn test_hit_during_patrol_without_target_settles_in_idle() {
        // NavAgent выключен: dormant движение
        let mut harness = Harness::ground();
        let mut machine = harness.start(GroundState::patrol());
        for _ in 0..5 {
            harness.tick(&mut machine).expect("tick");
        }
        {
            let mut ctx = harness.ctx();
            machine.change_state(GroundState::hit(), &mut ctx).expect("patrol → hit");
        }

        harness
            .run_until(&mut machine, 120, |s| matches!(s, GroundState::Idle { .. }))
            .expect("stun ends and the agent idles instead of tracing nothing");
        assert!(!harness.navigator.is_moving());
    }

    #[test]
    fn test_friendly_ignores_sound() {
        let mut harness = Harness::ground();
        harness.config.friendly = true;
        let heard_at = Vec3::new(-6.0, 0.0, 3.0);

        let mut machine = harness.start(GroundState::patrol());
        let Some(GroundState::Patrol { destination: before, .. }) = machine.current().cloned() else {
            panic!("expected Patrol");
        };
        harness.hear_player(heard_at);
        harness.tick(&mut machine).expect("tick");

        match machine.current() {
            Some(GroundState::Patrol { destination, .. }) => {
                assert_eq!(*destination, before);
                assert_ne!(*destination, heard_at);
            }
            other => panic!("expected Patrol, got {other:?}"),
        }

        // Новый патруль из Idle тоже не идёт на звук
        let mut machine = harness.start(GroundState::idle());
        harness.run_until(&mut machine, 1000, is_patrol).expect("patrol");
        match machine.current() {
            Some(GroundState::Patrol { destination, .. }) => assert_ne!(*destination, heard_at),
            other => panic!("expected Patrol, got {other:?}"),
        }
    }

    #[test]
    fn test_trace_follows_memory_position() {
        let mut harness = Harness::ground();
        let mut machine = harness.start(GroundState::Trace);

        harness.see_player(Vec3::new(0.0, 0.0, 10.0));
        harness.tick(&mut machine).expect("tick");

        // Цель пропала из вида, но помнится: идём к last known, не к live позиции
        harness.sensor.in_sight = false;
        harness.sensor.acquired = false;
        harness.target = harness.target.map(|mut t| {
            t.position = Vec3::new(20.0, 0.0, 0.0);
            t
        });
        harness.tick(&mut machine).expect("tick");

        assert_eq!(harness.navigator.destination(), Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn test_hit_slows_then_returns_to_trace() {
        let mut harness = Harness::ground();
        harness.nav_agent.as_mut().expect("nav agent").enable();
        let mut machine = harness.start(GroundState::Trace);
        harness.see_player(Vec3::new(0.0, 0.0, 10.0));
        harness.tick(&mut machine).expect("tick");

        {
            let mut ctx = harness.ctx();
            machine.change_state(GroundState::hit(), &mut ctx).expect("trace → hit");
        }
        let slowed = harness.navigator.effective_speed();
        assert!((slowed - harness.config.run_speed * HIT_SPEED_MULTIPLIER).abs() < 1e-4);
        let agent_speed = harness.nav_agent.as_ref().expect("nav agent").speed();
        assert!(agent_speed <= harness.config.run_speed * HIT_SPEED_MULTIPLIER + 1e-4);

        let ticks = harness
            .run_until(&mut machine, 600, |s| *s == GroundState::Trace)
            .expect("stun ends");
        assert!((ticks as f32 * DT - HIT_STUN_DURATION).abs() <= DT + 1e-3);
        assert!((harness.navigator.effective_speed() - harness.config.run_speed).abs() < 1e-4);
    }

    #[test]
    fn test_die_is_terminal_and_emits_cleanup() {
        let mut harness = Harness::ground();
        harness.nav_agent.as_mut().expect("nav agent").enable();
        let mut machine = harness.start(GroundState::Trace);
        {
            let mut ctx = harness.ctx();
            machine.change_state(GroundState::die(), &mut ctx).expect("trace → die");
        }

        assert!(machine.is_terminal());
        assert!(harness.commands.contains(&AgentCommand::DisableCollision));
        assert!(harness.commands.contains(&AgentCommand::RollLoot));
        assert!(!harness.nav_agent.as_ref().expect("nav agent").is_enabled());
        assert!(harness.triggered(harness.animation.keys.die));

        // Die ничего не делает и никуда не уходит
        harness.see_player(Vec3::new(0.0, 0.0, 1.0));
        for _ in 0..120 {
            assert!(!harness.tick(&mut machine).expect("tick"));
        }
        assert_eq!(harness.damage_dealt(), 0.0);
    }
}
