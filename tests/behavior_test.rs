use bevy::math::Vec2;
use kraken_rs::behavior::BehaviorState;
use kraken_rs::config::KrakenConfig;
use kraken_rs::creature::CreatureGeometry;
use kraken_rs::intercept::{Heading, LaunchRejected, Outcome, Phase};
use kraken_rs::session::{PointerButton, PointerEvent, Session, SessionEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;

const TICK_LIMIT: u32 = 2_000;

/// 800x600 session with a 80x80 kraken whose mouth sits 40 px in and down
fn session_with(config: KrakenConfig) -> Session {
    let geometry = CreatureGeometry::new(Vec2::splat(40.0), Vec2::new(40.0, 40.0));
    Session::with_geometry(config, geometry).expect("800x600 fits the kraken")
}

fn seeded(destroy_probability: f64) -> Session {
    session_with(KrakenConfig {
        seed: Some(42),
        destroy_probability,
        ..Default::default()
    })
}

/// Acts as the renderer: a sunk boat is taken off screen right away
fn tick_and_render(session: &mut Session) {
    session.tick();
    if session.intruder_pending_removal() {
        session.confirm_intruder_removed();
    }
}

#[test]
fn kraken_eats_a_dropped_shrimp_then_idles() {
    let mut session = seeded(0.8);
    assert_eq!(session.rect().min_y, 160.0);

    session.place_creature(Vec2::new(400.0, 450.0));
    session.enqueue_food(400.0, 300.0).expect("shrimp accepted");
    assert_eq!(session.state(), BehaviorState::Idle);

    let mut saw_eating = false;
    for _ in 0..TICK_LIMIT {
        session.tick();
        saw_eating |= session.state() == BehaviorState::Eating;
        if saw_eating && session.state() == BehaviorState::Idle {
            break;
        }
    }

    assert!(saw_eating, "kraken never started eating");
    assert_eq!(session.state(), BehaviorState::Idle);
    assert!(session.food().is_empty());
    assert_eq!(session.counters().food_eaten, 1);
}

#[test]
fn kraken_hunts_nearest_shrimp_first() {
    let mut session = seeded(0.8);
    session.place_creature(Vec2::new(100.0, 400.0));
    let far = session.enqueue_food(650.0, 450.0).expect("far");
    let near = session.enqueue_food(200.0, 420.0).expect("near");

    session.tick();
    assert_eq!(session.state(), BehaviorState::Seeking);
    assert_eq!(session.target(), Some(near));

    let mut eaten = Vec::new();
    for _ in 0..TICK_LIMIT {
        session.tick();
        eaten.extend(session.drain_events().into_iter().filter_map(|e| match e {
            SessionEvent::FoodEaten(id) => Some(id),
            _ => None,
        }));
        if eaten.len() == 2 {
            break;
        }
    }
    assert_eq!(eaten, vec![near, far]);
}

#[rstest]
#[case(1.0, Outcome::Destroyed, 1)]
#[case(0.0, Outcome::Escaped, 0)]
fn interception_returns_to_the_saved_shrimp(
    #[case] destroy_probability: f64,
    #[case] expected: Outcome,
    #[case] destroyed: u64,
) {
    let mut session = seeded(destroy_probability);
    session.place_creature(Vec2::new(100.0, 450.0));
    let food_a = session.enqueue_food(650.0, 420.0).expect("food A");
    session.tick();
    assert_eq!(session.state(), BehaviorState::Seeking);
    assert_eq!(session.target(), Some(food_a));

    assert_eq!(
        session.launch_intruder(Vec2::new(600.0, 50.0)),
        Ok(Heading::LeftToRight)
    );
    assert!(session.trigger_interception());
    assert_eq!(session.state(), BehaviorState::Intercepting);

    let mut phases = vec![Phase::Approach];
    let mut outcome = None;
    for _ in 0..TICK_LIMIT {
        tick_and_render(&mut session);
        let Some(task) = session.interception() else {
            break;
        };
        if phases.last() != Some(&task.phase()) {
            phases.push(task.phase());
        }
        outcome = task.outcome().or(outcome);
    }

    assert_eq!(phases, vec![Phase::Approach, Phase::Engage, Phase::Return]);
    assert_eq!(outcome, Some(expected));
    assert_eq!(session.state(), BehaviorState::Seeking);
    assert_eq!(session.target(), Some(food_a));
    assert_eq!(session.counters().intruders_destroyed, destroyed);
}

#[rstest]
#[case(1.0, 1)]
#[case(0.0, 0)]
fn interception_while_eating_resumes_the_same_shrimp(
    #[case] destroy_probability: f64,
    #[case] destroyed: u64,
) {
    let mut session = seeded(destroy_probability);
    // Mouth lands on the shrimp straight away.
    session.place_creature(Vec2::new(360.0, 260.0));
    let food = session.enqueue_food(400.0, 300.0).expect("under the mouth");
    for _ in 0..5 {
        session.tick();
    }
    assert_eq!(session.state(), BehaviorState::Eating);

    session.launch_intruder(Vec2::new(700.0, 50.0)).expect("boat");
    assert!(session.trigger_interception());
    assert_eq!(session.state(), BehaviorState::Intercepting);
    assert_eq!(
        session.interception().map(|t| t.saved().state),
        Some(BehaviorState::Eating)
    );

    for _ in 0..TICK_LIMIT {
        tick_and_render(&mut session);
        if session.interception().is_none() {
            break;
        }
    }
    assert_eq!(session.state(), BehaviorState::Seeking);
    assert_eq!(session.target(), Some(food));
    assert!(session.food().contains(food));
    assert_eq!(session.counters().food_eaten, 0);
    assert_eq!(session.counters().intruders_destroyed, destroyed);

    // The dwell starts over once the mouth is back on the shrimp.
    for _ in 0..TICK_LIMIT {
        tick_and_render(&mut session);
        if session.state() == BehaviorState::Eating {
            break;
        }
    }
    assert_eq!(session.state(), BehaviorState::Eating);
    session.drain_events();

    let dwell = session.config().eating_dwell_ticks;
    for _ in 1..dwell {
        tick_and_render(&mut session);
        assert_eq!(session.state(), BehaviorState::Eating);
    }
    tick_and_render(&mut session);
    assert!(session.drain_events().contains(&SessionEvent::FoodEaten(food)));
    assert_eq!(session.counters().food_eaten, 1);
}

#[test]
fn escaped_boat_is_not_hunted_twice() {
    let mut session = session_with(KrakenConfig {
        seed: Some(42),
        destroy_probability: 0.0,
        boat_speed: 1.0,
        ..Default::default()
    });
    session.launch_intruder(Vec2::new(700.0, 50.0)).expect("boat");
    assert!(session.trigger_interception());

    for _ in 0..TICK_LIMIT {
        tick_and_render(&mut session);
        if session.interception().is_none() {
            break;
        }
    }
    assert_eq!(session.state(), BehaviorState::Idle);

    let boat = session.intruder().expect("escaped boat still sailing");
    assert!(boat.is_sailing());
    assert!(boat.triggered);
    assert!(!session.trigger_interception());

    for _ in 0..50 {
        session.tick();
        assert_ne!(session.state(), BehaviorState::Intercepting);
    }
}

#[test]
fn boat_leaving_mid_interception_is_reported_as_escaped() {
    let mut session = session_with(KrakenConfig {
        seed: Some(42),
        engage_ticks: 100_000,
        ..Default::default()
    });
    session.launch_intruder(Vec2::new(700.0, 50.0)).expect("boat");
    assert!(session.trigger_interception());

    let mut events = Vec::new();
    let mut outcome = None;
    for _ in 0..TICK_LIMIT {
        tick_and_render(&mut session);
        events.extend(session.drain_events());
        let Some(task) = session.interception() else {
            break;
        };
        outcome = task.outcome().or(outcome);
    }

    assert_eq!(outcome, Some(Outcome::Escaped));
    assert!(events.contains(&SessionEvent::IntruderRetired));
    assert!(events.contains(&SessionEvent::IntruderEscaped));
    assert!(!events.contains(&SessionEvent::IntruderDestroyed));
    assert_eq!(session.counters().intruders_destroyed, 0);
    assert_eq!(session.state(), BehaviorState::Idle);
}

#[test]
fn interception_goes_idle_when_the_saved_shrimp_is_gone() {
    let mut session = seeded(1.0);
    session.place_creature(Vec2::new(100.0, 450.0));
    session.enqueue_food(650.0, 420.0).expect("food A");
    session.tick();
    session.launch_intruder(Vec2::new(100.0, 40.0)).expect("boat");
    assert!(session.trigger_interception());

    // Clearing is buffered and lands at the start of the next tick.
    session.push_input(PointerEvent {
        x: 0.0,
        y: 0.0,
        button: PointerButton::Secondary,
    });

    for _ in 0..TICK_LIMIT {
        tick_and_render(&mut session);
        if session.state() != BehaviorState::Intercepting {
            break;
        }
    }

    assert_eq!(session.state(), BehaviorState::Idle);
    assert_eq!(session.target(), None);
    assert!(session.food().is_empty());
}

#[test]
fn sunk_boat_is_removed_even_without_renderer_confirmation() {
    let mut session = seeded(1.0);
    session.place_creature(Vec2::new(300.0, 300.0));
    session.launch_intruder(Vec2::new(700.0, 30.0)).expect("boat");
    assert!(session.trigger_interception());

    let mut saw_pending = false;
    for _ in 0..TICK_LIMIT {
        session.tick();
        saw_pending |= session.intruder_pending_removal();
        if session.state() != BehaviorState::Intercepting {
            break;
        }
    }

    assert!(saw_pending);
    assert!(session.intruder().is_none());
    assert_eq!(session.state(), BehaviorState::Idle);
    assert_eq!(session.counters().intruders_destroyed, 1);
}

#[test]
fn boat_crossing_the_trigger_line_starts_an_interception() {
    let mut session = seeded(0.0);
    session.push_input(PointerEvent::primary(200.0, 60.0));

    session.tick();
    let boat = session.intruder().expect("boat launched").clone();
    assert_eq!(boat.heading, Heading::RightToLeft);
    assert!(!boat.triggered);

    let mut started_on = None;
    for tick in 0..TICK_LIMIT {
        session.tick();
        if session.state() == BehaviorState::Intercepting {
            started_on = Some(tick);
            break;
        }
    }

    assert!(started_on.is_some());
    let boat = session.intruder().expect("still sailing");
    assert!(boat.triggered);
    assert!(boat.bow_x() <= 640.0);
}

#[test]
fn interception_without_a_boat_is_a_no_op() {
    let mut session = seeded(0.8);
    assert!(!session.trigger_interception());
    assert_eq!(session.state(), BehaviorState::Idle);
}

#[test]
fn only_one_boat_at_a_time() {
    let mut session = seeded(0.8);
    session.launch_intruder(Vec2::new(100.0, 50.0)).expect("first boat");
    assert_eq!(
        session.launch_intruder(Vec2::new(100.0, 50.0)),
        Err(LaunchRejected::AlreadyActive)
    );
    assert_eq!(
        seeded(0.8).launch_intruder(Vec2::new(100.0, 300.0)),
        Err(LaunchRejected::NotAboveWater)
    );
}

#[test]
fn boat_retires_after_leaving_the_screen() {
    let mut session = session_with(KrakenConfig {
        seed: Some(1),
        boat_trigger_fraction: 2.0,
        ..Default::default()
    });
    session.launch_intruder(Vec2::new(700.0, 50.0)).expect("boat");

    let mut retired = false;
    for _ in 0..TICK_LIMIT {
        session.tick();
        if session
            .drain_events()
            .contains(&SessionEvent::IntruderRetired)
        {
            retired = true;
            break;
        }
    }

    assert!(retired);
    assert!(session.intruder().is_none());
    assert_eq!(session.state(), BehaviorState::Idle);
}

/// Window-sized session using the kraken's real sprite geometry
fn default_session() -> Session {
    Session::new(KrakenConfig {
        seed: Some(7),
        ..Default::default()
    })
    .expect("default window fits the kraken")
}

#[rstest]
#[case::left_wall(None)]
#[case::top_left(Some((0.0, 0.0)))]
#[case::top_right(Some((1.0, 0.0)))]
#[case::bottom_left(Some((0.0, 1.0)))]
#[case::bottom_right(Some((1.0, 1.0)))]
fn every_accepted_shrimp_is_eaten(#[case] corner: Option<(f32, f32)>) {
    let mut session = default_session();
    let rect = session.rect();
    let position = match corner {
        Some((fx, fy)) => Vec2::new(
            rect.min_x + (rect.max_x - rect.min_x) * fx,
            rect.min_y + (rect.max_y - rect.min_y) * fy,
        ),
        None => Vec2::new(20.0, 300.0),
    };
    let id = session
        .enqueue_food(position.x, position.y)
        .expect("inside the rect");

    let mut eaten = Vec::new();
    for _ in 0..TICK_LIMIT {
        session.tick();
        eaten.extend(session.drain_events().into_iter().filter_map(|e| match e {
            SessionEvent::FoodEaten(id) => Some(id),
            _ => None,
        }));
        if !eaten.is_empty() {
            break;
        }
    }

    assert_eq!(eaten, vec![id], "shrimp at {position} was not eaten");
    assert_eq!(session.counters().food_eaten, 1);
    assert!(session.food().is_empty());
    assert_eq!(session.state(), BehaviorState::Idle);
}

#[test]
fn shrimp_near_a_wall_is_eaten() {
    let mut session = seeded(0.8);
    session.enqueue_food(30.0, 170.0).expect("inside the rect");

    for _ in 0..TICK_LIMIT {
        session.tick();
        if session.counters().food_eaten == 1 {
            break;
        }
    }

    assert_eq!(session.counters().food_eaten, 1);
    assert!(session.food().is_empty());
}

#[test]
fn clicks_are_applied_on_the_next_tick() {
    let mut session = seeded(0.8);
    session.push_input(PointerEvent::primary(400.0, 300.0));
    session.push_input(PointerEvent::primary(420.0, 300.0));
    session.push_input(PointerEvent::primary(400.0, 590.0));
    assert!(session.food().is_empty());

    session.tick();

    assert_eq!(session.food().len(), 1);
    let events = session.drain_events();
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, SessionEvent::FoodRejected(_)))
            .count(),
        2
    );
}

#[test]
fn kraken_never_leaves_the_water() {
    let mut session = seeded(0.5);
    let mut rng = StdRng::seed_from_u64(99);
    let rect = session.rect();

    for tick in 0..3_000u32 {
        if tick % 40 == 0 {
            let x = rng.gen_range(0.0..800.0);
            let y = rng.gen_range(0.0..600.0);
            session.push_input(PointerEvent::primary(x, y));
        }
        tick_and_render(&mut session);
        let position = session.creature().position;
        assert!(
            rect.contains(position),
            "tick {tick}: {position} left {rect:?}"
        );
    }
}

#[test]
fn resize_keeps_old_geometry_when_the_new_one_is_invalid() {
    let mut session = seeded(0.8);
    let before = session.rect();

    assert!(session.resize(100.0, 100.0).is_err());
    assert_eq!(session.rect(), before);
    assert_eq!(session.container().width, 800.0);

    session.place_creature(Vec2::new(700.0, 460.0));
    session.resize(400.0, 400.0).expect("400x400 fits");
    let rect = session.rect();
    assert_eq!(rect.max_x, 310.0);
    assert!(rect.contains(session.creature().position));
}

#[test]
fn shutdown_stops_ticking() {
    let mut session = seeded(0.8);
    session.tick();
    session.shutdown();
    session.push_input(PointerEvent::primary(400.0, 300.0));

    session.tick();
    session.advance_animation();

    assert!(!session.is_running());
    assert_eq!(session.tick_count(), 1);
    assert!(session.food().is_empty());
}

#[test]
fn eating_speeds_up_the_animation() {
    let mut session = seeded(0.8);
    assert_eq!(session.animation_interval(), 0.5);

    session.place_creature(Vec2::new(360.0, 260.0));
    session.enqueue_food(400.0, 300.0).expect("under the mouth");
    session.tick();
    session.tick();

    assert_eq!(session.state(), BehaviorState::Eating);
    assert_eq!(session.creature().animation.key(), "eating");
    assert_eq!(session.animation_interval(), 0.3);
}
