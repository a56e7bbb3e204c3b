use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use kraken_rs::config::KrakenConfig;
use kraken_rs::creature::CreatureGeometry;
use kraken_rs::intercept::Heading;
use kraken_rs::plugin::{AnimationTimer, BehaviorTimer, KrakenSimulationPlugin, SimulationState};
use kraken_rs::render::{Layer, RenderSurface, StyleKey, boat_sprite, kraken_sprite};
use kraken_rs::session::Session;

fn seeded_session() -> Session {
    let config = KrakenConfig {
        seed: Some(5),
        ..Default::default()
    };
    let geometry = CreatureGeometry::new(Vec2::splat(40.0), Vec2::new(40.0, 40.0));
    Session::with_geometry(config, geometry).expect("800x600 fits the kraken")
}

/// Headless app stepping 100 ms of game time per update
fn headless_app(session: Session) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
        .insert_resource(session)
        .add_plugins(KrakenSimulationPlugin);
    app
}

/// Integration test to ensure the simulation can start and run for multiple frames
#[test]
fn test_simulation_ticks_from_the_behavior_timer() {
    let mut session = seeded_session();
    session.place_creature(Vec2::new(400.0, 450.0));
    session.enqueue_food(400.0, 300.0).expect("shrimp accepted");
    let mut app = headless_app(session);

    for _ in 0..200 {
        app.update();
    }

    let session = app.world().resource::<Session>();
    assert!(
        session.tick_count() >= 190,
        "only {} ticks in 200 frames",
        session.tick_count()
    );
    assert_eq!(session.counters().food_eaten, 1);
    assert!(session.food().is_empty());
}

#[test]
fn test_pausing_stops_the_tick_loop() {
    let mut app = headless_app(seeded_session());
    for _ in 0..5 {
        app.update();
    }

    *app.world_mut().resource_mut::<SimulationState>() = SimulationState::Paused;
    let before = app.world().resource::<Session>().tick_count();
    for _ in 0..10 {
        app.update();
    }

    assert_eq!(app.world().resource::<Session>().tick_count(), before);
}

#[test]
fn test_stopped_timers_fire_nothing() {
    let mut app = headless_app(seeded_session());
    app.update();

    app.world_mut().resource_mut::<BehaviorTimer>().0.pause();
    app.world_mut().resource_mut::<AnimationTimer>().0.pause();
    app.world_mut().resource_mut::<Session>().shutdown();
    let before = app.world().resource::<Session>().tick_count();
    let frames = app.world().resource::<Session>().frame_count();

    for _ in 0..20 {
        app.update();
    }

    let session = app.world().resource::<Session>();
    assert_eq!(session.tick_count(), before);
    assert_eq!(session.frame_count(), frames);
}

#[test]
fn test_animation_advances_on_its_own_timer() {
    let mut app = headless_app(seeded_session());

    for _ in 0..20 {
        app.update();
    }

    // 2 s of game time at one frame per 500 ms.
    let frames = app.world().resource::<Session>().frame_count();
    assert!((3..=4).contains(&frames), "{frames} animation frames");
}

#[derive(Default)]
struct RecordingSurface {
    cleared: Vec<Layer>,
    draws: Vec<(Layer, Vec<String>, Vec2, StyleKey)>,
}

impl RenderSurface for RecordingSurface {
    fn clear(&mut self, layer: Layer) {
        self.cleared.push(layer);
        self.draws.retain(|(drawn_on, ..)| *drawn_on != layer);
    }

    fn draw(&mut self, layer: Layer, lines: &[String], position: Vec2, style: StyleKey) {
        self.draws.push((layer, lines.to_vec(), position, style));
    }
}

impl RecordingSurface {
    fn on(&self, layer: Layer) -> Vec<&(Layer, Vec<String>, Vec2, StyleKey)> {
        self.draws.iter().filter(|d| d.0 == layer).collect()
    }
}

#[test]
fn test_render_draws_every_layer() {
    let mut session = seeded_session();
    session.enqueue_food(200.0, 300.0).expect("a");
    session.enqueue_food(500.0, 300.0).expect("b");
    session.launch_intruder(Vec2::new(100.0, 50.0)).expect("boat");
    session.bubbles_mut().spawn_at(Vec2::new(300.0, 400.0), 0);

    let mut surface = RecordingSurface::default();
    session.render(&mut surface);

    assert_eq!(surface.cleared, Layer::ALL.to_vec());
    assert_eq!(surface.on(Layer::Environment).len(), 2);
    assert_eq!(surface.on(Layer::Food).len(), 2);
    assert_eq!(surface.on(Layer::Bubbles).len(), 1);

    let kraken = surface.on(Layer::Creature);
    assert_eq!(kraken.len(), 1);
    assert_eq!(kraken[0].1.len(), 11);
    assert_eq!(kraken[0].2, session.creature().position);

    let boat = surface.on(Layer::Intruder);
    assert_eq!(boat.len(), 1);
    assert_eq!(boat[0].1, boat_sprite(Heading::RightToLeft));
    assert_eq!(boat[0].3, StyleKey::Boat);
}

#[test]
fn test_sunk_boat_is_not_drawn() {
    let config = KrakenConfig {
        seed: Some(5),
        destroy_probability: 1.0,
        ..Default::default()
    };
    let geometry = CreatureGeometry::new(Vec2::splat(40.0), Vec2::new(40.0, 40.0));
    let mut session = Session::with_geometry(config, geometry).expect("fits");
    session.launch_intruder(Vec2::new(700.0, 50.0)).expect("boat");
    assert!(session.trigger_interception());

    let mut surface = RecordingSurface::default();
    for _ in 0..2_000 {
        session.tick();
        if session.intruder_pending_removal() {
            break;
        }
    }
    assert!(session.intruder_pending_removal());

    session.render(&mut surface);
    assert!(surface.on(Layer::Intruder).is_empty());
    assert!(surface.cleared.contains(&Layer::Intruder));
}

#[test]
fn test_kraken_frames_are_rectangular() {
    for frame in [
        "idle1", "idle2", "swim1", "swim2", "swim3", "eat1", "eat2", "eat3", "swim_flip1",
        "swim_flip2", "swim_flip3", "attack1", "attack2", "attack3",
    ] {
        let sprite = kraken_sprite(frame);
        assert_eq!(sprite.len(), 11, "{frame}");
        for line in &sprite {
            assert_eq!(line.chars().count(), 23, "{frame}: {line:?}");
        }
    }

    // Flipped frames put the tentacles on top.
    assert!(kraken_sprite("attack2")[0].contains("`---"));
    assert!(kraken_sprite("idle1")[0].contains("______"));
}
