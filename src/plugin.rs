use std::time::Duration;

use bevy::prelude::*;
use bevy::sprite::Anchor;
use bevy::window::{PrimaryWindow, WindowCloseRequested, WindowResized};
use bevy_egui::{EguiContexts, egui};

use crate::boundary::Container;
use crate::config::*;
use crate::render::{Layer, RenderSurface, StyleKey};
use crate::session::{PointerButton, PointerEvent, Session, SessionEvent};

/// Resource to control simulation state
#[derive(Resource, PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum SimulationState {
    #[default]
    Running,
    Paused,
}

/// Timer resource for behavior ticks
#[derive(Resource)]
pub struct BehaviorTimer(pub Timer);

/// Timer resource for sprite animation frames
#[derive(Resource)]
pub struct AnimationTimer(pub Timer);

/// Marker for text entities drawn on a layer
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drawn(pub Layer);

/// Timers and the tick loop. Needs a [`Session`] resource; runs headless.
pub struct KrakenSimulationPlugin;

impl Plugin for KrakenSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationState>()
            .insert_resource(BehaviorTimer(Timer::from_seconds(
                BEHAVIOR_TICK_INTERVAL,
                TimerMode::Repeating,
            )))
            .insert_resource(AnimationTimer(Timer::from_seconds(
                ANIMATION_INTERVAL,
                TimerMode::Repeating,
            )))
            .add_event::<SessionEvent>()
            .add_systems(
                Update,
                (run_behavior_tick, advance_animation)
                    .chain()
                    .run_if(|state: Res<SimulationState>| *state == SimulationState::Running),
            );
    }
}

/// Windowed front end: input, drawing, resize, teardown and the stats panel
pub struct KrakenPlugin;

impl Plugin for KrakenPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(KrakenSimulationPlugin)
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (buffer_pointer_input, handle_resize).before(run_behavior_tick),
            )
            .add_systems(
                Update,
                (draw_session.after(advance_animation), stop_timers_on_close, ui_system),
            );
    }
}

pub fn run_behavior_tick(
    time: Res<Time>,
    mut timer: ResMut<BehaviorTimer>,
    mut session: ResMut<Session>,
    mut events: EventWriter<SessionEvent>,
) {
    timer.0.tick(time.delta());
    let due = timer.0.times_finished_this_tick();
    if due == 0 {
        return;
    }
    // Catch up if a slow frame spanned several intervals.
    for _ in 0..due {
        session.tick();
    }

    let drained = session.drain_events();
    if !drained.is_empty() {
        debug!("tick {}: {:?}", session.tick_count(), drained);
        events.send_batch(drained);
    }
}

pub fn advance_animation(
    time: Res<Time>,
    mut timer: ResMut<AnimationTimer>,
    mut session: ResMut<Session>,
) {
    if timer.0.tick(time.delta()).just_finished() {
        session.advance_animation();
    }

    // Eating and attacking play faster.
    let interval = Duration::from_secs_f32(session.animation_interval());
    if timer.0.duration() != interval {
        timer.0.set_duration(interval);
    }
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Queues clicks for the next tick; clicks on the egui panel are ignored
pub fn buffer_pointer_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut contexts: EguiContexts,
    mut session: ResMut<Session>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };
    if contexts.ctx_mut().is_pointer_over_area() {
        return;
    }

    for (button, pointer) in [
        (MouseButton::Left, PointerButton::Primary),
        (MouseButton::Right, PointerButton::Secondary),
    ] {
        if mouse_button.just_pressed(button) {
            session.push_input(PointerEvent {
                x: cursor_pos.x,
                y: cursor_pos.y,
                button: pointer,
            });
        }
    }
}

pub fn handle_resize(mut resized: EventReader<WindowResized>, mut session: ResMut<Session>) {
    for event in resized.read() {
        if let Err(err) = session.resize(event.width, event.height) {
            warn!("keeping previous water geometry: {err}");
        }
    }
}

/// Pauses both timers and stops the session so nothing fires after close
pub fn stop_timers_on_close(
    mut closing: EventReader<WindowCloseRequested>,
    mut behavior_timer: ResMut<BehaviorTimer>,
    mut animation_timer: ResMut<AnimationTimer>,
    mut state: ResMut<SimulationState>,
    mut session: ResMut<Session>,
) {
    if closing.read().next().is_none() {
        return;
    }
    behavior_timer.0.pause();
    animation_timer.0.pause();
    *state = SimulationState::Paused;
    session.shutdown();
}

fn parse_color(hex: &str) -> Color {
    Srgba::hex(hex).map(Color::Srgba).unwrap_or(Color::WHITE)
}

fn layer_z(layer: Layer) -> f32 {
    match layer {
        Layer::Environment => 0.0,
        Layer::Food => 1.0,
        Layer::Bubbles => 2.0,
        Layer::Creature => 3.0,
        Layer::Intruder => 4.0,
    }
}

/// Render surface backed by `Text2d` entities
struct BevyCanvas<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    drawn: Vec<(Entity, Layer)>,
    config: &'a KrakenConfig,
    container: Container,
}

impl RenderSurface for BevyCanvas<'_, '_, '_> {
    fn clear(&mut self, layer: Layer) {
        let commands = &mut self.commands;
        self.drawn.retain(|(entity, drawn_on)| {
            if *drawn_on == layer {
                commands.entity(*entity).despawn();
                false
            } else {
                true
            }
        });
    }

    fn draw(&mut self, layer: Layer, lines: &[String], position: Vec2, style: StyleKey) {
        let (color, font_size) = match style {
            StyleKey::Kraken => (&self.config.kraken_color, self.config.font_size),
            StyleKey::Food => (&self.config.food_color, self.config.font_size),
            StyleKey::Bubble { size } => (&self.config.bubble_color, size),
            StyleKey::Boat => (&self.config.boat_color, self.config.font_size),
            StyleKey::Waves => (&self.config.wave_color, self.config.font_size),
        };

        // Canvas space is top-left origin with y down; the camera is centred.
        let world = Vec2::new(
            position.x - self.container.width / 2.0,
            self.container.height / 2.0 - position.y,
        );

        self.commands.spawn((
            Text2d::new(lines.join("\n")),
            TextFont {
                font_size,
                ..default()
            },
            TextColor(parse_color(color)),
            Anchor::TopLeft,
            Transform::from_translation(world.extend(layer_z(layer))),
            Drawn(layer),
        ));
    }
}

/// Redraws the scene whenever the session changed, then confirms any boat
/// the kraken sank so the interception can move on
pub fn draw_session(
    mut commands: Commands,
    mut session: ResMut<Session>,
    drawn: Query<(Entity, &Drawn)>,
) {
    if !session.is_changed() {
        return;
    }

    let mut canvas = BevyCanvas {
        commands: &mut commands,
        drawn: drawn.iter().map(|(entity, d)| (entity, d.0)).collect(),
        config: session.config(),
        container: session.container(),
    };
    session.render(&mut canvas);

    if session.intruder_pending_removal() {
        session.confirm_intruder_removed();
    }
}

fn ui_system(
    mut contexts: EguiContexts,
    mut session: ResMut<Session>,
    mut simulation_state: ResMut<SimulationState>,
) {
    egui::Window::new("Kraken")
        .default_pos(egui::pos2(10.0, 10.0))
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal(|ui| {
                let button_text = if *simulation_state == SimulationState::Running {
                    "⏸ Pause"
                } else {
                    "▶ Resume"
                };

                if ui.button(button_text).clicked() && session.is_running() {
                    *simulation_state = if *simulation_state == SimulationState::Running {
                        SimulationState::Paused
                    } else {
                        SimulationState::Running
                    };
                }

                if ui.button("Clear shrimp").clicked() {
                    let container = session.container();
                    session.push_input(PointerEvent {
                        x: container.width / 2.0,
                        y: container.height / 2.0,
                        button: PointerButton::Secondary,
                    });
                }
            });

            ui.separator();
            let counters = session.counters();
            ui.label(format!("Shrimp eaten: {}", counters.food_eaten));
            ui.label(format!("Boats sunk: {}", counters.intruders_destroyed));

            ui.separator();
            ui.label(format!("State: {:?}", session.state()));
            if let Some(target) = session.target() {
                ui.label(format!("Target: {target}"));
            }
            if let Some(task) = session.interception() {
                ui.label(format!(
                    "Interception: {:?} since tick {}",
                    task.phase(),
                    task.phase_entered_at()
                ));
            }
            ui.label(format!(
                "Queue: {} / {}",
                session.food().len(),
                session.food().capacity()
            ));
            ui.label(format!("Bubbles: {}", session.bubbles().len()));
            ui.label(format!("Ticks: {}", session.tick_count()));

            ui.separator();
            let mut chance = session.config().destroy_probability;
            if ui
                .add(egui::Slider::new(&mut chance, 0.0..=1.0).text("Sink chance"))
                .changed()
            {
                if let Err(err) = session.set_destroy_probability(chance) {
                    warn!("{err}");
                }
            }

            ui.separator();
            ui.label("Controls:");
            ui.label("• Left Click underwater - Drop shrimp");
            ui.label("• Left Click above water - Launch boat");
            ui.label("• Right Click - Clear shrimp");
        });
}
