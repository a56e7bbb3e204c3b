//! The session aggregate: owns the kraken, the shrimp queue, the bubbles and
//! the boat, and advances them one behavior tick at a time.
use bevy::log::{debug, info, warn};
use bevy::math::Vec2;
use bevy::prelude::{Event, Resource};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::behavior::{Behavior, BehaviorState, TickContext};
use crate::boundary::{Container, SetupError, WaterGeometry, WaterRect};
use crate::bubbles::Bubbles;
use crate::config::KrakenConfig;
use crate::creature::{Creature, CreatureGeometry};
use crate::food::{FoodId, FoodQueue, FoodRejected};
use crate::intercept::{Heading, InterceptionTask, Intruder, IntruderStatus, LaunchRejected};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

/// Raw click in container coordinates (origin top-left, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub button: PointerButton,
}

impl PointerEvent {
    pub fn primary(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            button: PointerButton::Primary,
        }
    }
}

/// Things that happened during a tick, for front ends to react to
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SessionEvent {
    FoodAccepted(FoodId),
    FoodRejected(FoodRejected),
    FoodEaten(FoodId),
    FoodCleared(usize),
    IntruderLaunched(Heading),
    IntruderDestroyed,
    IntruderEscaped,
    IntruderRetired,
    InterceptionStarted,
    InterceptionFinished,
}

/// On-screen score counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub food_eaten: u64,
    pub intruders_destroyed: u64,
}

#[derive(Resource, Debug)]
pub struct Session {
    config: KrakenConfig,
    geometry: WaterGeometry,
    container: Container,
    rect: WaterRect,
    creature: Creature,
    food: FoodQueue,
    bubbles: Bubbles,
    intruder: Option<Intruder>,
    behavior: Behavior,
    counters: Counters,
    pending_input: Vec<PointerEvent>,
    events: Vec<SessionEvent>,
    rng: StdRng,
    tick: u64,
    frames: u64,
    running: bool,
}

impl Session {
    /// Builds a session sized from the config; fails if the kraken cannot fit
    pub fn new(config: KrakenConfig) -> Result<Self, SetupError> {
        let creature_geometry = CreatureGeometry::from_config(&config);
        Self::with_geometry(config, creature_geometry)
    }

    pub fn with_geometry(
        config: KrakenConfig,
        creature_geometry: CreatureGeometry,
    ) -> Result<Self, SetupError> {
        config.validate()?;

        let geometry = WaterGeometry::from_config(&config);
        let container = Container::new(config.container_width, config.container_height);
        let rect = geometry.legal_region(
            container.width,
            container.height,
            creature_geometry.half_extents,
        )?;

        // Start centred, two thirds of the way down.
        let start = rect.clamp(Vec2::new(
            container.width / 2.0 - creature_geometry.half_extents.x,
            container.height * 2.0 / 3.0,
        ));

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            "kraken session {}x{}, legal region x {:.0}..{:.0}, y {:.0}..{:.0}",
            container.width, container.height, rect.min_x, rect.max_x, rect.min_y, rect.max_y
        );

        Ok(Self {
            food: FoodQueue::new(config.food_capacity, config.food_min_separation),
            bubbles: Bubbles::new(
                config.bubble_spawn_chance,
                config.bubble_rise_rate,
                config.bubble_retire_margin,
            ),
            behavior: Behavior::new(config.stuck_ticks),
            creature: Creature::new(start, creature_geometry),
            config,
            geometry,
            container,
            rect,
            intruder: None,
            counters: Counters::default(),
            pending_input: Vec::new(),
            events: Vec::new(),
            rng,
            tick: 0,
            frames: 0,
            running: true,
        })
    }

    /// Buffers a click; it is applied at the start of the next tick
    pub fn push_input(&mut self, event: PointerEvent) {
        self.pending_input.push(event);
    }

    /// One behavior tick: input, boat, state machine and movement, bubbles
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.tick += 1;

        self.apply_pending_input();
        self.advance_intruder();

        let mut ctx = TickContext {
            config: &self.config,
            rect: self.rect,
            creature: &mut self.creature,
            food: &mut self.food,
            intruder: &mut self.intruder,
            rng: &mut self.rng,
            events: &mut self.events,
            counters: &mut self.counters,
            tick: self.tick,
        };
        let triggered = ctx
            .intruder
            .as_ref()
            .is_some_and(|b| {
                b.is_sailing()
                    && !b.triggered
                    && b.crossed_trigger(self.container.width, self.config.boat_trigger_fraction)
            });
        if triggered {
            self.behavior.begin_interception(&mut ctx);
        }
        self.behavior.update(&mut ctx);
        self.creature.animation.play(self.behavior.animation_key());

        let band = self.geometry.bubble_band(self.container);
        let surface_y = self.geometry.surface_y(self.container.height);
        if let Err(err) = self.bubbles.tick(&mut self.rng, band, surface_y, self.tick) {
            debug!("bubble spawn skipped: {err}");
        }
    }

    fn apply_pending_input(&mut self) {
        for event in std::mem::take(&mut self.pending_input) {
            let point = Vec2::new(event.x, event.y);
            match event.button {
                PointerButton::Primary if self.geometry.is_above_water(point, self.container) => {
                    if let Err(err) = self.launch_intruder(point) {
                        debug!("click at ({:.0}, {:.0}) ignored: {err}", point.x, point.y);
                    }
                }
                PointerButton::Primary => {
                    if let Err(err) = self.enqueue_food(point.x, point.y) {
                        warn!("shrimp rejected: {err}");
                    }
                }
                PointerButton::Secondary => {
                    let removed = self.food.clear();
                    if removed > 0 {
                        info!("cleared {removed} shrimp");
                        self.events.push(SessionEvent::FoodCleared(removed));
                    }
                }
                PointerButton::Other => {}
            }
        }
    }

    fn advance_intruder(&mut self) {
        let Some(boat) = self.intruder.as_mut() else {
            return;
        };
        boat.advance();
        if boat.is_sailing() && boat.is_off_screen(self.container.width) {
            debug!("boat sailed off screen");
            self.intruder = None;
            self.events.push(SessionEvent::IntruderRetired);
        }
    }

    /// Drops a shrimp right away, bypassing the input buffer
    pub fn enqueue_food(&mut self, x: f32, y: f32) -> Result<FoodId, FoodRejected> {
        match self.food.enqueue(Vec2::new(x, y), &self.rect, self.tick) {
            Ok(id) => {
                self.events.push(SessionEvent::FoodAccepted(id));
                Ok(id)
            }
            Err(err) => {
                self.events.push(SessionEvent::FoodRejected(err));
                Err(err)
            }
        }
    }

    /// Puts a boat on the water, entering from the side away from `click`
    pub fn launch_intruder(&mut self, click: Vec2) -> Result<Heading, LaunchRejected> {
        if self.intruder.is_some() {
            return Err(LaunchRejected::AlreadyActive);
        }
        if !self.geometry.is_above_water(click, self.container) {
            return Err(LaunchRejected::NotAboveWater);
        }
        let boat = Intruder::launch(
            click,
            self.container,
            self.geometry.surface_y(self.container.height),
            self.config.boat_speed,
            self.config.boat_width,
        );
        let heading = boat.heading;
        info!("boat launched heading {heading:?}");
        self.intruder = Some(boat);
        self.events.push(SessionEvent::IntruderLaunched(heading));
        Ok(heading)
    }

    /// Fires the interception now instead of waiting for the boat to cross
    /// the trigger line. No-op without a sailing boat.
    pub fn trigger_interception(&mut self) -> bool {
        let mut ctx = TickContext {
            config: &self.config,
            rect: self.rect,
            creature: &mut self.creature,
            food: &mut self.food,
            intruder: &mut self.intruder,
            rng: &mut self.rng,
            events: &mut self.events,
            counters: &mut self.counters,
            tick: self.tick,
        };
        let started = self.behavior.begin_interception(&mut ctx);
        if started {
            self.creature.animation.play(self.behavior.animation_key());
        }
        started
    }

    /// A sunk boat is waiting for the renderer to take it off screen
    pub fn intruder_pending_removal(&self) -> bool {
        matches!(
            self.intruder.as_ref().map(|b| b.status),
            Some(IntruderStatus::Sinking { .. })
        )
    }

    /// Called by the renderer once a sunk boat is no longer drawn
    pub fn confirm_intruder_removed(&mut self) {
        if self.intruder_pending_removal() {
            self.intruder = None;
        }
    }

    /// Steps the sprite animation; driven by its own, slower timer
    pub fn advance_animation(&mut self) {
        if !self.running {
            return;
        }
        self.creature.animation.play(self.behavior.animation_key());
        self.creature.animation.advance();
        self.frames += 1;
    }

    /// Seconds until the next animation frame
    pub fn animation_interval(&self) -> f32 {
        if self.behavior.animation_is_fast() {
            crate::config::ANIMATION_INTERVAL_FAST
        } else {
            crate::config::ANIMATION_INTERVAL
        }
    }

    /// Adopts a new container size. On failure the old geometry stays.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), SetupError> {
        let rect = self.geometry.legal_region(
            width,
            height,
            self.creature.geometry.half_extents,
        )?;
        self.container = Container::new(width, height);
        self.rect = rect;
        self.creature.position = rect.clamp(self.creature.position);
        info!("resized to {width}x{height}");
        Ok(())
    }

    /// Moves the kraken, clamped into the legal region
    pub fn place_creature(&mut self, position: Vec2) {
        self.creature.position = self.rect.clamp(position);
    }

    pub fn set_destroy_probability(&mut self, probability: f64) -> Result<(), SetupError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(SetupError::InvalidConfig {
                field: "destroy_probability",
                reason: format!("{probability} is not a probability"),
            });
        }
        self.config.destroy_probability = probability;
        Ok(())
    }

    /// Stops the session; later ticks do nothing
    pub fn shutdown(&mut self) {
        if self.running {
            info!("kraken session stopped after {} ticks", self.tick);
        }
        self.running = false;
        self.pending_input.clear();
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> BehaviorState {
        self.behavior.state()
    }

    pub fn target(&self) -> Option<FoodId> {
        self.behavior.target()
    }

    pub fn interception(&self) -> Option<&InterceptionTask> {
        self.behavior.interception()
    }

    pub fn creature(&self) -> &Creature {
        &self.creature
    }

    pub fn food(&self) -> &FoodQueue {
        &self.food
    }

    pub fn bubbles(&self) -> &Bubbles {
        &self.bubbles
    }

    pub fn bubbles_mut(&mut self) -> &mut Bubbles {
        &mut self.bubbles
    }

    pub fn intruder(&self) -> Option<&Intruder> {
        self.intruder.as_ref()
    }

    pub fn rect(&self) -> WaterRect {
        self.rect
    }

    pub fn water(&self) -> WaterGeometry {
        self.geometry
    }

    pub fn container(&self) -> Container {
        self.container
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn config(&self) -> &KrakenConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Animation frames shown so far; drives the waves
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}
