//! The scripted intruder (a boat sailing along the surface) and the
//! three-phase sequence the kraken runs to intercept it.
use bevy::log::{debug, info, warn};
use bevy::math::Vec2;
use rand::Rng;
use thiserror::Error;

use crate::behavior::{SavedBehavior, TickContext};
use crate::boundary::Container;
use crate::movement::{StepOutcome, StuckDetector};
use crate::session::SessionEvent;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LaunchRejected {
    #[error("a boat is already on the water")]
    AlreadyActive,
    #[error("boats can only be launched from above the water line")]
    NotAboveWater,
}

/// Direction of travel along the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    LeftToRight,
    RightToLeft,
}

impl Heading {
    pub fn sign(self) -> f32 {
        match self {
            Heading::LeftToRight => 1.0,
            Heading::RightToLeft => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntruderStatus {
    Sailing,
    /// Destroyed on `since`; waiting for the renderer to take it off screen
    Sinking { since: u64 },
}

/// The boat. Moves at constant velocity; only one exists at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Intruder {
    /// Left edge of the hull, on the surface line
    pub position: Vec2,
    pub heading: Heading,
    pub speed: f32,
    pub width: f32,
    pub status: IntruderStatus,
    /// Set once the kraken has reacted, so a boat is only hunted once
    pub triggered: bool,
}

impl Intruder {
    /// Launches from the edge farther from the click, sailing toward the other
    pub fn launch(click: Vec2, container: Container, surface_y: f32, speed: f32, width: f32) -> Self {
        let (x, heading) = if click.x >= container.width / 2.0 {
            (-width, Heading::LeftToRight)
        } else {
            (container.width, Heading::RightToLeft)
        };
        Self {
            position: Vec2::new(x, surface_y),
            heading,
            speed,
            width,
            status: IntruderStatus::Sailing,
            triggered: false,
        }
    }

    pub fn is_sailing(&self) -> bool {
        self.status == IntruderStatus::Sailing
    }

    pub fn advance(&mut self) {
        if self.is_sailing() {
            self.position.x += self.heading.sign() * self.speed;
        }
    }

    /// X of the leading edge
    pub fn bow_x(&self) -> f32 {
        match self.heading {
            Heading::LeftToRight => self.position.x + self.width,
            Heading::RightToLeft => self.position.x,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.position.x + self.width / 2.0
    }

    /// True once the hull has completely left the container
    pub fn is_off_screen(&self, container_width: f32) -> bool {
        match self.heading {
            Heading::LeftToRight => self.position.x > container_width,
            Heading::RightToLeft => self.position.x + self.width < 0.0,
        }
    }

    /// True once the bow has sailed `fraction` of the width in from its entry edge
    pub fn crossed_trigger(&self, container_width: f32, fraction: f32) -> bool {
        let line = container_width * fraction;
        match self.heading {
            Heading::LeftToRight => self.bow_x() >= line,
            Heading::RightToLeft => self.bow_x() <= container_width - line,
        }
    }

    pub fn sink(&mut self, tick: u64) {
        self.status = IntruderStatus::Sinking { since: tick };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Approach,
    Engage,
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Destroyed,
    Escaped,
}

/// What the sequencer wants the behavior layer to do after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerSignal {
    Continue,
    Finished,
}

/// One running interception
#[derive(Debug, Clone, PartialEq)]
pub struct InterceptionTask {
    phase: Phase,
    phase_entered_at: u64,
    phase_ticks: u32,
    saved: SavedBehavior,
    outcome: Option<Outcome>,
    stuck: StuckDetector,
}

impl InterceptionTask {
    pub fn new(saved: SavedBehavior, tick: u64, stuck_ticks: u32) -> Self {
        Self {
            phase: Phase::Approach,
            phase_entered_at: tick,
            phase_ticks: 0,
            saved,
            outcome: None,
            stuck: StuckDetector::new(stuck_ticks),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn phase_entered_at(&self) -> u64 {
        self.phase_entered_at
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn saved(&self) -> SavedBehavior {
        self.saved
    }

    fn enter(&mut self, phase: Phase, tick: u64) {
        debug!("interception {:?} -> {:?} on tick {tick}", self.phase, phase);
        self.phase = phase;
        self.phase_entered_at = tick;
        self.phase_ticks = 0;
        self.stuck.reset();
    }

    /// Goal anchor and step size for this tick
    pub fn goal(&self, ctx: &TickContext) -> (Vec2, f32) {
        let creature = &*ctx.creature;
        let boat = ctx.intruder.as_ref();
        match self.phase {
            Phase::Approach => {
                // Lead the boat: aim ahead of its bow, as high as the water allows.
                let x = boat
                    .map(|b| b.bow_x() + b.heading.sign() * ctx.config.approach_lead)
                    .unwrap_or(creature.center().x);
                let goal = Vec2::new(creature.anchor_x_centred_on(x), ctx.rect.min_y);
                (ctx.rect.clamp(goal), ctx.config.hunt_step)
            }
            Phase::Engage => {
                let x = boat.map(|b| b.center_x()).unwrap_or(creature.center().x);
                let goal = Vec2::new(creature.anchor_x_centred_on(x), ctx.rect.min_y);
                (ctx.rect.clamp(goal), ctx.config.engage_step)
            }
            Phase::Return => {
                let goal = self
                    .saved
                    .target
                    .and_then(|id| ctx.food.get(id))
                    .map(|item| creature.anchor_for_effector(item.position))
                    .unwrap_or(self.saved.resume_at);
                (ctx.rect.clamp(goal), ctx.config.hunt_step)
            }
        }
    }

    /// Advances the phase machine after the kraken has moved this tick
    pub fn after_step(
        &mut self,
        from: Vec2,
        goal: Vec2,
        outcome: &StepOutcome,
        ctx: &mut TickContext,
    ) -> SequencerSignal {
        self.phase_ticks += 1;
        let tick = ctx.tick;

        match self.phase {
            Phase::Approach => {
                if !ctx.intruder.as_ref().is_some_and(Intruder::is_sailing) {
                    info!("boat left before the kraken reached it");
                    ctx.events.push(SessionEvent::IntruderEscaped);
                    self.outcome = Some(Outcome::Escaped);
                    self.enter(Phase::Return, tick);
                } else if outcome.position.distance(goal) < ctx.config.engage_distance {
                    self.enter(Phase::Engage, tick);
                }
            }
            Phase::Engage => self.engage(ctx),
            Phase::Return => {
                if outcome.arrived || self.stuck.observe(from, outcome) {
                    debug!("interception finished on tick {tick}");
                    return SequencerSignal::Finished;
                }
            }
        }
        SequencerSignal::Continue
    }

    fn engage(&mut self, ctx: &mut TickContext) {
        let tick = ctx.tick;
        match self.outcome {
            None => {
                let Some(boat) = ctx.intruder.as_mut() else {
                    info!("boat sailed off during the attack");
                    ctx.events.push(SessionEvent::IntruderEscaped);
                    self.outcome = Some(Outcome::Escaped);
                    self.enter(Phase::Return, tick);
                    return;
                };
                if self.phase_ticks < ctx.config.engage_ticks {
                    return;
                }
                // Decided once; Return starts on a later tick so the removal
                // can be shown first.
                if ctx.rng.gen_bool(ctx.config.destroy_probability) {
                    boat.sink(tick);
                    ctx.counters.intruders_destroyed += 1;
                    ctx.events.push(SessionEvent::IntruderDestroyed);
                    info!("kraken sank the boat");
                    self.outcome = Some(Outcome::Destroyed);
                } else {
                    ctx.events.push(SessionEvent::IntruderEscaped);
                    info!("boat escaped the kraken");
                    self.outcome = Some(Outcome::Escaped);
                }
            }
            Some(Outcome::Destroyed) => match ctx.intruder.as_ref().map(|b| b.status) {
                None => self.enter(Phase::Return, tick),
                Some(IntruderStatus::Sinking { since })
                    if tick.saturating_sub(since) > u64::from(ctx.config.removal_grace_ticks) =>
                {
                    warn!("renderer never confirmed the sunk boat; removing it");
                    *ctx.intruder = None;
                    self.enter(Phase::Return, tick);
                }
                Some(_) => {}
            },
            Some(Outcome::Escaped) => self.enter(Phase::Return, tick),
        }
    }
}
