//! Top-level arbiter: decides each tick whether the kraken idles, hunts
//! shrimp, eats, or runs an interception, and which animation plays.
use bevy::log::debug;
use bevy::math::Vec2;
use rand::Rng;
use rand::rngs::StdRng;

use crate::boundary::WaterRect;
use crate::config::KrakenConfig;
use crate::creature::Creature;
use crate::food::{FoodId, FoodQueue};
use crate::intercept::{InterceptionTask, Intruder, Phase, SequencerSignal};
use crate::movement::{StuckDetector, step_within};
use crate::session::{Counters, SessionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorState {
    Idle,
    Seeking,
    Eating,
    Intercepting,
}

/// What was going on when an interception pre-empted normal behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedBehavior {
    pub state: BehaviorState,
    pub target: Option<FoodId>,
    /// Where the kraken was; used as the resting spot if the target is gone
    pub resume_at: Vec2,
}

/// Mutable view of the session handed to the state machine for one tick
pub struct TickContext<'a> {
    pub config: &'a KrakenConfig,
    pub rect: WaterRect,
    pub creature: &'a mut Creature,
    pub food: &'a mut FoodQueue,
    pub intruder: &'a mut Option<Intruder>,
    pub rng: &'a mut StdRng,
    pub events: &'a mut Vec<SessionEvent>,
    pub counters: &'a mut Counters,
    pub tick: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Behavior {
    state: BehaviorState,
    target: Option<FoodId>,
    dwell: u32,
    idle_ticks: u32,
    wander_goal: Option<Vec2>,
    stuck: StuckDetector,
    interception: Option<InterceptionTask>,
}

impl Behavior {
    pub fn new(stuck_ticks: u32) -> Self {
        Self {
            state: BehaviorState::Idle,
            target: None,
            dwell: 0,
            idle_ticks: 0,
            wander_goal: None,
            stuck: StuckDetector::new(stuck_ticks),
            interception: None,
        }
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn target(&self) -> Option<FoodId> {
        self.target
    }

    pub fn interception(&self) -> Option<&InterceptionTask> {
        self.interception.as_ref()
    }

    /// Animation cycle key for the current state
    pub fn animation_key(&self) -> &'static str {
        match self.state {
            BehaviorState::Idle => "idle",
            BehaviorState::Seeking => "swimming",
            BehaviorState::Eating => "eating",
            BehaviorState::Intercepting => match self.interception.as_ref().map(|t| t.phase()) {
                Some(Phase::Approach) => "swimming_flip",
                Some(Phase::Engage) => "attacking",
                _ => "swimming",
            },
        }
    }

    /// Eating and attacking animate faster
    pub fn animation_is_fast(&self) -> bool {
        matches!(self.animation_key(), "eating" | "attacking")
    }

    /// Pre-empts whatever is going on; no-op unless a boat is sailing that
    /// has not been hunted yet and no interception is already running
    pub fn begin_interception(&mut self, ctx: &mut TickContext) -> bool {
        if self.state == BehaviorState::Intercepting {
            return false;
        }
        let Some(boat) = ctx
            .intruder
            .as_mut()
            .filter(|b| b.is_sailing() && !b.triggered)
        else {
            return false;
        };
        boat.triggered = true;

        let saved = SavedBehavior {
            state: self.state,
            target: self.target,
            resume_at: ctx.creature.position,
        };
        debug!("interception pre-empts {:?} (target {:?})", saved.state, saved.target);
        self.interception = Some(InterceptionTask::new(
            saved,
            ctx.tick,
            ctx.config.stuck_ticks,
        ));
        self.state = BehaviorState::Intercepting;
        self.wander_goal = None;
        self.dwell = 0;
        self.stuck.reset();
        ctx.events.push(SessionEvent::InterceptionStarted);
        true
    }

    /// Runs one behavior tick: picks a goal, moves, and transitions
    pub fn update(&mut self, ctx: &mut TickContext) {
        match self.state {
            BehaviorState::Idle => self.update_idle(ctx),
            BehaviorState::Seeking => self.update_seeking(ctx),
            BehaviorState::Eating => self.update_eating(ctx),
            BehaviorState::Intercepting => self.update_intercepting(ctx),
        }
    }

    fn update_idle(&mut self, ctx: &mut TickContext) {
        if !ctx.food.is_empty() {
            self.begin_seeking(ctx);
            self.update_seeking(ctx);
            return;
        }

        if let Some(goal) = self.wander_goal {
            let from = ctx.creature.position;
            let outcome = step_within(
                from,
                goal,
                &ctx.rect,
                ctx.config.idle_step,
                ctx.config.arrival_epsilon,
            );
            ctx.creature.position = outcome.position;
            if outcome.arrived || self.stuck.observe(from, &outcome) {
                self.wander_goal = None;
                self.stuck.reset();
            }
            return;
        }

        self.idle_ticks += 1;
        if self.idle_ticks >= ctx.config.idle_wander_ticks {
            self.idle_ticks = 0;
            if ctx.rng.gen_bool(ctx.config.idle_wander_chance) {
                let goal = ctx.rect.random_point(&mut *ctx.rng);
                debug!("kraken wanders to ({:.0}, {:.0})", goal.x, goal.y);
                self.wander_goal = Some(goal);
            }
        }
    }

    fn begin_seeking(&mut self, ctx: &mut TickContext) {
        self.target = ctx.food.select_nearest(ctx.creature.position);
        self.state = BehaviorState::Seeking;
        self.wander_goal = None;
        self.stuck.reset();
        if let Some(id) = self.target {
            debug!("kraken targeting {id}");
        }
    }

    fn update_seeking(&mut self, ctx: &mut TickContext) {
        let Some(item) = self.target.and_then(|id| ctx.food.get(id)).copied() else {
            self.reevaluate(ctx);
            return;
        };

        // Aim the mouth at the shrimp; where the body cannot follow, the
        // nearest legal anchor counts as reaching it.
        let from = ctx.creature.position;
        let goal = ctx.rect.clamp(ctx.creature.anchor_for_effector(item.position));
        let outcome = step_within(
            from,
            goal,
            &ctx.rect,
            ctx.config.hunt_step,
            ctx.config.arrival_epsilon,
        );
        ctx.creature.position = outcome.position;

        if outcome.arrived || self.stuck.observe(from, &outcome) {
            let gap = ctx.creature.effector().distance(item.position);
            if gap > ctx.config.contact_tolerance {
                debug!("{} reached from the edge of the water, {gap:.1}px away", item.id);
            }
            self.begin_eating();
        }
    }

    fn begin_eating(&mut self) {
        self.state = BehaviorState::Eating;
        self.dwell = 0;
        self.stuck.reset();
    }

    fn update_eating(&mut self, ctx: &mut TickContext) {
        let Some(id) = self.target.filter(|id| ctx.food.contains(*id)) else {
            self.reevaluate(ctx);
            return;
        };

        self.dwell += 1;
        if self.dwell >= ctx.config.eating_dwell_ticks {
            if ctx.food.complete(id).is_some() {
                ctx.counters.food_eaten += 1;
                ctx.events.push(SessionEvent::FoodEaten(id));
            }
            self.reevaluate(ctx);
        }
    }

    fn update_intercepting(&mut self, ctx: &mut TickContext) {
        let Some(task) = self.interception.as_mut() else {
            self.reevaluate(ctx);
            return;
        };

        let (goal, max_step) = task.goal(ctx);
        let from = ctx.creature.position;
        let outcome = step_within(from, goal, &ctx.rect, max_step, ctx.config.arrival_epsilon);
        ctx.creature.position = outcome.position;

        if task.after_step(from, goal, &outcome, ctx) == SequencerSignal::Finished {
            let saved = task.saved();
            self.interception = None;
            self.restore(saved, ctx);
        }
    }

    /// Puts back what the interception interrupted
    fn restore(&mut self, saved: SavedBehavior, ctx: &mut TickContext) {
        let target = saved.target.filter(|id| ctx.food.contains(*id));
        match (saved.state, target) {
            (BehaviorState::Seeking | BehaviorState::Eating, Some(id)) => {
                debug!("resuming hunt for {id}");
                self.state = BehaviorState::Seeking;
                self.target = Some(id);
                self.stuck.reset();
            }
            _ => self.go_idle(),
        }
        ctx.events.push(SessionEvent::InterceptionFinished);
    }

    /// Picks the next shrimp, measured from where the kraken is now
    fn reevaluate(&mut self, ctx: &mut TickContext) {
        if ctx.food.is_empty() {
            self.go_idle();
        } else {
            self.begin_seeking(ctx);
        }
    }

    fn go_idle(&mut self) {
        self.state = BehaviorState::Idle;
        self.target = None;
        self.dwell = 0;
        self.idle_ticks = 0;
        self.stuck.reset();
    }
}
