use bevy::math::Vec2;

use crate::boundary::WaterRect;
use crate::config::*;

/// A boundary-limited step that moved less than this counts as no progress
pub const STALL_DISTANCE: f32 = 1.0;

/// Result of one movement step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub position: Vec2,
    /// Goal was already within the arrival epsilon; `position` is unchanged
    pub arrived: bool,
    /// Clamping into the legal rectangle altered the step
    pub boundary_limited: bool,
}

impl StepOutcome {
    /// Distance actually travelled from `from`
    pub fn travelled(&self, from: Vec2) -> f32 {
        self.position.distance(from)
    }
}

/// Steps toward `goal` using the default arrival epsilon
pub fn step(current: Vec2, goal: Vec2, rect: &WaterRect, max_step_per_tick: f32) -> StepOutcome {
    step_within(current, goal, rect, max_step_per_tick, ARRIVAL_EPSILON)
}

/// Moves `current` toward `goal` by at most `max_step_per_tick`.
///
/// The step is `min(max_step, distance / 3)`: far from the goal the kraken
/// swims at full speed, and within three steps of it every tick covers a
/// third of what remains, so it decelerates smoothly instead of stopping
/// dead. The result is clamped into `rect` per axis.
pub fn step_within(
    current: Vec2,
    goal: Vec2,
    rect: &WaterRect,
    max_step_per_tick: f32,
    arrival_epsilon: f32,
) -> StepOutcome {
    let to_goal = goal - current;
    let distance = to_goal.length();

    if !distance.is_finite() || distance <= arrival_epsilon {
        return StepOutcome {
            position: current,
            arrived: true,
            boundary_limited: false,
        };
    }

    let step_size = max_step_per_tick.min(distance / EASING_DIVISOR);
    let unclamped = current + to_goal / distance * step_size;
    let position = rect.clamp(unclamped);

    StepOutcome {
        position,
        arrived: false,
        boundary_limited: position != unclamped,
    }
}

/// Counts consecutive boundary-limited steps that made no real progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StuckDetector {
    consecutive: u32,
    threshold: u32,
}

impl StuckDetector {
    pub fn new(threshold: u32) -> Self {
        Self {
            consecutive: 0,
            threshold: threshold.max(1),
        }
    }

    /// Feeds one step; returns true once the kraken has been pinned for
    /// `threshold` ticks in a row
    pub fn observe(&mut self, from: Vec2, outcome: &StepOutcome) -> bool {
        if outcome.boundary_limited && outcome.travelled(from) < STALL_DISTANCE {
            self.consecutive += 1;
        } else {
            self.consecutive = 0;
        }
        self.is_stuck()
    }

    pub fn is_stuck(&self) -> bool {
        self.consecutive >= self.threshold
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn reset(&mut self) {
        self.consecutive = 0;
    }
}
