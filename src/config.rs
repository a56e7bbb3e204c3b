//! Configuration constants for the kraken aquarium
use bevy::prelude::*;

use crate::boundary::SetupError;

// ============================================================================
// WORLD GEOMETRY
// ============================================================================

/// Default container width in pixels
pub const DEFAULT_CONTAINER_WIDTH: f32 = 800.0;

/// Default container height in pixels
pub const DEFAULT_CONTAINER_HEIGHT: f32 = 600.0;

/// Fraction of the container height above the water (surface line sits at height * fraction)
pub const SURFACE_FRACTION: f32 = 0.2;

/// Height of the two animated wave lines drawn under the surface line
pub const SURFACE_BAND_HEIGHT: f32 = 20.0;

/// Distance of the ocean floor from the bottom of the container
pub const FLOOR_OFFSET: f32 = 50.0;

/// Horizontal clearance kept between the creature and the container sides
pub const SIDE_MARGIN: f32 = 10.0;

// ============================================================================
// CREATURE
// ============================================================================

/// Kraken sprite height in text rows
pub const SPRITE_ROWS: u32 = 11;

/// Kraken sprite width in characters
pub const SPRITE_COLS: u32 = 23;

/// Row (0-indexed) holding the kraken's mouth
pub const MOUTH_ROW: u32 = 5;

/// Base font size for every sprite
pub const FONT_SIZE: f32 = 10.0;

/// Extra spacing between sprite rows
pub const LINE_SPACING: f32 = 2.0;

/// Advance width of one monospace character
pub const CHAR_WIDTH: f32 = 6.0;

// ============================================================================
// FOOD
// ============================================================================

/// Maximum number of shrimp waiting in the water at once
pub const FOOD_CAPACITY: usize = 20;

/// Minimum distance between two queued shrimp
pub const FOOD_MIN_SEPARATION: f32 = 80.0;

/// Number of ticks spent chewing before a shrimp counts as eaten
pub const EATING_DWELL_TICKS: u32 = 15;

/// Contact distance accepted when the creature is pinned against a boundary
pub const CONTACT_TOLERANCE: f32 = 50.0;

// ============================================================================
// MOVEMENT
// ============================================================================

/// Distance below which a goal counts as reached
pub const ARRIVAL_EPSILON: f32 = 5.0;

/// Remaining distance is divided by this to ease in/out near the goal
pub const EASING_DIVISOR: f32 = 3.0;

/// Maximum step per tick while hunting food or approaching an intruder
pub const HUNT_STEP: f32 = 8.0;

/// Maximum step per tick while tracking an intruder during the engage phase
pub const ENGAGE_STEP: f32 = 4.0;

/// Maximum step per tick while drifting idly
pub const IDLE_STEP: f32 = 2.0;

/// Consecutive boundary-limited ticks that count as stuck
pub const STUCK_TICKS: u32 = 5;

/// Idle ticks before the creature considers wandering
pub const IDLE_WANDER_TICKS: u32 = 100;

/// Chance to start wandering once the idle counter expires
pub const IDLE_WANDER_CHANCE: f64 = 0.3;

// ============================================================================
// INTERCEPTION
// ============================================================================

/// Intruder (boat) speed in pixels per tick
pub const BOAT_SPEED: f32 = 3.0;

/// Boat sprite width in pixels
pub const BOAT_WIDTH: f32 = 16.0 * CHAR_WIDTH;

/// Fraction of the container width the boat must cross before the kraken reacts
pub const BOAT_TRIGGER_FRACTION: f32 = 0.2;

/// How far ahead of the boat the kraken aims while approaching
pub const APPROACH_LEAD: f32 = 60.0;

/// Distance to the lead point that ends the approach phase
pub const ENGAGE_DISTANCE: f32 = 30.0;

/// Length of the engage phase in ticks
pub const ENGAGE_TICKS: u32 = 30;

/// Chance that an engaged boat is destroyed
pub const DESTROY_PROBABILITY: f64 = 0.8;

/// Ticks to wait for the renderer to confirm a sunk boat was removed
pub const REMOVAL_GRACE_TICKS: u32 = 10;

// ============================================================================
// BUBBLES
// ============================================================================

/// Chance per tick of spawning one bubble
pub const BUBBLE_SPAWN_CHANCE: f64 = 0.05;

/// Pixels a bubble rises per tick
pub const BUBBLE_RISE_RATE: f32 = 2.0;

/// Bubbles retire this far below the surface line
pub const BUBBLE_RETIRE_MARGIN: f32 = 15.0;

/// Bubbles spawn at least this far below the wave band
pub const BUBBLE_TOP_MARGIN: f32 = 10.0;

/// Bubbles spawn at least this far above the container bottom
pub const BUBBLE_BOTTOM_MARGIN: f32 = 60.0;

/// Glyphs for small and medium bubbles
pub const BUBBLE_GLYPHS: [&str; 6] = ["○", "∘", "·", "°", "●", "○"];

/// Font sizes a bubble may be drawn with
pub const BUBBLE_SIZES: [f32; 4] = [10.0, 12.0, 14.0, 16.0];

// ============================================================================
// TIMING
// ============================================================================

/// Interval in seconds between behavior ticks
pub const BEHAVIOR_TICK_INTERVAL: f32 = 0.1;

/// Interval in seconds between animation frames
pub const ANIMATION_INTERVAL: f32 = 0.5;

/// Faster animation interval used while eating or attacking
pub const ANIMATION_INTERVAL_FAST: f32 = 0.3;

// ============================================================================
// COLORS
// ============================================================================

pub const BACKGROUND_COLOR: &str = "#0A0F1C";
pub const KRAKEN_COLOR: &str = "#E0C6FF";
pub const FOOD_COLOR: &str = "#FFB6C1";
pub const BUBBLE_COLOR: &str = "#FFFFFF";
pub const BOAT_COLOR: &str = "#FFFFFF";
pub const WAVE_COLOR: &str = "#4A90E2";

/// Every tunable of a session, collected so front ends can override them
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct KrakenConfig {
    pub container_width: f32,
    pub container_height: f32,
    pub surface_fraction: f32,
    pub surface_band_height: f32,
    pub floor_offset: f32,
    pub side_margin: f32,

    pub sprite_rows: u32,
    pub sprite_cols: u32,
    pub mouth_row: u32,
    pub font_size: f32,
    pub line_spacing: f32,
    pub char_width: f32,

    pub food_capacity: usize,
    pub food_min_separation: f32,
    pub eating_dwell_ticks: u32,
    pub contact_tolerance: f32,

    pub arrival_epsilon: f32,
    pub hunt_step: f32,
    pub engage_step: f32,
    pub idle_step: f32,
    pub stuck_ticks: u32,
    pub idle_wander_ticks: u32,
    pub idle_wander_chance: f64,

    pub boat_speed: f32,
    pub boat_width: f32,
    pub boat_trigger_fraction: f32,
    pub approach_lead: f32,
    pub engage_distance: f32,
    pub engage_ticks: u32,
    pub destroy_probability: f64,
    pub removal_grace_ticks: u32,

    pub bubble_spawn_chance: f64,
    pub bubble_rise_rate: f32,
    pub bubble_retire_margin: f32,

    pub kraken_color: String,
    pub food_color: String,
    pub bubble_color: String,
    pub boat_color: String,
    pub wave_color: String,
    pub background_color: String,

    /// Seed for the session RNG; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for KrakenConfig {
    fn default() -> Self {
        Self {
            container_width: DEFAULT_CONTAINER_WIDTH,
            container_height: DEFAULT_CONTAINER_HEIGHT,
            surface_fraction: SURFACE_FRACTION,
            surface_band_height: SURFACE_BAND_HEIGHT,
            floor_offset: FLOOR_OFFSET,
            side_margin: SIDE_MARGIN,
            sprite_rows: SPRITE_ROWS,
            sprite_cols: SPRITE_COLS,
            mouth_row: MOUTH_ROW,
            font_size: FONT_SIZE,
            line_spacing: LINE_SPACING,
            char_width: CHAR_WIDTH,
            food_capacity: FOOD_CAPACITY,
            food_min_separation: FOOD_MIN_SEPARATION,
            eating_dwell_ticks: EATING_DWELL_TICKS,
            contact_tolerance: CONTACT_TOLERANCE,
            arrival_epsilon: ARRIVAL_EPSILON,
            hunt_step: HUNT_STEP,
            engage_step: ENGAGE_STEP,
            idle_step: IDLE_STEP,
            stuck_ticks: STUCK_TICKS,
            idle_wander_ticks: IDLE_WANDER_TICKS,
            idle_wander_chance: IDLE_WANDER_CHANCE,
            boat_speed: BOAT_SPEED,
            boat_width: BOAT_WIDTH,
            boat_trigger_fraction: BOAT_TRIGGER_FRACTION,
            approach_lead: APPROACH_LEAD,
            engage_distance: ENGAGE_DISTANCE,
            engage_ticks: ENGAGE_TICKS,
            destroy_probability: DESTROY_PROBABILITY,
            removal_grace_ticks: REMOVAL_GRACE_TICKS,
            bubble_spawn_chance: BUBBLE_SPAWN_CHANCE,
            bubble_rise_rate: BUBBLE_RISE_RATE,
            bubble_retire_margin: BUBBLE_RETIRE_MARGIN,
            kraken_color: KRAKEN_COLOR.to_string(),
            food_color: FOOD_COLOR.to_string(),
            bubble_color: BUBBLE_COLOR.to_string(),
            boat_color: BOAT_COLOR.to_string(),
            wave_color: WAVE_COLOR.to_string(),
            background_color: BACKGROUND_COLOR.to_string(),
            seed: None,
        }
    }
}

impl KrakenConfig {
    /// Rejects tunables that would make the behavior core misbehave.
    pub fn validate(&self) -> Result<(), SetupError> {
        let probabilities = [
            ("destroy_probability", self.destroy_probability),
            ("bubble_spawn_chance", self.bubble_spawn_chance),
            ("idle_wander_chance", self.idle_wander_chance),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(SetupError::InvalidConfig {
                    field: name,
                    reason: format!("{value} is not a probability"),
                });
            }
        }

        let steps = [
            ("hunt_step", self.hunt_step),
            ("engage_step", self.engage_step),
            ("idle_step", self.idle_step),
            ("bubble_rise_rate", self.bubble_rise_rate),
            ("arrival_epsilon", self.arrival_epsilon),
        ];
        for (name, value) in steps {
            if !(value.is_finite() && value > 0.0) {
                return Err(SetupError::InvalidConfig {
                    field: name,
                    reason: format!("{value} must be positive"),
                });
            }
        }

        if self.food_capacity == 0 {
            return Err(SetupError::InvalidConfig {
                field: "food_capacity",
                reason: "at least one shrimp must fit".to_string(),
            });
        }
        if self.stuck_ticks == 0 || self.engage_ticks == 0 {
            return Err(SetupError::InvalidConfig {
                field: "stuck_ticks/engage_ticks",
                reason: "tick counts must be non-zero".to_string(),
            });
        }

        Ok(())
    }

    /// Height of one rendered sprite row
    pub fn line_height(&self) -> f32 {
        self.font_size + self.line_spacing
    }
}
