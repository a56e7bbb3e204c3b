//! Water geometry: where the surface and floor sit inside the container and
//! which anchor positions keep the kraken fully underwater.
//!
//! Every position check in the crate goes through [`is_inside_water`]; no
//! other module decides on its own whether a point is legal.
use bevy::math::Vec2;
use rand::Rng;
use thiserror::Error;

use crate::config::*;

/// Fatal geometry or configuration problems detected while setting up a session
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SetupError {
    #[error("container {width}x{height} is not a usable size")]
    InvalidContainer { width: f32, height: f32 },
    #[error(
        "container too small for the kraken: legal region x {min_x}..{max_x}, y {min_y}..{max_y}"
    )]
    InvertedRegion {
        min_x: f32,
        max_x: f32,
        min_y: f32,
        max_y: f32,
    },
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

/// Size of the drawing surface handed to us by the front end
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container {
    pub width: f32,
    pub height: f32,
}

impl Container {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Legal rectangle for the kraken's anchor (top-left of its bounding box)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterRect {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl WaterRect {
    pub fn contains(&self, point: Vec2) -> bool {
        is_inside_water(point.x, point.y, self)
    }

    /// Clamps a point into the rectangle one axis at a time
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.min_x, self.max_x),
            point.y.clamp(self.min_y, self.max_y),
        )
    }

    /// Uniformly random legal position
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            rng.gen_range(self.min_x..=self.max_x),
            rng.gen_range(self.min_y..=self.max_y),
        )
    }
}

/// Single source of truth for "is this a legal position"
pub fn is_inside_water(x: f32, y: f32, rect: &WaterRect) -> bool {
    x >= rect.min_x && x <= rect.max_x && y >= rect.min_y && y <= rect.max_y
}

/// Legal region using the default surface, floor and side offsets
pub fn legal_region(
    container_width: f32,
    container_height: f32,
    half_extents: Vec2,
) -> Result<WaterRect, SetupError> {
    WaterGeometry::default().legal_region(container_width, container_height, half_extents)
}

/// Fixed offsets that place the surface, the floor and the side walls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterGeometry {
    pub surface_fraction: f32,
    pub surface_band_height: f32,
    pub floor_offset: f32,
    pub side_margin: f32,
}

impl Default for WaterGeometry {
    fn default() -> Self {
        Self {
            surface_fraction: SURFACE_FRACTION,
            surface_band_height: SURFACE_BAND_HEIGHT,
            floor_offset: FLOOR_OFFSET,
            side_margin: SIDE_MARGIN,
        }
    }
}

impl WaterGeometry {
    pub fn from_config(config: &KrakenConfig) -> Self {
        Self {
            surface_fraction: config.surface_fraction,
            surface_band_height: config.surface_band_height,
            floor_offset: config.floor_offset,
            side_margin: config.side_margin,
        }
    }

    /// Y of the surface line (top wave)
    pub fn surface_y(&self, container_height: f32) -> f32 {
        container_height * self.surface_fraction
    }

    /// Y where open water starts, below the wave band
    pub fn underwater_start(&self, container_height: f32) -> f32 {
        self.surface_y(container_height) + self.surface_band_height
    }

    pub fn floor_y(&self, container_height: f32) -> f32 {
        container_height - self.floor_offset
    }

    /// Computes the anchor rectangle that keeps the kraken between surface
    /// and floor and inside the side margins.
    ///
    /// The head stays half a body below the surface line so the sprite never
    /// overdraws the waves; the bounding box bottom stays above the floor.
    pub fn legal_region(
        &self,
        container_width: f32,
        container_height: f32,
        half_extents: Vec2,
    ) -> Result<WaterRect, SetupError> {
        let usable = |v: f32| v.is_finite() && v > 0.0;
        if !usable(container_width) || !usable(container_height) {
            return Err(SetupError::InvalidContainer {
                width: container_width,
                height: container_height,
            });
        }

        let rect = WaterRect {
            min_x: self.side_margin,
            max_x: container_width - self.side_margin - 2.0 * half_extents.x,
            min_y: self.surface_y(container_height) + half_extents.y,
            max_y: self.floor_y(container_height) - 2.0 * half_extents.y,
        };

        if rect.min_x > rect.max_x || rect.min_y > rect.max_y {
            return Err(SetupError::InvertedRegion {
                min_x: rect.min_x,
                max_x: rect.max_x,
                min_y: rect.min_y,
                max_y: rect.max_y,
            });
        }

        Ok(rect)
    }

    /// True for clicks that land above the surface line, where boats sail
    pub fn is_above_water(&self, point: Vec2, container: Container) -> bool {
        point.y >= 0.0
            && point.y < self.surface_y(container.height)
            && point.x >= 0.0
            && point.x <= container.width
    }

    /// Rectangle bubbles may spawn in: full width, clear of the wave band and
    /// the floor. `None` when the container leaves no room.
    pub fn bubble_band(&self, container: Container) -> Option<WaterRect> {
        let min_y = self.underwater_start(container.height) + BUBBLE_TOP_MARGIN;
        let max_y = container.height - BUBBLE_BOTTOM_MARGIN;
        if min_y > max_y || container.width < 0.0 {
            return None;
        }
        Some(WaterRect {
            min_x: 0.0,
            max_x: container.width,
            min_y,
            max_y,
        })
    }
}
