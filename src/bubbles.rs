use bevy::log::debug;
use bevy::math::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::boundary::WaterRect;
use crate::config::*;

/// A rising bubble; purely decorative, bubbles never interact
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub position: Vec2,
    pub rise_speed: f32,
    pub glyph: &'static str,
    pub size: f32,
    pub spawned_at: u64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SpawnError {
    #[error("no room between the wave band and the floor to spawn bubbles")]
    EmptySpawnBand,
}

/// Bubble collection with its spawn and retirement rules
#[derive(Debug, Clone)]
pub struct Bubbles {
    list: Vec<Bubble>,
    spawn_chance: f64,
    rise_rate: f32,
    retire_margin: f32,
}

impl Default for Bubbles {
    fn default() -> Self {
        Self::new(BUBBLE_SPAWN_CHANCE, BUBBLE_RISE_RATE, BUBBLE_RETIRE_MARGIN)
    }
}

impl Bubbles {
    pub fn new(spawn_chance: f64, rise_rate: f32, retire_margin: f32) -> Self {
        Self {
            list: Vec::new(),
            spawn_chance,
            rise_rate,
            retire_margin,
        }
    }

    /// Places a bubble at an exact position
    pub fn spawn_at(&mut self, position: Vec2, tick: u64) {
        self.list.push(Bubble {
            position,
            rise_speed: self.rise_rate,
            glyph: BUBBLE_GLYPHS[0],
            size: BUBBLE_SIZES[1],
            spawned_at: tick,
        });
    }

    /// Spawns one bubble with a random look somewhere in `band`
    pub fn spawn_random<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        band: Option<WaterRect>,
        tick: u64,
    ) -> Result<(), SpawnError> {
        let band = band.ok_or(SpawnError::EmptySpawnBand)?;
        let position = band.random_point(rng);
        let glyph = BUBBLE_GLYPHS.choose(rng).copied().unwrap_or(BUBBLE_GLYPHS[0]);
        let size = BUBBLE_SIZES.choose(rng).copied().unwrap_or(BUBBLE_SIZES[0]);

        self.list.push(Bubble {
            position,
            rise_speed: self.rise_rate,
            glyph,
            size,
            spawned_at: tick,
        });
        Ok(())
    }

    /// Raises every bubble and retires those that crossed
    /// `surface_y + retire_margin`. Returns how many retired.
    pub fn advance(&mut self, surface_y: f32) -> usize {
        let threshold = surface_y + self.retire_margin;
        let before = self.list.len();

        for bubble in self.list.iter_mut() {
            bubble.position.y -= bubble.rise_speed;
        }
        self.list.retain(|bubble| bubble.position.y > threshold);

        before - self.list.len()
    }

    /// One particle tick: maybe spawn, then advance.
    ///
    /// A failed spawn is reported after the existing bubbles have moved, so
    /// it never stalls them.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        band: Option<WaterRect>,
        surface_y: f32,
        tick: u64,
    ) -> Result<usize, SpawnError> {
        let spawned = if rng.gen_bool(self.spawn_chance) {
            self.spawn_random(rng, band, tick)
        } else {
            Ok(())
        };

        let retired = self.advance(surface_y);
        if retired > 0 {
            debug!("{retired} bubble(s) reached the surface");
        }

        spawned.map(|_| retired)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bubble> {
        self.list.iter()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
