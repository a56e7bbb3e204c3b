use bevy::math::Vec2;

use crate::config::KrakenConfig;

/// Size of the kraken and where its mouth sits relative to the anchor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreatureGeometry {
    pub half_extents: Vec2,
    /// Vector from the anchor (top-left) to the mouth
    pub mouth_offset: Vec2,
}

impl CreatureGeometry {
    pub fn new(half_extents: Vec2, mouth_offset: Vec2) -> Self {
        Self {
            half_extents,
            mouth_offset,
        }
    }

    /// Derives the bounding box from the text sprite: `rows` lines of
    /// `font_size + line_spacing` pixels, `cols` characters wide, with the
    /// mouth centred on `mouth_row`.
    pub fn from_sprite(
        rows: u32,
        cols: u32,
        mouth_row: u32,
        font_size: f32,
        line_spacing: f32,
        char_width: f32,
    ) -> Self {
        let line_height = font_size + line_spacing;
        let half_extents = Vec2::new(
            cols as f32 * char_width / 2.0,
            rows as f32 * line_height / 2.0,
        );
        let mouth_offset = Vec2::new(half_extents.x, mouth_row as f32 * line_height);
        Self::new(half_extents, mouth_offset)
    }

    pub fn from_config(config: &KrakenConfig) -> Self {
        Self::from_sprite(
            config.sprite_rows,
            config.sprite_cols,
            config.mouth_row,
            config.font_size,
            config.line_spacing,
            config.char_width,
        )
    }

    /// Collision radius: half the sprite height
    pub fn radius(&self) -> f32 {
        self.half_extents.y
    }
}

/// The one kraken of a session
#[derive(Debug, Clone, PartialEq)]
pub struct Creature {
    /// Anchor: top-left of the bounding box
    pub position: Vec2,
    pub geometry: CreatureGeometry,
    pub animation: AnimationCycle,
}

impl Creature {
    pub fn new(position: Vec2, geometry: CreatureGeometry) -> Self {
        Self {
            position,
            geometry,
            animation: AnimationCycle::default(),
        }
    }

    /// Mouth position used for every contact test
    pub fn effector(&self) -> Vec2 {
        self.position + self.geometry.mouth_offset
    }

    /// Anchor that would put the mouth exactly on `target`
    pub fn anchor_for_effector(&self, target: Vec2) -> Vec2 {
        target - self.geometry.mouth_offset
    }

    /// Anchor that would centre the body horizontally on `x`
    pub fn anchor_x_centred_on(&self, x: f32) -> f32 {
        x - self.geometry.half_extents.x
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.geometry.half_extents
    }
}

/// Frame names for each animation cycle key
pub fn cycle_frames(key: &str) -> &'static [&'static str] {
    match key {
        "swimming" => &["swim1", "swim2", "swim3"],
        "eating" => &["eat1", "eat2", "eat3"],
        "swimming_flip" => &["swim_flip1", "swim_flip2", "swim_flip3"],
        "attacking" => &["attack1", "attack2", "attack3"],
        _ => &["idle1", "idle2"],
    }
}

/// Which cycle is playing and how far into it we are
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationCycle {
    key: &'static str,
    frame: usize,
}

impl Default for AnimationCycle {
    fn default() -> Self {
        Self {
            key: "idle",
            frame: 0,
        }
    }
}

impl AnimationCycle {
    /// Switches cycles, restarting from the first frame on a change
    pub fn play(&mut self, key: &'static str) {
        if self.key != key {
            self.key = key;
            self.frame = 0;
        }
    }

    pub fn advance(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn frame_name(&self) -> &'static str {
        let frames = cycle_frames(self.key);
        frames[self.frame % frames.len()]
    }
}
