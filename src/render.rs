//! Draw-call interface between the session and whatever paints the screen,
//! plus the text sprites for every drawable.
use bevy::math::Vec2;

use crate::intercept::{Heading, IntruderStatus};
use crate::session::Session;

/// Logical draw layer; clearing a layer erases everything drawn on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Environment,
    Creature,
    Bubbles,
    Food,
    Intruder,
}

impl Layer {
    pub const ALL: [Layer; 5] = [
        Layer::Environment,
        Layer::Creature,
        Layer::Bubbles,
        Layer::Food,
        Layer::Intruder,
    ];
}

/// Colour and size selector resolved by the render surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleKey {
    Kraken,
    Food,
    Bubble { size: f32 },
    Boat,
    Waves,
}

/// Something that can show text sprites at container coordinates
/// (origin top-left, y down)
pub trait RenderSurface {
    fn clear(&mut self, layer: Layer);
    fn draw(&mut self, layer: Layer, lines: &[String], position: Vec2, style: StyleKey);
}

const HEAD: [&str; 4] = [
    "         ______        ",
    "        /      \\       ",
    "       /        \\      ",
    "       |        |      ",
];

const TENTACLES: [&str; 5] = [
    "  _ \\___/||||||\\___/ _ ",
    "   \\____/ |||| \\____/ `",
    "   ,-.___/ || \\__,-._  ",
    "  /    ___/  \\__       ",
    "     _/         `---   ",
];

const FLIPPED_HEAD: [&str; 4] = [
    "       |        |      ",
    "       \\        /      ",
    "        \\______/       ",
    "                       ",
];

/// Eye glyph and six-character mouth for each named frame
fn face(frame: &str) -> (char, &'static str) {
    match frame {
        "idle2" => ('O', "  __  "),
        "swim1" | "swim3" | "swim_flip1" | "swim_flip3" => ('@', "  >   "),
        "swim2" | "swim_flip2" => ('O', "  ^   "),
        "eat1" => ('X', " /VV\\ "),
        "eat2" => ('*', " <WW> "),
        "eat3" => ('^', " /^^\\ "),
        "attack1" => ('@', "  ><  "),
        "attack2" => ('X', " >XX< "),
        "attack3" => ('*', " <**> "),
        _ => ('o', "      "),
    }
}

/// The eleven sprite rows for a named kraken frame. Flip and attack frames
/// are drawn upside down, tentacles first.
pub fn kraken_sprite(frame: &str) -> Vec<String> {
    let (eye, mouth) = face(frame);
    let eyes = format!("    )  {eye}        {eye}   ?  ");
    let mouth = format!("   (    \\{mouth}/    |  ");

    let upside_down = frame.starts_with("swim_flip") || frame.starts_with("attack");
    let mut rows: Vec<String> = Vec::with_capacity(HEAD.len() + 2 + TENTACLES.len());
    if upside_down {
        rows.extend(TENTACLES.iter().rev().map(|r| r.to_string()));
        rows.push(mouth);
        rows.push(eyes);
        rows.extend(FLIPPED_HEAD.iter().map(|r| r.to_string()));
    } else {
        rows.extend(HEAD.iter().map(|r| r.to_string()));
        rows.push(eyes);
        rows.push(mouth);
        rows.extend(TENTACLES.iter().map(|r| r.to_string()));
    }
    rows
}

pub fn boat_sprite(heading: Heading) -> Vec<String> {
    let sails: [&str; 3] = match heading {
        Heading::LeftToRight => ["    )_)  )_)    ", "   )___))___)   ", "  )____)_____)  "],
        Heading::RightToLeft => ["    (_(  (_(    ", "   (___((___(   ", "  (_____(____(  "],
    };
    let mut rows = vec!["     |    |     ".to_string()];
    rows.extend(sails.iter().map(|r| r.to_string()));
    rows.push("_____|____|_____".to_string());
    rows.push("\\______________/".to_string());
    rows
}

const WAVE_PATTERNS: [&str; 4] = ["~≈", "≈~", "~~≈≈", "≈≈~~"];

/// Two wave lines wide enough to span `width` pixels
pub fn wave_lines(frame: u64, width: f32, char_width: f32) -> [String; 2] {
    let chars = (width / char_width).ceil().max(0.0) as usize + 4;
    let line = |pattern: &str| pattern.chars().cycle().take(chars).collect::<String>();
    let top = WAVE_PATTERNS[(frame % 4) as usize];
    let bottom = WAVE_PATTERNS[((frame + 2) % 4) as usize];
    [line(top), line(bottom)]
}

pub const SHRIMP_GLYPH: &str = ",";

impl Session {
    /// Clears and redraws every layer for the current state
    pub fn render(&self, surface: &mut impl RenderSurface) {
        for layer in Layer::ALL {
            surface.clear(layer);
        }

        let container = self.container();
        let water = self.water();
        let line_height = self.config().line_height();
        let surface_y = water.surface_y(container.height);

        let [top, bottom] = wave_lines(self.frame_count(), container.width, self.config().char_width);
        surface.draw(Layer::Environment, &[top], Vec2::new(0.0, surface_y), StyleKey::Waves);
        surface.draw(
            Layer::Environment,
            &[bottom],
            Vec2::new(0.0, surface_y + line_height),
            StyleKey::Waves,
        );

        for bubble in self.bubbles().iter() {
            surface.draw(
                Layer::Bubbles,
                &[bubble.glyph.to_string()],
                bubble.position,
                StyleKey::Bubble { size: bubble.size },
            );
        }

        for item in self.food().iter() {
            surface.draw(
                Layer::Food,
                &[SHRIMP_GLYPH.to_string()],
                item.position,
                StyleKey::Food,
            );
        }

        // A sunk boat stays cleared; the front end confirms the removal.
        if let Some(boat) = self.intruder().filter(|b| b.status == IntruderStatus::Sailing) {
            let sprite = boat_sprite(boat.heading);
            // Hull bottom rides on the surface line.
            let top_y = boat.position.y - (sprite.len() as f32 - 1.0) * line_height;
            surface.draw(
                Layer::Intruder,
                &sprite,
                Vec2::new(boat.position.x, top_y),
                StyleKey::Boat,
            );
        }

        let creature = self.creature();
        surface.draw(
            Layer::Creature,
            &kraken_sprite(creature.animation.frame_name()),
            creature.position,
            StyleKey::Kraken,
        );
    }
}
