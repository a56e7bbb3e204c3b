//! Kraken aquarium: a text-sprite kraken living in a bounded strip of water,
//! hunting the shrimp you drop and sinking the boats you launch.
//!
//! The behavior core ([`session::Session`]) is plain data advanced one tick
//! at a time; [`plugin::KrakenPlugin`] hosts it inside a bevy app.
pub mod behavior;
pub mod boundary;
pub mod bubbles;
pub mod config;
pub mod creature;
pub mod food;
pub mod intercept;
pub mod movement;
pub mod plugin;
pub mod render;
pub mod session;
