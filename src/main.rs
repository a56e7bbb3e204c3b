use anyhow::Context;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use clap::Parser;

use kraken_rs::config::*;
use kraken_rs::plugin::KrakenPlugin;
use kraken_rs::session::Session;

/// An ASCII kraken that eats shrimp and sinks boats
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Window width in pixels
    #[arg(long, default_value_t = DEFAULT_CONTAINER_WIDTH)]
    width: f32,

    /// Window height in pixels
    #[arg(long, default_value_t = DEFAULT_CONTAINER_HEIGHT)]
    height: f32,

    /// Seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Chance that an engaged boat is sunk
    #[arg(long, default_value_t = DESTROY_PROBABILITY)]
    destroy_probability: f64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = KrakenConfig {
        container_width: args.width,
        container_height: args.height,
        seed: args.seed,
        destroy_probability: args.destroy_probability,
        ..default()
    };
    let background = Srgba::hex(&config.background_color)
        .map(Color::Srgba)
        .with_context(|| format!("bad background colour {}", config.background_color))?;
    let session = Session::new(config.clone()).with_context(|| {
        format!(
            "cannot fit the kraken in a {}x{} window",
            config.container_width, config.container_height
        )
    })?;

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };

    let exit = App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Kraken".to_string(),
                        resolution: (config.container_width, config.container_height).into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    level,
                    ..default()
                }),
        )
        .add_plugins(EguiPlugin)
        .insert_resource(ClearColor(background))
        .insert_resource(session)
        .add_plugins(KrakenPlugin)
        .run();

    if let AppExit::Error(code) = exit {
        anyhow::bail!("kraken exited with code {code}");
    }
    Ok(())
}
