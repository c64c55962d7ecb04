mod actor;
mod chasing;
mod nonoverlap;
mod sandbox;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use toy_engine::logging::{init_logging, LoggingConfig};
use toy_engine::render::AtlasSource;
use toy_engine::EngineConfig;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum)]
enum Demo {
    /// Missiles intercepting a plane.
    Chasing,
    /// Spheres pushing each other apart.
    Nonoverlap,
    /// Shapes, a vortex field and rotating boxes under a free camera.
    #[default]
    Sandbox,
}

#[derive(Parser)]
#[command(name = "toy-demos", about = "Small games on the toy engine")]
struct Cli {
    #[arg(value_enum, default_value_t = Demo::default())]
    demo: Demo,

    /// Glyph atlas: a 512x512 grid image, or a .ttf/.otf font to rasterize.
    #[arg(long)]
    atlas: Option<PathBuf>,

    /// Log filter, env_logger syntax (overrides TOY_LOG / RUST_LOG).
    #[arg(long)]
    log: Option<String>,

    /// Outline glyph cells instead of loading a font.
    #[arg(long, conflicts_with = "atlas")]
    blank_text: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..LoggingConfig::default()
    });

    let mut config = EngineConfig::default();
    config.window.title = format!("toy: {:?}", cli.demo).to_lowercase();
    if let Some(path) = cli.atlas {
        config.text.atlas = AtlasSource::from_path(path);
    } else if cli.blank_text {
        config.text.atlas = AtlasSource::Blank;
    }

    match cli.demo {
        Demo::Chasing => toy_engine::run(chasing::Chasing::default(), config),
        Demo::Nonoverlap => toy_engine::run(nonoverlap::NonOverlap::default(), config),
        Demo::Sandbox => toy_engine::run(sandbox::Sandbox::default(), config),
    }
}
