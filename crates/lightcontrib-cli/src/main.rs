//! lightcontrib CLI - per-light contribution renders
//!
//! Drives the isolation sweep, keyword store and layer tools against a scene
//! described as JSON.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;
mod config;

use commands::Session;
use config::ToolConfig;

/// lightcontrib - render every light on its own
#[derive(Parser)]
#[command(name = "lightcontrib")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scene file (JSON)
    #[arg(short, long, default_value = "scene.json")]
    scene: PathBuf,

    /// Write scene changes back to the scene file
    #[arg(short, long)]
    write: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show detected rendering subsystems and light kinds
    Probe,

    /// Manage classification keywords
    Keywords {
        #[command(subcommand)]
        action: KeywordsAction,
    },

    /// Classify light names
    Classify {
        /// Names to classify
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Show visible lights grouped by classification
    Groups,

    /// List visible lights
    List {
        /// One entry per group instead of one per light
        #[arg(short, long)]
        groups: bool,
    },

    /// Render each light (or group) in isolation
    Sweep {
        /// One render per classification group
        #[arg(short, long)]
        groups: bool,

        /// Save every capture under the project's image directory
        #[arg(long)]
        save_images: bool,

        /// Lights (or group keys with --groups) to render; default is the selection, then all
        lights: Vec<String>,
    },

    /// Create render layers from light groups or selected lights
    Layers {
        /// Geometry to include
        #[arg(short, long = "geometry")]
        geometry: Vec<String>,

        /// Lights to combine into one layer
        lights: Vec<String>,
    },

    /// Create V-Ray light-select elements from light groups or selected lights
    Elements {
        /// Lights to combine into one element
        lights: Vec<String>,
    },

    /// Change a parameter on several lights
    Edit {
        #[arg(value_enum)]
        param: EditParam,

        /// New value
        value: String,

        /// Lights (or group keys with --groups) to edit; default is the selection
        lights: Vec<String>,

        /// Treat the light arguments as group keys
        #[arg(short, long)]
        groups: bool,
    },

    /// Create a light from a preset
    Create {
        /// Preset name (area, areaMR, spot, spotMR, vrayRect, vrayDome, vrayIES)
        preset: String,
    },
}

#[derive(Subcommand)]
enum KeywordsAction {
    /// Show the stored keywords
    List,
    /// Append keywords (comma or pipe separated)
    Add { keywords: String },
    /// Restore the default keywords
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EditParam {
    /// Light intensity
    Intensity,
    /// Rename the light transforms
    Rename,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(!cli.no_color)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = ToolConfig::load(cli.config.as_deref())?;
    let mut session = Session::open(&cli.scene, config)?;

    match cli.command {
        Commands::Probe => commands::probe::run(&session),

        Commands::Keywords { action } => match action {
            KeywordsAction::List => commands::keywords::list(&session)?,
            KeywordsAction::Add { keywords } => commands::keywords::add(&session, &keywords)?,
            KeywordsAction::Reset { yes } => commands::keywords::reset(&session, yes)?,
        },

        Commands::Classify { names } => commands::lights::classify(&session, &names)?,

        Commands::Groups => commands::lights::groups(&session)?,

        Commands::List { groups } => commands::lights::list(&session, groups)?,

        Commands::Sweep {
            groups,
            save_images,
            lights,
        } => commands::sweep::run(&mut session, groups, save_images, &lights)?,

        Commands::Layers { geometry, lights } => {
            commands::layers::layers(&mut session, &geometry, &lights)?
        }

        Commands::Elements { lights } => commands::layers::elements(&mut session, &lights)?,

        Commands::Edit {
            param,
            value,
            lights,
            groups,
        } => {
            let param = match param {
                EditParam::Intensity => lightcontrib_layers::LightParam::Intensity,
                EditParam::Rename => lightcontrib_layers::LightParam::Rename,
            };
            commands::edit::run(&mut session, param, &value, &lights, groups)?
        }

        Commands::Create { preset } => commands::edit::create(&mut session, &preset)?,
    }

    if cli.write {
        session.save()?;
    }

    Ok(())
}
