//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mastoframe_core::config;

mod commands;

#[derive(Parser)]
#[command(name = "mastoframe")]
#[command(version)]
#[command(about = "Mastodon photo frame for small displays")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: $MASTOFRAME_CONFIG or $MASTOFRAME_HOME/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the photo frame
    Run,

    /// Find the numeric id of a Mastodon account
    Lookup {
        /// Account to search for, e.g. @axwax@fosstodon.org
        #[arg(value_name = "ACCOUNT")]
        account: String,

        /// Maximum number of results
        #[arg(long, default_value_t = 40)]
        limit: usize,
    },

    /// Compose a single frame from a local image
    Render {
        /// Photo to put in the frame
        #[arg(long, value_name = "PATH")]
        image: PathBuf,

        /// Caption text (default: the configured fallback caption)
        #[arg(long)]
        caption: Option<String>,

        /// Output PNG
        #[arg(long, value_name = "PATH", default_value = "frame.png")]
        out: PathBuf,

        /// Seed for the background colors
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Write the default config template
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    crate::logging::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(config::paths::config_path);

    if let Commands::Config { command } = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path(&config_path);
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(&config_path),
        };
    }

    let config = config::Config::load_from(&config_path).context("load config")?;
    config.validate().context("invalid config")?;

    match cli.command {
        Commands::Run => commands::run::run(&config, &config_path).await,
        Commands::Lookup { account, limit } => {
            commands::lookup::run(&config, &account, limit).await
        }
        Commands::Render {
            image,
            caption,
            out,
            seed,
        } => commands::render::run(commands::render::RenderOptions {
            config: &config,
            config_path: &config_path,
            image: &image,
            caption: caption.as_deref(),
            out: &out,
            seed,
        }),
        Commands::Config { .. } => Ok(()),
    }
}
