//! paneltty CLI
//!
//! Single binary for driving servers on a game server panel:
//! - Interactive server menu and live console
//! - Power control and resource usage
//! - File management

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paneltty::commands::{self, FilesAction};
use paneltty::output::print_info;
use pt_core::config::ConfigFile;
use pt_core::{PanelClient, PowerSignal, ServerId};

#[derive(Parser)]
#[command(name = "paneltty")]
#[command(author, version, about = "Terminal client for game server panels")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Panel URL (overrides config)
    #[arg(long, global = true, env = "PANELTTY_URL")]
    panel_url: Option<String>,

    /// Client API key (overrides config)
    #[arg(long, global = true, env = "PANELTTY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List servers
    /// Alias: ls
    #[command(alias = "ls")]
    Servers {
        /// Show detailed information
        #[arg(short, long)]
        long: bool,
    },

    /// Open the live console of a server
    Console {
        /// Server identifier
        server: String,
    },

    /// Run one console command without opening the console
    Send {
        /// Server identifier
        server: String,
        /// Command to run
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Show power state and resource usage
    Resources {
        /// Server identifier
        server: String,
    },

    /// Send a power signal (start, stop, restart, kill)
    Power {
        /// Server identifier
        server: String,
        /// Signal to send
        signal: PowerSignal,
        /// Kill without confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Manage files
    Files {
        /// Server identifier
        server: String,
        #[command(subcommand)]
        action: FilesAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get specific config value
    Get { key: String },
    /// Set config value
    Set { key: String, value: String },
    /// Show config file path
    Path,
    /// Create a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Config commands work without a panel
    if let Some(Commands::Config { action }) = &cli.command {
        match action {
            ConfigAction::Show => commands::config_show(cli.config.as_ref())?,
            ConfigAction::Get { key } => commands::config_get(cli.config.as_ref(), key)?,
            ConfigAction::Set { key, value } => {
                commands::config_set(cli.config.as_ref(), key, value)?
            }
            ConfigAction::Path => commands::config_path(cli.config.as_ref()),
            ConfigAction::Init { force } => commands::config_init(cli.config.as_ref(), *force)?,
        }
        return Ok(());
    }

    let mut config =
        ConfigFile::load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = cli.panel_url {
        config.panel.url = url;
    }
    if let Some(key) = cli.api_key {
        config.panel.api_key = key;
    }

    if let Err(e) = config.panel.validate() {
        print_info("Run 'paneltty config init', or pass --panel-url and --api-key");
        return Err(e).context("Panel is not configured");
    }
    config
        .console
        .validate()
        .context("Invalid console settings")?;
    let client = PanelClient::new(&config.panel).context("Failed to create panel client")?;
    tracing::debug!("Using panel at {}", client.base_url());

    match cli.command {
        None => commands::menu_command(&client, &config.console).await?,

        Some(Commands::Servers { long }) => commands::servers_command(&client, long).await?,

        Some(Commands::Console { server }) => {
            let outcome =
                commands::console_command(&client, &config.console, &ServerId::from(server))
                    .await?;
            if outcome.is_failure() {
                std::process::exit(1);
            }
        }

        Some(Commands::Send { server, command }) => {
            commands::send_command(&client, &ServerId::from(server), &command).await?
        }

        Some(Commands::Resources { server }) => {
            commands::resources_command(&client, &ServerId::from(server)).await?
        }

        Some(Commands::Power {
            server,
            signal,
            force,
        }) => commands::power_command(&client, &ServerId::from(server), signal, force).await?,

        Some(Commands::Files { server, action }) => {
            commands::files_command(&client, &ServerId::from(server), action).await?
        }

        Some(Commands::Config { .. }) => {}
    }

    Ok(())
}
