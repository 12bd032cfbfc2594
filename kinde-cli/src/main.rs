//! Kinde CLI
//!
//! Command-line interface for the Kinde management API.
//!
//! # Usage
//!
//! ```bash
//! # Check that the configured credentials can obtain a token
//! kinde token
//!
//! # List applications as JSON
//! kinde --format json applications list --sort name_asc
//!
//! # Find a permission by name and key
//! kinde permissions search --name "Read users" --key read:users
//! ```
//!
//! Credentials are read from `config.toml` in the user config directory (or
//! `--config`), overridden by `KINDE_DOMAIN`, `KINDE_AUDIENCE`,
//! `KINDE_CLIENT_ID`, `KINDE_CLIENT_SECRET` and `KINDE_SCOPES`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kinde_client::Kinde;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod config;
mod output;

use commands::{
    ApisCommand, ApplicationsCommand, ConnectionsCommand, IdentitiesCommand,
    OrganizationsCommand, PermissionsCommand, RolesCommand, UsersCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "kinde")]
#[command(about = "Manage a Kinde business from the command line")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Obtain an access token and show when it expires
    Token {
        /// Print the raw access token
        #[arg(long)]
        show: bool,
    },

    /// Manage APIs
    #[command(subcommand)]
    Apis(ApisCommand),

    /// Manage applications
    #[command(subcommand)]
    Applications(ApplicationsCommand),

    /// Manage organizations
    #[command(subcommand)]
    Organizations(OrganizationsCommand),

    /// Manage users
    #[command(subcommand)]
    Users(UsersCommand),

    /// Manage roles
    #[command(subcommand)]
    Roles(RolesCommand),

    /// Manage permissions
    #[command(subcommand)]
    Permissions(PermissionsCommand),

    /// Manage connections
    #[command(subcommand)]
    Connections(ConnectionsCommand),

    /// Inspect identities
    #[command(subcommand)]
    Identities(IdentitiesCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let credentials = config::load_credentials(cli.config.as_deref())?;
    debug!("Using Kinde domain {}", credentials.domain);

    let kinde = Kinde::new(credentials).context("Invalid Kinde configuration")?;
    let format = cli.format;

    match cli.command {
        Commands::Token { show } => commands::token(&kinde, format, show).await,
        Commands::Apis(cmd) => commands::apis(&kinde, format, cmd).await,
        Commands::Applications(cmd) => commands::applications(&kinde, format, cmd).await,
        Commands::Organizations(cmd) => commands::organizations(&kinde, format, cmd).await,
        Commands::Users(cmd) => commands::users(&kinde, format, cmd).await,
        Commands::Roles(cmd) => commands::roles(&kinde, format, cmd).await,
        Commands::Permissions(cmd) => commands::permissions(&kinde, format, cmd).await,
        Commands::Connections(cmd) => commands::connections(&kinde, format, cmd).await,
        Commands::Identities(cmd) => commands::identities(&kinde, format, cmd).await,
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
