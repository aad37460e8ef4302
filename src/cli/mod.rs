pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::NetwApi;
use crate::config::AppConfig;
use crate::session::{FileCredentialStore, SessionClient};
use crate::store::AppStore;

#[derive(Parser)]
#[command(name = "netw")]
#[command(about = "Netw console - manage reseller clients, lines and SIM cards")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and token management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Client roster")]
    Clients {
        #[command(subcommand)]
        cmd: commands::clients::ClientCommands,
    },

    #[command(about = "Mobile lines and consumption")]
    Lines {
        #[command(subcommand)]
        cmd: commands::lines::LineCommands,
    },

    #[command(about = "SIM card inventory")]
    Sims {
        #[command(subcommand)]
        cmd: commands::sims::SimCommands,
    },

    #[command(about = "Dashboard statistics across all clients")]
    Stats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Store wired to the real API with the credential persisted in the CLI config dir
pub fn build_store(config: &AppConfig) -> anyhow::Result<AppStore> {
    let storage = Arc::new(FileCredentialStore::new(config::credentials_file()?));
    let session = SessionClient::with_reqwest(config, storage)?;
    Ok(AppStore::new(NetwApi::new(session), config))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let app_config = AppConfig::from_env();
    let mut store = build_store(&app_config)?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &mut store, output_format).await,
        Commands::Clients { cmd } => commands::clients::handle(cmd, &mut store, output_format).await,
        Commands::Lines { cmd } => commands::lines::handle(cmd, &mut store, output_format).await,
        Commands::Sims { cmd } => commands::sims::handle(cmd, &mut store, output_format).await,
        Commands::Stats => commands::stats::handle(&mut store, output_format).await,
    }
}
