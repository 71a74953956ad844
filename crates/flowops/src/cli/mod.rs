mod gateway;
mod service;

pub use gateway::GatewayCommand;
pub use service::ServiceCommand;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flowops_core::config::FlowOpsConfig;

/// FlowOps - workflow submission gateway and service
#[derive(Parser)]
#[command(name = "flowops")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the workflow service.
    Service(ServiceCommand),

    /// Run the public gateway.
    Gateway(GatewayCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Service(cmd) => cmd.execute().await,
            Commands::Gateway(cmd) => cmd.execute().await,
        }
    }
}

/// Load the config file (if present) with environment overrides applied.
fn load_config(path: &str) -> Result<FlowOpsConfig> {
    FlowOpsConfig::load(Path::new(path))
        .with_context(|| format!("Failed to load configuration from {}", path))
}
