use anyhow::Result;
use clap::Parser;
use console::style;
use flowops_core::config::FlowOpsConfig;

use super::load_config;
use crate::{runtime, telemetry};

/// Run the public gateway.
#[derive(Parser)]
pub struct GatewayCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = "flowops.toml")]
    pub config: String,

    /// Port to listen on (overrides config).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    pub host: Option<String>,

    /// Workflow service base URL (overrides config).
    #[arg(long)]
    pub workflow_service_url: Option<String>,
}

impl GatewayCommand {
    /// Execute the gateway command.
    pub async fn execute(self) -> Result<()> {
        let config = load_config(&self.config)?;
        let config = self.apply(config);

        telemetry::init(&config.observability.logging)?;

        println!();
        println!(
            "  {} gateway v{}",
            style("FlowOps").bold().cyan(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "  Listening on {}",
            style(format!("http://{}:{}", config.gateway.host, config.gateway.port)).cyan()
        );
        println!(
            "  Forwarding to {}",
            style(&config.gateway.workflow_service_url).cyan()
        );
        println!();

        runtime::run_gateway(config).await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }

    fn apply(&self, mut config: FlowOpsConfig) -> FlowOpsConfig {
        if let Some(port) = self.port {
            config.gateway.port = port;
        }
        if let Some(host) = &self.host {
            config.gateway.host = host.clone();
        }
        if let Some(url) = &self.workflow_service_url {
            config.gateway.workflow_service_url = url.clone();
        }
        config
    }
}
