use anyhow::Result;
use clap::Parser;
use console::style;
use flowops_core::config::{FlowOpsConfig, StoreBackend};

use super::load_config;
use crate::{runtime, telemetry};

/// Run the workflow service.
#[derive(Parser)]
pub struct ServiceCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = "flowops.toml")]
    pub config: String,

    /// Port to listen on (overrides config).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    pub host: Option<String>,

    /// Store backend: postgres or memory (overrides config).
    #[arg(long)]
    pub store: Option<StoreBackend>,

    /// Message broker URL (overrides config).
    #[arg(long)]
    pub queue_url: Option<String>,
}

impl ServiceCommand {
    /// Execute the service command.
    pub async fn execute(self) -> Result<()> {
        let config = load_config(&self.config)?;
        let config = self.apply(config);

        telemetry::init(&config.observability.logging)?;

        println!();
        println!(
            "  {} workflow service v{}",
            style("FlowOps").bold().cyan(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "  Listening on {}",
            style(format!("http://{}:{}", config.service.host, config.service.port)).cyan()
        );
        println!();

        runtime::run_service(config).await?;

        tracing::info!("Workflow service stopped");
        Ok(())
    }

    fn apply(&self, mut config: FlowOpsConfig) -> FlowOpsConfig {
        if let Some(port) = self.port {
            config.service.port = port;
        }
        if let Some(host) = &self.host {
            config.service.host = host.clone();
        }
        if let Some(backend) = self.store {
            config.store.backend = backend;
        }
        if let Some(url) = &self.queue_url {
            config.queue.url = url.clone();
        }
        config
    }
}
