use anyhow::{anyhow, Context, Result};
use flowops_core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(std::env::var("RUST_LOG").ok(), &config.level)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

fn build_filter(rust_log: Option<String>, level: &str) -> Result<EnvFilter> {
    match rust_log.filter(|v| !v.trim().is_empty()) {
        Some(directives) => EnvFilter::try_new(&directives)
            .with_context(|| format!("Invalid RUST_LOG '{}'", directives)),
        None => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{}'", level)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_used_without_rust_log() {
        let filter = build_filter(None, "debug").unwrap();
        assert!(filter.to_string().contains("debug"));
    }

    #[test]
    fn test_rust_log_wins() {
        let filter = build_filter(Some("flowops=trace".into()), "info").unwrap();
        assert!(filter.to_string().contains("flowops=trace"));
    }

    #[test]
    fn test_blank_rust_log_ignored() {
        let filter = build_filter(Some("  ".into()), "warn").unwrap();
        assert!(filter.to_string().contains("warn"));
    }

    #[test]
    fn test_invalid_level_rejected() {
        assert!(build_filter(None, "flowops=loud").is_err());
    }
}
