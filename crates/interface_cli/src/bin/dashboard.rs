//! Claims Dashboard - command line binary
//!
//! # Usage
//!
//! ```bash
//! claims-dashboard overview
//! claims-dashboard claims --search delgado
//! claims-dashboard upload 7 roof.jpg estimate.pdf
//! claims-dashboard download 7 f1 --out ./downloads
//! ```
//!
//! # Environment Variables
//!
//! * `CLAIMS_API_BASE_URL` - Backend base URL (default: http://localhost:5000)
//! * `CLAIMS_API_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! * `CLAIMS_API_ADDRESSING` - nested, flat or auto (default: auto)
//! * `CLAIMS_API_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)

use anyhow::Context;
use clap::Parser;
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use infra_http::{ClaimsApiConfig, HttpClaimsApi};
use interface_cli::{Cli, Dashboard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = ClaimsApiConfig::from_env().context("Invalid CLAIMS_API configuration")?;
    if let Some(base_url) = cli.base_url.clone() {
        config.base_url = base_url;
    }
    if let Some(addressing) = cli.addressing {
        config.addressing = addressing;
    }

    init_tracing(&config.log_level);
    tracing::debug!(base_url = %config.base_url, addressing = %config.addressing, "Using claims API");

    let api = HttpClaimsApi::new(config).context("Could not create claims API client")?;
    let dashboard = Dashboard::new(Arc::new(api));

    let mut stdout = io::stdout().lock();
    dashboard.run(cli.command, &mut stdout).await?;
    Ok(())
}

/// Logs go to stderr so command output stays pipeable
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
