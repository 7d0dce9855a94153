//! terrad — the terramap daemon.
//!
//! Single binary that assembles the service: configuration from the
//! environment, the Earth-observation platform client, and the widget
//! HTTP surface.
//!
//! # Usage
//!
//! ```text
//! terrad serve --port 3001 --env-file .env
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use terra_core::ServiceConfig;
use terramap_api::{ApiState, build_router};
use terramap_eo::EoClient;

#[derive(Parser)]
#[command(name = "terrad", about = "terramap daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the map-widget endpoint.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "3001")]
        port: u16,

        /// Address to bind.
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,

        /// Optional dotenv file loaded before reading configuration.
        #[arg(long)]
        env_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,terrad=debug,terramap=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            host,
            env_file,
        } => serve(host, port, env_file).await,
    }
}

async fn serve(host: IpAddr, port: u16, env_file: Option<PathBuf>) -> anyhow::Result<()> {
    info!("terramap daemon starting");

    // Environment file, then process environment on top.
    match env_file {
        Some(path) => {
            dotenvy::from_path(&path)
                .with_context(|| format!("failed to load env file {}", path.display()))?;
            info!(path = %path.display(), "env file loaded");
        }
        None => {
            // A missing default .env is fine; only report other failures.
            if let Err(e) = dotenvy::dotenv() {
                if !e.not_found() {
                    return Err(anyhow::Error::new(e).context("failed to load .env"));
                }
            }
        }
    }

    // Configuration is read exactly once; a missing credential variable
    // stops the process here rather than surfacing mid-request.
    let config = ServiceConfig::from_env().context("service configuration")?;
    info!(
        platform = %config.platform_url,
        email = %config.service_account_email,
        "configuration loaded"
    );

    let client = EoClient::from_config(&config).context("platform client")?;
    let router = build_router(ApiState { config, client });

    let addr = SocketAddr::from((host, port));
    info!(%addr, "widget endpoint starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!("terramap daemon stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn cli_parses_serve_defaults() {
        let cli = Cli::try_parse_from(["terrad", "serve"]).unwrap();
        let Command::Serve { port, host, env_file } = cli.command;
        assert_eq!(port, 3001);
        assert_eq!(host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert!(env_file.is_none());
    }

    #[test]
    fn cli_parses_overrides() {
        let cli = Cli::try_parse_from([
            "terrad",
            "serve",
            "--port",
            "8080",
            "--host",
            "127.0.0.1",
            "--env-file",
            "/etc/terramap/.env",
        ])
        .unwrap();
        let Command::Serve { port, host, env_file } = cli.command;
        assert_eq!(port, 8080);
        assert_eq!(host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(env_file, Some(PathBuf::from("/etc/terramap/.env")));
    }
}
