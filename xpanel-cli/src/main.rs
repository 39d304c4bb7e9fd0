//! xpanel CLI
//!
//! Runs the panel server and exposes release and log operations from the shell.

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use xpanel_api::{ApiConfig, ApiServer};
use xpanel_core::config::PanelConfig;
use xpanel_core::traits::{LogStore, ProcessSupervisor, VersionFetcher};
use xpanel_core::types::AssetKind;
use xpanel_release::{InstallTargets, ReleaseClient, ReleaseConfig, ReleaseInstaller};
use xpanel_service::validate::validate_log_count;
use xpanel_service::{install_unsupervised, PanelServices, ServerPanel};
use xpanel_store::{FileConfigStore, FileDatabaseStore, FileLogStore};
use xpanel_supervisor::{EngineCommand, EngineSupervisor};

/// xpanel - management core for a proxy engine admin panel
#[derive(Parser)]
#[command(name = "xpanel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the panel API server and supervise the engine
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "XPANEL_PORT")]
        port: Option<u16>,
        /// Bind address
        #[arg(short, long, env = "XPANEL_HOST")]
        bind: Option<IpAddr>,
        /// Do not start the engine on launch
        #[arg(long)]
        no_engine: bool,
    },

    /// List available versions of an asset
    Versions {
        /// engine (or xray), geoip, geosite
        kind: AssetKind,
    },

    /// Download and install an asset version
    ///
    /// Stop the engine before `install engine`: this command replaces the
    /// binary in place. A running `xpanel serve` stops it for you through
    /// `POST /server/install/engine/<version>`.
    Install {
        /// engine (or xray), geoip, geosite
        kind: AssetKind,
        /// Release tag to install
        version: String,
    },

    /// Print the last lines of the engine log
    Logs {
        /// Number of lines
        #[arg(short = 'n', long, default_value = "100")]
        count: usize,
        /// Log file (defaults to the configured engine log)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "xpanel=debug,info"
    } else {
        "xpanel=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PanelConfig::from_env().context("failed to read panel configuration")?;
    config.validate().context("invalid panel configuration")?;

    match cli.command {
        Commands::Serve { port, bind, no_engine } => cmd_serve(config, port, bind, no_engine).await,
        Commands::Versions { kind } => cmd_versions(&config, kind).await,
        Commands::Install { kind, version } => cmd_install(&config, kind, &version).await,
        Commands::Logs { count, file } => cmd_logs(&config, count, file).await,
        Commands::Config => cmd_config(&config),
    }
}

fn release_client(config: &PanelConfig) -> Result<Arc<ReleaseClient>> {
    let client = ReleaseClient::with_config(ReleaseConfig::from_panel(config))
        .context("failed to create release client")?;
    Ok(Arc::new(client))
}

/// Run API server
async fn cmd_serve(config: PanelConfig, port: Option<u16>, bind: Option<IpAddr>, no_engine: bool) -> Result<()> {
    let mut api_config = ApiConfig::from_env();
    if let Some(port) = port {
        api_config.port = port;
    }
    if let Some(bind) = bind {
        api_config.host = bind;
    }
    let addr = api_config.socket_addr();

    let engine = Arc::new(EngineSupervisor::new(EngineCommand::for_panel(&config)));
    let releases = release_client(&config)?;
    let installer = Arc::new(ReleaseInstaller::new(releases.clone(), InstallTargets::from_panel(&config)));

    let services = PanelServices {
        collector: engine.clone(),
        supervisor: engine.clone(),
        fetcher: releases,
        installer,
        logs: Arc::new(FileLogStore::new(&config.engine_log)),
        database: Arc::new(FileDatabaseStore::new(&config.database_path)),
        config: Arc::new(FileConfigStore::new(&config.engine_config)),
    };
    let panel = Arc::new(ServerPanel::new(&config, services));

    println!("{}", "🚀 Starting xpanel...".cyan().bold());

    if !no_engine {
        match engine.start().await {
            Ok(()) => {
                let pid = engine.pid().await.ok();
                println!("   {} {} (pid {:?})", "Engine:".green(), config.engine_binary.display(), pid);
            }
            Err(e) => {
                warn!(error = %e, "engine failed to start");
                println!("   {} {}", "Engine failed to start:".red(), e);
            }
        }
    }

    panel
        .start_background_refresh()
        .context("failed to start status refresh")?;

    println!("   {} http://{}", "Listening on:".green(), addr);
    println!("   {} http://{}/health", "Health check:".dimmed(), addr);
    println!("\n   Press Ctrl+C to stop.\n");

    let server = ApiServer::new(api_config, panel.clone());
    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("API server failed")?;

    panel.stop_background_refresh().await;
    engine.stop().await.context("failed to stop engine")?;

    println!("{}", "👋 xpanel stopped".cyan());
    Ok(())
}

/// List available versions
async fn cmd_versions(config: &PanelConfig, kind: AssetKind) -> Result<()> {
    println!("{} {}", "🔍 Fetching versions of".cyan().bold(), kind);

    let client = release_client(config)?;
    let versions = client
        .fetch_versions(kind)
        .await
        .with_context(|| format!("failed to list {kind} versions"))?;

    if versions.is_empty() {
        println!("\n{}", "No installable releases found.".yellow());
        println!("   Asset looked up: {}", client.config().asset_name(kind));
        return Ok(());
    }

    for version in versions {
        println!("   {}", version);
    }
    Ok(())
}

/// Install an asset version
async fn cmd_install(config: &PanelConfig, kind: AssetKind, version: &str) -> Result<()> {
    println!("{} {} {}", "📦 Installing".cyan().bold(), kind, version);

    let installer = ReleaseInstaller::new(release_client(config)?, InstallTargets::from_panel(config));
    install_unsupervised(&installer, kind, version)
        .await
        .with_context(|| format!("failed to install {kind} {version}"))?;

    println!(
        "\n{} {}",
        "✅ Installed to".green().bold(),
        installer.targets().path(kind).display()
    );
    if kind.requires_stop() {
        println!("   {}", "Restart the engine to run the new binary.".dimmed());
    }
    Ok(())
}

/// Print the engine log tail
async fn cmd_logs(config: &PanelConfig, count: usize, file: Option<PathBuf>) -> Result<()> {
    validate_log_count(count)?;

    let path = file.unwrap_or_else(|| config.engine_log.clone());
    let lines = FileLogStore::new(&path)
        .read_logs(count)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    if lines.is_empty() {
        println!("{} {}", "No log lines in".yellow(), path.display());
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// Print the effective configuration
fn cmd_config(config: &PanelConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
