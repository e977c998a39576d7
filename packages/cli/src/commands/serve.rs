use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tessera_workspace::{init_tracing, AppState, Config, DEFAULT_LOG_FILTER};
use tracing::debug;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Site directory holding tessera.config.json
    #[arg(default_value = ".")]
    pub dir: String,

    /// Port (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host (overrides config)
    #[arg(long)]
    pub host: Option<String>,
}

pub fn serve(args: ServeArgs, cwd: &str) -> Result<()> {
    init_tracing(DEFAULT_LOG_FILTER);

    let root = PathBuf::from(cwd).join(&args.dir);
    let mut config = Config::load(&root)?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    debug!(root = %root.display(), ?config, "site config loaded");

    println!(
        "{} http://{}:{}",
        "🚀 Serving tessera site on".bright_blue().bold(),
        config.host,
        config.port
    );

    let state = AppState::from_config(config, &root)?;
    let runtime = tokio::runtime::Runtime::new().context("Cannot start async runtime")?;
    runtime.block_on(tessera_workspace::serve(state))
}
