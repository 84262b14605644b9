use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use retrend_cli::cli::{run, Cli, CliConfig, Printer};
use retrend_core::session::FileStorage;
use retrend_core::tracing_setup::init_tracing_with_default;
use retrend_core::{CoreConfig, HttpApi, NavigationShell, SessionStore};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Keep stdout clean for command output; RUST_LOG still overrides
    if let Err(e) = init_tracing_with_default("warn") {
        eprintln!("Warning: {:#}", e);
    }

    if let Err(e) = run_cli(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_cli(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let printer = Printer::new(cli.json, cli.pretty);

    let storage = FileStorage::new(config.session_file());
    let session = SessionStore::open(Box::new(storage))
        .with_context(|| format!("Failed to open session at {}", config.session_file().display()))?
        .shared();
    let api = Arc::new(HttpApi::new(&config).context("Failed to build HTTP client")?);

    let mut shell = NavigationShell::boot(config, api, session).await;
    run(cli.command, &mut shell, printer).await
}

/// Environment first, then the JSON file given with --config
fn load_config(cli: &Cli) -> Result<CoreConfig> {
    let core = CoreConfig::from_env();
    match &cli.config {
        Some(path) => Ok(CliConfig::load(path)?.apply(core)),
        None => Ok(core),
    }
}
