//! extrateto-sync - command-line entry point
//!
//! Syncs DadosJusBr payroll data into the local SQLite database, or wipes /
//! seeds it, depending on the flags given.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use extrateto_common::config::{database_path, load_toml_config, resolve_root_folder, TomlConfig};
use extrateto_sync::db::{self, membros};
use extrateto_sync::{seed, Args, DadosJusBrClient, SyncError, SyncOrchestrator, SyncPlan, SyncSettings};

const DEFAULT_LOG_FILTER: &str = "extrateto_sync=info,extrateto_common=info";

fn init_tracing(config: &TomlConfig) {
    let fallback = config
        .logging
        .level
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_toml_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config);

    let plan = match args.plan(Local::now().date_naive(), config.sync.start_year) {
        Ok(plan) => plan,
        Err(SyncError::InvalidInput(message)) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&args, &config, plan).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Sync failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, config: &TomlConfig, plan: SyncPlan) -> Result<()> {
    let root_folder = resolve_root_folder(args.root_folder.as_deref(), config);
    let db_path = database_path(&root_folder);
    info!("Root folder: {}", root_folder.display());

    let pool = db::init_database_pool(&db_path)
        .await
        .context("Failed to initialize database")?;

    match plan {
        SyncPlan::Fresh => {
            membros::wipe_all(&pool).await.context("Failed to wipe database")?;
            println!("Database wiped: members, history and sync log removed.");
        }
        SyncPlan::Seed => {
            let ceilings = config.ceiling_schedule()?;
            let written = seed::seed_database(&pool, &ceilings)
                .await
                .context("Failed to seed database")?;
            println!("Seeded {} placeholder members for {}-{:02}.", written, seed::SEED_YEAR, seed::SEED_MONTH);
        }
        SyncPlan::Months { months, force } => {
            let settings = SyncSettings::from_config(config)?;
            let client = DadosJusBrClient::new(config.api_url(), Duration::from_secs(config.source.request_timeout_secs))
                .context("Failed to build HTTP client")?;
            info!(source = client.base_url(), "Using DadosJusBr endpoint");
            let orchestrator = SyncOrchestrator::new(pool.clone(), Arc::new(client), settings);

            info!(months = months.len(), force, "Starting sync");
            let run = orchestrator.sync_months(&months, force).await?;

            for outcome in &run.months {
                println!("{}", outcome);
            }
            println!("{}", run);
        }
    }

    pool.close().await;
    Ok(())
}
