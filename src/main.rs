//! # Tenancy CLI
//!
//! Operator entry point: schema migrations, the tenant backfill, its
//! development rollback, status inspection and the admin API.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tenancy::{
    backfill::{self, BackfillOptions, TenantBackfill},
    config::{AppConfig, ConfigLoader},
    db,
    migration::{Migrator, MigratorTrait},
    server::run_server,
    telemetry,
};

#[derive(Parser)]
#[command(name = "tenancy", about = "Multi-tenant migration tooling for the CRM", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending schema migrations
    Migrate {
        /// Revert applied migrations instead
        #[arg(long)]
        down: bool,
        /// Number of migrations to apply or revert (default: all)
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Assign every unowned row to the default tenant
    Backfill {
        /// Provision support rows without wrapping them in a transaction
        #[arg(long)]
        no_transaction: bool,
    },
    /// Clear tenant associations on all domain tables (development only)
    Rollback {
        /// Allow rollback outside the local and test profiles
        #[arg(long)]
        force: bool,
    },
    /// Report unassigned rows and support-row presence
    Status,
    /// Run the operator admin API
    Serve,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    telemetry::init_tracing(&config).context("initializing telemetry")?;

    if let Ok(redacted) = config.redacted_json() {
        tracing::debug!(config = %redacted, "Loaded configuration");
    }
    tracing::info!(profile = %config.profile, "Configuration loaded");

    match cli.command {
        Command::Serve => {
            config
                .validate_for_server()
                .context("validating server configuration")?;
            let db = connect(&config).await?;
            run_server(Arc::new(config), db).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Migrate { down, steps } => {
            let db = connect(&config).await?;
            if down {
                Migrator::down(&db, steps)
                    .await
                    .context("reverting migrations")?;
                tracing::info!(?steps, "Migrations reverted");
            } else {
                Migrator::up(&db, steps)
                    .await
                    .context("applying migrations")?;
                tracing::info!(?steps, "Migrations applied");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Backfill { no_transaction } => {
            let db = connect(&config).await?;
            let mut options = BackfillOptions::from(&config.backfill);
            if no_transaction {
                options.transactional_provisioning = false;
            }
            let report = TenantBackfill::new(&db)
                .with_options(options)
                .run()
                .await
                .context("running tenant backfill")?;
            print_json(&report)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Rollback { force } => {
            backfill::ensure_rollback_allowed(&config, force)?;
            let db = connect(&config).await?;
            let report = backfill::rollback_backfill(&db)
                .await
                .context("rolling back tenant backfill")?;
            print_json(&report)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Status => {
            let db = connect(&config).await?;
            let status = backfill::tenancy_status(&db)
                .await
                .context("reading tenancy status")?;
            print_json(&status)?;
            if status.is_complete() {
                Ok(ExitCode::SUCCESS)
            } else {
                tracing::warn!(
                    unassigned = status.total_unassigned(),
                    "Domain rows without a tenant remain"
                );
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

async fn connect(config: &AppConfig) -> Result<sea_orm::DatabaseConnection> {
    db::init_pool(config)
        .await
        .context("initializing database connection pool")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("serializing report")?;
    println!("{rendered}");
    Ok(())
}
