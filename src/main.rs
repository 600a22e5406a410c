mod domain;
mod clients;

mod app_system;
mod api;
mod migration;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod test_support;

mod actor_framework;
mod box_actor;
mod buyforme_actor;
mod customer_actor;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn, Instrument};

use crate::api::AppState;
use crate::app_system::{setup_tracing, Config, MarketplaceSystem};
use crate::domain::BuyForMeQuery;

#[derive(Parser, Debug)]
#[command(author, version, about = "hathak: BuyForMe requests and warehouse box contents", long_about = None)]
struct Cli {
    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API until Ctrl+C or SIGTERM.
    Serve,
    /// Split multi-item requests into one request per item.
    Migrate {
        /// Report what would be split without writing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Check the request store after migration; exits non-zero on any issue.
    Verify,
    /// Print request statistics.
    Stats,
}

fn print_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    let encoded = serde_json::to_string_pretty(value).context("failed to encode output")?;
    writeln!(out, "{encoded}")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup tracing once for the entire application
    setup_tracing();

    let cli = Cli::parse();
    let config = Config::load()?;
    let system = MarketplaceSystem::load(&config)?;

    let outcome = run(&cli, &config, &system, &mut io::stdout()).await;
    system.shutdown().await?;
    outcome
}

async fn run(cli: &Cli, config: &Config, system: &MarketplaceSystem, out: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Commands::Serve => {
            let span = tracing::info_span!("http_server", port = config.port);
            api::serve(config.port, AppState::from_system(system))
                .instrument(span)
                .await
        }
        Commands::Migrate { dry_run } => {
            let report = migration::migrate_individual_requests(&system.buyforme_client, *dry_run)
                .instrument(tracing::info_span!("migration", dry_run = *dry_run))
                .await?;
            if cli.json {
                print_json(out, &report)?;
            } else {
                if report.dry_run {
                    for plan in &report.planned {
                        writeln!(
                            out,
                            "would split {} ({} items, {} already split)",
                            plan.request_number, plan.item_count, plan.existing_children
                        )?;
                    }
                }
                writeln!(
                    out,
                    "found {}, migrated {}, created {}, reused {}, deleted {}",
                    report.records_found,
                    report.records_migrated,
                    report.requests_created,
                    report.requests_reused,
                    report.originals_deleted
                )?;
                for failure in &report.failures {
                    match failure.item_index {
                        Some(index) => writeln!(out, "FAILED {} item {}: {}", failure.request_number, index, failure.error)?,
                        None => writeln!(out, "FAILED {}: {}", failure.request_number, failure.error)?,
                    }
                }
            }
            if !report.is_success() {
                anyhow::bail!("migration finished with {} failures", report.failures.len());
            }
            info!("Migration completed successfully");
            Ok(())
        }
        Commands::Verify => {
            let requests = system.buyforme_client.find_requests(BuyForMeQuery::all()).await?;
            let report = migration::verify(&requests);
            if cli.json {
                print_json(out, &report)?;
            } else {
                writeln!(
                    out,
                    "{} requests, {} batches, {} split requests",
                    report.total_requests, report.batches, report.split_requests
                )?;
                for issue in &report.issues {
                    writeln!(out, "ISSUE {issue}")?;
                }
            }
            if !report.is_clean() {
                warn!(issues = report.issues.len(), "Verification failed");
                anyhow::bail!("verification found {} issues", report.issues.len());
            }
            info!("Verification passed");
            Ok(())
        }
        Commands::Stats => {
            let stats = system.buyforme_client.get_statistics().await?;
            if cli.json {
                print_json(out, &stats)?;
            } else {
                writeln!(out, "total requests: {}", stats.total_requests)?;
                writeln!(out, "total amount:   {:.2}", stats.total_amount)?;
                writeln!(out, "batches:        {}", stats.batches)?;
                for (status, bucket) in &stats.by_status {
                    writeln!(out, "  {:<12} {:>5} {:>12.2}", status.as_str(), bucket.count, bucket.amount)?;
                }
            }
            Ok(())
        }
    }
}
