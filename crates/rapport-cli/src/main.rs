//! Rapport CLI - Grouped ERP reports
//!
//! Usage:
//!   rapport reports                                         List reports
//!   rapport report bank-total --from 2025-01-01 --to 2025-01-31
//!   rapport report cashier --user jdoe --from ... --to ... --document caisse.txt
//!   rapport findall banques                                 Lookup collection
//!   rapport config show                                     Resolved configuration

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so report output can be piped
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.base_url.as_deref())?;

    match cli.command {
        Commands::Report { report_type } => {
            let (kind, params, args) = report_type.into_parts();
            commands::cmd_report(&config, kind, params, &args).await
        }
        Commands::Reports => {
            commands::cmd_reports_list();
            Ok(())
        }
        Commands::Findall { resource, limit } => {
            commands::cmd_findall(&config, &resource, limit).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                commands::cmd_config_show(&config);
                Ok(())
            }
            ConfigAction::Path => {
                commands::cmd_config_path(&config);
                Ok(())
            }
        },
    }
}
