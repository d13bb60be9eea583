//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rapport_core::ReportKind;

/// Rapport - Grouped reports from the ERP backend
#[derive(Parser)]
#[command(name = "rapport")]
#[command(about = "Grouped, totaled ERP reports for the terminal and print", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.local/share/rapport/config/rapport.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides config and RAPPORT_API_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a grouped report
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// List available reports
    Reports,

    /// Fetch a lookup collection ({resource}/findall)
    Findall {
        /// Resource name (e.g. banques, partenaires, magasins)
        resource: String,

        /// Number of records to print
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the resolved configuration
    Show,
    /// Print the config override path
    Path,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Options shared by every report
#[derive(Args, Clone, Debug)]
pub struct ReportArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub to: Option<String>,

    /// Output on stdout
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Write the printable document to this file
    #[arg(long)]
    pub document: Option<PathBuf>,

    /// Export grouped rows to this file (.json for the summary, CSV otherwise)
    #[arg(long, visible_alias = "csv")]
    pub export: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Payments of all desks by bank and payment mode
    BankTotal {
        #[command(flatten)]
        args: ReportArgs,
    },

    /// One cashier's payments by bank
    Cashier {
        /// Cashier login (userCreation)
        #[arg(long)]
        user: Option<String>,

        #[command(flatten)]
        args: ReportArgs,
    },

    /// One cashier's payments by bank, then payment mode
    CashierSummary {
        /// Cashier login (userCreation)
        #[arg(long)]
        user: Option<String>,

        #[command(flatten)]
        args: ReportArgs,
    },

    /// Dispensary consumption cost per partner
    Consumption {
        /// Employee number
        #[arg(long)]
        matricule: Option<String>,

        /// Partner ID
        #[arg(long)]
        partner: Option<String>,

        #[command(flatten)]
        args: ReportArgs,
    },

    /// Stock movements by category and store
    StockMovement {
        /// Store ID
        #[arg(long)]
        store: Option<String>,

        /// Category ID
        #[arg(long)]
        category: Option<String>,

        #[command(flatten)]
        args: ReportArgs,
    },

    /// Savings deposits by branch
    Deposits {
        /// Branch ID
        #[arg(long)]
        branch: Option<String>,

        /// Status: PENDING, COMPLETED, CANCELLED, REJECTED
        #[arg(long)]
        status: Option<String>,

        #[command(flatten)]
        args: ReportArgs,
    },

    /// Stock exits by destination service
    ExitsByDestination {
        /// Voucher number
        #[arg(long)]
        piece: Option<String>,

        /// Store ID
        #[arg(long)]
        store: Option<String>,

        /// Service ID
        #[arg(long)]
        service: Option<String>,

        /// Destination ID
        #[arg(long)]
        destination: Option<String>,

        #[command(flatten)]
        args: ReportArgs,
    },

    /// Invoices entered per user, with HTVA and TVA totals
    Invoices {
        #[command(flatten)]
        args: ReportArgs,
    },
}

impl ReportType {
    /// Report kind, secondary filters keyed by query parameter, shared args
    pub fn into_parts(self) -> (ReportKind, Vec<(&'static str, Option<String>)>, ReportArgs) {
        match self {
            ReportType::BankTotal { args } => (ReportKind::BankTotal, vec![], args),
            ReportType::Cashier { user, args } => {
                (ReportKind::Cashier, vec![("userCreation", user)], args)
            }
            ReportType::CashierSummary { user, args } => {
                (ReportKind::CashierSummary, vec![("userCreation", user)], args)
            }
            ReportType::Consumption {
                matricule,
                partner,
                args,
            } => (
                ReportKind::Consumption,
                vec![("matricule", matricule), ("partenaire", partner)],
                args,
            ),
            ReportType::StockMovement {
                store,
                category,
                args,
            } => (
                ReportKind::StockMovement,
                vec![("magasinId", store), ("categorieId", category)],
                args,
            ),
            ReportType::Deposits {
                branch,
                status,
                args,
            } => (
                ReportKind::Deposits,
                vec![("branchId", branch), ("status", status)],
                args,
            ),
            ReportType::ExitsByDestination {
                piece,
                store,
                service,
                destination,
                args,
            } => (
                ReportKind::ExitsByDestination,
                vec![
                    ("numeroPiece", piece),
                    ("magasinId", store),
                    ("serviceId", service),
                    ("destinationId", destination),
                ],
                args,
            ),
            ReportType::Invoices { args } => (ReportKind::Invoices, vec![], args),
        }
    }
}
