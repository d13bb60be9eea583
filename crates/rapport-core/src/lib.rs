//! Rapport Core Library
//!
//! Grouped report aggregation over an ERP REST backend:
//! - HTTP client and response envelope normalisation
//! - Report filters with client-side validation
//! - Generic grouping reducer with per-group and grand totals
//! - Report definitions (payments, consumption, stock, exits, deposits, invoices)
//! - Generation state machine
//! - Currency and date formatting
//! - Table and paginated document renderers, CSV/JSON export
//! - Layered TOML configuration

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod export;
pub mod filter;
pub mod format;
pub mod grouping;
pub mod models;
pub mod render;
pub mod reports;
pub mod runner;
pub mod source;

/// Test utilities including mock ERP backend
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::ReportClient;
pub use config::{default_config_path, ApiConfig, Config, DocumentConfig};
pub use envelope::Envelope;
pub use error::{Error, Result};
pub use export::{ExportFormat, ReportExport};
pub use filter::{DateParams, FilterParam, ReportFilter};
pub use format::{
    collation_key, compare_labels, format_amount, format_backend_date, format_currency,
    format_date, format_datetime, format_quantity, parse_backend_date, MoneyFormat, INVALID_DATE,
};
pub use grouping::{group_by, AmountField, Group, Grouped, GroupedSummary, Totals};
pub use models::{Consumption, Deposit, InvoiceEntry, Payment, StockExit, StockMovement};
pub use reports::{
    generate, generate_kind, BankTotalReport, CashierReport, CashierSummaryReport, Cell,
    ConsumptionReport, DepositsReport, ExitsByDestinationReport, FilterSpec, InvoicesReport,
    Report, ReportKind, ReportView, StockMovementReport, ViewGroup,
};
pub use runner::{ReportRunner, ReportState, Ticket, FETCH_FAILED_MESSAGE, NO_RECORDS_MESSAGE};
pub use source::{fetch_records, RecordSource, StaticSource};
