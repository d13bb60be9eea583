//! Report definitions
//!
//! Each report type is a zero-sized type implementing [`Report`]: which
//! endpoint to call, which amount fields to total, how to group, and which
//! columns to show. [`generate`] runs one of them against a
//! [`RecordSource`] and produces a [`ReportView`], the type-erased grouped
//! table every renderer and exporter works from.
//!
//! # Report kinds
//!
//! | Kind | Endpoint | Grouping |
//! |------|----------|----------|
//! | `bank-total` | `entryPayements/rapportBanqueTotal` | bank, then payment mode |
//! | `cashier` | `entryPayements/rapportCaissierByUser` | bank |
//! | `cashier-summary` | `entryPayements/rapportCaissierByUser` | bank, then payment mode |
//! | `consumption` | `stkConsommations/rapportConsommation` | partner |
//! | `stock-movement` | `mouvementStock/findall` | category and store, sorted |
//! | `deposits` | `api/epargne/reports/deposits` | branch |
//! | `exits-by-destination` | `stkSorties/rapportSorties` | destination |
//! | `invoices` | `factueUserSaisis/findall` | entering user |

mod consumption;
mod deposits;
mod exits;
mod invoices;
mod payments;
mod stock;

pub use consumption::ConsumptionReport;
pub use deposits::DepositsReport;
pub use exits::ExitsByDestinationReport;
pub use invoices::InvoicesReport;
pub use payments::{BankTotalReport, CashierReport, CashierSummaryReport};
pub use stock::StockMovementReport;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::filter::{DateParams, FilterParam, ReportFilter};
use crate::format::{amount_or_zero, format_backend_date, parse_backend_date, MoneyFormat};
use crate::grouping::{AmountField, Group, Grouped, GroupedSummary, Totals};
use crate::source::{fetch_records, RecordSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    BankTotal,
    Cashier,
    CashierSummary,
    Consumption,
    StockMovement,
    Deposits,
    ExitsByDestination,
    Invoices,
}

/// A secondary filter a report accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    /// Query parameter name
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
}

impl FilterSpec {
    const fn optional(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            required: false,
        }
    }

    const fn required(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            required: true,
        }
    }
}

impl ReportKind {
    pub fn all() -> &'static [ReportKind] {
        &[
            ReportKind::BankTotal,
            ReportKind::Cashier,
            ReportKind::CashierSummary,
            ReportKind::Consumption,
            ReportKind::StockMovement,
            ReportKind::Deposits,
            ReportKind::ExitsByDestination,
            ReportKind::Invoices,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::BankTotal => "bank-total",
            ReportKind::Cashier => "cashier",
            ReportKind::CashierSummary => "cashier-summary",
            ReportKind::Consumption => "consumption",
            ReportKind::StockMovement => "stock-movement",
            ReportKind::Deposits => "deposits",
            ReportKind::ExitsByDestination => "exits-by-destination",
            ReportKind::Invoices => "invoices",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::BankTotal => "Rapport Banque Total",
            ReportKind::Cashier => "Rapport Caissier",
            ReportKind::CashierSummary => "Rapport Caissier Résumé",
            ReportKind::Consumption => "Rapport des Consommations par Partenaire",
            ReportKind::StockMovement => "Rapport des Mouvements de Stock",
            ReportKind::Deposits => "Rapport des Dépôts",
            ReportKind::ExitsByDestination => "Rapport des Sorties par Destination",
            ReportKind::Invoices => "Rapport des Factures Envoyées",
        }
    }

    /// Backend path, relative to the API base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            ReportKind::BankTotal => "entryPayements/rapportBanqueTotal",
            ReportKind::Cashier | ReportKind::CashierSummary => {
                "entryPayements/rapportCaissierByUser"
            }
            ReportKind::Consumption => "stkConsommations/rapportConsommation",
            ReportKind::StockMovement => "mouvementStock/findall",
            ReportKind::Deposits => "api/epargne/reports/deposits",
            ReportKind::ExitsByDestination => "stkSorties/rapportSorties",
            ReportKind::Invoices => "factueUserSaisis/findall",
        }
    }

    pub fn date_params(&self) -> DateParams {
        match self {
            ReportKind::Deposits => DateParams::DATE_FROM_TO,
            ReportKind::Invoices => DateParams::DATE_DEBUT_FIN,
            _ => DateParams::DEBUT_FIN,
        }
    }

    pub fn filters(&self) -> &'static [FilterSpec] {
        const CASHIER: &[FilterSpec] = &[FilterSpec::required("userCreation", "Caissier")];
        const CONSUMPTION: &[FilterSpec] = &[
            FilterSpec::optional("matricule", "Matricule"),
            FilterSpec::optional("partenaire", "Partenaire"),
        ];
        const STOCK: &[FilterSpec] = &[
            FilterSpec::optional("magasinId", "Magasin"),
            FilterSpec::optional("categorieId", "Catégorie"),
        ];
        const DEPOSITS: &[FilterSpec] = &[
            FilterSpec::optional("branchId", "Agence"),
            FilterSpec::optional("status", "Statut"),
        ];
        const EXITS: &[FilterSpec] = &[
            FilterSpec::optional("numeroPiece", "N° Pièce"),
            FilterSpec::optional("magasinId", "Magasin"),
            FilterSpec::optional("serviceId", "Service"),
            FilterSpec::optional("destinationId", "Destination"),
        ];

        match self {
            ReportKind::BankTotal | ReportKind::Invoices => &[],
            ReportKind::Cashier | ReportKind::CashierSummary => CASHIER,
            ReportKind::Consumption => CONSUMPTION,
            ReportKind::StockMovement => STOCK,
            ReportKind::Deposits => DEPOSITS,
            ReportKind::ExitsByDestination => EXITS,
        }
    }

    /// Check required filters are present and no foreign filter is set
    pub fn check_filter(&self, filter: &ReportFilter) -> Result<()> {
        let specs = self.filters();
        for spec in specs.iter().filter(|s| s.required) {
            if filter.get(spec.name).is_none() {
                return Err(Error::InvalidFilter(format!(
                    "{} requires the '{}' filter ({})",
                    self, spec.name, spec.label
                )));
            }
        }
        for param in filter.params() {
            if !specs.iter().any(|s| s.name == param.name) {
                return Err(Error::InvalidFilter(format!(
                    "{} does not accept the '{}' filter",
                    self, param.name
                )));
            }
        }
        Ok(())
    }
}

impl ReportKind {
    /// All filter checks for this kind, generic and report-specific
    pub fn validate(&self, filter: &ReportFilter) -> Result<()> {
        self.check_filter(filter)?;
        match self {
            ReportKind::BankTotal => BankTotalReport::validate(filter),
            ReportKind::Cashier => CashierReport::validate(filter),
            ReportKind::CashierSummary => CashierSummaryReport::validate(filter),
            ReportKind::Consumption => ConsumptionReport::validate(filter),
            ReportKind::StockMovement => StockMovementReport::validate(filter),
            ReportKind::Deposits => DepositsReport::validate(filter),
            ReportKind::ExitsByDestination => ExitsByDestinationReport::validate(filter),
            ReportKind::Invoices => InvoicesReport::validate(filter),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        ReportKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| Error::UnknownReport(s.to_string()))
    }
}

/// One displayed value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Cell {
    Text(String),
    Money(Option<f64>),
    Quantity(Option<f64>),
    /// Backend date string, rendered as `dd/mm/yyyy`
    Date(Option<String>),
    Count(usize),
}

impl Cell {
    pub fn text(value: Option<&str>) -> Self {
        Cell::Text(value.map(str::trim).unwrap_or_default().to_string())
    }

    pub fn date(value: Option<&str>) -> Self {
        Cell::Date(value.map(str::to_string))
    }

    /// Display string for tables and documents
    pub fn display(&self, format: &MoneyFormat) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Money(v) => format.currency(*v),
            Cell::Quantity(v) => format.quantity(*v),
            Cell::Date(v) => format_backend_date(v.as_deref()),
            Cell::Count(n) => n.to_string(),
        }
    }

    /// Machine-readable string for CSV: unformatted numbers, ISO dates
    pub fn plain(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Money(v) | Cell::Quantity(v) => amount_or_zero(*v).to_string(),
            Cell::Date(v) => v
                .as_deref()
                .and_then(parse_backend_date)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            Cell::Count(n) => n.to_string(),
        }
    }

    /// Numbers are right-aligned
    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Money(_) | Cell::Quantity(_) | Cell::Count(_))
    }
}

/// What a column shows on subtotal and grand-total rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Total {
    None,
    Money(&'static str),
    Quantity(&'static str),
}

impl Total {
    fn cell(&self, totals: &Totals) -> Option<Cell> {
        match *self {
            Total::None => None,
            Total::Money(field) => Some(Cell::Money(Some(totals.get(field)))),
            Total::Quantity(field) => Some(Cell::Quantity(Some(totals.get(field)))),
        }
    }
}

pub struct Column<R> {
    pub header: &'static str,
    pub value: fn(&R) -> Cell,
    pub total: Total,
}

impl<R> Column<R> {
    pub const fn new(header: &'static str, value: fn(&R) -> Cell) -> Self {
        Self {
            header,
            value,
            total: Total::None,
        }
    }

    pub const fn money(header: &'static str, value: fn(&R) -> Cell, field: &'static str) -> Self {
        Self {
            header,
            value,
            total: Total::Money(field),
        }
    }

    pub const fn quantity(
        header: &'static str,
        value: fn(&R) -> Cell,
        field: &'static str,
    ) -> Self {
        Self {
            header,
            value,
            total: Total::Quantity(field),
        }
    }
}

/// A labelled figure shown under the grand total (averages, counts)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extra {
    pub label: String,
    pub value: Cell,
}

/// A report type: endpoint, totals, grouping and columns
pub trait Report {
    type Record: DeserializeOwned + Send + 'static;

    const KIND: ReportKind;

    /// Amount fields summed per group and overall
    const FIELDS: &'static [AmountField<Self::Record>];

    fn columns() -> Vec<Column<Self::Record>>;

    fn group(records: Vec<Self::Record>) -> Grouped<Self::Record>;

    /// Report-specific filter checks, run before any request
    fn validate(_filter: &ReportFilter) -> Result<()> {
        Ok(())
    }

    /// Client-side record filter, for endpoints that ignore the period
    fn retain(_record: &Self::Record, _filter: &ReportFilter) -> bool {
        true
    }

    fn extras(_grouped: &Grouped<Self::Record>) -> Vec<Extra> {
        Vec::new()
    }
}

/// Grouped table ready for rendering
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub kind: ReportKind,
    pub title: String,
    pub period: String,
    pub filters: Vec<FilterParam>,
    /// Collection label sent by the backend, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub headers: Vec<&'static str>,
    pub groups: Vec<ViewGroup>,
    /// Per column; `None` where the column has no total
    pub grand_totals: Vec<Option<Cell>>,
    pub extras: Vec<Extra>,
    pub record_count: usize,
    #[serde(skip)]
    pub summary: GroupedSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewGroup {
    pub key: String,
    pub count: usize,
    pub totals: Vec<Option<Cell>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Vec<Cell>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subgroups: Vec<ViewGroup>,
}

impl ViewGroup {
    fn build<R>(group: &Group<R>, columns: &[Column<R>]) -> Self {
        Self {
            key: group.key.clone(),
            count: group.count,
            totals: columns.iter().map(|c| c.total.cell(&group.totals)).collect(),
            rows: group
                .items
                .iter()
                .map(|record| columns.iter().map(|c| (c.value)(record)).collect())
                .collect(),
            subgroups: group
                .subgroups
                .iter()
                .map(|g| ViewGroup::build(g, columns))
                .collect(),
        }
    }

    /// Leaf rows, depth first
    pub fn all_rows(&self) -> Vec<&Vec<Cell>> {
        if self.subgroups.is_empty() {
            self.rows.iter().collect()
        } else {
            self.subgroups.iter().flat_map(ViewGroup::all_rows).collect()
        }
    }
}

impl ReportView {
    pub fn build<Rep: Report>(
        grouped: &Grouped<Rep::Record>,
        filter: &ReportFilter,
        label: Option<String>,
    ) -> Self {
        let columns = Rep::columns();
        Self {
            kind: Rep::KIND,
            title: Rep::KIND.title().to_string(),
            period: filter.period_label(),
            filters: filter.params().to_vec(),
            label,
            headers: columns.iter().map(|c| c.header).collect(),
            groups: grouped
                .groups
                .iter()
                .map(|g| ViewGroup::build(g, &columns))
                .collect(),
            grand_totals: columns
                .iter()
                .map(|c| c.total.cell(&grouped.grand_totals))
                .collect(),
            extras: Rep::extras(grouped),
            record_count: grouped.record_count,
            summary: grouped.summary(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

/// Fetch, group and shape one report
pub async fn generate<Rep, S>(source: &S, filter: &ReportFilter) -> Result<ReportView>
where
    Rep: Report,
    S: RecordSource + ?Sized,
{
    Rep::KIND.check_filter(filter)?;
    Rep::validate(filter)?;

    let query = filter.query(Rep::KIND.date_params());
    let envelope = fetch_records::<Rep::Record, S>(source, Rep::KIND.endpoint(), &query).await?;
    let label = envelope.label().map(str::to_string);

    let records: Vec<Rep::Record> = envelope
        .into_records()
        .into_iter()
        .filter(|record| Rep::retain(record, filter))
        .collect();
    let grouped = Rep::group(records);
    if !grouped.reconciles() {
        warn!("{}: group totals do not reconcile with grand totals", Rep::KIND);
    }
    info!(
        "{}: {} records in {} groups",
        Rep::KIND,
        grouped.record_count,
        grouped.groups.len()
    );

    Ok(ReportView::build::<Rep>(&grouped, filter, label))
}

/// [`generate`] for a kind chosen at runtime
pub async fn generate_kind<S>(source: &S, kind: ReportKind, filter: &ReportFilter) -> Result<ReportView>
where
    S: RecordSource + ?Sized,
{
    match kind {
        ReportKind::BankTotal => generate::<BankTotalReport, S>(source, filter).await,
        ReportKind::Cashier => generate::<CashierReport, S>(source, filter).await,
        ReportKind::CashierSummary => generate::<CashierSummaryReport, S>(source, filter).await,
        ReportKind::Consumption => generate::<ConsumptionReport, S>(source, filter).await,
        ReportKind::StockMovement => generate::<StockMovementReport, S>(source, filter).await,
        ReportKind::Deposits => generate::<DepositsReport, S>(source, filter).await,
        ReportKind::ExitsByDestination => {
            generate::<ExitsByDestinationReport, S>(source, filter).await
        }
        ReportKind::Invoices => generate::<InvoicesReport, S>(source, filter).await,
    }
}
