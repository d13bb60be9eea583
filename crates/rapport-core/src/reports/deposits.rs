//! Savings deposits by branch

use super::{Cell, Column, Extra, Report, ReportKind};
use crate::error::{Error, Result};
use crate::filter::ReportFilter;
use crate::grouping::{group_by, AmountField, Grouped};
use crate::models::Deposit;

/// Status codes the deposits endpoint understands
pub const DEPOSIT_STATUSES: &[&str] = &["PENDING", "COMPLETED", "CANCELLED", "REJECTED"];

pub struct DepositsReport;

impl Report for DepositsReport {
    type Record = Deposit;
    const KIND: ReportKind = ReportKind::Deposits;
    const FIELDS: &'static [AmountField<Deposit>] =
        &[AmountField::new("totalAmount", Deposit::deposited)];

    fn columns() -> Vec<Column<Deposit>> {
        vec![
            Column::new("N° Bordereau", |d: &Deposit| Cell::text(d.slip_number.as_deref())),
            Column::new("Date", |d: &Deposit| Cell::date(d.deposit_date.as_deref())),
            Column::new("Client", |d: &Deposit| Cell::text(d.client_name.as_deref())),
            Column::new("N° Compte", |d: &Deposit| Cell::text(d.account_number.as_deref())),
            Column::new("Origine des fonds", |d: &Deposit| {
                Cell::text(d.source_of_funds.as_deref())
            }),
            Column::new("Statut", |d: &Deposit| Cell::Text(d.status_label())),
            Column::new("Traité par", |d: &Deposit| Cell::text(d.processed_by.as_deref())),
            Column::money("Montant", |d: &Deposit| Cell::Money(d.deposited()), "totalAmount"),
        ]
    }

    fn group(records: Vec<Deposit>) -> Grouped<Deposit> {
        group_by(records, Deposit::branch_label, Self::FIELDS)
    }

    fn validate(filter: &ReportFilter) -> Result<()> {
        match filter.get("status") {
            Some(status) if !DEPOSIT_STATUSES.contains(&status) => Err(Error::InvalidFilter(
                format!(
                    "unknown deposit status '{}' (expected one of {})",
                    status,
                    DEPOSIT_STATUSES.join(", ")
                ),
            )),
            _ => Ok(()),
        }
    }

    fn extras(grouped: &Grouped<Deposit>) -> Vec<Extra> {
        let total = grouped.grand_totals.get("totalAmount");
        let average = if grouped.record_count == 0 {
            0.0
        } else {
            total / grouped.record_count as f64
        };
        vec![
            Extra {
                label: "Nombre de dépôts".to_string(),
                value: Cell::Count(grouped.record_count),
            },
            Extra {
                label: "Moyenne par dépôt".to_string(),
                value: Cell::Money(Some(average)),
            },
        ]
    }
}
