//! Declared invoices by entering user, with HTVA and TVA totals
//!
//! The endpoint returns every generated invoice; records are kept only when
//! their entry date falls in the requested period. Undated or unparsable
//! entries are kept.

use super::{Cell, Column, Extra, Report, ReportKind};
use crate::filter::ReportFilter;
use crate::format::parse_backend_date;
use crate::grouping::{group_by, AmountField, Grouped};
use crate::models::InvoiceEntry;

pub struct InvoicesReport;

impl Report for InvoicesReport {
    type Record = InvoiceEntry;
    const KIND: ReportKind = ReportKind::Invoices;
    const FIELDS: &'static [AmountField<InvoiceEntry>] = &[
        AmountField::new("montant", |i: &InvoiceEntry| i.montant),
        AmountField::new("htva", |i: &InvoiceEntry| i.htva),
        AmountField::new("tva", |i: &InvoiceEntry| i.tva),
    ];

    fn columns() -> Vec<Column<InvoiceEntry>> {
        vec![
            Column::new("N° Facture", |i: &InvoiceEntry| Cell::text(i.facture_id.as_deref())),
            Column::new("Client", |i: &InvoiceEntry| Cell::text(i.client.as_deref())),
            Column::new("Déclarant", |i: &InvoiceEntry| Cell::text(i.declarant.as_deref())),
            Column::new("Marchandise", |i: &InvoiceEntry| Cell::text(i.marchandise.as_deref())),
            Column::money("Montant", |i: &InvoiceEntry| Cell::Money(i.montant), "montant"),
            Column::money("HTVA", |i: &InvoiceEntry| Cell::Money(i.htva), "htva"),
            Column::money("TVA", |i: &InvoiceEntry| Cell::Money(i.tva), "tva"),
            Column::new("Date Saisie", |i: &InvoiceEntry| Cell::date(i.date_saisie.as_deref())),
        ]
    }

    fn group(records: Vec<InvoiceEntry>) -> Grouped<InvoiceEntry> {
        group_by(records, InvoiceEntry::user_label, Self::FIELDS)
    }

    fn retain(record: &InvoiceEntry, filter: &ReportFilter) -> bool {
        match record.date_saisie.as_deref().and_then(parse_backend_date) {
            Some(day) => filter.contains(day),
            None => true,
        }
    }

    fn extras(grouped: &Grouped<InvoiceEntry>) -> Vec<Extra> {
        vec![Extra {
            label: "Nombre".to_string(),
            value: Cell::Count(grouped.record_count),
        }]
    }
}
