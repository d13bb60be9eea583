//! Cashier desk payment reports

use super::{Cell, Column, Report, ReportKind};
use crate::grouping::{group_by, AmountField, Grouped};
use crate::models::Payment;

const PAYMENT_FIELDS: &[AmountField<Payment>] = &[
    AmountField::new("montantFacture", Payment::montant_facture),
    AmountField::new("montantExcedent", |p: &Payment| p.montant_excedent),
    AmountField::new("montantPaye", |p: &Payment| p.montant_paye),
];

fn payment_columns() -> Vec<Column<Payment>> {
    vec![
        Column::new("Date", |p: &Payment| Cell::date(p.date_paiement.as_deref())),
        Column::new("No Facture", |p: &Payment| Cell::text(p.facture_id.as_deref())),
        Column::new("Bordereau", |p: &Payment| Cell::text(p.reference.as_deref())),
        Column::new("Client", |p: &Payment| Cell::text(p.nom_client.as_deref())),
        Column::new("Mode Paiement", |p: &Payment| Cell::text(p.mode_paiement.as_deref())),
        Column::money(
            "Montant Facture",
            |p: &Payment| Cell::Money(p.montant_facture()),
            "montantFacture",
        ),
        Column::money(
            "Montant Excédent",
            |p: &Payment| Cell::Money(p.montant_excedent),
            "montantExcedent",
        ),
        Column::money("Montant", |p: &Payment| Cell::Money(p.montant_paye), "montantPaye"),
    ]
}

/// All desks, by bank then payment mode
pub struct BankTotalReport;

impl Report for BankTotalReport {
    type Record = Payment;
    const KIND: ReportKind = ReportKind::BankTotal;
    const FIELDS: &'static [AmountField<Payment>] = PAYMENT_FIELDS;

    fn columns() -> Vec<Column<Payment>> {
        payment_columns()
    }

    fn group(records: Vec<Payment>) -> Grouped<Payment> {
        group_by(records, Payment::bank_label, Self::FIELDS)
            .subdivide(Payment::mode_label, Self::FIELDS)
    }
}

/// One cashier's payments, by bank
pub struct CashierReport;

impl Report for CashierReport {
    type Record = Payment;
    const KIND: ReportKind = ReportKind::Cashier;
    const FIELDS: &'static [AmountField<Payment>] = PAYMENT_FIELDS;

    fn columns() -> Vec<Column<Payment>> {
        payment_columns()
    }

    fn group(records: Vec<Payment>) -> Grouped<Payment> {
        group_by(records, Payment::bank_label, Self::FIELDS)
    }
}

/// One cashier's payments, by bank then payment mode
pub struct CashierSummaryReport;

impl Report for CashierSummaryReport {
    type Record = Payment;
    const KIND: ReportKind = ReportKind::CashierSummary;
    const FIELDS: &'static [AmountField<Payment>] = PAYMENT_FIELDS;

    fn columns() -> Vec<Column<Payment>> {
        payment_columns()
    }

    fn group(records: Vec<Payment>) -> Grouped<Payment> {
        BankTotalReport::group(records)
    }
}
