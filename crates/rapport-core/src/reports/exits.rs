//! Stock exits by destination

use super::{Cell, Column, Extra, Report, ReportKind};
use crate::grouping::{group_by, AmountField, Grouped};
use crate::models::StockExit;

pub struct ExitsByDestinationReport;

impl Report for ExitsByDestinationReport {
    type Record = StockExit;
    const KIND: ReportKind = ReportKind::ExitsByDestination;
    const FIELDS: &'static [AmountField<StockExit>] = &[
        AmountField::new("qteS", |e: &StockExit| e.qte_s),
        AmountField::new("montant", |e: &StockExit| e.montant),
    ];

    fn columns() -> Vec<Column<StockExit>> {
        vec![
            Column::new("Numéro Pièce", |e: &StockExit| Cell::text(e.numero_piece.as_deref())),
            Column::new("Date Sortie", |e: &StockExit| Cell::date(e.date_sortie.as_deref())),
            Column::new("Article", |e: &StockExit| Cell::text(e.article_libelle.as_deref())),
            Column::new("Unité", |e: &StockExit| Cell::text(e.unite_libelle.as_deref())),
            Column::quantity("Quantité", |e: &StockExit| Cell::Quantity(e.qte_s), "qteS"),
            Column::new("Prix Unitaire", |e: &StockExit| Cell::Money(e.prix_s)),
            Column::new("Total", |e: &StockExit| Cell::Money(e.prix_total)),
            Column::new("Service destination", |e: &StockExit| {
                Cell::text(e.magasin_nom.as_deref())
            }),
            Column::money("Montant", |e: &StockExit| Cell::Money(e.montant), "montant"),
        ]
    }

    fn group(records: Vec<StockExit>) -> Grouped<StockExit> {
        group_by(records, StockExit::destination_label, Self::FIELDS)
    }

    fn extras(grouped: &Grouped<StockExit>) -> Vec<Extra> {
        vec![
            Extra {
                label: "Total Sorties".to_string(),
                value: Cell::Count(grouped.record_count),
            },
            Extra {
                label: "Destinations".to_string(),
                value: Cell::Count(grouped.groups.len()),
            },
        ]
    }
}
