//! Stock movement report
//!
//! Groups are category and store and, unlike the other reports, are
//! presented sorted: by category, then store. Articles are sorted by name
//! within each group. Sorting ignores accents and case.

use std::cmp::Ordering;

use super::{Cell, Column, Report, ReportKind};
use crate::format::compare_labels;
use crate::grouping::{group_by, AmountField, Grouped};
use crate::models::StockMovement;

/// Separator between category and store in a displayed group key
pub const KEY_SEPARATOR: &str = " | ";

/// Joins the parts of the grouping key; stripped from the labels
const KEY_UNIT: char = '\u{1f}';

fn group_key(m: &StockMovement) -> String {
    let clean = |label: String| label.replace(KEY_UNIT, " ");
    format!(
        "{}{}{}",
        clean(m.category_label()),
        KEY_UNIT,
        clean(m.store_label())
    )
}

fn key_parts(key: &str) -> (&str, &str) {
    key.split_once(KEY_UNIT).unwrap_or((key, ""))
}

fn compare_keys(a: &str, b: &str) -> Ordering {
    let (a_category, a_store) = key_parts(a);
    let (b_category, b_store) = key_parts(b);
    compare_labels(a_category, b_category).then_with(|| compare_labels(a_store, b_store))
}

fn display_key(key: &str) -> String {
    let (category, store) = key_parts(key);
    format!("{}{}{}", category, KEY_SEPARATOR, store)
}

pub struct StockMovementReport;

impl Report for StockMovementReport {
    type Record = StockMovement;
    const KIND: ReportKind = ReportKind::StockMovement;
    const FIELDS: &'static [AmountField<StockMovement>] = &[
        AmountField::new("situationInitiale.qte", |m: &StockMovement| m.opening().qte),
        AmountField::new("situationInitiale.montant", |m: &StockMovement| m.opening().montant),
        AmountField::new("entrees.qte", |m: &StockMovement| m.inbound().qte),
        AmountField::new("entrees.montant", |m: &StockMovement| m.inbound().montant),
        AmountField::new("sorties.qte", |m: &StockMovement| m.outbound().qte),
        AmountField::new("sorties.montant", |m: &StockMovement| m.outbound().montant),
        AmountField::new("stock.qte", |m: &StockMovement| m.closing().qte),
        AmountField::new("stock.montant", |m: &StockMovement| m.closing().montant),
    ];

    fn columns() -> Vec<Column<StockMovement>> {
        vec![
            Column::new("N° Pièce", |m: &StockMovement| Cell::text(m.numero_piece.as_deref())),
            Column::new("Article", |m: &StockMovement| Cell::text(m.nom_article.as_deref())),
            Column::new("Catalogue", |m: &StockMovement| Cell::text(m.catalogue.as_deref())),
            Column::quantity(
                "SI Qté",
                |m: &StockMovement| Cell::Quantity(m.opening().qte),
                "situationInitiale.qte",
            ),
            Column::money(
                "SI Montant",
                |m: &StockMovement| Cell::Money(m.opening().montant),
                "situationInitiale.montant",
            ),
            Column::quantity(
                "Entrées Qté",
                |m: &StockMovement| Cell::Quantity(m.inbound().qte),
                "entrees.qte",
            ),
            Column::money(
                "Entrées Montant",
                |m: &StockMovement| Cell::Money(m.inbound().montant),
                "entrees.montant",
            ),
            Column::quantity(
                "Sorties Qté",
                |m: &StockMovement| Cell::Quantity(m.outbound().qte),
                "sorties.qte",
            ),
            Column::money(
                "Sorties Montant",
                |m: &StockMovement| Cell::Money(m.outbound().montant),
                "sorties.montant",
            ),
            Column::quantity(
                "Stock Qté",
                |m: &StockMovement| Cell::Quantity(m.closing().qte),
                "stock.qte",
            ),
            Column::money(
                "Stock Montant",
                |m: &StockMovement| Cell::Money(m.closing().montant),
                "stock.montant",
            ),
        ]
    }

    fn group(records: Vec<StockMovement>) -> Grouped<StockMovement> {
        let mut grouped = group_by(records, group_key, Self::FIELDS)
            .sort_groups_by(|a, b| compare_keys(&a.key, &b.key));
        for group in &mut grouped.groups {
            group.key = display_key(&group.key);
            group.items.sort_by(|a, b| {
                compare_labels(
                    a.nom_article.as_deref().unwrap_or_default(),
                    b.nom_article.as_deref().unwrap_or_default(),
                )
            });
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QtyAmount, StoreRef};

    fn movement(category: &str, store: &str, article: &str, stock: f64) -> StockMovement {
        StockMovement {
            categorie: Some(category.to_string()),
            magasin: Some(StoreRef::Name(store.to_string())),
            nom_article: Some(article.to_string()),
            stock: Some(QtyAmount {
                qte: Some(stock),
                montant: Some(stock * 100.0),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_groups_sorted_by_category_then_store() {
        let records = vec![
            movement("Médicaments", "Central", "Paracétamol", 10.0),
            movement("Consommables", "Central", "Gants", 5.0),
            movement("Médicaments", "Annexe", "Amoxicilline", 2.0),
            movement("Consommables", "Central", "Compresses", 7.0),
        ];
        let grouped = StockMovementReport::group(records);

        assert_eq!(
            grouped.keys(),
            vec![
                "Consommables | Central",
                "Médicaments | Annexe",
                "Médicaments | Central"
            ]
        );

        let articles: Vec<&str> = grouped.groups[0]
            .items
            .iter()
            .filter_map(|m| m.nom_article.as_deref())
            .collect();
        assert_eq!(articles, vec!["Compresses", "Gants"]);
        assert_eq!(grouped.groups[0].totals.get("stock.qte"), 12.0);
        assert_eq!(grouped.grand_totals.get("stock.montant"), 2400.0);
        assert!(grouped.reconciles());
    }

    #[test]
    fn test_store_order_is_not_confused_by_category_prefix() {
        // "A | Z" must sort before "AB | A"
        let records = vec![
            movement("AB", "A", "x", 1.0),
            movement("A", "Z", "y", 1.0),
        ];
        let grouped = StockMovementReport::group(records);
        assert_eq!(grouped.keys(), vec!["A | Z", "AB | A"]);
    }

    #[test]
    fn test_accented_labels_sort_with_their_base_letter() {
        let records = vec![
            movement("Fournitures", "C", "x", 1.0),
            movement("Équipements", "C", "y", 1.0),
            movement("Équipements", "annexe", "z", 1.0),
            movement("Fournitures", "C", "écran", 1.0),
            movement("Fournitures", "C", "Stylo", 1.0),
            movement("Fournitures", "C", "agrafes", 1.0),
        ];
        let grouped = StockMovementReport::group(records);
        assert_eq!(
            grouped.keys(),
            vec!["Équipements | annexe", "Équipements | C", "Fournitures | C"]
        );

        let articles: Vec<&str> = grouped.groups[2]
            .items
            .iter()
            .filter_map(|m| m.nom_article.as_deref())
            .collect();
        assert_eq!(articles, vec!["agrafes", "écran", "Stylo", "x"]);
    }

    #[test]
    fn test_separator_inside_labels_keeps_groups_apart() {
        let records = vec![
            movement("A | B", "C", "x", 1.0),
            movement("A", "B | C", "y", 2.0),
        ];
        let grouped = StockMovementReport::group(records);
        assert_eq!(grouped.groups.len(), 2);
        assert_eq!(grouped.groups[0].count, 1);
        assert_eq!(grouped.groups[1].count, 1);
        assert_eq!(grouped.groups[0].totals.get("stock.qte"), 2.0);
        assert!(grouped.reconciles());
    }

    #[test]
    fn test_closing_derived_into_totals() {
        let records = vec![StockMovement {
            categorie: Some("Divers".into()),
            magasin_id: Some("4".into()),
            situation_initiale: Some(QtyAmount {
                qte: Some(10.0),
                montant: Some(1000.0),
            }),
            sorties: Some(QtyAmount {
                qte: Some(4.0),
                montant: Some(400.0),
            }),
            ..Default::default()
        }];
        let grouped = StockMovementReport::group(records);
        let group = grouped.group("Divers | 4").unwrap();
        assert_eq!(group.totals.get("stock.qte"), 6.0);
        assert_eq!(group.totals.get("stock.montant"), 600.0);
    }
}
