//! Dispensary consumption cost per partner

use super::{Cell, Column, Extra, Report, ReportKind};
use crate::grouping::{group_by, AmountField, Grouped};
use crate::models::Consumption;

pub struct ConsumptionReport;

impl Report for ConsumptionReport {
    type Record = Consumption;
    const KIND: ReportKind = ReportKind::Consumption;
    const FIELDS: &'static [AmountField<Consumption>] = &[
        AmountField::new("prixTotal", |c: &Consumption| c.prix_total),
        AmountField::new("qte", |c: &Consumption| c.qte),
    ];

    fn columns() -> Vec<Column<Consumption>> {
        vec![
            Column::new("Matricule", |c: &Consumption| Cell::text(c.matricule.as_deref())),
            Column::new("Nom", |c: &Consumption| Cell::text(c.nom.as_deref())),
            Column::new("Prénom", |c: &Consumption| Cell::text(c.prenom.as_deref())),
            Column::new("Date", |c: &Consumption| Cell::date(c.date_consommation.as_deref())),
            Column::new("Type", |c: &Consumption| Cell::text(c.type_consommation.as_deref())),
            Column::new("Prestation", |c: &Consumption| {
                Cell::text(c.libelle_prestation.as_deref())
            }),
            Column::new("Article", |c: &Consumption| Cell::text(c.libelle_article.as_deref())),
            Column::quantity("Quantité", |c: &Consumption| Cell::Quantity(c.qte), "qte"),
            Column::new("Prix Unitaire", |c: &Consumption| Cell::Money(c.pu)),
            Column::money("Total", |c: &Consumption| Cell::Money(c.prix_total), "prixTotal"),
            Column::new("Ayant Droit", |c: &Consumption| Cell::text(c.nom_ayant_droit.as_deref())),
        ]
    }

    fn group(records: Vec<Consumption>) -> Grouped<Consumption> {
        group_by(records, Consumption::partner_label, Self::FIELDS)
    }

    fn extras(grouped: &Grouped<Consumption>) -> Vec<Extra> {
        vec![
            Extra {
                label: "Nb. Partenaires".to_string(),
                value: Cell::Count(grouped.groups.len()),
            },
            Extra {
                label: "Nb. Consommations".to_string(),
                value: Cell::Count(grouped.record_count),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consumption(partner: Option<&str>, id: Option<&str>, total: f64) -> Consumption {
        Consumption {
            libelle: partner.map(str::to_string),
            partenaire_id: id.map(str::to_string),
            prix_total: Some(total),
            qte: Some(1.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_groups_by_partner_with_counts() {
        let records = vec![
            consumption(Some("MFP"), Some("1"), 2500.0),
            consumption(None, Some("7"), 1000.0),
            consumption(Some("MFP"), Some("1"), 500.0),
        ];
        let grouped = ConsumptionReport::group(records);

        assert_eq!(grouped.keys(), vec!["MFP", "Partenaire 7"]);
        let mfp = grouped.group("MFP").unwrap();
        assert_eq!(mfp.count, 2);
        assert_eq!(mfp.totals.get("prixTotal"), 3000.0);
        assert_eq!(grouped.grand_totals.get("prixTotal"), 4000.0);

        let extras = ConsumptionReport::extras(&grouped);
        assert_eq!(extras[0].value, Cell::Count(2));
        assert_eq!(extras[1].value, Cell::Count(3));
    }

    #[test]
    fn test_missing_price_is_zero() {
        let records = vec![Consumption {
            libelle: Some("ONATEL".into()),
            ..Default::default()
        }];
        let grouped = ConsumptionReport::group(records);
        assert_eq!(grouped.group("ONATEL").unwrap().totals.get("prixTotal"), 0.0);
        assert_eq!(grouped.group("ONATEL").unwrap().count, 1);
    }
}
