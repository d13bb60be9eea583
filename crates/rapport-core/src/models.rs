//! Record DTOs as the ERP backend sends them
//!
//! Field names follow the backend's camelCase JSON. Every amount is optional
//! and accepts either a JSON number or a numeric string; identifiers accept
//! numbers or strings.

use serde::{Deserialize, Deserializer, Serialize};

/// Label used when a grouping field is missing
pub const UNDEFINED_LABEL: &str = "Non défini";

/// A payment entered at a cashier desk (bank and cashier reports)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub facture_id: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub nom_client: Option<String>,
    #[serde(default)]
    pub date_paiement: Option<String>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub montant_paye: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub montant_excedent: Option<f64>,
    #[serde(default)]
    pub nom_banque: Option<String>,
    #[serde(default)]
    pub mode_paiement: Option<String>,
    #[serde(default)]
    pub user_creation: Option<String>,
}

impl Payment {
    /// Invoice share of the payment: amount paid minus overpayment
    pub fn montant_facture(&self) -> Option<f64> {
        match (self.montant_paye, self.montant_excedent) {
            (None, None) => None,
            (paid, excess) => Some(paid.unwrap_or(0.0) - excess.unwrap_or(0.0)),
        }
    }

    pub fn bank_label(&self) -> String {
        label_or_undefined(self.nom_banque.as_deref())
    }

    pub fn mode_label(&self) -> String {
        label_or_undefined(self.mode_paiement.as_deref())
    }
}

/// A medical consumption charged to a partner (dispensary reports)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consumption {
    #[serde(default)]
    pub matricule: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub prenom: Option<String>,
    #[serde(default)]
    pub date_consommation: Option<String>,
    #[serde(default)]
    pub type_consommation: Option<String>,
    #[serde(default)]
    pub libelle_prestation: Option<String>,
    #[serde(default)]
    pub libelle_article: Option<String>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub qte: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub pu: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub prix_total: Option<f64>,
    #[serde(default)]
    pub nom_ayant_droit: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub partenaire_id: Option<String>,
    /// Partner label
    #[serde(default)]
    pub libelle: Option<String>,
}

impl Consumption {
    pub fn partner_label(&self) -> String {
        match (self.libelle.as_deref(), self.partenaire_id.as_deref()) {
            (Some(label), _) if !label.trim().is_empty() => label.trim().to_string(),
            (_, Some(id)) if !id.trim().is_empty() => format!("Partenaire {}", id.trim()),
            _ => UNDEFINED_LABEL.to_string(),
        }
    }
}

/// Quantity and value pair used by stock movement columns
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QtyAmount {
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub qte: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub montant: Option<f64>,
}

/// Store reference: the backend sends either a name or an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreRef {
    Name(String),
    Object {
        #[serde(default)]
        nom: Option<String>,
    },
}

/// One article line of a stock movement report
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub numero_piece: Option<String>,
    #[serde(default)]
    pub nom_article: Option<String>,
    #[serde(default)]
    pub catalogue: Option<String>,
    #[serde(default)]
    pub categorie: Option<String>,
    #[serde(default)]
    pub magasin_nom: Option<String>,
    #[serde(default)]
    pub magasin: Option<StoreRef>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub magasin_id: Option<String>,
    #[serde(default)]
    pub situation_initiale: Option<QtyAmount>,
    #[serde(default)]
    pub entrees: Option<QtyAmount>,
    #[serde(default)]
    pub sorties: Option<QtyAmount>,
    #[serde(default)]
    pub stock: Option<QtyAmount>,
}

impl StockMovement {
    pub fn category_label(&self) -> String {
        match self.categorie.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => "Non classé".to_string(),
        }
    }

    /// `magasinNom`, then the `magasin` name, then the store id
    pub fn store_label(&self) -> String {
        let nested = match &self.magasin {
            Some(StoreRef::Name(name)) => Some(name.as_str()),
            Some(StoreRef::Object { nom }) => nom.as_deref(),
            None => None,
        };
        [self.magasin_nom.as_deref(), nested, self.magasin_id.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|label| !label.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| "Magasin non défini".to_string())
    }

    pub fn opening(&self) -> QtyAmount {
        self.situation_initiale.unwrap_or_default()
    }

    pub fn inbound(&self) -> QtyAmount {
        self.entrees.unwrap_or_default()
    }

    pub fn outbound(&self) -> QtyAmount {
        self.sorties.unwrap_or_default()
    }

    /// Closing stock; when the backend omits it, opening + in − out
    pub fn closing(&self) -> QtyAmount {
        if let Some(stock) = self.stock {
            return stock;
        }
        let (o, i, s) = (self.opening(), self.inbound(), self.outbound());
        let derive = |a: Option<f64>, b: Option<f64>, c: Option<f64>| match (a, b, c) {
            (None, None, None) => None,
            _ => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0) - c.unwrap_or(0.0)),
        };
        QtyAmount {
            qte: derive(o.qte, i.qte, s.qte),
            montant: derive(o.montant, i.montant, s.montant),
        }
    }
}

/// One stock exit line (exits by destination report)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockExit {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub numero_piece: Option<String>,
    #[serde(default)]
    pub date_sortie: Option<String>,
    #[serde(default)]
    pub article_libelle: Option<String>,
    #[serde(default)]
    pub unite_libelle: Option<String>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub qte_s: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub prix_s: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub prix_total: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub montant: Option<f64>,
    /// Destination service store
    #[serde(default)]
    pub magasin_nom: Option<String>,
    #[serde(default)]
    pub destination_libelle: Option<String>,
}

impl StockExit {
    pub fn destination_label(&self) -> String {
        match self.destination_libelle.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => "Non spécifié".to_string(),
        }
    }
}

/// An invoice entered by a user and declared to the tax office
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceEntry {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub facture_id: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub declarant: Option<String>,
    #[serde(default)]
    pub marchandise: Option<String>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub montant: Option<f64>,
    /// Amount before tax
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub htva: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub tva: Option<f64>,
    #[serde(default)]
    pub date_saisie: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub user_id: Option<String>,
}

impl InvoiceEntry {
    pub fn user_label(&self) -> String {
        label_or_undefined(self.user_id.as_deref())
    }
}

/// A savings deposit slip (microfinance reports)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub slip_number: Option<String>,
    #[serde(default)]
    pub deposit_date: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_number: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub total_amount: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub processed_by: Option<String>,
    #[serde(default)]
    pub source_of_funds: Option<String>,
}

impl Deposit {
    /// `totalAmount`, else `amount`
    pub fn deposited(&self) -> Option<f64> {
        self.total_amount.filter(|v| *v != 0.0).or(self.amount)
    }

    pub fn branch_label(&self) -> String {
        label_or_undefined(self.branch_name.as_deref())
    }

    /// French label for the backend status code
    pub fn status_label(&self) -> String {
        match self.status.as_deref() {
            Some("PENDING") => "En Attente".to_string(),
            Some("COMPLETED") => "Validé".to_string(),
            Some("CANCELLED") => "Annulé".to_string(),
            Some("REJECTED") => "Rejeté".to_string(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

fn label_or_undefined(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNDEFINED_LABEL.to_string(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Amount as number, numeric string, or null
fn de_opt_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::Text(s)) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '\u{202f}')
                .collect();
            cleaned.replace(',', ".").parse::<f64>().ok()
        }
        None => None,
    })
}

/// Identifier as number, string, or null
fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let raw: Option<Id> = Option::deserialize(deserializer)?;
    Ok(raw.map(|id| match id {
        Id::Int(n) => n.to_string(),
        Id::Float(f) => f.to_string(),
        Id::Text(s) => s,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_deserialize() {
        let json = r#"{
            "factureId": 1042,
            "reference": "BRD-77",
            "nomClient": "SOBUGEA",
            "datePaiement": "2025-01-15T09:30:00",
            "montantPaye": 150000,
            "montantExcedent": null,
            "nomBanque": "BRB",
            "modePaiement": "VIREMENT"
        }"#;
        let p: Payment = serde_json::from_str(json).unwrap();
        assert_eq!(p.facture_id.as_deref(), Some("1042"));
        assert_eq!(p.montant_paye, Some(150000.0));
        assert_eq!(p.montant_excedent, None);
        assert_eq!(p.montant_facture(), Some(150000.0));
        assert_eq!(p.bank_label(), "BRB");
    }

    #[test]
    fn test_payment_invoice_amount() {
        let p = Payment {
            montant_paye: Some(1000.0),
            montant_excedent: Some(150.0),
            ..Default::default()
        };
        assert_eq!(p.montant_facture(), Some(850.0));
        assert_eq!(Payment::default().montant_facture(), None);
    }

    #[test]
    fn test_missing_grouping_field_label() {
        let p = Payment {
            nom_banque: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(p.bank_label(), UNDEFINED_LABEL);
        assert_eq!(p.mode_label(), UNDEFINED_LABEL);
    }

    #[test]
    fn test_string_amounts() {
        let d: Deposit =
            serde_json::from_str(r#"{"totalAmount": "12 500,50", "branchName": "Gitega"}"#)
                .unwrap();
        assert_eq!(d.total_amount, Some(12500.5));

        let d: Deposit = serde_json::from_str(r#"{"totalAmount": "n/a", "amount": 300}"#).unwrap();
        assert_eq!(d.total_amount, None);
        assert_eq!(d.deposited(), Some(300.0));
    }

    #[test]
    fn test_deposit_zero_total_falls_back_to_amount() {
        let d = Deposit {
            total_amount: Some(0.0),
            amount: Some(75.0),
            ..Default::default()
        };
        assert_eq!(d.deposited(), Some(75.0));
    }

    #[test]
    fn test_deposit_status_label() {
        let d = Deposit {
            status: Some("COMPLETED".into()),
            ..Default::default()
        };
        assert_eq!(d.status_label(), "Validé");
    }

    #[test]
    fn test_consumption_partner_label() {
        let c: Consumption =
            serde_json::from_str(r#"{"partenaireId": 4, "prixTotal": 2500}"#).unwrap();
        assert_eq!(c.partner_label(), "Partenaire 4");

        let c: Consumption =
            serde_json::from_str(r#"{"partenaireId": 4, "libelle": "MFP"}"#).unwrap();
        assert_eq!(c.partner_label(), "MFP");
        assert_eq!(Consumption::default().partner_label(), UNDEFINED_LABEL);
    }

    #[test]
    fn test_store_label_shapes() {
        let m: StockMovement = serde_json::from_str(r#"{"magasin": "Central"}"#).unwrap();
        assert_eq!(m.store_label(), "Central");

        let m: StockMovement =
            serde_json::from_str(r#"{"magasin": {"nom": "Annexe"}, "magasinId": 3}"#).unwrap();
        assert_eq!(m.store_label(), "Annexe");

        let m: StockMovement = serde_json::from_str(r#"{"magasinId": 3}"#).unwrap();
        assert_eq!(m.store_label(), "3");

        assert_eq!(StockMovement::default().store_label(), "Magasin non défini");
        assert_eq!(StockMovement::default().category_label(), "Non classé");
    }

    #[test]
    fn test_store_label_prefers_flat_store_name() {
        let m: StockMovement =
            serde_json::from_str(r#"{"magasinNom": "Central", "magasinId": 1}"#).unwrap();
        assert_eq!(m.store_label(), "Central");

        let m: StockMovement = serde_json::from_str(
            r#"{"magasinNom": "Central", "magasin": {"nom": "Annexe"}, "magasinId": 1}"#,
        )
        .unwrap();
        assert_eq!(m.store_label(), "Central");

        let m: StockMovement =
            serde_json::from_str(r#"{"magasinNom": " ", "magasin": {"nom": "Annexe"}}"#).unwrap();
        assert_eq!(m.store_label(), "Annexe");
    }

    #[test]
    fn test_stock_exit_deserialize() {
        let e: StockExit = serde_json::from_str(
            r#"{"numeroPiece": 17, "qteS": "4", "prixS": 250, "prixTotal": 1000,
                "montant": 1000, "destinationLibelle": " Pharmacie "}"#,
        )
        .unwrap();
        assert_eq!(e.numero_piece.as_deref(), Some("17"));
        assert_eq!(e.qte_s, Some(4.0));
        assert_eq!(e.destination_label(), "Pharmacie");
        assert_eq!(StockExit::default().destination_label(), "Non spécifié");
    }

    #[test]
    fn test_invoice_entry_deserialize() {
        let i: InvoiceEntry = serde_json::from_str(
            r#"{"factureId": 88, "montant": 118000, "htva": "100000", "tva": 18000,
                "dateSaisie": "2025-01-10T08:00:00", "userId": "jdoe"}"#,
        )
        .unwrap();
        assert_eq!(i.facture_id.as_deref(), Some("88"));
        assert_eq!(i.htva, Some(100000.0));
        assert_eq!(i.tva, Some(18000.0));
        assert_eq!(i.user_label(), "jdoe");
        assert_eq!(InvoiceEntry::default().user_label(), UNDEFINED_LABEL);
    }

    #[test]
    fn test_closing_stock_derived_when_missing() {
        let m: StockMovement = serde_json::from_str(
            r#"{
                "situationInitiale": {"qte": 10, "montant": 1000},
                "entrees": {"qte": 5, "montant": 500},
                "sorties": {"qte": 3}
            }"#,
        )
        .unwrap();
        let closing = m.closing();
        assert_eq!(closing.qte, Some(12.0));
        assert_eq!(closing.montant, Some(1500.0));

        let with_stock = StockMovement {
            stock: Some(QtyAmount {
                qte: Some(1.0),
                montant: None,
            }),
            ..m
        };
        assert_eq!(with_stock.closing().qte, Some(1.0));
    }
}
