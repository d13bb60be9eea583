//! Test utilities for rapport-core
//!
//! This module provides a mock ERP backend serving fixture JSON for every
//! report endpoint and a few `findall` collections. Each endpoint answers in
//! the envelope shape the real backend uses for it, so tests exercise the
//! normalisation path too.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{
    extract::Query,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

type Params = Query<HashMap<String, String>>;
type Reply = Result<Json<Value>, StatusCode>;

/// Mock ERP backend for testing and development
pub struct MockErpServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockErpServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::serve(routes()).await
    }

    /// Start a server that answers every request with 500
    pub async fn start_failing() -> Self {
        let app = Router::new().fallback(|| async { StatusCode::INTERNAL_SERVER_ERROR });
        Self::serve(app).await
    }

    async fn serve(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockErpServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn routes() -> Router {
    Router::new()
        .route("/banques/findall", get(handle_banks))
        .route("/partenaires/findall", get(handle_partners))
        .route("/magasins/findall", get(handle_stores))
        .route("/entryPayements/rapportBanqueTotal", get(handle_bank_total))
        .route("/entryPayements/rapportCaissierByUser", get(handle_cashier))
        .route("/stkConsommations/rapportConsommation", get(handle_consumption))
        .route("/mouvementStock/findall", get(handle_stock))
        .route("/api/epargne/reports/deposits", get(handle_deposits))
        .route("/stkSorties/rapportSorties", get(handle_exits))
        .route("/factueUserSaisis/findall", get(handle_invoices))
}

/// Require both date parameters; records are filtered by their date field
fn date_range(
    params: &HashMap<String, String>,
    from: &str,
    to: &str,
) -> Result<(String, String), StatusCode> {
    match (params.get(from), params.get(to)) {
        (Some(f), Some(t)) if !f.is_empty() && !t.is_empty() => Ok((f.clone(), t.clone())),
        _ => Err(StatusCode::BAD_REQUEST),
    }
}

fn in_range(record: &Value, field: &str, range: &(String, String)) -> bool {
    match record.get(field).and_then(Value::as_str) {
        Some(date) if date.len() >= 10 => {
            let day = &date[..10];
            day >= range.0.as_str() && day <= range.1.as_str()
        }
        _ => false,
    }
}

fn has_value(record: &Value, field: &str, wanted: Option<&String>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => match record.get(field) {
            Some(Value::String(s)) => s == wanted,
            Some(Value::Number(n)) => n.to_string() == *wanted,
            _ => false,
        },
    }
}

fn filtered(records: Value, keep: impl Fn(&Value) -> bool) -> Vec<Value> {
    match records {
        Value::Array(items) => items.into_iter().filter(|r| keep(r)).collect(),
        _ => Vec::new(),
    }
}

async fn handle_banks() -> Json<Value> {
    Json(json!([
        {"id": 1, "nomBanque": "BRB"},
        {"id": 2, "nomBanque": "BANCOBU"},
        {"id": 3, "nomBanque": "KCB"}
    ]))
}

/// Paged shape
async fn handle_partners() -> Json<Value> {
    Json(json!({
        "content": [
            {"partenaireId": 1, "libelle": "MFP"},
            {"partenaireId": 2, "libelle": "ONATEL"}
        ],
        "totalElements": 2,
        "number": 0
    }))
}

async fn handle_stores() -> Json<Value> {
    Json(json!([
        {"magasinId": 1, "nom": "Central"},
        {"magasinId": 2, "nom": "Annexe"}
    ]))
}

fn payments() -> Value {
    json!([
        {"factureId": 1001, "reference": "BRD-01", "nomClient": "SOBUGEA", "datePaiement": "2025-01-05T09:00:00",
         "montantPaye": 150000, "montantExcedent": 0, "nomBanque": "BRB", "modePaiement": "VIREMENT", "userCreation": "jdoe"},
        {"factureId": 1002, "reference": "BRD-02", "nomClient": "REGIDESO", "datePaiement": "2025-01-08T11:30:00",
         "montantPaye": "75000", "montantExcedent": 5000, "nomBanque": "BANCOBU", "modePaiement": "CHEQUE", "userCreation": "jdoe"},
        {"factureId": 1003, "reference": "BRD-03", "nomClient": "ONATEL", "datePaiement": "2025-01-12T14:00:00",
         "montantPaye": 20000, "montantExcedent": null, "nomBanque": "BRB", "modePaiement": "CHEQUE", "userCreation": "amugisha"},
        {"factureId": 1004, "reference": "BRD-04", "nomClient": "SOBUGEA", "datePaiement": "2025-01-20T08:15:00",
         "montantPaye": 30000, "nomBanque": "BRB", "modePaiement": "VIREMENT", "userCreation": "jdoe"}
    ])
}

async fn handle_bank_total(Query(params): Params) -> Reply {
    let range = date_range(&params, "debut", "fin")?;
    Ok(Json(Value::Array(filtered(payments(), |p| {
        in_range(p, "datePaiement", &range)
    }))))
}

async fn handle_cashier(Query(params): Params) -> Reply {
    let range = date_range(&params, "debut", "fin")?;
    let user = params.get("userCreation").ok_or(StatusCode::BAD_REQUEST)?;
    let records = filtered(payments(), |p| {
        in_range(p, "datePaiement", &range) && has_value(p, "userCreation", Some(user))
    });
    Ok(Json(json!({ "content": records })))
}

async fn handle_consumption(Query(params): Params) -> Reply {
    let range = date_range(&params, "debut", "fin")?;
    let records = json!([
        {"matricule": "M-001", "nom": "NDAYISHIMIYE", "prenom": "Jean", "dateConsommation": "2025-01-03",
         "typeConsommation": "PRESTATION", "libellePrestation": "Consultation", "qte": 1, "pu": 5000, "prixTotal": 5000,
         "partenaireId": 1, "libelle": "MFP"},
        {"matricule": "M-002", "nom": "IRAKOZE", "prenom": "Alice", "dateConsommation": "2025-01-09",
         "typeConsommation": "ARTICLE", "libelleArticle": "Paracétamol 500mg", "qte": 2.5, "pu": 400, "prixTotal": 1000,
         "nomAyantDroit": "IRAKOZE Eric", "partenaireId": 2},
        {"matricule": "M-001", "nom": "NDAYISHIMIYE", "prenom": "Jean", "dateConsommation": "2025-01-15",
         "typeConsommation": "ARTICLE", "libelleArticle": "Amoxicilline", "qte": 1, "pu": 3000, "prixTotal": 3000,
         "partenaireId": 1, "libelle": "MFP"}
    ]);
    Ok(Json(Value::Array(filtered(records, |c| {
        in_range(c, "dateConsommation", &range)
            && has_value(c, "matricule", params.get("matricule"))
            && has_value(c, "partenaireId", params.get("partenaire"))
    }))))
}

async fn handle_stock(Query(params): Params) -> Reply {
    date_range(&params, "debut", "fin")?;
    let records = json!([
        {"numeroPiece": 11, "nomArticle": "Paracétamol 500mg", "catalogue": "PHARMA", "categorie": "Médicaments",
         "magasin": "Central", "magasinId": 1,
         "situationInitiale": {"qte": 100, "montant": 40000}, "entrees": {"qte": 50, "montant": 20000},
         "sorties": {"qte": 30, "montant": 12000}, "stock": {"qte": 120, "montant": 48000}},
        {"numeroPiece": 12, "nomArticle": "Gants", "catalogue": "CONSO", "categorie": "Consommables",
         "magasin": {"nom": "Annexe"}, "magasinId": 2,
         "situationInitiale": {"qte": 10, "montant": 5000}, "entrees": {"qte": 0, "montant": 0},
         "sorties": {"qte": 4, "montant": 2000}},
        {"numeroPiece": 13, "nomArticle": "Amoxicilline", "catalogue": "PHARMA", "categorie": "Médicaments",
         "magasin": "Central", "magasinId": 1,
         "situationInitiale": {"qte": 20, "montant": 60000}, "entrees": {"qte": 10, "montant": 30000},
         "sorties": {"qte": 5, "montant": 15000}, "stock": {"qte": 25, "montant": 75000}}
    ]);
    let records = filtered(records, |m| has_value(m, "magasinId", params.get("magasinId")));
    Ok(Json(json!({
        "periode": format!("{} - {}", params["debut"], params["fin"]),
        "mouvements": records
    })))
}

async fn handle_deposits(Query(params): Params) -> Reply {
    let range = date_range(&params, "dateFrom", "dateTo")?;
    let records = json!([
        {"id": 1, "slipNumber": "DEP-0001", "depositDate": "2025-01-04", "clientName": "NIYONZIMA Paul",
         "accountNumber": "EP-1001", "branchName": "Bujumbura", "branchId": 1, "totalAmount": 200000,
         "status": "COMPLETED", "processedBy": "agent1", "sourceOfFunds": "Salaire"},
        {"id": 2, "slipNumber": "DEP-0002", "depositDate": "2025-01-06", "clientName": "HAKIZIMANA Rose",
         "accountNumber": "EP-1002", "branchName": "Gitega", "branchId": 2, "amount": 50000,
         "status": "PENDING", "processedBy": "agent2"},
        {"id": 3, "slipNumber": "DEP-0003", "depositDate": "2025-01-18", "clientName": "NIYONZIMA Paul",
         "accountNumber": "EP-1001", "branchName": "Bujumbura", "branchId": 1, "totalAmount": 100000,
         "status": "COMPLETED", "processedBy": "agent1"}
    ]);
    let records = filtered(records, |d| {
        in_range(d, "depositDate", &range)
            && has_value(d, "branchId", params.get("branchId"))
            && has_value(d, "status", params.get("status"))
    });
    let count = records.len();
    Ok(Json(json!({ "data": records, "totalCount": count })))
}

async fn handle_exits(Query(params): Params) -> Reply {
    let range = date_range(&params, "debut", "fin")?;
    let records = json!([
        {"numeroPiece": 501, "dateSortie": "2025-01-07", "articleLibelle": "Paracétamol 500mg", "uniteLibelle": "Boîte",
         "qteS": 10, "prixS": 400, "prixTotal": 4000, "montant": 4000, "magasinId": 1, "magasinNom": "Central",
         "destinationId": 1, "destinationLibelle": "Pharmacie"},
        {"numeroPiece": 502, "dateSortie": "2025-01-14", "articleLibelle": "Gants", "uniteLibelle": "Paire",
         "qteS": 4, "prixS": 500, "prixTotal": 2000, "montant": 2000, "magasinId": 2, "magasinNom": "Annexe",
         "destinationId": 2, "destinationLibelle": "Laboratoire"},
        {"numeroPiece": 503, "dateSortie": "2025-01-21", "articleLibelle": "Amoxicilline", "uniteLibelle": "Boîte",
         "qteS": 2.5, "prixS": 3000, "prixTotal": 7500, "montant": 7500, "magasinId": 1, "magasinNom": "Central"}
    ]);
    Ok(Json(Value::Array(filtered(records, |e| {
        in_range(e, "dateSortie", &range)
            && has_value(e, "numeroPiece", params.get("numeroPiece"))
            && has_value(e, "magasinId", params.get("magasinId"))
            && has_value(e, "destinationId", params.get("destinationId"))
    }))))
}

/// Unfiltered: the real endpoint ignores the period
async fn handle_invoices() -> Json<Value> {
    Json(json!([
        {"factureId": 9001, "client": "SOBUGEA", "declarant": "TRANSIT SA", "marchandise": "Ciment",
         "montant": 118000, "htva": 100000, "tva": 18000, "dateSaisie": "2025-01-10T10:00:00", "userId": "jdoe"},
        {"factureId": 9002, "client": "REGIDESO", "declarant": "TRANSIT SA", "marchandise": "Tuyaux",
         "montant": "59000", "htva": 50000, "tva": 9000, "dateSaisie": "2025-01-22", "userId": "amugisha"},
        {"factureId": 9003, "client": "ONATEL", "declarant": "BURUNDI LOG", "marchandise": "Câbles",
         "montant": 23600, "htva": 20000, "tva": 3600, "dateSaisie": "2025-02-03", "userId": "jdoe"}
    ]))
}
