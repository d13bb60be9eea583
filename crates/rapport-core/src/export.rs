//! Export of grouped reports
//!
//! Supports:
//! - CSV: one row per record, prefixed by its group key (and subgroup key for
//!   nested reports), numbers unformatted, closing `TOTAL` row
//! - JSON: the grouped summary (keys, counts, totals, grand totals)

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::filter::FilterParam;
use crate::grouping::GroupedSummary;
use crate::reports::{Extra, ReportKind, ReportView, ViewGroup};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Guess from a file extension; CSV unless the path ends in `.json`
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Label of the closing totals row
pub const TOTAL_ROW_LABEL: &str = "TOTAL";

fn is_nested(view: &ReportView) -> bool {
    view.groups.iter().any(|g| !g.subgroups.is_empty())
}

/// Write the CSV export; returns the number of record rows written
pub fn write_csv<W: Write>(view: &ReportView, writer: W) -> Result<usize> {
    let nested = is_nested(view);
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["Groupe".to_string()];
    if nested {
        header.push("Sous-groupe".to_string());
    }
    header.extend(view.headers.iter().map(|h| h.to_string()));
    csv.write_record(&header)?;

    let mut rows = 0;
    for group in &view.groups {
        rows += write_group(&mut csv, group, nested)?;
    }

    let mut total = vec![TOTAL_ROW_LABEL.to_string()];
    if nested {
        total.push(String::new());
    }
    total.extend(
        view.grand_totals
            .iter()
            .map(|cell| cell.as_ref().map(|c| c.plain()).unwrap_or_default()),
    );
    csv.write_record(&total)?;
    csv.flush()?;

    Ok(rows)
}

fn write_group<W: Write>(
    csv: &mut csv::Writer<W>,
    group: &ViewGroup,
    nested: bool,
) -> Result<usize> {
    let mut rows = 0;
    let mut write_rows = |subgroup: Option<&str>, rows_of: &ViewGroup| -> Result<()> {
        for row in &rows_of.rows {
            let mut record = vec![group.key.clone()];
            if nested {
                record.push(subgroup.unwrap_or_default().to_string());
            }
            record.extend(row.iter().map(|c| c.plain()));
            csv.write_record(&record)?;
            rows += 1;
        }
        Ok(())
    };

    if group.subgroups.is_empty() {
        write_rows(None, group)?;
    } else {
        for sub in &group.subgroups {
            write_rows(Some(&sub.key), sub)?;
        }
    }
    Ok(rows)
}

/// CSV export as a string
pub fn csv_string(view: &ReportView) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(view, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// JSON document for a generated report
#[derive(Debug, Serialize)]
pub struct ReportExport<'a> {
    pub report: ReportKind,
    pub title: &'a str,
    pub period: &'a str,
    pub filters: &'a [FilterParam],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'a str>,
    #[serde(flatten)]
    pub summary: &'a GroupedSummary,
    pub extras: &'a [Extra],
}

impl<'a> ReportExport<'a> {
    pub fn new(view: &'a ReportView) -> Self {
        Self {
            report: view.kind,
            title: &view.title,
            period: &view.period,
            filters: &view.filters,
            label: view.label.as_deref(),
            summary: &view.summary,
            extras: &view.extras,
        }
    }
}

pub fn json_string(view: &ReportView) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ReportExport::new(view))?)
}

/// Write the export to a file, format chosen by extension
pub fn export_to_path(view: &ReportView, path: &Path) -> Result<()> {
    match ExportFormat::from_path(path) {
        ExportFormat::Csv => {
            let file = std::fs::File::create(path)?;
            let rows = write_csv(view, file)?;
            info!("Exported {} rows to {}", rows, path.display());
        }
        ExportFormat::Json => {
            std::fs::write(path, json_string(view)?)?;
            info!("Exported {} summary to {}", view.kind, path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ReportFilter;
    use crate::models::Payment;
    use crate::reports::{BankTotalReport, CashierReport, Report};

    fn payment(bank: &str, mode: &str, client: &str, paid: f64) -> Payment {
        Payment {
            nom_banque: Some(bank.to_string()),
            mode_paiement: Some(mode.to_string()),
            nom_client: Some(client.to_string()),
            montant_paye: Some(paid),
            date_paiement: Some("2025-01-15".to_string()),
            ..Default::default()
        }
    }

    fn records() -> Vec<Payment> {
        vec![
            payment("BRB", "VIREMENT", "SOBUGEA, SA", 1000.0),
            payment("KCB", "CHEQUE", "REGIDESO", 500.0),
            payment("BRB", "CHEQUE", "ONATEL", 250.5),
        ]
    }

    fn filter() -> ReportFilter {
        ReportFilter::parse("2025-01-01", "2025-01-31").unwrap()
    }

    #[test]
    fn test_csv_flat_report() {
        let filter = filter().with("userCreation", "Caissier", "jdoe");
        let view =
            ReportView::build::<CashierReport>(&CashierReport::group(records()), &filter, None);
        let csv = csv_string(&view).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "Groupe,Date,No Facture,Bordereau,Client,Mode Paiement,Montant Facture,Montant Excédent,Montant"
        );
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("BRB,2025-01-15,,,\"SOBUGEA, SA\",VIREMENT,1000,0,1000"));
        assert!(lines[2].starts_with("BRB,"));
        assert!(lines[3].starts_with("KCB,"));
        assert_eq!(lines[4], "TOTAL,,,,,,1750.5,0,1750.5");
    }

    #[test]
    fn test_csv_nested_report_has_subgroup_column() {
        let view = ReportView::build::<BankTotalReport>(
            &BankTotalReport::group(records()),
            &filter(),
            None,
        );
        let mut buf = Vec::new();
        let rows = write_csv(&view, &mut buf).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(rows, 3);
        assert!(lines[0].starts_with("Groupe,Sous-groupe,Date"));
        assert!(lines[1].starts_with("BRB,VIREMENT,"));
        assert!(lines[2].starts_with("BRB,CHEQUE,"));
        assert!(lines[3].starts_with("KCB,CHEQUE,"));
        assert!(lines[4].starts_with("TOTAL,,"));
    }

    #[test]
    fn test_json_summary() {
        let view = ReportView::build::<BankTotalReport>(
            &BankTotalReport::group(records()),
            &filter(),
            None,
        );
        let json: serde_json::Value = serde_json::from_str(&json_string(&view).unwrap()).unwrap();

        assert_eq!(json["report"], "bank-total");
        assert_eq!(json["record_count"], 3);
        assert_eq!(json["grand_totals"]["montantPaye"], 1750.5);
        assert_eq!(json["groups"][0]["key"], "BRB");
        assert_eq!(json["groups"][0]["count"], 2);
        assert_eq!(json["groups"][0]["subgroups"][1]["key"], "CHEQUE");
        assert_eq!(json["groups"][1]["totals"]["montantPaye"], 500.0);
    }

    #[test]
    fn test_export_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("r.JSON")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("r.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("rapport")), ExportFormat::Csv);
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let view = ReportView::build::<BankTotalReport>(
            &BankTotalReport::group(records()),
            &filter(),
            None,
        );

        let csv_path = dir.path().join("banque.csv");
        export_to_path(&view, &csv_path).unwrap();
        assert!(std::fs::read_to_string(&csv_path).unwrap().contains("TOTAL"));

        let json_path = dir.path().join("banque.json");
        export_to_path(&view, &json_path).unwrap();
        assert!(std::fs::read_to_string(&json_path).unwrap().contains("\"groups\""));
    }
}
