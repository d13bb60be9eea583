//! Report command implementations

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rapport_core::export::{export_to_path, json_string};
use rapport_core::render::{render_table, write_document};
use rapport_core::{
    Config, RecordSource, ReportFilter, ReportKind, ReportRunner, ReportState, ReportView,
};
use tracing::info;

use crate::cli::{OutputFormat, ReportArgs};

use super::client;

fn parse_date(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
        })
        .transpose()
}

/// Build the filter from command-line values, using each report's labels
pub fn build_filter(
    kind: ReportKind,
    params: Vec<(&'static str, Option<String>)>,
    args: &ReportArgs,
) -> Result<ReportFilter> {
    let from = parse_date(args.from.as_deref(), "--from")?;
    let to = parse_date(args.to.as_deref(), "--to")?;
    let mut filter = ReportFilter::from_options(from, to)?;

    for (name, value) in params {
        let label = kind
            .filters()
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.label)
            .unwrap_or(name);
        filter = filter.with_opt(name, label, value);
    }

    kind.validate(&filter)?;
    Ok(filter)
}

/// Run a report and return what goes on stdout; writes the document and
/// export files when requested
pub async fn run_report<S>(
    source: &S,
    config: &Config,
    kind: ReportKind,
    filter: &ReportFilter,
    args: &ReportArgs,
) -> Result<String>
where
    S: RecordSource + ?Sized,
{
    let mut runner = ReportRunner::new(kind);
    let view: &ReportView = match runner.generate(source, filter).await? {
        ReportState::Success { view } | ReportState::Empty { view } => &**view,
        ReportState::Failed { message } => bail!("{}", message),
        other => bail!("Report ended in unexpected state: {}", other.name()),
    };

    if let Some(path) = &args.document {
        write_document(path, view, &config.format, &config.document)
            .with_context(|| format!("Failed to write document {}", path.display()))?;
    }
    if let Some(path) = &args.export {
        export(view, path)?;
    }

    let output = match args.format {
        OutputFormat::Table => render_table(view, &config.format),
        OutputFormat::Json => json_string(view)? + "\n",
    };
    Ok(output)
}

fn export(view: &ReportView, path: &Path) -> Result<()> {
    export_to_path(view, path).with_context(|| format!("Failed to export {}", path.display()))
}

pub async fn cmd_report(
    config: &Config,
    kind: ReportKind,
    params: Vec<(&'static str, Option<String>)>,
    args: &ReportArgs,
) -> Result<()> {
    let filter = build_filter(kind, params, args)?;
    let client = client(config)?;
    info!("Generating {} from {}", kind, client.base_url());

    let output = run_report(&client, config, kind, &filter, args).await?;
    print!("{}", output);

    if let Some(path) = &args.document {
        println!("\n📄 Document: {}", path.display());
    }
    if let Some(path) = &args.export {
        println!("📁 Export: {}", path.display());
    }
    Ok(())
}

/// Report list with endpoints and filters
pub fn reports_list() -> String {
    let mut out = String::from("📋 Available reports\n\n");
    out.push_str(&format!(
        "   {:15} │ {:40} │ {}\n",
        "Report", "Endpoint", "Filters"
    ));
    out.push_str("   ────────────────┼──────────────────────────────────────────┼────────────────────\n");
    for kind in ReportKind::all() {
        let filters: Vec<String> = kind
            .filters()
            .iter()
            .map(|spec| {
                if spec.required {
                    format!("{} (requis)", spec.name)
                } else {
                    spec.name.to_string()
                }
            })
            .collect();
        out.push_str(&format!(
            "   {:15} │ {:40} │ {}\n",
            kind.as_str(),
            kind.endpoint(),
            filters.join(", ")
        ));
    }
    out
}

pub fn cmd_reports_list() {
    print!("{}", reports_list());
}
