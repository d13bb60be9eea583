//! Paginated printable document
//!
//! Page layout:
//! - header: organisation, title, period (first page also lists the active
//!   filters), then the column header row
//! - body: at most `lines_per_page` lines of group blocks
//! - footer: generation date, organisation and `Page n/m`
//!
//! The signature line follows the grand total on the last page. Pages are
//! separated by a form feed.

use std::path::Path;

use chrono::{Local, NaiveDate};
use tracing::info;

use super::{body_lines, filter_lines, Layout};
use crate::config::DocumentConfig;
use crate::error::Result;
use crate::format::{format_date, MoneyFormat};
use crate::reports::ReportView;
use crate::runner::NO_RECORDS_MESSAGE;

const PAGE_BREAK: &str = "\u{000c}\n";

pub fn render_document(
    view: &ReportView,
    format: &MoneyFormat,
    config: &DocumentConfig,
    generated_on: NaiveDate,
) -> String {
    let layout = Layout::measure(view, format);
    let width = layout.width().max(view.title.chars().count()).max(40);

    let mut body = if view.is_empty() {
        vec![NO_RECORDS_MESSAGE.to_string()]
    } else {
        body_lines(view, &layout, format)
    };
    body.push(String::new());
    body.push(format!("{}: {}", config.signature_label, "_".repeat(30)));

    let pages: Vec<&[String]> = body.chunks(config.lines_per_page.max(1)).collect();
    let page_count = pages.len();

    let mut out = String::new();
    for (index, lines) in pages.iter().enumerate() {
        if index > 0 {
            out.push_str(PAGE_BREAK);
        }

        out.push_str(&config.organisation);
        out.push('\n');
        out.push_str(&view.title.to_uppercase());
        out.push('\n');
        out.push_str(&view.period);
        out.push('\n');
        if index == 0 {
            for line in filter_lines(view) {
                out.push_str(&line);
                out.push('\n');
            }
            if let Some(label) = &view.label {
                out.push_str(label);
                out.push('\n');
            }
        }
        out.push('\n');

        if !view.is_empty() {
            out.push_str(&layout.header(view));
            out.push('\n');
            out.push_str(&layout.rule());
            out.push('\n');
        }

        for line in lines.iter() {
            out.push_str(line);
            out.push('\n');
        }

        out.push('\n');
        out.push_str(&footer(
            config,
            generated_on,
            index + 1,
            page_count,
            width,
        ));
        out.push('\n');
    }
    out
}

fn footer(
    config: &DocumentConfig,
    generated_on: NaiveDate,
    page: usize,
    page_count: usize,
    width: usize,
) -> String {
    let left = format!(
        "Généré le {} - {}",
        format_date(generated_on),
        config.organisation
    );
    let right = format!("Page {}/{}", page, page_count);
    let gap = width
        .saturating_sub(left.chars().count() + right.chars().count())
        .max(2);
    format!("{}{}{}", left, " ".repeat(gap), right)
}

/// Render the document dated today and write it to `path`
pub fn write_document(
    path: &Path,
    view: &ReportView,
    format: &MoneyFormat,
    config: &DocumentConfig,
) -> Result<()> {
    let content = render_document(view, format, config, Local::now().date_naive());
    std::fs::write(path, content)?;
    info!("Wrote {} document to {}", view.kind, path.display());
    Ok(())
}
