//! Text renderers for grouped reports
//!
//! - `table`: on-screen table with group blocks and subtotals
//! - `document`: paginated printable document
//!
//! Both share [`Layout`], which sizes columns from every value that will be
//! printed so rows, subtotals and grand totals line up.

pub mod document;
pub mod table;

pub use document::{render_document, write_document};
pub use table::render_table;

use crate::format::MoneyFormat;
use crate::reports::{Cell, ReportView, ViewGroup};

pub(crate) const SUBTOTAL_LABEL: &str = "Sous-total";
pub(crate) const GRAND_TOTAL_LABEL: &str = "Total général";

pub(crate) struct Layout {
    widths: Vec<usize>,
    numeric: Vec<bool>,
}

impl Layout {
    pub(crate) fn measure(view: &ReportView, format: &MoneyFormat) -> Self {
        let mut widths: Vec<usize> = view.headers.iter().map(|h| h.chars().count()).collect();
        let mut numeric: Vec<bool> = view.grand_totals.iter().map(Option::is_some).collect();

        let mut fit = |cells: &[Option<Cell>]| {
            for (i, cell) in cells.iter().enumerate() {
                if let Some(cell) = cell {
                    widths[i] = widths[i].max(cell.display(format).chars().count());
                    numeric[i] |= cell.is_numeric();
                }
            }
        };

        fit(&view.grand_totals);
        for group in &view.groups {
            visit(group, &mut |g: &ViewGroup| {
                fit(&g.totals);
                for row in &g.rows {
                    let cells: Vec<Option<Cell>> = row.iter().cloned().map(Some).collect();
                    fit(&cells);
                }
            });
        }

        if let Some(first) = widths.first_mut() {
            *first = (*first)
                .max(SUBTOTAL_LABEL.chars().count())
                .max(GRAND_TOTAL_LABEL.chars().count());
        }

        Self { widths, numeric }
    }

    fn line(&self, values: &[String]) -> String {
        let cells: Vec<String> = values
            .iter()
            .zip(self.widths.iter().zip(&self.numeric))
            .map(|(value, (&width, &numeric))| {
                if numeric {
                    format!("{:>width$}", value, width = width)
                } else {
                    format!("{:<width$}", value, width = width)
                }
            })
            .collect();
        cells.join(" │ ").trim_end().to_string()
    }

    pub(crate) fn header(&self, view: &ReportView) -> String {
        let headers: Vec<String> = view.headers.iter().map(|h| h.to_string()).collect();
        self.line(&headers)
    }

    pub(crate) fn rule(&self) -> String {
        self.widths
            .iter()
            .map(|&w| "─".repeat(w))
            .collect::<Vec<_>>()
            .join("─┼─")
    }

    pub(crate) fn row(&self, cells: &[Cell], format: &MoneyFormat) -> String {
        let values: Vec<String> = cells.iter().map(|c| c.display(format)).collect();
        self.line(&values)
    }

    /// Totals row with a label in the first column
    pub(crate) fn totals(&self, label: &str, totals: &[Option<Cell>], format: &MoneyFormat) -> String {
        let values: Vec<String> = totals
            .iter()
            .enumerate()
            .map(|(i, cell)| match (i, cell) {
                (0, _) => label.to_string(),
                (_, Some(cell)) => cell.display(format),
                (_, None) => String::new(),
            })
            .collect();
        self.line(&values)
    }

    pub(crate) fn width(&self) -> usize {
        self.widths.iter().sum::<usize>() + 3 * self.widths.len().saturating_sub(1)
    }
}

fn visit<F: FnMut(&ViewGroup)>(group: &ViewGroup, f: &mut F) {
    f(group);
    for sub in &group.subgroups {
        visit(sub, f);
    }
}

/// Body lines shared by both renderers: group blocks, subtotals, grand total
pub(crate) fn body_lines(view: &ReportView, layout: &Layout, format: &MoneyFormat) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, group) in view.groups.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        group_lines(group, 0, layout, format, &mut lines);
    }

    lines.push(layout.rule());
    lines.push(layout.totals(GRAND_TOTAL_LABEL, &view.grand_totals, format));
    for extra in &view.extras {
        lines.push(format!("{}: {}", extra.label, extra.value.display(format)));
    }
    lines
}

fn group_lines(
    group: &ViewGroup,
    depth: usize,
    layout: &Layout,
    format: &MoneyFormat,
    lines: &mut Vec<String>,
) {
    let indent = "  ".repeat(depth);
    lines.push(format!("{}{} ({})", indent, group.key, group.count));

    if group.subgroups.is_empty() {
        for row in &group.rows {
            lines.push(layout.row(row, format));
        }
    } else {
        for sub in &group.subgroups {
            group_lines(sub, depth + 1, layout, format, lines);
        }
    }

    lines.push(layout.totals(SUBTOTAL_LABEL, &group.totals, format));
}

/// Active secondary filters as `Label: value` lines
pub(crate) fn filter_lines(view: &ReportView) -> Vec<String> {
    view.filters
        .iter()
        .map(|p| format!("{}: {}", p.label, p.value))
        .collect()
}
