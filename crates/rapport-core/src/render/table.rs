//! On-screen grouped table

use super::{body_lines, filter_lines, Layout};
use crate::format::MoneyFormat;
use crate::reports::ReportView;
use crate::runner::NO_RECORDS_MESSAGE;

pub fn render_table(view: &ReportView, format: &MoneyFormat) -> String {
    let mut out = Vec::new();
    out.push(format!("📊 {}", view.title));
    out.push(format!("   {}", view.period));
    if let Some(label) = &view.label {
        out.push(format!("   {}", label));
    }
    for line in filter_lines(view) {
        out.push(format!("   {}", line));
    }
    out.push(String::new());

    if view.is_empty() {
        out.push(format!("   {}", NO_RECORDS_MESSAGE));
        return out.join("\n") + "\n";
    }

    let layout = Layout::measure(view, format);
    out.push(format!("   {}", layout.header(view)));
    out.push(format!("   {}", layout.rule()));
    for line in body_lines(view, &layout, format) {
        if line.is_empty() {
            out.push(line);
        } else {
            out.push(format!("   {}", line));
        }
    }
    out.push(String::new());
    out.push(format!(
        "   {} enregistrement(s), {} groupe(s)",
        view.record_count,
        view.groups.len()
    ));

    out.join("\n") + "\n"
}
