use std::env;
use std::io::IsTerminal;

use colored::*;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{CellAlignment, ContentArrangement, Table};

use crate::rollup::{AggregateBucket, Percentage, ProgressReport};
use crate::snapshot::AggregationOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Auto,   // Detect based on terminal
    Always, // Force colors on
    Never,  // Force colors off
}

impl ColorMode {
    pub fn should_use_color(&self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => detect_color_support(),
        }
    }
}

fn detect_color_support() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Which measurement track to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportView {
    /// Local scope and contractual (BOQ) sections
    #[default]
    All,
    /// Site-wide, per-category and per-assignee local progress
    Local,
    /// Contractual quantities only
    Boq,
}

impl ReportView {
    fn shows_local(self) -> bool {
        matches!(self, Self::All | Self::Local)
    }

    fn shows_boq(self) -> bool {
        matches!(self, Self::All | Self::Boq)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TerminalOptions {
    pub view: ReportView,
    pub top_assignees: Option<usize>,
    pub color: ColorMode,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            view: ReportView::All,
            top_assignees: None,
            color: ColorMode::Auto,
        }
    }
}

pub fn render_terminal(outcome: &AggregationOutcome, options: &TerminalOptions) -> String {
    colored::control::set_override(options.color.should_use_color());

    match outcome {
        AggregationOutcome::Unavailable { site, reason } => format!(
            "{} progress for site {} is unavailable: {}\n",
            "warning:".yellow().bold(),
            site,
            reason
        ),
        AggregationOutcome::Ready { site, report, .. } => render_report(site, report, options),
    }
}

fn render_report(site: &str, report: &ProgressReport, options: &TerminalOptions) -> String {
    let mut out = format!("{} {}\n", "Site".bold(), site.bold());

    if report.is_empty() {
        out.push_str("No progress recorded yet.\n");
    }

    if options.view.shows_local() {
        out.push_str(&format!(
            "\n{}  {}\n",
            "Local scope".bold(),
            summary(&report.site_wide.totals)
        ));
        out.push_str(&category_table(report, &report.site_wide.by_main_category).to_string());
        out.push('\n');

        if !report.by_assignee.is_empty() {
            out.push_str(&format!("\n{}\n", "By assignee".bold()));
            out.push_str(&assignee_table(report, options.top_assignees).to_string());
            out.push('\n');
        }
    }

    if options.view.shows_boq() {
        let boq = &report.boq_only;
        out.push_str(&format!(
            "\n{}  {}\n",
            "Contract (BOQ)".bold(),
            summary(&boq.totals)
        ));
        out.push_str(&category_table(report, &boq.by_main_category).to_string());
        out.push('\n');
        if boq.activities_without_boq > 0 {
            out.push_str(&format!(
                "{} {} activities lack contractual scope\n",
                "note:".yellow(),
                boq.activities_without_boq
            ));
        }
    }

    out
}

fn summary(bucket: &AggregateBucket) -> String {
    format!(
        "{} verified, {} reported ({:.1} / {:.1} / {:.1})",
        colored_percentage(bucket.percentage),
        colored_percentage(bucket.unverified_percentage),
        bucket.qc,
        bucket.unverified,
        bucket.scope
    )
}

fn colored_percentage(p: Percentage) -> ColoredString {
    let text = p.to_string();
    match p.value() {
        v if v >= 75.0 => text.green(),
        v if v >= 25.0 => text.yellow(),
        _ => text.red(),
    }
}

fn base_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().copied());
    for index in 1..headers.len() {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

fn category_table(
    report: &ProgressReport,
    categories: &std::collections::BTreeMap<String, AggregateBucket>,
) -> Table {
    let mut table = base_table(&["Category", "QC", "Reported", "Scope", "QC %", "Reported %"]);
    for (key, bucket) in categories {
        table.add_row(vec![
            report.category_name(key).to_string(),
            format!("{:.1}", bucket.qc),
            format!("{:.1}", bucket.unverified),
            format!("{:.1}", bucket.scope),
            bucket.percentage.to_string(),
            bucket.unverified_percentage.to_string(),
        ]);
    }
    table
}

fn assignee_table(report: &ProgressReport, top: Option<usize>) -> Table {
    let mut table = base_table(&["Assignee", "Role", "Tasks", "Scope", "QC %", "BOQ share"]);
    let limit = top.unwrap_or(report.by_assignee.len());
    for assignee in report.by_assignee.iter().take(limit) {
        let name = if assignee.name.is_empty() {
            assignee.user_id.clone()
        } else {
            assignee.name.clone()
        };
        table.add_row(vec![
            name,
            assignee.role.clone(),
            assignee.by_task.len().to_string(),
            format!("{:.1}", assignee.totals.scope),
            assignee.totals.percentage.to_string(),
            assignee.boq.percentage.to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Activity, TaxonomyNode, Task, User};
    use crate::rollup::aggregate;
    use crate::snapshot::SnapshotStats;

    fn outcome() -> AggregationOutcome {
        let taxonomy = vec![
            TaxonomyNode::main("M1", "Cabling"),
            TaxonomyNode::sub("S1", "mv-cable", Some("M1")),
        ];
        let tasks = vec![Task::new("T1", "mv-cable")];
        let activities = vec![
            Activity {
                sub_category_key: "mv-cable".into(),
                scope_value: Some(100.0),
                qc_value: 40.0,
                supervisor_input_value: 70.0,
                assignee_id: Some("U1".into()),
                ..Activity::new("Pull cable", "T1")
            },
            Activity {
                sub_category_key: "mv-cable".into(),
                scope_value: Some(50.0),
                qc_value: 50.0,
                assignee_id: Some("U2".into()),
                ..Activity::new("Terminate", "T1")
            },
        ];
        let users = vec![
            User {
                id: "U1".into(),
                name: "Ana".into(),
                role: "supervisor".into(),
                ..Default::default()
            },
            User {
                id: "U2".into(),
                name: "Ben".into(),
                role: "foreman".into(),
                ..Default::default()
            },
        ];
        AggregationOutcome::Ready {
            site: "site-1".into(),
            report: aggregate(&taxonomy, &tasks, &activities, &users),
            stats: SnapshotStats::default(),
        }
    }

    fn plain(view: ReportView, top: Option<usize>) -> TerminalOptions {
        TerminalOptions {
            view,
            top_assignees: top,
            color: ColorMode::Never,
        }
    }

    #[test]
    fn renders_categories_and_assignees() {
        let text = render_terminal(&outcome(), &plain(ReportView::All, None));
        assert!(text.contains("Site site-1"));
        assert!(text.contains("Cabling"));
        assert!(text.contains("Ana"));
        assert!(text.contains("Ben"));
        assert!(text.contains("2 activities lack contractual scope"));
    }

    #[test]
    fn top_limits_assignee_rows() {
        let text = render_terminal(&outcome(), &plain(ReportView::Local, Some(1)));
        assert!(text.contains("Ben"));
        assert!(!text.contains("Ana"));
        assert!(!text.contains("Contract (BOQ)"));
    }

    #[test]
    fn boq_view_skips_local_sections() {
        let text = render_terminal(&outcome(), &plain(ReportView::Boq, None));
        assert!(text.contains("Contract (BOQ)"));
        assert!(!text.contains("By assignee"));
    }

    #[test]
    fn unavailable_is_reported_as_warning() {
        let outcome = AggregationOutcome::Unavailable {
            site: "site-9".into(),
            reason: "fetch failed for tasks: denied".into(),
        };
        let text = render_terminal(&outcome, &plain(ReportView::All, None));
        assert!(text.contains("site-9 is unavailable"));
        assert!(!text.contains("No progress recorded"));
    }
}
