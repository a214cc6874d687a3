//! Allies report generation.
//!
//! Renders an [`AllyRanking`] for the `allies` command, either as a
//! Markdown table or as pretty-printed JSON.

use crate::models::{Ally, AllyRanking};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// A ranking plus the context it was computed in.
#[derive(Debug, Clone, Serialize)]
pub struct AlliesReport {
    pub official_id: i64,
    pub generated_at: DateTime<Utc>,
    pub limit: usize,
    pub skipped: usize,
    pub allies: Vec<Ally>,
}

impl AlliesReport {
    pub fn new(official_id: i64, limit: usize, ranking: AllyRanking) -> Self {
        Self {
            official_id,
            generated_at: Utc::now(),
            limit,
            skipped: ranking.skipped,
            allies: ranking.allies,
        }
    }
}

/// Generate the Markdown report.
pub fn generate_markdown_report(report: &AlliesReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# Voting Allies for Official {}\n\n",
        report.official_id
    ));
    output.push_str(&generate_metadata_section(report));

    if report.allies.is_empty() {
        output.push_str("No officials share a recorded vote with this official.\n\n");
    } else {
        output.push_str(&generate_allies_table(&report.allies));
    }

    output.push_str(&generate_footer());
    output
}

fn generate_metadata_section(report: &AlliesReport) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "- **Generated:** {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Allies Listed:** {} (limit {})\n",
        report.allies.len(),
        report.limit
    ));
    if report.skipped > 0 {
        section.push_str(&format!(
            "- **Officials Skipped:** {} (votes unavailable)\n",
            report.skipped
        ));
    }
    section.push('\n');

    section
}

fn generate_allies_table(allies: &[Ally]) -> String {
    let mut table = String::new();

    table.push_str("| Rank | Official | Ward | Party | Bloc | Alignment |\n");
    table.push_str("|------|----------|------|-------|------|-----------|\n");

    for (i, ally) in allies.iter().enumerate() {
        let ward = ally
            .district
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let party = if ally.party.is_empty() {
            "-"
        } else {
            ally.party.as_str()
        };

        table.push_str(&format!(
            "| {} | {} | {} | {} | {} | {:.1}% |\n",
            i + 1,
            escape_cell(&ally.name),
            ward,
            escape_cell(party),
            escape_cell(&ally.bloc),
            ally.alignment
        ));
    }
    table.push('\n');

    table
}

/// Pipes would split a table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn generate_footer() -> String {
    "---\n\n*Alignment is the share of commonly voted matters on which both officials cast the same vote.*\n"
        .to_string()
}

/// Generate the JSON report.
pub fn generate_json_report(report: &AlliesReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
