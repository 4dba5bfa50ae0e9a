//! Table output for load reports, using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::adapters::sql::{LoadOutcome, LoadReport};

use super::CommandOutput;

impl CommandOutput for LoadReport {
    fn to_human(&self) -> String {
        if self.is_empty() {
            return "No CSV files loaded.".to_string();
        }
        let loaded = self.loaded_tables().len();
        let failed = self.failures().len();
        format!(
            "{}\n\n{} table{} loaded, {} failed",
            format_load_report(self),
            loaded,
            if loaded == 1 { "" } else { "s" },
            failed
        )
    }
}

/// Render a load report as a table.
pub fn format_load_report(report: &LoadReport) -> String {
    let use_colors = supports_color();
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("File").add_attribute(Attribute::Bold),
        Cell::new("Table").add_attribute(Attribute::Bold),
        Cell::new("Rows").add_attribute(Attribute::Bold),
        Cell::new("Columns").add_attribute(Attribute::Bold),
        Cell::new("Status").add_attribute(Attribute::Bold),
    ]);

    for outcome in &report.outcomes {
        let row = match outcome {
            LoadOutcome::Loaded {
                file,
                table: name,
                rows,
                columns,
            } => vec![
                Cell::new(file_name(file)),
                Cell::new(name),
                Cell::new(rows),
                Cell::new(columns),
                status_cell("loaded", Color::Green, use_colors),
            ],
            LoadOutcome::Failed {
                file,
                table: name,
                error,
            } => vec![
                Cell::new(file_name(file)),
                Cell::new(name),
                Cell::new("-"),
                Cell::new("-"),
                status_cell(&format!("failed: {error}"), Color::Red, use_colors),
            ],
        };
        table.add_row(row);
    }

    table.to_string()
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn status_cell(text: &str, color: Color, use_colors: bool) -> Cell {
    if use_colors {
        Cell::new(text).fg(color)
    } else {
        Cell::new(text)
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}
