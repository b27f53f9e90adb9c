//! Terminal rendering of a [`Dashboard`].
//!
//! Table output is a sequence of titled `comfy-table` tables; JSON output is
//! the serialized dashboard.

use calllog_core::formatting::{format_minutes, format_number, percentage};
use calllog_core::Result;
use calllog_data::analysis::{Dashboard, DashboardMetadata};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};

/// Pretty-printed JSON of every view.
pub fn render_json(dashboard: &Dashboard<'_>) -> Result<String> {
    Ok(serde_json::to_string_pretty(dashboard)?)
}

/// All views as plain-text tables, ready to print.
pub fn render_tables(dashboard: &Dashboard<'_>) -> String {
    let mut out = String::new();
    out.push_str(&banner(&dashboard.metadata));
    out.push('\n');

    section(&mut out, "Key figures", kpi_table(dashboard));
    section(&mut out, "Calls per day", per_day_table(dashboard));
    section(&mut out, "Calls by start time", slot_table(dashboard));
    section(&mut out, "Direction split", direction_table(dashboard));
    section(&mut out, "Calls by weekday and start time", heatmap_table(dashboard));
    section(
        &mut out,
        &format!("Top {} longest calls", dashboard.top_longest.len()),
        top_table(dashboard),
    );
    out
}

/// `"Loaded N records from X to Y"` plus the size of the selection.
pub fn banner(metadata: &DashboardMetadata) -> String {
    let loaded = match (&metadata.first_date, &metadata.last_date) {
        (Some(first), Some(last)) => format!(
            "Loaded {} records from {} to {}",
            metadata.records_loaded, first, last
        ),
        _ => format!("Loaded {} records", metadata.records_loaded),
    };
    format!(
        "{}\nShowing {} of {} records",
        loaded, metadata.records_selected, metadata.records_loaded
    )
}

// ── Tables ────────────────────────────────────────────────────────────────────

fn section(out: &mut String, title: &str, table: Table) {
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&table.to_string());
    out.push('\n');
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

fn right(value: impl std::fmt::Display) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

fn kpi_table(dashboard: &Dashboard<'_>) -> Table {
    let kpis = &dashboard.kpis;
    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Total calls"), right(kpis.count)]);
    table.add_row(vec![
        Cell::new("Total duration (min)"),
        right(format_minutes(kpis.total_minutes)),
    ]);
    table.add_row(vec![
        Cell::new("Average duration (min)"),
        right(format_minutes(kpis.avg_minutes)),
    ]);
    table
}

fn per_day_table(dashboard: &Dashboard<'_>) -> Table {
    let mut table = new_table(vec!["Date", "Calls"]);
    for day in &dashboard.calls_per_day {
        table.add_row(vec![Cell::new(&day.date), right(day.count)]);
    }
    table
}

fn slot_table(dashboard: &Dashboard<'_>) -> Table {
    let mut table = new_table(vec!["Slot", "Calls"]);
    for slot in &dashboard.calls_by_slot {
        table.add_row(vec![Cell::new(slot.slot), right(slot.count)]);
    }
    table
}

fn direction_table(dashboard: &Dashboard<'_>) -> Table {
    let total: usize = dashboard.direction_split.iter().map(|d| d.count).sum();
    let mut table = new_table(vec!["Direction", "Calls", "Share"]);
    for entry in &dashboard.direction_split {
        let share = percentage(entry.count as f64, total as f64, 1);
        table.add_row(vec![
            Cell::new(&entry.direction),
            right(entry.count),
            right(format!("{}%", format_number(share, 1))),
        ]);
    }
    table
}

/// Slots run down the rows and weekdays across, which keeps the table
/// narrow enough for a terminal.
fn heatmap_table(dashboard: &Dashboard<'_>) -> Table {
    let matrix = &dashboard.calls_by_day_and_slot;
    let mut header = vec!["Slot"];
    header.extend(matrix.weekdays);
    let mut table = new_table(header);

    for (slot_idx, slot) in matrix.slots.iter().enumerate() {
        let mut row = vec![Cell::new(slot)];
        row.extend(matrix.counts.iter().map(|day| right(day[slot_idx])));
        table.add_row(row);
    }
    table
}

fn top_table(dashboard: &Dashboard<'_>) -> Table {
    let mut table = new_table(vec!["Assigned to", "Date", "Duration", "Direction"]);
    for record in &dashboard.top_longest {
        table.add_row(vec![
            Cell::new(record.assigned_to.as_deref().unwrap_or("")),
            Cell::new(record.date.as_ref().map(ToString::to_string).unwrap_or_default()),
            right(record.duration_str.as_deref().unwrap_or("")),
            Cell::new(record.direction.as_deref().unwrap_or("")),
        ]);
    }
    table
}

// ── Tests ─────────────────────────────────────────────────────────────────────
