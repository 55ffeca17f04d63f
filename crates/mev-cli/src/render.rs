//! Terminal rendering for MEV reports: column/bar charts, tooltip tables,
//! summary stats and CSV.

use color_eyre::eyre::{Context, Result};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::{CellAlignment, Table};
use csv::WriterBuilder;
use mev_analysis::{BarPoint, MevReport, ReportOutcome, ReportStats};

pub const NO_DATA_MESSAGE: &str = "No data available for the given block heights.";
pub const PER_BLOCK_TITLE: &str = "MEV Value by Block Height";

pub const HEIGHT_LABEL: &str = "Block Height";
pub const VALUE_LABEL: &str = "MEV value ($)";
pub const PROPOSER_LABEL: &str = "Block Proposer";

/// Rows of the vertical chart.
pub const COLUMN_CHART_ROWS: usize = 12;
/// Character cells of the longest horizontal bar.
pub const BAR_CHART_WIDTH: usize = 40;

const VERTICAL_EIGHTHS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const HORIZONTAL_EIGHTHS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

const MISSING: &str = "-";

pub fn top_title(n: usize) -> String {
    format!("Top {n} Block Heights with Highest MEV Value")
}

pub fn format_value(value: f64) -> String {
    format!("{value:.6}")
}

fn moniker_or_dash(point: &BarPoint) -> &str {
    point.moniker.as_deref().unwrap_or(MISSING)
}

fn max_value(points: &[BarPoint]) -> f64 {
    points
        .iter()
        .map(|p| p.scaled_value)
        .fold(0.0_f64, f64::max)
}

/// Bar length in eighths of a cell, relative to `max` spanning `cells`.
fn eighths(value: f64, max: f64, cells: usize) -> usize {
    if max <= 0.0 {
        return 0;
    }
    ((value / max) * (cells * 8) as f64).round() as usize
}

/// Vertical column chart, one column per point on a categorical height axis.
pub fn render_column_chart(title: &str, points: &[BarPoint], rows: usize) -> String {
    let mut out = format!("{title}\n");
    if points.is_empty() || rows == 0 {
        return out;
    }

    let max = max_value(points);
    let levels: Vec<usize> = points
        .iter()
        .map(|p| eighths(p.scaled_value, max, rows))
        .collect();

    let top_label = format_value(max);
    let gutter = top_label.len();

    out.push_str(&format!("{VALUE_LABEL}\n"));
    for row in (0..rows).rev() {
        let label = if row == rows - 1 {
            top_label.as_str()
        } else if row == 0 {
            "0"
        } else {
            ""
        };

        let mut line = format!("{label:>gutter$} │");
        for level in &levels {
            let filled = level.saturating_sub(row * 8).min(8);
            line.push(VERTICAL_EIGHTHS[filled]);
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push_str(&format!(
        "{:gutter$} └{}\n",
        "",
        "─".repeat(levels.len())
    ));

    let first = points.first().map(|p| p.height).unwrap_or_default();
    let last = points.last().map(|p| p.height).unwrap_or_default();
    out.push_str(&format!(
        "{:gutter$}  {HEIGHT_LABEL}: {first} … {last} ({} bars)\n",
        "",
        points.len()
    ));

    out
}

/// Horizontal bar for one value, in eighth-cell resolution.
pub fn horizontal_bar(value: f64, max: f64, width: usize) -> String {
    let level = eighths(value, max, width);
    let mut bar = "█".repeat(level / 8);
    if level % 8 > 0 {
        bar.push(HORIZONTAL_EIGHTHS[level % 8]);
    }
    bar
}

/// Per-bar details (the fields a chart tooltip would carry).
pub fn tooltip_table(points: &[BarPoint]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec![HEIGHT_LABEL, VALUE_LABEL, PROPOSER_LABEL]);

    for point in points {
        table.add_row(vec![
            point.height.to_string(),
            format_value(point.scaled_value),
            moniker_or_dash(point).to_string(),
        ]);
    }

    if let Some(column) = table.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}

/// Horizontal bar chart; rows keep the order of `points`.
pub fn render_bar_chart(title: &str, points: &[BarPoint], width: usize) -> String {
    let max = max_value(points);

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec![HEIGHT_LABEL, VALUE_LABEL, PROPOSER_LABEL, ""]);

    for point in points {
        table.add_row(vec![
            point.height.to_string(),
            format_value(point.scaled_value),
            moniker_or_dash(point).to_string(),
            horizontal_bar(point.scaled_value, max, width),
        ]);
    }

    if let Some(column) = table.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    format!("{title}\n{table}\n")
}

pub fn stats_table(stats: &ReportStats) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Metric", "Value"]);

    table.add_row(vec!["Blocks".to_string(), stats.block_count.to_string()]);
    table.add_row(vec![
        "Total MEV value ($)".to_string(),
        format_value(stats.total_scaled_value),
    ]);
    table.add_row(vec![
        "Mean MEV value ($)".to_string(),
        format_value(stats.mean_scaled_value),
    ]);
    table.add_row(vec![
        "Max MEV value ($)".to_string(),
        stats
            .max_scaled_value
            .map(format_value)
            .unwrap_or_else(|| MISSING.to_string()),
    ]);
    table.add_row(vec![
        "Distinct proposers".to_string(),
        stats.distinct_proposers.to_string(),
    ]);
    table.add_row(vec![
        "Unmatched records".to_string(),
        stats.unmatched_records.to_string(),
    ]);

    table
}

/// Full table-format rendering of a report.
pub fn render_report(report: &MevReport, top: usize) -> String {
    let mut out = String::new();

    out.push_str(&render_column_chart(
        PER_BLOCK_TITLE,
        &report.per_block,
        COLUMN_CHART_ROWS,
    ));
    out.push_str(&format!("{}\n\n", tooltip_table(&report.per_block)));
    out.push_str(&render_bar_chart(&top_title(top), &report.top, BAR_CHART_WIDTH));
    out.push_str(&format!("\n{}\n", stats_table(&report.stats)));

    out
}

/// Table-format output for either outcome.
pub fn render_outcome(outcome: &ReportOutcome, top: usize) -> String {
    match outcome {
        ReportOutcome::NoData { .. } => format!("{NO_DATA_MESSAGE}\n"),
        ReportOutcome::Report(report) => format!("\n{}", render_report(report, top)),
    }
}

/// Per-block series as CSV, ordered by height. Absent fields are empty.
pub fn render_csv(report: &MevReport) -> Result<String> {
    let mut records: Vec<_> = report.records.iter().collect();
    records.sort_by_key(|r| r.height);

    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    for record in records {
        wtr.serialize(record).wrap_err("failed to write CSV row")?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .wrap_err("failed to flush CSV")?;

    String::from_utf8(bytes).wrap_err("CSV output is not UTF-8")
}

/// CSV output for either outcome.
pub fn render_csv_outcome(outcome: &ReportOutcome) -> Result<String> {
    match outcome {
        ReportOutcome::NoData { .. } => Ok(format!("{NO_DATA_MESSAGE}\n")),
        ReportOutcome::Report(report) => render_csv(report),
    }
}
