//! Terminal rendering of results with comfy-table.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table as TermTable};
use tvp_geo::ChoroplethLayer;
use tvp_model::{Matrix, Table, Value, Warning};
use tvp_quality::{KeyMetrics, QualityReport};

const NO_DATA: &str = "No data";

pub fn print_table(table: &Table) -> anyhow::Result<()> {
    let mut out = styled_table();
    out.set_header(table.column_names().iter().map(|name| header_cell(name)));
    for (index, field) in table.schema().fields().iter().enumerate() {
        if field.ty.is_numeric() {
            align_column(&mut out, index, CellAlignment::Right);
        }
    }
    for row in table.rows()? {
        out.add_row(row.iter().map(value_cell));
    }
    println!("{out}");
    println!("{} row(s)", table.height());
    Ok(())
}

pub fn print_matrix(matrix: &Matrix) {
    let mut out = styled_table();
    let header = std::iter::once(header_cell(&format!(
        "{} \\ {}",
        matrix.index_name, matrix.columns_name
    )))
    .chain(matrix.column_labels.iter().map(|label| header_cell(&label.label())));
    out.set_header(header);
    for index in 1..=matrix.column_labels.len() {
        align_column(&mut out, index, CellAlignment::Right);
    }
    for ((label, cells), observed) in matrix
        .row_labels
        .iter()
        .zip(&matrix.cells)
        .zip(&matrix.observed)
    {
        let row = std::iter::once(label_cell(label)).chain(
            cells
                .iter()
                .zip(observed)
                .map(|(value, seen)| if *seen { value_cell(value) } else { dim_cell(value.label()) }),
        );
        out.add_row(row);
    }
    println!("{}: {}", matrix.value_name, matrix.index_name);
    println!("{out}");
}

pub fn print_quality(report: &QualityReport, metrics: &KeyMetrics) {
    let mut overview = styled_table();
    overview.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    align_column(&mut overview, 1, CellAlignment::Right);
    for (label, value) in metrics.entries() {
        overview.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    overview.add_row(vec![Cell::new("Columns"), Cell::new(report.columns)]);
    overview.add_row(vec![
        Cell::new("Missing Values"),
        Cell::new(format!("{:.2}%", report.missing_percent)),
    ]);
    overview.add_row(vec![
        Cell::new("Duplicate Rows"),
        Cell::new(format!("{:.2}%", report.duplicate_percent)),
    ]);
    println!("{overview}");

    let mut checks = styled_table();
    checks.set_header(vec![
        header_cell("Check"),
        header_cell("Column"),
        header_cell("Detail"),
        header_cell("Rows"),
    ]);
    align_column(&mut checks, 3, CellAlignment::Right);
    for outliers in &report.outliers {
        let detail = outliers.bounds.map_or_else(
            || "not numeric".to_string(),
            |(low, high)| format!("outside [{low:.2}, {high:.2}]"),
        );
        checks.add_row(vec![
            Cell::new("Outliers"),
            Cell::new(&outliers.column),
            Cell::new(detail),
            count_cell(outliers.count, Color::Yellow),
        ]);
    }
    for violation in &report.violations {
        checks.add_row(vec![
            Cell::new("Domain"),
            Cell::new(&violation.column),
            Cell::new(&violation.rule),
            count_cell(violation.count, Color::Red),
        ]);
    }
    for flag in &report.flags {
        checks.add_row(vec![
            Cell::new("Flag"),
            Cell::new(&flag.flag),
            Cell::new(format!("{:.2}% of rows", flag.percent)),
            count_cell(flag.count, Color::Yellow),
        ]);
    }
    println!("{checks}");
}

pub fn print_layer(layer: &ChoroplethLayer) {
    let mut out = styled_table();
    out.set_header(vec![header_cell("Region"), header_cell(&layer.value_column)]);
    align_column(&mut out, 1, CellAlignment::Right);
    for region in &layer.regions {
        let fill = match region.fill.value() {
            Some(value) => Cell::new(Value::Number(value).label()),
            None => dim_cell(NO_DATA),
        };
        out.add_row(vec![Cell::new(&region.region), fill]);
    }
    println!("{out}");
    if let Some((low, high)) = layer.value_range() {
        println!("Colour scale: {} to {}", Value::Number(low).label(), Value::Number(high).label());
    }
    println!("{} of {} regions have data", layer.matched(), layer.regions.len());
    if !layer.unmatched.is_empty() {
        eprintln!("warning: no boundary for {}", layer.unmatched.join(", "));
    }
}

/// Prints warnings after a result; empty-result warnings become a notice.
pub fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        if warning.is_empty_result() {
            println!("No data matches the current selection ({warning}).");
        } else {
            eprintln!("warning: {warning}");
        }
    }
}

fn styled_table() -> TermTable {
    let mut table = TermTable::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_column(table: &mut TermTable, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn label_cell(value: &Value) -> Cell {
    Cell::new(value.label()).add_attribute(Attribute::Bold)
}

fn value_cell(value: &Value) -> Cell {
    match value {
        Value::Null => dim_cell("-"),
        Value::Number(number) => Cell::new(Value::Number((number * 100.0).round() / 100.0).label()),
        other => Cell::new(other.label()),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
