//! GFM table rendering from a detected cell grid.
//!
//! Pure and deterministic: the same grid always produces byte-identical
//! Markdown, and column widths derive only from the grid's own cells —
//! nothing is shared across tables or pages. The column count comes from
//! the first (header) row; rows longer than the header are truncated to it
//! and shorter rows emit fewer cells. That zip-to-shorter behaviour is a
//! compatibility contract, not an accident (downstream golden files depend
//! on it).

use crate::backend::Table;

/// Render one table as a GFM pipe table.
///
/// Each line ends in `|\n`; there is no trailing blank line (the page
/// composer adds inter-block spacing). An empty grid renders as the empty
/// string.
pub fn format_table(table: &Table) -> String {
    let columns = table.column_count();
    if columns == 0 {
        return String::new();
    }

    // Widths in chars of the rendered (trimmed, escaped) cells, header
    // included. Cells beyond the header's column count never contribute.
    let mut widths = vec![0usize; columns];
    for row in &table.rows {
        for (i, cell) in row.iter().take(columns).enumerate() {
            widths[i] = widths[i].max(render_cell(cell.as_deref()).chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&format_row(&table.rows[0], &widths));
    out.push_str(&separator_row(&widths));
    for row in &table.rows[1..] {
        out.push_str(&format_row(row, &widths));
    }
    out
}

fn format_row(row: &[Option<String>], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in row.iter().zip(widths) {
        let text = render_cell(cell.as_deref());
        line.push(' ');
        line.push_str(&text);
        for _ in text.chars().count()..*width {
            line.push(' ');
        }
        line.push_str(" |");
    }
    line.push('\n');
    line
}

fn separator_row(widths: &[usize]) -> String {
    let mut line = String::from("|");
    for width in widths {
        line.push(' ');
        for _ in 0..*width {
            line.push('-');
        }
        line.push_str(" |");
    }
    line.push('\n');
    line
}

/// A cell's rendered form: trimmed, with literal pipes escaped so they
/// cannot break the row structure. Absent cells render empty.
fn render_cell(cell: Option<&str>) -> String {
    match cell {
        Some(text) => text.trim().replace('|', "\\|"),
        None => String::new(),
    }
}
