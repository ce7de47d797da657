//! Positional table detection from text-layer geometry.
//!
//! PDFs carry no table markup; a "table" on the page is just text runs that
//! happen to line up. This module recovers that structure from span
//! bounding boxes alone:
//!
//! ```text
//! spans ──► rows (vertical-midpoint grouping)
//!       ──► column edges (left edges that repeat across rows)
//!       ──► regions (contiguous runs of well-aligned rows)
//!       ──► Table grids (spans assigned to columns, gaps as None)
//! ```
//!
//! The heuristic is deliberately conservative: at least two rows, two to
//! twelve columns, and a majority of spans sitting on shared left edges.
//! Bullet and numbered lists look like two-column tables under those rules,
//! so a dedicated guard rejects regions whose first column is mostly list
//! markers.

use super::Table;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// A positioned run of text from a page's text layer, in PDF points
/// (origin bottom-left, y grows upward).
#[derive(Debug, Clone)]
pub struct TextSpan {
    pub text: String,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl TextSpan {
    fn mid_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    fn height(&self) -> f32 {
        (self.top - self.bottom).abs()
    }
}

// Detection thresholds, all in PDF points unless noted. Tuned on scanned
// reports and invoices; loosening MIN_ALIGNMENT_RATIO below 0.5 starts
// matching justified prose.
const MIN_TABLE_ROWS: usize = 2;
const MIN_TABLE_COLUMNS: usize = 2;
const MAX_TABLE_COLUMNS: usize = 12;
const ROW_TOLERANCE_FACTOR: f32 = 0.4;
const MIN_ROW_TOLERANCE_PTS: f32 = 2.0;
const COLUMN_BUCKET_PTS: f32 = 5.0;
const MIN_COLUMN_GAP_PTS: f32 = 12.0;
const EDGE_TOLERANCE_PTS: f32 = 5.0;
const CELL_ASSIGN_TOLERANCE_PTS: f32 = 10.0;
const MIN_ALIGNMENT_RATIO: f32 = 0.5;

struct Row {
    mid_y: f32,
    spans: Vec<TextSpan>,
}

/// Detect tables on one page from its text spans, top to bottom.
///
/// Returns an empty vec when the page has no tabular structure; never
/// errors (an undetected table degrades to plain text, which the caller
/// has already emitted).
pub fn detect_tables(spans: &[TextSpan]) -> Vec<Table> {
    let spans: Vec<TextSpan> = spans
        .iter()
        .filter(|s| !s.text.trim().is_empty())
        .cloned()
        .collect();
    if spans.is_empty() {
        return Vec::new();
    }

    let rows = group_rows(spans);
    let edges = column_edges(&rows);
    if edges.len() < MIN_TABLE_COLUMNS || edges.len() > MAX_TABLE_COLUMNS {
        return Vec::new();
    }

    let mut tables = Vec::new();
    for region in aligned_regions(&rows, &edges) {
        let slice = &rows[region];
        if edges.len() == 2 && is_list_like(slice) {
            continue;
        }
        tables.push(to_table(slice, &edges));
    }
    tables
}

/// Group spans into visual rows by vertical-midpoint proximity.
///
/// Tolerance scales with span height so tightly-leaded small print and
/// airy headings both group correctly.
fn group_rows(mut spans: Vec<TextSpan>) -> Vec<Row> {
    spans.sort_by(|a, b| {
        b.mid_y()
            .total_cmp(&a.mid_y())
            .then(a.left.total_cmp(&b.left))
    });

    let mut rows: Vec<Row> = Vec::new();
    for span in spans {
        let tolerance = (span.height() * ROW_TOLERANCE_FACTOR).max(MIN_ROW_TOLERANCE_PTS);
        match rows.last_mut() {
            Some(row) if (span.mid_y() - row.mid_y).abs() <= tolerance => row.spans.push(span),
            _ => rows.push(Row {
                mid_y: span.mid_y(),
                spans: vec![span],
            }),
        }
    }
    for row in &mut rows {
        row.spans.sort_by(|a, b| a.left.total_cmp(&b.left));
    }
    rows
}

/// Column edges: left-edge positions that repeat across multi-span rows.
///
/// Each row contributes a bucket at most once, so a long cell wrapped over
/// several spans cannot vote its own edge into existence. Edges closer
/// than the minimum gap merge into the leftmost of the pair.
fn column_edges(rows: &[Row]) -> Vec<f32> {
    let multi: Vec<&Row> = rows.iter().filter(|r| r.spans.len() >= 2).collect();
    if multi.len() < MIN_TABLE_ROWS {
        return Vec::new();
    }

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for row in &multi {
        let mut seen: HashSet<i64> = HashSet::new();
        for span in &row.spans {
            let bucket = (span.left / COLUMN_BUCKET_PTS).round() as i64;
            if seen.insert(bucket) {
                *counts.entry(bucket).or_default() += 1;
            }
        }
    }

    let required = ((multi.len() as f32 * MIN_ALIGNMENT_RATIO).ceil() as usize).max(2);
    let mut edges: Vec<f32> = counts
        .into_iter()
        .filter(|&(_, count)| count >= required)
        .map(|(bucket, _)| bucket as f32 * COLUMN_BUCKET_PTS)
        .collect();
    edges.sort_by(f32::total_cmp);

    let mut merged: Vec<f32> = Vec::new();
    for edge in edges {
        if merged
            .last()
            .map_or(true, |last| edge - last >= MIN_COLUMN_GAP_PTS)
        {
            merged.push(edge);
        }
    }
    merged
}

/// Contiguous runs of rows that sit on the detected column grid.
fn aligned_regions(rows: &[Row], edges: &[f32]) -> Vec<Range<usize>> {
    let mut regions = Vec::new();
    let mut start: Option<usize> = None;

    for (i, row) in rows.iter().enumerate() {
        let on_grid = row.spans.len() >= 2 && aligned_ratio(row, edges) >= MIN_ALIGNMENT_RATIO;
        match (on_grid, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= MIN_TABLE_ROWS {
                    regions.push(s..i);
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if rows.len() - s >= MIN_TABLE_ROWS {
            regions.push(s..rows.len());
        }
    }
    regions
}

fn aligned_ratio(row: &Row, edges: &[f32]) -> f32 {
    if row.spans.is_empty() {
        return 0.0;
    }
    let aligned = row
        .spans
        .iter()
        .filter(|s| {
            edges
                .iter()
                .any(|e| (s.left - e).abs() <= EDGE_TOLERANCE_PTS)
        })
        .count();
    aligned as f32 / row.spans.len() as f32
}

/// Two-column regions whose first column is mostly bullet or "1." / "2)"
/// markers are lists, not tables.
fn is_list_like(rows: &[Row]) -> bool {
    let marker_rows = rows
        .iter()
        .filter(|r| {
            r.spans
                .first()
                .map_or(false, |s| is_list_marker(s.text.trim()))
        })
        .count();
    marker_rows * 2 >= rows.len()
}

fn is_list_marker(text: &str) -> bool {
    if matches!(text, "•" | "‣" | "◦" | "-" | "–" | "*") {
        return true;
    }
    let stripped = text
        .strip_suffix('.')
        .or_else(|| text.strip_suffix(')'))
        .unwrap_or("");
    !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit())
}

/// Assemble a region into a grid: one row per visual row, one cell per
/// column edge, `None` where no span lands.
fn to_table(rows: &[Row], edges: &[f32]) -> Table {
    let mut grid = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells: Vec<Option<String>> = vec![None; edges.len()];
        for span in &row.spans {
            let col = column_for(span.left, edges);
            match &mut cells[col] {
                Some(existing) => {
                    existing.push(' ');
                    existing.push_str(span.text.trim());
                }
                slot => *slot = Some(span.text.trim().to_string()),
            }
        }
        grid.push(cells);
    }
    Table { rows: grid }
}

/// Rightmost edge at or left of the span start (with tolerance for ink
/// that starts slightly before its column).
fn column_for(left: f32, edges: &[f32]) -> usize {
    let mut best = 0;
    for (i, &edge) in edges.iter().enumerate() {
        if left + CELL_ASSIGN_TOLERANCE_PTS >= edge {
            best = i;
        } else {
            break;
        }
    }
    best
}
