//! Stream-mode table detection.
//!
//! Tables are inferred from text alignment alone. Spans are grouped into rows
//! by baseline, left edges that recur across rows become column edges, and
//! runs of consecutive rows that sit on those edges become table regions.
//! Ruling lines are never consulted.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ops::Range;

use super::content::TextSpan;
use crate::model::BBox;

/// Left edges are voted on in buckets of this many points.
const EDGE_BUCKET: f32 = 5.0;

/// A span starting within this distance of an edge is aligned with it.
const ALIGN_TOLERANCE: f32 = 5.0;

/// Spans may start this far left of their column edge.
const CELL_SLACK: f32 = 10.0;

/// A table region found on a page.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Area covered by the table's spans
    pub bbox: BBox,
    /// Left edge of each column, ascending
    pub columns: Vec<f32>,
    /// Rows top to bottom
    pub rows: Vec<TableRow>,
}

impl DetectedTable {
    /// Cell text, one inner vector per row and one string per column.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let edges = ColumnEdges(self.columns.clone());
        self.rows
            .iter()
            .map(|row| edges.cells(&row.spans, self.bbox.x1))
            .collect()
    }
}

/// Spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct TableRow {
    /// Mean baseline of the spans
    pub y: f32,
    /// Spans sorted left to right
    pub spans: Vec<TextSpan>,
}

impl TableRow {
    fn leftmost(&self) -> Option<&TextSpan> {
        self.spans.first()
    }
}

/// Tuning knobs for [`TableDetector`].
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Fewest consecutive aligned rows that make a table
    pub min_rows: usize,
    /// Fewest columns that make a table
    pub min_columns: usize,
    /// More columns than this usually means words were split, not cells
    pub max_columns: usize,
    /// Baselines closer than this fraction of the font size share a row
    pub y_tolerance_factor: f32,
    /// Share of rows (and of spans within a row) that must align, 0.0-1.0
    pub min_alignment_ratio: f32,
    /// Column edges closer than this many points are merged
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 6,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
        }
    }
}

impl TableDetectorConfig {
    /// Set the minimum number of rows and return self.
    pub fn min_rows(mut self, rows: usize) -> Self {
        self.min_rows = rows;
        self
    }

    /// Set the maximum number of columns and return self.
    pub fn max_columns(mut self, columns: usize) -> Self {
        self.max_columns = columns;
        self
    }
}

/// Finds tables among the text spans of a page.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Split `spans` into detected tables and the spans left over.
    ///
    /// Leftover spans keep their original order.
    pub fn detect(&self, spans: Vec<TextSpan>) -> (Vec<DetectedTable>, Vec<TextSpan>) {
        let cfg = &self.config;
        if spans.len() < cfg.min_rows * cfg.min_columns {
            return (Vec::new(), spans);
        }

        let groups = self.row_groups(&spans);
        if groups.len() < cfg.min_rows {
            return (Vec::new(), spans);
        }
        let rows: Vec<TableRow> = groups.iter().map(|g| build_row(&spans, g)).collect();

        let page_edges = ColumnEdges::vote(&rows, cfg);
        if page_edges.len() < cfg.min_columns {
            return (Vec::new(), spans);
        }

        let mut tables = Vec::new();
        let mut claimed: HashSet<usize> = HashSet::new();

        for run in self.aligned_runs(&rows, &page_edges) {
            let table_rows = &rows[run.clone()];
            let edges = ColumnEdges::vote(table_rows, cfg);

            if edges.len() < cfg.min_columns {
                continue;
            }
            if edges.len() > cfg.max_columns {
                log::debug!(
                    "Table candidate rejected: {} columns exceeds {}",
                    edges.len(),
                    cfg.max_columns
                );
                continue;
            }
            if looks_like_list(table_rows, edges.len()) {
                log::debug!("Table candidate rejected: rows read as a list");
                continue;
            }
            let Some(bbox) = rows_bbox(table_rows) else {
                continue;
            };

            claimed.extend(groups[run].iter().flatten().copied());
            tables.push(DetectedTable {
                bbox,
                columns: edges.0,
                rows: table_rows.to_vec(),
            });
        }

        log::debug!(
            "Table detection: {} spans, {} rows, {} tables",
            spans.len(),
            rows.len(),
            tables.len()
        );

        let rest = spans
            .into_iter()
            .enumerate()
            .filter_map(|(i, span)| (!claimed.contains(&i)).then_some(span))
            .collect();
        (tables, rest)
    }

    /// Cell grid of spans already known to form one table.
    ///
    /// Never rejects: without a column structure each row becomes a single
    /// cell. Rows with no text are dropped.
    pub fn grid(&self, spans: &[TextSpan]) -> Vec<Vec<String>> {
        let rows: Vec<TableRow> = self
            .row_groups(spans)
            .iter()
            .map(|g| build_row(spans, g))
            .collect();
        if rows.is_empty() {
            return Vec::new();
        }

        let edges = ColumnEdges::vote(&rows, &self.config);
        let right = rows
            .iter()
            .flat_map(|r| &r.spans)
            .map(TextSpan::right)
            .fold(f32::MIN, f32::max);

        rows.iter()
            .map(|row| {
                if edges.is_empty() {
                    vec![join_trimmed(row.spans.iter())]
                } else {
                    edges.cells(&row.spans, right)
                }
            })
            .filter(|cells| cells.iter().any(|c| !c.is_empty()))
            .collect()
    }

    /// Indices of `spans` grouped into rows, top to bottom. A row is anchored
    /// on the baseline of its first span.
    fn row_groups(&self, spans: &[TextSpan]) -> Vec<Vec<usize>> {
        let mut order: Vec<usize> = (0..spans.len()).collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (&spans[a], &spans[b]);
            a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
        });

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut anchor = f32::NAN;
        for i in order {
            let span = &spans[i];
            let tolerance = span.font_size * self.config.y_tolerance_factor;
            // NaN anchor never matches, so the first span opens a row.
            if (span.y - anchor).abs() <= tolerance {
                if let Some(group) = groups.last_mut() {
                    group.push(i);
                    continue;
                }
            }
            anchor = span.y;
            groups.push(vec![i]);
        }
        groups
    }

    /// Ranges of consecutive rows that align with `edges`, at least
    /// `min_rows` long.
    fn aligned_runs(&self, rows: &[TableRow], edges: &ColumnEdges) -> Vec<Range<usize>> {
        let threshold = self.config.min_alignment_ratio;
        let mut runs = Vec::new();
        let mut start: Option<usize> = None;

        let flags = rows
            .iter()
            .map(|row| edges.alignment(row) >= threshold)
            .chain(std::iter::once(false));
        for (i, aligned) in flags.enumerate() {
            match (aligned, start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    if i - s >= self.config.min_rows {
                        runs.push(s..i);
                    }
                    start = None;
                }
                _ => {}
            }
        }
        runs
    }
}

/// Column left edges, ascending.
#[derive(Debug, Clone, PartialEq)]
struct ColumnEdges(Vec<f32>);

impl ColumnEdges {
    /// Vote on left edges across `rows`.
    ///
    /// Rows with two or more spans are the evidence, each voting once per
    /// bucket. With too few of those every span of every row votes instead.
    fn vote(rows: &[TableRow], cfg: &TableDetectorConfig) -> Self {
        let multi: Vec<&TableRow> = rows.iter().filter(|r| r.spans.len() >= 2).collect();
        let mut votes: BTreeMap<i32, usize> = BTreeMap::new();

        let voters = if multi.len() >= cfg.min_rows {
            for row in &multi {
                let buckets: BTreeSet<i32> = row.spans.iter().map(|s| bucket(s.x)).collect();
                for b in buckets {
                    *votes.entry(b).or_default() += 1;
                }
            }
            multi.len()
        } else {
            for span in rows.iter().flat_map(|r| &r.spans) {
                *votes.entry(bucket(span.x)).or_default() += 1;
            }
            rows.len()
        };

        let quorum = ((voters as f32 * cfg.min_alignment_ratio) as usize).max(2);
        let mut edges: Vec<f32> = Vec::new();
        for (b, count) in votes {
            if count < quorum {
                continue;
            }
            let edge = b as f32 * EDGE_BUCKET;
            if edges.last().map_or(true, |&last| edge - last >= cfg.min_column_gap) {
                edges.push(edge);
            }
        }
        ColumnEdges(edges)
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Share of the row's spans starting on an edge.
    fn alignment(&self, row: &TableRow) -> f32 {
        if row.spans.is_empty() || self.is_empty() {
            return 0.0;
        }
        let aligned = row
            .spans
            .iter()
            .filter(|s| self.0.iter().any(|e| (s.x - e).abs() <= ALIGN_TOLERANCE))
            .count();
        aligned as f32 / row.spans.len() as f32
    }

    /// Column holding a span that starts at `x`; `right` bounds the last one.
    fn column_of(&self, x: f32, right: f32) -> usize {
        let last_end = right + 100.0;
        let by_range = self.0.iter().enumerate().position(|(i, &start)| {
            let end = self.0.get(i + 1).copied().unwrap_or(last_end);
            x >= start - CELL_SLACK && x < end - CELL_SLACK
        });
        by_range.unwrap_or_else(|| {
            self.0
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| (x - **a).abs().total_cmp(&(x - **b).abs()))
                .map_or(0, |(i, _)| i)
        })
    }

    /// One string per column, spans in a cell joined by spaces.
    fn cells(&self, spans: &[TextSpan], right: f32) -> Vec<String> {
        let mut cells: Vec<Vec<&TextSpan>> = vec![Vec::new(); self.len().max(1)];
        for span in spans {
            let col = self.column_of(span.x, right);
            if let Some(cell) = cells.get_mut(col) {
                cell.push(span);
            }
        }
        cells.into_iter().map(|c| join_trimmed(c.into_iter())).collect()
    }
}

fn bucket(x: f32) -> i32 {
    (x / EDGE_BUCKET).round() as i32
}

fn join_trimmed<'a>(spans: impl Iterator<Item = &'a TextSpan>) -> String {
    spans.map(|s| s.text.trim()).collect::<Vec<_>>().join(" ")
}

fn build_row(spans: &[TextSpan], group: &[usize]) -> TableRow {
    let mut spans: Vec<TextSpan> = group.iter().map(|&i| spans[i].clone()).collect();
    spans.sort_by(|a, b| a.x.total_cmp(&b.x));
    let y = spans.iter().map(|s| s.y).sum::<f32>() / spans.len().max(1) as f32;
    TableRow { y, spans }
}

fn rows_bbox(rows: &[TableRow]) -> Option<BBox> {
    rows.iter()
        .flat_map(|r| &r.spans)
        .map(TextSpan::bbox)
        .reduce(|a, b| a.union(&b))
}

/// Leading token of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListMarker {
    /// `•`, `-`, `▪` and similar glyphs
    Bullet,
    /// `1.`, `2)`, `a.`, or a bare number
    Ordinal,
}

impl ListMarker {
    fn classify(text: &str) -> Option<Self> {
        let text = text.trim();
        if is_bullet(text) {
            return Some(ListMarker::Bullet);
        }

        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return None;
        }

        let digits = compact.chars().take_while(char::is_ascii_digit).count();
        let tail = &compact[digits..];
        if digits > 0 && matches!(tail, "" | "." | ")") {
            return Some(ListMarker::Ordinal);
        }

        let mut chars = compact.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(c), Some('.' | ')'), None) if c.is_alphabetic() => Some(ListMarker::Ordinal),
            _ => None,
        }
    }
}

fn is_bullet(text: &str) -> bool {
    matches!(
        text,
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "▹" | "►" | "■" | "●" | "※"
            | "□" | "◆" | "◇" | "▶" | "▷" | "☞" | "➤" | "➜"
    )
}

/// Whether aligned rows are really a bulleted or numbered list, whose markers
/// and item text look like two columns.
fn looks_like_list(rows: &[TableRow], columns: usize) -> bool {
    if rows.is_empty() || columns < 2 {
        return false;
    }

    let markers: Vec<ListMarker> = rows
        .iter()
        .filter_map(|r| r.leftmost())
        .filter_map(|s| ListMarker::classify(&s.text))
        .collect();
    let bullets = markers.iter().filter(|m| **m == ListMarker::Bullet).count();
    let total = rows.len() as f32;

    // A numbered first column is legitimate in wider tables.
    bullets as f32 / total >= 0.5 || (columns == 2 && markers.len() as f32 / total >= 0.5)
}
