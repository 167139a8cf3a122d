//! Results Grid Module for mscli
//!
//! This module renders tabular results as a bordered text table:
//!
//! ```text
//! +----+-------+
//! | id | name  |
//! |----+-------|
//! |  1 | Alice |
//! +----+-------+
//! ```
//!
//! Numeric columns are right-aligned, everything else left-aligned. Row and
//! column order are kept exactly as received. Widths are measured in
//! terminal columns, so wide characters keep the borders aligned.

use crate::core::db::{ResultSet, Value};
use unicode_width::UnicodeWidthStr;

/// How a cell's content should be treated when laying out its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Text,
    Number,
    Null,
}

/// Represents a single cell in the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: String,
    pub kind: CellKind,
}

impl Cell {
    pub fn from_value(value: &Value) -> Self {
        let kind = if value.is_null() {
            CellKind::Null
        } else if value.is_numeric() {
            CellKind::Number
        } else {
            CellKind::Text
        };
        Cell {
            content: single_line(&value.to_string()),
            kind,
        }
    }

    fn width(&self) -> usize {
        self.content.width()
    }
}

/// Represents a row of cells in the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub row_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Represents the entire grid structure.
#[derive(Debug, Clone, Default)]
pub struct ResultsGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultsGrid {
    /// Creates a new, empty ResultsGrid.
    pub fn new() -> Self {
        ResultsGrid::default()
    }

    /// Builds a grid holding every row of a result set.
    pub fn from_result_set(result: &ResultSet) -> Self {
        let mut grid = ResultsGrid::new();
        grid.set_headers(result.columns.clone());
        for row in &result.rows {
            grid.add_row(row);
        }
        grid
    }

    /// Sets the headers for the grid.
    pub fn set_headers(&mut self, headers: Vec<String>) {
        self.headers = headers.iter().map(|h| single_line(h)).collect();
    }

    /// Adds a row of values to the grid.
    pub fn add_row(&mut self, values: &[Value]) {
        let cells = values.iter().map(Cell::from_value).collect();
        self.rows.push(Row {
            cells,
            row_index: self.rows.len(),
        });
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Renders the grid as bordered text without a trailing newline.
    ///
    /// A grid without headers renders as the empty string.
    pub fn render(&self) -> String {
        if self.headers.is_empty() {
            return String::new();
        }

        let widths = self.column_widths();
        let aligns = self.column_alignments();
        let border = horizontal_rule(&widths, '+', '+');

        let mut lines = Vec::with_capacity(self.rows.len() + 4);
        lines.push(border.clone());
        lines.push(content_line(
            self.headers.iter().map(String::as_str),
            &widths,
            &aligns,
        ));
        lines.push(horizontal_rule(&widths, '|', '+'));
        for row in &self.rows {
            lines.push(content_line(
                row.cells.iter().map(|cell| cell.content.as_str()),
                &widths,
                &aligns,
            ));
        }
        lines.push(border);
        lines.join("\n")
    }

    fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.cells.get(i))
                    .map(Cell::width)
                    .fold(header.width(), usize::max)
            })
            .collect()
    }

    /// A column is numeric when it has at least one number and nothing but
    /// numbers and NULLs.
    fn column_alignments(&self) -> Vec<Align> {
        (0..self.headers.len())
            .map(|i| {
                let mut kinds = self
                    .rows
                    .iter()
                    .filter_map(|row| row.cells.get(i))
                    .map(|cell| cell.kind)
                    .filter(|kind| *kind != CellKind::Null)
                    .peekable();
                if kinds.peek().is_some() && kinds.all(|kind| kind == CellKind::Number) {
                    Align::Right
                } else {
                    Align::Left
                }
            })
            .collect()
    }
}

fn horizontal_rule(widths: &[usize], edge: char, joint: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    format!("{edge}{}{edge}", segments.join(&joint.to_string()))
}

fn content_line<'a>(
    mut cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
    aligns: &[Align],
) -> String {
    let padded: Vec<String> = widths
        .iter()
        .zip(aligns)
        .map(|(width, align)| {
            let content = cells.next().unwrap_or("");
            let fill = " ".repeat(width.saturating_sub(content.width()));
            match align {
                Align::Left => format!("{content}{fill}"),
                Align::Right => format!("{fill}{content}"),
            }
        })
        .collect();
    format!("| {} |", padded.join(" | "))
}

/// Keeps multi-line values from breaking the grid.
fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c })
        .collect()
}
