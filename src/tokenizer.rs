//! CSV tokenizer for spreadsheet exports.
//!
//! Sheet exports are not strict RFC 4180: quotes can open mid-cell, cells
//! carry stray padding, and the tail of a file is often a run of blank
//! rows. [`tokenize()`] scans the text once, left to right, and never fails.
//! Every cell is trimmed, rows whose cells are all empty are dropped, and an
//! unterminated quote swallows the rest of the input as cell content.

/// One parsed row of cells.
pub type SourceRow = Vec<String>;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Splits raw CSV text into rows of trimmed cells.
pub fn tokenize(text: &str) -> Vec<SourceRow> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let mut rows = Vec::new();
    let mut row: SourceRow = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                other => cell.push(other),
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            ',' => finish_cell(&mut row, &mut cell),
            '\n' => {
                finish_cell(&mut row, &mut cell);
                finish_row(&mut rows, &mut row);
            }
            '\r' => {}
            other => cell.push(other),
        }
    }

    if !cell.is_empty() || !row.is_empty() {
        finish_cell(&mut row, &mut cell);
        finish_row(&mut rows, &mut row);
    }
    rows
}

fn finish_cell(row: &mut SourceRow, cell: &mut String) {
    let trimmed = cell.trim();
    let value = if trimmed.len() == cell.len() {
        std::mem::take(cell)
    } else {
        let owned = trimmed.to_string();
        cell.clear();
        owned
    };
    row.push(value);
}

fn finish_row(rows: &mut Vec<SourceRow>, row: &mut SourceRow) {
    let completed = std::mem::take(row);
    if completed.iter().any(|cell| !cell.is_empty()) {
        rows.push(completed);
    }
}
