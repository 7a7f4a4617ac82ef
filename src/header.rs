//! Header row detection.
//!
//! Some sheets prepend decorative title rows above the real header. The
//! locator looks for known column captions in the first few rows and
//! reports where the data begins.
//!
//! Matching is by substring, so a title row that mentions a marker (for
//! example "Model Y Bestellungen") is itself taken as the header. The real
//! caption row below it is then read as data; its name cell is `Name`, so it
//! surfaces as an order named "Name" rather than being dropped.

use crate::tokenizer::SourceRow;

/// Number of leading rows inspected for a header.
pub const HEADER_SCAN_ROWS: usize = 5;

/// Lowercase caption fragments that identify the header row.
const HEADER_MARKERS: &[&str] = &[
    "name",
    "bestelldatum",
    "bestellt am",
    "order date",
    "modell",
    "model",
];

/// Returns the index of the first data row.
///
/// Falls back to treating row 0 as the header when no marker is found.
pub fn locate_data_start(rows: &[SourceRow]) -> usize {
    header_row_index(rows).unwrap_or(0) + 1
}

/// Returns the index of the header row when one is recognized.
pub fn header_row_index(rows: &[SourceRow]) -> Option<usize> {
    rows.iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| row.iter().any(|cell| is_header_caption(cell)))
}

fn is_header_caption(cell: &str) -> bool {
    let lowered = cell.to_lowercase();
    HEADER_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}
