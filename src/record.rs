//! Builds normalized order records from tokenized sheet rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    columns::{ColumnMap, SchemaVariant, cell},
    error::SheetError,
    header,
    normalize::{self, clean_value},
    tokenizer::{self, SourceRow},
    vehicle::{LineRules, VehicleLine},
};

/// Minimum number of tokenized rows (header plus one data row) a sheet
/// needs before it is considered to carry data.
pub const MIN_SHEET_ROWS: usize = 2;

/// One order as read from a sheet, in canonical vocabulary.
///
/// `name` is never empty. Every other field is `None` when the sheet gives
/// no usable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedOrderRecord {
    pub name: String,
    pub vehicle_type: VehicleLine,
    pub order_date: Option<NaiveDate>,
    pub country: Option<String>,
    pub model: Option<String>,
    pub range: Option<String>,
    pub drive: Option<String>,
    pub color: Option<String>,
    pub interior: Option<String>,
    pub wheels: Option<String>,
    pub tow_hitch: Option<String>,
    pub autopilot: Option<String>,
    pub delivery_window: Option<String>,
    pub delivery_location: Option<String>,
    pub vin: Option<String>,
    pub vin_received_date: Option<NaiveDate>,
    pub papers_received_date: Option<NaiveDate>,
    pub production_date: Option<NaiveDate>,
    pub type_approval: Option<String>,
    pub type_variant: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub days_to_vin: Option<i64>,
    pub days_to_papers: Option<i64>,
    pub days_to_delivery: Option<i64>,
}

/// Column captions used when records are written back out as CSV.
pub const CSV_HEADERS: &[&str] = &[
    "name",
    "vehicle_type",
    "order_date",
    "country",
    "model",
    "range",
    "drive",
    "color",
    "interior",
    "wheels",
    "tow_hitch",
    "autopilot",
    "delivery_window",
    "delivery_location",
    "vin",
    "vin_received_date",
    "papers_received_date",
    "production_date",
    "type_approval",
    "type_variant",
    "delivery_date",
    "days_to_vin",
    "days_to_papers",
    "days_to_delivery",
];

impl NormalizedOrderRecord {
    /// Renders the record in [`CSV_HEADERS`] order; unknown values are empty.
    pub fn csv_fields(&self) -> Vec<String> {
        fn text(value: &Option<String>) -> String {
            value.clone().unwrap_or_default()
        }
        fn date(value: &Option<NaiveDate>) -> String {
            value
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        }
        fn number(value: &Option<i64>) -> String {
            value.map(|n| n.to_string()).unwrap_or_default()
        }
        vec![
            self.name.clone(),
            self.vehicle_type.to_string(),
            date(&self.order_date),
            text(&self.country),
            text(&self.model),
            text(&self.range),
            text(&self.drive),
            text(&self.color),
            text(&self.interior),
            text(&self.wheels),
            text(&self.tow_hitch),
            text(&self.autopilot),
            text(&self.delivery_window),
            text(&self.delivery_location),
            text(&self.vin),
            date(&self.vin_received_date),
            date(&self.papers_received_date),
            date(&self.production_date),
            text(&self.type_approval),
            text(&self.type_variant),
            date(&self.delivery_date),
            number(&self.days_to_vin),
            number(&self.days_to_papers),
            number(&self.days_to_delivery),
        ]
    }
}

/// Column layout plus vehicle-line hooks for one sheet.
#[derive(Clone, Copy)]
pub struct RecordBuilder {
    columns: &'static ColumnMap,
    rules: &'static dyn LineRules,
}

impl RecordBuilder {
    pub fn new(columns: &'static ColumnMap, rules: &'static dyn LineRules) -> Self {
        Self { columns, rules }
    }

    pub fn for_variant(variant: SchemaVariant) -> Self {
        Self::new(variant.column_map(), variant.vehicle_line().rules())
    }

    /// Normalizes one data row. Rows without a name yield `None`.
    pub fn build(&self, row: &[String]) -> Option<NormalizedOrderRecord> {
        let map = self.columns;
        let get = |index: usize| clean_value(cell(row, index));
        let text = |index: usize| get(index).map(str::to_string);
        let date = |index: usize| get(index).and_then(normalize::parse_date);

        let name = get(map.name)?.to_string();
        // Line rules see the canonical trim, so short forms such as `P` count.
        let model = get(map.model).map(normalize::normalize_model);
        let trim = model.as_deref();
        let battery = map.battery.and_then(get);
        let order_date = date(map.order_date);
        let vin_received_date = date(map.vin_received_date);
        let papers_received_date = date(map.papers_received_date);
        let delivery_date = date(map.delivery_date);

        Some(NormalizedOrderRecord {
            name,
            vehicle_type: self.rules.line(),
            order_date,
            country: get(map.country).map(normalize::normalize_country),
            range: self.rules.resolve_range(trim, battery),
            drive: get(map.drive).map(normalize::normalize_drive),
            color: get(map.color).map(normalize::normalize_color),
            interior: get(map.interior).map(normalize::normalize_interior),
            wheels: get(map.wheels).map(normalize::normalize_wheels),
            tow_hitch: self.rules.resolve_tow_hitch(trim, get(map.tow_hitch)),
            model,
            autopilot: get(map.autopilot).map(normalize::normalize_autopilot),
            delivery_window: text(map.delivery_window),
            delivery_location: text(map.delivery_location),
            vin: get(map.vin).map(str::to_uppercase),
            vin_received_date,
            papers_received_date,
            production_date: date(map.production_date),
            type_approval: text(map.type_approval),
            type_variant: text(map.type_variant),
            delivery_date,
            days_to_vin: elapsed_days(order_date, vin_received_date)
                .or_else(|| get(map.days_to_vin).and_then(normalize::parse_number)),
            days_to_papers: elapsed_days(order_date, papers_received_date)
                .or_else(|| get(map.days_to_papers).and_then(normalize::parse_number)),
            days_to_delivery: elapsed_days(order_date, delivery_date)
                .or_else(|| get(map.days_to_delivery).and_then(normalize::parse_number)),
        })
    }
}

fn elapsed_days(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<i64> {
    Some((to? - from?).num_days())
}

/// A data row of a sheet with its 1-based position among the tokenized rows.
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub row_number: usize,
    pub record: Option<NormalizedOrderRecord>,
}

/// Tokenizes a sheet export and normalizes every data row below the header.
pub fn parse_sheet(text: &str, variant: SchemaVariant) -> Result<Vec<ParsedRow>, SheetError> {
    let rows = tokenizer::tokenize(text);
    parse_rows(&rows, RecordBuilder::for_variant(variant))
}

pub fn parse_rows(rows: &[SourceRow], builder: RecordBuilder) -> Result<Vec<ParsedRow>, SheetError> {
    if rows.len() < MIN_SHEET_ROWS {
        return Err(SheetError::NoData { rows: rows.len() });
    }
    let start = header::locate_data_start(rows);
    Ok(rows
        .iter()
        .enumerate()
        .skip(start)
        .map(|(idx, row)| ParsedRow {
            row_number: idx + 1,
            record: builder.build(row),
        })
        .collect())
}
