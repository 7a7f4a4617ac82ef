//! Static column layouts for the known sheet variants.
//!
//! Sheet exports drifted over time: the early Model Y quarter put the
//! duration columns before the delivery date, later sheets swapped them, and
//! the Model 3 sheet carries an extra battery column right after the trim.
//! A layout is picked from the source's configured [`SchemaVariant`] and is
//! never guessed from cell contents. Picking the wrong variant shifts every
//! field in the sheet.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::vehicle::VehicleLine;

/// Zero-based column index of every semantic field in one sheet layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: usize,
    pub order_date: usize,
    pub country: usize,
    pub model: usize,
    /// Only the Model 3 sheet has a battery column.
    pub battery: Option<usize>,
    pub drive: usize,
    pub color: usize,
    pub interior: usize,
    pub wheels: usize,
    pub tow_hitch: usize,
    pub autopilot: usize,
    pub delivery_window: usize,
    pub delivery_location: usize,
    pub vin: usize,
    pub vin_received_date: usize,
    pub papers_received_date: usize,
    pub production_date: usize,
    pub type_approval: usize,
    pub type_variant: usize,
    pub delivery_date: usize,
    pub days_to_vin: usize,
    pub days_to_papers: usize,
    pub days_to_delivery: usize,
}

pub static MODEL_Y_LEGACY: ColumnMap = ColumnMap {
    name: 0,
    order_date: 1,
    country: 2,
    model: 3,
    battery: None,
    drive: 4,
    color: 5,
    interior: 6,
    wheels: 7,
    tow_hitch: 8,
    autopilot: 9,
    delivery_window: 10,
    delivery_location: 11,
    vin: 12,
    vin_received_date: 13,
    papers_received_date: 14,
    production_date: 15,
    type_approval: 16,
    type_variant: 17,
    days_to_vin: 18,
    days_to_papers: 19,
    delivery_date: 20,
    days_to_delivery: 21,
};

pub static MODEL_Y: ColumnMap = ColumnMap {
    name: 0,
    order_date: 1,
    country: 2,
    model: 3,
    battery: None,
    drive: 4,
    color: 5,
    interior: 6,
    wheels: 7,
    tow_hitch: 8,
    autopilot: 9,
    delivery_window: 10,
    delivery_location: 11,
    vin: 12,
    vin_received_date: 13,
    papers_received_date: 14,
    production_date: 15,
    type_approval: 16,
    type_variant: 17,
    delivery_date: 18,
    days_to_vin: 19,
    days_to_papers: 20,
    days_to_delivery: 21,
};

pub static MODEL_3: ColumnMap = ColumnMap {
    name: 0,
    order_date: 1,
    country: 2,
    model: 3,
    battery: Some(4),
    drive: 5,
    color: 6,
    interior: 7,
    wheels: 8,
    tow_hitch: 9,
    autopilot: 10,
    delivery_window: 11,
    delivery_location: 12,
    vin: 13,
    vin_received_date: 14,
    papers_received_date: 15,
    production_date: 16,
    type_approval: 17,
    type_variant: 18,
    delivery_date: 19,
    days_to_vin: 20,
    days_to_papers: 21,
    days_to_delivery: 22,
};

/// Known historical sheet layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum SchemaVariant {
    #[serde(rename = "model_y_legacy")]
    #[value(name = "model_y_legacy")]
    ModelYLegacy,
    #[serde(rename = "model_y")]
    #[value(name = "model_y")]
    ModelY,
    #[serde(rename = "model_3")]
    #[value(name = "model_3")]
    Model3,
}

impl SchemaVariant {
    pub fn column_map(self) -> &'static ColumnMap {
        match self {
            SchemaVariant::ModelYLegacy => &MODEL_Y_LEGACY,
            SchemaVariant::ModelY => &MODEL_Y,
            SchemaVariant::Model3 => &MODEL_3,
        }
    }

    pub fn vehicle_line(self) -> VehicleLine {
        match self {
            SchemaVariant::ModelYLegacy | SchemaVariant::ModelY => VehicleLine::ModelY,
            SchemaVariant::Model3 => VehicleLine::Model3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaVariant::ModelYLegacy => "model_y_legacy",
            SchemaVariant::ModelY => "model_y",
            SchemaVariant::Model3 => "model_3",
        }
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the cell at `index`, or an empty string for short rows.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}
