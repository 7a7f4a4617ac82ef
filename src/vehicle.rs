//! Vehicle lines and their sheet-specific rules.
//!
//! Both vehicle lines run through the same pipeline. What differs is held
//! in a [`LineRules`] implementation: how the range is read and whether the
//! trim overrides the tow hitch cell.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleLine {
    #[serde(rename = "model_y")]
    ModelY,
    #[serde(rename = "model_3")]
    Model3,
}

impl VehicleLine {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleLine::ModelY => "model_y",
            VehicleLine::Model3 => "model_3",
        }
    }

    pub fn rules(self) -> &'static dyn LineRules {
        match self {
            VehicleLine::ModelY => &ModelYRules,
            VehicleLine::Model3 => &Model3Rules,
        }
    }
}

impl fmt::Display for VehicleLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hooks a vehicle line plugs into the shared record builder.
///
/// Inputs are cleaned cells (see [`normalize::clean_value`]).
pub trait LineRules: Send + Sync {
    fn line(&self) -> VehicleLine;

    /// Range read from the sheet, if the line's sheet records one.
    fn resolve_range(&self, _trim: Option<&str>, _battery: Option<&str>) -> Option<String> {
        None
    }

    fn resolve_tow_hitch(&self, _trim: Option<&str>, value: Option<&str>) -> Option<String> {
        value.map(normalize::normalize_tow_hitch)
    }
}

pub struct ModelYRules;

impl LineRules for ModelYRules {
    fn line(&self) -> VehicleLine {
        VehicleLine::ModelY
    }
}

pub struct Model3Rules;

impl LineRules for Model3Rules {
    fn line(&self) -> VehicleLine {
        VehicleLine::Model3
    }

    fn resolve_range(&self, trim: Option<&str>, battery: Option<&str>) -> Option<String> {
        normalize::map_battery_to_range(trim, battery)
    }

    fn resolve_tow_hitch(&self, trim: Option<&str>, value: Option<&str>) -> Option<String> {
        normalize::map_tow_hitch(trim, value)
    }
}
