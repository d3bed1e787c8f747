use serde_json::Value;
use thiserror::Error;

use crate::factor::SourceKind;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("non-numeric value for '{field}': {value}")]
    NonNumeric { field: &'static str, value: String },
    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),
}

/// Which fields the caller supplied explicitly, as opposed to defaulted.
/// Confidence scoring rewards supplied data; parsed values do not affect it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuppliedFields {
    pub source_kind: bool,
    pub household_size: bool,
    pub region: bool,
}

/// One estimation call's worth of energy-consumption input. Transient: built
/// from the caller's unstructured map, consumed by a single estimate.
#[derive(Debug, Clone)]
pub struct EnergyRecord {
    pub consumption_quantity: f64,
    pub source_kind: SourceKind,
    pub household_size: u32,
    pub region: String,
    pub supplied: SuppliedFields,
}

pub const DEFAULT_HOUSEHOLD_SIZE: u32 = 2;
pub const DEFAULT_REGION: &str = "US";

impl EnergyRecord {
    /// Build a record from extracted consumption data. The source kind counts
    /// as supplied here — the pipeline names it when forwarding bill data.
    pub fn from_consumption(quantity: f64, kind: SourceKind) -> Self {
        EnergyRecord {
            consumption_quantity: quantity.max(0.0),
            source_kind: kind,
            household_size: DEFAULT_HOUSEHOLD_SIZE,
            region: DEFAULT_REGION.to_string(),
            supplied: SuppliedFields { source_kind: true, ..SuppliedFields::default() },
        }
    }

    /// Parse the caller's unstructured map (wire keys: `kWh`, `type`,
    /// `household_size`, `region`). Missing fields take defaults; a field
    /// that is present but not numeric where a number is required is a
    /// conversion error. A `type` that isn't a string quietly falls back to
    /// the grid kind — only the numeric fields can fail.
    pub fn from_json(input: &Value) -> Result<Self, ConversionError> {
        let map = input
            .as_object()
            .ok_or_else(|| ConversionError::NotAnObject(value_kind(input).to_string()))?;

        let quantity = match map.get("kWh") {
            Some(v) => coerce_f64(v).ok_or_else(|| ConversionError::NonNumeric {
                field: "kWh",
                value: v.to_string(),
            })?,
            None => 0.0,
        };

        let source_kind = match map.get("type") {
            Some(Value::String(s)) => SourceKind::parse_or_grid(s),
            _ => SourceKind::ElectricityGrid,
        };

        let household_size = match map.get("household_size") {
            Some(v) => coerce_f64(v).ok_or_else(|| ConversionError::NonNumeric {
                field: "household_size",
                value: v.to_string(),
            })? as u32,
            None => DEFAULT_HOUSEHOLD_SIZE,
        };

        let region = match map.get("region") {
            Some(Value::String(s)) => s.clone(),
            _ => DEFAULT_REGION.to_string(),
        };

        Ok(EnergyRecord {
            consumption_quantity: quantity.max(0.0),
            source_kind,
            // household_size is ≥ 1 by contract
            household_size: household_size.max(1),
            region,
            supplied: SuppliedFields {
                source_kind: map.contains_key("type"),
                household_size: map.contains_key("household_size"),
                region: map.contains_key("region"),
            },
        })
    }
}

/// Numbers, or strings that parse as numbers — the lenient coercion callers
/// of the service rely on.
pub fn coerce_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
