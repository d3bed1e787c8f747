use serde::{Deserialize, Serialize};
use std::fmt;

/// Energy source kinds the factor table knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    ElectricityGrid,
    NaturalGas,
    Gasoline,
    Diesel,
    Coal,
    Solar,
    Wind,
    Hydro,
}

impl SourceKind {
    /// Total parse: names that don't match any known kind resolve to the
    /// grid fallback, so a factor lookup can never dead-end.
    pub fn parse_or_grid(name: &str) -> SourceKind {
        match name {
            "electricity_grid" => SourceKind::ElectricityGrid,
            "natural_gas" => SourceKind::NaturalGas,
            "gasoline" => SourceKind::Gasoline,
            "diesel" => SourceKind::Diesel,
            "coal" => SourceKind::Coal,
            "solar" => SourceKind::Solar,
            "wind" => SourceKind::Wind,
            "hydro" => SourceKind::Hydro,
            _ => SourceKind::ElectricityGrid,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::ElectricityGrid => "electricity_grid",
            SourceKind::NaturalGas => "natural_gas",
            SourceKind::Gasoline => "gasoline",
            SourceKind::Diesel => "diesel",
            SourceKind::Coal => "coal",
            SourceKind::Solar => "solar",
            SourceKind::Wind => "wind",
            SourceKind::Hydro => "hydro",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorUnit {
    PerKwh,
    PerLiter,
}

/// A single emission coefficient: kg CO₂ per consumption unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    pub kind: SourceKind,
    pub coefficient: f64,
    pub unit: FactorUnit,
}

/// kg CO₂ per unit. Combustion fuels carry direct-combustion coefficients;
/// solar, wind, and hydro carry lifecycle coefficients. The table mixes the
/// two bases on purpose — downstream numbers are calibrated against these
/// exact magnitudes.
const FACTORS: [EmissionFactor; 8] = [
    // US grid average
    EmissionFactor { kind: SourceKind::ElectricityGrid, coefficient: 0.416, unit: FactorUnit::PerKwh },
    EmissionFactor { kind: SourceKind::NaturalGas, coefficient: 0.202, unit: FactorUnit::PerKwh },
    EmissionFactor { kind: SourceKind::Gasoline, coefficient: 2.31, unit: FactorUnit::PerLiter },
    EmissionFactor { kind: SourceKind::Diesel, coefficient: 2.68, unit: FactorUnit::PerLiter },
    EmissionFactor { kind: SourceKind::Coal, coefficient: 0.820, unit: FactorUnit::PerKwh },
    // lifecycle
    EmissionFactor { kind: SourceKind::Solar, coefficient: 0.041, unit: FactorUnit::PerKwh },
    EmissionFactor { kind: SourceKind::Wind, coefficient: 0.011, unit: FactorUnit::PerKwh },
    EmissionFactor { kind: SourceKind::Hydro, coefficient: 0.024, unit: FactorUnit::PerKwh },
];

/// Fixed table of emission coefficients. Read-only after construction; every
/// `SourceKind` resolves to exactly one factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmissionFactorTable;

impl EmissionFactorTable {
    pub fn new() -> Self {
        EmissionFactorTable
    }

    /// Never fails: the kind enum is closed and every variant has a row.
    pub fn lookup(&self, kind: SourceKind) -> EmissionFactor {
        FACTORS
            .iter()
            .copied()
            .find(|f| f.kind == kind)
            .unwrap_or(FACTORS[0])
    }

    /// The grid coefficient — the universal fallback, also used to price
    /// savings measures regardless of the record's declared source.
    pub fn grid_coefficient(&self) -> f64 {
        self.lookup(SourceKind::ElectricityGrid).coefficient
    }
}
