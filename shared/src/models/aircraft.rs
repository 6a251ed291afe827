//! Aircraft Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AircraftStatus {
    #[default]
    Available,
    Maintenance,
    Grounded,
    /// Has an open (checked-out) flight. Only the flight lifecycle sets this.
    InUse,
}

/// WET rates include fuel, DRY rates do not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateBasis {
    #[default]
    Wet,
    Dry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FuelType {
    #[default]
    #[serde(rename = "100LL")]
    Avgas100ll,
    #[serde(rename = "JET_A")]
    JetA,
    #[serde(rename = "UL94")]
    Ul94,
}

/// Aircraft entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    pub id: i64,
    pub registration: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub status: AircraftStatus,
    pub hourly_rate: f64,
    pub rate_basis: RateBasis,
    pub fuel_type: FuelType,
    pub current_hobbs: f64,
    pub current_tach: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_annual: Option<NaiveDate>,
    /// Tach reading at which the next oil change is due
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_oil_change: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create aircraft payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AircraftCreate {
    pub registration: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub hourly_rate: f64,
    #[serde(default)]
    pub rate_basis: RateBasis,
    #[serde(default)]
    pub fuel_type: FuelType,
    pub current_hobbs: f64,
    pub current_tach: f64,
    pub next_annual: Option<NaiveDate>,
    pub next_oil_change: Option<f64>,
}

/// Update aircraft payload
///
/// Meters and status are not editable here: meters move through check-out,
/// status through the flight lifecycle and maintenance operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AircraftUpdate {
    pub registration: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub hourly_rate: Option<f64>,
    pub rate_basis: Option<RateBasis>,
    pub fuel_type: Option<FuelType>,
    pub next_annual: Option<NaiveDate>,
    pub next_oil_change: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuel_type_wire_names() {
        assert_eq!(serde_json::to_string(&FuelType::Avgas100ll).unwrap(), "\"100LL\"");
        assert_eq!(serde_json::to_string(&FuelType::JetA).unwrap(), "\"JET_A\"");
        assert_eq!(
            serde_json::from_str::<FuelType>("\"UL94\"").unwrap(),
            FuelType::Ul94
        );
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&AircraftStatus::InUse).unwrap(),
            "\"IN_USE\""
        );
        assert_eq!(serde_json::to_string(&RateBasis::Dry).unwrap(), "\"DRY\"");
    }
}
