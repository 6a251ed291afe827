//! Flight Log Model

use serde::{Deserialize, Serialize};

/// Pilot-reported discrepancy carried by the flight notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SquawkState {
    #[default]
    None,
    Open,
    Resolved,
}

/// Flight record, one per reservation once checked in.
///
/// End readings and money fields stay empty until check-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLog {
    pub id: i64,
    pub reservation_id: i64,
    pub aircraft_id: i64,
    pub member_id: i64,
    pub hobbs_start: f64,
    pub tach_start: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hobbs_end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tach_end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_gallons: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_reimbursement: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub squawk: SquawkState,

    // === Attachment references ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_hobbs_photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_hobbs_photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_receipt_url: Option<String>,

    pub created_at: i64,
    pub updated_at: i64,
}

impl FlightLog {
    pub fn is_open(&self) -> bool {
        self.hobbs_end.is_none()
    }
}

/// Dispatch payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub reservation_id: i64,
    pub hobbs_start: f64,
    pub tach_start: f64,
    pub start_hobbs_photo_url: Option<String>,
}

/// Return payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckOutRequest {
    pub reservation_id: i64,
    pub hobbs_end: f64,
    pub tach_end: f64,
    pub fuel_gallons: f64,
    /// What the member paid for fuel away from home (informational)
    pub fuel_cost: f64,
    /// Non-empty notes open a squawk
    pub notes: Option<String>,
    pub end_hobbs_photo_url: Option<String>,
    pub fuel_receipt_url: Option<String>,
}
