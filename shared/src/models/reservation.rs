//! Reservation Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationType {
    Flight,
    Instruction,
    /// Maintenance blocks skip member policy but still occupy the aircraft
    Maintenance,
    GroundSchool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Confirmed,
    CheckedOut,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    /// Non-cancelled reservations occupy their aircraft slot
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }

    /// Counted against the member's concurrent reservation cap
    pub fn is_active(&self) -> bool {
        matches!(self, ReservationStatus::Confirmed | ReservationStatus::CheckedOut)
    }
}

/// Reservation entity, a half-open interval `[start_time, end_time)` in epoch millis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub member_id: i64,
    pub aircraft_id: i64,
    pub start_time: i64,
    pub end_time: i64,
    pub reservation_type: ReservationType,
    pub status: ReservationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Reservation {
    /// Half-open interval overlap: `start < other.end && end > other.start`
    pub fn overlaps(&self, start: i64, end: i64) -> bool {
        start < self.end_time && end > self.start_time
    }
}

/// Booking request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub member_id: i64,
    pub aircraft_id: i64,
    pub start_time: i64,
    pub end_time: i64,
    pub reservation_type: ReservationType,
    pub notes: Option<String>,
}
