//! Membership Tier Model

use serde::{Deserialize, Serialize};

/// Named policy bundle. Absent policy fields fall back to club settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipTier {
    pub id: i64,
    pub name: String,
    pub monthly_dues: f64,
    /// Percentage off the aircraft hourly rate (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate_discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_reservations: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_days_per_reservation: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_trip_length_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_window_days: Option<u32>,
    /// Annual cap on weekend days flown. No cap when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_weekend_days_per_year: Option<u32>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create / replace tier payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembershipTierCreate {
    pub name: String,
    pub monthly_dues: f64,
    pub hourly_rate_discount: Option<f64>,
    pub max_reservations: Option<u32>,
    pub max_days_per_reservation: Option<u32>,
    pub max_trip_length_days: Option<u32>,
    pub booking_window_days: Option<u32>,
    pub max_weekend_days_per_year: Option<u32>,
}
