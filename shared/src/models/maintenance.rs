//! Maintenance Models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Recurring maintenance requirement for one aircraft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSchedule {
    pub id: i64,
    pub aircraft_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_months: Option<u32>,
    /// Hobbs reading when last performed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_performed_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_performed: Option<NaiveDate>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaintenanceScheduleCreate {
    pub aircraft_id: i64,
    pub name: String,
    pub interval_hours: Option<f64>,
    pub interval_months: Option<u32>,
    pub last_performed_hours: Option<f64>,
    pub last_performed: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceType {
    Annual,
    OneHundredHour,
    OilChange,
    Repair,
    Upgrade,
    AdCompliance,
}

/// Performed maintenance action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceLog {
    pub id: i64,
    pub aircraft_id: i64,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub maintenance_type: MaintenanceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    pub performed_by: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schedule_ids: Vec<i64>,
    /// Flight log whose squawk this entry resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squawk_flight_log_id: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceLogCreate {
    pub aircraft_id: i64,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub maintenance_type: MaintenanceType,
    pub cost: Option<f64>,
    pub performed_by: String,
    /// Schedules this work satisfies
    #[serde(default)]
    pub schedule_ids: Vec<i64>,
}

/// Maintenance due state, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceDue {
    Ok,
    Warning,
    Overdue,
}

/// Evaluated status of one schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceStatus {
    pub schedule_id: i64,
    pub name: String,
    pub status: MaintenanceDue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_remaining: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
}

/// Worst schedule status per aircraft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetMaintenanceSummary {
    pub aircraft_id: i64,
    pub registration: String,
    pub status: MaintenanceDue,
    pub items: Vec<MaintenanceStatus>,
}
