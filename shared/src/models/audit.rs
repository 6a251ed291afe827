//! Audit Entry Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Reservation cancelled after its start time
    LateCancellation,
    InvoicePaid,
    SquawkResolved,
    AircraftStatusChanged,
    TierDeleted,
}

/// Append-only record of a notable action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: i64,
    pub action: AuditAction,
    /// e.g. "reservation", "invoice"
    pub resource_type: String,
    pub resource_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<i64>,
    pub details: serde_json::Value,
}
