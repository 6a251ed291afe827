//! Member Model

use serde::{Deserialize, Serialize};

/// Account status. Only `Active` members may book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    #[default]
    Active,
    PastDue,
    Suspended,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    #[default]
    Member,
    Admin,
    Instructor,
    Mechanic,
}

/// Member entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: MemberRole,
    pub status: MemberStatus,
    /// Running balance, positive means the member owes the club
    pub balance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_id: Option<i64>,
    /// Equity share held (equity clubs only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_size: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create member payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberCreate {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: MemberRole,
    pub tier_id: Option<i64>,
    pub share_size: Option<f64>,
}

/// Update member payload
///
/// `tier_id: Some(None)` detaches the member from its tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<MemberRole>,
    pub status: Option<MemberStatus>,
    pub tier_id: Option<Option<i64>>,
    pub share_size: Option<f64>,
}
