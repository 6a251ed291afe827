//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Member errors
/// - 2xxx: Reservation errors
/// - 3xxx: Flight errors
/// - 4xxx: Billing errors
/// - 5xxx: Maintenance errors
/// - 6xxx: Attachment errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Member errors (1xxx)
    Member,
    /// Reservation errors (2xxx)
    Reservation,
    /// Flight errors (3xxx)
    Flight,
    /// Billing errors (4xxx)
    Billing,
    /// Maintenance errors (5xxx)
    Maintenance,
    /// Attachment errors (6xxx)
    Attachment,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Member,
            2000..3000 => Self::Reservation,
            3000..4000 => Self::Flight,
            4000..5000 => Self::Billing,
            5000..6000 => Self::Maintenance,
            6000..7000 => Self::Attachment,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Member => "member",
            Self::Reservation => "reservation",
            Self::Flight => "flight",
            Self::Billing => "billing",
            Self::Maintenance => "maintenance",
            Self::Attachment => "attachment",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
