//! Unified error codes for the flight club engine
//!
//! This module defines all error codes surfaced by club-engine to the API layer.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Member / tier errors
//! - 2xxx: Reservation admission errors
//! - 3xxx: Flight lifecycle errors
//! - 4xxx: Billing errors
//! - 5xxx: Maintenance errors
//! - 6xxx: Attachment errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Operation is intentionally not supported
    Unsupported = 9,

    // ==================== 1xxx: Member ====================
    /// Member not found
    MemberNotFound = 1001,
    /// Member account is not ACTIVE
    MemberNotEligible = 1002,
    /// Membership tier not found
    TierNotFound = 1101,
    /// Membership tier is still assigned to members
    TierInUse = 1102,

    // ==================== 2xxx: Reservation ====================
    /// Reservation not found
    ReservationNotFound = 2001,
    /// End time is not after start time
    InvalidTimeRange = 2002,
    /// Member already holds an overlapping reservation
    SelfOverlap = 2003,
    /// Aircraft already reserved for the slot
    AircraftUnavailable = 2004,
    /// Reservation ends beyond the booking window
    OutsideBookingWindow = 2005,
    /// Reservation spans too many calendar days
    TripTooLong = 2006,
    /// Member reached the concurrent reservation cap
    TooManyActiveReservations = 2007,
    /// Annual weekend-day quota exceeded
    WeekendQuotaExceeded = 2008,

    // ==================== 3xxx: Flight ====================
    /// State transition precondition does not hold
    InvalidTransition = 3001,
    /// Meter or fuel value is invalid
    InvalidMeterReading = 3002,
    /// Meter reading regresses beyond tolerance
    ImplausibleMeterReading = 3003,
    /// Flight log not found
    FlightLogNotFound = 3004,
    /// Aircraft not found
    AircraftNotFound = 3101,

    // ==================== 4xxx: Billing ====================
    /// Invoice not found
    InvoiceNotFound = 4001,
    /// Invoice has already been paid
    InvoiceAlreadyPaid = 4002,

    // ==================== 5xxx: Maintenance ====================
    /// Maintenance schedule not found
    ScheduleNotFound = 5001,
    /// Flight log has no open squawk
    NoOpenSquawk = 5002,

    // ==================== 6xxx: Attachment ====================
    /// File exceeds the size limit
    FileTooLarge = 6501,
    /// File is empty
    EmptyFile = 6505,
    /// Storing the file failed
    FileStorageFailed = 6509,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    NetworkError = 9003,
    ConfigError = 9005,

    // ==================== 94xx: Storage ====================
    StorageFull = 9401,
    StorageCorrupted = 9403,
    SystemBusy = 9404,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::Unsupported => "Operation is not supported",

            // Member
            ErrorCode::MemberNotFound => "Member not found",
            ErrorCode::MemberNotEligible => "Member account is not active",
            ErrorCode::TierNotFound => "Membership tier not found",
            ErrorCode::TierInUse => "Membership tier is assigned to members",

            // Reservation
            ErrorCode::ReservationNotFound => "Reservation not found",
            ErrorCode::InvalidTimeRange => "Reservation must end after it starts",
            ErrorCode::SelfOverlap => "Member already has a reservation during this time",
            ErrorCode::AircraftUnavailable => "Aircraft is not available for this time slot",
            ErrorCode::OutsideBookingWindow => "Reservation is outside of the booking window",
            ErrorCode::TripTooLong => "Reservation exceeds the maximum trip length",
            ErrorCode::TooManyActiveReservations => "Maximum active reservations reached",
            ErrorCode::WeekendQuotaExceeded => "Annual weekend day limit exceeded",

            // Flight
            ErrorCode::InvalidTransition => "Invalid state transition",
            ErrorCode::InvalidMeterReading => "Invalid meter reading",
            ErrorCode::ImplausibleMeterReading => "Meter reading is lower than the aircraft's last reading",
            ErrorCode::FlightLogNotFound => "Flight log not found",
            ErrorCode::AircraftNotFound => "Aircraft not found",

            // Billing
            ErrorCode::InvoiceNotFound => "Invoice not found",
            ErrorCode::InvoiceAlreadyPaid => "Invoice has already been paid",

            // Maintenance
            ErrorCode::ScheduleNotFound => "Maintenance schedule not found",
            ErrorCode::NoOpenSquawk => "Flight log has no open squawk",

            // Attachment
            ErrorCode::FileTooLarge => "File is too large",
            ErrorCode::EmptyFile => "File is empty",
            ErrorCode::FileStorageFailed => "Failed to store file",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::StorageFull => "Storage is full",
            ErrorCode::StorageCorrupted => "Storage is corrupted",
            ErrorCode::SystemBusy => "System is busy, please retry",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::Unsupported),

            // Member
            1001 => Ok(ErrorCode::MemberNotFound),
            1002 => Ok(ErrorCode::MemberNotEligible),
            1101 => Ok(ErrorCode::TierNotFound),
            1102 => Ok(ErrorCode::TierInUse),

            // Reservation
            2001 => Ok(ErrorCode::ReservationNotFound),
            2002 => Ok(ErrorCode::InvalidTimeRange),
            2003 => Ok(ErrorCode::SelfOverlap),
            2004 => Ok(ErrorCode::AircraftUnavailable),
            2005 => Ok(ErrorCode::OutsideBookingWindow),
            2006 => Ok(ErrorCode::TripTooLong),
            2007 => Ok(ErrorCode::TooManyActiveReservations),
            2008 => Ok(ErrorCode::WeekendQuotaExceeded),

            // Flight
            3001 => Ok(ErrorCode::InvalidTransition),
            3002 => Ok(ErrorCode::InvalidMeterReading),
            3003 => Ok(ErrorCode::ImplausibleMeterReading),
            3004 => Ok(ErrorCode::FlightLogNotFound),
            3101 => Ok(ErrorCode::AircraftNotFound),

            // Billing
            4001 => Ok(ErrorCode::InvoiceNotFound),
            4002 => Ok(ErrorCode::InvoiceAlreadyPaid),

            // Maintenance
            5001 => Ok(ErrorCode::ScheduleNotFound),
            5002 => Ok(ErrorCode::NoOpenSquawk),

            // Attachment
            6501 => Ok(ErrorCode::FileTooLarge),
            6505 => Ok(ErrorCode::EmptyFile),
            6509 => Ok(ErrorCode::FileStorageFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9005 => Ok(ErrorCode::ConfigError),
            9401 => Ok(ErrorCode::StorageFull),
            9403 => Ok(ErrorCode::StorageCorrupted),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::MemberNotEligible.code(), 1002);
        assert_eq!(ErrorCode::AircraftUnavailable.code(), 2004);
        assert_eq!(ErrorCode::InvalidTransition.code(), 3001);
        assert_eq!(ErrorCode::InvoiceAlreadyPaid.code(), 4002);
        assert_eq!(ErrorCode::NoOpenSquawk.code(), 5002);
        assert_eq!(ErrorCode::ConfigError.code(), 9005);
    }

    #[test]
    fn test_try_from_u16_roundtrip() {
        let codes = [
            ErrorCode::Unsupported,
            ErrorCode::TierInUse,
            ErrorCode::WeekendQuotaExceeded,
            ErrorCode::ImplausibleMeterReading,
            ErrorCode::InvoiceNotFound,
            ErrorCode::ScheduleNotFound,
            ErrorCode::FileStorageFailed,
            ErrorCode::SystemBusy,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid_u16() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(2999), Err(InvalidErrorCode(2999)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::TripTooLong).unwrap();
        assert_eq!(json, "2006");
        let code: ErrorCode = serde_json::from_str("2007").unwrap();
        assert_eq!(code, ErrorCode::TooManyActiveReservations);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
    }
}
