use crate::db::StorageError;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Engine errors
///
/// Every variant is raised before the write transaction commits, so a
/// rejected operation leaves storage untouched.
#[derive(Debug, Error)]
pub enum ClubError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("End time must be after start time")]
    InvalidTimeRange,

    #[error("Member {member_id} is not eligible to book (status {status})")]
    MemberNotEligible { member_id: i64, status: String },

    #[error("Member already has reservation {conflicting_id} during this time")]
    SelfOverlap { conflicting_id: i64 },

    #[error("Aircraft is already reserved by reservation {conflicting_id}")]
    AircraftUnavailable { conflicting_id: i64 },

    #[error("Aircraft is {status} and cannot be dispatched")]
    AircraftGrounded { status: String },

    #[error("Reservations can only be made {window_days} days in advance")]
    OutsideBookingWindow { window_days: u32 },

    #[error("Reservation spans {requested_days} days, limit is {max_days}")]
    TripTooLong { requested_days: u32, max_days: u32 },

    #[error("Maximum of {max} active reservations reached")]
    TooManyActiveReservations { max: u32 },

    #[error("Weekend quota exceeded: {used} used + {requested} requested > {quota}")]
    WeekendQuotaExceeded { used: u32, requested: u32, quota: u32 },

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid meter reading: {0}")]
    InvalidMeterReading(String),

    #[error("{meter} reading {reading} is below the aircraft's current {current}")]
    ImplausibleMeterReading {
        meter: &'static str,
        reading: f64,
        current: f64,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Tier {tier_id} is assigned to {members} member(s)")]
    TierInUse { tier_id: i64, members: usize },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

impl ClubError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            ClubError::Storage(e) => classify_storage_error(e),
            ClubError::NotFound { entity, .. } => match *entity {
                "Member" => ErrorCode::MemberNotFound,
                "MembershipTier" => ErrorCode::TierNotFound,
                "Aircraft" => ErrorCode::AircraftNotFound,
                "Reservation" => ErrorCode::ReservationNotFound,
                "FlightLog" => ErrorCode::FlightLogNotFound,
                "Invoice" => ErrorCode::InvoiceNotFound,
                "MaintenanceSchedule" => ErrorCode::ScheduleNotFound,
                _ => ErrorCode::NotFound,
            },
            ClubError::InvalidTimeRange => ErrorCode::InvalidTimeRange,
            ClubError::MemberNotEligible { .. } => ErrorCode::MemberNotEligible,
            ClubError::SelfOverlap { .. } => ErrorCode::SelfOverlap,
            ClubError::AircraftUnavailable { .. } | ClubError::AircraftGrounded { .. } => {
                ErrorCode::AircraftUnavailable
            }
            ClubError::OutsideBookingWindow { .. } => ErrorCode::OutsideBookingWindow,
            ClubError::TripTooLong { .. } => ErrorCode::TripTooLong,
            ClubError::TooManyActiveReservations { .. } => ErrorCode::TooManyActiveReservations,
            ClubError::WeekendQuotaExceeded { .. } => ErrorCode::WeekendQuotaExceeded,
            ClubError::InvalidTransition(_) => ErrorCode::InvalidTransition,
            ClubError::InvalidMeterReading(_) => ErrorCode::InvalidMeterReading,
            ClubError::ImplausibleMeterReading { .. } => ErrorCode::ImplausibleMeterReading,
            ClubError::Configuration(_) => ErrorCode::ConfigError,
            ClubError::TierInUse { .. } => ErrorCode::TierInUse,
            ClubError::Unsupported(_) => ErrorCode::Unsupported,
            ClubError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }
}

/// 将存储错误转换为错误码
fn classify_storage_error(e: &StorageError) -> ErrorCode {
    if let StorageError::Serialization(_) = e {
        return ErrorCode::StorageCorrupted;
    }

    // redb 错误通过字符串匹配分类
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return ErrorCode::StorageFull;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return ErrorCode::StorageCorrupted;
    }

    // 默认：系统繁忙
    ErrorCode::SystemBusy
}

impl From<ClubError> for AppError {
    fn from(err: ClubError) -> Self {
        let code = err.error_code();
        let message = err.to_string();
        let app = AppError::with_message(code, message);
        match err {
            ClubError::Storage(e) => {
                tracing::error!(error = %e, error_code = %code, "Storage error occurred");
                app
            }
            ClubError::NotFound { entity, id } => {
                app.with_detail("resource", entity).with_detail("id", id)
            }
            ClubError::MemberNotEligible { member_id, status } => app
                .with_detail("member_id", member_id)
                .with_detail("status", status),
            ClubError::SelfOverlap { conflicting_id }
            | ClubError::AircraftUnavailable { conflicting_id } => {
                app.with_detail("conflicting_reservation_id", conflicting_id)
            }
            ClubError::OutsideBookingWindow { window_days } => {
                app.with_detail("window_days", window_days)
            }
            ClubError::TripTooLong {
                requested_days,
                max_days,
            } => app
                .with_detail("requested_days", requested_days)
                .with_detail("max_days", max_days),
            ClubError::TooManyActiveReservations { max } => app.with_detail("max", max),
            ClubError::WeekendQuotaExceeded {
                used,
                requested,
                quota,
            } => app
                .with_detail("used", used)
                .with_detail("requested", requested)
                .with_detail("quota", quota),
            ClubError::ImplausibleMeterReading {
                meter,
                reading,
                current,
            } => app
                .with_detail("meter", meter)
                .with_detail("reading", reading)
                .with_detail("current", current),
            ClubError::TierInUse { tier_id, members } => app
                .with_detail("tier_id", tier_id)
                .with_detail("members", members),
            _ => app,
        }
    }
}

pub type ClubResult<T> = Result<T, ClubError>;
