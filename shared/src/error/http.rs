//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::MemberNotFound
            | Self::TierNotFound
            | Self::ReservationNotFound
            | Self::FlightLogNotFound
            | Self::AircraftNotFound
            | Self::InvoiceNotFound
            | Self::ScheduleNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::TierInUse
            | Self::SelfOverlap
            | Self::AircraftUnavailable
            | Self::InvalidTransition
            | Self::InvoiceAlreadyPaid
            | Self::NoOpenSquawk => StatusCode::CONFLICT,

            // 403 Forbidden
            Self::MemberNotEligible => StatusCode::FORBIDDEN,

            // 422 Business rule
            Self::OutsideBookingWindow
            | Self::TripTooLong
            | Self::TooManyActiveReservations
            | Self::WeekendQuotaExceeded
            | Self::ImplausibleMeterReading => StatusCode::UNPROCESSABLE_ENTITY,

            // 400 Bad Request
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::ValueOutOfRange
            | Self::InvalidTimeRange
            | Self::InvalidMeterReading
            | Self::EmptyFile => StatusCode::BAD_REQUEST,

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 501 Not Implemented
            Self::Unsupported => StatusCode::NOT_IMPLEMENTED,

            // 503 Service Unavailable
            Self::SystemBusy | Self::NetworkError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::FileStorageFailed
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::StorageFull
            | Self::StorageCorrupted => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::ReservationNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::AircraftUnavailable.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::TripTooLong.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ErrorCode::InvalidMeterReading.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Unsupported.http_status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(
            ErrorCode::ConfigError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
