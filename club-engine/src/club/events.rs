//! Club events, broadcast after a successful commit

use serde::{Deserialize, Serialize};
use shared::models::{AircraftStatus, Reservation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClubEvent {
    ReservationConfirmed {
        reservation: Reservation,
    },
    ReservationCancelled {
        reservation_id: i64,
        member_id: i64,
        late: bool,
    },
    FlightCheckedIn {
        reservation_id: i64,
        aircraft_id: i64,
        flight_log_id: i64,
    },
    FlightCheckedOut {
        reservation_id: i64,
        aircraft_id: i64,
        invoice_id: i64,
        net_amount: f64,
    },
    SquawkOpened {
        flight_log_id: i64,
        aircraft_id: i64,
    },
    SquawkResolved {
        flight_log_id: i64,
        maintenance_log_id: i64,
    },
    InvoiceIssued {
        invoice_id: i64,
        member_id: i64,
        amount: f64,
    },
    InvoicePaid {
        invoice_id: i64,
        member_id: i64,
    },
    AircraftStatusChanged {
        aircraft_id: i64,
        status: AircraftStatus,
    },
    FuelPricesUpdated {
        home_airport: String,
    },
}
