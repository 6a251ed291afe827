use super::*;
use chrono::TimeZone;
use shared::models::{FuelType, MemberStatus, RateBasis, ReservationStatus, ReservationType};

const TZ: Tz = chrono_tz::America::Los_Angeles;

/// Check-in meters may read up to 0.1 h below the aircraft
const TEST_METER_TOLERANCE: f64 = 0.1;

fn create_test_manager() -> ClubManager {
    let storage = ClubStorage::open_in_memory().unwrap();
    ClubManager::with_storage(storage, TZ, PolicyDefaults::default(), TEST_METER_TOLERANCE)
}

/// Local wall-clock time in the club time zone (Unix millis)
fn at(y: i32, m: u32, d: u32, h: u32) -> i64 {
    TZ.with_ymd_and_hms(y, m, d, h, 0, 0)
        .single()
        .unwrap()
        .timestamp_millis()
}

fn add_member(manager: &ClubManager, tier_id: Option<i64>) -> Member {
    manager
        .create_member(MemberCreate {
            name: "Amelia Pilot".to_string(),
            email: format!("pilot{}@example.com", shared::util::snowflake_id()),
            tier_id,
            ..Default::default()
        })
        .unwrap()
}

fn add_aircraft(manager: &ClubManager, registration: &str, rate_basis: RateBasis) -> Aircraft {
    manager
        .create_aircraft(AircraftCreate {
            registration: registration.to_string(),
            make: "Cessna".to_string(),
            model: "172S".to_string(),
            year: 2004,
            hourly_rate: 150.0,
            rate_basis,
            fuel_type: FuelType::Avgas100ll,
            current_hobbs: 100.0,
            current_tach: 80.0,
            next_annual: None,
            next_oil_change: None,
        })
        .unwrap()
}

fn add_tier(manager: &ClubManager, data: MembershipTierCreate) -> MembershipTier {
    manager.create_tier(data).unwrap()
}

fn club_settings(fuel_price_100ll: Option<f64>) -> ClubSettings {
    ClubSettings {
        name: "Skyline Flyers".to_string(),
        home_airport: "kpao".to_string(),
        currency: "USD".to_string(),
        monthly_dues: 100.0,
        fuel_price_100ll,
        ..Default::default()
    }
}

fn booking(member: &Member, aircraft: &Aircraft, start: i64, end: i64) -> ReservationRequest {
    ReservationRequest {
        member_id: member.id,
        aircraft_id: aircraft.id,
        start_time: start,
        end_time: end,
        reservation_type: ReservationType::Flight,
        notes: None,
    }
}

fn check_in_req(reservation_id: i64, hobbs: f64, tach: f64) -> CheckInRequest {
    CheckInRequest {
        reservation_id,
        hobbs_start: hobbs,
        tach_start: tach,
        start_hobbs_photo_url: None,
    }
}

fn check_out_req(reservation_id: i64, hobbs: f64, tach: f64, fuel_gallons: f64) -> CheckOutRequest {
    CheckOutRequest {
        reservation_id,
        hobbs_end: hobbs,
        tach_end: tach,
        fuel_gallons,
        fuel_cost: 0.0,
        notes: None,
        end_hobbs_photo_url: None,
        fuel_receipt_url: None,
    }
}

/// Book, check in and check out one flight on March `day` (tach = hobbs - 20)
fn fly(
    manager: &ClubManager,
    member: &Member,
    aircraft: &Aircraft,
    day: u32,
    hobbs: (f64, f64),
    fuel_gallons: f64,
) -> CheckOutResult {
    let start = at(2026, 3, day, 9);
    let end = at(2026, 3, day, 12);
    let reservation = manager
        .request_reservation_at(&booking(member, aircraft, start, end), at(2026, 3, 1, 8))
        .unwrap();
    manager
        .check_in_at(&check_in_req(reservation.id, hobbs.0, hobbs.0 - 20.0), start)
        .unwrap();
    manager
        .check_out_at(
            &check_out_req(reservation.id, hobbs.1, hobbs.1 - 20.0, fuel_gallons),
            end,
        )
        .unwrap()
}

mod test_admission;
mod test_maintenance;
