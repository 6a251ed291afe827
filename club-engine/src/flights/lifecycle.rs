//! Flight lifecycle
//!
//! ```text
//! CONFIRMED ──check_in──▶ CHECKED_OUT ──check_out──▶ COMPLETED
//!     │
//!     └──cancel──▶ CANCELLED
//! ```
//!
//! Every transition loads the reservation inside the write transaction and
//! requires an expected status before writing, so a stale caller fails with
//! `InvalidTransition` instead of overwriting.

use crate::billing::calculator::{ChargeInput, FlightCharge, calculate_flight_charge};
use crate::billing::money::{to_decimal, to_f64};
use crate::club::{ClubContext, ClubError, ClubResult};
use crate::policy::{PolicyDefaults, resolve_policy};
use crate::utils::time::local_date;
use chrono::Days;
use serde::{Deserialize, Serialize};
use shared::models::{
    Aircraft, AircraftStatus, AuditAction, CheckInRequest, CheckOutRequest, FlightLog, Invoice,
    InvoiceItem, InvoiceSource, InvoiceStatus, Member, MembershipTier, Reservation,
    ReservationStatus, SquawkState,
};

/// Days until a checkout invoice is due
pub const CHECKOUT_INVOICE_DUE_DAYS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutResult {
    pub reservation: Reservation,
    pub flight_log: FlightLog,
    pub invoice: Invoice,
    pub charge: FlightCharge,
}

fn require_reading(name: &str, value: f64) -> ClubResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ClubError::InvalidMeterReading(format!(
            "{name} must be a finite, non-negative number (got {value})"
        )));
    }
    Ok(())
}

fn expect_status(reservation: &Reservation, expected: ReservationStatus, action: &str) -> ClubResult<()> {
    if reservation.status != expected {
        return Err(ClubError::InvalidTransition(format!(
            "cannot {action} reservation {} in status {:?}",
            reservation.id, reservation.status
        )));
    }
    Ok(())
}

/// Dispatch an aircraft against a CONFIRMED reservation
pub fn check_in(ctx: &ClubContext<'_>, meter_tolerance: f64, req: &CheckInRequest) -> ClubResult<FlightLog> {
    require_reading("hobbs_start", req.hobbs_start)?;
    require_reading("tach_start", req.tach_start)?;

    let mut reservation: Reservation = ctx.load(req.reservation_id)?;
    expect_status(&reservation, ReservationStatus::Confirmed, "check in")?;

    let mut aircraft: Aircraft = ctx.load(reservation.aircraft_id)?;
    if aircraft.status == AircraftStatus::InUse
        || ctx.storage.open_flight(ctx.txn, aircraft.id)?.is_some()
    {
        return Err(ClubError::InvalidTransition(format!(
            "aircraft {} is already flying",
            aircraft.registration
        )));
    }
    if matches!(aircraft.status, AircraftStatus::Maintenance | AircraftStatus::Grounded) {
        return Err(ClubError::AircraftGrounded {
            status: format!("{:?}", aircraft.status),
        });
    }

    // 仪表读数只能小幅回退 (读数误差)
    if req.hobbs_start < aircraft.current_hobbs - meter_tolerance {
        return Err(ClubError::ImplausibleMeterReading {
            meter: "hobbs",
            reading: req.hobbs_start,
            current: aircraft.current_hobbs,
        });
    }
    if req.tach_start < aircraft.current_tach - meter_tolerance {
        return Err(ClubError::ImplausibleMeterReading {
            meter: "tach",
            reading: req.tach_start,
            current: aircraft.current_tach,
        });
    }

    let log = FlightLog {
        id: shared::util::snowflake_id(),
        reservation_id: reservation.id,
        aircraft_id: aircraft.id,
        member_id: reservation.member_id,
        hobbs_start: req.hobbs_start,
        tach_start: req.tach_start,
        hobbs_end: None,
        tach_end: None,
        flight_time: None,
        cost: None,
        fuel_gallons: None,
        fuel_cost: None,
        fuel_reimbursement: None,
        notes: None,
        squawk: SquawkState::None,
        start_hobbs_photo_url: req.start_hobbs_photo_url.clone(),
        end_hobbs_photo_url: None,
        fuel_receipt_url: None,
        created_at: ctx.now,
        updated_at: ctx.now,
    };
    ctx.storage.insert_flight_log(ctx.txn, &log)?;

    reservation.status = ReservationStatus::CheckedOut;
    reservation.check_in_time = Some(ctx.now);
    reservation.updated_at = ctx.now;
    ctx.save(&reservation)?;

    aircraft.status = AircraftStatus::InUse;
    aircraft.updated_at = ctx.now;
    ctx.save(&aircraft)?;
    ctx.storage.set_open_flight(ctx.txn, aircraft.id, reservation.id)?;

    tracing::info!(
        reservation_id = reservation.id,
        aircraft_id = aircraft.id,
        flight_log_id = log.id,
        hobbs_start = req.hobbs_start,
        "Aircraft checked in"
    );
    Ok(log)
}

/// Close the open flight, bill it, and release the aircraft
pub fn check_out(
    ctx: &ClubContext<'_>,
    defaults: &PolicyDefaults,
    req: &CheckOutRequest,
) -> ClubResult<CheckOutResult> {
    let mut reservation: Reservation = ctx.load(req.reservation_id)?;
    expect_status(&reservation, ReservationStatus::CheckedOut, "check out")?;

    let mut log = ctx
        .storage
        .flight_log_for_reservation(ctx.txn, reservation.id)?
        .filter(FlightLog::is_open)
        .ok_or_else(|| {
            ClubError::InvalidTransition(format!(
                "reservation {} has no open flight log",
                reservation.id
            ))
        })?;

    require_reading("hobbs_end", req.hobbs_end)?;
    require_reading("tach_end", req.tach_end)?;
    if req.hobbs_end < log.hobbs_start {
        return Err(ClubError::InvalidMeterReading(format!(
            "hobbs_end {} is before hobbs_start {}",
            req.hobbs_end, log.hobbs_start
        )));
    }
    if req.tach_end < log.tach_start {
        return Err(ClubError::InvalidMeterReading(format!(
            "tach_end {} is before tach_start {}",
            req.tach_end, log.tach_start
        )));
    }
    if !req.fuel_gallons.is_finite() || req.fuel_gallons < 0.0 {
        return Err(ClubError::InvalidMeterReading(format!(
            "fuel_gallons must be a finite, non-negative number (got {})",
            req.fuel_gallons
        )));
    }
    if !req.fuel_cost.is_finite() || req.fuel_cost < 0.0 {
        return Err(ClubError::InvalidMeterReading(format!(
            "fuel_cost must be a finite, non-negative number (got {})",
            req.fuel_cost
        )));
    }

    let mut aircraft: Aircraft = ctx.load(reservation.aircraft_id)?;
    let mut member: Member = ctx.load(reservation.member_id)?;
    let tier = match member.tier_id {
        Some(tier_id) => ctx.find::<MembershipTier>(tier_id)?,
        None => None,
    };
    let settings = ctx.settings()?;
    let policy = resolve_policy(tier.as_ref(), settings.as_ref(), defaults)?;

    let charge = calculate_flight_charge(&ChargeInput {
        hourly_rate: aircraft.hourly_rate,
        discount_pct: policy.hourly_rate_discount,
        rate_basis: aircraft.rate_basis,
        hobbs_start: log.hobbs_start,
        hobbs_end: req.hobbs_end,
        fuel_gallons: req.fuel_gallons,
        home_fuel_price: settings.as_ref().and_then(|s| s.fuel_price(aircraft.fuel_type)),
    });

    // 1. Flight log
    let notes = req
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let squawk_opened = notes.is_some();
    log.hobbs_end = Some(req.hobbs_end);
    log.tach_end = Some(req.tach_end);
    log.flight_time = Some(charge.flight_time);
    log.cost = Some(charge.flight_cost);
    log.fuel_gallons = Some(req.fuel_gallons);
    log.fuel_cost = Some(req.fuel_cost);
    log.fuel_reimbursement = Some(charge.fuel_reimbursement);
    if squawk_opened {
        log.squawk = SquawkState::Open;
    }
    log.notes = notes;
    log.end_hobbs_photo_url = req.end_hobbs_photo_url.clone();
    log.fuel_receipt_url = req.fuel_receipt_url.clone();
    log.updated_at = ctx.now;
    ctx.save(&log)?;

    // 2. Aircraft: meters never move backwards
    aircraft.current_hobbs = aircraft.current_hobbs.max(req.hobbs_end);
    aircraft.current_tach = aircraft.current_tach.max(req.tach_end);
    aircraft.status = AircraftStatus::Available;
    aircraft.updated_at = ctx.now;
    ctx.save(&aircraft)?;
    ctx.storage.clear_open_flight(ctx.txn, aircraft.id)?;

    // 3. Reservation
    reservation.status = ReservationStatus::Completed;
    reservation.check_out_time = Some(ctx.now);
    reservation.updated_at = ctx.now;
    ctx.save(&reservation)?;

    // 4. Invoice
    let mut items = vec![InvoiceItem {
        description: format!("Flight time {}", aircraft.registration),
        quantity: charge.flight_time,
        unit_price: charge.effective_rate,
        amount: charge.flight_cost,
    }];
    if charge.fuel_reimbursement != 0.0 {
        let unit_price = settings
            .as_ref()
            .and_then(|s| s.fuel_price(aircraft.fuel_type))
            .unwrap_or_default();
        items.push(InvoiceItem {
            description: "Fuel reimbursement".to_string(),
            quantity: req.fuel_gallons,
            unit_price: -unit_price,
            amount: -charge.fuel_reimbursement,
        });
    }
    let today = local_date(ctx.now, ctx.tz);
    let invoice = Invoice {
        id: shared::util::snowflake_id(),
        member_id: member.id,
        amount: charge.net_amount,
        status: InvoiceStatus::Draft,
        due_date: today
            .checked_add_days(Days::new(CHECKOUT_INVOICE_DUE_DAYS))
            .unwrap_or(today),
        description: format!("Flight in {}", aircraft.registration),
        items,
        source: InvoiceSource::FlightCheckout {
            reservation_id: reservation.id,
            flight_log_id: log.id,
        },
        paid_at: None,
        created_at: ctx.now,
        updated_at: ctx.now,
    };
    ctx.storage.insert_invoice(ctx.txn, &invoice)?;

    // 5. Member balance (positive = owed)
    member.balance = to_f64(to_decimal(member.balance) + to_decimal(charge.net_amount));
    member.updated_at = ctx.now;
    ctx.save(&member)?;

    tracing::info!(
        reservation_id = reservation.id,
        aircraft_id = aircraft.id,
        flight_time = charge.flight_time,
        net_amount = charge.net_amount,
        invoice_id = invoice.id,
        squawk = squawk_opened,
        "Aircraft checked out"
    );

    Ok(CheckOutResult {
        reservation,
        flight_log: log,
        invoice,
        charge,
    })
}

/// Cancel a CONFIRMED reservation. Returns the reservation and whether the
/// cancellation came after its start time.
pub fn cancel(ctx: &ClubContext<'_>, reservation_id: i64) -> ClubResult<(Reservation, bool)> {
    let mut reservation: Reservation = ctx.load(reservation_id)?;
    match reservation.status {
        ReservationStatus::Confirmed => {}
        ReservationStatus::CheckedOut => {
            return Err(ClubError::Unsupported(format!(
                "reservation {} is in flight; check it out instead of cancelling",
                reservation.id
            )));
        }
        _ => expect_status(&reservation, ReservationStatus::Confirmed, "cancel")?,
    }

    reservation.status = ReservationStatus::Cancelled;
    reservation.cancelled_at = Some(ctx.now);
    reservation.updated_at = ctx.now;
    ctx.save(&reservation)?;

    let late = ctx.now >= reservation.start_time;
    if late {
        ctx.audit(
            AuditAction::LateCancellation,
            "reservation",
            reservation.id,
            Some(reservation.member_id),
            serde_json::json!({
                "aircraft_id": reservation.aircraft_id,
                "start_time": reservation.start_time,
                "cancelled_at": ctx.now,
            }),
        )?;
    }

    tracing::info!(
        reservation_id = reservation.id,
        member_id = reservation.member_id,
        late,
        "Reservation cancelled"
    );
    Ok((reservation, late))
}
