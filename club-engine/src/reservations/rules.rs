//! Admission rules
//!
//! Each rule is a pure check over an [`AdmissionInput`]. Reservation types
//! map to an ordered rule list in [`rules_for`], the only place that
//! matches on `ReservationType`.

use crate::club::{ClubError, ClubResult};
use crate::policy::EffectivePolicy;
use crate::utils::time::{MILLIS_PER_DAY, day_span, local_date, weekend_days, weekend_days_in_year};
use chrono::Datelike;
use chrono_tz::Tz;
use enum_dispatch::enum_dispatch;
use shared::models::{Reservation, ReservationRequest, ReservationStatus, ReservationType};

/// Everything a rule may look at
pub struct AdmissionInput<'a> {
    pub request: &'a ReservationRequest,
    pub policy: &'a EffectivePolicy,
    /// All of the member's reservations, any status
    pub member_reservations: &'a [Reservation],
    pub now: i64,
    pub tz: Tz,
}

#[enum_dispatch]
pub trait AdmissionCheck {
    fn check(&self, input: &AdmissionInput<'_>) -> ClubResult<()>;
}

#[enum_dispatch(AdmissionCheck)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionRule {
    SelfOverlap(SelfOverlapRule),
    BookingWindow(BookingWindowRule),
    TripLength(TripLengthRule),
    ConcurrencyCap(ConcurrencyCapRule),
    WeekendQuota(WeekendQuotaRule),
}

/// Ordered member-policy rules for a reservation type
///
/// MAINTENANCE bookings skip member policy; aircraft overlap is checked by
/// the controller for every type.
pub fn rules_for(reservation_type: ReservationType) -> Vec<AdmissionRule> {
    match reservation_type {
        ReservationType::Maintenance => Vec::new(),
        ReservationType::Flight | ReservationType::Instruction | ReservationType::GroundSchool => {
            vec![
                SelfOverlapRule.into(),
                BookingWindowRule.into(),
                TripLengthRule.into(),
                ConcurrencyCapRule.into(),
                WeekendQuotaRule.into(),
            ]
        }
    }
}

/// Member cannot hold two non-cancelled reservations at the same instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfOverlapRule;

impl AdmissionCheck for SelfOverlapRule {
    fn check(&self, input: &AdmissionInput<'_>) -> ClubResult<()> {
        let req = input.request;
        match input
            .member_reservations
            .iter()
            .find(|r| r.status.occupies_slot() && r.overlaps(req.start_time, req.end_time))
        {
            Some(conflict) => Err(ClubError::SelfOverlap {
                conflicting_id: conflict.id,
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindowRule;

impl AdmissionCheck for BookingWindowRule {
    fn check(&self, input: &AdmissionInput<'_>) -> ClubResult<()> {
        let window_days = input.policy.booking_window_days;
        let horizon = input.now + i64::from(window_days) * MILLIS_PER_DAY;
        if input.request.end_time > horizon {
            return Err(ClubError::OutsideBookingWindow { window_days });
        }
        Ok(())
    }
}

/// Inclusive calendar-day span in the club time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripLengthRule;

impl AdmissionCheck for TripLengthRule {
    fn check(&self, input: &AdmissionInput<'_>) -> ClubResult<()> {
        let req = input.request;
        let requested_days = day_span(req.start_time, req.end_time, input.tz);
        let max_days = input.policy.max_trip_length_days;
        if requested_days > max_days {
            return Err(ClubError::TripTooLong {
                requested_days,
                max_days,
            });
        }
        Ok(())
    }
}

/// Upcoming CONFIRMED / CHECKED_OUT reservations count against the cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyCapRule;

impl AdmissionCheck for ConcurrencyCapRule {
    fn check(&self, input: &AdmissionInput<'_>) -> ClubResult<()> {
        let active = input
            .member_reservations
            .iter()
            .filter(|r| r.status.is_active() && r.end_time > input.now)
            .count();
        let max = input.policy.max_reservations;
        if active >= max as usize {
            return Err(ClubError::TooManyActiveReservations { max });
        }
        Ok(())
    }
}

/// Annual weekend-day cap, only when the tier defines one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekendQuotaRule;

impl AdmissionCheck for WeekendQuotaRule {
    fn check(&self, input: &AdmissionInput<'_>) -> ClubResult<()> {
        let Some(quota) = input.policy.max_weekend_days_per_year else {
            return Ok(());
        };
        let year = local_date(input.now, input.tz).year();
        let used: u32 = input
            .member_reservations
            .iter()
            .filter(|r| r.status == ReservationStatus::Completed)
            .map(|r| weekend_days_in_year(r.start_time, r.end_time, year, input.tz))
            .sum();
        let req = input.request;
        let requested = weekend_days(req.start_time, req.end_time, input.tz);
        if used + requested > quota {
            return Err(ClubError::WeekendQuotaExceeded {
                used,
                requested,
                quota,
            });
        }
        Ok(())
    }
}
