//! Reservation admission
//!
//! ```text
//! request_reservation(req)
//!     ├─ 0. end > start
//!     ├─ 1. member ACTIVE
//!     ├─ 2. resolve policy (non-MAINTENANCE only)
//!     ├─ 3. member rules in order, first failure wins
//!     ├─ 4. aircraft overlap (every type)
//!     └─ 5. persist CONFIRMED
//! ```
//!
//! Runs inside the caller's write transaction, so the overlap scan and the
//! insert see the same snapshot.

use super::rules::{AdmissionCheck, AdmissionInput, rules_for};
use crate::club::{ClubContext, ClubError, ClubResult};
use crate::policy::{PolicyDefaults, resolve_policy};
use shared::models::{
    Aircraft, Member, MemberStatus, MembershipTier, Reservation, ReservationRequest,
    ReservationStatus,
};

pub fn request_reservation(
    ctx: &ClubContext<'_>,
    defaults: &PolicyDefaults,
    req: &ReservationRequest,
) -> ClubResult<Reservation> {
    if req.end_time <= req.start_time {
        return Err(ClubError::InvalidTimeRange);
    }

    let member: Member = ctx.load(req.member_id)?;
    if member.status != MemberStatus::Active {
        return Err(ClubError::MemberNotEligible {
            member_id: member.id,
            status: format!("{:?}", member.status),
        });
    }
    let _aircraft: Aircraft = ctx.load(req.aircraft_id)?;

    let rules = rules_for(req.reservation_type);
    if !rules.is_empty() {
        let tier = match member.tier_id {
            Some(tier_id) => ctx.find::<MembershipTier>(tier_id)?,
            None => None,
        };
        if tier.is_none() && member.tier_id.is_some() {
            tracing::warn!(
                member_id = member.id,
                tier_id = ?member.tier_id,
                "Member references a missing tier, using club defaults"
            );
        }
        let settings = ctx.settings()?;
        let policy = resolve_policy(tier.as_ref(), settings.as_ref(), defaults)?;
        let mine = ctx.storage.member_reservations(ctx.txn, member.id)?;

        let input = AdmissionInput {
            request: req,
            policy: &policy,
            member_reservations: &mine,
            now: ctx.now,
            tz: ctx.tz,
        };
        for rule in &rules {
            rule.check(&input)?;
        }
    }

    check_aircraft_free(ctx, req.aircraft_id, req.start_time, req.end_time)?;

    let reservation = Reservation {
        id: shared::util::snowflake_id(),
        member_id: req.member_id,
        aircraft_id: req.aircraft_id,
        start_time: req.start_time,
        end_time: req.end_time,
        reservation_type: req.reservation_type,
        status: ReservationStatus::Confirmed,
        notes: req.notes.clone(),
        check_in_time: None,
        check_out_time: None,
        cancelled_at: None,
        created_at: ctx.now,
        updated_at: ctx.now,
    };
    ctx.storage.insert_reservation(ctx.txn, &reservation)?;

    tracing::info!(
        reservation_id = reservation.id,
        member_id = reservation.member_id,
        aircraft_id = reservation.aircraft_id,
        reservation_type = ?reservation.reservation_type,
        "Reservation confirmed"
    );
    Ok(reservation)
}

/// No non-cancelled reservation on the aircraft may overlap `[start, end)`
fn check_aircraft_free(ctx: &ClubContext<'_>, aircraft_id: i64, start: i64, end: i64) -> ClubResult<()> {
    let candidates = ctx
        .storage
        .aircraft_reservations_starting_before(ctx.txn, aircraft_id, end)?;
    match candidates
        .iter()
        .find(|r| r.status.occupies_slot() && r.end_time > start)
    {
        Some(conflict) => Err(ClubError::AircraftUnavailable {
            conflicting_id: conflict.id,
        }),
        None => Ok(()),
    }
}
