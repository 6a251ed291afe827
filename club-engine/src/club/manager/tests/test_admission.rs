use super::*;
use shared::error::{AppError, ErrorCode};

// ========================================================================
// 预订准入
// ========================================================================

#[test]
fn test_confirmed_reservation_is_persisted_and_indexed() {
    let manager = create_test_manager();
    let member = add_member(&manager, None);
    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);

    let reservation = manager
        .request_reservation_at(
            &booking(&member, &aircraft, at(2026, 3, 3, 9), at(2026, 3, 3, 12)),
            at(2026, 3, 1, 8),
        )
        .unwrap();
    assert_eq!(reservation.status, ReservationStatus::Confirmed);

    assert_eq!(manager.get_reservation(reservation.id).unwrap(), Some(reservation.clone()));
    assert_eq!(manager.member_reservations(member.id).unwrap().len(), 1);
    assert_eq!(manager.aircraft_reservations(aircraft.id).unwrap().len(), 1);

    // admission never touches aircraft or member
    assert_eq!(manager.get_aircraft(aircraft.id).unwrap(), Some(aircraft));
    assert_eq!(manager.get_member(member.id).unwrap(), Some(member));
}

#[test]
fn test_end_before_start_is_rejected() {
    let manager = create_test_manager();
    let member = add_member(&manager, None);
    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);

    let start = at(2026, 3, 3, 9);
    for end in [start, start - 1] {
        let err = manager
            .request_reservation_at(&booking(&member, &aircraft, start, end), at(2026, 3, 1, 8))
            .unwrap_err();
        assert!(matches!(err, ClubError::InvalidTimeRange));
    }
}

#[test]
fn test_only_active_members_may_book() {
    let manager = create_test_manager();
    let member = add_member(&manager, None);
    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);

    for status in [MemberStatus::PastDue, MemberStatus::Suspended, MemberStatus::Inactive] {
        manager
            .update_member(
                member.id,
                MemberUpdate {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .unwrap();
        let err = manager
            .request_reservation_at(
                &booking(&member, &aircraft, at(2026, 3, 3, 9), at(2026, 3, 3, 12)),
                at(2026, 3, 1, 8),
            )
            .unwrap_err();
        assert!(matches!(err, ClubError::MemberNotEligible { .. }), "{status:?}");
    }
}

#[test]
fn test_unknown_member_or_aircraft() {
    let manager = create_test_manager();
    let member = add_member(&manager, None);
    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);

    let mut req = booking(&member, &aircraft, at(2026, 3, 3, 9), at(2026, 3, 3, 12));
    req.aircraft_id = 42;
    let err = manager.request_reservation_at(&req, at(2026, 3, 1, 8)).unwrap_err();
    assert!(matches!(err, ClubError::NotFound { entity: "Aircraft", id: 42 }));

    req.aircraft_id = aircraft.id;
    req.member_id = 43;
    let err = manager.request_reservation_at(&req, at(2026, 3, 1, 8)).unwrap_err();
    assert!(matches!(err, ClubError::NotFound { entity: "Member", id: 43 }));
}

// ------------------------------------------------------------------------
// max_reservations = 1 with one upcoming CONFIRMED reservation
// ------------------------------------------------------------------------
#[test]
fn test_concurrency_cap_from_tier() {
    let manager = create_test_manager();
    let tier = add_tier(
        &manager,
        MembershipTierCreate {
            name: "Student".to_string(),
            monthly_dues: 50.0,
            max_reservations: Some(1),
            ..Default::default()
        },
    );
    let member = add_member(&manager, Some(tier.id));
    let c172 = add_aircraft(&manager, "N172SP", RateBasis::Wet);
    let pa28 = add_aircraft(&manager, "N28PA", RateBasis::Wet);
    let now = at(2026, 3, 1, 8);

    manager
        .request_reservation_at(&booking(&member, &c172, at(2026, 3, 3, 9), at(2026, 3, 3, 12)), now)
        .unwrap();
    let err = manager
        .request_reservation_at(&booking(&member, &pa28, at(2026, 3, 5, 9), at(2026, 3, 5, 12)), now)
        .unwrap_err();
    assert!(matches!(err, ClubError::TooManyActiveReservations { max: 1 }));
    assert_eq!(AppError::from(err).code, ErrorCode::TooManyActiveReservations);
}

#[test]
fn test_self_overlap_across_aircraft() {
    let manager = create_test_manager();
    let member = add_member(&manager, None);
    let c172 = add_aircraft(&manager, "N172SP", RateBasis::Wet);
    let pa28 = add_aircraft(&manager, "N28PA", RateBasis::Wet);
    let now = at(2026, 3, 1, 8);

    let first = manager
        .request_reservation_at(&booking(&member, &c172, at(2026, 3, 3, 9), at(2026, 3, 3, 12)), now)
        .unwrap();
    let err = manager
        .request_reservation_at(&booking(&member, &pa28, at(2026, 3, 3, 11), at(2026, 3, 3, 13)), now)
        .unwrap_err();
    assert!(matches!(err, ClubError::SelfOverlap { conflicting_id } if conflicting_id == first.id));

    // back-to-back is fine
    manager
        .request_reservation_at(&booking(&member, &pa28, at(2026, 3, 3, 12), at(2026, 3, 3, 14)), now)
        .unwrap();
}

#[test]
fn test_aircraft_overlap_and_cancel_frees_slot() {
    let manager = create_test_manager();
    let alice = add_member(&manager, None);
    let bob = add_member(&manager, None);
    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);
    let now = at(2026, 3, 1, 8);

    let first = manager
        .request_reservation_at(&booking(&alice, &aircraft, at(2026, 3, 3, 9), at(2026, 3, 3, 12)), now)
        .unwrap();
    let err = manager
        .request_reservation_at(&booking(&bob, &aircraft, at(2026, 3, 3, 8), at(2026, 3, 3, 10)), now)
        .unwrap_err();
    assert!(matches!(err, ClubError::AircraftUnavailable { conflicting_id } if conflicting_id == first.id));

    manager.cancel_reservation_at(first.id, now).unwrap();
    manager
        .request_reservation_at(&booking(&bob, &aircraft, at(2026, 3, 3, 8), at(2026, 3, 3, 10)), now)
        .unwrap();
}

#[test]
fn test_maintenance_booking_skips_member_policy_but_not_aircraft_overlap() {
    let manager = create_test_manager();
    let tier = add_tier(
        &manager,
        MembershipTierCreate {
            name: "Restricted".to_string(),
            booking_window_days: Some(1),
            max_trip_length_days: Some(1),
            ..Default::default()
        },
    );
    let mechanic = add_member(&manager, Some(tier.id));
    let pilot = add_member(&manager, None);
    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);
    let now = at(2026, 3, 1, 8);

    // a week-long annual, far beyond this tier's window and trip length
    let mut annual = booking(&mechanic, &aircraft, at(2026, 3, 20, 8), at(2026, 3, 27, 17));
    annual.reservation_type = ReservationType::Maintenance;
    manager.request_reservation_at(&annual, now).unwrap();

    let err = manager
        .request_reservation_at(&booking(&pilot, &aircraft, at(2026, 3, 22, 9), at(2026, 3, 22, 12)), now)
        .unwrap_err();
    assert!(matches!(err, ClubError::AircraftUnavailable { .. }));

    // same tier, FLIGHT type: policy applies
    let err = manager
        .request_reservation_at(&booking(&mechanic, &aircraft, at(2026, 3, 10, 9), at(2026, 3, 10, 12)), now)
        .unwrap_err();
    assert!(matches!(err, ClubError::OutsideBookingWindow { window_days: 1 }));
}

#[test]
fn test_policy_falls_back_tier_then_settings_then_defaults() {
    let manager = create_test_manager();
    let member = add_member(&manager, None);
    assert_eq!(manager.effective_policy(member.id).unwrap().max_trip_length_days, 3);

    manager
        .upsert_settings(ClubSettings {
            max_reservation_days: Some(5),
            ..club_settings(None)
        })
        .unwrap();
    assert_eq!(manager.effective_policy(member.id).unwrap().max_trip_length_days, 5);

    let tier = add_tier(
        &manager,
        MembershipTierCreate {
            name: "Legacy".to_string(),
            max_days_per_reservation: Some(2),
            ..Default::default()
        },
    );
    manager
        .update_member(
            member.id,
            MemberUpdate {
                tier_id: Some(Some(tier.id)),
                ..Default::default()
            },
        )
        .unwrap();
    let policy = manager.effective_policy(member.id).unwrap();
    assert_eq!(policy.max_trip_length_days, 2);
    assert_eq!(policy.booking_window_days, 90);

    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);
    let err = manager
        .request_reservation_at(
            &booking(&member, &aircraft, at(2026, 3, 3, 9), at(2026, 3, 5, 12)),
            at(2026, 3, 1, 8),
        )
        .unwrap_err();
    assert!(matches!(err, ClubError::TripTooLong { requested_days: 3, max_days: 2 }));
}

#[test]
fn test_rejected_request_writes_nothing() {
    let manager = create_test_manager();
    let member = add_member(&manager, None);
    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);

    let err = manager
        .request_reservation_at(
            &booking(&member, &aircraft, at(2026, 3, 3, 9), at(2026, 3, 9, 12)),
            at(2026, 3, 1, 8),
        )
        .unwrap_err();
    assert!(matches!(err, ClubError::TripTooLong { .. }));
    assert!(manager.member_reservations(member.id).unwrap().is_empty());
    assert!(manager.aircraft_reservations(aircraft.id).unwrap().is_empty());
}

#[test]
fn test_misconfigured_defaults_reject_the_request_only() {
    let defaults = PolicyDefaults {
        booking_window_days: 0,
        ..Default::default()
    };
    let manager = ClubManager::with_storage(
        ClubStorage::open_in_memory().unwrap(),
        TZ,
        defaults,
        TEST_METER_TOLERANCE,
    );
    let member = add_member(&manager, None);
    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);

    let err = manager
        .request_reservation_at(
            &booking(&member, &aircraft, at(2026, 3, 3, 9), at(2026, 3, 3, 12)),
            at(2026, 3, 1, 8),
        )
        .unwrap_err();
    assert!(matches!(err, ClubError::Configuration(_)));

    // MAINTENANCE never resolves policy
    let mut req = booking(&member, &aircraft, at(2026, 3, 3, 9), at(2026, 3, 3, 12));
    req.reservation_type = ReservationType::Maintenance;
    manager.request_reservation_at(&req, at(2026, 3, 1, 8)).unwrap();
}

#[test]
fn test_settings_with_zero_limits_are_rejected() {
    let manager = create_test_manager();
    for settings in [
        ClubSettings {
            booking_window_days: Some(0),
            ..club_settings(None)
        },
        ClubSettings {
            max_reservation_days: Some(0),
            ..club_settings(None)
        },
        ClubSettings {
            max_reservations_per_user: Some(0),
            ..club_settings(None)
        },
        club_settings(Some(-1.0)),
        club_settings(Some(f64::NAN)),
    ] {
        let err = manager.upsert_settings(settings).unwrap_err();
        assert!(matches!(err, ClubError::Validation(_)));
    }
    assert!(manager.get_settings().unwrap().is_none());

    // bookings keep working on the built-in policy
    let member = add_member(&manager, None);
    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);
    manager
        .request_reservation_at(
            &booking(&member, &aircraft, at(2026, 3, 3, 9), at(2026, 3, 3, 12)),
            at(2026, 3, 1, 8),
        )
        .unwrap();
}

#[test]
fn test_confirmed_event_is_broadcast() {
    let manager = create_test_manager();
    let mut rx = manager.subscribe();
    let member = add_member(&manager, None);
    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);

    let reservation = manager
        .request_reservation_at(
            &booking(&member, &aircraft, at(2026, 3, 3, 9), at(2026, 3, 3, 12)),
            at(2026, 3, 1, 8),
        )
        .unwrap();
    match rx.try_recv().unwrap() {
        ClubEvent::ReservationConfirmed { reservation: r } => assert_eq!(r, reservation),
        other => panic!("unexpected event {other:?}"),
    }
}
