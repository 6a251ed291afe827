use super::*;
use chrono::NaiveDate;
use shared::models::{AuditAction, MaintenanceDue, MaintenanceType};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn aircraft_at(manager: &ClubManager, registration: &str, hobbs: f64, tach: f64) -> Aircraft {
    manager
        .create_aircraft(AircraftCreate {
            registration: registration.to_string(),
            make: "Piper".to_string(),
            model: "PA-28-181".to_string(),
            year: 1998,
            hourly_rate: 140.0,
            current_hobbs: hobbs,
            current_tach: tach,
            ..Default::default()
        })
        .unwrap()
}

fn hundred_hour(aircraft_id: i64, last_hours: f64) -> MaintenanceScheduleCreate {
    MaintenanceScheduleCreate {
        aircraft_id,
        name: "100-hour inspection".to_string(),
        interval_hours: Some(50.0),
        last_performed_hours: Some(last_hours),
        ..Default::default()
    }
}

fn log_entry(aircraft_id: i64, maintenance_type: MaintenanceType, on: NaiveDate) -> MaintenanceLogCreate {
    MaintenanceLogCreate {
        aircraft_id,
        title: format!("{maintenance_type:?}"),
        description: "Performed per checklist".to_string(),
        date: on,
        maintenance_type,
        cost: Some(450.0),
        performed_by: "Bay Area Aviation".to_string(),
        schedule_ids: Vec::new(),
    }
}

// ========================================================================
// 维护状态
// ========================================================================

#[test]
fn test_two_hours_remaining_is_warning() {
    let manager = create_test_manager();
    let aircraft = aircraft_at(&manager, "N28PA", 2148.0, 1900.0);
    let schedule = manager.create_schedule(hundred_hour(aircraft.id, 2100.0)).unwrap();

    let status = manager
        .maintenance_status_at(aircraft.id, at(2026, 3, 1, 8))
        .unwrap();
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].schedule_id, schedule.id);
    assert_eq!(status[0].hours_remaining, Some(2.0));
    assert_eq!(status[0].days_remaining, None);
    assert_eq!(status[0].status, MaintenanceDue::Warning);
}

#[test]
fn test_calendar_and_hours_take_the_worse_status() {
    let manager = create_test_manager();
    let aircraft = aircraft_at(&manager, "N28PA", 2110.0, 1900.0);
    manager
        .create_schedule(MaintenanceScheduleCreate {
            interval_months: Some(12),
            last_performed: Some(date(2025, 2, 27)),
            ..hundred_hour(aircraft.id, 2100.0)
        })
        .unwrap();

    // 40 h left but the annual lapsed yesterday
    let status = manager
        .maintenance_status_at(aircraft.id, at(2026, 2, 28, 8))
        .unwrap();
    assert_eq!(status[0].hours_remaining, Some(40.0));
    assert_eq!(status[0].days_remaining, Some(-1));
    assert_eq!(status[0].status, MaintenanceDue::Overdue);
}

#[test]
fn test_status_of_unknown_aircraft() {
    let manager = create_test_manager();
    let err = manager.get_maintenance_status(99).unwrap_err();
    assert!(matches!(err, ClubError::NotFound { entity: "Aircraft", id: 99 }));

    // known aircraft without schedules is simply empty
    let aircraft = aircraft_at(&manager, "N28PA", 100.0, 80.0);
    assert!(manager.get_maintenance_status(aircraft.id).unwrap().is_empty());
}

#[test]
fn test_schedule_validation() {
    let manager = create_test_manager();
    let aircraft = aircraft_at(&manager, "N28PA", 100.0, 80.0);

    let err = manager
        .create_schedule(MaintenanceScheduleCreate {
            name: "  ".to_string(),
            ..hundred_hour(aircraft.id, 50.0)
        })
        .unwrap_err();
    assert!(matches!(err, ClubError::Validation(_)));

    let err = manager
        .create_schedule(MaintenanceScheduleCreate {
            interval_hours: Some(-10.0),
            ..hundred_hour(aircraft.id, 50.0)
        })
        .unwrap_err();
    assert!(matches!(err, ClubError::Validation(_)));

    let err = manager.create_schedule(hundred_hour(12345, 50.0)).unwrap_err();
    assert!(matches!(err, ClubError::NotFound { entity: "Aircraft", .. }));
}

#[test]
fn test_fleet_overview_reports_worst_status_per_aircraft() {
    let manager = create_test_manager();
    let healthy = aircraft_at(&manager, "N28PA", 2110.0, 1900.0);
    let due_soon = aircraft_at(&manager, "N172SP", 2148.0, 1900.0);
    let overdue = aircraft_at(&manager, "N182RG", 2160.0, 1900.0);
    for aircraft in [&healthy, &due_soon, &overdue] {
        manager.create_schedule(hundred_hour(aircraft.id, 2100.0)).unwrap();
    }
    // a second, healthy schedule does not mask the overdue one
    manager
        .create_schedule(MaintenanceScheduleCreate {
            name: "Oil change".to_string(),
            ..hundred_hour(overdue.id, 2150.0)
        })
        .unwrap();

    let overview = manager.fleet_maintenance_overview_at(at(2026, 3, 1, 8)).unwrap();
    let status_of = |id: i64| {
        overview
            .iter()
            .find(|s| s.aircraft_id == id)
            .map(|s| s.status)
            .unwrap()
    };
    assert_eq!(overview.len(), 3);
    assert_eq!(status_of(healthy.id), MaintenanceDue::Ok);
    assert_eq!(status_of(due_soon.id), MaintenanceDue::Warning);
    assert_eq!(status_of(overdue.id), MaintenanceDue::Overdue);
}

#[test]
fn test_flying_moves_maintenance_clock() {
    let manager = create_test_manager();
    let member = add_member(&manager, None);
    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);
    manager.create_schedule(hundred_hour(aircraft.id, 60.0)).unwrap();

    let before = manager.maintenance_status_at(aircraft.id, at(2026, 3, 1, 8)).unwrap();
    assert_eq!(before[0].hours_remaining, Some(10.0));
    assert_eq!(before[0].status, MaintenanceDue::Ok);

    fly(&manager, &member, &aircraft, 3, (100.0, 106.5), 0.0);
    let after = manager.maintenance_status_at(aircraft.id, at(2026, 3, 4, 8)).unwrap();
    assert_eq!(after[0].hours_remaining, Some(3.5));
    assert_eq!(after[0].status, MaintenanceDue::Warning);
}

// ========================================================================
// 维护记录
// ========================================================================

#[test]
fn test_record_maintenance_resets_linked_schedules() {
    let manager = create_test_manager();
    let aircraft = aircraft_at(&manager, "N28PA", 2160.0, 1900.0);
    let schedule = manager.create_schedule(hundred_hour(aircraft.id, 2100.0)).unwrap();
    let other = manager
        .create_schedule(MaintenanceScheduleCreate {
            aircraft_id: aircraft.id,
            name: "ELT battery".to_string(),
            interval_months: Some(24),
            last_performed: Some(date(2025, 1, 10)),
            ..Default::default()
        })
        .unwrap();

    let mut entry = log_entry(aircraft.id, MaintenanceType::OneHundredHour, date(2026, 3, 2));
    entry.schedule_ids = vec![schedule.id];
    let log = manager.record_maintenance(entry).unwrap();
    assert_eq!(log.schedule_ids, vec![schedule.id]);

    let status = manager.maintenance_status_at(aircraft.id, at(2026, 3, 2, 12)).unwrap();
    let hundred = status.iter().find(|s| s.schedule_id == schedule.id).unwrap();
    assert_eq!(hundred.hours_remaining, Some(50.0));
    assert_eq!(hundred.status, MaintenanceDue::Ok);
    // unlinked schedule untouched
    let elt = status.iter().find(|s| s.schedule_id == other.id).unwrap();
    assert_eq!(elt.days_remaining, Some(314));

    let logs = manager.maintenance_logs(aircraft.id).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].id, log.id);
}

#[test]
fn test_schedule_of_another_aircraft_is_rejected() {
    let manager = create_test_manager();
    let mine = aircraft_at(&manager, "N28PA", 100.0, 80.0);
    let theirs = aircraft_at(&manager, "N172SP", 100.0, 80.0);
    let schedule = manager.create_schedule(hundred_hour(theirs.id, 90.0)).unwrap();

    let mut entry = log_entry(mine.id, MaintenanceType::OneHundredHour, date(2026, 3, 2));
    entry.schedule_ids = vec![schedule.id];
    let err = manager.record_maintenance(entry).unwrap_err();
    assert!(matches!(err, ClubError::Validation(_)));
    assert!(manager.maintenance_logs(mine.id).unwrap().is_empty());
}

#[test]
fn test_annual_and_oil_change_advance_aircraft_due_items() {
    let manager = create_test_manager();
    let aircraft = aircraft_at(&manager, "N28PA", 2160.0, 1900.0);

    manager
        .record_maintenance(log_entry(aircraft.id, MaintenanceType::Annual, date(2026, 2, 28)))
        .unwrap();
    manager
        .record_maintenance(log_entry(aircraft.id, MaintenanceType::OilChange, date(2026, 3, 2)))
        .unwrap();

    let aircraft = manager.get_aircraft(aircraft.id).unwrap().unwrap();
    assert_eq!(aircraft.next_annual, Some(date(2027, 2, 28)));
    assert_eq!(aircraft.next_oil_change, Some(1950.0));
    assert_eq!(manager.maintenance_logs(aircraft.id).unwrap().len(), 2);
}

#[test]
fn test_delete_schedule() {
    let manager = create_test_manager();
    let aircraft = aircraft_at(&manager, "N28PA", 100.0, 80.0);
    let schedule = manager.create_schedule(hundred_hour(aircraft.id, 90.0)).unwrap();

    manager.delete_schedule(schedule.id).unwrap();
    assert!(manager.get_maintenance_status(aircraft.id).unwrap().is_empty());
    let err = manager.delete_schedule(schedule.id).unwrap_err();
    assert!(matches!(err, ClubError::NotFound { .. }));
}

// ========================================================================
// Squawks
// ========================================================================

#[test]
fn test_squawk_open_then_resolved() {
    let manager = create_test_manager();
    let member = add_member(&manager, None);
    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);
    let start = at(2026, 3, 3, 9);
    let reservation = manager
        .request_reservation_at(&booking(&member, &aircraft, start, at(2026, 3, 3, 12)), at(2026, 3, 1, 8))
        .unwrap();
    manager
        .check_in_at(&check_in_req(reservation.id, 100.0, 80.0), start)
        .unwrap();
    let mut req = check_out_req(reservation.id, 101.0, 81.0, 0.0);
    req.notes = Some("Nav light inop\nLeft wingtip".to_string());
    let flight_log = manager.check_out_at(&req, at(2026, 3, 3, 12)).unwrap().flight_log;

    let mut rx = manager.subscribe();
    let repair = manager
        .resolve_squawk_at(flight_log.id, "Replaced bulb", "A&P J. Rivera", at(2026, 3, 4, 10))
        .unwrap();
    assert_eq!(repair.maintenance_type, MaintenanceType::Repair);
    assert_eq!(repair.title, "Squawk: Nav light inop");
    assert!(repair.description.contains("Replaced bulb"));
    assert_eq!(repair.date, date(2026, 3, 4));
    assert_eq!(repair.squawk_flight_log_id, Some(flight_log.id));

    let resolved = manager.get_flight_log(flight_log.id).unwrap().unwrap();
    assert_eq!(resolved.squawk, SquawkState::Resolved);
    assert!(manager.open_squawks(aircraft.id).unwrap().is_empty());
    assert!(matches!(
        rx.try_recv().unwrap(),
        ClubEvent::SquawkResolved { maintenance_log_id, .. } if maintenance_log_id == repair.id
    ));
    let audit = manager.audit_log().unwrap();
    assert!(audit.iter().any(|e| e.action == AuditAction::SquawkResolved));

    // resolving twice is a bad transition
    let err = manager
        .resolve_squawk(flight_log.id, "again", "A&P J. Rivera")
        .unwrap_err();
    assert!(matches!(err, ClubError::InvalidTransition(_)));
}

#[test]
fn test_clean_flight_has_no_squawk_to_resolve() {
    let manager = create_test_manager();
    let member = add_member(&manager, None);
    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);
    let result = fly(&manager, &member, &aircraft, 3, (100.0, 101.0), 0.0);

    let err = manager
        .resolve_squawk(result.flight_log.id, "nothing", "A&P")
        .unwrap_err();
    assert!(matches!(err, ClubError::InvalidTransition(_)));
    assert!(manager.maintenance_logs(aircraft.id).unwrap().is_empty());
}

// ========================================================================
// 飞机状态
// ========================================================================

#[test]
fn test_aircraft_status_changes_are_audited() {
    let manager = create_test_manager();
    let aircraft = aircraft_at(&manager, "N28PA", 100.0, 80.0);

    let grounded = manager
        .set_aircraft_status(aircraft.id, AircraftStatus::Grounded)
        .unwrap();
    assert_eq!(grounded.status, AircraftStatus::Grounded);
    // unchanged: no second audit
    manager
        .set_aircraft_status(aircraft.id, AircraftStatus::Grounded)
        .unwrap();
    manager
        .set_aircraft_status(aircraft.id, AircraftStatus::Available)
        .unwrap();

    let audit = manager.audit_log().unwrap();
    assert_eq!(audit.len(), 2);
    assert!(audit.iter().all(|e| e.action == AuditAction::AircraftStatusChanged));

    let err = manager
        .set_aircraft_status(aircraft.id, AircraftStatus::InUse)
        .unwrap_err();
    assert!(matches!(err, ClubError::InvalidTransition(_)));
}

#[test]
fn test_flying_aircraft_status_is_locked() {
    let manager = create_test_manager();
    let member = add_member(&manager, None);
    let aircraft = add_aircraft(&manager, "N172SP", RateBasis::Wet);
    let start = at(2026, 3, 3, 9);
    let reservation = manager
        .request_reservation_at(&booking(&member, &aircraft, start, at(2026, 3, 3, 12)), at(2026, 3, 1, 8))
        .unwrap();
    manager
        .check_in_at(&check_in_req(reservation.id, 100.0, 80.0), start)
        .unwrap();

    let err = manager
        .set_aircraft_status(aircraft.id, AircraftStatus::Maintenance)
        .unwrap_err();
    assert!(matches!(err, ClubError::InvalidTransition(_)));
    assert_eq!(
        manager.get_aircraft(aircraft.id).unwrap().unwrap().status,
        AircraftStatus::InUse
    );
}

// ========================================================================
// 等级
// ========================================================================

#[test]
fn test_tier_in_use_cannot_be_deleted() {
    let manager = create_test_manager();
    let tier = add_tier(
        &manager,
        MembershipTierCreate {
            name: "Student".to_string(),
            monthly_dues: 50.0,
            ..Default::default()
        },
    );
    let member = add_member(&manager, Some(tier.id));

    let err = manager.delete_tier(tier.id).unwrap_err();
    assert!(matches!(err, ClubError::TierInUse { members: 1, .. }));

    manager
        .update_member(
            member.id,
            MemberUpdate {
                tier_id: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
    manager.delete_tier(tier.id).unwrap();
    assert!(manager.list_tiers().unwrap().is_empty());
}

#[test]
fn test_aircraft_cannot_take_another_registration() {
    let manager = create_test_manager();
    add_aircraft(&manager, "N172SP", RateBasis::Wet);
    let other = add_aircraft(&manager, "N999", RateBasis::Dry);

    let err = manager
        .update_aircraft(
            other.id,
            AircraftUpdate {
                registration: Some("n172sp".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ClubError::Validation(_)));
    assert_eq!(manager.get_aircraft(other.id).unwrap().unwrap().registration, "N999");

    // keeping its own registration is fine
    let same = manager
        .update_aircraft(
            other.id,
            AircraftUpdate {
                registration: Some(" n999 ".to_string()),
                hourly_rate: Some(140.0),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(same.registration, "N999");
    assert_eq!(same.hourly_rate, 140.0);
}
