//! Maintenance records: schedules, logs, squawks, aircraft status

use crate::club::{ClubContext, ClubError, ClubResult};
use crate::utils::time::local_date;
use chrono::Months;
use shared::models::{
    Aircraft, AircraftStatus, AuditAction, FlightLog, MaintenanceLog, MaintenanceLogCreate,
    MaintenanceSchedule, MaintenanceScheduleCreate, MaintenanceType, SquawkState,
};

/// Tach hours between oil changes
pub const OIL_CHANGE_INTERVAL_TACH: f64 = 50.0;

pub fn create_schedule(
    ctx: &ClubContext<'_>,
    data: MaintenanceScheduleCreate,
) -> ClubResult<MaintenanceSchedule> {
    let _aircraft: Aircraft = ctx.load(data.aircraft_id)?;
    if data.name.trim().is_empty() {
        return Err(ClubError::Validation("schedule name is required".into()));
    }
    for (field, value) in [
        ("interval_hours", data.interval_hours),
        ("last_performed_hours", data.last_performed_hours),
    ] {
        if let Some(v) = value
            && (!v.is_finite() || v < 0.0)
        {
            return Err(ClubError::Validation(format!(
                "{field} must be a finite, non-negative number"
            )));
        }
    }
    if data.interval_months == Some(0) {
        return Err(ClubError::Validation("interval_months must be positive".into()));
    }

    let schedule = MaintenanceSchedule {
        id: shared::util::snowflake_id(),
        aircraft_id: data.aircraft_id,
        name: data.name,
        interval_hours: data.interval_hours,
        interval_months: data.interval_months,
        last_performed_hours: data.last_performed_hours,
        last_performed: data.last_performed,
        created_at: ctx.now,
    };
    ctx.storage.insert_schedule(ctx.txn, &schedule)?;
    Ok(schedule)
}

pub fn delete_schedule(ctx: &ClubContext<'_>, schedule_id: i64) -> ClubResult<()> {
    let schedule: MaintenanceSchedule = ctx.load(schedule_id)?;
    ctx.storage.remove_schedule(ctx.txn, &schedule)?;
    Ok(())
}

/// Store a maintenance log and advance what it satisfies
///
/// - linked schedules: last performed = log date, at the current Hobbs
/// - ANNUAL: next annual = date + 12 months
/// - OIL_CHANGE: next oil change = current tach + 50
pub fn record_maintenance(
    ctx: &ClubContext<'_>,
    data: MaintenanceLogCreate,
) -> ClubResult<MaintenanceLog> {
    record_with_squawk(ctx, data, None)
}

fn record_with_squawk(
    ctx: &ClubContext<'_>,
    data: MaintenanceLogCreate,
    squawk_flight_log_id: Option<i64>,
) -> ClubResult<MaintenanceLog> {
    let mut aircraft: Aircraft = ctx.load(data.aircraft_id)?;
    if let Some(cost) = data.cost
        && (!cost.is_finite() || cost < 0.0)
    {
        return Err(ClubError::Validation("cost must be a finite, non-negative number".into()));
    }

    for schedule_id in &data.schedule_ids {
        let mut schedule: MaintenanceSchedule = ctx.load(*schedule_id)?;
        if schedule.aircraft_id != aircraft.id {
            return Err(ClubError::Validation(format!(
                "schedule {} belongs to another aircraft",
                schedule.id
            )));
        }
        schedule.last_performed = Some(data.date);
        schedule.last_performed_hours = Some(aircraft.current_hobbs);
        ctx.save(&schedule)?;
    }

    match data.maintenance_type {
        MaintenanceType::Annual => {
            aircraft.next_annual = data.date.checked_add_months(Months::new(12));
        }
        MaintenanceType::OilChange => {
            aircraft.next_oil_change = Some(aircraft.current_tach + OIL_CHANGE_INTERVAL_TACH);
        }
        _ => {}
    }
    aircraft.updated_at = ctx.now;
    ctx.save(&aircraft)?;

    let log = MaintenanceLog {
        id: shared::util::snowflake_id(),
        aircraft_id: aircraft.id,
        title: data.title,
        description: data.description,
        date: data.date,
        maintenance_type: data.maintenance_type,
        cost: data.cost,
        performed_by: data.performed_by,
        schedule_ids: data.schedule_ids,
        squawk_flight_log_id,
        created_at: ctx.now,
    };
    ctx.storage.insert_maintenance_log(ctx.txn, &log)?;

    tracing::info!(
        aircraft_id = aircraft.id,
        maintenance_log_id = log.id,
        maintenance_type = ?log.maintenance_type,
        schedules = log.schedule_ids.len(),
        "Maintenance recorded"
    );
    Ok(log)
}

/// Close an open squawk with a REPAIR log
pub fn resolve_squawk(
    ctx: &ClubContext<'_>,
    flight_log_id: i64,
    resolution: &str,
    performed_by: &str,
) -> ClubResult<MaintenanceLog> {
    let mut flight_log: FlightLog = ctx.load(flight_log_id)?;
    if flight_log.squawk != SquawkState::Open {
        return Err(ClubError::InvalidTransition(format!(
            "flight log {} has no open squawk",
            flight_log.id
        )));
    }

    let reported = flight_log.notes.clone().unwrap_or_default();
    let log = record_with_squawk(
        ctx,
        MaintenanceLogCreate {
            aircraft_id: flight_log.aircraft_id,
            title: format!("Squawk: {}", first_line(&reported)),
            description: if resolution.trim().is_empty() {
                reported.clone()
            } else {
                format!("{reported}\n\nResolution: {resolution}")
            },
            date: local_date(ctx.now, ctx.tz),
            maintenance_type: MaintenanceType::Repair,
            cost: None,
            performed_by: performed_by.to_string(),
            schedule_ids: Vec::new(),
        },
        Some(flight_log.id),
    )?;

    flight_log.squawk = SquawkState::Resolved;
    flight_log.updated_at = ctx.now;
    ctx.save(&flight_log)?;

    ctx.audit(
        AuditAction::SquawkResolved,
        "flight_log",
        flight_log.id,
        Some(flight_log.member_id),
        serde_json::json!({ "maintenance_log_id": log.id }),
    )?;
    Ok(log)
}

fn first_line(text: &str) -> &str {
    let line = text.lines().next().unwrap_or_default();
    match line.char_indices().nth(60) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

/// Status changes driven by maintenance; IN_USE belongs to the flight lifecycle
pub fn set_aircraft_status(
    ctx: &ClubContext<'_>,
    aircraft_id: i64,
    status: AircraftStatus,
) -> ClubResult<Aircraft> {
    let mut aircraft: Aircraft = ctx.load(aircraft_id)?;
    if status == AircraftStatus::InUse {
        return Err(ClubError::InvalidTransition(
            "IN_USE is set by check-in only".into(),
        ));
    }
    if aircraft.status == AircraftStatus::InUse {
        return Err(ClubError::InvalidTransition(format!(
            "aircraft {} is flying; check it out first",
            aircraft.registration
        )));
    }
    if aircraft.status == status {
        return Ok(aircraft);
    }

    let previous = aircraft.status;
    aircraft.status = status;
    aircraft.updated_at = ctx.now;
    ctx.save(&aircraft)?;
    ctx.audit(
        AuditAction::AircraftStatusChanged,
        "aircraft",
        aircraft.id,
        None,
        serde_json::json!({ "from": previous, "to": status }),
    )?;
    Ok(aircraft)
}
