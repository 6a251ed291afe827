//! Maintenance due status
//!
//! Two independent clocks per schedule: flight hours (Hobbs) and calendar
//! months. A check runs only when both its interval and its last-performed
//! value are present. The more severe result wins.

use crate::billing::money::{to_decimal, to_f64_exact};
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use shared::models::{
    Aircraft, FleetMaintenanceSummary, MaintenanceDue, MaintenanceSchedule, MaintenanceStatus,
};

/// Hours remaining below which a schedule is WARNING
pub const WARNING_HOURS: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
/// Days remaining below which a schedule is WARNING
pub const WARNING_DAYS: i64 = 30;

fn hours_due(remaining: Decimal) -> MaintenanceDue {
    if remaining < Decimal::ZERO {
        MaintenanceDue::Overdue
    } else if remaining < WARNING_HOURS {
        MaintenanceDue::Warning
    } else {
        MaintenanceDue::Ok
    }
}

fn days_due(remaining: i64) -> MaintenanceDue {
    if remaining < 0 {
        MaintenanceDue::Overdue
    } else if remaining < WARNING_DAYS {
        MaintenanceDue::Warning
    } else {
        MaintenanceDue::Ok
    }
}

pub fn evaluate_schedule(
    schedule: &MaintenanceSchedule,
    current_hobbs: f64,
    today: NaiveDate,
) -> MaintenanceStatus {
    let mut status = MaintenanceDue::Ok;

    let hours_remaining = match (schedule.interval_hours, schedule.last_performed_hours) {
        (Some(interval), Some(last)) => {
            let remaining = to_decimal(last) + to_decimal(interval) - to_decimal(current_hobbs);
            status = status.max(hours_due(remaining));
            Some(to_f64_exact(remaining))
        }
        _ => None,
    };

    let days_remaining = match (schedule.interval_months, schedule.last_performed) {
        (Some(months), Some(last)) => last
            .checked_add_months(Months::new(months))
            .map(|next_due| {
                let remaining = (next_due - today).num_days();
                status = status.max(days_due(remaining));
                remaining
            }),
        _ => None,
    };

    MaintenanceStatus {
        schedule_id: schedule.id,
        name: schedule.name.clone(),
        status,
        hours_remaining,
        days_remaining,
    }
}

/// Every schedule of one aircraft, plus the worst status
pub fn evaluate_aircraft(
    aircraft: &Aircraft,
    schedules: &[MaintenanceSchedule],
    today: NaiveDate,
) -> FleetMaintenanceSummary {
    let items: Vec<MaintenanceStatus> = schedules
        .iter()
        .map(|s| evaluate_schedule(s, aircraft.current_hobbs, today))
        .collect();
    let status = items
        .iter()
        .map(|i| i.status)
        .max()
        .unwrap_or(MaintenanceDue::Ok);
    FleetMaintenanceSummary {
        aircraft_id: aircraft.id,
        registration: aircraft.registration.clone(),
        status,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> MaintenanceSchedule {
        MaintenanceSchedule {
            id: 1,
            aircraft_id: 1,
            name: "Oil change".into(),
            interval_hours: None,
            interval_months: None,
            last_performed_hours: None,
            last_performed: None,
            created_at: 0,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_two_hours_left_is_warning() {
        let s = MaintenanceSchedule {
            interval_hours: Some(50.0),
            last_performed_hours: Some(2100.0),
            ..schedule()
        };
        let status = evaluate_schedule(&s, 2148.0, date(2026, 3, 1));
        assert_eq!(status.hours_remaining, Some(2.0));
        assert_eq!(status.status, MaintenanceDue::Warning);
        assert_eq!(status.days_remaining, None);
    }

    #[test]
    fn test_hours_overdue() {
        let s = MaintenanceSchedule {
            interval_hours: Some(50.0),
            last_performed_hours: Some(2100.0),
            ..schedule()
        };
        let status = evaluate_schedule(&s, 2150.1, date(2026, 3, 1));
        assert_eq!(status.status, MaintenanceDue::Overdue);
        assert!(status.hours_remaining.unwrap() < 0.0);
    }

    #[test]
    fn test_calendar_check() {
        let s = MaintenanceSchedule {
            interval_months: Some(12),
            last_performed: Some(date(2025, 4, 15)),
            ..schedule()
        };
        let ok = evaluate_schedule(&s, 0.0, date(2026, 2, 1));
        assert_eq!(ok.days_remaining, Some(73));
        assert_eq!(ok.status, MaintenanceDue::Ok);

        let warning = evaluate_schedule(&s, 0.0, date(2026, 4, 1));
        assert_eq!(warning.days_remaining, Some(14));
        assert_eq!(warning.status, MaintenanceDue::Warning);

        let overdue = evaluate_schedule(&s, 0.0, date(2026, 4, 16));
        assert_eq!(overdue.days_remaining, Some(-1));
        assert_eq!(overdue.status, MaintenanceDue::Overdue);
    }

    #[test]
    fn test_most_severe_clock_wins() {
        let s = MaintenanceSchedule {
            interval_hours: Some(100.0),
            last_performed_hours: Some(1000.0),
            interval_months: Some(12),
            last_performed: Some(date(2025, 1, 1)),
            ..schedule()
        };
        // plenty of hours, calendar overdue
        let status = evaluate_schedule(&s, 1010.0, date(2026, 1, 5));
        assert_eq!(status.status, MaintenanceDue::Overdue);
        assert_eq!(status.hours_remaining, Some(90.0));
    }

    #[test]
    fn test_unconfigured_schedule_is_ok() {
        // interval without a last-performed value is skipped
        let s = MaintenanceSchedule {
            interval_hours: Some(50.0),
            ..schedule()
        };
        let status = evaluate_schedule(&s, 5000.0, date(2026, 3, 1));
        assert_eq!(status.status, MaintenanceDue::Ok);
        assert_eq!(status.hours_remaining, None);
        assert_eq!(status.days_remaining, None);
    }

    #[test]
    fn test_month_end_clamps() {
        let s = MaintenanceSchedule {
            interval_months: Some(1),
            last_performed: Some(date(2026, 1, 31)),
            ..schedule()
        };
        let status = evaluate_schedule(&s, 0.0, date(2026, 2, 1));
        assert_eq!(status.days_remaining, Some(27));
    }
}
