//! Club administration: members, tiers, aircraft, settings

use crate::billing::money::{to_decimal, to_f64};
use crate::club::{ClubContext, ClubError, ClubResult};
use shared::models::{
    Aircraft, AircraftCreate, AircraftStatus, AircraftUpdate, AuditAction, ClubSettings, Member,
    MemberCreate, MemberStatus, MemberUpdate, MembershipTier, MembershipTierCreate,
};

fn require_text(field: &str, value: &str) -> ClubResult<()> {
    if value.trim().is_empty() {
        return Err(ClubError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> ClubResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ClubError::Validation(format!(
            "{field} must be a finite, non-negative number"
        )));
    }
    Ok(())
}

fn require_percentage(field: &str, value: Option<f64>) -> ClubResult<()> {
    if let Some(v) = value
        && (!v.is_finite() || !(0.0..=100.0).contains(&v))
    {
        return Err(ClubError::Validation(format!("{field} must be within 0-100")));
    }
    Ok(())
}

fn require_positive_limits(limits: &[(&str, Option<u32>)]) -> ClubResult<()> {
    for (field, value) in limits {
        if *value == Some(0) {
            return Err(ClubError::Validation(format!("{field} must be positive")));
        }
    }
    Ok(())
}

fn require_email(email: &str) -> ClubResult<()> {
    require_text("email", email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ClubError::Validation(format!("invalid email: {email}"))),
    }
}

// ========== Members ==========

pub fn create_member(ctx: &ClubContext<'_>, data: MemberCreate) -> ClubResult<Member> {
    require_text("name", &data.name)?;
    require_email(&data.email)?;
    if let Some(tier_id) = data.tier_id {
        let _: MembershipTier = ctx.load(tier_id)?;
    }
    if let Some(share) = data.share_size {
        require_non_negative("share_size", share)?;
    }

    let member = Member {
        id: shared::util::snowflake_id(),
        name: data.name.trim().to_string(),
        email: data.email.trim().to_ascii_lowercase(),
        role: data.role,
        status: MemberStatus::Active,
        balance: 0.0,
        tier_id: data.tier_id,
        share_size: data.share_size,
        created_at: ctx.now,
        updated_at: ctx.now,
    };
    ctx.save(&member)?;
    tracing::info!(member_id = member.id, role = ?member.role, "Member created");
    Ok(member)
}

pub fn update_member(ctx: &ClubContext<'_>, member_id: i64, data: MemberUpdate) -> ClubResult<Member> {
    let mut member: Member = ctx.load(member_id)?;
    if let Some(name) = data.name {
        require_text("name", &name)?;
        member.name = name.trim().to_string();
    }
    if let Some(email) = data.email {
        require_email(&email)?;
        member.email = email.trim().to_ascii_lowercase();
    }
    if let Some(role) = data.role {
        member.role = role;
    }
    if let Some(status) = data.status
        && status != member.status
    {
        tracing::info!(member_id, from = ?member.status, to = ?status, "Member status changed");
        member.status = status;
    }
    if let Some(tier_id) = data.tier_id {
        if let Some(id) = tier_id {
            let _: MembershipTier = ctx.load(id)?;
        }
        member.tier_id = tier_id;
    }
    if let Some(share) = data.share_size {
        require_non_negative("share_size", share)?;
        member.share_size = Some(share);
    }
    member.updated_at = ctx.now;
    ctx.save(&member)?;
    Ok(member)
}

// ========== Tiers ==========

fn validate_tier(data: &MembershipTierCreate) -> ClubResult<()> {
    require_text("name", &data.name)?;
    require_non_negative("monthly_dues", data.monthly_dues)?;
    require_percentage("hourly_rate_discount", data.hourly_rate_discount)?;
    require_positive_limits(&[
        ("max_reservations", data.max_reservations),
        ("max_days_per_reservation", data.max_days_per_reservation),
        ("max_trip_length_days", data.max_trip_length_days),
        ("booking_window_days", data.booking_window_days),
    ])
}

pub fn create_tier(ctx: &ClubContext<'_>, data: MembershipTierCreate) -> ClubResult<MembershipTier> {
    validate_tier(&data)?;
    let tier = MembershipTier {
        id: shared::util::snowflake_id(),
        name: data.name.trim().to_string(),
        monthly_dues: to_f64(to_decimal(data.monthly_dues)),
        hourly_rate_discount: data.hourly_rate_discount,
        max_reservations: data.max_reservations,
        max_days_per_reservation: data.max_days_per_reservation,
        max_trip_length_days: data.max_trip_length_days,
        booking_window_days: data.booking_window_days,
        max_weekend_days_per_year: data.max_weekend_days_per_year,
        created_at: ctx.now,
        updated_at: ctx.now,
    };
    ctx.save(&tier)?;
    Ok(tier)
}

/// Replace every tier field; absent policy fields fall back again
pub fn update_tier(
    ctx: &ClubContext<'_>,
    tier_id: i64,
    data: MembershipTierCreate,
) -> ClubResult<MembershipTier> {
    validate_tier(&data)?;
    let existing: MembershipTier = ctx.load(tier_id)?;
    let tier = MembershipTier {
        id: existing.id,
        name: data.name.trim().to_string(),
        monthly_dues: to_f64(to_decimal(data.monthly_dues)),
        hourly_rate_discount: data.hourly_rate_discount,
        max_reservations: data.max_reservations,
        max_days_per_reservation: data.max_days_per_reservation,
        max_trip_length_days: data.max_trip_length_days,
        booking_window_days: data.booking_window_days,
        max_weekend_days_per_year: data.max_weekend_days_per_year,
        created_at: existing.created_at,
        updated_at: ctx.now,
    };
    ctx.save(&tier)?;
    Ok(tier)
}

/// Rejected while any member still references the tier
pub fn delete_tier(ctx: &ClubContext<'_>, tier_id: i64) -> ClubResult<()> {
    let tier: MembershipTier = ctx.load(tier_id)?;
    let members: Vec<Member> = ctx.storage.all(ctx.txn)?;
    let in_use = members
        .iter()
        .filter(|m| m.tier_id == Some(tier_id))
        .count();
    if in_use > 0 {
        return Err(ClubError::TierInUse {
            tier_id,
            members: in_use,
        });
    }
    ctx.storage.delete::<MembershipTier>(ctx.txn, tier_id)?;
    ctx.audit(
        AuditAction::TierDeleted,
        "membership_tier",
        tier_id,
        None,
        serde_json::json!({ "name": tier.name }),
    )?;
    Ok(())
}

// ========== Aircraft ==========

/// Registrations are unique across the fleet (`except` skips the aircraft being renamed)
fn ensure_unique_registration(
    ctx: &ClubContext<'_>,
    registration: &str,
    except: Option<i64>,
) -> ClubResult<()> {
    let fleet: Vec<Aircraft> = ctx.storage.all(ctx.txn)?;
    if fleet
        .iter()
        .any(|a| a.registration == registration && Some(a.id) != except)
    {
        return Err(ClubError::Validation(format!(
            "aircraft {registration} already exists"
        )));
    }
    Ok(())
}

pub fn create_aircraft(ctx: &ClubContext<'_>, data: AircraftCreate) -> ClubResult<Aircraft> {
    require_text("registration", &data.registration)?;
    require_non_negative("hourly_rate", data.hourly_rate)?;
    require_non_negative("current_hobbs", data.current_hobbs)?;
    require_non_negative("current_tach", data.current_tach)?;
    let registration = data.registration.trim().to_ascii_uppercase();

    ensure_unique_registration(ctx, &registration, None)?;

    let aircraft = Aircraft {
        id: shared::util::snowflake_id(),
        registration,
        make: data.make,
        model: data.model,
        year: data.year,
        status: AircraftStatus::Available,
        hourly_rate: to_f64(to_decimal(data.hourly_rate)),
        rate_basis: data.rate_basis,
        fuel_type: data.fuel_type,
        current_hobbs: data.current_hobbs,
        current_tach: data.current_tach,
        next_annual: data.next_annual,
        next_oil_change: data.next_oil_change,
        created_at: ctx.now,
        updated_at: ctx.now,
    };
    ctx.save(&aircraft)?;
    tracing::info!(aircraft_id = aircraft.id, registration = %aircraft.registration, "Aircraft added");
    Ok(aircraft)
}

pub fn update_aircraft(
    ctx: &ClubContext<'_>,
    aircraft_id: i64,
    data: AircraftUpdate,
) -> ClubResult<Aircraft> {
    let mut aircraft: Aircraft = ctx.load(aircraft_id)?;
    if let Some(registration) = data.registration {
        require_text("registration", &registration)?;
        let registration = registration.trim().to_ascii_uppercase();
        ensure_unique_registration(ctx, &registration, Some(aircraft_id))?;
        aircraft.registration = registration;
    }
    if let Some(make) = data.make {
        aircraft.make = make;
    }
    if let Some(model) = data.model {
        aircraft.model = model;
    }
    if let Some(year) = data.year {
        aircraft.year = year;
    }
    if let Some(rate) = data.hourly_rate {
        require_non_negative("hourly_rate", rate)?;
        aircraft.hourly_rate = to_f64(to_decimal(rate));
    }
    if let Some(basis) = data.rate_basis {
        aircraft.rate_basis = basis;
    }
    if let Some(fuel) = data.fuel_type {
        aircraft.fuel_type = fuel;
    }
    if data.next_annual.is_some() {
        aircraft.next_annual = data.next_annual;
    }
    if data.next_oil_change.is_some() {
        aircraft.next_oil_change = data.next_oil_change;
    }
    aircraft.updated_at = ctx.now;
    ctx.save(&aircraft)?;
    Ok(aircraft)
}

// ========== Settings ==========

pub fn upsert_settings(ctx: &ClubContext<'_>, settings: ClubSettings) -> ClubResult<ClubSettings> {
    require_non_negative("monthly_dues", settings.monthly_dues)?;
    require_percentage("hourly_rate_discount", settings.hourly_rate_discount)?;
    if let Some(day) = settings.billing_cycle_day
        && !(1..=28).contains(&day)
    {
        return Err(ClubError::Validation("billing_cycle_day must be within 1-28".into()));
    }
    require_positive_limits(&[
        ("booking_window_days", settings.booking_window_days),
        ("max_reservation_days", settings.max_reservation_days),
        ("max_reservations_per_user", settings.max_reservations_per_user),
    ])?;
    for (field, price) in [
        ("fuel_price_100ll", settings.fuel_price_100ll),
        ("fuel_price_jet_a", settings.fuel_price_jet_a),
        ("fuel_price_ul94", settings.fuel_price_ul94),
    ] {
        if let Some(price) = price {
            require_non_negative(field, price)?;
        }
    }
    let mut settings = settings;
    settings.home_airport = settings.home_airport.trim().to_ascii_uppercase();
    ctx.storage.put_settings(ctx.txn, &settings)?;
    tracing::info!(club = %settings.name, home_airport = %settings.home_airport, "Club settings saved");
    Ok(settings)
}
