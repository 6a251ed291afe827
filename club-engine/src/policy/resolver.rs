//! Effective booking policy
//!
//! Each field resolves independently: tier value, then club settings, then
//! built-in defaults. The weekend quota exists only on tiers.

use crate::club::{ClubError, ClubResult};
use serde::{Deserialize, Serialize};
use shared::models::{ClubSettings, MembershipTier};

pub const DEFAULT_BOOKING_WINDOW_DAYS: u32 = 90;
pub const DEFAULT_MAX_TRIP_LENGTH_DAYS: u32 = 3;
pub const DEFAULT_MAX_RESERVATIONS: u32 = 3;
pub const DEFAULT_HOURLY_RATE_DISCOUNT: f64 = 0.0;

/// Built-in fallbacks, used when neither tier nor settings define a value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyDefaults {
    pub booking_window_days: u32,
    pub max_trip_length_days: u32,
    pub max_reservations: u32,
    pub hourly_rate_discount: f64,
}

impl Default for PolicyDefaults {
    fn default() -> Self {
        Self {
            booking_window_days: DEFAULT_BOOKING_WINDOW_DAYS,
            max_trip_length_days: DEFAULT_MAX_TRIP_LENGTH_DAYS,
            max_reservations: DEFAULT_MAX_RESERVATIONS,
            hourly_rate_discount: DEFAULT_HOURLY_RATE_DISCOUNT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectivePolicy {
    pub booking_window_days: u32,
    pub max_trip_length_days: u32,
    pub max_reservations: u32,
    pub hourly_rate_discount: f64,
    pub max_weekend_days_per_year: Option<u32>,
}

/// Merge tier overrides with club settings and built-in defaults
pub fn resolve_policy(
    tier: Option<&MembershipTier>,
    settings: Option<&ClubSettings>,
    defaults: &PolicyDefaults,
) -> ClubResult<EffectivePolicy> {
    let booking_window_days = tier
        .and_then(|t| t.booking_window_days)
        .or_else(|| settings.and_then(|s| s.booking_window_days))
        .unwrap_or(defaults.booking_window_days);

    // tier.max_days_per_reservation is the older name for the trip length
    let max_trip_length_days = tier
        .and_then(|t| t.max_trip_length_days.or(t.max_days_per_reservation))
        .or_else(|| settings.and_then(|s| s.max_reservation_days))
        .unwrap_or(defaults.max_trip_length_days);

    let max_reservations = tier
        .and_then(|t| t.max_reservations)
        .or_else(|| settings.and_then(|s| s.max_reservations_per_user))
        .unwrap_or(defaults.max_reservations);

    let hourly_rate_discount = tier
        .and_then(|t| t.hourly_rate_discount)
        .or_else(|| settings.and_then(|s| s.hourly_rate_discount))
        .unwrap_or(defaults.hourly_rate_discount);

    let policy = EffectivePolicy {
        booking_window_days,
        max_trip_length_days,
        max_reservations,
        hourly_rate_discount,
        max_weekend_days_per_year: tier.and_then(|t| t.max_weekend_days_per_year),
    };
    validate(&policy)?;
    Ok(policy)
}

fn validate(policy: &EffectivePolicy) -> ClubResult<()> {
    if policy.booking_window_days == 0 {
        return Err(ClubError::Configuration(
            "booking window must be at least one day".into(),
        ));
    }
    if policy.max_trip_length_days == 0 {
        return Err(ClubError::Configuration(
            "maximum trip length must be at least one day".into(),
        ));
    }
    if policy.max_reservations == 0 {
        return Err(ClubError::Configuration(
            "maximum reservations must be at least one".into(),
        ));
    }
    if !policy.hourly_rate_discount.is_finite()
        || !(0.0..=100.0).contains(&policy.hourly_rate_discount)
    {
        return Err(ClubError::Configuration(format!(
            "hourly rate discount must be between 0 and 100, got {}",
            policy.hourly_rate_discount
        )));
    }
    Ok(())
}
