//! Flight charge calculation
//!
//! Pure functions, no storage access. Money is rounded to cents once per
//! line so that invoice items always sum to the net amount.

use super::money::{round_money, to_decimal, to_f64, to_f64_exact};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::RateBasis;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeInput {
    pub hourly_rate: f64,
    /// Percentage off the hourly rate (0-100)
    pub discount_pct: f64,
    pub rate_basis: RateBasis,
    pub hobbs_start: f64,
    pub hobbs_end: f64,
    pub fuel_gallons: f64,
    /// Home-airport price per gallon; only WET aircraft use it
    pub home_fuel_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightCharge {
    pub flight_time: f64,
    /// Unrounded, so `flight_time × effective_rate` rounds to `flight_cost`
    pub effective_rate: f64,
    pub flight_cost: f64,
    pub fuel_reimbursement: f64,
    /// `flight_cost - fuel_reimbursement`, may be negative
    pub net_amount: f64,
}

/// `base × (1 − discount/100)`, unrounded
pub fn effective_rate(hourly_rate: f64, discount_pct: f64) -> Decimal {
    to_decimal(hourly_rate) * (Decimal::ONE - to_decimal(discount_pct) / Decimal::ONE_HUNDRED)
}

pub fn calculate_flight_charge(input: &ChargeInput) -> FlightCharge {
    let flight_time = to_decimal(input.hobbs_end) - to_decimal(input.hobbs_start);
    let rate = effective_rate(input.hourly_rate, input.discount_pct);
    let flight_cost = round_money(flight_time * rate);

    let fuel_reimbursement = match input.rate_basis {
        RateBasis::Wet => match input.home_fuel_price {
            Some(price) => round_money(to_decimal(input.fuel_gallons) * to_decimal(price)),
            None => {
                if input.fuel_gallons > 0.0 {
                    tracing::warn!(
                        fuel_gallons = input.fuel_gallons,
                        "No home-airport fuel price configured, fuel reimbursement is zero"
                    );
                }
                Decimal::ZERO
            }
        },
        RateBasis::Dry => Decimal::ZERO,
    };

    FlightCharge {
        flight_time: to_f64_exact(flight_time),
        effective_rate: to_f64_exact(rate),
        flight_cost: to_f64(flight_cost),
        fuel_reimbursement: to_f64(fuel_reimbursement),
        net_amount: to_f64(flight_cost - fuel_reimbursement),
    }
}
