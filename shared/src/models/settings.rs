//! Club Settings Model

use serde::{Deserialize, Serialize};

use super::aircraft::FuelType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClubType {
    #[default]
    Equity,
    NonProfit,
    Commercial,
}

/// Singleton club configuration (一个俱乐部只有一条)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClubSettings {
    pub name: String,
    #[serde(default)]
    pub club_type: ClubType,
    pub home_airport: String,
    pub currency: String,
    pub monthly_dues: f64,
    /// Day of month the dues run is expected to happen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_cycle_day: Option<u32>,

    // === Fallback policy ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_window_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_reservation_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_reservations_per_user: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate_discount: Option<f64>,

    // === Home airport fuel prices ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_price_100ll: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_price_jet_a: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_price_ul94: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_prices_updated_at: Option<i64>,
}

impl ClubSettings {
    /// Home-airport price per gallon for the given fuel
    pub fn fuel_price(&self, fuel: FuelType) -> Option<f64> {
        match fuel {
            FuelType::Avgas100ll => self.fuel_price_100ll,
            FuelType::JetA => self.fuel_price_jet_a,
            FuelType::Ul94 => self.fuel_price_ul94,
        }
    }
}

/// Prices reported by a fuel price provider; any field may be missing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct FuelPrices {
    #[serde(default, alias = "price100LL")]
    pub price_100ll: Option<f64>,
    #[serde(default, alias = "priceJetA")]
    pub price_jet_a: Option<f64>,
    #[serde(default, alias = "priceUL94")]
    pub price_ul94: Option<f64>,
}

impl FuelPrices {
    pub fn is_empty(&self) -> bool {
        self.price_100ll.is_none() && self.price_jet_a.is_none() && self.price_ul94.is_none()
    }
}
