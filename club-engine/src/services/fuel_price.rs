//! Home-airport fuel prices
//!
//! The provider is a collaborator: it answers with whatever prices it knows
//! for an airport. How it finds them is its own business.

use async_trait::async_trait;
use shared::models::FuelPrices;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FuelPriceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {0}")]
    Status(u16),

    #[error("Provider has no prices for {0}")]
    NoPrices(String),
}

#[async_trait]
pub trait FuelPriceProvider: Send + Sync {
    async fn fetch_prices(&self, airport: &str) -> Result<FuelPrices, FuelPriceError>;
}

/// `GET {base_url}/{ICAO}` returning `{"price100LL": .., "priceJetA": .., "priceUL94": ..}`
pub struct HttpFuelPriceProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFuelPriceProvider {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self, FuelPriceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl FuelPriceProvider for HttpFuelPriceProvider {
    async fn fetch_prices(&self, airport: &str) -> Result<FuelPrices, FuelPriceError> {
        let icao = airport.trim().to_ascii_uppercase();
        let url = format!("{}/{}", self.base_url, icao);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(FuelPriceError::Status(resp.status().as_u16()));
        }
        let prices: FuelPrices = resp.json().await?;
        if prices.is_empty() {
            return Err(FuelPriceError::NoPrices(icao));
        }
        Ok(prices)
    }
}

/// Fixed prices, for tests and offline setups
pub struct StaticFuelPriceProvider(pub FuelPrices);

#[async_trait]
impl FuelPriceProvider for StaticFuelPriceProvider {
    async fn fetch_prices(&self, airport: &str) -> Result<FuelPrices, FuelPriceError> {
        if self.0.is_empty() {
            return Err(FuelPriceError::NoPrices(airport.to_string()));
        }
        Ok(self.0)
    }
}
