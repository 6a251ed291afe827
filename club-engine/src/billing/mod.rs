//! Billing: flight charges, invoices, dues

pub mod calculator;
pub mod invoices;
pub mod money;

pub use calculator::{ChargeInput, FlightCharge, calculate_flight_charge};
pub use invoices::DuesRunReport;
