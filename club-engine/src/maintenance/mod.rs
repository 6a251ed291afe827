//! Maintenance status and records

pub mod records;
pub mod status;

pub use status::{evaluate_aircraft, evaluate_schedule};
