//! Data models
//!
//! Shared between club-engine and API consumers.
//! All IDs are snowflake `i64`, timestamps are Unix millis, calendar dates
//! are `NaiveDate`, money and meter readings are `f64` (arithmetic happens
//! in `rust_decimal` inside the engine).

pub mod aircraft;
pub mod audit;
pub mod flight_log;
pub mod invoice;
pub mod maintenance;
pub mod member;
pub mod reservation;
pub mod settings;
pub mod tier;

// Re-exports
pub use aircraft::*;
pub use audit::*;
pub use flight_log::*;
pub use invoice::*;
pub use maintenance::*;
pub use member::*;
pub use reservation::*;
pub use settings::*;
pub use tier::*;
