//! Shared types for the flight club engine
//!
//! Domain models, the unified error code system and small utilities used
//! by club-engine and by any API layer built on top of it.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
