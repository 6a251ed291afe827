//! Club engine core
//!
//! - [`ClubManager`]: public facade, one write transaction per operation
//! - [`ClubContext`]: what domain modules see while a transaction is open
//! - [`ClubEvent`]: broadcast after commit

pub mod context;
pub mod error;
pub mod events;
pub mod manager;

pub use context::ClubContext;
pub use error::{ClubError, ClubResult};
pub use events::ClubEvent;
pub use manager::ClubManager;
