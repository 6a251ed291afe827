//! Persistence

pub mod storage;

pub use storage::{ClubStorage, Entity, StorageError, StorageResult};
