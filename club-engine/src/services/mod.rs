//! Collaborators outside the engine core

pub mod file_storage;
pub mod fuel_price;

pub use file_storage::{FileStorage, FileStorageError, LocalFileStorage};
pub use fuel_price::{FuelPriceError, FuelPriceProvider, HttpFuelPriceProvider, StaticFuelPriceProvider};
