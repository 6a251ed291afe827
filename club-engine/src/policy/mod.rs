//! Booking policy resolution

pub mod resolver;

pub use resolver::{EffectivePolicy, PolicyDefaults, resolve_policy};
