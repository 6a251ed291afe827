//! Reservation admission

pub mod admission;
pub mod rules;

pub use admission::request_reservation;
pub use rules::{AdmissionCheck, AdmissionInput, AdmissionRule, rules_for};
