//! Flight lifecycle: check-in, check-out, cancellation

pub mod lifecycle;

pub use lifecycle::{CheckOutResult, cancel, check_in, check_out};
