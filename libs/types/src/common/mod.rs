//! Primitive building blocks shared by every ledger crate

pub mod errors;
pub mod fixed_point;
pub mod identifiers;
