//! Pantry backend library modules.
//!
//! The crate follows a hexagonal layout: `domain` holds the model,
//! services and ports; `inbound::http` adapts them to Actix handlers;
//! `outbound::persistence` implements the driven ports over Diesel.

pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
