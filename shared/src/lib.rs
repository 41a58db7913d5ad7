//! Shared types and models for the Titipan Back-Office
//!
//! This crate contains the domain model of the consignment stock ledger and
//! the pure aggregation logic that derives balances from it, shared between
//! the backend and its tests.

pub mod ledger;
pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
