//! Database models for the Titipan Back-Office
//!
//! Re-exports models from the shared crate and adds backend-specific models

pub use shared::models::*;
