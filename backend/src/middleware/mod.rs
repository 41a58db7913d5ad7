//! Request middleware for the Titipan Back-Office

pub mod auth;

pub use auth::{auth_middleware, require_admin, AuthUser, CurrentUser};
