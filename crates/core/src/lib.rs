//! Core business logic for the marketplace backend.

pub mod services;

pub use services::*;
