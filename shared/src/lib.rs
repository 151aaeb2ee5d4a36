//! Shared types and models for the Agronomic Advisory Platform
//!
//! This crate contains the domain model exchanged between the advisory
//! engine, the backend, the frontend (via WASM), and other components of the
//! system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
