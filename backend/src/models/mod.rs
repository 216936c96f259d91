//! Domain models for the Air Quality Intelligence service
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
