//! Shared types and models for the Air Quality Intelligence platform
//!
//! This crate holds the I/O-free prediction pipeline (feature normalization,
//! model interface, AQI classification) shared by the backend and the WASM
//! bindings.

pub mod error;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
