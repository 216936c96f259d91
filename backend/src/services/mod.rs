//! Business logic services for the Air Quality Intelligence service

pub mod prediction;

pub use prediction::PredictionService;
