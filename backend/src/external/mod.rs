//! External API integrations

pub mod air_pollution;

pub use air_pollution::AirPollutionClient;
