//! Domain models for the Air Quality Intelligence platform

mod aqi;
mod city;
mod feature;
mod pollutant;
mod regression;

pub use aqi::*;
pub use city::*;
pub use feature::*;
pub use pollutant::*;
pub use regression::*;
