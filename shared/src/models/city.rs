//! Cities supported by live analysis

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::types::GpsCoordinates;

/// A city the live analysis mode can query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    Coimbatore,
    Chennai,
    Delhi,
    Mumbai,
    Bangalore,
    Hyderabad,
    Kolkata,
    Pune,
    Ahmedabad,
    Jaipur,
}

impl City {
    pub const ALL: [City; 10] = [
        City::Coimbatore,
        City::Chennai,
        City::Delhi,
        City::Mumbai,
        City::Bangalore,
        City::Hyderabad,
        City::Kolkata,
        City::Pune,
        City::Ahmedabad,
        City::Jaipur,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            City::Coimbatore => "Coimbatore",
            City::Chennai => "Chennai",
            City::Delhi => "Delhi",
            City::Mumbai => "Mumbai",
            City::Bangalore => "Bangalore",
            City::Hyderabad => "Hyderabad",
            City::Kolkata => "Kolkata",
            City::Pune => "Pune",
            City::Ahmedabad => "Ahmedabad",
            City::Jaipur => "Jaipur",
        }
    }

    pub fn coordinates(&self) -> GpsCoordinates {
        // (latitude, longitude) scaled by 10^4
        let (lat, lon) = match self {
            City::Coimbatore => (110168, 769558),
            City::Chennai => (130827, 802707),
            City::Delhi => (287041, 771025),
            City::Mumbai => (190760, 728777),
            City::Bangalore => (129716, 775946),
            City::Hyderabad => (173850, 784867),
            City::Kolkata => (225726, 883639),
            City::Pune => (185204, 738567),
            City::Ahmedabad => (230225, 725714),
            City::Jaipur => (269124, 757873),
        };
        GpsCoordinates::new(Decimal::new(lat, 4), Decimal::new(lon, 4))
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> DomainResult<Self> {
        let name = name.trim();
        City::ALL
            .into_iter()
            .find(|city| city.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| DomainError::UnknownCity(name.to_string()))
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for City {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        City::from_name(s)
    }
}
