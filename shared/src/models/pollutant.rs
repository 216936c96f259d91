//! Pollutant identifiers and raw concentration readings

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Pollutants understood by the prediction pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pollutant {
    /// Sulfur dioxide (μg/m³)
    So2,
    /// Nitrogen dioxide (μg/m³)
    No2,
    /// Respirable particulate matter below 10 μm (μg/m³)
    Pm10,
    /// Fine particulate matter below 2.5 μm (μg/m³)
    Pm25,
}

impl Pollutant {
    pub const ALL: [Pollutant; 4] = [
        Pollutant::So2,
        Pollutant::No2,
        Pollutant::Pm10,
        Pollutant::Pm25,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::So2 => "SO2",
            Pollutant::No2 => "NO2",
            Pollutant::Pm10 => "PM10",
            Pollutant::Pm25 => "PM2.5",
        }
    }

    /// Key used by the OpenWeatherMap air pollution API
    pub fn provider_key(&self) -> &'static str {
        match self {
            Pollutant::So2 => "so2",
            Pollutant::No2 => "no2",
            Pollutant::Pm10 => "pm10",
            Pollutant::Pm25 => "pm2_5",
        }
    }

    /// Column name the trained regression model was fitted with
    pub fn canonical_feature_name(&self) -> &'static str {
        match self {
            Pollutant::So2 => "SO2",
            Pollutant::No2 => "NO2",
            Pollutant::Pm10 => "RSPM/PM10",
            Pollutant::Pm25 => "PM 2.5",
        }
    }

    /// Resolve an identifier from any naming scheme in use.
    ///
    /// Matching ignores case and whitespace only, against a fixed alias list:
    /// `pm2_5`, `PM2.5` and `PM 2.5` resolve to [`Pollutant::Pm25`], while
    /// `pm1_0` resolves to nothing.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match fold_identifier(identifier).as_str() {
            "so2" | "sulfurdioxide" | "sulphurdioxide" => Some(Pollutant::So2),
            "no2" | "nitrogendioxide" => Some(Pollutant::No2),
            "pm10" | "rspm" | "rspm/pm10" => Some(Pollutant::Pm10),
            "pm2_5" | "pm2.5" | "pm25" | "fsp" => Some(Pollutant::Pm25),
            _ => None,
        }
    }
}

/// Lowercase an identifier and drop its whitespace
pub(crate) fn fold_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Pollutant concentrations keyed by identifier, as obtained for one request.
///
/// Keys are kept exactly as supplied; resolving them to [`Pollutant`]s is the
/// normalizer's job, so identifiers the model does not know survive until
/// then.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollutantReading {
    values: BTreeMap<String, f64>,
}

impl PollutantReading {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, identifier: impl Into<String>, concentration: f64) -> Self {
        self.values.insert(identifier.into(), concentration);
        self
    }

    pub fn get(&self, identifier: &str) -> Option<f64> {
        self.values.get(identifier).copied()
    }

    /// Look up a pollutant under any of its identifiers.
    ///
    /// Returns the first match in key order; ambiguity is checked by the
    /// normalizer, not here.
    pub fn concentration_of(&self, pollutant: Pollutant) -> Option<f64> {
        self.values
            .iter()
            .find(|(key, _)| Pollutant::from_identifier(key) == Some(pollutant))
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for PollutantReading {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// The four pollutant values shown alongside a prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollutantLevels {
    pub so2: f64,
    pub no2: f64,
    pub pm10: f64,
    pub pm25: f64,
}

impl PollutantLevels {
    /// Pick the displayed values out of a reading; absent pollutants show as 0
    pub fn from_reading(reading: &PollutantReading) -> Self {
        Self {
            so2: reading.concentration_of(Pollutant::So2).unwrap_or(0.0),
            no2: reading.concentration_of(Pollutant::No2).unwrap_or(0.0),
            pm10: reading.concentration_of(Pollutant::Pm10).unwrap_or(0.0),
            pm25: reading.concentration_of(Pollutant::Pm25).unwrap_or(0.0),
        }
    }

    pub fn to_reading(&self) -> PollutantReading {
        PollutantReading::new()
            .with(Pollutant::So2.canonical_feature_name(), self.so2)
            .with(Pollutant::No2.canonical_feature_name(), self.no2)
            .with(Pollutant::Pm10.canonical_feature_name(), self.pm10)
            .with(Pollutant::Pm25.canonical_feature_name(), self.pm25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_every_naming_scheme_resolves() {
        for pollutant in Pollutant::ALL {
            assert_eq!(Pollutant::from_identifier(pollutant.label()), Some(pollutant));
            assert_eq!(Pollutant::from_identifier(pollutant.provider_key()), Some(pollutant));
            assert_eq!(
                Pollutant::from_identifier(pollutant.canonical_feature_name()),
                Some(pollutant)
            );
        }
    }

    #[test]
    fn test_levels_default_to_zero() {
        let reading = PollutantReading::new().with("pm2_5", 12.5).with("co", 300.0);
        let levels = PollutantLevels::from_reading(&reading);
        assert_eq!(levels.pm25, 12.5);
        assert_eq!(levels.so2, 0.0);
        assert_eq!(levels.no2, 0.0);
        assert_eq!(levels.pm10, 0.0);
    }

    #[test]
    fn test_reading_keeps_keys_verbatim() {
        let reading: PollutantReading = serde_json::from_str(r#"{"PM 2.5": 30.0, "o3": 5.0}"#).unwrap();
        assert_eq!(reading.get("PM 2.5"), Some(30.0));
        assert_eq!(reading.concentration_of(Pollutant::Pm25), Some(30.0));
        assert_eq!(reading.concentration_of(Pollutant::So2), None);
        assert_eq!(reading.len(), 2);
    }

    #[test]
    fn test_pm1_is_not_pm10() {
        for identifier in ["pm1_0", "PM1.0", "PM 1.0", "pm1", "pm1-0"] {
            assert_eq!(Pollutant::from_identifier(identifier), None, "{}", identifier);
        }
    }

    proptest! {
        #[test]
        fn test_case_and_whitespace_are_ignored(
            index in 0usize..4,
            upper in any::<bool>(),
            padding in prop::sample::select(vec!["", " ", "  ", "\t"]),
        ) {
            let pollutant = Pollutant::ALL[index];
            let key = pollutant.provider_key();
            let (head, tail) = key.split_at(2);
            let mut identifier = format!("{}{}{}{}", padding, head, padding, tail);
            if upper {
                identifier = identifier.to_uppercase();
            }
            prop_assert_eq!(Pollutant::from_identifier(&identifier), Some(pollutant));
        }
    }
}
