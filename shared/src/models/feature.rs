//! Feature normalization: turning pollutant readings into model input rows
//!
//! The model declares an ordered list of feature names. At startup that list
//! is resolved into a [`FeatureSchema`] by matching each name to a known
//! [`Pollutant`]. Each request then runs a [`FeatureNormalizer`] over a
//! [`PollutantReading`] to build a [`FeatureVector`] with exactly those
//! features, in exactly that order.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::models::pollutant::{fold_identifier, Pollutant, PollutantReading};
use crate::validation::validate_concentration;

// ============================================================================
// Normalization Policy
// ============================================================================

/// What to do when an expected feature has no value in the reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFeaturePolicy {
    /// Insert the given value and log a data-quality warning
    FillDefault(f64),
    /// Fail the request with [`DomainError::MissingFeature`]
    Reject,
}

/// Governs how forgiving normalization is.
///
/// Interactive use keeps the fill-with-zero behaviour users expect from the
/// manual entry form; production pipelines can opt into [`strict`] so bad data
/// never reaches the model.
///
/// [`strict`]: NormalizationPolicy::strict
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationPolicy {
    pub missing: MissingFeaturePolicy,
    /// Reject negative and non-finite concentrations
    pub validate_readings: bool,
    /// Accept declared model features that match no known pollutant; such
    /// features are always filled according to `missing`
    pub allow_unmapped_features: bool,
}

impl NormalizationPolicy {
    /// Fill missing features with zero and pass values through unchecked
    pub fn permissive() -> Self {
        Self {
            missing: MissingFeaturePolicy::FillDefault(0.0),
            validate_readings: false,
            allow_unmapped_features: true,
        }
    }

    /// Fill missing features with zero but reject malformed concentrations
    pub fn interactive() -> Self {
        Self {
            missing: MissingFeaturePolicy::FillDefault(0.0),
            validate_readings: true,
            allow_unmapped_features: true,
        }
    }

    /// Reject anything incomplete or malformed
    pub fn strict() -> Self {
        Self {
            missing: MissingFeaturePolicy::Reject,
            validate_readings: true,
            allow_unmapped_features: false,
        }
    }
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self::interactive()
    }
}

// ============================================================================
// Feature Schema
// ============================================================================

/// One declared model feature and the pollutant it was matched to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSlot {
    pub name: String,
    pub pollutant: Option<Pollutant>,
}

impl FeatureSlot {
    /// Whether a reading key supplies this feature.
    ///
    /// Bound slots accept any alias of their pollutant; unbound slots accept
    /// their own name, ignoring case and whitespace.
    pub fn matches_key(&self, key: &str) -> bool {
        match self.pollutant {
            Some(pollutant) => Pollutant::from_identifier(key) == Some(pollutant),
            None => fold_identifier(key) == fold_identifier(&self.name),
        }
    }
}

/// The model's declared features, resolved against known pollutants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    slots: Vec<FeatureSlot>,
}

impl FeatureSchema {
    /// Resolve the model's declared feature names, in order.
    ///
    /// Fails if the list is empty, names a feature twice, binds two names to
    /// the same pollutant, or (unless the policy allows it) contains a name
    /// that matches no known pollutant.
    pub fn resolve<S: AsRef<str>>(
        feature_names: &[S],
        policy: &NormalizationPolicy,
    ) -> DomainResult<Self> {
        if feature_names.is_empty() {
            return Err(DomainError::InvalidSchema(
                "model declares no features".to_string(),
            ));
        }

        let mut slots: Vec<FeatureSlot> = Vec::with_capacity(feature_names.len());
        for name in feature_names {
            let name = name.as_ref();

            if slots.iter().any(|slot| slot.name == name) {
                return Err(DomainError::InvalidSchema(format!(
                    "feature '{}' is declared more than once",
                    name
                )));
            }

            let pollutant = Pollutant::from_identifier(name);
            match pollutant {
                Some(p) => {
                    if let Some(existing) = slots.iter().find(|slot| slot.pollutant == Some(p)) {
                        return Err(DomainError::InvalidSchema(format!(
                            "features '{}' and '{}' both map to {}",
                            existing.name, name, p
                        )));
                    }
                }
                None if !policy.allow_unmapped_features => {
                    return Err(DomainError::UnknownFeature(name.to_string()));
                }
                None => {
                    tracing::warn!(
                        feature = name,
                        "Model feature matches no known pollutant; it will always be default-filled"
                    );
                }
            }

            slots.push(FeatureSlot {
                name: name.to_string(),
                pollutant,
            });
        }

        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    pub fn names(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ============================================================================
// Feature Vector
// ============================================================================

/// A single named model input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub value: f64,
}

/// One model-ready row: named values in the model's declared order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    features: Vec<Feature>,
}

impl FeatureVector {
    /// Build a row from `(name, value)` pairs, keeping their order
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, f64)>) -> Self {
        Self {
            features: pairs
                .into_iter()
                .map(|(name, value)| Feature {
                    name: name.into(),
                    value,
                })
                .collect(),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.features.iter().map(|f| f.value).collect()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.features.iter().find(|f| f.name == name).map(|f| f.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// View the row as a reading again, keyed by feature name
    pub fn to_reading(&self) -> PollutantReading {
        self.features
            .iter()
            .map(|f| (f.name.clone(), f.value))
            .collect()
    }
}

// ============================================================================
// Feature Normalizer
// ============================================================================

/// Maps readings onto a resolved [`FeatureSchema`] under a
/// [`NormalizationPolicy`]
#[derive(Debug, Clone)]
pub struct FeatureNormalizer {
    schema: FeatureSchema,
    policy: NormalizationPolicy,
}

impl FeatureNormalizer {
    pub fn new(schema: FeatureSchema, policy: NormalizationPolicy) -> Self {
        Self { schema, policy }
    }

    /// Resolve the model's declared names and build a normalizer for them
    pub fn for_features<S: AsRef<str>>(
        feature_names: &[S],
        policy: NormalizationPolicy,
    ) -> DomainResult<Self> {
        let schema = FeatureSchema::resolve(feature_names, &policy)?;
        Ok(Self::new(schema, policy))
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn policy(&self) -> &NormalizationPolicy {
        &self.policy
    }

    /// Build the model input row for one reading.
    ///
    /// Reading entries the schema does not ask for are dropped without being
    /// inspected.
    pub fn normalize(&self, reading: &PollutantReading) -> DomainResult<FeatureVector> {
        let mut features = Vec::with_capacity(self.schema.len());

        for slot in self.schema.slots() {
            let value = Self::lookup(reading, slot)?;

            let value = match (value, self.policy.missing) {
                (Some(v), _) => {
                    if self.policy.validate_readings {
                        validate_concentration(v)
                            .map_err(|reason| DomainError::invalid_reading(&slot.name, reason))?;
                    }
                    v
                }
                (None, MissingFeaturePolicy::FillDefault(default)) => {
                    tracing::warn!(
                        feature = %slot.name,
                        default,
                        "Reading has no value for model feature; filling default"
                    );
                    default
                }
                (None, MissingFeaturePolicy::Reject) => {
                    return Err(DomainError::MissingFeature(slot.name.clone()));
                }
            };

            features.push(Feature {
                name: slot.name.clone(),
                value,
            });
        }

        Ok(FeatureVector { features })
    }

    fn lookup(reading: &PollutantReading, slot: &FeatureSlot) -> DomainResult<Option<f64>> {
        let mut matches = reading.iter().filter(|(key, _)| slot.matches_key(key));

        let first = matches.next();
        if let (Some((first_key, _)), Some((second_key, _))) = (first, matches.next()) {
            let feature = slot.pollutant.map_or(slot.name.as_str(), |p| p.label());
            return Err(DomainError::invalid_reading(
                feature,
                format!("supplied as both '{}' and '{}'", first_key, second_key),
            ));
        }

        Ok(first.map(|(_, value)| value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_features() -> Vec<&'static str> {
        vec!["SO2", "NO2", "RSPM/PM10", "PM 2.5"]
    }

    #[test]
    fn test_resolve_binds_canonical_names() {
        let schema =
            FeatureSchema::resolve(&model_features(), &NormalizationPolicy::strict()).unwrap();
        let bound: Vec<Option<Pollutant>> = schema.slots().iter().map(|s| s.pollutant).collect();
        assert_eq!(
            bound,
            vec![
                Some(Pollutant::So2),
                Some(Pollutant::No2),
                Some(Pollutant::Pm10),
                Some(Pollutant::Pm25),
            ]
        );
    }

    #[test]
    fn test_resolve_rejects_empty_and_duplicates() {
        let policy = NormalizationPolicy::interactive();
        let empty: Vec<&str> = Vec::new();
        assert!(matches!(
            FeatureSchema::resolve(&empty, &policy),
            Err(DomainError::InvalidSchema(_))
        ));
        assert!(matches!(
            FeatureSchema::resolve(&["SO2", "SO2"], &policy),
            Err(DomainError::InvalidSchema(_))
        ));
        assert!(matches!(
            FeatureSchema::resolve(&["PM10", "RSPM/PM10"], &policy),
            Err(DomainError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_unmapped_feature_follows_policy() {
        let names = ["SO2", "CO"];
        let lenient = FeatureSchema::resolve(&names, &NormalizationPolicy::interactive()).unwrap();
        assert_eq!(lenient.slots()[1].pollutant, None);

        assert_eq!(
            FeatureSchema::resolve(&names, &NormalizationPolicy::strict()),
            Err(DomainError::UnknownFeature("CO".to_string()))
        );
    }

    #[test]
    fn test_unmapped_feature_ignores_case() {
        let normalizer =
            FeatureNormalizer::for_features(&["CO", "SO2"], NormalizationPolicy::interactive())
                .unwrap();

        let reading = PollutantReading::new().with("CO", 0.4).with("so2", 3.0);
        assert_eq!(normalizer.normalize(&reading).unwrap().values(), vec![0.4, 3.0]);

        let provider = PollutantReading::new().with("co", 1041.41).with("so2", 3.0);
        assert_eq!(
            normalizer.normalize(&provider).unwrap().values(),
            vec![1041.41, 3.0]
        );

        let ambiguous = PollutantReading::new().with("co", 1.0).with("CO", 2.0);
        assert!(matches!(
            normalizer.normalize(&ambiguous),
            Err(DomainError::InvalidReading { .. })
        ));
    }

    #[test]
    fn test_pm1_does_not_fill_pm10() {
        let normalizer =
            FeatureNormalizer::for_features(&model_features(), NormalizationPolicy::interactive())
                .unwrap();

        let without_pm10 = PollutantReading::new()
            .with("so2", 5.0)
            .with("no2", 15.0)
            .with("pm2_5", 25.0)
            .with("pm1_0", 7.0);
        assert_eq!(
            normalizer.normalize(&without_pm10).unwrap().values(),
            vec![5.0, 15.0, 0.0, 25.0]
        );

        let with_pm10 = without_pm10.with("pm10", 40.0);
        assert_eq!(
            normalizer.normalize(&with_pm10).unwrap().values(),
            vec![5.0, 15.0, 40.0, 25.0]
        );
    }

    #[test]
    fn test_ambiguous_reading_rejected() {
        let normalizer =
            FeatureNormalizer::for_features(&model_features(), NormalizationPolicy::permissive())
                .unwrap();
        let reading = PollutantReading::new().with("pm10", 40.0).with("PM10", 41.0);
        assert!(matches!(
            normalizer.normalize(&reading),
            Err(DomainError::InvalidReading { .. })
        ));
    }

    #[test]
    fn test_unused_fields_are_not_validated() {
        let normalizer =
            FeatureNormalizer::for_features(&["SO2"], NormalizationPolicy::strict()).unwrap();
        let reading = PollutantReading::new().with("so2", 1.0).with("co", -5.0);
        assert_eq!(normalizer.normalize(&reading).unwrap().values(), vec![1.0]);
    }

    #[test]
    fn test_custom_fill_value() {
        let policy = NormalizationPolicy {
            missing: MissingFeaturePolicy::FillDefault(-1.0),
            ..NormalizationPolicy::permissive()
        };
        let normalizer = FeatureNormalizer::for_features(&["SO2", "NO2"], policy).unwrap();
        let row = normalizer
            .normalize(&PollutantReading::new().with("no2", 7.0))
            .unwrap();
        assert_eq!(row.values(), vec![-1.0, 7.0]);
    }
}
