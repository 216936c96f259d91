//! Regression model interface and the linear model artifact

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::models::feature::FeatureVector;

/// A trained model that predicts AQI from one feature row
pub trait AqiModel: Send + Sync {
    /// Feature names in the order the model was fitted with
    fn feature_names(&self) -> &[String];

    /// Predict AQI for a row whose names and order match [`feature_names`]
    ///
    /// [`feature_names`]: AqiModel::feature_names
    fn predict(&self, features: &FeatureVector) -> DomainResult<f64>;
}

/// Ordinary least squares model exported as JSON
///
/// ```json
/// { "feature_names": ["SO2", "NO2", "RSPM/PM10", "PM 2.5"],
///   "coefficients": [0.12, 0.31, 0.42, 1.05],
///   "intercept": 4.8 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressionModel {
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressionModel {
    pub fn new(
        feature_names: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
    ) -> DomainResult<Self> {
        let model = Self {
            feature_names,
            coefficients,
            intercept,
        };
        model.check()?;
        Ok(model)
    }

    /// Parse and check a JSON model artifact
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| DomainError::InvalidModel(format!("Failed to parse model: {}", e)))?;
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> DomainResult<()> {
        if self.feature_names.is_empty() {
            return Err(DomainError::InvalidModel("model has no features".to_string()));
        }
        if self.feature_names.len() != self.coefficients.len() {
            return Err(DomainError::InvalidModel(format!(
                "{} feature names but {} coefficients",
                self.feature_names.len(),
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(DomainError::InvalidModel(
                "model parameters must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl AqiModel for LinearRegressionModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &FeatureVector) -> DomainResult<f64> {
        let names = features.names();
        if names.len() != self.feature_names.len()
            || names.iter().zip(&self.feature_names).any(|(a, b)| *a != b.as_str())
        {
            return Err(DomainError::FeatureMismatch {
                expected: self.feature_names.clone(),
                actual: names.into_iter().map(String::from).collect(),
            });
        }

        let dot: f64 = features
            .iter()
            .zip(&self.coefficients)
            .map(|(feature, coef)| feature.value * coef)
            .sum();
        Ok(self.intercept + dot)
    }
}
