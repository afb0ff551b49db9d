/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::{
    ClassifierError,
    error::Result,
    features::{SparseVector, lexical::TfidfVectorizer, meta::StandardScaler},
    sigmoid,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Ham,
    Spam,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Ham => "ham",
            Label::Spam => "spam",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = ();

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "ham" => Ok(Label::Ham),
            "spam" => Ok(Label::Spam),
            _ => Err(()),
        }
    }
}

/// Trained linear decision function: `margin = dot(weights, x) + bias`,
/// spam iff the margin is strictly positive.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LinearClassifier {
    weights: Vec<f32>,
    bias: f32,
}

impl LinearClassifier {
    pub(crate) fn new(weights: Vec<f32>, bias: f32) -> Self {
        LinearClassifier { weights, bias }
    }

    /// Scores a combined feature vector. The vector's dimensionality must
    /// match the trained weights exactly; it is never truncated or padded.
    pub fn decide(&self, features: &SparseVector) -> Result<(Label, f32)> {
        if self.weights.is_empty() {
            return Err(ClassifierError::NotFitted);
        }
        if features.dim() as usize != self.weights.len() {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.weights.len(),
                actual: features.dim() as usize,
            });
        }

        let mut z = self.bias;
        for (idx, weight) in features.entries() {
            z += self.weights[*idx as usize] * *weight;
        }

        let label = if z > 0.0 { Label::Spam } else { Label::Ham };
        Ok((label, z))
    }

    pub fn num_features(&self) -> usize {
        self.weights.len()
    }
}

/// The frozen artifact produced by training: vocabulary and IDF weights,
/// meta scaler parameters, and the classifier weights and bias. Created
/// once, consumed read-only by every inference call; retraining builds a
/// new independent model rather than mutating this one in place.
#[derive(Debug, Serialize, Deserialize)]
pub struct Model {
    pub(crate) vectorizer: TfidfVectorizer,
    pub(crate) scaler: StandardScaler,
    pub(crate) classifier: LinearClassifier,
}

impl Model {
    /// Combined feature dimensionality the classifier was trained on.
    pub fn num_features(&self) -> usize {
        self.classifier.num_features()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|err| ClassifierError::Serialization(err.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let model: Model = bincode::deserialize(bytes)
            .map_err(|err| ClassifierError::Serialization(err.to_string()))?;
        if model.classifier.weights.is_empty() || model.vectorizer.is_empty() {
            return Err(ClassifierError::NotFitted);
        }
        Ok(model)
    }
}

/// Outcome of classifying one message. Derived, never persisted.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Prediction {
    pub label: Label,
    pub margin: f32,
    pub confidence: f32,
}

/// Maps the unsigned decision margin to a confidence percentage in
/// (50, 100]: `100 * sigmoid(|margin|)`.
///
/// This is a monotone approximation of certainty, not a calibrated
/// probability; it approaches 50 for decisions on the boundary and 100 as
/// the margin grows.
pub fn confidence(margin: f32) -> f32 {
    100.0 * sigmoid(margin.abs())
}

#[cfg(test)]
mod tests {
    use super::{Label, LinearClassifier, confidence};
    use crate::{ClassifierError, features::SparseVector};

    #[test]
    fn confidence_bounds_and_monotonicity() {
        let mut previous = 50.0f32;
        for margin in [0.01f32, 0.1, 0.5, 1.0, 2.0, 10.0, 100.0] {
            for signed in [margin, -margin] {
                let c = confidence(signed);
                assert!(c > 50.0 && c <= 100.0, "margin {signed}: {c}");
            }
            let c = confidence(margin);
            assert!(c >= previous);
            previous = c;
        }
        assert!((confidence(1000.0) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let classifier = LinearClassifier::new(vec![0.5, -0.5, 0.1], 0.0);

        let short = SparseVector::new(2);
        assert!(matches!(
            classifier.decide(&short),
            Err(ClassifierError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));

        let exact = SparseVector::new(3);
        assert!(classifier.decide(&exact).is_ok());
    }

    #[test]
    fn unfitted_classifier_is_an_error() {
        let classifier = LinearClassifier::default();
        assert!(matches!(
            classifier.decide(&SparseVector::new(0)),
            Err(ClassifierError::NotFitted)
        ));
    }

    #[test]
    fn zero_margin_is_ham() {
        let classifier = LinearClassifier::new(vec![1.0], 0.0);
        let (label, margin) = classifier.decide(&SparseVector::new(1)).unwrap();
        assert_eq!(label, Label::Ham);
        assert_eq!(margin, 0.0);
    }

    #[test]
    fn label_parsing() {
        assert_eq!("spam".parse(), Ok(Label::Spam));
        assert_eq!("ham".parse(), Ok(Label::Ham));
        assert!("junk".parse::<Label>().is_err());
        assert_eq!(Label::Spam.to_string(), "spam");
    }
}
