//! Contracts for external services the field client calls into.
//!
//! Document recognition (OCR) and route planning are provided by outside
//! services. Both return a suggested value with a confidence score that the
//! user confirms before it is written to a record; no implementation ships
//! with this crate.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Suggested value with a confidence in `0.0..=1.0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion<T> {
    pub value: T,
    pub confidence: f32,
}

impl<T> Suggestion<T> {
    /// Wrap a collaborator result, rejecting out-of-range confidence
    pub fn new(value: T, confidence: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::Collaborator(format!(
                "confidence must be within 0..=1, got {confidence}"
            )));
        }
        Ok(Self { value, confidence })
    }

    /// True when the suggestion may be applied without asking the user
    #[must_use]
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}

/// A stop on a field rep's tour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub customer_id: String,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Extracts text (e.g. a receipt total) from a scanned document
pub trait DocumentRecognizer {
    fn recognize(&self, raw: &[u8]) -> Result<Suggestion<String>>;
}

/// Suggests a visiting order for a set of stops
pub trait RoutePlanner {
    fn plan(&self, stops: &[Stop]) -> Result<Suggestion<Vec<Stop>>>;
}
