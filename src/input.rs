// 📝 Input Boundary - raw form values → engine inputs
//
// Two layers, like the entry form this replaces:
// - lenient coercion (blank deduction = 0, bad weight = excluded)
// - strict form validation producing field-level messages
//
// The engine itself never fails on blank optional fields.

use crate::allocation::{is_valid_weight, Category};
use crate::distribution::DistributionConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// FIELD ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// ============================================================================
// LENIENT PARSING
// ============================================================================

/// Parse one weight entry. Blank, non-numeric, non-finite and `<= 0` values
/// are excluded (`None`).
pub fn parse_weight(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|w| is_valid_weight(*w))
}

/// Parse a list of weight entries, keeping only valid ones
pub fn parse_weights<S: AsRef<str>>(raw: &[S]) -> Vec<f64> {
    raw.iter().filter_map(|s| parse_weight(s.as_ref())).collect()
}

/// Parse a household count the way an integer form field reads it: the
/// leading `[+-]digits` prefix counts, anything after it is ignored.
/// Blank or garbage input gives 0, which the aggregator turns into 1.
///
/// `"130"` → 130, `" 12.7 "` → 12, `"-4"` → -4, `"abc"` → 0
pub fn parse_household_count(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    };

    if digits.is_empty() {
        return 0;
    }

    match digits.parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    }
}

/// Parse a deduction amount. Blank or garbage gives 0; negative or
/// non-finite amounts also give 0.
pub fn parse_deduction(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => amount,
        _ => 0.0,
    }
}

// ============================================================================
// ANIMAL SUBMISSION
// ============================================================================

/// One submitted animal, as it arrives from a form, a sheet or the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimalSubmission {
    pub animal_id: String,

    #[serde(default)]
    pub meat_weights: Vec<f64>,

    #[serde(default)]
    pub bone_weights: Vec<f64>,

    #[serde(default)]
    pub liver_weights: Vec<f64>,
}

impl AnimalSubmission {
    pub fn new(animal_id: impl Into<String>) -> Self {
        AnimalSubmission {
            animal_id: animal_id.into(),
            ..Default::default()
        }
    }

    /// Builder-style weights setter
    pub fn with_weights(mut self, category: Category, weights: Vec<f64>) -> Self {
        *self.weights_mut(category) = weights;
        self
    }

    pub fn weights(&self, category: Category) -> &[f64] {
        match category {
            Category::Meat => &self.meat_weights,
            Category::Bone => &self.bone_weights,
            Category::Liver => &self.liver_weights,
        }
    }

    pub fn weights_mut(&mut self, category: Category) -> &mut Vec<f64> {
        match category {
            Category::Meat => &mut self.meat_weights,
            Category::Bone => &mut self.bone_weights,
            Category::Liver => &mut self.liver_weights,
        }
    }

    pub fn entry_count(&self) -> usize {
        Category::ALL.iter().map(|c| self.weights(*c).len()).sum()
    }
}

fn weights_field(category: Category) -> &'static str {
    match category {
        Category::Meat => "meat_weights",
        Category::Bone => "bone_weights",
        Category::Liver => "liver_weights",
    }
}

/// Form rules: an animal ID is required and every entry must be `> 0`.
///
/// Returns every problem found, empty when the submission is acceptable.
pub fn validate_submission(submission: &AnimalSubmission) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let id = &submission.animal_id;
    if id.trim().is_empty() {
        errors.push(FieldError::new("animal_id", "Animal ID is required."));
    } else if id.trim() != id {
        errors.push(FieldError::new(
            "animal_id",
            "Animal ID must not start or end with spaces.",
        ));
    }

    for category in Category::ALL {
        for (index, weight) in submission.weights(category).iter().enumerate() {
            if !is_valid_weight(*weight) {
                errors.push(FieldError::new(
                    format!("{}[{}]", weights_field(category), index),
                    "Must be > 0",
                ));
            }
        }
    }

    errors
}

// ============================================================================
// DISTRIBUTION INPUT
// ============================================================================

/// Household and deduction fields exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionInput {
    #[serde(default)]
    pub households: String,

    #[serde(default)]
    pub meat_deduction: String,

    #[serde(default)]
    pub bone_deduction: String,

    #[serde(default)]
    pub liver_deduction: String,
}

impl DistributionInput {
    pub fn into_config(self) -> DistributionConfig {
        self.to_config()
    }

    pub fn to_config(&self) -> DistributionConfig {
        DistributionConfig::new(parse_household_count(&self.households))
            .with_deduction(Category::Meat, parse_deduction(&self.meat_deduction))
            .with_deduction(Category::Bone, parse_deduction(&self.bone_deduction))
            .with_deduction(Category::Liver, parse_deduction(&self.liver_deduction))
    }
}

// ============================================================================
// TESTS
// ============================================================================
