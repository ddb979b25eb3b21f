// ⚠️ Error types for the allocation engine
//
// Only identity problems are errors. Bad weights, bad household counts and
// over-deducted pools are recovered locally (filter, fallback, clamp).

use crate::input::FieldError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocationError {
    #[error("Animal ID is required")]
    EmptyAnimalId,

    #[error("Animal ID {0:?} has leading or trailing whitespace")]
    UntrimmedAnimalId(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Form-level validation failed; nothing was recorded.
    #[error("invalid submission: {}", describe_fields(.0))]
    Invalid(Vec<FieldError>),

    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

impl SessionError {
    /// Field-level messages, empty for non-validation errors
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            SessionError::Invalid(errors) => errors,
            SessionError::Allocation(_) => &[],
        }
    }
}

fn describe_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_message_lists_fields() {
        let err = SessionError::Invalid(vec![
            FieldError::new("animal_id", "Animal ID is required."),
            FieldError::new("meat_weights[0]", "Must be > 0"),
        ]);

        assert_eq!(
            err.to_string(),
            "invalid submission: animal_id: Animal ID is required.; meat_weights[0]: Must be > 0"
        );
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn test_allocation_error_is_transparent() {
        let err: SessionError = AllocationError::EmptyAnimalId.into();
        assert_eq!(err.to_string(), "Animal ID is required");
        assert!(err.field_errors().is_empty());
    }
}
