// 🎪 Session - one distribution event's working state
//
// Pairs the animal registry with the distribution config. Created when a
// front end starts, dropped when it exits. Every front end (CLI, TUI, HTTP)
// drives the engine through this type.

use crate::allocation::{calculate, AnimalRecord, Category};
use crate::config::AppConfig;
use crate::distribution::{summarize, DistributionConfig, PublicPoolSummary};
use crate::error::SessionError;
use crate::input::{validate_submission, AnimalSubmission};
use crate::registry::{AnimalRegistry, UpsertOutcome};
use crate::report::AllocationReport;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct Session {
    registry: AnimalRegistry,
    config: DistributionConfig,
}

impl Session {
    pub fn new(config: DistributionConfig) -> Self {
        Session {
            registry: AnimalRegistry::new(),
            config,
        }
    }

    /// Session seeded with the configured default household count
    pub fn from_app_config(app_config: &AppConfig) -> Self {
        Session::new(DistributionConfig::new(app_config.default_households))
    }

    // ========================================================================
    // ANIMALS
    // ========================================================================

    /// Validate, calculate and store one submitted animal.
    ///
    /// Nothing is stored when validation fails.
    pub fn submit(&mut self, submission: &AnimalSubmission) -> Result<UpsertOutcome, SessionError> {
        let errors = validate_submission(submission);
        if !errors.is_empty() {
            return Err(SessionError::Invalid(errors));
        }

        let record = calculate(
            &submission.animal_id,
            &submission.meat_weights,
            &submission.bone_weights,
            &submission.liver_weights,
        )?;

        Ok(self.record(record))
    }

    /// Store an already calculated record
    pub fn record(&mut self, record: AnimalRecord) -> UpsertOutcome {
        let id = record.id().to_string();
        let outcome = self.registry.upsert(record);
        info!(animal = %id, outcome = outcome.as_str(), animals = self.registry.len(), "animal recorded");
        outcome
    }

    pub fn remove(&mut self, id: &str) -> Option<AnimalRecord> {
        let removed = self.registry.remove(id);
        if removed.is_some() {
            info!(animal = %id.to_uppercase(), animals = self.registry.len(), "animal removed");
        }
        removed
    }

    pub fn animals(&self) -> &[AnimalRecord] {
        self.registry.list()
    }

    pub fn animal(&self, id: &str) -> Option<&AnimalRecord> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &AnimalRegistry {
        &self.registry
    }

    // ========================================================================
    // DISTRIBUTION CONFIG
    // ========================================================================

    pub fn config(&self) -> &DistributionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DistributionConfig) {
        self.config = config;
    }

    pub fn set_household_count(&mut self, household_count: i64) {
        self.config.household_count = household_count;
    }

    pub fn set_deduction(&mut self, category: Category, amount: f64) {
        self.config.set_deduction(category, amount);
    }

    // ========================================================================
    // DERIVED VIEWS
    // ========================================================================

    /// Recomputed from the current registry and config on every call
    pub fn summary(&self) -> PublicPoolSummary {
        summarize(self.registry.list(), &self.config)
    }

    pub fn report(&self, app_config: &AppConfig) -> AllocationReport {
        AllocationReport::build(self.registry.list(), &self.summary(), app_config)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(id: &str, meat: Vec<f64>) -> AnimalSubmission {
        AnimalSubmission::new(id)
            .with_weights(Category::Meat, meat)
            .with_weights(Category::Bone, vec![3.0])
            .with_weights(Category::Liver, vec![1.5])
    }

    #[test]
    fn test_submit_then_resubmit_replaces() {
        let mut session = Session::new(DistributionConfig::new(10));

        assert_eq!(session.submit(&submission("b1", vec![30.0])), Ok(UpsertOutcome::Inserted));
        assert_eq!(session.submit(&submission("B1", vec![60.0])), Ok(UpsertOutcome::Replaced));

        assert_eq!(session.animals().len(), 1);
        assert_eq!(session.animal("b1").unwrap().totals().meat, 60.0);
    }

    #[test]
    fn test_invalid_submission_is_not_recorded() {
        let mut session = Session::default();

        let err = session.submit(&submission("", vec![0.0])).unwrap_err();
        assert_eq!(err.field_errors().len(), 2);
        assert!(session.animals().is_empty());
    }

    #[test]
    fn test_summary_tracks_latest_state() {
        let mut session = Session::new(DistributionConfig::new(4));
        session.submit(&submission("B1", vec![30.0])).unwrap();

        assert!((session.summary().per_household.meat - 5.0).abs() < 1e-9);

        session.set_deduction(Category::Meat, 8.0);
        assert!((session.summary().per_household.meat - 3.0).abs() < 1e-9);

        session.set_household_count(0);
        assert!((session.summary().per_household.meat - 12.0).abs() < 1e-9);

        session.remove("b1");
        assert_eq!(session.summary().per_household.meat, 0.0);
        assert_eq!(session.summary().animal_count, 0);
    }

    #[test]
    fn test_from_app_config_uses_default_households() {
        let session = Session::from_app_config(&AppConfig::default());
        assert_eq!(session.config().household_count, 130);
    }

    #[test]
    fn test_set_config_replaces_everything() {
        let mut session = Session::default();
        session.set_config(DistributionConfig::new(7).with_deduction(Category::Liver, 2.0));

        assert_eq!(session.config().household_count, 7);
        assert_eq!(session.config().deductions.liver, 2.0);
    }
}
