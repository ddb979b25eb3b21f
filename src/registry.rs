// 📋 Animal Registry - calculated animals keyed by ID
//
// "Animal ID is IDENTITY, weights are VALUES"
//
// - One record per ID; a resubmission replaces the record in place
// - Listing order is byte-wise lexicographic on ID ("B10" before "B2")
// - No versions are kept; the event only needs the latest numbers

use crate::allocation::AnimalRecord;
use serde::Serialize;
use tracing::debug;

// ============================================================================
// UPSERT OUTCOME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    /// New ID, appended and re-sorted
    Inserted,

    /// Existing ID, replaced at its current position
    Replaced,
}

impl UpsertOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertOutcome::Inserted => "inserted",
            UpsertOutcome::Replaced => "replaced",
        }
    }
}

// ============================================================================
// ANIMAL REGISTRY
// ============================================================================

/// Ordered, keyed store of calculated animals for one event.
///
/// Constructed by the caller and passed around explicitly; there is no
/// process-wide instance.
#[derive(Debug, Clone, Default)]
pub struct AnimalRegistry {
    records: Vec<AnimalRecord>,
}

impl AnimalRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        AnimalRegistry { records: Vec::new() }
    }

    /// Insert or replace a record by ID
    pub fn upsert(&mut self, record: AnimalRecord) -> UpsertOutcome {
        if let Some(index) = self.position(record.id()) {
            debug!(animal = %record.id(), index, "replacing animal record");
            self.records[index] = record;
            return UpsertOutcome::Replaced;
        }

        debug!(animal = %record.id(), "registering new animal record");
        self.records.push(record);
        self.records.sort_by(|a, b| a.id().cmp(b.id()));
        UpsertOutcome::Inserted
    }

    /// Find a record by ID (case-insensitive)
    pub fn get(&self, id: &str) -> Option<&AnimalRecord> {
        self.position(&id.to_uppercase()).map(|i| &self.records[i])
    }

    /// Remove a record by ID (case-insensitive)
    pub fn remove(&mut self, id: &str) -> Option<AnimalRecord> {
        let index = self.position(&id.to_uppercase())?;
        debug!(animal = %id, "removing animal record");
        Some(self.records.remove(index))
    }

    /// All records in listing order
    pub fn list(&self) -> &[AnimalRecord] {
        &self.records
    }

    /// IDs in listing order
    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    fn position(&self, canonical_id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == canonical_id)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::calculate;

    fn animal(id: &str, meat: f64) -> AnimalRecord {
        calculate(id, &[meat], &[1.0], &[0.5]).unwrap()
    }

    #[test]
    fn test_registry_starts_empty() {
        let registry = AnimalRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_lexicographic_ordering() {
        let mut registry = AnimalRegistry::new();
        registry.upsert(animal("B10", 1.0));
        registry.upsert(animal("B2", 1.0));
        registry.upsert(animal("B1", 1.0));

        assert_eq!(registry.ids(), vec!["B1", "B10", "B2"]);
    }

    #[test]
    fn test_upsert_same_input_twice_keeps_one_record() {
        let mut registry = AnimalRegistry::new();

        assert_eq!(registry.upsert(animal("B1", 10.0)), UpsertOutcome::Inserted);
        assert_eq!(registry.upsert(animal("B1", 10.0)), UpsertOutcome::Replaced);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("B1"), Some(&animal("B1", 10.0)));
    }

    #[test]
    fn test_length_never_exceeds_distinct_ids() {
        let mut registry = AnimalRegistry::new();
        let submissions = ["B1", "b1", "B2", "B3", "b2", "B1", "B3", "B10"];

        for (i, id) in submissions.iter().enumerate() {
            registry.upsert(animal(id, i as f64 + 1.0));
        }

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.ids(), vec!["B1", "B10", "B2", "B3"]);
    }

    #[test]
    fn test_replace_preserves_position_and_values() {
        let mut registry = AnimalRegistry::new();
        registry.upsert(animal("B1", 1.0));
        registry.upsert(animal("B2", 2.0));
        registry.upsert(animal("B3", 3.0));

        registry.upsert(animal("B2", 99.0));

        assert_eq!(registry.ids(), vec!["B1", "B2", "B3"]);
        assert_eq!(registry.get("B2").unwrap().totals().meat, 99.0);
        assert_eq!(registry.list()[1].totals().meat, 99.0);
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let mut registry = AnimalRegistry::new();
        registry.upsert(animal("b4", 4.0));

        assert!(registry.contains("b4"));
        assert!(registry.contains("B4"));
        assert!(registry.get("B5").is_none());
    }

    #[test]
    fn test_remove() {
        let mut registry = AnimalRegistry::new();
        registry.upsert(animal("B1", 1.0));
        registry.upsert(animal("B2", 2.0));

        let removed = registry.remove("b1").unwrap();
        assert_eq!(removed.id(), "B1");
        assert_eq!(registry.ids(), vec!["B2"]);
        assert!(registry.remove("B1").is_none());

        registry.clear();
        assert!(registry.is_empty());
    }
}
