// 📥 Weight Sheet Import - CSV → animal submissions
//
// Sheet format (one row per cut/batch):
//   animal_id,category,weight
//   B1,meat,10.5
//   B1,bone,4
//   b2,Liver,1.25
//
// Rows group by upper-cased animal ID in first-seen order. Weights go
// through the same lenient parsing as the entry form: unusable entries are
// skipped, not fatal. An unknown category or a blank ID is fatal.

use crate::allocation::Category;
use crate::input::{parse_weight, AnimalSubmission};
use crate::registry::UpsertOutcome;
use crate::session::Session;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct WeightRow {
    animal_id: String,
    category: String,
    #[serde(default)]
    weight: String,
}

/// Parsed weight sheet, grouped per animal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightSheet {
    pub submissions: Vec<AnimalSubmission>,
    pub rows_read: usize,
    pub entries_skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub rows_read: usize,
    pub entries_skipped: usize,
    pub inserted: usize,
    pub replaced: usize,
}

impl ImportStats {
    pub fn animals(&self) -> usize {
        self.inserted + self.replaced
    }
}

/// Read a weight sheet from disk
pub fn load_weight_sheet(csv_path: &Path) -> Result<WeightSheet> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open weight sheet: {:?}", csv_path))?;
    read_weight_sheet(file)
}

/// Read a weight sheet from any reader (headers required)
pub fn read_weight_sheet<R: Read>(reader: R) -> Result<WeightSheet> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut sheet = WeightSheet::default();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    for (i, result) in rdr.deserialize::<WeightRow>().enumerate() {
        // Header is line 1
        let line = i + 2;
        let row = result.with_context(|| format!("Failed to deserialize weight sheet line {}", line))?;
        sheet.rows_read += 1;

        if row.animal_id.is_empty() {
            bail!("Line {}: animal_id is required", line);
        }

        let category: Category = row
            .category
            .parse()
            .map_err(|e: String| anyhow!("Line {}: {}", line, e))?;

        let id = row.animal_id.to_uppercase();
        let index = *index_by_id.entry(id.clone()).or_insert_with(|| {
            sheet.submissions.push(AnimalSubmission::new(id.clone()));
            sheet.submissions.len() - 1
        });

        match parse_weight(&row.weight) {
            Some(weight) => sheet.submissions[index].weights_mut(category).push(weight),
            None => {
                sheet.entries_skipped += 1;
                warn!(line, animal = %id, %category, weight = %row.weight, "skipping unusable weight entry");
            }
        }
    }

    Ok(sheet)
}

/// Load a weight sheet and record every animal into the session
pub fn import_into(session: &mut Session, csv_path: &Path) -> Result<ImportStats> {
    let sheet = load_weight_sheet(csv_path)?;
    let stats = record_sheet(session, sheet)?;

    info!(
        path = ?csv_path,
        rows = stats.rows_read,
        animals = stats.animals(),
        skipped = stats.entries_skipped,
        "imported weight sheet"
    );

    Ok(stats)
}

/// Record an already parsed sheet into the session
pub fn record_sheet(session: &mut Session, sheet: WeightSheet) -> Result<ImportStats> {
    let mut stats = ImportStats {
        rows_read: sheet.rows_read,
        entries_skipped: sheet.entries_skipped,
        ..Default::default()
    };

    for submission in &sheet.submissions {
        let outcome = session
            .submit(submission)
            .with_context(|| format!("Failed to record animal {}", submission.animal_id))?;

        match outcome {
            UpsertOutcome::Inserted => stats.inserted += 1,
            UpsertOutcome::Replaced => stats.replaced += 1,
        }
    }

    Ok(stats)
}

// ============================================================================
// TESTS
// ============================================================================
