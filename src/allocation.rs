// 🐃 Allocation Calculator - one animal's weights → owner / public shares
//
// Allocation law, applied to every category independently:
//   owner  = total / 3
//   public = total * (2/3)
//
// The public figure is multiplied out on its own, never derived as
// `total - owner`, so it matches the published two-thirds rule exactly.

use crate::error::AllocationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Divisor for the owner's third
pub const OWNER_DIVISOR: f64 = 3.0;

/// Multiplier for the public two-thirds
pub const PUBLIC_FRACTION: f64 = 2.0 / 3.0;

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Meat,
    Bone,
    Liver,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 3] = [Category::Meat, Category::Bone, Category::Liver];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Meat => "Meat",
            Category::Bone => "Bone",
            Category::Liver => "Liver",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "meat" => Ok(Category::Meat),
            "bone" => Ok(Category::Bone),
            "liver" => Ok(Category::Liver),
            other => Err(format!("Unknown category: {:?}", other)),
        }
    }
}

// ============================================================================
// PER-CATEGORY VALUES
// ============================================================================

/// One kilogram figure per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmounts {
    #[serde(default)]
    pub meat: f64,
    #[serde(default)]
    pub bone: f64,
    #[serde(default)]
    pub liver: f64,
}

impl CategoryAmounts {
    pub fn new(meat: f64, bone: f64, liver: f64) -> Self {
        CategoryAmounts { meat, bone, liver }
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Meat => self.meat,
            Category::Bone => self.bone,
            Category::Liver => self.liver,
        }
    }

    pub fn set(&mut self, category: Category, value: f64) {
        match category {
            Category::Meat => self.meat = value,
            Category::Bone => self.bone = value,
            Category::Liver => self.liver = value,
        }
    }

    /// Build a new set of amounts by applying `f` to each category
    pub fn map<F>(&self, mut f: F) -> CategoryAmounts
    where
        F: FnMut(Category, f64) -> f64,
    {
        CategoryAmounts {
            meat: f(Category::Meat, self.meat),
            bone: f(Category::Bone, self.bone),
            liver: f(Category::Liver, self.liver),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub meat: f64,
    pub bone: f64,
    pub liver: f64,
    pub all: f64,
}

impl Totals {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Meat => self.meat,
            Category::Bone => self.bone,
            Category::Liver => self.liver,
        }
    }
}

/// One side of the split (owner or public)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ShareBreakdown {
    pub meat: f64,
    pub bone: f64,
    pub liver: f64,
    pub total: f64,
}

impl ShareBreakdown {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Meat => self.meat,
            Category::Bone => self.bone,
            Category::Liver => self.liver,
        }
    }

    /// Every figure divided by `parts` (used for the co-owner sub-share)
    pub fn divided_by(&self, parts: u32) -> ShareBreakdown {
        let parts = f64::from(parts.max(1));
        ShareBreakdown {
            meat: self.meat / parts,
            bone: self.bone / parts,
            liver: self.liver / parts,
            total: self.total / parts,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Shares {
    pub owner: ShareBreakdown,
    pub public: ShareBreakdown,
}

// ============================================================================
// ANIMAL RECORD
// ============================================================================

/// A fully calculated animal.
///
/// Only `calculate` builds these, so totals and shares always agree with the
/// stored weights. A resubmission produces a brand new record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimalRecord {
    id: String,
    meat_weights: Vec<f64>,
    bone_weights: Vec<f64>,
    liver_weights: Vec<f64>,
    totals: Totals,
    shares: Shares,
}

impl AnimalRecord {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Kept (strictly positive) entries for a category, in submission order
    pub fn weights(&self, category: Category) -> &[f64] {
        match category {
            Category::Meat => &self.meat_weights,
            Category::Bone => &self.bone_weights,
            Category::Liver => &self.liver_weights,
        }
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn shares(&self) -> &Shares {
        &self.shares
    }

    /// Owner share split among `co_owners` (the "1 of 7" figure).
    /// Derived on demand, never stored.
    pub fn co_owner_share(&self, co_owners: u32) -> ShareBreakdown {
        self.shares.owner.divided_by(co_owners)
    }

    /// True when no category received a valid entry
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.weights(*c).is_empty())
    }
}

// ============================================================================
// CALCULATION
// ============================================================================

/// Turn one animal's raw weight lists into a calculated record.
///
/// Entries that are not strictly positive (zero, negative, NaN, infinite)
/// are dropped before summing. An all-empty animal is valid and yields a
/// zero record.
///
/// Example:
/// ```
/// use udhiyath::calculate;
///
/// let record = calculate("b1", &[10.0, 20.0], &[5.0], &[2.0]).unwrap();
/// assert_eq!(record.id(), "B1");
/// assert_eq!(record.totals().all, 37.0);
/// assert_eq!(record.shares().owner.meat, 10.0);
/// ```
pub fn calculate(
    id: &str,
    meat_weights: &[f64],
    bone_weights: &[f64],
    liver_weights: &[f64],
) -> Result<AnimalRecord, AllocationError> {
    let id = canonical_id(id)?;

    let meat_weights = retain_positive(&id, Category::Meat, meat_weights);
    let bone_weights = retain_positive(&id, Category::Bone, bone_weights);
    let liver_weights = retain_positive(&id, Category::Liver, liver_weights);

    let meat = sum(&meat_weights);
    let bone = sum(&bone_weights);
    let liver = sum(&liver_weights);
    let all = meat + bone + liver;

    let totals = Totals { meat, bone, liver, all };

    let shares = Shares {
        owner: ShareBreakdown {
            meat: meat / OWNER_DIVISOR,
            bone: bone / OWNER_DIVISOR,
            liver: liver / OWNER_DIVISOR,
            total: all / OWNER_DIVISOR,
        },
        public: ShareBreakdown {
            meat: meat * PUBLIC_FRACTION,
            bone: bone * PUBLIC_FRACTION,
            liver: liver * PUBLIC_FRACTION,
            total: all * PUBLIC_FRACTION,
        },
    };

    debug!(animal = %id, meat, bone, liver, all, "calculated animal allocation");

    Ok(AnimalRecord {
        id,
        meat_weights,
        bone_weights,
        liver_weights,
        totals,
        shares,
    })
}

/// Upper-case an animal ID, rejecting blank or padded input
pub fn canonical_id(id: &str) -> Result<String, AllocationError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AllocationError::EmptyAnimalId);
    }
    if trimmed.len() != id.len() {
        return Err(AllocationError::UntrimmedAnimalId(id.to_string()));
    }
    Ok(id.to_uppercase())
}

/// A usable weight entry: finite and strictly positive
pub fn is_valid_weight(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0
}

fn retain_positive(id: &str, category: Category, weights: &[f64]) -> Vec<f64> {
    let kept: Vec<f64> = weights.iter().copied().filter(|w| is_valid_weight(*w)).collect();

    let dropped = weights.len() - kept.len();
    if dropped > 0 {
        warn!(animal = %id, %category, dropped, "excluded non-positive weight entries");
    }

    kept
}

// Left fold from +0.0 so an empty list sums to positive zero.
fn sum(weights: &[f64]) -> f64 {
    weights.iter().fold(0.0, |acc, w| acc + w)
}

// ============================================================================
// TESTS
// ============================================================================
