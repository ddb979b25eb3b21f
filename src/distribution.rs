// ⚖️ Public Pool Aggregator - public shares → per-household distribution
//
// For each category, independently:
//   pooled        = Σ public share over all animals
//   net           = pooled - deduction          (signed)
//   per_household = net / households  if net > 0, else 0
//   display_net   = max(0, net)
//
// The signed net is kept alongside the floored display value so the
// per-household check always sees the real sign.

use crate::allocation::{AnimalRecord, Category, CategoryAmounts};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Household count used whenever the configured count is not positive
pub const FALLBACK_HOUSEHOLDS: u64 = 1;

// ============================================================================
// DISTRIBUTION CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// Households as entered. Zero or negative falls back to 1 at summary time.
    #[serde(default = "default_household_count")]
    pub household_count: i64,

    /// Kilograms taken out of the public pool before distribution
    #[serde(default)]
    pub deductions: CategoryAmounts,
}

fn default_household_count() -> i64 {
    FALLBACK_HOUSEHOLDS as i64
}

impl DistributionConfig {
    pub fn new(household_count: i64) -> Self {
        DistributionConfig {
            household_count,
            deductions: CategoryAmounts::default(),
        }
    }

    /// Builder-style deduction setter
    pub fn with_deduction(mut self, category: Category, amount: f64) -> Self {
        self.set_deduction(category, amount);
        self
    }

    /// Set one category's deduction. Negative or non-finite amounts become 0.
    pub fn set_deduction(&mut self, category: Category, amount: f64) {
        self.deductions.set(category, clamp_deduction(category, amount));
    }

    /// Household count actually divided by
    pub fn effective_households(&self) -> u64 {
        if self.household_count > 0 {
            self.household_count as u64
        } else {
            FALLBACK_HOUSEHOLDS
        }
    }
}

/// Deductions are non-negative; anything else counts as 0
fn clamp_deduction(category: Category, amount: f64) -> f64 {
    if amount.is_finite() && amount >= 0.0 {
        amount
    } else {
        warn!(%category, amount, "deduction must be a non-negative number, using 0");
        0.0
    }
}

impl Default for DistributionConfig {
    fn default() -> Self {
        DistributionConfig::new(default_household_count())
    }
}

// ============================================================================
// PUBLIC POOL SUMMARY
// ============================================================================

/// Derived view of the public pool. Recomputed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicPoolSummary {
    pub animal_count: usize,
    pub household_count: i64,
    pub effective_households: u64,
    pub pooled: CategoryAmounts,
    pub deductions: CategoryAmounts,
    /// Signed; negative when deductions exceed the pool
    pub net: CategoryAmounts,
    pub display_net: CategoryAmounts,
    pub per_household: CategoryAmounts,
}

impl PublicPoolSummary {
    /// True when any category's deductions exceed its pool
    pub fn has_shortfall(&self) -> bool {
        Category::ALL.iter().any(|c| self.net.get(*c) < 0.0)
    }

    pub fn summary(&self) -> String {
        format!(
            "Public pool from {} animals across {} households: meat {:.2} kg, bone {:.2} kg, liver {:.2} kg per household",
            self.animal_count,
            self.effective_households,
            self.per_household.meat,
            self.per_household.bone,
            self.per_household.liver
        )
    }
}

/// Aggregate public shares, net out deductions and split across households.
///
/// Example:
/// ```
/// use udhiyath::{calculate, summarize, DistributionConfig};
///
/// let animals = vec![calculate("B1", &[30.0], &[], &[]).unwrap()];
/// let summary = summarize(&animals, &DistributionConfig::new(4));
/// assert!((summary.per_household.meat - 5.0).abs() < 1e-9);
/// ```
pub fn summarize(records: &[AnimalRecord], config: &DistributionConfig) -> PublicPoolSummary {
    // Step 1: aggregate
    let pooled = records.iter().fold(CategoryAmounts::default(), |acc, record| {
        acc.map(|category, sum| sum + record.shares().public.get(category))
    });

    // Step 2: net (signed). Deserialized or hand-built configs skip
    // `set_deduction`, so clamp again here.
    let deductions = config.deductions.map(clamp_deduction);
    let net = pooled.map(|category, pool| pool - deductions.get(category));

    // Step 3: per household, only from a positive pool
    let effective = config.effective_households();
    if config.household_count <= 0 {
        warn!(
            household_count = config.household_count,
            fallback = FALLBACK_HOUSEHOLDS,
            "household count is not positive, using fallback"
        );
    }
    let per_household = net.map(|_, pool| {
        if pool > 0.0 {
            pool / effective as f64
        } else {
            0.0
        }
    });

    // Step 4: floored view for display
    let display_net = net.map(|_, pool| if pool > 0.0 { pool } else { 0.0 });

    let summary = PublicPoolSummary {
        animal_count: records.len(),
        household_count: config.household_count,
        effective_households: effective,
        pooled,
        deductions,
        net,
        display_net,
        per_household,
    };

    if summary.has_shortfall() {
        debug!(?net, "deductions exceed the public pool in at least one category");
    }

    summary
}

// ============================================================================
// TESTS
// ============================================================================
