// 📄 Allocation Report - the exported summary of an event
//
// Per animal: owner / public / total table and the co-owner sub-share.
// Global: households, deductions, net public pool, per-household amounts.
//
// Numbers are stored at full precision; only `render_text` rounds
// (two decimals, kilograms).

use crate::allocation::{AnimalRecord, Category, CategoryAmounts, ShareBreakdown};
use crate::config::AppConfig;
use crate::distribution::PublicPoolSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

// ============================================================================
// REPORT SECTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    pub label: String,
    pub owner: f64,
    pub public: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimalSection {
    pub id: String,
    pub rows: Vec<ShareRow>,
    pub total: ShareRow,
    pub co_owners: u32,
    pub co_owner_share: ShareBreakdown,
}

impl AnimalSection {
    pub fn from_record(record: &AnimalRecord, co_owners: u32) -> Self {
        let shares = record.shares();
        let totals = record.totals();

        let rows = Category::ALL
            .iter()
            .map(|c| ShareRow {
                label: c.as_str().to_string(),
                owner: shares.owner.get(*c),
                public: shares.public.get(*c),
                total: totals.get(*c),
            })
            .collect();

        AnimalSection {
            id: record.id().to_string(),
            rows,
            total: ShareRow {
                label: "TOTAL".to_string(),
                owner: shares.owner.total,
                public: shares.public.total,
                total: totals.all,
            },
            co_owners,
            co_owner_share: record.co_owner_share(co_owners),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Animal Summary: {}", self.id);
        let _ = writeln!(
            out,
            "{:<10}{:>16}{:>16}{:>16}",
            "Category", "Owner's Share", "Public Share", "Total Weight"
        );
        for row in self.rows.iter().chain(std::iter::once(&self.total)) {
            let _ = writeln!(
                out,
                "{:<10}{:>16}{:>16}{:>16}",
                row.label,
                kg(row.owner),
                kg(row.public),
                kg(row.total)
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Individual Owner's Share (1 of {}):", self.co_owners);
        for category in Category::ALL {
            let _ = writeln!(
                out,
                "  {:<8}{:>14}",
                category.as_str(),
                kg(self.co_owner_share.get(category))
            );
        }
        let _ = writeln!(out, "  {:<8}{:>14}", "Total", kg(self.co_owner_share.total));

        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSection {
    /// As entered, before the fallback
    pub households: i64,
    pub effective_households: u64,
    pub deductions: CategoryAmounts,
    /// Floored at zero
    pub net_pool: CategoryAmounts,
    pub per_household: CategoryAmounts,
}

impl DistributionSection {
    pub fn from_summary(summary: &PublicPoolSummary) -> Self {
        DistributionSection {
            households: summary.household_count,
            effective_households: summary.effective_households,
            deductions: summary.deductions,
            net_pool: summary.display_net,
            per_household: summary.per_household,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Public Distribution Summary");
        let _ = writeln!(out, "  {:<20}{:>14}", "Total Households", self.households);
        for category in Category::ALL {
            let _ = writeln!(
                out,
                "  {:<20}{:>14}",
                format!("{} Deducted", category.as_str()),
                kg(self.deductions.get(category))
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Net Public Pool");
        for category in Category::ALL {
            let _ = writeln!(out, "  {:<20}{:>14}", category.as_str(), kg(self.net_pool.get(category)));
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Distribution per Household");
        for category in Category::ALL {
            let _ = writeln!(
                out,
                "  {:<20}{:>14}",
                category.as_str(),
                kg(self.per_household.get(category))
            );
        }

        out
    }
}

// ============================================================================
// ALLOCATION REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationReport {
    pub report_id: String,
    pub title: String,
    pub event_name: String,
    pub generated_at: DateTime<Utc>,
    pub animals: Vec<AnimalSection>,
    /// Absent when no animal has been recorded
    pub distribution: Option<DistributionSection>,
}

impl AllocationReport {
    pub fn build(records: &[AnimalRecord], summary: &PublicPoolSummary, config: &AppConfig) -> Self {
        let animals = records
            .iter()
            .map(|r| AnimalSection::from_record(r, config.co_owners))
            .collect::<Vec<_>>();

        let distribution = if animals.is_empty() {
            None
        } else {
            Some(DistributionSection::from_summary(summary))
        };

        AllocationReport {
            report_id: uuid::Uuid::new_v4().to_string(),
            title: config.report_title.clone(),
            event_name: config.event_name.clone(),
            generated_at: Utc::now(),
            animals,
            distribution,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}", "=".repeat(self.title.chars().count()));
        let _ = writeln!(out, "Event: {}", self.event_name);
        let _ = writeln!(out, "Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
        let _ = writeln!(out, "Report ID: {}", self.report_id);

        if self.animals.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "No animals recorded.");
            return out;
        }

        for section in &self.animals {
            let _ = writeln!(out);
            out.push_str(&section.render_text());
        }

        if let Some(distribution) = &self.distribution {
            let _ = writeln!(out);
            out.push_str(&distribution.render_text());
        }

        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Two-decimal kilograms
pub fn kg(weight: f64) -> String {
    format!("{:.2} kg", weight)
}

// ============================================================================
// TESTS
// ============================================================================
