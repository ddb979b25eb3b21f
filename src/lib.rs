// Ud'hiyath Allocation Engine - Core Library
// Exposes the engine for use in the CLI, TUI, API server, and tests

pub mod allocation;    // Owner / public split per animal
pub mod registry;      // Keyed, sorted store of calculated animals
pub mod distribution;  // Public pool aggregation per household
pub mod session;       // One event: registry + distribution config
pub mod input;         // Raw form values and form validation
pub mod import;        // CSV weight sheets
pub mod report;        // Exported allocation report
pub mod config;        // Application config (JSON + env)
pub mod error;

#[cfg(feature = "server")]
pub mod api;           // HTTP API (axum)

// Re-export commonly used types
pub use allocation::{
    calculate, canonical_id, is_valid_weight,
    AnimalRecord, Category, CategoryAmounts, ShareBreakdown, Shares, Totals,
    OWNER_DIVISOR, PUBLIC_FRACTION,
};
pub use registry::{AnimalRegistry, UpsertOutcome};
pub use distribution::{
    summarize, DistributionConfig, PublicPoolSummary, FALLBACK_HOUSEHOLDS,
};
pub use session::Session;
pub use input::{
    parse_deduction, parse_household_count, parse_weight, parse_weights,
    validate_submission, AnimalSubmission, DistributionInput, FieldError,
};
pub use import::{
    import_into, load_weight_sheet, read_weight_sheet, record_sheet,
    ImportStats, WeightSheet,
};
pub use report::{AllocationReport, AnimalSection, DistributionSection, ShareRow};
pub use config::AppConfig;
pub use error::{AllocationError, SessionError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
