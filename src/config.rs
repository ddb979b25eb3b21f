// ⚙️ Application Config - event settings loaded from JSON
//
// Resolution order:
//   1. explicit path (e.g. --config)
//   2. UDHIYATH_CONFIG environment variable
//   3. built-in defaults
// then UDHIYATH_HOUSEHOLDS overrides the default household count.

use anyhow::{bail, Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_ENV: &str = "UDHIYATH_CONFIG";
pub const HOUSEHOLDS_ENV: &str = "UDHIYATH_HOUSEHOLDS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_event_name")]
    pub event_name: String,

    /// Heading of the exported report
    #[serde(default = "default_report_title")]
    pub report_title: String,

    /// Household count a fresh session starts with
    #[serde(default = "default_households")]
    pub default_households: i64,

    /// Co-owners sharing one owner's third (the "1 of 7" figure)
    #[serde(default = "default_co_owners")]
    pub co_owners: u32,

    /// Bind address for the HTTP server
    #[serde(default = "default_server_addr")]
    pub server_addr: String,
}

fn default_event_name() -> String {
    "Ud'hiyath".to_string()
}

fn default_report_title() -> String {
    "Ud'hiyath Allocation Report".to_string()
}

fn default_households() -> i64 {
    130
}

fn default_co_owners() -> u32 {
    7
}

fn default_server_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            event_name: default_event_name(),
            report_title: default_report_title(),
            default_households: default_households(),
            co_owners: default_co_owners(),
            server_addr: default_server_addr(),
        }
    }
}

impl AppConfig {
    /// Load config from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config = AppConfig::from_json(&content)
            .with_context(|| format!("Invalid config file: {:?}", path.as_ref()))?;

        debug!(path = ?path.as_ref(), "loaded config file");
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: AppConfig =
            serde_json::from_str(content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config from an explicit path, the environment, or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match path {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply UDHIYATH_HOUSEHOLDS if it holds an integer
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = env::var(HOUSEHOLDS_ENV) {
            self.apply_households_override(&raw);
        }
    }

    fn apply_households_override(&mut self, raw: &str) {
        match raw.trim().parse::<i64>() {
            Ok(households) => self.default_households = households,
            Err(_) => warn!(value = %raw, "ignoring {}: not an integer", HOUSEHOLDS_ENV),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.co_owners == 0 {
            bail!("co_owners must be at least 1");
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
