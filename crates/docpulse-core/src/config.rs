//! Configuration parsing
//!
//! DocPulse reads a small TOML file. Every section is optional:
//!
//! ```toml
//! [scanner]
//! company = "Acme Ltd"
//! cron_schedule = "0 6 * * *"
//!
//! [store]
//! path = "docpulse.json"
//!
//! [defaults]
//! lead_time = "Custom"
//! custom_lead_days = 45
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DocPulseError, Result};
use crate::policy::{LeadTimeClass, RenewalLeadTime};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or [`validate`](Self::validate) rejects the values.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docpulse_core::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = Config::from_file("docpulse.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// ```
    /// use docpulse_core::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = Config::from_str(r#"
    ///     [scanner]
    ///     company = "Acme"
    /// "#)?;
    /// assert_eq!(config.scanner.company.as_deref(), Some("Acme"));
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(company) = &self.scanner.company {
            if company.trim().is_empty() {
                return Err(DocPulseError::Configuration(
                    "scanner.company must not be empty".to_string(),
                ));
            }
        }
        validate_cron(&self.scanner.cron_schedule)?;
        self.defaults.lead_time()?;
        Ok(())
    }
}

/// Daily scan settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Company scanned by `run_daily_scan`; every company when unset
    #[serde(default)]
    pub company: Option<String>,
    /// Schedule handed to the external trigger (default: 06:00 daily)
    #[serde(default = "default_cron_schedule")]
    pub cron_schedule: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            company: None,
            cron_schedule: default_cron_schedule(),
        }
    }
}

fn default_cron_schedule() -> String {
    "0 6 * * *".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding the document arena (default: docpulse.json)
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("docpulse.json")
}

/// Values applied to newly registered documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_lead_time_class")]
    pub lead_time: LeadTimeClass,
    /// Only read when `lead_time` is `Custom`
    #[serde(default)]
    pub custom_lead_days: Option<i64>,
}

impl DefaultsConfig {
    pub fn lead_time(&self) -> Result<RenewalLeadTime> {
        RenewalLeadTime::resolve(self.lead_time, self.custom_lead_days)
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            lead_time: default_lead_time_class(),
            custom_lead_days: None,
        }
    }
}

fn default_lead_time_class() -> LeadTimeClass {
    LeadTimeClass::OneMonth
}

/// Shape check only: five fields, or six with seconds
fn validate_cron(expression: &str) -> Result<()> {
    let fields = expression.split_whitespace().count();
    if fields == 5 || fields == 6 {
        Ok(())
    } else {
        Err(DocPulseError::Configuration(format!(
            "cron_schedule {:?} must have 5 or 6 fields, found {}",
            expression, fields
        )))
    }
}
