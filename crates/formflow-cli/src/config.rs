//! Configuration for the formflow CLI
//!
//! Defaults can be overridden from the environment.

use formflow_core::{ProgressionConfig, StepDataMerge};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit JSON logs instead of pretty ones
    #[serde(default)]
    pub json_logs: bool,

    /// Submission progression settings used by `simulate`
    #[serde(default)]
    pub progression: ProgressionConfig,

    /// Environment values that were ignored, reported once logging is up
    #[serde(skip)]
    pub rejected: Vec<String>,
}

fn default_log_filter() -> String {
    "warn,formflow=info".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json_logs: false,
            progression: ProgressionConfig::default(),
            rejected: Vec::new(),
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(filter) = lookup("FORMFLOW_LOG_FILTER") {
            config.log_filter = filter;
        }

        if let Some(json_logs) = lookup("FORMFLOW_JSON_LOGS") {
            match parse_flag(&json_logs) {
                Some(value) => config.json_logs = value,
                None => config.reject("FORMFLOW_JSON_LOGS", &json_logs),
            }
        }

        if let Some(enforce) = lookup("FORMFLOW_ENFORCE_CURRENT_STEP") {
            match parse_flag(&enforce) {
                Some(value) => config.progression.enforce_current_step = value,
                None => config.reject("FORMFLOW_ENFORCE_CURRENT_STEP", &enforce),
            }
        }

        if let Some(merge) = lookup("FORMFLOW_STEP_DATA_MERGE") {
            match merge.parse::<StepDataMerge>() {
                Ok(value) => config.progression.step_data_merge = value,
                Err(_) => config.reject("FORMFLOW_STEP_DATA_MERGE", &merge),
            }
        }

        config
    }

    /// Log the ignored environment values
    pub fn warn_rejected(&self) {
        for message in &self.rejected {
            warn!("{}", message);
        }
    }

    fn reject(&mut self, key: &str, value: &str) {
        self.rejected.push(format!("Invalid {} value: {}", key, value));
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
