//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::{StepValues, SubmissionData};
use crate::CoreError;

/// How accepted step input is combined with data already stored for that step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDataMerge {
    /// New fields overwrite old fields of the same step; others are kept
    #[default]
    Merge,
    /// The submitted fields replace the step's data entirely
    Replace,
}

impl StepDataMerge {
    /// Store `values` for `step_id` in `data`
    pub fn apply(self, data: &mut SubmissionData, step_id: &str, values: StepValues) {
        match self {
            StepDataMerge::Merge => data.merge_step(step_id, values),
            StepDataMerge::Replace => data.replace_step(step_id, values),
        }
    }
}

impl FromStr for StepDataMerge {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" => Ok(StepDataMerge::Merge),
            "replace" => Ok(StepDataMerge::Replace),
            other => Err(CoreError::ConfigurationError(format!(
                "Unknown step data merge mode: {}",
                other
            ))),
        }
    }
}

/// Settings of the submission progression state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Reject submissions for any step other than the current one
    #[serde(default = "default_enforce_current_step")]
    pub enforce_current_step: bool,

    /// How accepted input is stored
    #[serde(default)]
    pub step_data_merge: StepDataMerge,
}

fn default_enforce_current_step() -> bool {
    true
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            enforce_current_step: default_enforce_current_step(),
            step_data_merge: StepDataMerge::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: ProgressionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ProgressionConfig::default());
        assert!(config.enforce_current_step);
        assert_eq!(config.step_data_merge, StepDataMerge::Merge);
    }

    #[test]
    fn test_apply_modes() {
        let first = serde_json::json!({"name": "Ada", "age": "17"});
        let second = serde_json::json!({"age": "18"});

        let mut merged = SubmissionData::new();
        StepDataMerge::Merge.apply(&mut merged, "p", first.as_object().cloned().unwrap());
        StepDataMerge::Merge.apply(&mut merged, "p", second.as_object().cloned().unwrap());
        assert_eq!(merged.step("p").map(|v| v.len()), Some(2));

        let mut replaced = merged.clone();
        StepDataMerge::Replace.apply(&mut replaced, "p", second.as_object().cloned().unwrap());
        assert_eq!(replaced.step("p").map(|v| v.len()), Some(1));
    }

    #[test]
    fn test_merge_mode_parsing() {
        assert_eq!("Replace".parse::<StepDataMerge>().unwrap(), StepDataMerge::Replace);
        assert_eq!(" merge ".parse::<StepDataMerge>().unwrap(), StepDataMerge::Merge);
        assert!(matches!(
            "append".parse::<StepDataMerge>(),
            Err(CoreError::ConfigurationError(_))
        ));
    }
}
