use formflow_core::FieldValidation;
use serde::{Deserialize, Serialize};

/// A step of a flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDocument {
    /// Step identifier, unique within the flow
    pub id: String,

    /// Optional page title for the host's renderer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Field rules checked when the step is submitted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<FieldValidation>,
}
