use formflow_core::{NextStep, Predicate};
use serde::{Deserialize, Serialize};

/// A conditional transition between steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionDocument {
    /// Step being left
    pub from: String,

    /// Target step, or `$complete`
    pub to: NextStep,

    /// Condition; an omitted condition always matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Predicate>,
}
