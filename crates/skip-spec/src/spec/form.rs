use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::spec::question::{QuestionId, QuestionSpec};

/// How a `skip_to_question` number is turned into a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TargetAddressing {
    /// The number is the id of the target question.
    #[default]
    Id,
    /// The number is the 1-based position of the target question.
    Ordinal,
}

/// What a forward jump hides besides the run it skips over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BranchPolicy {
    /// Only the questions strictly between the current one and the target.
    #[default]
    Linear,
    /// Also the forward targets of the rule's other, unmatched conditions.
    Exclusive,
}

/// Evaluation settings carried by a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SkipPolicy {
    #[serde(default)]
    pub addressing: TargetAddressing,
    #[serde(default)]
    pub branching: BranchPolicy,
}

/// Top-level form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_policy: Option<SkipPolicy>,
    pub questions: Vec<QuestionSpec>,
}

impl FormSpec {
    pub fn new(title: impl Into<String>, questions: Vec<QuestionSpec>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: None,
            skip_policy: None,
            questions,
        }
    }

    pub fn with_policy(mut self, policy: SkipPolicy) -> Self {
        self.skip_policy = Some(policy);
        self
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SpecError> {
        serde_json::from_str(raw).map_err(SpecError::FormParse)
    }

    /// The form's policy, or the default one when none is declared.
    pub fn policy(&self) -> SkipPolicy {
        self.skip_policy.unwrap_or_default()
    }

    pub fn question(&self, id: QuestionId) -> Option<&QuestionSpec> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.question(id).is_some()
    }
}
