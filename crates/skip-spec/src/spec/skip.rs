use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answers::AnswerValue;
use crate::spec::question::QuestionId;

/// Where a matched condition sends the respondent.
///
/// On the wire a target is a bare number: `0` means the end of the form and
/// any other value names a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub enum SkipTarget {
    End,
    Question(QuestionId),
}

impl From<u64> for SkipTarget {
    fn from(raw: u64) -> Self {
        match raw {
            0 => SkipTarget::End,
            other => SkipTarget::Question(QuestionId(other)),
        }
    }
}

impl From<SkipTarget> for u64 {
    fn from(target: SkipTarget) -> Self {
        match target {
            SkipTarget::End => 0,
            SkipTarget::Question(id) => id.0,
        }
    }
}

/// One `option -> target` branch of a skip rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SkipCondition {
    pub option: String,
    #[serde(rename = "skip_to_question")]
    #[schemars(with = "u64")]
    pub target: SkipTarget,
}

impl SkipCondition {
    pub fn new(option: impl Into<String>, target: SkipTarget) -> Self {
        Self {
            option: option.into(),
            target,
        }
    }

    pub fn to_question(option: impl Into<String>, target: impl Into<QuestionId>) -> Self {
        Self::new(option, SkipTarget::Question(target.into()))
    }

    pub fn to_end(option: impl Into<String>) -> Self {
        Self::new(option, SkipTarget::End)
    }
}

/// Skip logic attached to a question.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SkipRule {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub conditions: Vec<SkipCondition>,
}

impl SkipRule {
    pub fn enabled(conditions: Vec<SkipCondition>) -> Self {
        Self {
            enabled: true,
            conditions,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// First condition, in declaration order, whose option matches the answer.
    pub fn first_match(&self, answer: &AnswerValue) -> Option<&SkipCondition> {
        self.conditions
            .iter()
            .find(|condition| answer.matches(&condition.option))
    }
}
