use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::skip::SkipRule;

/// Stable identifier of a question within a form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct QuestionId(pub u64);

impl QuestionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for QuestionId {
    fn from(value: u64) -> Self {
        QuestionId(value)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QuestionId {
    type Err = std::num::ParseIntError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim().parse::<u64>().map(QuestionId)
    }
}

/// Input widget used to collect the answer.
///
/// The evaluator ignores the type; it only shapes the submitted answer
/// (`checkbox` answers arrive as a list, everything else as a single value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    Text,
    Textarea,
    Email,
    Phone,
    Number,
    Date,
    Radio,
    Select,
    Checkbox,
}

impl QuestionType {
    /// Exactly one option may be picked.
    pub fn is_single_choice(self) -> bool {
        matches!(self, QuestionType::Radio | QuestionType::Select)
    }
}

/// A single question of a form.
///
/// Its position is its index in [`crate::FormSpec::questions`]; no separate
/// ordering field is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    pub id: QuestionId,
    #[serde(rename = "question_text", default)]
    pub text: String,
    #[serde(rename = "question_type", default)]
    pub kind: QuestionType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_logic: Option<SkipRule>,
}

impl QuestionSpec {
    pub fn new(id: impl Into<QuestionId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind: QuestionType::default(),
            required: false,
            options: Vec::new(),
            skip_logic: None,
        }
    }

    pub fn with_kind(mut self, kind: QuestionType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_skip_logic(mut self, rule: SkipRule) -> Self {
        self.skip_logic = Some(rule);
        self
    }

    /// The rule to evaluate, if one is present and enabled.
    pub fn active_rule(&self) -> Option<&SkipRule> {
        self.skip_logic.as_ref().filter(|rule| rule.enabled)
    }
}
