use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SpecError;
use crate::spec::question::QuestionId;

/// A submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Free text or the single option picked.
    Scalar(String),
    /// Every option picked on a multi-select question.
    Multi(Vec<String>),
}

impl AnswerValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        AnswerValue::Scalar(value.into())
    }

    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AnswerValue::Multi(values.into_iter().map(Into::into).collect())
    }

    /// Equality for scalars, membership for multi-select answers.
    pub fn matches(&self, option: &str) -> bool {
        match self {
            AnswerValue::Scalar(value) => value == option,
            AnswerValue::Multi(values) => values.iter().any(|value| value == option),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Scalar(value) => value.is_empty(),
            AnswerValue::Multi(values) => values.is_empty(),
        }
    }

    /// The picked literals, one element for a scalar.
    pub fn as_slice(&self) -> &[String] {
        match self {
            AnswerValue::Scalar(value) => std::slice::from_ref(value),
            AnswerValue::Multi(values) => values,
        }
    }

    /// Decodes a raw JSON answer.
    ///
    /// Strings become scalars and arrays become multi-select answers (non-string
    /// elements are dropped). Anything else yields `None`, which callers treat
    /// as "not answered".
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(AnswerValue::Scalar(text.clone())),
            Value::Array(items) => Some(AnswerValue::Multi(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            )),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            AnswerValue::Scalar(value) => Value::String(value.clone()),
            AnswerValue::Multi(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Scalar(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Scalar(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(values: Vec<String>) -> Self {
        AnswerValue::Multi(values)
    }
}

/// Answers collected so far, keyed by question id.
///
/// On the wire this is a JSON object whose keys are decimal question ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct AnswerSet {
    values: BTreeMap<QuestionId, AnswerValue>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<QuestionId>, value: impl Into<AnswerValue>) -> Self {
        self.insert(id, value);
        self
    }

    pub fn insert(&mut self, id: impl Into<QuestionId>, value: impl Into<AnswerValue>) {
        self.values.insert(id.into(), value.into());
    }

    pub fn remove(&mut self, id: QuestionId) -> Option<AnswerValue> {
        self.values.remove(&id)
    }

    /// The stored value, even when it is empty.
    pub fn get(&self, id: QuestionId) -> Option<&AnswerValue> {
        self.values.get(&id)
    }

    /// The stored value if it counts as an answer (empty values do not).
    pub fn answered(&self, id: QuestionId) -> Option<&AnswerValue> {
        self.get(id).filter(|value| !value.is_empty())
    }

    pub fn is_answered(&self, id: QuestionId) -> bool {
        self.answered(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &AnswerValue)> {
        self.values.iter().map(|(id, value)| (*id, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SpecError> {
        let value: Value = serde_json::from_str(raw).map_err(SpecError::AnswersParse)?;
        Self::from_json_value(&value)
    }

    pub fn from_json_value(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            Value::Null => Err(SpecError::AnswersShape("null")),
            Value::Bool(_) => Err(SpecError::AnswersShape("boolean")),
            Value::Number(_) => Err(SpecError::AnswersShape("number")),
            Value::String(_) => Err(SpecError::AnswersShape("string")),
            Value::Array(_) => Err(SpecError::AnswersShape("array")),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let mut values = BTreeMap::new();
        for (key, raw) in map {
            let Ok(id) = key.parse::<QuestionId>() else {
                tracing::debug!(key = %key, "ignoring answer with non-numeric question key");
                continue;
            };
            match AnswerValue::from_json(raw) {
                Some(value) => {
                    values.insert(id, value);
                }
                None => {
                    tracing::debug!(
                        question = %id,
                        answer = %raw,
                        "ignoring unsupported answer shape"
                    );
                }
            }
        }
        Self { values }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(Map::from(self.clone()))
    }
}

impl From<Map<String, Value>> for AnswerSet {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_map(&map)
    }
}

impl From<AnswerSet> for Map<String, Value> {
    fn from(answers: AnswerSet) -> Self {
        answers
            .values
            .into_iter()
            .map(|(id, value)| (id.to_string(), value.to_json()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for AnswerSet
where
    K: Into<QuestionId>,
    V: Into<AnswerValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut answers = AnswerSet::new();
        for (id, value) in iter {
            answers.insert(id, value);
        }
        answers
    }
}
