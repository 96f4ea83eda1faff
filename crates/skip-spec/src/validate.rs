use regex::Regex;
use serde::Serialize;

use crate::answers::{AnswerSet, AnswerValue};
use crate::spec::form::FormSpec;
use crate::spec::question::{QuestionId, QuestionSpec, QuestionType};
use crate::visibility::resolve_visibility;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub question_id: QuestionId,
    pub message: String,
    pub code: String,
}

/// Outcome of checking a response against a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub missing_required: Vec<QuestionId>,
    /// Answered questions that skip logic currently hides.
    pub hidden_answers: Vec<QuestionId>,
    pub unknown_fields: Vec<QuestionId>,
}

/// Checks a response. Only questions visible under the form's skip logic
/// are required or validated.
pub fn validate(spec: &FormSpec, answers: &AnswerSet) -> ValidationResult {
    let visibility = resolve_visibility(spec, answers);

    let mut errors = Vec::new();
    let mut missing_required = Vec::new();
    let mut hidden_answers = Vec::new();

    for (position, question) in spec.questions.iter().enumerate() {
        let answer = answers.answered(question.id);
        if !visibility.is_visible_at(position) {
            if answer.is_some() {
                hidden_answers.push(question.id);
            }
            continue;
        }

        match answer {
            None => {
                if question.required {
                    missing_required.push(question.id);
                }
            }
            Some(value) => {
                if let Some(error) = validate_value(question, value) {
                    errors.push(error);
                }
            }
        }
    }

    let unknown_fields: Vec<QuestionId> = answers.ids().filter(|id| !spec.contains(*id)).collect();

    ValidationResult {
        valid: errors.is_empty() && missing_required.is_empty() && unknown_fields.is_empty(),
        errors,
        missing_required,
        hidden_answers,
        unknown_fields,
    }
}

fn validate_value(question: &QuestionSpec, value: &AnswerValue) -> Option<ValidationError> {
    if question.kind.is_single_choice() && matches!(value, AnswerValue::Multi(_)) {
        return Some(base_error(question, "expected a single option", "type_mismatch"));
    }

    if !question.options.is_empty()
        && let Some(picked) = value
            .as_slice()
            .iter()
            .find(|picked| !question.options.contains(*picked))
    {
        return Some(base_error(
            question,
            &format!("'{}' is not a valid option", picked),
            "invalid_option",
        ));
    }

    if let Some(text) = value
        .as_slice()
        .iter()
        .find(|text| !matches_format(question.kind, text))
    {
        return Some(base_error(
            question,
            &format!("'{}' is not a valid {}", text, format_name(question.kind)),
            "invalid_format",
        ));
    }

    None
}

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^\+?[1-9]\d{0,15}$";
const DATE_PATTERN: &str = r"^(\d{4})-(\d{2})-(\d{2})$";

fn matches_format(kind: QuestionType, text: &str) -> bool {
    match kind {
        QuestionType::Email => matches_pattern(EMAIL_PATTERN, text),
        QuestionType::Phone => {
            let digits: String = text
                .chars()
                .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
                .collect();
            matches_pattern(PHONE_PATTERN, &digits)
        }
        QuestionType::Number => text
            .trim()
            .parse::<f64>()
            .is_ok_and(|number| number.is_finite()),
        QuestionType::Date => is_calendar_date(text),
        _ => true,
    }
}

fn matches_pattern(pattern: &str, text: &str) -> bool {
    Regex::new(pattern).is_ok_and(|regex| regex.is_match(text))
}

/// `YYYY-MM-DD` with month 1-12 and day 1-31.
fn is_calendar_date(text: &str) -> bool {
    let Ok(regex) = Regex::new(DATE_PATTERN) else {
        return false;
    };
    let Some(captures) = regex.captures(text) else {
        return false;
    };
    let month = captures[2].parse::<u8>().unwrap_or(0);
    let day = captures[3].parse::<u8>().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

fn format_name(kind: QuestionType) -> &'static str {
    match kind {
        QuestionType::Email => "email address",
        QuestionType::Phone => "phone number",
        QuestionType::Number => "number",
        QuestionType::Date => "date",
        _ => "value",
    }
}

fn base_error(question: &QuestionSpec, message: &str, code: &str) -> ValidationError {
    ValidationError {
        question_id: question.id,
        message: message.into(),
        code: code.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_by_question_type() {
        assert!(matches_format(QuestionType::Email, "ada@example.com"));
        assert!(!matches_format(QuestionType::Email, "ada@example"));
        assert!(matches_format(QuestionType::Phone, "+1 (555) 010-9999"));
        assert!(!matches_format(QuestionType::Phone, "0555"));
        assert!(matches_format(QuestionType::Number, " -3.5 "));
        assert!(!matches_format(QuestionType::Number, "NaN"));
        assert!(matches_format(QuestionType::Date, "2024-02-29"));
        assert!(!matches_format(QuestionType::Date, "2024-13-01"));
        assert!(!matches_format(QuestionType::Date, "29/02/2024"));
        assert!(matches_format(QuestionType::Text, "anything"));
    }
}
