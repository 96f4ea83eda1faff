use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::spec::form::FormSpec;
use crate::spec::question::QuestionId;
use crate::spec::skip::SkipTarget;
use crate::visibility::PositionIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// A problem with a form's skip rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleIssue {
    #[error("question id {0} is used more than once")]
    DuplicateQuestionId(QuestionId),
    #[error("question {question}: option '{option}' jumps to {target}, which does not exist")]
    DanglingTarget {
        question: QuestionId,
        option: String,
        target: QuestionId,
    },
    #[error("question {question}: skip logic is enabled but has no conditions")]
    EmptyConditions { question: QuestionId },
    #[error("question {question}: option '{option}' is not one of the question's options")]
    UnknownOption { question: QuestionId, option: String },
    #[error("question {question}: option '{option}' is declared twice, only the first applies")]
    ShadowedCondition { question: QuestionId, option: String },
    #[error("question {question}: target {target} is not after the question")]
    BackwardTarget {
        question: QuestionId,
        target: QuestionId,
    },
}

impl RuleIssue {
    pub fn severity(&self) -> Severity {
        match self {
            RuleIssue::DuplicateQuestionId(_) | RuleIssue::DanglingTarget { .. } => Severity::Error,
            RuleIssue::EmptyConditions { .. }
            | RuleIssue::UnknownOption { .. }
            | RuleIssue::ShadowedCondition { .. }
            | RuleIssue::BackwardTarget { .. } => Severity::Warning,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RuleIssue::DuplicateQuestionId(_) => "duplicate_id",
            RuleIssue::DanglingTarget { .. } => "dangling_target",
            RuleIssue::EmptyConditions { .. } => "empty_conditions",
            RuleIssue::UnknownOption { .. } => "unknown_option",
            RuleIssue::ShadowedCondition { .. } => "shadowed_condition",
            RuleIssue::BackwardTarget { .. } => "backward_target",
        }
    }
}

/// Outcome of [`lint`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub issues: Vec<RuleIssue>,
}

impl LintReport {
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &RuleIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &RuleIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == Severity::Warning)
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Static checks on a form's skip rules, resolved under the form's addressing.
///
/// Disabled rules are not checked.
pub fn lint(spec: &FormSpec) -> LintReport {
    let addressing = spec.policy().addressing;
    let index = PositionIndex::new(&spec.questions);
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for question in &spec.questions {
        if !seen.insert(question.id) && reported.insert(question.id) {
            issues.push(RuleIssue::DuplicateQuestionId(question.id));
        }
    }

    for (position, question) in spec.questions.iter().enumerate() {
        let Some(rule) = question.active_rule() else {
            continue;
        };
        if rule.conditions.is_empty() {
            issues.push(RuleIssue::EmptyConditions {
                question: question.id,
            });
            continue;
        }

        let mut options = HashSet::new();
        for condition in &rule.conditions {
            if !options.insert(condition.option.as_str()) {
                issues.push(RuleIssue::ShadowedCondition {
                    question: question.id,
                    option: condition.option.clone(),
                });
            }
            if !question.options.is_empty() && !question.options.contains(&condition.option) {
                issues.push(RuleIssue::UnknownOption {
                    question: question.id,
                    option: condition.option.clone(),
                });
            }

            let SkipTarget::Question(target) = condition.target else {
                continue;
            };
            match index.resolve(target, addressing) {
                None => issues.push(RuleIssue::DanglingTarget {
                    question: question.id,
                    option: condition.option.clone(),
                    target,
                }),
                Some(target_position) if target_position <= position => {
                    issues.push(RuleIssue::BackwardTarget {
                        question: question.id,
                        target,
                    })
                }
                Some(_) => {}
            }
        }
    }

    LintReport { issues }
}
