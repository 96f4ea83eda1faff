#![allow(missing_docs)]

pub mod answers;
pub mod error;
pub mod lint;
pub mod progress;
pub mod spec;
pub mod validate;
pub mod visibility;

pub use answers::{AnswerSet, AnswerValue};
pub use error::SpecError;
pub use lint::{LintReport, RuleIssue, Severity, lint};
pub use progress::{Progress, next_question, progress};
pub use spec::{
    BranchPolicy, FormSpec, QuestionId, QuestionSpec, QuestionType, SkipCondition, SkipPolicy,
    SkipRule, SkipTarget, TargetAddressing,
};
pub use validate::{ValidationError, ValidationResult, validate};
pub use visibility::{
    PositionIndex, SkipEvaluator, Visibility, VisibilityMap, compute_visible_questions,
    resolve_visibility,
};
