use serde::Serialize;

use crate::answers::AnswerSet;
use crate::spec::form::FormSpec;
use crate::spec::question::QuestionId;
use crate::visibility::{Visibility, resolve_visibility};

/// Answered/total counters over the visible questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    /// Every visible question is answered.
    pub complete: bool,
    pub next_question: Option<QuestionId>,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// First visible question without an answer.
pub fn next_question(spec: &FormSpec, answers: &AnswerSet) -> Option<QuestionId> {
    let visibility = resolve_visibility(spec, answers);
    first_unanswered(&visibility, answers)
}

pub fn progress(spec: &FormSpec, answers: &AnswerSet) -> Progress {
    let visibility = resolve_visibility(spec, answers);
    let visible = visibility.ids();
    let next_question = first_unanswered(&visibility, answers);
    Progress {
        answered: visible.iter().filter(|id| answers.is_answered(**id)).count(),
        total: visible.len(),
        complete: next_question.is_none(),
        next_question,
    }
}

fn first_unanswered(visibility: &Visibility, answers: &AnswerSet) -> Option<QuestionId> {
    visibility
        .ids()
        .into_iter()
        .find(|id| !answers.is_answered(*id))
}
