use std::collections::{BTreeMap, HashMap};

use crate::answers::AnswerSet;
use crate::spec::form::{BranchPolicy, FormSpec, SkipPolicy, TargetAddressing};
use crate::spec::question::{QuestionId, QuestionSpec};
use crate::spec::skip::{SkipCondition, SkipRule, SkipTarget};

pub type VisibilityMap = BTreeMap<QuestionId, bool>;

/// Lookup from jump targets to positions, built once per evaluation.
#[derive(Debug)]
pub struct PositionIndex {
    by_id: HashMap<QuestionId, usize>,
    len: usize,
}

impl PositionIndex {
    pub fn new(questions: &[QuestionSpec]) -> Self {
        let mut by_id = HashMap::with_capacity(questions.len());
        for (position, question) in questions.iter().enumerate() {
            by_id.entry(question.id).or_insert(position);
        }
        Self {
            by_id,
            len: questions.len(),
        }
    }

    pub fn position_of(&self, id: QuestionId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Position a question target points at, `None` when it is out of range.
    pub fn resolve(&self, id: QuestionId, addressing: TargetAddressing) -> Option<usize> {
        match addressing {
            TargetAddressing::Id => self.position_of(id),
            TargetAddressing::Ordinal => usize::try_from(id.get())
                .ok()
                .and_then(|ordinal| ordinal.checked_sub(1))
                .filter(|position| *position < self.len),
        }
    }
}

/// Effect of a matched condition on the positions that stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Jump {
    End { current: usize },
    Forward { current: usize, target: usize },
    Backward { current: usize, target: usize },
}

impl Jump {
    fn keeps(self, position: usize) -> bool {
        match self {
            Jump::End { current } => position <= current,
            Jump::Forward { current, target } => position <= current || position >= target,
            Jump::Backward { current, target } => position >= target && position <= current,
        }
    }
}

/// Visibility of every question of a form, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    entries: Vec<(QuestionId, bool)>,
}

impl Visibility {
    fn from_mask(questions: &[QuestionSpec], mask: &[bool]) -> Self {
        Self {
            entries: questions
                .iter()
                .zip(mask)
                .map(|(question, visible)| (question.id, *visible))
                .collect(),
        }
    }

    /// Visible ids in form order.
    pub fn ids(&self) -> Vec<QuestionId> {
        self.entries
            .iter()
            .filter(|(_, visible)| *visible)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn hidden_ids(&self) -> Vec<QuestionId> {
        self.entries
            .iter()
            .filter(|(_, visible)| !*visible)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Visibility of the first question carrying `id`; `false` for ids the
    /// form does not contain. Use [`Visibility::is_visible_at`] when the form
    /// may repeat an id.
    pub fn is_visible(&self, id: QuestionId) -> bool {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .is_some_and(|(_, visible)| *visible)
    }

    /// `false` for positions past the end of the form.
    pub fn is_visible_at(&self, position: usize) -> bool {
        self.entries
            .get(position)
            .is_some_and(|(_, visible)| *visible)
    }

    pub fn visible_count(&self) -> usize {
        self.entries.iter().filter(|(_, visible)| *visible).count()
    }

    pub fn to_map(&self) -> VisibilityMap {
        self.entries.iter().copied().collect()
    }
}

/// Computes which questions a respondent is shown.
///
/// Questions are scanned once in form order. A visible, answered question
/// with an enabled rule applies its first matching condition to the current
/// visibility set. Rules only ever hide questions, so a question hidden by an
/// earlier rule is never evaluated and never shown again.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipEvaluator {
    policy: SkipPolicy,
}

impl SkipEvaluator {
    pub fn new(policy: SkipPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SkipPolicy {
        self.policy
    }

    pub fn visible_questions(
        &self,
        questions: &[QuestionSpec],
        answers: &AnswerSet,
    ) -> Vec<QuestionId> {
        self.resolve(questions, answers).ids()
    }

    pub fn resolve(&self, questions: &[QuestionSpec], answers: &AnswerSet) -> Visibility {
        let index = PositionIndex::new(questions);
        let mask = questions.iter().enumerate().fold(
            vec![true; questions.len()],
            |mask, (position, question)| self.step(&index, answers, mask, position, question),
        );
        tracing::debug!(
            questions = questions.len(),
            visible = mask.iter().filter(|visible| **visible).count(),
            "resolved skip logic"
        );
        Visibility::from_mask(questions, &mask)
    }

    fn step(
        &self,
        index: &PositionIndex,
        answers: &AnswerSet,
        mask: Vec<bool>,
        position: usize,
        question: &QuestionSpec,
    ) -> Vec<bool> {
        if !mask[position] {
            tracing::trace!(question = %question.id, position, "question hidden, rule skipped");
            return mask;
        }
        let Some(rule) = question.active_rule() else {
            return mask;
        };
        let Some(answer) = answers.answered(question.id) else {
            tracing::trace!(question = %question.id, "no answer, rule inert");
            return mask;
        };
        let Some(condition) = rule.first_match(answer) else {
            tracing::trace!(question = %question.id, ?answer, "no condition matched");
            return mask;
        };
        let Some(jump) = self.jump_for(index, position, question, condition) else {
            return mask;
        };

        let branches = match (self.policy.branching, jump) {
            (BranchPolicy::Exclusive, Jump::Forward { target, .. }) => {
                self.sibling_targets(index, rule, condition, position, target)
            }
            _ => Vec::new(),
        };

        let next: Vec<bool> = mask
            .iter()
            .enumerate()
            .map(|(candidate, visible)| {
                *visible && jump.keeps(candidate) && !branches.contains(&candidate)
            })
            .collect();
        tracing::debug!(
            question = %question.id,
            position,
            option = %condition.option,
            ?jump,
            before = mask.iter().filter(|visible| **visible).count(),
            after = next.iter().filter(|visible| **visible).count(),
            "applied skip condition"
        );
        next
    }

    fn jump_for(
        &self,
        index: &PositionIndex,
        current: usize,
        question: &QuestionSpec,
        condition: &SkipCondition,
    ) -> Option<Jump> {
        match condition.target {
            SkipTarget::End => Some(Jump::End { current }),
            SkipTarget::Question(target_id) => {
                let Some(target) = index.resolve(target_id, self.policy.addressing) else {
                    tracing::debug!(
                        question = %question.id,
                        target = %target_id,
                        addressing = ?self.policy.addressing,
                        "skip target does not resolve, rule inert"
                    );
                    return None;
                };
                if target > current {
                    Some(Jump::Forward { current, target })
                } else {
                    Some(Jump::Backward { current, target })
                }
            }
        }
    }

    /// Forward targets of the rule's other conditions, excluding `matched`.
    fn sibling_targets(
        &self,
        index: &PositionIndex,
        rule: &SkipRule,
        chosen: &SkipCondition,
        current: usize,
        matched: usize,
    ) -> Vec<usize> {
        rule.conditions
            .iter()
            .filter(|condition| !std::ptr::eq(*condition, chosen))
            .filter_map(|condition| match condition.target {
                SkipTarget::Question(id) => index.resolve(id, self.policy.addressing),
                SkipTarget::End => None,
            })
            .filter(|position| *position > current && *position != matched)
            .collect()
    }
}

/// Visible question ids under the default policy.
pub fn compute_visible_questions(
    questions: &[QuestionSpec],
    answers: &AnswerSet,
) -> Vec<QuestionId> {
    SkipEvaluator::default().visible_questions(questions, answers)
}

/// Visibility of a form's questions under the form's own policy.
pub fn resolve_visibility(spec: &FormSpec, answers: &AnswerSet) -> Visibility {
    SkipEvaluator::new(spec.policy()).resolve(&spec.questions, answers)
}
