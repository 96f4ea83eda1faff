use serde_json::json;

use skip_spec::{
    AnswerSet, AnswerValue, BranchPolicy, FormSpec, QuestionId, QuestionSpec, SkipCondition,
    SkipEvaluator, SkipPolicy, SkipRule, TargetAddressing, compute_visible_questions,
    resolve_visibility,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "two_branch_form" => include_str!("../tests/fixtures/two_branch_form.json"),
        "customer_survey" => include_str!("../tests/fixtures/customer_survey.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn load(name: &str) -> FormSpec {
    FormSpec::from_json_str(fixture(name)).expect("deserialize")
}

fn answers(value: serde_json::Value) -> AnswerSet {
    AnswerSet::from_json_value(&value).expect("answers object")
}

fn ids(raw: &[u64]) -> Vec<QuestionId> {
    raw.iter().copied().map(QuestionId).collect()
}

fn question(id: u64) -> QuestionSpec {
    QuestionSpec::new(id, format!("Question {id}"))
}

fn with_rule(id: u64, conditions: Vec<SkipCondition>) -> QuestionSpec {
    question(id).with_skip_logic(SkipRule::enabled(conditions))
}

/// Five questions: 1 jumps over 2 and 3 on "A", 3 ends the form on "B",
/// 4 jumps back to 2 on "C" and ends the form on "D".
fn chained_form() -> Vec<QuestionSpec> {
    vec![
        with_rule(1, vec![SkipCondition::to_question("A", 4u64)]),
        question(2),
        with_rule(3, vec![SkipCondition::to_end("B")]),
        with_rule(
            4,
            vec![
                SkipCondition::to_question("C", 2u64),
                SkipCondition::to_end("D"),
                SkipCondition::to_question("Self", 4u64),
            ],
        ),
        question(5),
    ]
}

#[test]
fn no_answers_shows_every_question() {
    let spec = load("two_branch_form");
    let visible = compute_visible_questions(&spec.questions, &AnswerSet::new());
    assert_eq!(visible, ids(&[1, 2, 3, 4]));
}

#[test]
fn forward_jump_hides_skipped_run() {
    let spec = load("two_branch_form");
    let visible = compute_visible_questions(&spec.questions, &answers(json!({ "1": "No" })));
    assert_eq!(visible, ids(&[1, 3, 4]));
}

#[test]
fn jump_to_next_question_hides_nothing_when_linear() {
    let spec = load("two_branch_form");
    let visible = compute_visible_questions(&spec.questions, &answers(json!({ "1": "Yes" })));
    assert_eq!(visible, ids(&[1, 2, 3, 4]));
}

#[test]
fn exclusive_branching_hides_the_other_branch() {
    let spec = load("two_branch_form");
    let evaluator = SkipEvaluator::new(SkipPolicy {
        branching: BranchPolicy::Exclusive,
        ..SkipPolicy::default()
    });

    let yes = evaluator.visible_questions(&spec.questions, &answers(json!({ "1": "Yes" })));
    assert_eq!(yes, ids(&[1, 2, 4]));

    let no = evaluator.visible_questions(&spec.questions, &answers(json!({ "1": "No" })));
    assert_eq!(no, ids(&[1, 3, 4]));

    let none = evaluator.visible_questions(&spec.questions, &AnswerSet::new());
    assert_eq!(none, ids(&[1, 2, 3, 4]));
}

#[test]
fn form_policy_drives_resolve_visibility() {
    let spec = load("two_branch_form").with_policy(SkipPolicy {
        addressing: TargetAddressing::Id,
        branching: BranchPolicy::Exclusive,
    });
    let visibility = resolve_visibility(&spec, &answers(json!({ "1": "Yes", "2": "Navy" })));
    assert_eq!(visibility.ids(), ids(&[1, 2, 4]));
    assert_eq!(visibility.hidden_ids(), ids(&[3]));
}

#[test]
fn answers_on_later_questions_keep_branch() {
    let spec = load("two_branch_form");
    let visible = compute_visible_questions(
        &spec.questions,
        &answers(json!({ "1": "No", "3": "Too cold" })),
    );
    assert_eq!(visible, ids(&[1, 3, 4]));
}

#[test]
fn unmatched_answer_leaves_rule_inert() {
    let spec = load("two_branch_form");
    let visible = compute_visible_questions(&spec.questions, &answers(json!({ "1": "Sí" })));
    assert_eq!(visible, ids(&[1, 2, 3, 4]));
}

#[test]
fn end_target_truncates_after_current_question() {
    let spec = load("customer_survey");
    let visible = compute_visible_questions(&spec.questions, &answers(json!({ "101": "No" })));
    assert_eq!(visible, ids(&[101]));
}

#[test]
fn targets_resolve_by_question_id() {
    let spec = load("customer_survey");
    let visible = compute_visible_questions(&spec.questions, &answers(json!({ "101": "Yes" })));
    assert_eq!(visible, ids(&[101, 103, 104, 105, 106]));
}

#[test]
fn multi_select_matches_by_containment() {
    let spec = load("customer_survey");
    let visible = compute_visible_questions(
        &spec.questions,
        &answers(json!({ "101": "Yes", "103": ["Desktop", "Mobile"] })),
    );
    assert_eq!(visible, ids(&[101, 103, 105, 106]));

    let visible = compute_visible_questions(
        &spec.questions,
        &answers(json!({ "101": "Yes", "103": ["Cloud"] })),
    );
    assert_eq!(visible, ids(&[101, 103, 106]));
}

#[test]
fn first_declared_condition_wins_for_multi_select() {
    let spec = load("customer_survey");
    // "Cloud" is picked first but "Mobile" is declared first.
    let visible = compute_visible_questions(
        &spec.questions,
        &answers(json!({ "101": "Yes", "103": ["Cloud", "Mobile"] })),
    );
    assert_eq!(visible, ids(&[101, 103, 105, 106]));
}

#[test]
fn hidden_question_rules_are_not_evaluated() {
    let spec = load("customer_survey");
    let visible = compute_visible_questions(
        &spec.questions,
        &answers(json!({ "101": "No", "103": ["Cloud"] })),
    );
    assert_eq!(visible, ids(&[101]));

    let questions = chained_form();
    let visible = compute_visible_questions(&questions, &AnswerSet::new().with(QuestionId(3), "B"));
    assert_eq!(visible, ids(&[1, 2, 3]));

    let both = AnswerSet::new()
        .with(QuestionId(1), "A")
        .with(QuestionId(3), "B");
    let visible = compute_visible_questions(&questions, &both);
    assert_eq!(visible, ids(&[1, 4, 5]));
}

#[test]
fn backward_jump_keeps_target_through_current() {
    let questions = chained_form();
    let visible = compute_visible_questions(&questions, &AnswerSet::new().with(QuestionId(4), "C"));
    assert_eq!(visible, ids(&[2, 3, 4]));

    let visible = compute_visible_questions(
        &questions,
        &AnswerSet::new().with(QuestionId(4), "Self"),
    );
    assert_eq!(visible, ids(&[4]));
}

#[test]
fn end_target_applies_after_earlier_pruning() {
    let questions = chained_form();
    let answers = AnswerSet::new()
        .with(QuestionId(1), "A")
        .with(QuestionId(4), "D");
    assert_eq!(compute_visible_questions(&questions, &answers), ids(&[1, 4]));
}

#[test]
fn dangling_target_is_a_no_op() {
    let questions = vec![
        with_rule(1, vec![SkipCondition::to_question("Go", 99u64)]),
        question(2),
        question(3),
    ];
    let answers = AnswerSet::new().with(QuestionId(1), "Go");
    assert_eq!(compute_visible_questions(&questions, &answers), ids(&[1, 2, 3]));
}

#[test]
fn ordinal_addressing_uses_one_based_positions() {
    let questions = vec![
        with_rule(
            10,
            vec![
                SkipCondition::to_question("Yes", 3u64),
                SkipCondition::to_question("Far", 5u64),
            ],
        ),
        question(20),
        question(30),
        question(40),
    ];
    let ordinal = SkipEvaluator::new(SkipPolicy {
        addressing: TargetAddressing::Ordinal,
        ..SkipPolicy::default()
    });

    let yes = AnswerSet::new().with(QuestionId(10), "Yes");
    assert_eq!(ordinal.visible_questions(&questions, &yes), ids(&[10, 30, 40]));
    // Under id addressing "3" names no question.
    assert_eq!(compute_visible_questions(&questions, &yes), ids(&[10, 20, 30, 40]));

    let far = AnswerSet::new().with(QuestionId(10), "Far");
    assert_eq!(ordinal.visible_questions(&questions, &far), ids(&[10, 20, 30, 40]));
}

#[test]
fn disabled_and_empty_rules_are_inert() {
    let mut disabled = with_rule(1, vec![SkipCondition::to_end("Stop")]);
    if let Some(rule) = disabled.skip_logic.as_mut() {
        rule.enabled = false;
    }
    let questions = vec![disabled, with_rule(2, Vec::new()), question(3)];
    let answers = AnswerSet::new()
        .with(QuestionId(1), "Stop")
        .with(QuestionId(2), "Stop");
    assert_eq!(compute_visible_questions(&questions, &answers), ids(&[1, 2, 3]));
}

#[test]
fn empty_and_malformed_answers_leave_rule_inert() {
    let questions = vec![
        with_rule(1, vec![SkipCondition::to_end("")]),
        with_rule(2, vec![SkipCondition::to_end("5")]),
        question(3),
    ];
    let answers = answers(json!({ "1": "", "2": 5 }));
    assert_eq!(compute_visible_questions(&questions, &answers), ids(&[1, 2, 3]));

    let mut explicit = AnswerSet::new();
    explicit.insert(QuestionId(2), AnswerValue::multi(Vec::<String>::new()));
    assert_eq!(compute_visible_questions(&questions, &explicit), ids(&[1, 2, 3]));
}

#[test]
fn evaluation_is_idempotent_and_order_preserving() {
    let spec = load("customer_survey");
    let form_order: Vec<QuestionId> = spec.questions.iter().map(|q| q.id).collect();
    let snapshot = spec.clone();

    let cases = [
        json!({}),
        json!({ "101": "Yes" }),
        json!({ "101": "No" }),
        json!({ "101": "Yes", "103": ["Mobile"] }),
        json!({ "101": "Yes", "103": ["Desktop"], "105": "4" }),
        json!({ "102": "Discounts", "999": "ignored" }),
    ];

    for case in cases {
        let answer_set = answers(case);
        let answers_before = answer_set.clone();
        let first = compute_visible_questions(&spec.questions, &answer_set);
        let second = compute_visible_questions(&spec.questions, &answer_set);
        assert_eq!(first, second);

        let positions: Vec<usize> = first
            .iter()
            .map(|id| {
                form_order
                    .iter()
                    .position(|candidate| candidate == id)
                    .expect("visible id belongs to the form")
            })
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(answer_set, answers_before);
    }

    assert_eq!(spec, snapshot);
}

#[test]
fn empty_form_yields_nothing() {
    let answers = AnswerSet::new().with(QuestionId(1), "Yes");
    assert!(compute_visible_questions(&[], &answers).is_empty());
}

#[test]
fn skip_targets_round_trip_through_wire_numbers() {
    let rule: SkipRule = serde_json::from_value(json!({
        "enabled": true,
        "conditions": [
            { "option": "Done", "skip_to_question": 0 },
            { "option": "More", "skip_to_question": 12 }
        ]
    }))
    .expect("rule");
    assert_eq!(rule.conditions[0], SkipCondition::to_end("Done"));
    assert_eq!(rule.conditions[1], SkipCondition::to_question("More", 12u64));
    assert_eq!(
        serde_json::to_value(&rule.conditions[1]).expect("serialize")["skip_to_question"],
        12
    );
}
