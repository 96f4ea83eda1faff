use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use skip_spec::{
    AnswerSet, BranchPolicy, FormSpec, LintReport, Severity, SkipEvaluator, SkipPolicy,
    TargetAddressing, ValidationResult, Visibility, lint, progress, validate,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const LOG_ENV: &str = "SKIPLOGIC_LOG";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Skip-logic helper for form definitions",
    long_about = "Evaluates question visibility, checks skip rules, and validates responses for JSON form definitions"
)]
struct Cli {
    /// Log each evaluation step to stderr.
    #[arg(long, global = true, alias = "debug")]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum AddressingArg {
    Id,
    Ordinal,
}

impl From<AddressingArg> for TargetAddressing {
    fn from(arg: AddressingArg) -> Self {
        match arg {
            AddressingArg::Id => TargetAddressing::Id,
            AddressingArg::Ordinal => TargetAddressing::Ordinal,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum BranchingArg {
    Linear,
    Exclusive,
}

impl From<BranchingArg> for BranchPolicy {
    fn from(arg: BranchingArg) -> Self {
        match arg {
            BranchingArg::Linear => BranchPolicy::Linear,
            BranchingArg::Exclusive => BranchPolicy::Exclusive,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print the questions visible for the given answers.
    Visible {
        /// Path to the form JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to the answers JSON; no answers when omitted.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Override how jump targets are resolved.
        #[arg(long, value_enum)]
        addressing: Option<AddressingArg>,
        /// Override what a forward jump hides.
        #[arg(long, value_enum)]
        branching: Option<BranchingArg>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the next question to ask and the response progress.
    Next {
        /// Path to the form JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to the answers JSON; no answers when omitted.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Check a form's skip rules.
    Lint {
        /// Path to the form JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
    },
    /// Validate answers against a form, honouring skip logic.
    Validate {
        /// Path to the form JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to the answers JSON file.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Print the JSON Schema of the form format.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Visible {
            form,
            answers,
            addressing,
            branching,
            format,
        } => run_visible(form, answers, addressing, branching, format),
        Command::Next {
            form,
            answers,
            format,
        } => run_next(form, answers, format),
        Command::Lint { form } => run_lint(form),
        Command::Validate { form, answers } => run_validate(form, answers),
        Command::Schema => run_schema(),
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_form(path: &Path) -> CliResult<FormSpec> {
    let raw = fs::read_to_string(path)?;
    Ok(FormSpec::from_json_str(&raw)?)
}

fn load_answers(path: Option<&Path>) -> CliResult<AnswerSet> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            Ok(AnswerSet::from_json_str(&raw)?)
        }
        None => Ok(AnswerSet::new()),
    }
}

fn resolve_policy(
    spec: &FormSpec,
    addressing: Option<AddressingArg>,
    branching: Option<BranchingArg>,
) -> SkipPolicy {
    let mut policy = spec.policy();
    if let Some(addressing) = addressing {
        policy.addressing = addressing.into();
    }
    if let Some(branching) = branching {
        policy.branching = branching.into();
    }
    policy
}

fn run_visible(
    form_path: PathBuf,
    answers_path: Option<PathBuf>,
    addressing: Option<AddressingArg>,
    branching: Option<BranchingArg>,
    format: OutputFormat,
) -> CliResult<()> {
    let spec = load_form(&form_path)?;
    let answers = load_answers(answers_path.as_deref())?;
    let policy = resolve_policy(&spec, addressing, branching);
    tracing::debug!(?policy, questions = spec.questions.len(), "evaluating form");

    let visibility = SkipEvaluator::new(policy).resolve(&spec.questions, &answers);
    match format {
        OutputFormat::Text => println!("{}", render_visible_text(&spec, &visibility)),
        OutputFormat::Json => {
            let payload = json!({
                "visible": visibility.ids(),
                "hidden": visibility.hidden_ids(),
                "policy": policy,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}

fn render_visible_text(spec: &FormSpec, visibility: &Visibility) -> String {
    let mut lines = Vec::new();
    if !spec.title.is_empty() {
        lines.push(format!("Form: {}", spec.title));
    }
    lines.push(format!(
        "Visible questions ({}/{}):",
        visibility.visible_count(),
        spec.questions.len()
    ));
    for (_, question) in spec
        .questions
        .iter()
        .enumerate()
        .filter(|(position, _)| visibility.is_visible_at(*position))
    {
        lines.push(format!(" - {} ({})", question.id, question.text));
    }
    let hidden = visibility.hidden_ids();
    if !hidden.is_empty() {
        lines.push(format!("Hidden questions: {}", join_ids(&hidden)));
    }
    lines.join("\n")
}

fn run_next(
    form_path: PathBuf,
    answers_path: Option<PathBuf>,
    format: OutputFormat,
) -> CliResult<()> {
    let spec = load_form(&form_path)?;
    let answers = load_answers(answers_path.as_deref())?;
    let state = progress(&spec, &answers);

    match format {
        OutputFormat::Text => {
            println!("Progress: {}/{}", state.answered, state.total);
            match state.next_question.and_then(|id| spec.question(id)) {
                Some(question) => println!("Next question: {} ({})", question.id, question.text),
                None => println!("All visible questions are answered."),
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&state)?),
    }
    Ok(())
}

fn run_lint(form_path: PathBuf) -> CliResult<()> {
    let spec = load_form(&form_path)?;
    let report = lint(&spec);
    describe_lint(&report);

    if report.has_errors() {
        Err("skip logic has errors".into())
    } else {
        Ok(())
    }
}

fn describe_lint(report: &LintReport) {
    if report.is_clean() {
        println!("No skip logic issues found.");
        return;
    }
    for issue in &report.issues {
        let label = match issue.severity() {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        println!("{}[{}]: {}", label, issue.code(), issue);
    }
}

fn run_validate(form_path: PathBuf, answers_path: PathBuf) -> CliResult<()> {
    let spec = load_form(&form_path)?;
    let answers = load_answers(Some(answers_path.as_path()))?;

    let result = validate(&spec, &answers);
    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ValidationResult) {
    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            println!("  {} - {}", error.question_id, error.message);
        }
    }
    if !result.missing_required.is_empty() {
        println!("Missing required answers: {}", join_ids(&result.missing_required));
    }
    if !result.unknown_fields.is_empty() {
        println!("Unknown answer fields: {}", join_ids(&result.unknown_fields));
    }
    if !result.hidden_answers.is_empty() {
        println!("Answers to hidden questions: {}", join_ids(&result.hidden_answers));
    }
}

fn join_ids(ids: &[skip_spec::QuestionId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn run_schema() -> CliResult<()> {
    let schema = schemars::schema_for!(FormSpec);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
