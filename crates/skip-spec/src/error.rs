use thiserror::Error;

/// Failures while decoding forms or answers.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to parse form: {0}")]
    FormParse(#[source] serde_json::Error),
    #[error("failed to parse answers: {0}")]
    AnswersParse(#[source] serde_json::Error),
    #[error("answers must be a JSON object, found {0}")]
    AnswersShape(&'static str),
}
