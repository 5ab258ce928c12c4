use std::result::Result as StdResult;

use thiserror::Error;

/// Failures raised by the questionnaire core.
///
/// Missing answers are not errors: they are collected by the validation layer
/// and reported through [`crate::survey::validation::ErrorReport`].
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("Unknown field path: `{0}`")]
    UnknownPath(String),
    #[error("`{value}` is not an option of `{field}`")]
    InvalidChoice { field: String, value: String },
    #[error("Invalid date for `{field}`: {reason}")]
    InvalidDate { field: String, reason: String },
    #[error("Section {index} is out of range (0..{count})")]
    SectionOutOfRange { index: usize, count: usize },
    #[error("No submission is waiting for review")]
    NoPendingReview,
    #[error("Questionnaire has not been submitted yet")]
    NotSubmitted,
    #[error("Questionnaire is locked while {0}")]
    Locked(&'static str),
    #[error("Submission failed: {0}")]
    Submission(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = StdResult<T, SurveyError>;

/// Failures raised while loading or persisting preferences.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Unknown configuration key `{0}`")]
    UnknownKey(String),
    #[error("Invalid value `{value}` for `{key}`; expected one of: {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err.to_string())
    }
}

/// Failures surfaced by the terminal front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Survey(#[from] SurveyError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
