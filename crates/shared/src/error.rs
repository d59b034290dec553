use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::FieldId;

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: FieldId,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: FieldId, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionError {
    #[error("network error: {message}")]
    Network { message: String },
    #[error("server rejected submission ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("submission timed out")]
    Timeout,
    #[error("submission cancelled")]
    Cancelled,
}

impl SubmissionError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Message shown in the form status area. Never leaks transport detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network { .. } => {
                "We couldn't reach our servers. Check your connection and try again."
            }
            Self::Rejected { .. } => "We couldn't accept your request right now. Please try again.",
            Self::Timeout => "The request took too long. Please try again.",
            Self::Cancelled => "Your request was cancelled.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("unexpected error: {message}")]
pub struct UnexpectedError {
    pub message: String,
}

impl UnexpectedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Unexpected(#[from] UnexpectedError),
}

impl PageError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.message.clone(),
            Self::Submission(err) => err.user_message().to_string(),
            Self::Unexpected(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// The field a validation error belongs to. Errors without one go to the status area.
    pub fn field(&self) -> Option<&FieldId> {
        match self {
            Self::Validation(err) => Some(&err.field),
            Self::Submission(_) | Self::Unexpected(_) => None,
        }
    }
}
