//! src/error.rs
use crate::storage::StoreError;
use std::fmt;

pub fn error_chain_fmt(
    f: &mut std::fmt::Formatter<'_>,
    e: &impl std::error::Error,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

#[derive(thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{context}")]
    StoreFailure {
        context: String,
        #[source]
        source: StoreError,
    },
    #[error("Malformed stage key: {0}")]
    MalformedKey(String),
    #[error("Map result at {reference} is not a word count mapping")]
    MalformedResult {
        reference: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("At least one word count mapping is required")]
    EmptyInput,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl fmt::Debug for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(f, self)
    }
}

impl PipelineError {
    pub fn store(context: impl Into<String>, source: StoreError) -> Self {
        Self::StoreFailure {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::EmptyInput => ErrorKind::InvalidInput,
            Self::StoreFailure { .. } => ErrorKind::StoreFailure,
            Self::MalformedKey(_) => ErrorKind::MalformedKey,
            Self::MalformedResult { .. } => ErrorKind::MalformedResult,
            Self::Unexpected(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    StoreFailure,
    MalformedKey,
    MalformedResult,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::StoreFailure => "StoreFailure",
            Self::MalformedKey => "MalformedKey",
            Self::MalformedResult => "MalformedResult",
            Self::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller on the far side of the RPC boundary sees of a failed stage.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[error("{kind}: {message}")]
pub struct StageFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<PipelineError> for StageFailure {
    fn from(error: PipelineError) -> Self {
        let mut message = error.to_string();
        let mut current = std::error::Error::source(&error);
        while let Some(cause) = current {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            current = cause.source();
        }
        Self {
            kind: error.kind(),
            message,
        }
    }
}
