use thiserror::Error;

use crate::llm::GenerationError;

/// Failures the service layer can surface. Handlers convert these into
/// `{"error": ...}` JSON payloads; they are never allowed to crash a request.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("No documents found for this session.")]
    NoDocuments,

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The model reply was not valid JSON even after the repair pass.
    #[error("Failed to parse AI response: {0}")]
    MalformedOutput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
