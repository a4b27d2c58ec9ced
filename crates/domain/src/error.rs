use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid {context}: {bpm} bpm (must be finite and positive)")]
    InvalidTempo { context: &'static str, bpm: f64 },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl DomainError {
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    pub fn invalid_tempo(context: &'static str, bpm: f64) -> Self {
        Self::InvalidTempo { context, bpm }
    }
}
