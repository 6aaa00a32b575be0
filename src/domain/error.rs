use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("page document is invalid: {message}")]
    InvalidDocument { message: String },
    #[error("failed to serialise content: {message}")]
    Serialization { message: String },
}

impl DomainError {
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}
