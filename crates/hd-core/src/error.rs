use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("help session not found")]
    NotFound,
    #[error("specialist not found")]
    SpecialistNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("forbidden: {message}")]
    Forbidden { message: String },
    #[error("conflict: {message}")]
    Conflict { message: String },
}

impl SessionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization token required")]
    MissingCredential,
    #[error("invalid or expired token: {message}")]
    InvalidCredential { message: String },
    #[error("user or specialist not found")]
    UnknownSubject,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("already registered: {message}")]
    Duplicate { message: String },
}

#[derive(Debug, Error)]
pub enum HelpdeskError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl HelpdeskError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}
