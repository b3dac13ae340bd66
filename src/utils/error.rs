use thiserror::Error;

/// Which way a transport call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailureKind {
    /// The server answered with a non-2xx status.
    Responded,
    /// The request went out but nothing came back.
    NoResponse,
    /// The request could not be constructed.
    Setup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Transport,
    Server,
    Schema,
    Configuration,
    System,
}

#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("{message}")]
    ValidationError { message: String },

    #[error("{message}")]
    TransportError {
        kind: TransportFailureKind,
        message: String,
    },

    #[error("{0}")]
    ServerReported(String),

    #[error("{message}")]
    SchemaError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {reason} (got '{value}')")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ProjectionError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaError {
            message: message.into(),
        }
    }

    pub fn transport(kind: TransportFailureKind, message: impl Into<String>) -> Self {
        Self::TransportError {
            kind,
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::TransportError { .. } => ErrorCategory::Transport,
            Self::ServerReported(_) => ErrorCategory::Server,
            Self::SchemaError { .. } => ErrorCategory::Schema,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError(_) => ErrorCategory::System,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
