//! Error types for KeepTrack

use thiserror::Error;

/// Result type alias using KeepTrack's Error
pub type Result<T> = std::result::Result<T, Error>;

/// KeepTrack error types with user-facing messages
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Client-side validation failure. Never reaches the network.
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-success HTTP status. The message is
    /// already translated for display.
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// No response was obtained at all (DNS, connect, timeout).
    #[error("{0}")]
    Transport(String),

    /// A move referenced a project id absent from the working set.
    #[error("Project with id {0} not found")]
    ProjectNotFound(i64),

    /// Local cache read/write failure. Always absorbed by the cache layer,
    /// never surfaced to callers.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E100",
            Self::Remote { .. } => "E200",
            Self::Transport(_) => "E201",
            Self::ProjectNotFound(_) => "E300",
            Self::Cache(_) => "E400",
            Self::Config(_) => "E500",
        }
    }

    /// Whether this failure came back from (or on the way to) the server,
    /// i.e. the kind that triggers a rollback of an optimistic write.
    pub fn is_remote_failure(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_displays_translated_message() {
        let err = Error::Remote {
            status: 401,
            message: "Please login again.".to_string(),
        };
        assert_eq!(err.to_string(), "Please login again.");
        assert_eq!(err.code(), "E200");
        assert!(err.is_remote_failure());
    }

    #[test]
    fn validation_error_is_not_a_remote_failure() {
        let err = Error::Validation("bad status".to_string());
        assert!(!err.is_remote_failure());
    }

    #[test]
    fn not_found_names_the_id() {
        let err = Error::ProjectNotFound(42);
        assert_eq!(err.to_string(), "Project with id 42 not found");
    }

    #[test]
    fn cache_error_is_locally_recoverable() {
        let err = Error::Cache("corrupt project cache: bad json".to_string());
        assert_eq!(err.code(), "E400");
        assert!(!err.is_remote_failure());
        assert!(err.to_string().starts_with("Cache error:"));
    }
}
