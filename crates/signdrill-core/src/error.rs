//! Error types for signdrill-core.

use thiserror::Error;

/// Failure of a single classification call.
///
/// Produced by [`crate::classifier::Classifier::classify`]. The scheduler
/// never lets one of these stop the sampling loop; the next tick retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationFailure {
    /// No response arrived within the classification timeout.
    #[error("classification timed out")]
    Timeout,

    /// The classifier answered with an application-level error.
    #[error("server error: {message}")]
    Server { message: String },

    /// The classifier could not be reached.
    #[error("transport error: {message}")]
    Transport { message: String },
}

impl ClassificationFailure {
    /// Returns true if the failure is a connectivity problem rather than a
    /// response the server chose to send.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClassificationFailure::Timeout | ClassificationFailure::Transport { .. }
        )
    }

    /// Short message suitable for a status line.
    pub fn user_message(&self) -> String {
        match self {
            ClassificationFailure::Timeout => {
                "Request timed out. Check your connection.".to_string()
            }
            ClassificationFailure::Server { message } => message.clone(),
            ClassificationFailure::Transport { .. } => {
                "Network error. Make sure the backend is running and reachable.".to_string()
            }
        }
    }
}

/// Main error type for signdrill operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from underlying system calls.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration value was rejected.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The classifier backend failed its liveness probe.
    #[error("backend unavailable at {url}")]
    BackendUnavailable { url: String },

    /// No frame could be acquired from the frame source.
    #[error("frame acquisition failed: {message}")]
    Acquisition { message: String },

    /// The scheduler driver is no longer running.
    #[error("scheduler stopped")]
    SchedulerStopped,

    /// Logging could not be initialized.
    #[error("logging error: {message}")]
    Logging { message: String },

    /// A classification call failed.
    #[error(transparent)]
    Classification(#[from] ClassificationFailure),
}

impl Error {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Convenience result type for signdrill operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_display() {
        assert_eq!(
            ClassificationFailure::Timeout.to_string(),
            "classification timed out"
        );
        let err = ClassificationFailure::Server {
            message: "No hand detected".into(),
        };
        assert_eq!(err.to_string(), "server error: No hand detected");
        let err = ClassificationFailure::Transport {
            message: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[test]
    fn transient_failures() {
        assert!(ClassificationFailure::Timeout.is_transient());
        assert!(ClassificationFailure::Transport {
            message: "reset".into()
        }
        .is_transient());
        assert!(!ClassificationFailure::Server {
            message: "bad image".into()
        }
        .is_transient());
    }

    #[test]
    fn server_message_is_shown_verbatim() {
        let err = ClassificationFailure::Server {
            message: "Invalid base64".into(),
        };
        assert_eq!(err.user_message(), "Invalid base64");
        assert!(ClassificationFailure::Timeout
            .user_message()
            .contains("timed out"));
    }

    #[test]
    fn error_display_invalid_config() {
        let err = Error::invalid_config("letter pool is empty");
        assert_eq!(
            err.to_string(),
            "invalid configuration: letter pool is empty"
        );
    }

    #[test]
    fn classification_failure_converts() {
        let err: Error = ClassificationFailure::Timeout.into();
        assert!(matches!(
            err,
            Error::Classification(ClassificationFailure::Timeout)
        ));
        assert_eq!(err.to_string(), "classification timed out");
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "frame dir missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
        assert_send_sync::<ClassificationFailure>();
    }
}
