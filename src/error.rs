//! Error types for sticky-locks

use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Player {0} is not known")]
    UnknownPlayer(String),

    #[error("Group {0} not found")]
    GroupNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// True for faults caused by the request itself rather than the store.
    ///
    /// These carry a message meant for the player who issued the command.
    pub fn is_domain(&self) -> bool {
        matches!(self, Self::UnknownPlayer(_) | Self::GroupNotFound(_))
    }
}

/// Absorb-and-log policy for callers that prefer availability over reporting.
///
/// A store fault becomes `T::default()` (not locked, no owner, empty list)
/// after being logged. Use it at the call site, after domain errors have been
/// matched out, so the choice stays visible.
pub trait Lenient<T> {
    fn or_log(self, context: &str) -> T;
}

impl<T: Default> Lenient<T> for Result<T, StorageError> {
    fn or_log(self, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "{}", context);
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_player_message() {
        let err = StorageError::UnknownPlayer("Alice".to_string());
        assert_eq!(err.to_string(), "Player Alice is not known");
        assert!(err.is_domain());
    }

    #[test]
    fn test_store_fault_is_not_domain() {
        let err = StorageError::Internal("lock poisoned".to_string());
        assert!(!err.is_domain());
    }

    #[test]
    fn test_or_log_defaults_on_error() {
        let failed: Result<Vec<String>, StorageError> =
            Err(StorageError::Internal("boom".to_string()));
        assert!(failed.or_log("Failed to list members").is_empty());

        let ok: Result<Option<u32>, StorageError> = Ok(Some(3));
        assert_eq!(ok.or_log("unused"), Some(3));
    }
}
