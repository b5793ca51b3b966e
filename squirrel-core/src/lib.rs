//! Squirrel Core - radix trie with change reactors
//!
//! This crate provides a compressed prefix tree whose structural changes are
//! reported to pluggable reactors, plus a reactor that keeps a directory
//! hierarchy on disk in sync with the trie.

pub mod config;
pub mod manifest;
pub mod reactor;
pub mod tracing_setup;
pub mod trie;

// Re-export main types for convenient access
pub use config::{MirrorConfig, PlacementMethod, SquirrelConfig};
pub use manifest::Manifest;
pub use reactor::{
    CompositeReactor, EmptyReactor, FileReactor, Reactor, ReactorError, TracingReactor,
};
pub use trie::{SubTrie, Trie, TrieError};

/// Errors that can bubble up from any squirrel subsystem.
#[derive(Debug, thiserror::Error)]
pub enum SquirrelError {
    #[error("Trie error: {0}")]
    Trie(#[from] TrieError),

    #[error("Reactor error: {0}")]
    Reactor(#[from] ReactorError),

    #[error("Manifest error: {reason}")]
    Manifest { reason: String },

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SquirrelError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            SquirrelError::Trie(TrieError::KeyNotFound { key }) => {
                format!("No value stored under {key:?}")
            }
            SquirrelError::Trie(TrieError::Reactor(e)) | SquirrelError::Reactor(e) => {
                if e.is_user_error() {
                    e.to_string()
                } else {
                    "Mirror directory could not be updated".to_string()
                }
            }
            SquirrelError::Manifest { reason } => format!("Invalid manifest: {reason}"),
            SquirrelError::Configuration { reason } => format!("Configuration error: {reason}"),
            SquirrelError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        match self {
            SquirrelError::Configuration { .. } | SquirrelError::Manifest { .. } => true,
            SquirrelError::Trie(TrieError::Reactor(e)) | SquirrelError::Reactor(e) => {
                e.is_user_error()
            }
            SquirrelError::Trie(TrieError::KeyNotFound { .. }) | SquirrelError::Io(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SquirrelError>;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_reactor_errors_convert() {
        let error: SquirrelError = ReactorError::NotADirectory {
            path: PathBuf::from("quux"),
        }
        .into();

        assert!(error.is_user_error());
        assert_eq!(error.user_message(), "quux is not a directory");
    }

    #[test]
    fn test_missing_key_message() {
        let error: SquirrelError = TrieError::KeyNotFound {
            key: "foo".to_string(),
        }
        .into();

        assert!(!error.is_user_error());
        assert_eq!(error.user_message(), "No value stored under \"foo\"");
    }

    #[test]
    fn test_reactor_errors_raised_through_the_trie() {
        let bad_name = ReactorError::InvalidFileName {
            name: "../passwd".to_string(),
        };
        let error: SquirrelError = TrieError::Reactor(bad_name).into();

        assert!(error.is_user_error());
        assert_eq!(
            error.user_message(),
            "\"../passwd\" is not a plain file name"
        );

        let bad_key = ReactorError::InvalidKey {
            suffix: "..".to_string(),
        };
        let error: SquirrelError = TrieError::Reactor(bad_key).into();
        assert!(error.is_user_error());

        let missing = ReactorError::Missing {
            path: PathBuf::from("a/b"),
        };
        let error: SquirrelError = TrieError::Reactor(missing).into();
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_user_errors_show_their_own_message() {
        let errors: Vec<SquirrelError> = vec![
            ReactorError::UnsupportedMethod {
                method: PlacementMethod::Symlink,
            }
            .into(),
            ReactorError::InvalidFileName {
                name: "a/b".to_string(),
            }
            .into(),
            ReactorError::InvalidKey {
                suffix: "..".to_string(),
            }
            .into(),
            SquirrelError::Configuration {
                reason: "no root".to_string(),
            },
        ];

        for error in errors {
            assert!(error.is_user_error(), "{error:?}");
            assert_ne!(
                error.user_message(),
                "Mirror directory could not be updated"
            );
        }
    }

    #[test]
    fn test_filesystem_failures_are_not_user_errors() {
        let error: SquirrelError = ReactorError::Missing {
            path: PathBuf::from("a/b"),
        }
        .into();

        assert!(!error.is_user_error());
        assert_eq!(
            error.user_message(),
            "Mirror directory could not be updated"
        );
    }
}
