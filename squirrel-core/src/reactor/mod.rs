//! Reactors observe structural changes of a [`Trie`](crate::Trie).
//!
//! Every callback receives the chain of the affected node: the suffixes of all
//! nodes from the root down to it, starting with the root's empty suffix.

pub mod file_reactor;
#[cfg(any(test, feature = "test-utils"))]
pub mod recording;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
pub mod tracing_reactor;

use std::path::PathBuf;

pub use file_reactor::FileReactor;
#[cfg(any(test, feature = "test-utils"))]
pub use recording::{ReactorEvent, RecordingReactor};
pub use tracing_reactor::TracingReactor;

use crate::config::PlacementMethod;

/// Callbacks fired by a trie while it changes shape.
///
/// A failing callback aborts the trie operation that fired it; the error is
/// returned to the caller as [`TrieError::Reactor`](crate::TrieError::Reactor).
pub trait Reactor<V> {
    /// A node was created, the root included.
    ///
    /// # Errors
    ///
    /// Implementation specific.
    fn created(&mut self, chain: &[String]) -> Result<(), ReactorError>;

    /// A value was stored at the node, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Implementation specific.
    fn inserted(&mut self, chain: &[String], value: &V) -> Result<(), ReactorError>;

    /// A value was taken out of the node.
    ///
    /// # Errors
    ///
    /// Implementation specific.
    fn deleted(&mut self, chain: &[String], value: &V) -> Result<(), ReactorError>;

    /// The node left the trie. It holds no value and no children by now.
    ///
    /// # Errors
    ///
    /// Implementation specific.
    fn removed(&mut self, chain: &[String]) -> Result<(), ReactorError>;

    /// The subtree `old_key` under `old_chain` now lives as `new_key` under
    /// `new_chain`.
    ///
    /// # Errors
    ///
    /// Implementation specific.
    fn moved(
        &mut self,
        old_chain: &[String],
        old_key: &str,
        new_chain: &[String],
        new_key: &str,
    ) -> Result<(), ReactorError>;
}

/// Errors raised by reactors.
#[derive(Debug, thiserror::Error)]
pub enum ReactorError {
    /// Placement method name not recognised
    #[error("Acceptable methods are: copy, hardlink, symlink (got {name:?})")]
    InvalidMethod {
        /// Name that was given
        name: String,
    },

    /// Placement method unavailable on this platform
    #[error("{method} is not supported on this platform")]
    UnsupportedMethod {
        /// Method that was requested
        method: PlacementMethod,
    },

    #[error("{} is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("{} is not writable", .path.display())]
    NotWritable { path: PathBuf },

    #[error("Invalid ignore pattern: {0}")]
    InvalidIgnorePattern(#[from] regex::Error),

    /// Value entry that is not a plain file name
    #[error("{name:?} is not a plain file name")]
    InvalidFileName { name: String },

    /// Key suffix that would leave the mirror root as a directory name
    #[error("Key part {suffix:?} cannot be mirrored as a directory")]
    InvalidKey { suffix: String },

    #[error("{} already exists", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("{} does not exist", .path.display())]
    Missing { path: PathBuf },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by a reactor outside this crate
    #[error("Reactor failed: {reason}")]
    Failed { reason: String },
}

impl ReactorError {
    /// Adapter for `map_err` that attaches the path an I/O operation touched.
    pub(crate) fn io_at(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| ReactorError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the error stems from the given configuration or data rather
    /// than from the state of the file system.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ReactorError::InvalidMethod { .. }
                | ReactorError::UnsupportedMethod { .. }
                | ReactorError::NotADirectory { .. }
                | ReactorError::NotWritable { .. }
                | ReactorError::InvalidIgnorePattern(_)
                | ReactorError::InvalidFileName { .. }
                | ReactorError::InvalidKey { .. }
        )
    }
}

/// Reactor which does nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyReactor;

impl<V> Reactor<V> for EmptyReactor {
    fn created(&mut self, _chain: &[String]) -> Result<(), ReactorError> {
        Ok(())
    }

    fn inserted(&mut self, _chain: &[String], _value: &V) -> Result<(), ReactorError> {
        Ok(())
    }

    fn deleted(&mut self, _chain: &[String], _value: &V) -> Result<(), ReactorError> {
        Ok(())
    }

    fn removed(&mut self, _chain: &[String]) -> Result<(), ReactorError> {
        Ok(())
    }

    fn moved(
        &mut self,
        _old_chain: &[String],
        _old_key: &str,
        _new_chain: &[String],
        _new_key: &str,
    ) -> Result<(), ReactorError> {
        Ok(())
    }
}

/// Reactor forwarding every callback to a list of sub-reactors, in order.
///
/// Forwarding stops at the first sub-reactor that fails.
pub struct CompositeReactor<V> {
    reactors: Vec<Box<dyn Reactor<V>>>,
}

impl<V> CompositeReactor<V> {
    pub fn new(reactors: Vec<Box<dyn Reactor<V>>>) -> Self {
        Self { reactors }
    }

    /// Appends a sub-reactor; it sees callbacks after all earlier ones.
    pub fn push(&mut self, reactor: impl Reactor<V> + 'static) {
        self.reactors.push(Box::new(reactor));
    }

    pub fn len(&self) -> usize {
        self.reactors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactors.is_empty()
    }
}

impl<V> Default for CompositeReactor<V> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<V> std::fmt::Debug for CompositeReactor<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeReactor")
            .field("reactors", &self.reactors.len())
            .finish()
    }
}

impl<V> Reactor<V> for CompositeReactor<V> {
    fn created(&mut self, chain: &[String]) -> Result<(), ReactorError> {
        self.reactors
            .iter_mut()
            .try_for_each(|reactor| reactor.created(chain))
    }

    fn inserted(&mut self, chain: &[String], value: &V) -> Result<(), ReactorError> {
        self.reactors
            .iter_mut()
            .try_for_each(|reactor| reactor.inserted(chain, value))
    }

    fn deleted(&mut self, chain: &[String], value: &V) -> Result<(), ReactorError> {
        self.reactors
            .iter_mut()
            .try_for_each(|reactor| reactor.deleted(chain, value))
    }

    fn removed(&mut self, chain: &[String]) -> Result<(), ReactorError> {
        self.reactors
            .iter_mut()
            .try_for_each(|reactor| reactor.removed(chain))
    }

    fn moved(
        &mut self,
        old_chain: &[String],
        old_key: &str,
        new_chain: &[String],
        new_key: &str,
    ) -> Result<(), ReactorError> {
        self.reactors
            .iter_mut()
            .try_for_each(|reactor| reactor.moved(old_chain, old_key, new_chain, new_key))
    }
}

impl<V, R: Reactor<V> + ?Sized> Reactor<V> for Box<R> {
    fn created(&mut self, chain: &[String]) -> Result<(), ReactorError> {
        (**self).created(chain)
    }

    fn inserted(&mut self, chain: &[String], value: &V) -> Result<(), ReactorError> {
        (**self).inserted(chain, value)
    }

    fn deleted(&mut self, chain: &[String], value: &V) -> Result<(), ReactorError> {
        (**self).deleted(chain, value)
    }

    fn removed(&mut self, chain: &[String]) -> Result<(), ReactorError> {
        (**self).removed(chain)
    }

    fn moved(
        &mut self,
        old_chain: &[String],
        old_key: &str,
        new_chain: &[String],
        new_key: &str,
    ) -> Result<(), ReactorError> {
        (**self).moved(old_chain, old_key, new_chain, new_key)
    }
}

impl<V, R: Reactor<V> + ?Sized> Reactor<V> for &mut R {
    fn created(&mut self, chain: &[String]) -> Result<(), ReactorError> {
        (**self).created(chain)
    }

    fn inserted(&mut self, chain: &[String], value: &V) -> Result<(), ReactorError> {
        (**self).inserted(chain, value)
    }

    fn deleted(&mut self, chain: &[String], value: &V) -> Result<(), ReactorError> {
        (**self).deleted(chain, value)
    }

    fn removed(&mut self, chain: &[String]) -> Result<(), ReactorError> {
        (**self).removed(chain)
    }

    fn moved(
        &mut self,
        old_chain: &[String],
        old_key: &str,
        new_chain: &[String],
        new_key: &str,
    ) -> Result<(), ReactorError> {
        (**self).moved(old_chain, old_key, new_chain, new_key)
    }
}

#[cfg(test)]
mod tests {
    use super::test_fixtures::chain_of;
    use super::*;

    /// Sub-reactor that rejects everything.
    struct RejectingReactor;

    impl Reactor<&'static str> for RejectingReactor {
        fn created(&mut self, _chain: &[String]) -> Result<(), ReactorError> {
            Err(rejected())
        }

        fn inserted(
            &mut self,
            _chain: &[String],
            _value: &&'static str,
        ) -> Result<(), ReactorError> {
            Err(rejected())
        }

        fn deleted(
            &mut self,
            _chain: &[String],
            _value: &&'static str,
        ) -> Result<(), ReactorError> {
            Err(rejected())
        }

        fn removed(&mut self, _chain: &[String]) -> Result<(), ReactorError> {
            Err(rejected())
        }

        fn moved(
            &mut self,
            _old_chain: &[String],
            _old_key: &str,
            _new_chain: &[String],
            _new_key: &str,
        ) -> Result<(), ReactorError> {
            Err(rejected())
        }
    }

    fn rejected() -> ReactorError {
        ReactorError::Failed {
            reason: "rejected".to_string(),
        }
    }

    #[test]
    fn test_composite_forwards_each_callback_once() {
        let recorders: Vec<RecordingReactor<&'static str>> =
            (0..3).map(|_| RecordingReactor::new()).collect();
        let mut composite = CompositeReactor::new(
            recorders
                .iter()
                .map(|r| Box::new(r.clone()) as Box<dyn Reactor<&'static str>>)
                .collect(),
        );

        let check = |expected: ReactorEvent<&'static str>| {
            for recorder in &recorders {
                assert_eq!(recorder.take_events(), vec![expected.clone()]);
            }
        };

        composite.inserted(&chain_of(&["chain1"]), &"value1").unwrap();
        check(ReactorEvent::Inserted {
            chain: chain_of(&["chain1"]),
            value: "value1",
        });

        composite.removed(&chain_of(&["chain2"])).unwrap();
        check(ReactorEvent::Removed {
            chain: chain_of(&["chain2"]),
        });

        composite.deleted(&chain_of(&["chain3"]), &"value3").unwrap();
        check(ReactorEvent::Deleted {
            chain: chain_of(&["chain3"]),
            value: "value3",
        });

        composite
            .moved(&chain_of(&["chain4"]), "value4", &chain_of(&["chain5"]), "value5")
            .unwrap();
        check(ReactorEvent::Moved {
            old_chain: chain_of(&["chain4"]),
            old_key: "value4".to_string(),
            new_chain: chain_of(&["chain5"]),
            new_key: "value5".to_string(),
        });

        composite.created(&chain_of(&["chain6"])).unwrap();
        check(ReactorEvent::Created {
            chain: chain_of(&["chain6"]),
        });
    }

    #[test]
    fn test_composite_stops_at_first_failure() {
        let before = RecordingReactor::new();
        let after = RecordingReactor::new();
        let mut composite = CompositeReactor::default();
        composite.push(before.clone());
        composite.push(RejectingReactor);
        composite.push(after.clone());
        assert_eq!(composite.len(), 3);

        let result = composite.created(&chain_of(&["", "a"]));

        assert!(matches!(result, Err(ReactorError::Failed { .. })));
        assert_eq!(before.take_events().len(), 1);
        assert!(after.take_events().is_empty());
    }

    #[test]
    fn test_empty_composite_accepts_everything() {
        let mut composite: CompositeReactor<u8> = CompositeReactor::default();

        assert!(composite.is_empty());
        assert!(composite.created(&chain_of(&[""])).is_ok());
        assert!(composite.inserted(&chain_of(&[""]), &1).is_ok());
    }

    #[test]
    fn test_boxed_and_borrowed_reactors_forward() {
        let recorder = RecordingReactor::<u8>::new();
        let mut boxed: Box<dyn Reactor<u8>> = Box::new(recorder.clone());
        boxed.created(&chain_of(&["", "x"])).unwrap();

        fn remove_x<R: Reactor<u8>>(mut reactor: R) {
            reactor.removed(&chain_of(&["", "x"])).unwrap();
        }
        let mut inner = recorder.clone();
        remove_x(&mut inner);

        assert_eq!(recorder.take_events().len(), 2);
    }
}
