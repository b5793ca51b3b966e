//! Reactor that records every callback for later inspection.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{Reactor, ReactorError};

/// One callback received by a [`RecordingReactor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactorEvent<V> {
    Created {
        chain: Vec<String>,
    },
    Inserted {
        chain: Vec<String>,
        value: V,
    },
    Deleted {
        chain: Vec<String>,
        value: V,
    },
    Removed {
        chain: Vec<String>,
    },
    Moved {
        old_chain: Vec<String>,
        old_key: String,
        new_chain: Vec<String>,
        new_key: String,
    },
}

/// Records callbacks into a log shared by all clones.
///
/// Hand one clone to the trie and keep another to look at the events.
pub struct RecordingReactor<V> {
    events: Arc<Mutex<Vec<ReactorEvent<V>>>>,
}

impl<V> RecordingReactor<V> {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Drains the log, returning the events recorded so far.
    pub fn take_events(&self) -> Vec<ReactorEvent<V>> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    fn record(&self, event: ReactorEvent<V>) -> Result<(), ReactorError> {
        self.events.lock().push(event);
        Ok(())
    }
}

impl<V: Clone> RecordingReactor<V> {
    /// Copies the log without draining it.
    pub fn events(&self) -> Vec<ReactorEvent<V>> {
        self.events.lock().clone()
    }
}

impl<V> Clone for RecordingReactor<V> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<V> Default for RecordingReactor<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Reactor<V> for RecordingReactor<V> {
    fn created(&mut self, chain: &[String]) -> Result<(), ReactorError> {
        self.record(ReactorEvent::Created {
            chain: chain.to_vec(),
        })
    }

    fn inserted(&mut self, chain: &[String], value: &V) -> Result<(), ReactorError> {
        self.record(ReactorEvent::Inserted {
            chain: chain.to_vec(),
            value: value.clone(),
        })
    }

    fn deleted(&mut self, chain: &[String], value: &V) -> Result<(), ReactorError> {
        self.record(ReactorEvent::Deleted {
            chain: chain.to_vec(),
            value: value.clone(),
        })
    }

    fn removed(&mut self, chain: &[String]) -> Result<(), ReactorError> {
        self.record(ReactorEvent::Removed {
            chain: chain.to_vec(),
        })
    }

    fn moved(
        &mut self,
        old_chain: &[String],
        old_key: &str,
        new_chain: &[String],
        new_key: &str,
    ) -> Result<(), ReactorError> {
        self.record(ReactorEvent::Moved {
            old_chain: old_chain.to_vec(),
            old_key: old_key.to_string(),
            new_chain: new_chain.to_vec(),
            new_key: new_key.to_string(),
        })
    }
}
