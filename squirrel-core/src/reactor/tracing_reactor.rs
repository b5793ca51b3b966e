//! Reactor that logs every trie change.

use std::fmt::Debug;

use tracing::Level;

use super::{Reactor, ReactorError};

/// Emits one tracing event per callback at a fixed level.
#[derive(Debug, Clone, Copy)]
pub struct TracingReactor {
    level: Level,
}

impl TracingReactor {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for TracingReactor {
    fn default() -> Self {
        Self::new(Level::DEBUG)
    }
}

// tracing macros need the level as a constant, hence the dispatch.
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        let level = $level;
        if level == Level::ERROR {
            tracing::error!($($arg)+)
        } else if level == Level::WARN {
            tracing::warn!($($arg)+)
        } else if level == Level::INFO {
            tracing::info!($($arg)+)
        } else if level == Level::DEBUG {
            tracing::debug!($($arg)+)
        } else {
            tracing::trace!($($arg)+)
        }
    };
}

fn joined(chain: &[String]) -> String {
    chain.join("/")
}

impl<V: Debug> Reactor<V> for TracingReactor {
    fn created(&mut self, chain: &[String]) -> Result<(), ReactorError> {
        log_at!(self.level, chain = %joined(chain), "node created");
        Ok(())
    }

    fn inserted(&mut self, chain: &[String], value: &V) -> Result<(), ReactorError> {
        log_at!(self.level, chain = %joined(chain), ?value, "value inserted");
        Ok(())
    }

    fn deleted(&mut self, chain: &[String], value: &V) -> Result<(), ReactorError> {
        log_at!(self.level, chain = %joined(chain), ?value, "value deleted");
        Ok(())
    }

    fn removed(&mut self, chain: &[String]) -> Result<(), ReactorError> {
        log_at!(self.level, chain = %joined(chain), "node removed");
        Ok(())
    }

    fn moved(
        &mut self,
        old_chain: &[String],
        old_key: &str,
        new_chain: &[String],
        new_key: &str,
    ) -> Result<(), ReactorError> {
        log_at!(
            self.level,
            from = %joined(old_chain),
            old_key,
            to = %joined(new_chain),
            new_key,
            "subtree moved"
        );
        Ok(())
    }
}
