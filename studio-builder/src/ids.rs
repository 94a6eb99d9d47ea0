use std::collections::HashSet;

use crate::config::IdStrategy;

/// Per-session id source.
///
/// Candidates are always checked against the ids currently in use, so hydrating a document
/// whose ids came from an earlier session cannot produce a collision.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    strategy: IdStrategy,
    prefix: String,
    next: u64,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy, prefix: impl Into<String>) -> Self {
        Self {
            strategy,
            prefix: prefix.into(),
            next: 1,
        }
    }

    pub fn counter(prefix: impl Into<String>) -> Self {
        Self::new(IdStrategy::Counter, prefix)
    }

    /// Next id not contained in `taken`.
    pub fn next_id(&mut self, taken: &HashSet<String>) -> String {
        loop {
            let candidate = self.candidate();
            if !taken.contains(&candidate) {
                return candidate;
            }
            tracing::trace!(id = %candidate, "id already in use, skipping");
        }
    }

    fn candidate(&mut self) -> String {
        match self.strategy {
            IdStrategy::Counter => {
                let n = self.next;
                self.next += 1;
                format!("{}-{}", self.prefix, n)
            }
            IdStrategy::Uuid => format!("{}-{}", self.prefix, uuid::Uuid::new_v4()),
        }
    }
}
