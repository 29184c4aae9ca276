// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

//! Settings for the instrument synchronizer.

#[derive(Debug, Clone)]
pub struct SanitizationChange {
    pub field: &'static str,
    pub original: String,
    pub sanitized: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Property never driven by sequence data.
    pub title_property: String,
    /// Upper bound on passes run by [`InstrumentSynchronizer::settle`].
    ///
    /// [`InstrumentSynchronizer::settle`]: crate::InstrumentSynchronizer::settle
    pub max_settle_rounds: usize,
}

pub const DEFAULT_TITLE_PROPERTY: &str = "title";
pub const DEFAULT_MAX_SETTLE_ROUNDS: usize = 4;
/// A converging pair of passes plus the confirming one.
const MIN_SETTLE_ROUNDS: usize = 3;

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            title_property: DEFAULT_TITLE_PROPERTY.to_string(),
            max_settle_rounds: DEFAULT_MAX_SETTLE_ROUNDS,
        }
    }
}

impl SyncSettings {
    pub fn new(title_property: impl Into<String>, max_settle_rounds: usize) -> Self {
        Self {
            title_property: title_property.into(),
            max_settle_rounds,
        }
    }

    pub fn sanitize(&mut self) -> Vec<SanitizationChange> {
        let mut changes = vec![];
        if self.title_property.trim().is_empty() {
            changes.push(SanitizationChange {
                field: "title_property",
                original: self.title_property.clone(),
                sanitized: DEFAULT_TITLE_PROPERTY.to_string(),
                reason: "Must name a property.".to_string(),
            });
            self.title_property = DEFAULT_TITLE_PROPERTY.to_string();
        }
        if self.max_settle_rounds < MIN_SETTLE_ROUNDS {
            changes.push(SanitizationChange {
                field: "max_settle_rounds",
                original: self.max_settle_rounds.to_string(),
                sanitized: MIN_SETTLE_ROUNDS.to_string(),
                reason: format!("{MIN_SETTLE_ROUNDS} rounds are needed to confirm convergence."),
            });
            self.max_settle_rounds = MIN_SETTLE_ROUNDS;
        }
        changes
    }
}
