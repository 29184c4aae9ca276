// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

use obsseq_config::{ItemKey, MergedConfig, Value};

/// A value computed from the step being assembled.
///
/// Evaluated right after the owning node's own contribution, so it sees everything written by
/// ancestors and by the node itself, plus the previously emitted step.
pub trait DerivedParameter: std::fmt::Debug + Send + Sync {
    fn key(&self) -> &ItemKey;

    /// `None` leaves the key untouched.
    fn derive(&self, step: &MergedConfig) -> Option<Value>;
}

/// A [`DerivedParameter`] backed by a plain function.
#[derive(Debug, Clone)]
pub struct DerivedFn {
    key: ItemKey,
    func: fn(&MergedConfig) -> Option<Value>,
}

impl DerivedFn {
    pub fn new(key: ItemKey, func: fn(&MergedConfig) -> Option<Value>) -> Self {
        Self { key, func }
    }
}

impl DerivedParameter for DerivedFn {
    fn key(&self) -> &ItemKey {
        &self.key
    }

    fn derive(&self, step: &MergedConfig) -> Option<Value> {
        (self.func)(step)
    }
}

pub(crate) fn apply_derived(
    derived: &[std::sync::Arc<dyn DerivedParameter>],
    step: &mut MergedConfig,
) {
    for parameter in derived {
        if let Some(value) = parameter.derive(step) {
            step.put_item(parameter.key().clone(), value);
        }
    }
}
