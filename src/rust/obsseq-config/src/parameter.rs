// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::Value;

/// A named, ordered slot with one value per sequence step.
///
/// A parameter with a single value is constant and applies to every step of its owner.
/// Individual steps may be absent (`None`), e.g. a blank cell in an iterator table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    values: Vec<Option<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    units: Option<String>,
}

impl Parameter {
    pub fn new<V: Into<Value>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(|v| Some(v.into())).collect(),
            units: None,
        }
    }

    pub fn single(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            values: vec![Some(value.into())],
            units: None,
        }
    }

    /// Create a parameter whose steps may be absent.
    pub fn sparse(name: impl Into<String>, values: Vec<Option<Value>>) -> Self {
        Self {
            name: name.into(),
            values,
            units: None,
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A constant parameter applies its single value to every step.
    pub fn is_constant(&self) -> bool {
        self.values.len() == 1
    }

    /// Value for the given step, honouring constant parameters.
    pub fn value_at(&self, step: usize) -> Option<&Value> {
        if self.is_constant() {
            return self.values[0].as_ref();
        }
        self.values.get(step).and_then(Option::as_ref)
    }

    /// The row 0 value.
    pub fn first(&self) -> Option<&Value> {
        self.values.first().and_then(Option::as_ref)
    }

    /// Replace the row 0 value, returning `true` if it differed.
    ///
    /// An empty parameter is left untouched; row 0 only exists once a step does.
    pub fn set_first(&mut self, value: Option<Value>) -> bool {
        match self.values.first_mut() {
            Some(slot) if *slot != value => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    pub fn set_values(&mut self, values: Vec<Option<Value>>) {
        self.values = values;
    }
}
