// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Parameter, Result};

/// The parameters of one subsystem, keyed by name.
///
/// A `SysConfig` is a plain value: handing one out or storing one always moves or clones it,
/// so no caller can alias the working copy of the node that owns it.
/// Insertion order is kept for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SysConfig {
    system_name: String,
    parameters: IndexMap<String, Parameter>,
}

impl SysConfig {
    pub fn new(system_name: impl Into<String>) -> Self {
        Self {
            system_name: system_name.into(),
            parameters: IndexMap::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.put(parameter);
        self
    }

    pub fn system_name(&self) -> &str {
        &self.system_name
    }

    /// Insert or replace by name. Returns the replaced parameter.
    pub fn put(&mut self, parameter: Parameter) -> Option<Parameter> {
        let name = parameter.name().to_string();
        self.parameters.insert(name, parameter)
    }

    /// Insert or replace by name, rejecting a value list that disagrees with `step_count`.
    ///
    /// Constant (single valued) parameters are always accepted.
    pub fn put_checked(
        &mut self,
        parameter: Parameter,
        step_count: usize,
    ) -> Result<Option<Parameter>> {
        if !parameter.is_constant() && parameter.len() != step_count {
            return Err(Error::LengthMismatch {
                parameter: parameter.name().to_string(),
                expected: step_count,
                actual: parameter.len(),
            });
        }
        Ok(self.put(parameter))
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        self.parameters.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    pub fn parameters_mut(&mut self) -> impl Iterator<Item = &mut Parameter> {
        self.parameters.values_mut()
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// The number of steps described by this configuration.
    ///
    /// The count is the length of the longest value list. Every other parameter must either
    /// have the same length or be constant; anything else is malformed and is rejected instead
    /// of padded, since padding would silently change the length of the generated sequence.
    pub fn step_count(&self) -> Result<usize> {
        let count = self.parameters().map(Parameter::len).max().unwrap_or(0);
        for parameter in self.parameters() {
            if parameter.len() != count && !parameter.is_constant() {
                return Err(Error::LengthMismatch {
                    parameter: parameter.name().to_string(),
                    expected: count,
                    actual: parameter.len(),
                });
            }
        }
        Ok(count)
    }
}
