// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

//! Boundary to the hierarchical document store used for persistence.
//!
//! The store itself is opaque; configurations only need "list the names under a path",
//! "get the value(s) of a name" and "set the value(s) of a name".

use serde_json::{Map, Value as JsonValue};

use crate::{Error, Parameter, Result, SysConfig, Value};

/// What is stored for one parameter name.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Single(Option<Value>),
    List(Vec<Option<Value>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredParam {
    pub value: StoredValue,
    pub units: Option<String>,
}

pub trait ParamStore {
    /// Names of the parameters stored directly under `path`.
    fn names(&self, path: &str) -> Vec<String>;
    fn get(&self, path: &str, name: &str) -> Result<Option<StoredParam>>;
    fn set(&mut self, path: &str, name: &str, param: StoredParam) -> Result<()>;

    fn get_value(&self, path: &str, name: &str) -> Result<Option<Value>> {
        Ok(match self.get(path, name)?.map(|p| p.value) {
            Some(StoredValue::Single(value)) => value,
            Some(StoredValue::List(values)) => values.into_iter().next().flatten(),
            None => None,
        })
    }

    fn get_bool(&self, path: &str, name: &str, default: bool) -> Result<bool> {
        let value = self.get_value(path, name)?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(default))
    }

    fn get_int(&self, path: &str, name: &str, default: i64) -> Result<i64> {
        let value = self.get_value(path, name)?;
        Ok(value.and_then(|v| v.as_int()).unwrap_or(default))
    }

    fn get_double(&self, path: &str, name: &str, default: f64) -> Result<f64> {
        let value = self.get_value(path, name)?;
        Ok(value.and_then(|v| v.as_double()).unwrap_or(default))
    }
}

impl SysConfig {
    /// Write every parameter under `path`, as a single value when constant and as an ordered
    /// list otherwise.
    pub fn write_to(&self, store: &mut impl ParamStore, path: &str) -> Result<()> {
        for parameter in self.parameters() {
            let value = if parameter.is_constant() {
                StoredValue::Single(parameter.values()[0].clone())
            } else {
                StoredValue::List(parameter.values().to_vec())
            };
            let param = StoredParam {
                value,
                units: parameter.units().map(str::to_string),
            };
            store.set(path, parameter.name(), param)?;
        }
        Ok(())
    }

    pub fn read_from(store: &impl ParamStore, path: &str, system_name: &str) -> Result<Self> {
        let mut sys_config = SysConfig::new(system_name);
        for name in store.names(path) {
            let Some(stored) = store.get(path, &name)? else {
                continue;
            };
            let values = match stored.value {
                StoredValue::Single(value) => vec![value],
                StoredValue::List(values) => values,
            };
            let mut parameter = Parameter::sparse(name, values);
            if let Some(units) = stored.units {
                parameter = parameter.with_units(units);
            }
            sys_config.put(parameter);
        }
        Ok(sys_config)
    }
}

/// A [`ParamStore`] kept in memory as a JSON document.
///
/// Paths are `/` separated object keys. A parameter is an object with a `value` or `values`
/// member and an optional `units` member.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonParamStore {
    root: Map<String, JsonValue>,
}

impl JsonParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        match serde_json::from_str::<JsonValue>(text).map_err(|e| persistence_error("/", e))? {
            JsonValue::Object(root) => Ok(Self { root }),
            _ => Err(Error::Persistence {
                path: "/".to_string(),
                reason: "document root is not an object".to_string(),
            }),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.root).map_err(|e| persistence_error("/", e))
    }

    fn node(&self, path: &str) -> Option<&Map<String, JsonValue>> {
        let mut node = &self.root;
        for segment in segments(path) {
            node = node.get(segment)?.as_object()?;
        }
        Some(node)
    }

    fn node_mut(&mut self, path: &str) -> Result<&mut Map<String, JsonValue>> {
        let mut node = &mut self.root;
        for segment in segments(path) {
            node = node
                .entry(segment)
                .or_insert_with(|| JsonValue::Object(Map::new()))
                .as_object_mut()
                .ok_or_else(|| Error::Persistence {
                    path: path.to_string(),
                    reason: format!("'{segment}' is not a container"),
                })?;
        }
        Ok(node)
    }
}

impl ParamStore for JsonParamStore {
    fn names(&self, path: &str) -> Vec<String> {
        self.node(path)
            .map(|node| {
                node.iter()
                    .filter(|(_, v)| is_param(v))
                    .map(|(k, _)| k.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn get(&self, path: &str, name: &str) -> Result<Option<StoredParam>> {
        let Some(entry) = self.node(path).and_then(|node| node.get(name)) else {
            return Ok(None);
        };
        let units = entry
            .get("units")
            .and_then(JsonValue::as_str)
            .map(str::to_string);
        let value = if let Some(list) = entry.get("values") {
            StoredValue::List(
                serde_json::from_value(list.clone()).map_err(|e| persistence_error(path, e))?,
            )
        } else if let Some(single) = entry.get("value") {
            StoredValue::Single(
                serde_json::from_value(single.clone()).map_err(|e| persistence_error(path, e))?,
            )
        } else {
            return Ok(None);
        };
        Ok(Some(StoredParam { value, units }))
    }

    fn set(&mut self, path: &str, name: &str, param: StoredParam) -> Result<()> {
        let mut entry = Map::new();
        let (key, value) = match param.value {
            StoredValue::Single(value) => ("value", serde_json::to_value(value)),
            StoredValue::List(values) => ("values", serde_json::to_value(values)),
        };
        let value = value.map_err(|e| persistence_error(path, e))?;
        entry.insert(key.to_string(), value);
        if let Some(units) = param.units {
            entry.insert("units".to_string(), JsonValue::String(units));
        }
        self.node_mut(path)?.insert(name.to_string(), JsonValue::Object(entry));
        Ok(())
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn is_param(value: &JsonValue) -> bool {
    value
        .as_object()
        .is_some_and(|o| o.contains_key("value") || o.contains_key("values"))
}

fn persistence_error(path: &str, error: serde_json::Error) -> Error {
    Error::Persistence {
        path: path.to_string(),
        reason: error.to_string(),
    }
}
