// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use indexmap::{Equivalent, IndexMap};
use serde::{Deserialize, Serialize};

use crate::{NodeKey, Parameter, SysConfig, Value};

/// Address of a single value in a step: subsystem and parameter name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub system: String,
    pub name: String,
}

impl ItemKey {
    pub fn new(system: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            name: name.into(),
        }
    }

    /// Parse the `system:name` form.
    pub fn parse(s: &str) -> Option<Self> {
        let (system, name) = s.split_once(':')?;
        if system.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(system, name))
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.system, self.name)
    }
}

/// Borrowed form of [`ItemKey`] for lookups without allocating.
///
/// Field order and types must hash exactly like `ItemKey`.
#[derive(Hash)]
struct ItemRef<'a> {
    system: &'a str,
    name: &'a str,
}

impl Equivalent<ItemKey> for ItemRef<'_> {
    fn equivalent(&self, key: &ItemKey) -> bool {
        self.system == key.system && self.name == key.name
    }
}

fn item_ref<'a>(system: &'a str, name: &'a str) -> ItemRef<'a> {
    ItemRef { system, name }
}

pub type ConfigMap = IndexMap<ItemKey, Value>;

/// One fully resolved sequence step.
///
/// Holds exactly one value per `(system, name)`; a later [`MergedConfig::put`] for the same key
/// overwrites the earlier one. The flattened values of the previously emitted step are kept
/// for contributions that depend on step to step changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedConfig {
    values: ConfigMap,
    previous: Option<Arc<ConfigMap>>,
    node_keys: Vec<NodeKey>,
}

impl MergedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_previous(mut self, previous: Option<Arc<ConfigMap>>) -> Self {
        self.previous = previous;
        self
    }

    /// Write a value, replacing any value already stored for the key.
    pub fn put(&mut self, system: &str, name: &str, value: impl Into<Value>) -> Option<Value> {
        let value = value.into();
        if let Some(slot) = self.values.get_mut(&item_ref(system, name)) {
            return Some(std::mem::replace(slot, value));
        }
        self.values.insert(ItemKey::new(system, name), value);
        None
    }

    pub fn put_item(&mut self, key: ItemKey, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key, value.into())
    }

    /// Write the values of `sys_config` for the given step.
    ///
    /// Absent cells leave the key untouched.
    pub fn merge_sys_config(&mut self, sys_config: &SysConfig, step: usize) {
        let system = sys_config.system_name();
        for parameter in sys_config.parameters() {
            if let Some(value) = parameter.value_at(step) {
                self.put(system, parameter.name(), value.clone());
            }
        }
    }

    pub fn get(&self, system: &str, name: &str) -> Option<&Value> {
        self.values.get(&item_ref(system, name))
    }

    pub fn get_item(&self, key: &ItemKey) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, system: &str, name: &str) -> bool {
        self.values.contains_key(&item_ref(system, name))
    }

    pub fn remove(&mut self, system: &str, name: &str) -> Option<Value> {
        self.values.shift_remove(&item_ref(system, name))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemKey, &Value)> {
        self.values.iter()
    }

    pub fn values(&self) -> &ConfigMap {
        &self.values
    }

    /// Distinct subsystem names, in first-write order.
    pub fn system_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for key in self.values.keys() {
            if !names.contains(&key.system.as_str()) {
                names.push(&key.system);
            }
        }
        names
    }

    /// The single valued view of one subsystem, for consumers that work per subsystem.
    pub fn sys_config(&self, system: &str) -> Option<SysConfig> {
        let mut sys_config = SysConfig::new(system);
        for (key, value) in self.values.iter().filter(|(k, _)| k.system == system) {
            sys_config.put(Parameter::single(key.name.clone(), value.clone()));
        }
        (!sys_config.is_empty()).then_some(sys_config)
    }

    /// The flattened values of the previously emitted step, if any.
    pub fn previous(&self) -> Option<&ConfigMap> {
        self.previous.as_deref()
    }

    /// Look a value up in this step, falling back on the previous step.
    pub fn lookup_with_fallback(&self, system: &str, name: &str) -> Option<&Value> {
        self.get(system, name).or_else(|| self.previous()?.get(&item_ref(system, name)))
    }

    /// Whether the value differs from the previous step.
    ///
    /// The first step of a sequence counts as a change for every key it contains.
    pub fn changed_since_previous(&self, system: &str, name: &str) -> bool {
        match self.previous() {
            None => self.contains(system, name),
            Some(previous) => previous.get(&item_ref(system, name)) != self.get(system, name),
        }
    }

    /// Keys of the nodes that contributed to this step, outermost first.
    pub fn node_keys(&self) -> &[NodeKey] {
        &self.node_keys
    }

    pub fn push_node_key(&mut self, key: NodeKey) {
        self.node_keys.push(key);
    }

    /// Split off the flattened values, dropping the back reference.
    pub fn into_values(self) -> ConfigMap {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_writer_wins() {
        let mut config = MergedConfig::new();
        assert_eq!(config.put("instrument", "filter", "J"), None);
        assert_eq!(
            config.put("instrument", "filter", "H"),
            Some(Value::from("J"))
        );
        assert_eq!(config.len(), 1);
        assert_eq!(config.get("instrument", "filter"), Some(&Value::from("H")));
    }

    #[test]
    fn test_missing_keys_are_tolerated() {
        let config = MergedConfig::new();
        assert_eq!(config.get("instrument", "filter"), None);
        assert_eq!(config.lookup_with_fallback("instrument", "filter"), None);
        assert!(!config.changed_since_previous("instrument", "filter"));
    }

    #[test]
    fn test_previous_step_lookup() {
        let mut first = MergedConfig::new();
        first.put("instrument", "disperser", "32_mm");
        first.put("instrument", "filter", "J");
        assert!(first.changed_since_previous("instrument", "disperser"));

        let previous = Arc::new(first.into_values());
        let mut second = MergedConfig::new().with_previous(Some(previous));
        second.put("instrument", "disperser", "32_mm");
        assert!(!second.changed_since_previous("instrument", "disperser"));
        assert!(second.changed_since_previous("instrument", "filter"));
        assert_eq!(
            second.lookup_with_fallback("instrument", "filter"),
            Some(&Value::from("J"))
        );
    }

    #[test]
    fn test_sys_config_view() {
        let mut config = MergedConfig::new();
        config.put("instrument", "filter", "J");
        config.put("observe", "coadds", 2);
        config.put("instrument", "readMode", "FAINT");
        assert_eq!(config.system_names(), vec!["instrument", "observe"]);
        let sc = config.sys_config("instrument").unwrap();
        assert_eq!(sc.len(), 2);
        assert!(config.sys_config("telescope").is_none());
    }

    #[test]
    fn test_merge_sys_config_skips_absent_cells() {
        let sc = SysConfig::new("instrument")
            .with_parameter(Parameter::sparse("filter", vec![Some("J".into()), None]))
            .with_parameter(Parameter::single("readMode", "FAINT"));
        let mut config = MergedConfig::new();
        config.merge_sys_config(&sc, 1);
        assert!(!config.contains("instrument", "filter"));
        let read_mode = config.get("instrument", "readMode");
        assert_eq!(read_mode, Some(&Value::from("FAINT")));
    }

    #[test]
    fn test_item_key_parse() {
        assert_eq!(
            ItemKey::parse("instrument:filter"),
            Some(ItemKey::new("instrument", "filter"))
        );
        assert_eq!(ItemKey::parse("filter"), None);
        let key = ItemKey::new("observe", "class");
        assert_eq!(key.to_string(), "observe:class");
    }
}
