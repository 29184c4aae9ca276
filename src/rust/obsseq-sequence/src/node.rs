// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use obsseq_config::{NodeKey, SysConfig};

use crate::builder::{ConfigBuilder, IteratorBuilder, ObserveBuilder, RepeatBuilder};
use crate::derived::DerivedParameter;
use crate::options::{ObsClass, ObserveType};

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatSpec {
    /// Stored as persisted; a negative count is malformed.
    pub count: i64,
}

/// A table of per-step values for one subsystem.
#[derive(Debug, Clone, PartialEq)]
pub struct IteratorSpec {
    /// Narrow type of the static instrument this iterator drives, if any.
    pub instrument: Option<String>,
    pub sys_config: SysConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObserveSpec {
    pub observe_type: ObserveType,
    pub obs_class: Option<ObsClass>,
    pub repeat: i64,
    pub exposure_time: Option<f64>,
    pub coadds: Option<i64>,
}

impl ObserveSpec {
    pub fn new(observe_type: ObserveType, repeat: i64) -> Self {
        Self {
            observe_type,
            obs_class: None,
            repeat,
            exposure_time: None,
            coadds: None,
        }
    }

    pub fn obs_class(mut self, class: ObsClass) -> Self {
        self.obs_class = Some(class);
        self
    }

    pub fn exposure_time(mut self, seconds: f64) -> Self {
        self.exposure_time = Some(seconds);
        self
    }

    pub fn coadds(mut self, coadds: i64) -> Self {
        self.coadds = Some(coadds);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Top of an observation's sequence. Runs its children once.
    Root,
    Repeat(RepeatSpec),
    Iterator(IteratorSpec),
    Observe(ObserveSpec),
}

impl NodeKind {
    /// Whether a node of this kind emits steps once it has no children.
    ///
    /// Pure loop nodes only ever re-run their children.
    fn emits_when_childless(&self) -> bool {
        matches!(self, NodeKind::Iterator(_) | NodeKind::Observe(_))
    }
}

/// A node of the sequence tree. Children are owned exclusively.
#[derive(Debug, Clone)]
pub struct SequenceNode {
    key: NodeKey,
    kind: NodeKind,
    children: Vec<SequenceNode>,
    derived: Vec<Arc<dyn DerivedParameter>>,
}

impl SequenceNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            key: NodeKey::new(),
            kind,
            children: Vec::new(),
            derived: Vec::new(),
        }
    }

    pub fn root() -> Self {
        Self::new(NodeKind::Root)
    }

    pub fn repeat(count: i64) -> Self {
        Self::new(NodeKind::Repeat(RepeatSpec { count }))
    }

    /// A generic config iterator, not paired with any static instrument.
    pub fn config_iterator(sys_config: SysConfig) -> Self {
        Self::new(NodeKind::Iterator(IteratorSpec {
            instrument: None,
            sys_config,
        }))
    }

    pub fn instrument_iterator(narrow_type: impl Into<String>, sys_config: SysConfig) -> Self {
        Self::new(NodeKind::Iterator(IteratorSpec {
            instrument: Some(narrow_type.into()),
            sys_config,
        }))
    }

    pub fn observe(spec: ObserveSpec) -> Self {
        Self::new(NodeKind::Observe(spec))
    }

    pub fn with_child(mut self, child: SequenceNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_derived(mut self, derived: Arc<dyn DerivedParameter>) -> Self {
        self.derived.push(derived);
        self
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn children(&self) -> &[SequenceNode] {
        &self.children
    }

    pub fn add_child(&mut self, child: SequenceNode) {
        self.children.push(child);
    }

    pub fn insert_child(&mut self, index: usize, child: SequenceNode) {
        self.children.insert(index.min(self.children.len()), child);
    }

    pub fn remove_child(&mut self, key: NodeKey) -> Option<SequenceNode> {
        let index = self.children.iter().position(|c| c.key == key)?;
        Some(self.children.remove(index))
    }

    pub fn derived(&self) -> &[Arc<dyn DerivedParameter>] {
        &self.derived
    }

    /// Whether this node emits a step per repetition, rather than re-running children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.kind.emits_when_childless()
    }

    /// Narrow type of the static instrument this node iterates, if it is an instrument iterator.
    pub fn instrument_type(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Iterator(spec) => spec.instrument.as_deref(),
            _ => None,
        }
    }

    pub fn is_instrument_iterator(&self) -> bool {
        self.instrument_type().is_some()
    }

    /// A copy of the node's configuration table.
    pub fn sys_config(&self) -> Option<SysConfig> {
        match &self.kind {
            NodeKind::Iterator(spec) => Some(spec.sys_config.clone()),
            _ => None,
        }
    }

    /// Replace the node's configuration table. Returns `false` for nodes without one.
    pub fn set_sys_config(&mut self, sys_config: SysConfig) -> bool {
        match &mut self.kind {
            NodeKind::Iterator(spec) => {
                spec.sys_config = sys_config;
                true
            }
            _ => false,
        }
    }

    /// Pre-order depth first traversal of this node and all descendants.
    pub fn iter(&self) -> impl Iterator<Item = &SequenceNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    pub fn find(&self, key: NodeKey) -> Option<&SequenceNode> {
        self.iter().find(|n| n.key == key)
    }

    pub fn find_mut(&mut self, key: NodeKey) -> Option<&mut SequenceNode> {
        if self.key == key {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(key))
    }

    /// First instrument iterator in document order.
    pub fn first_instrument_iterator(&self) -> Option<&SequenceNode> {
        self.iter().find(|n| n.is_instrument_iterator())
    }

    /// First iterator (document order) paired with the given instrument narrow type.
    pub fn find_instrument_iterator(&self, narrow_type: &str) -> Option<&SequenceNode> {
        self.iter().find(|n| n.instrument_type() == Some(narrow_type))
    }

    pub fn find_instrument_iterator_mut(&mut self, narrow_type: &str) -> Option<&mut SequenceNode> {
        let key = self.find_instrument_iterator(narrow_type)?.key;
        self.find_mut(key)
    }

    /// A fresh, unreset builder over this node's own data.
    pub fn builder(&self) -> Box<dyn ConfigBuilder + '_> {
        match &self.kind {
            NodeKind::Root => Box::new(RepeatBuilder::new(self.key, 1)),
            NodeKind::Repeat(spec) => Box::new(RepeatBuilder::new(self.key, spec.count)),
            NodeKind::Iterator(spec) => Box::new(IteratorBuilder::new(self.key, &spec.sys_config)),
            NodeKind::Observe(spec) => Box::new(ObserveBuilder::new(self.key, spec)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obsseq_config::{Parameter, Value};

    fn tree() -> SequenceNode {
        SequenceNode::root()
            .with_child(
                SequenceNode::repeat(2).with_child(SequenceNode::config_iterator(
                    SysConfig::new("telescope").with_parameter(Parameter::new("p", [0.0, 10.0])),
                )),
            )
            .with_child(SequenceNode::instrument_iterator(
                "GNIRS",
                SysConfig::new("instrument").with_parameter(Parameter::new("filter", ["J"])),
            ))
    }

    #[test]
    fn test_preorder_iteration() {
        let root = tree();
        let kinds: Vec<_> = root
            .iter()
            .map(|n| match n.kind() {
                NodeKind::Root => "root",
                NodeKind::Repeat(_) => "repeat",
                NodeKind::Iterator(spec) if spec.instrument.is_some() => "inst",
                NodeKind::Iterator(_) => "iter",
                NodeKind::Observe(_) => "observe",
            })
            .collect();
        assert_eq!(kinds, vec!["root", "repeat", "iter", "inst"]);
    }

    #[test]
    fn test_leaf_is_a_role() {
        let root = tree();
        assert!(!root.is_leaf());
        assert!(!SequenceNode::repeat(3).is_leaf());
        assert!(root.children()[0].children()[0].is_leaf());
        let composite_iter = SequenceNode::config_iterator(SysConfig::new("x"))
            .with_child(SequenceNode::observe(ObserveSpec::new(ObserveType::Object, 1)));
        assert!(!composite_iter.is_leaf());
    }

    #[test]
    fn test_find_instrument_iterator_and_commit() {
        let mut root = tree();
        assert!(root.find_instrument_iterator("NIRI").is_none());
        let first = root.first_instrument_iterator().unwrap().key();
        let node = root.find_instrument_iterator_mut("GNIRS").unwrap();
        assert_eq!(node.key(), first);

        let mut sc = node.sys_config().unwrap();
        sc.get_mut("filter").unwrap().set_first(Some("H".into()));
        // The handed out copy does not alias the node's own table.
        assert_eq!(
            node.sys_config().unwrap().get("filter").unwrap().first(),
            Some(&Value::from("J"))
        );
        assert!(node.set_sys_config(sc));
        let committed = root.find(first).unwrap().sys_config().unwrap();
        assert_eq!(
            committed.get("filter").unwrap().first(),
            Some(&Value::from("H"))
        );
    }

    #[test]
    fn test_remove_child() {
        let mut root = tree();
        let key = root.children()[1].key();
        assert!(root.remove_child(key).is_some());
        assert!(root.first_instrument_iterator().is_none());
        assert!(root.remove_child(key).is_none());
    }
}
