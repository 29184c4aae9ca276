// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

//! An observation: static components plus one sequence tree.
//!
//! Every edit reports what it changed as an [`ObservationEvent`]; edits that change nothing
//! report nothing.

use obsseq_config::{NodeKey, SysConfig, Value};
use obsseq_sequence::SequenceNode;

use crate::error::{Error, Result};
use crate::property::{BroadType, ComponentType, PropertyProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservationEvent {
    /// The list of static components changed.
    ComponentsChanged {
        added: Vec<NodeKey>,
        removed: Vec<NodeKey>,
    },
    /// The sequence tree was replaced as a whole.
    SequenceRootChanged,
    /// The children of a sequence node changed.
    SequenceChildrenChanged { parent: NodeKey },
    /// A property of a component or sequence node changed value.
    PropertyChanged { node: NodeKey },
}

/// A static component of an observation.
#[derive(Debug)]
pub struct ObsComponent {
    key: NodeKey,
    data: Box<dyn PropertyProvider>,
}

impl ObsComponent {
    pub fn new(data: Box<dyn PropertyProvider>) -> Self {
        Self {
            key: NodeKey::new(),
            data,
        }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn component_type(&self) -> ComponentType {
        self.data.component_type()
    }

    pub fn data(&self) -> &dyn PropertyProvider {
        &*self.data
    }

    pub fn data_mut(&mut self) -> &mut dyn PropertyProvider {
        &mut *self.data
    }
}

#[derive(Debug, Default)]
pub struct Observation {
    components: Vec<ObsComponent>,
    sequence: Option<SequenceNode>,
}

impl Observation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn components(&self) -> &[ObsComponent] {
        &self.components
    }

    pub fn component(&self, key: NodeKey) -> Option<&ObsComponent> {
        self.components.iter().find(|c| c.key == key)
    }

    pub fn component_mut(&mut self, key: NodeKey) -> Option<&mut ObsComponent> {
        self.components.iter_mut().find(|c| c.key == key)
    }

    /// First component of the given broad type.
    pub fn find_component(&self, broad: BroadType) -> Option<&ObsComponent> {
        self.components
            .iter()
            .find(|c| c.component_type().broad == broad)
    }

    pub fn instrument(&self) -> Option<&ObsComponent> {
        self.find_component(BroadType::Instrument)
    }

    pub fn engineering(&self) -> Option<&ObsComponent> {
        self.find_component(BroadType::Engineering)
    }

    pub fn add_component(&mut self, component: ObsComponent) -> ObservationEvent {
        let key = component.key;
        self.components.push(component);
        ObservationEvent::ComponentsChanged {
            added: vec![key],
            removed: vec![],
        }
    }

    pub fn remove_component(&mut self, key: NodeKey) -> Option<ObservationEvent> {
        let index = self.components.iter().position(|c| c.key == key)?;
        self.components.remove(index);
        Some(ObservationEvent::ComponentsChanged {
            added: vec![],
            removed: vec![key],
        })
    }

    /// Set one property of a component, reporting a change only if any property changed value.
    pub fn set_property(
        &mut self,
        component: NodeKey,
        name: &str,
        value: &Value,
    ) -> Result<Option<ObservationEvent>> {
        let target = self
            .component_mut(component)
            .ok_or_else(|| Error::new(format!("No component {component} in the observation")))?;
        let before = target.data.snapshot();
        target.data.set(name, value)?;
        let changed = target.data.snapshot() != before;
        Ok(changed.then_some(ObservationEvent::PropertyChanged { node: component }))
    }

    pub fn sequence(&self) -> Option<&SequenceNode> {
        self.sequence.as_ref()
    }

    pub fn sequence_mut(&mut self) -> Option<&mut SequenceNode> {
        self.sequence.as_mut()
    }

    pub fn set_sequence(&mut self, root: SequenceNode) -> ObservationEvent {
        self.sequence = Some(root);
        ObservationEvent::SequenceRootChanged
    }

    pub fn add_sequence_child(
        &mut self,
        parent: NodeKey,
        child: SequenceNode,
    ) -> Option<ObservationEvent> {
        self.sequence.as_mut()?.find_mut(parent)?.add_child(child);
        Some(ObservationEvent::SequenceChildrenChanged { parent })
    }

    /// Replace the configuration table of an iterator node.
    pub fn set_iterator_config(
        &mut self,
        node: NodeKey,
        sys_config: SysConfig,
    ) -> Option<ObservationEvent> {
        let target = self.sequence.as_mut()?.find_mut(node)?;
        if target.sys_config().as_ref() == Some(&sys_config) {
            return None;
        }
        target
            .set_sys_config(sys_config)
            .then_some(ObservationEvent::PropertyChanged { node })
    }

    pub fn is_instrument_or_engineering(&self, key: NodeKey) -> bool {
        self.component(key).is_some_and(|c| c.component_type().is_instrument_or_engineering())
    }

    pub fn is_instrument_iterator(&self, key: NodeKey) -> bool {
        self.sequence
            .as_ref()
            .and_then(|root| root.find(key))
            .is_some_and(SequenceNode::is_instrument_iterator)
    }

    /// Whether the children of `parent` hold the first instrument iterator of the sequence.
    ///
    /// Only the first child subtree that holds any instrument iterator is considered.
    pub fn holds_first_instrument_iterator(&self, parent: NodeKey) -> bool {
        let Some(root) = self.sequence.as_ref() else {
            return false;
        };
        let Some(parent) = root.find(parent) else {
            return false;
        };
        let first = root.first_instrument_iterator().map(SequenceNode::key);
        parent
            .children()
            .iter()
            .find_map(SequenceNode::first_instrument_iterator)
            .is_some_and(|found| Some(found.key()) == first)
    }
}
