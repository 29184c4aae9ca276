// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

//! Depth first walk over the sequence tree.
//!
//! For every repetition of a node its contribution is written first, then each child is reset
//! and driven to exhaustion on top of it. The result is the nested cartesian product of the
//! step counts along every root to leaf path, in document order.

use std::sync::Arc;

use obsseq_config::{ConfigMap, MergedConfig, systems};
use obsseq_log::{debug, diagnostic};

use crate::builder::ConfigBuilder;
use crate::derived::apply_derived;
use crate::error::Result;
use crate::node::SequenceNode;
use crate::options::CbOptions;

/// Observer of a walk.
pub trait WalkListener {
    /// A node starts a pass over `step_count` steps. Never called for nodes with no steps.
    fn pass_started(&mut self, node: &SequenceNode, step_count: usize);
}

/// Entry point for sequence generation.
#[derive(Debug, Clone, Default)]
pub struct SequenceDriver {
    options: CbOptions,
}

impl SequenceDriver {
    pub fn new(options: CbOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CbOptions {
        &self.options
    }

    /// Lazily generate the steps below `root`.
    pub fn iter<'a>(&self, root: &'a SequenceNode) -> SequenceIter<'a> {
        SequenceIter::new(root, self.options.clone())
    }

    /// Generate every step below `root`.
    pub fn walk(&self, root: &SequenceNode) -> Result<Vec<MergedConfig>> {
        collect_steps(self.iter(root))
    }

    pub fn walk_with_listener(
        &self,
        root: &SequenceNode,
        listener: &mut dyn WalkListener,
    ) -> Result<Vec<MergedConfig>> {
        collect_steps(self.iter(root).with_listener(listener))
    }

    /// The first step only, with every node collapsed to a single repetition.
    ///
    /// The step still carries the natural step count when `add_obs_count` is set.
    pub fn first_step(&self, root: &SequenceNode) -> Result<Option<MergedConfig>> {
        let options = self.options.clone().collapse_repeat(true);
        SequenceIter::new(root, options).next().transpose()
    }
}

fn collect_steps(iter: SequenceIter<'_>) -> Result<Vec<MergedConfig>> {
    let steps = iter.collect::<Result<Vec<_>>>()?;
    diagnostic!("Generated {} sequence step(s).", steps.len());
    Ok(steps)
}

struct Frame<'a> {
    node: &'a SequenceNode,
    builder: Box<dyn ConfigBuilder + 'a>,
    /// Everything written above this node for the current repetition of its parent.
    ancestor: MergedConfig,
    /// This node's current repetition, while its children run.
    current: Option<MergedConfig>,
    next_child: usize,
}

/// Pull based generator of sequence steps.
///
/// Stopping early leaves the remaining steps unmaterialized. After an error the iterator is
/// fused.
pub struct SequenceIter<'a> {
    options: CbOptions,
    pending_root: Option<&'a SequenceNode>,
    stack: Vec<Frame<'a>>,
    previous: Option<Arc<ConfigMap>>,
    listener: Option<&'a mut dyn WalkListener>,
    done: bool,
}

impl<'a> SequenceIter<'a> {
    pub fn new(root: &'a SequenceNode, options: CbOptions) -> Self {
        Self {
            options,
            pending_root: Some(root),
            stack: Vec::new(),
            previous: None,
            listener: None,
            done: false,
        }
    }

    pub fn with_listener(mut self, listener: &'a mut dyn WalkListener) -> Self {
        self.listener = Some(listener);
        self
    }

    fn enter(&mut self, node: &'a SequenceNode, ancestor: MergedConfig) -> Result<()> {
        let mut builder = node.builder();
        builder.reset(&self.options)?;
        let step_count = builder.step_count();
        if step_count == 0 {
            // The pass never happens; children are not even reset.
            debug!("Skipping sequence node {} with no steps.", node.key());
            return Ok(());
        }
        if let Some(listener) = self.listener.as_deref_mut() {
            listener.pass_started(node, step_count);
        }
        self.stack.push(Frame {
            node,
            builder,
            ancestor,
            current: None,
            next_child: 0,
        });
        Ok(())
    }

    fn advance(&mut self) -> Result<Option<MergedConfig>> {
        if let Some(root) = self.pending_root.take() {
            self.enter(root, MergedConfig::new())?;
        }
        loop {
            let Some(frame) = self.stack.last_mut() else {
                return Ok(None);
            };
            let node: &'a SequenceNode = frame.node;

            if let Some(current) = &frame.current
                && let Some(child) = node.children().get(frame.next_child)
            {
                frame.next_child += 1;
                let ancestor = current.clone();
                self.enter(child, ancestor)?;
                continue;
            }

            if !frame.builder.has_next() {
                self.stack.pop();
                continue;
            }

            let mut step = frame.ancestor.clone().with_previous(self.previous.clone());
            step.push_node_key(node.key());
            frame.builder.produce_step(&mut step)?;
            apply_derived(node.derived(), &mut step);

            if node.is_leaf() {
                if self.options.add_obs_count {
                    let natural = frame.builder.natural_step_count();
                    step.put(systems::METADATA, "stepCount", natural);
                }
                self.previous = Some(Arc::new(step.values().clone()));
                return Ok(Some(step));
            }
            frame.current = Some(step);
            frame.next_child = 0;
        }
    }
}

impl Iterator for SequenceIter<'_> {
    type Item = Result<MergedConfig>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(step)) => {
                if self.options.collapse_repeat {
                    // A collapsed walk represents the whole sequence with its first step.
                    self.done = true;
                    self.stack.clear();
                }
                Some(Ok(step))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                self.stack.clear();
                Some(Err(error))
            }
        }
    }
}
