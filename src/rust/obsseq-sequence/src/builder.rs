// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-node step generators.
//!
//! A builder goes through `Unreset -> Reset(count = N) -> Producing x N -> Exhausted`.
//! Builders only know about their own node; nesting is handled by the driver.

use std::sync::Arc;

use obsseq_config::{MergedConfig, NodeKey, SysConfig, systems};

use crate::error::{Error, Result};
use crate::node::ObserveSpec;
use crate::options::{CalibrationProvider, CbOptions};

pub trait ConfigBuilder {
    /// Rewind to the first step and recompute the step count from the node's data.
    ///
    /// Fails with [`Error::Structure`] when the data does not determine a count.
    fn reset(&mut self, options: &CbOptions) -> Result<()>;

    /// Number of steps this pass will produce. Zero before the first reset.
    fn step_count(&self) -> usize;

    /// Step count the node's data describes, ignoring `collapse_repeat`.
    fn natural_step_count(&self) -> usize;

    fn has_next(&self) -> bool;

    /// Advance by one step and write this node's contribution for it.
    ///
    /// `step` already holds everything written by ancestors for the current repetition, and
    /// links to the previously emitted step.
    fn produce_step(&mut self, step: &mut MergedConfig) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
struct Counts {
    effective: usize,
    natural: usize,
}

/// Step position shared by all builders.
#[derive(Debug, Clone, Default)]
pub(crate) struct StepCursor {
    counts: Option<Counts>,
    index: usize,
}

impl StepCursor {
    fn reset(&mut self, natural: usize, options: &CbOptions) {
        self.counts = Some(Counts {
            effective: options.effective_count(natural),
            natural,
        });
        self.index = 0;
    }

    fn step_count(&self) -> usize {
        self.counts.map_or(0, |c| c.effective)
    }

    fn natural_step_count(&self) -> usize {
        self.counts.map_or(0, |c| c.natural)
    }

    fn has_next(&self) -> bool {
        self.index < self.step_count()
    }

    /// Index of the step to produce.
    fn advance(&mut self) -> Result<usize> {
        let Some(counts) = self.counts else {
            return Err(Error::Contract("produce_step called before reset"));
        };
        if self.index >= counts.effective {
            return Err(Error::Contract("produce_step called without a remaining step"));
        }
        let index = self.index;
        self.index += 1;
        Ok(index)
    }
}

fn checked_count(node: NodeKey, count: i64, what: &str) -> Result<usize> {
    usize::try_from(count).map_err(|_| Error::Structure {
        node,
        reason: format!("{what} must not be negative, got {count}"),
    })
}

macro_rules! delegate_cursor {
    () => {
        fn step_count(&self) -> usize {
            self.cursor.step_count()
        }

        fn natural_step_count(&self) -> usize {
            self.cursor.natural_step_count()
        }

        fn has_next(&self) -> bool {
            self.cursor.has_next()
        }
    };
}

/// Loop without a contribution of its own.
pub(crate) struct RepeatBuilder {
    node: NodeKey,
    count: i64,
    cursor: StepCursor,
}

impl RepeatBuilder {
    pub(crate) fn new(node: NodeKey, count: i64) -> Self {
        Self {
            node,
            count,
            cursor: StepCursor::default(),
        }
    }
}

impl ConfigBuilder for RepeatBuilder {
    fn reset(&mut self, options: &CbOptions) -> Result<()> {
        let natural = checked_count(self.node, self.count, "Repeat count")?;
        self.cursor.reset(natural, options);
        Ok(())
    }

    delegate_cursor!();

    fn produce_step(&mut self, _step: &mut MergedConfig) -> Result<()> {
        self.cursor.advance()?;
        Ok(())
    }
}

/// Writes row `i` of a configuration table on step `i`.
pub(crate) struct IteratorBuilder<'a> {
    node: NodeKey,
    sys_config: &'a SysConfig,
    cursor: StepCursor,
}

impl<'a> IteratorBuilder<'a> {
    pub(crate) fn new(node: NodeKey, sys_config: &'a SysConfig) -> Self {
        Self {
            node,
            sys_config,
            cursor: StepCursor::default(),
        }
    }
}

impl ConfigBuilder for IteratorBuilder<'_> {
    fn reset(&mut self, options: &CbOptions) -> Result<()> {
        let natural = self.sys_config.step_count().map_err(|e| Error::Structure {
            node: self.node,
            reason: e.to_string(),
        })?;
        self.cursor.reset(natural, options);
        Ok(())
    }

    delegate_cursor!();

    fn produce_step(&mut self, step: &mut MergedConfig) -> Result<()> {
        let index = self.cursor.advance()?;
        step.merge_sys_config(self.sys_config, index);
        Ok(())
    }
}

/// Repeated observe steps stamped with their observation class.
pub(crate) struct ObserveBuilder<'a> {
    node: NodeKey,
    spec: &'a ObserveSpec,
    provider: Option<Arc<dyn CalibrationProvider>>,
    cursor: StepCursor,
}

impl<'a> ObserveBuilder<'a> {
    pub(crate) fn new(node: NodeKey, spec: &'a ObserveSpec) -> Self {
        Self {
            node,
            spec,
            provider: None,
            cursor: StepCursor::default(),
        }
    }
}

impl ConfigBuilder for ObserveBuilder<'_> {
    fn reset(&mut self, options: &CbOptions) -> Result<()> {
        let natural = checked_count(self.node, self.spec.repeat, "Observe repeat count")?;
        self.provider = options.calibration_provider.clone();
        self.cursor.reset(natural, options);
        Ok(())
    }

    delegate_cursor!();

    fn produce_step(&mut self, step: &mut MergedConfig) -> Result<()> {
        self.cursor.advance()?;
        let observe_type = self.spec.observe_type;
        let class = self.spec.obs_class.unwrap_or_else(|| match &self.provider {
            Some(provider) => provider.default_class(observe_type),
            None => observe_type.default_class(),
        });
        step.put(systems::OBSERVE, "observeType", observe_type.as_str());
        step.put(systems::OBSERVE, "class", class.as_str());
        if let Some(months) = self
            .provider
            .as_ref()
            .and_then(|p| p.proprietary_months(class))
        {
            step.put(systems::OBSERVE, "proprietaryMonths", i64::from(months));
        }
        if let Some(exposure_time) = self.spec.exposure_time {
            step.put(systems::OBSERVE, "exposureTime", exposure_time);
        }
        if let Some(coadds) = self.spec.coadds {
            step.put(systems::OBSERVE, "coadds", coadds);
        }
        Ok(())
    }
}
