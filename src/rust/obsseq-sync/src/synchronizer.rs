// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

//! Keeps the static instrument and the first step of its iterator in agreement.
//!
//! Each pass plans its writes without side effects, applies them in one batch and compares
//! property snapshots taken before and after to learn whether anything changed. A pass never
//! re-enters the opposite direction; the change it causes is reported through
//! [`SyncOutcome::follow_up`] instead.

use obsseq_config::{NodeKey, SysConfig, Value};
use obsseq_log::{diagnostic, warn};

use crate::observation::{Observation, ObservationEvent};
use crate::property::PropertyProvider;
use crate::settings::SyncSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    /// Drive the static components from row 0 of the iterator.
    FromIterator,
    /// Copy the static components' values into row 0 of the iterator.
    FromInstrument,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedProperty {
    pub component: NodeKey,
    pub property: String,
    pub reason: String,
}

/// What a single synchronization pass did.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub direction: SyncDirection,
    /// `false` when the observation lacks an instrument, a matching iterator or its table.
    pub context_found: bool,
    pub instrument_changed: bool,
    pub engineering_changed: bool,
    /// Row 0 was rewritten and stored back on the iterator node.
    pub iterator_committed: bool,
    /// Writes refused by a component's setter.
    pub rejected: Vec<RejectedProperty>,
    /// Row 0 properties that still disagree with the component after a pass from the iterator.
    pub diverged: Vec<String>,
}

impl SyncOutcome {
    fn new(direction: SyncDirection) -> Self {
        Self {
            direction,
            context_found: false,
            instrument_changed: false,
            engineering_changed: false,
            iterator_committed: false,
            rejected: vec![],
            diverged: vec![],
        }
    }

    pub fn is_quiet(&self) -> bool {
        !(self.instrument_changed || self.engineering_changed || self.iterator_committed)
    }

    /// The pass that the changes made by this one call for.
    pub fn follow_up(&self) -> Option<SyncDirection> {
        if self.instrument_changed || self.engineering_changed {
            Some(SyncDirection::FromInstrument)
        } else if self.iterator_committed {
            Some(SyncDirection::FromIterator)
        } else {
            None
        }
    }
}

/// The pieces of an observation a pass works on.
struct SyncContext {
    instrument: NodeKey,
    engineering: Option<NodeKey>,
    iterator: NodeKey,
    sys_config: SysConfig,
}

impl SyncContext {
    fn locate(obs: &Observation) -> Option<Self> {
        let instrument = obs.instrument()?;
        let narrow_type = instrument.component_type().narrow;
        let iterator = obs.sequence()?.find_instrument_iterator(narrow_type)?;
        Some(Self {
            instrument: instrument.key(),
            engineering: obs.engineering().map(|c| c.key()),
            iterator: iterator.key(),
            sys_config: iterator.sys_config()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PlannedWrite {
    property: String,
    value: Value,
}

#[derive(Debug, Clone)]
pub struct InstrumentSynchronizer {
    settings: SyncSettings,
}

impl Default for InstrumentSynchronizer {
    fn default() -> Self {
        Self::new(SyncSettings::default())
    }
}

impl InstrumentSynchronizer {
    pub fn new(mut settings: SyncSettings) -> Self {
        for change in settings.sanitize() {
            warn!(
                "Sync setting '{}' changed from '{}' to '{}': {}",
                change.field, change.original, change.sanitized, change.reason
            );
        }
        Self { settings }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn sync(&self, obs: &mut Observation, direction: SyncDirection) -> SyncOutcome {
        match direction {
            SyncDirection::FromIterator => self.sync_from_iterator(obs),
            SyncDirection::FromInstrument => self.sync_from_instrument(obs),
        }
    }

    /// Bring the instrument, and the engineering component if present, in line with row 0.
    ///
    /// When neither component changed, the iterator is assumed stale and row 0 is rewritten
    /// from the instrument instead.
    pub fn sync_from_iterator(&self, obs: &mut Observation) -> SyncOutcome {
        let mut outcome = SyncOutcome::new(SyncDirection::FromIterator);
        let Some(ctx) = SyncContext::locate(obs) else {
            return outcome;
        };
        outcome.context_found = true;

        let instrument_changed =
            self.apply_row_zero(obs, ctx.instrument, &ctx.sys_config, &mut outcome);
        let engineering_changed = match ctx.engineering {
            Some(engineering) => {
                self.apply_row_zero(obs, engineering, &ctx.sys_config, &mut outcome)
            }
            None => false,
        };
        outcome.instrument_changed = instrument_changed;
        outcome.engineering_changed = engineering_changed;

        if !instrument_changed && !engineering_changed {
            let mut sys_config = ctx.sys_config;
            let stale = obs
                .component(ctx.instrument)
                .is_some_and(|c| update_row_zero(&mut sys_config, c.data()));
            if stale {
                let event = obs.set_iterator_config(ctx.iterator, sys_config);
                outcome.iterator_committed = event.is_some();
            }
        }
        diagnostic!(
            "Synced from iterator {}: instrument={}, engineering={}, committed={}.",
            ctx.iterator,
            outcome.instrument_changed,
            outcome.engineering_changed,
            outcome.iterator_committed
        );
        outcome
    }

    /// Copy the instrument's and the engineering component's values into row 0.
    ///
    /// Both components are applied; for a property they share, the engineering value wins.
    pub fn sync_from_instrument(&self, obs: &mut Observation) -> SyncOutcome {
        let mut outcome = SyncOutcome::new(SyncDirection::FromInstrument);
        let Some(ctx) = SyncContext::locate(obs) else {
            return outcome;
        };
        outcome.context_found = true;

        let mut sys_config = ctx.sys_config;
        let mut dirty = false;
        for key in std::iter::once(ctx.instrument).chain(ctx.engineering) {
            if let Some(component) = obs.component(key) {
                dirty |= update_row_zero(&mut sys_config, component.data());
            }
        }
        if dirty {
            let event = obs.set_iterator_config(ctx.iterator, sys_config);
            outcome.iterator_committed = event.is_some();
        }
        diagnostic!(
            "Synced from instrument into iterator {}: committed={}.",
            ctx.iterator,
            outcome.iterator_committed
        );
        outcome
    }

    /// Run the pass an observation event calls for, if any.
    pub fn handle_event(
        &self,
        obs: &mut Observation,
        event: &ObservationEvent,
    ) -> Option<SyncOutcome> {
        let direction = direction_for(obs, event)?;
        Some(self.sync(obs, direction))
    }

    /// Run `direction`, then every follow-up pass, until a pass is quiet or the round limit is hit.
    pub fn settle(&self, obs: &mut Observation, direction: SyncDirection) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::new();
        let mut next = Some(direction);
        while let Some(direction) = next {
            if outcomes.len() >= self.settings.max_settle_rounds {
                warn!(
                    "Instrument and sequence did not settle within {} rounds.",
                    self.settings.max_settle_rounds
                );
                break;
            }
            let outcome = self.sync(obs, direction);
            next = outcome.follow_up();
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Row 0 writes for `provider`: non-volatile properties first, then volatile ones.
    fn plan_row_zero(
        &self,
        provider: &dyn PropertyProvider,
        sys_config: &SysConfig,
    ) -> Vec<PlannedWrite> {
        let mut fixed = Vec::new();
        let mut volatile = Vec::new();
        for parameter in sys_config.parameters() {
            let name = parameter.name();
            let Some(info) = provider.property(name) else {
                continue;
            };
            if name == self.settings.title_property || parameter.is_empty() {
                continue;
            }
            let Some(value) = parameter.first() else {
                warn!(
                    "Absent row 0 value in the instrument sequence; type={}, property={}",
                    provider.component_type().narrow,
                    name
                );
                continue;
            };
            let write = PlannedWrite {
                property: name.to_string(),
                value: value.clone(),
            };
            if info.flags.volatile {
                volatile.push(write);
            } else {
                fixed.push(write);
            }
        }
        fixed.extend(volatile);
        fixed
    }

    /// Apply row 0 to one component. Returns whether any of its properties changed value.
    fn apply_row_zero(
        &self,
        obs: &mut Observation,
        key: NodeKey,
        sys_config: &SysConfig,
        outcome: &mut SyncOutcome,
    ) -> bool {
        let Some(component) = obs.component_mut(key) else {
            return false;
        };
        let provider = component.data_mut();
        let writes = self.plan_row_zero(provider, sys_config);

        let before = provider.snapshot();
        for write in &writes {
            if let Err(error) = provider.set(&write.property, &write.value) {
                warn!(
                    "Could not apply '{}' to {}: {}",
                    write.property,
                    provider.component_type().narrow,
                    error
                );
                outcome.rejected.push(RejectedProperty {
                    component: key,
                    property: write.property.clone(),
                    reason: error.to_string(),
                });
            }
        }
        let after = provider.snapshot();

        for write in &writes {
            if after.get(write.property.as_str()) != Some(&Some(write.value.clone())) {
                outcome.diverged.push(write.property.clone());
            }
        }
        after != before
    }
}

/// Overwrite row 0 of every parameter the component knows with the component's value.
///
/// Returns whether any row 0 value changed.
fn update_row_zero(sys_config: &mut SysConfig, provider: &dyn PropertyProvider) -> bool {
    let mut updated = false;
    for parameter in sys_config.parameters_mut() {
        if parameter.is_empty() || provider.property(parameter.name()).is_none() {
            continue;
        }
        let value = provider.get(parameter.name());
        updated |= parameter.set_first(value);
    }
    updated
}

fn direction_for(obs: &Observation, event: &ObservationEvent) -> Option<SyncDirection> {
    match event {
        ObservationEvent::ComponentsChanged { added, .. } => added
            .iter()
            .any(|key| obs.is_instrument_or_engineering(*key))
            .then_some(SyncDirection::FromIterator),
        ObservationEvent::SequenceRootChanged => obs
            .sequence()?
            .first_instrument_iterator()
            .map(|_| SyncDirection::FromIterator),
        ObservationEvent::SequenceChildrenChanged { parent } => obs
            .holds_first_instrument_iterator(*parent)
            .then_some(SyncDirection::FromIterator),
        ObservationEvent::PropertyChanged { node } => {
            if obs.is_instrument_or_engineering(*node) {
                Some(SyncDirection::FromInstrument)
            } else if obs.is_instrument_iterator(*node) {
                Some(SyncDirection::FromIterator)
            } else {
                None
            }
        }
    }
}
