// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

//! Synchronization between a static instrument component and the first step of the
//! sequence iterator that drives it.

pub mod error;
pub mod observation;
pub mod property;
pub mod settings;
pub mod synchronizer;

pub use error::{Error, Result};
pub use observation::{ObsComponent, Observation, ObservationEvent};
pub use property::{
    BroadType, ComponentType, Described, PropertyDescriptor, PropertyFlags, PropertyInfo,
    PropertyProvider, PropertySnapshot, initial_iterator_config,
};
pub use settings::{SanitizationChange, SyncSettings};
pub use synchronizer::{InstrumentSynchronizer, RejectedProperty, SyncDirection, SyncOutcome};
