// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration data model shared by sequence generation and instrument synchronization.
//!
//! A [`Parameter`] holds one value per sequence step, a [`SysConfig`] groups the parameters
//! of one subsystem and a [`MergedConfig`] is a single fully resolved step.

pub mod error;
pub mod merged_config;
pub mod node_key;
pub mod parameter;
pub mod pio;
pub mod sys_config;
pub mod value;

pub use error::{Error, Result};
pub use merged_config::{ConfigMap, ItemKey, MergedConfig};
pub use node_key::NodeKey;
pub use parameter::Parameter;
pub use sys_config::SysConfig;
pub use value::Value;

/// Well known subsystem names.
pub mod systems {
    pub const INSTRUMENT: &str = "instrument";
    pub const OBSERVE: &str = "observe";
    pub const METADATA: &str = "metadata";
}
