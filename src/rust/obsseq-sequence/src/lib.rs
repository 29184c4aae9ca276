// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

//! Flattening of an observation's sequence tree into per-step configurations.
//!
//! The tree describes nested loops: every repetition of a node re-runs all of its children to
//! completion. [`SequenceDriver`] walks the tree depth first and yields one [`MergedConfig`]
//! per emitted step.
//!
//! [`MergedConfig`]: obsseq_config::MergedConfig

pub mod builder;
pub mod derived;
pub mod driver;
pub mod error;
pub mod node;
pub mod options;

pub use builder::ConfigBuilder;
pub use derived::{DerivedFn, DerivedParameter};
pub use driver::{SequenceDriver, SequenceIter, WalkListener};
pub use error::{Error, Result};
pub use node::{IteratorSpec, NodeKind, ObserveSpec, RepeatSpec, SequenceNode};
pub use options::{CalibrationProvider, CbOptions, ObsClass, ObserveType};
