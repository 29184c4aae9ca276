// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

use obsseq_config::NodeKey;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The node's data does not determine a step count. Aborts the whole walk.
    #[error("Malformed sequence node {node}: {reason}")]
    Structure { node: NodeKey, reason: String },
    /// A builder was driven out of order.
    #[error("Config builder contract violated: {0}")]
    Contract(&'static str),
    #[error(transparent)]
    Config(#[from] obsseq_config::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
