// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Parameter '{parameter}' has {actual} value(s), expected {expected} step(s)")]
    LengthMismatch {
        parameter: String,
        expected: usize,
        actual: usize,
    },
    #[error("Persistence error at '{path}': {reason}")]
    Persistence { path: String, reason: String },
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
