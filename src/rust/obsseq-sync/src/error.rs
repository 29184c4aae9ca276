// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Property '{property}' rejected the value: {reason}")]
    PropertyRejected { property: String, reason: String },
    #[error("Unknown property '{0}'")]
    UnknownProperty(String),
    #[error("Property '{property}' expects a {expected} value, got {actual}")]
    TypeMismatch {
        property: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    pub fn new<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Anyhow(anyhow::anyhow!(msg.to_string()))
    }

    pub fn rejected(property: &str, reason: impl Display) -> Self {
        Error::PropertyRejected {
            property: property.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
