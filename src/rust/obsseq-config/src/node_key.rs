// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

use uuid::Uuid;

/// Stable identity of a node in the observation tree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct NodeKey(Uuid);

impl NodeKey {
    pub fn new() -> Self {
        NodeKey(Uuid::new_v4())
    }
}

impl Default for NodeKey {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
