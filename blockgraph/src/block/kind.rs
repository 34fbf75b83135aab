use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind tag of a block.
/// Deliberately open rather than a closed enum: the translator table decides
/// which kinds are supported, so a host can introduce new kinds without
/// touching the model. Deserializing a program never fails on an unknown kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKind(String);

impl BlockKind {
    pub fn new(kind: impl Into<String>) -> Self {
        BlockKind(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockKind {
    fn from(kind: &str) -> Self {
        BlockKind(kind.to_string())
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
