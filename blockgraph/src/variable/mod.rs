use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque variable identity, assigned by the host editor.
/// Stable across renames; unique per workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(String);

impl VariableId {
    pub fn new(id: impl Into<String>) -> Self {
        VariableId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A workspace variable: stable id plus current display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableBinding {
    pub id: VariableId,
    pub name: String,
}

/// Directory of workspace variables, indexed by id.
/// Display names must be resolved through the id; the name text itself is
/// not stable across edits.
#[derive(Debug, Default)]
pub struct VariableTable {
    by_id: HashMap<VariableId, VariableBinding>,
}

impl VariableTable {
    pub fn new(bindings: &[VariableBinding]) -> Self {
        let mut by_id = HashMap::new();
        for binding in bindings {
            by_id.insert(binding.id.clone(), binding.clone());
        }
        VariableTable { by_id }
    }

    /// Resolve a variable id to its current display name.
    pub fn resolve(&self, id: &VariableId) -> Option<&str> {
        self.by_id.get(id).map(|b| b.name.as_str())
    }

    pub fn get(&self, id: &VariableId) -> Option<&VariableBinding> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
