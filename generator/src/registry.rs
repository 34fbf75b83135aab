use std::collections::HashMap;

use blockgraph::variable::VariableId;

use crate::value::EchoValue;

/// Per-generation store of variable name → last-known echo value.
/// Constructed fresh inside each `generate` call and discarded with it; it
/// never persists across calls. Because the chain is walked linearly, a
/// lookup miss models a declare-before-use violation in the target language.
#[derive(Debug, Default)]
pub struct SymbolicRegistry {
    values: HashMap<String, EchoValue>,
    names_by_id: HashMap<VariableId, String>,
}

impl SymbolicRegistry {
    pub fn new() -> Self {
        SymbolicRegistry::default()
    }

    /// Record or overwrite a binding. Last write wins for the echo value;
    /// already-emitted declaration lines are unaffected.
    pub fn register(&mut self, id: &VariableId, name: &str, value: EchoValue) {
        tracing::trace!(variable = %id, name, "registering binding");
        self.names_by_id.insert(id.clone(), name.to_string());
        self.values.insert(name.to_string(), value);
    }

    /// Look up a binding by display name. `None` means nothing earlier in
    /// the chain has assigned this name.
    pub fn lookup(&self, name: &str) -> Option<&EchoValue> {
        self.values.get(name)
    }

    /// Look up a binding through its variable id.
    pub fn lookup_id(&self, id: &VariableId) -> Option<&EchoValue> {
        self.names_by_id
            .get(id)
            .and_then(|name| self.values.get(name))
    }

    /// Read-only snapshot for live value inspection, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, EchoValue)> {
        let mut bindings: Vec<(String, EchoValue)> = self
            .values
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        bindings.sort_by(|a, b| a.0.cmp(&b.0));
        bindings
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
