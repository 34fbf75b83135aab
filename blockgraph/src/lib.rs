pub mod block;
pub mod loader;
pub mod position;
pub mod variable;

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::variable::{VariableBinding, VariableTable};

/// A deserialized block program: the workspace variable directory plus one
/// entry block per statement chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Workspace variables, owned and renamed by the host editor.
    #[serde(default)]
    pub variables: Vec<VariableBinding>,
    /// Entry blocks, one per statement chain.
    #[serde(default)]
    pub chains: Vec<Block>,
}

impl Program {
    /// Build the id → binding directory used to resolve variable display names.
    pub fn variable_table(&self) -> VariableTable {
        VariableTable::new(&self.variables)
    }
}
