pub mod field;
pub mod kind;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::block::field::FieldValue;
use crate::block::kind::BlockKind;

/// Opaque block identity, assigned by the host editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        BlockId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One node of the visual program graph: a statement or an expression.
/// Statement blocks chain through `next`; expression blocks are reachable
/// only through input sockets and never chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Static field values keyed by field name (e.g. a selected variable's id).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldValue>,
    /// Connected input sockets keyed by socket name.
    /// An absent key is an unconnected socket.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, Block>,
    /// The following statement block in this chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<Block>>,
}

impl Block {
    /// Read a static field by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// The block connected to the named input socket, if any.
    pub fn input(&self, name: &str) -> Option<&Block> {
        self.inputs.get(name)
    }

    /// Iterate this block and every following block in chain order.
    pub fn iter_chain(&self) -> ChainIter<'_> {
        ChainIter {
            current: Some(self),
        }
    }
}

/// Iterator over a statement chain, following `next` links.
pub struct ChainIter<'a> {
    current: Option<&'a Block>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<&'a Block> {
        let block = self.current?;
        self.current = block.next.as_deref();
        Some(block)
    }
}
