use std::fmt;

use blockgraph::block::{BlockId, kind::BlockKind};
use blockgraph::variable::VariableId;

/// Errors raised while generating code from a block chain.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateError {
    /// A variable was read before any assignment earlier in the chain.
    UnknownVariable(String),
    /// A block references a variable id the workspace no longer contains.
    UnresolvedVariable(VariableId),
    /// No translator is registered for a block kind.
    UnsupportedBlock(BlockKind),
    /// A block lacks a field its translator requires.
    MissingField { kind: BlockKind, field: String },
    /// An operator field holds a tag the translator does not know.
    UnknownOperator { kind: BlockKind, op: String },
    /// Expression sockets nest deeper than the generator allows.
    DepthExceeded,
    /// The program has no chain to generate from.
    NoEntry,
    /// The requested entry block id does not exist.
    UnknownEntry(String),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::UnknownVariable(name) => {
                write!(f, "variable '{}' read before assignment", name)
            }
            GenerateError::UnresolvedVariable(id) => {
                write!(f, "variable id '{}' no longer exists in the workspace", id)
            }
            GenerateError::UnsupportedBlock(kind) => {
                write!(f, "no translator registered for block kind '{}'", kind)
            }
            GenerateError::MissingField { kind, field } => {
                write!(f, "block kind '{}' is missing required field '{}'", kind, field)
            }
            GenerateError::UnknownOperator { kind, op } => {
                write!(f, "block kind '{}' has unknown operator '{}'", kind, op)
            }
            GenerateError::DepthExceeded => {
                write!(f, "expression nesting exceeds the generator depth limit")
            }
            GenerateError::NoEntry => write!(f, "no entry chain: the program is empty"),
            GenerateError::UnknownEntry(detail) => write!(f, "unknown entry chain: {}", detail),
        }
    }
}

impl std::error::Error for GenerateError {}

/// A generation error enriched with the failing block's identity, so the
/// host editor can highlight the block inline.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockError {
    pub error: GenerateError,
    pub block: Option<BlockId>,
}

impl BlockError {
    pub fn new(error: GenerateError, block: &BlockId) -> Self {
        BlockError {
            error,
            block: Some(block.clone()),
        }
    }
}

impl From<GenerateError> for BlockError {
    fn from(error: GenerateError) -> Self {
        BlockError {
            error,
            block: None,
        }
    }
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for BlockError {}
