use blockgraph::Program;
use blockgraph::block::{Block, BlockId};
use blockgraph::variable::VariableTable;

use crate::error::{BlockError, GenerateError};
use crate::translate::{Emitter, TranslatorTable};
use crate::value::EchoValue;

/// The target language's statement terminator.
const STATEMENT_TERMINATOR: char = ';';

/// The outcome of one generation pass: the accumulated code, the error that
/// halted the pass (if any), and the registry snapshot for live value
/// inspection UIs.
#[derive(Debug)]
pub struct Generation {
    pub code: String,
    pub error: Option<BlockError>,
    /// Final registry contents, sorted by variable name.
    pub bindings: Vec<(String, EchoValue)>,
}

impl Generation {
    /// True when generation halted early; `code` then covers exactly the
    /// blocks before the failing one.
    pub fn is_partial(&self) -> bool {
        self.error.is_some()
    }
}

/// Generate code for the chain starting at `entry`: walk `next` links in
/// order, dispatch each block to its statement translator, and append each
/// emitted statement with the terminator and a newline. Halts at the first
/// error, keeping the output accumulated so far. Chain order is
/// authoritative; there is no backtracking or re-ordering.
pub fn generate(vars: &VariableTable, table: &TranslatorTable, entry: &Block) -> Generation {
    let mut emitter = Emitter::new(vars, table);
    let mut code = String::new();
    let mut error = None;

    for block in entry.iter_chain() {
        tracing::debug!(block = %block.id, kind = %block.kind, "translating statement");
        match emitter.statement(block) {
            Ok(Some(text)) => {
                code.push_str(&text);
                code.push(STATEMENT_TERMINATOR);
                code.push('\n');
            }
            Ok(None) => {}
            Err(e) => {
                error = Some(e);
                break;
            }
        }
    }

    Generation {
        code,
        error,
        bindings: emitter.into_registry().snapshot(),
    }
}

/// Generate the program's first chain.
pub fn generate_program(program: &Program, table: &TranslatorTable) -> Result<Generation, BlockError> {
    let entry = program
        .chains
        .first()
        .ok_or_else(|| BlockError::from(GenerateError::NoEntry))?;
    Ok(generate(&program.variable_table(), table, entry))
}

/// Generate the chain whose entry block has the given id.
pub fn generate_entry(
    program: &Program,
    table: &TranslatorTable,
    entry_id: &BlockId,
) -> Result<Generation, BlockError> {
    if program.chains.is_empty() {
        return Err(GenerateError::NoEntry.into());
    }

    let entry = program
        .chains
        .iter()
        .find(|block| &block.id == entry_id)
        .ok_or_else(|| {
            let available: Vec<&str> = program.chains.iter().map(|b| b.id.as_str()).collect();
            BlockError::from(GenerateError::UnknownEntry(format!(
                "'{}' (available chains: {})",
                entry_id,
                available.join(", ")
            )))
        })?;
    Ok(generate(&program.variable_table(), table, entry))
}
