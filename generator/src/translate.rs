use std::collections::HashMap;

use blockgraph::block::field::FieldValue;
use blockgraph::block::kind::BlockKind;
use blockgraph::block::Block;
use blockgraph::position::Position;
use blockgraph::variable::{VariableId, VariableTable};

use crate::error::{BlockError, GenerateError};
use crate::order::{self, Associativity, Order, OrderContext};
use crate::registry::SymbolicRegistry;
use crate::value::EchoValue;

pub(crate) const MAX_DEPTH: usize = 256;

/// An expression's emitted text together with the precedence it was
/// generated at. The enclosing context compares the order against its own
/// requirement to decide parenthesization.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedExpression {
    pub text: String,
    pub order: Order,
}

impl GeneratedExpression {
    pub fn new(text: impl Into<String>, order: Order) -> Self {
        GeneratedExpression {
            text: text.into(),
            order,
        }
    }
}

/// `Ok(None)` is an intentional no-op (a required input socket is
/// unconnected), not an error. Callers propagate it instead of emitting
/// malformed code.
pub type Translation<T> = Result<Option<T>, BlockError>;

/// A statement translator: emits one statement's text (without the
/// terminator), or `None` under the missing-input policy.
pub type StatementFn = fn(&Block, &mut Emitter<'_>) -> Translation<String>;

/// An expression translator: emits text plus the order it was generated at,
/// or `None` under the missing-input policy.
pub type ExpressionFn = fn(&Block, &mut Emitter<'_>) -> Translation<GeneratedExpression>;

/// Kind tags of the built-in block set.
pub mod kinds {
    pub const VARIABLE_SET: &str = "variable_set";
    pub const VARIABLE_GET: &str = "variable_get";
    pub const NUMBER: &str = "number";
    pub const ARITHMETIC: &str = "arithmetic";
    pub const COMPARE: &str = "compare";
    pub const MOVE_TO: &str = "move_to";
}

/// Field names used by the built-in block set.
pub mod fields {
    pub const VAR: &str = "VAR";
    pub const NUM: &str = "NUM";
    pub const OP: &str = "OP";
    pub const X: &str = "X";
    pub const Y: &str = "Y";
}

/// Input socket names used by the built-in block set.
pub mod sockets {
    pub const VALUE: &str = "VALUE";
    pub const A: &str = "A";
    pub const B: &str = "B";
}

/// Dispatch table from block kind to translator function. Adding a block
/// kind means adding one entry here; the assembler never changes.
pub struct TranslatorTable {
    statements: HashMap<BlockKind, StatementFn>,
    expressions: HashMap<BlockKind, ExpressionFn>,
}

impl TranslatorTable {
    pub fn empty() -> Self {
        TranslatorTable {
            statements: HashMap::new(),
            expressions: HashMap::new(),
        }
    }

    /// The table pre-populated with the built-in block set.
    pub fn standard() -> Self {
        let mut table = TranslatorTable::empty();
        table.register_statement(kinds::VARIABLE_SET.into(), variable_set);
        table.register_statement(kinds::MOVE_TO.into(), move_to);
        table.register_expression(kinds::VARIABLE_GET.into(), variable_get);
        table.register_expression(kinds::NUMBER.into(), number_literal);
        table.register_expression(kinds::ARITHMETIC.into(), arithmetic);
        table.register_expression(kinds::COMPARE.into(), compare);
        table
    }

    pub fn register_statement(&mut self, kind: BlockKind, translator: StatementFn) {
        self.statements.insert(kind, translator);
    }

    pub fn register_expression(&mut self, kind: BlockKind, translator: ExpressionFn) {
        self.expressions.insert(kind, translator);
    }

    pub fn statement(&self, kind: &BlockKind) -> Option<StatementFn> {
        self.statements.get(kind).copied()
    }

    pub fn expression(&self, kind: &BlockKind) -> Option<ExpressionFn> {
        self.expressions.get(kind).copied()
    }
}

impl Default for TranslatorTable {
    fn default() -> Self {
        TranslatorTable::standard()
    }
}

/// Per-generation translation context: the workspace variable directory,
/// the dispatch table, and this generation's private registry. Constructed
/// inside `generate` and discarded with it.
pub struct Emitter<'a> {
    vars: &'a VariableTable,
    table: &'a TranslatorTable,
    registry: SymbolicRegistry,
    depth: usize,
}

impl<'a> Emitter<'a> {
    pub fn new(vars: &'a VariableTable, table: &'a TranslatorTable) -> Self {
        Emitter {
            vars,
            table,
            registry: SymbolicRegistry::new(),
            depth: 0,
        }
    }

    pub fn registry(&self) -> &SymbolicRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SymbolicRegistry {
        &mut self.registry
    }

    pub fn into_registry(self) -> SymbolicRegistry {
        self.registry
    }

    /// Translate one statement block by kind dispatch.
    pub fn statement(&mut self, block: &Block) -> Translation<String> {
        let Some(translator) = self.table.statement(&block.kind) else {
            return Err(BlockError::new(
                GenerateError::UnsupportedBlock(block.kind.clone()),
                &block.id,
            ));
        };
        translator(block, self)
    }

    /// Translate an expression block and parenthesize the result when its
    /// order is too loose for `context`.
    pub fn expression(&mut self, block: &Block, context: OrderContext) -> Translation<String> {
        if self.depth >= MAX_DEPTH {
            return Err(BlockError::new(GenerateError::DepthExceeded, &block.id));
        }
        let Some(translator) = self.table.expression(&block.kind) else {
            return Err(BlockError::new(
                GenerateError::UnsupportedBlock(block.kind.clone()),
                &block.id,
            ));
        };
        self.depth += 1;
        let result = translator(block, self);
        self.depth -= 1;

        let Some(expr) = result? else {
            return Ok(None);
        };
        let text = if order::wrap(expr.order, context) {
            format!("({})", expr.text)
        } else {
            expr.text
        };
        Ok(Some(text))
    }

    /// Translate the expression connected to the named input socket.
    /// An unconnected socket yields `None`.
    pub fn socket(&mut self, block: &Block, socket: &str, context: OrderContext) -> Translation<String> {
        match block.input(socket) {
            Some(child) => self.expression(child, context),
            None => Ok(None),
        }
    }

    /// Resolve the variable id stored in `field` to its display name via
    /// the workspace directory.
    pub fn variable_name(&self, block: &Block, field: &str) -> Result<(VariableId, String), BlockError> {
        let Some(value) = block.field(field) else {
            return Err(missing_field(block, field));
        };
        let id = VariableId::new(value.to_string());
        match self.vars.resolve(&id) {
            Some(name) => Ok((id, name.to_string())),
            None => Err(BlockError::new(
                GenerateError::UnresolvedVariable(id),
                &block.id,
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in translators
// ---------------------------------------------------------------------------

/// `variable_set`: emits `var <name> = <expr>`. The echo value is registered
/// only after the value expression translates successfully; a suppressed
/// value leaves the registry untouched.
fn variable_set(block: &Block, ctx: &mut Emitter<'_>) -> Translation<String> {
    let (id, name) = ctx.variable_name(block, fields::VAR)?;
    let Some(value) = ctx.socket(block, sockets::VALUE, OrderContext::NONE)? else {
        return Ok(None);
    };
    ctx.registry_mut()
        .register(&id, &name, EchoValue::from_literal(&value));
    Ok(Some(format!("var {} = {}", name, value)))
}

/// `variable_get`: re-emits the variable's last-known echo value.
fn variable_get(block: &Block, ctx: &mut Emitter<'_>) -> Translation<GeneratedExpression> {
    let (_, name) = ctx.variable_name(block, fields::VAR)?;
    let Some(value) = ctx.registry().lookup(&name) else {
        return Err(BlockError::new(
            GenerateError::UnknownVariable(name),
            &block.id,
        ));
    };
    Ok(Some(GeneratedExpression::new(value.to_string(), value.order())))
}

/// `number`: a numeric literal from the NUM field.
fn number_literal(block: &Block, _ctx: &mut Emitter<'_>) -> Translation<GeneratedExpression> {
    let Some(field) = block.field(fields::NUM) else {
        return Err(missing_field(block, fields::NUM));
    };
    let Some(n) = field.as_number() else {
        return Err(missing_field(block, fields::NUM));
    };
    let echo = EchoValue::Number(n);
    Ok(Some(GeneratedExpression::new(echo.to_string(), echo.order())))
}

/// `arithmetic`: binary arithmetic over the A and B sockets.
fn arithmetic(block: &Block, ctx: &mut Emitter<'_>) -> Translation<GeneratedExpression> {
    let op = binary_operator(block, BinaryOp::from_arith_tag)?;
    binary(block, ctx, op)
}

/// `compare`: binary comparison over the A and B sockets. Non-associative:
/// a nested comparison always parenthesizes.
fn compare(block: &Block, ctx: &mut Emitter<'_>) -> Translation<GeneratedExpression> {
    let op = binary_operator(block, BinaryOp::from_compare_tag)?;
    binary(block, ctx, op)
}

/// `move_to`: serializes the X/Y fields through the runtime position format
/// (two-decimal rounding; malformed numeric text becomes NaN and is left to
/// the consumer to validate).
fn move_to(block: &Block, _ctx: &mut Emitter<'_>) -> Translation<String> {
    let (Some(x), Some(y)) = (block.field(fields::X), block.field(fields::Y)) else {
        return Ok(None);
    };
    let position = Position::new(field_number(x), field_number(y));
    Ok(Some(format!("moveTo(\"{}\")", position)))
}

// ---------------------------------------------------------------------------
// Binary operators
// ---------------------------------------------------------------------------

/// Binary operators of the target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl BinaryOp {
    fn from_arith_tag(tag: &str) -> Option<BinaryOp> {
        match tag {
            "ADD" => Some(BinaryOp::Add),
            "MINUS" => Some(BinaryOp::Subtract),
            "MULTIPLY" => Some(BinaryOp::Multiply),
            "DIVIDE" => Some(BinaryOp::Divide),
            "POWER" => Some(BinaryOp::Power),
            _ => None,
        }
    }

    fn from_compare_tag(tag: &str) -> Option<BinaryOp> {
        match tag {
            "EQ" => Some(BinaryOp::Equal),
            "NEQ" => Some(BinaryOp::NotEqual),
            "LT" => Some(BinaryOp::Less),
            "LTE" => Some(BinaryOp::LessOrEqual),
            "GT" => Some(BinaryOp::Greater),
            "GTE" => Some(BinaryOp::GreaterOrEqual),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Power => "**",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterOrEqual => ">=",
        }
    }

    pub fn order(self) -> Order {
        match self {
            BinaryOp::Add | BinaryOp::Subtract => Order::Additive,
            BinaryOp::Multiply | BinaryOp::Divide => Order::Multiplicative,
            BinaryOp::Power => Order::Exponent,
            _ => Order::Relational,
        }
    }

    pub fn associativity(self) -> Associativity {
        match self {
            BinaryOp::Power => Associativity::Right,
            BinaryOp::Add
            | BinaryOp::Subtract
            | BinaryOp::Multiply
            | BinaryOp::Divide => Associativity::Left,
            _ => Associativity::NonAssoc,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read the OP field and map it through the given tag set.
fn binary_operator(
    block: &Block,
    from_tag: fn(&str) -> Option<BinaryOp>,
) -> Result<BinaryOp, BlockError> {
    let Some(field) = block.field(fields::OP) else {
        return Err(missing_field(block, fields::OP));
    };
    let tag = field.to_string();
    from_tag(&tag).ok_or_else(|| {
        BlockError::new(
            GenerateError::UnknownOperator {
                kind: block.kind.clone(),
                op: tag,
            },
            &block.id,
        )
    })
}

/// Translate both operand sockets and join them with the operator symbol.
/// Either operand going missing suppresses the whole expression.
fn binary(block: &Block, ctx: &mut Emitter<'_>, op: BinaryOp) -> Translation<GeneratedExpression> {
    let (left_ctx, right_ctx) = order::operand_contexts(op.order(), op.associativity());
    let Some(a) = ctx.socket(block, sockets::A, left_ctx)? else {
        return Ok(None);
    };
    let Some(b) = ctx.socket(block, sockets::B, right_ctx)? else {
        return Ok(None);
    };
    Ok(Some(GeneratedExpression::new(
        format!("{} {} {}", a, op.symbol(), b),
        op.order(),
    )))
}

fn missing_field(block: &Block, field: &str) -> BlockError {
    BlockError::new(
        GenerateError::MissingField {
            kind: block.kind.clone(),
            field: field.to_string(),
        },
        &block.id,
    )
}

fn field_number(field: &FieldValue) -> f64 {
    field.as_number().unwrap_or(f64::NAN)
}
