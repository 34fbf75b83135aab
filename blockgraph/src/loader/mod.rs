use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

use crate::Program;

/// A program-file loading error with source location information.
#[derive(Debug, Clone)]
pub struct LoadError {
    pub message: String,
    pub span: Range<usize>,
    pub file_id: usize,
}

impl LoadError {
    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(Severity::Error)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LoadError {}

/// Parse a JSON program document.
pub fn from_json(source: &str, file_id: usize) -> Result<Program, LoadError> {
    serde_json::from_str(source).map_err(|e| LoadError {
        message: e.to_string(),
        span: span_at(source, e.line(), e.column()),
        file_id,
    })
}

/// One-byte-wide span for a 1-based line/column pair from serde_json.
fn span_at(source: &str, line: usize, column: usize) -> Range<usize> {
    if line == 0 {
        return 0..0;
    }
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    let start = (line_start + column.saturating_sub(1)).min(source.len());
    let end = (start + 1).min(source.len());
    start..end
}
