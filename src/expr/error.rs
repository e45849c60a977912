//! Error types for the formula compiler.

use std::fmt;

/// An error that occurred while compiling a formula.
///
/// Compilation is all-or-nothing: a formula either yields a complete
/// [`Program`](super::Program) or exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub message: String,
    pub line: usize,
    pub col: usize,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unrecognised character or malformed literal.
    Lex,
    /// Token stream does not form an expression.
    Parse,
    /// Identifier is neither `x` nor a named constant.
    UnknownIdent,
    /// Call to a name missing from the builtin table.
    UnknownFunction,
    /// Builtin called with the wrong number of arguments.
    Arity,
    /// More than 256 distinct constants.
    ConstantPool,
}

impl CompileError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            line,
            col,
            kind,
        }
    }

    pub fn lex(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self::new(ErrorKind::Lex, message, line, col)
    }

    pub fn parse(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self::new(ErrorKind::Parse, message, line, col)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}] {:?}: {}",
            self.line, self.col, self.kind, self.message
        )
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_and_kind() {
        let err = CompileError::new(ErrorKind::Arity, "\"min\" expects 2 arguments", 1, 4);
        assert_eq!(err.to_string(), "[1:4] Arity: \"min\" expects 2 arguments");
    }

    #[test]
    fn constructors_set_kind() {
        assert_eq!(CompileError::lex("bad", 1, 1).kind, ErrorKind::Lex);
        assert_eq!(CompileError::parse("bad", 1, 1).kind, ErrorKind::Parse);
    }
}
