//! Error handling for the C0 front-end

use crate::utils::Position;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of analysis failure.
///
/// The first ten kinds are the syntax and declaration errors of the
/// grammar itself; the rest come from the type and use checks.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    // ==================== Syntax Errors ====================
    #[error("unrecognized token")]
    Recognized,

    #[error("expected identifier")]
    NeedIdentifier,

    #[error("expected ':'")]
    NeedColon,

    #[error("expected type")]
    NeedType,

    #[error("expected ';'")]
    NeedSemicolon,

    #[error("expected '{{'")]
    NeedBrace,

    #[error("function may finish without returning a value")]
    NeedReturn,

    #[error("expected parenthesis")]
    NeedParenthesis,

    #[error("expected '->'")]
    NeedArrow,

    #[error("expected expression")]
    NeedExpression,

    // ==================== Semantic Errors ====================
    #[error("duplicate declaration")]
    DuplicateDeclaration,

    #[error("constant needs an initial value")]
    ConstantNeedValue,

    #[error("symbol is not declared")]
    NeedDeclareSymbol,

    #[error("type mismatch")]
    TypeMismatch,

    #[error("cannot assign to a constant")]
    AssignToConstant,

    #[error("left side of assignment is not a variable")]
    InvalidAssignment,

    #[error("symbol is not callable")]
    NotCallable,

    #[error("wrong number of arguments")]
    ArgumentCount,
}

impl ErrorKind {
    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Recognized => "E0001",
            Self::NeedIdentifier => "E0002",
            Self::NeedColon => "E0003",
            Self::NeedType => "E0004",
            Self::NeedSemicolon => "E0005",
            Self::NeedBrace => "E0006",
            Self::NeedReturn => "E0007",
            Self::DuplicateDeclaration => "E0008",
            Self::ConstantNeedValue => "E0009",
            Self::NeedDeclareSymbol => "E0010",
            Self::NeedParenthesis => "E0011",
            Self::NeedArrow => "E0012",
            Self::NeedExpression => "E0013",
            Self::TypeMismatch => "E0014",
            Self::AssignToConstant => "E0015",
            Self::InvalidAssignment => "E0016",
            Self::NotCallable => "E0017",
            Self::ArgumentCount => "E0018",
        }
    }
}

/// The single error an analysis run produces.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind} at {position}")]
pub struct CompilationError {
    pub position: Position,
    pub kind: ErrorKind,
}

impl CompilationError {
    pub fn new(position: Position, kind: ErrorKind) -> Self {
        Self { position, kind }
    }
}

/// Front-end error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Lexer Errors ====================
    #[error("invalid character {found:?} at {position}")]
    InvalidCharacter { found: char, position: Position },

    #[error("unterminated literal at {position}")]
    UnterminatedLiteral { position: Position },

    #[error("invalid number literal {text:?} at {position}")]
    InvalidNumber { text: String, position: Position },

    // ==================== Analysis Errors ====================
    #[error(transparent)]
    Compilation(#[from] CompilationError),

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Get the position associated with this error
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::InvalidCharacter { position, .. } => Some(*position),
            Self::UnterminatedLiteral { position } => Some(*position),
            Self::InvalidNumber { position, .. } => Some(*position),
            Self::Compilation(err) => Some(err.position),
            Self::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CompilationError::new(Position::new(2, 7), ErrorKind::NeedColon);
        assert_eq!(err.to_string(), "expected ':' at line 2, column 7");
        assert_eq!(ErrorKind::NeedBrace.to_string(), "expected '{'");
    }

    #[test]
    fn test_codes_are_unique() {
        let kinds = [
            ErrorKind::Recognized,
            ErrorKind::NeedIdentifier,
            ErrorKind::NeedColon,
            ErrorKind::NeedType,
            ErrorKind::NeedSemicolon,
            ErrorKind::NeedBrace,
            ErrorKind::NeedReturn,
            ErrorKind::NeedParenthesis,
            ErrorKind::NeedArrow,
            ErrorKind::NeedExpression,
            ErrorKind::DuplicateDeclaration,
            ErrorKind::ConstantNeedValue,
            ErrorKind::NeedDeclareSymbol,
            ErrorKind::TypeMismatch,
            ErrorKind::AssignToConstant,
            ErrorKind::InvalidAssignment,
            ErrorKind::NotCallable,
            ErrorKind::ArgumentCount,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_compilation_error_converts() {
        let err: Error = CompilationError::new(Position::new(1, 1), ErrorKind::Recognized).into();
        assert_eq!(err.position(), Some(Position::new(1, 1)));
        assert_eq!(Error::Io("gone".into()).position(), None);
    }
}
