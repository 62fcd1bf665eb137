//! Token definitions for C0

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::{Position, Span};

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token
    pub text: String,
    /// Numeric value of literal tokens
    pub value: Option<Literal>,
    pub position: Position,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            value: None,
            position,
            span,
        }
    }

    /// Attach a literal value
    pub fn with_value(mut self, value: Literal) -> Self {
        self.value = Some(value);
        self
    }

    /// Position just past the last character of the token
    pub fn end_position(&self) -> Position {
        Position::new(
            self.position.line,
            self.position.column + self.text.chars().count(),
        )
    }
}

/// Value carried by a literal token
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Literal {
    Int(i64),
    Double(f64),
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // ============ Keywords ============
    /// fn
    Fn,
    /// let
    Let,
    /// const
    Const,
    /// if
    If,
    /// else
    Else,
    /// while
    While,
    /// return
    Return,
    /// int
    Int,
    /// double
    Double,
    /// void
    Void,

    // ============ Identifiers and Literals ============
    Identifier,
    UintLiteral,
    DoubleLiteral,
    CharLiteral,

    // ============ Operators ============
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Mul,
    /// /
    Div,
    /// =
    Assign,
    /// ==
    Eq,
    /// !=
    Neq,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Le,
    /// >=
    Ge,
    /// ->
    Arrow,

    // ============ Delimiters ============
    /// (
    LeftParen,
    /// )
    RightParen,
    /// {
    LeftBrace,
    /// }
    RightBrace,
    /// ,
    Comma,
    /// :
    Colon,
    /// ;
    Semicolon,
}

impl TokenKind {
    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Fn
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::Return
                | TokenKind::Int
                | TokenKind::Double
                | TokenKind::Void
        )
    }

    /// Try to convert an identifier to a keyword
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "fn" => Some(TokenKind::Fn),
            "let" => Some(TokenKind::Let),
            "const" => Some(TokenKind::Const),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "return" => Some(TokenKind::Return),
            "int" => Some(TokenKind::Int),
            "double" => Some(TokenKind::Double),
            "void" => Some(TokenKind::Void),
            _ => None,
        }
    }

    /// Check if this is one of the six comparison operators
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::Neq
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::Le
                | TokenKind::Ge
        )
    }

    /// Canonical spelling of fixed tokens
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Fn => "fn",
            TokenKind::Let => "let",
            TokenKind::Const => "const",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Return => "return",
            TokenKind::Int => "int",
            TokenKind::Double => "double",
            TokenKind::Void => "void",
            TokenKind::Identifier => "identifier",
            TokenKind::UintLiteral => "integer literal",
            TokenKind::DoubleLiteral => "double literal",
            TokenKind::CharLiteral => "char literal",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Mul => "*",
            TokenKind::Div => "/",
            TokenKind::Assign => "=",
            TokenKind::Eq => "==",
            TokenKind::Neq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::Arrow => "->",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
