//! Type System for C0

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frontend::token::{Literal, TokenKind};

/// Types a C0 value can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Int,
    Double,
    Void,
    /// Result of a comparison; never written in source
    Bool,
}

impl Type {
    /// Map a type keyword to its type
    pub fn from_keyword(kind: TokenKind) -> Option<Type> {
        match kind {
            TokenKind::Int => Some(Type::Int),
            TokenKind::Double => Some(Type::Double),
            TokenKind::Void => Some(Type::Void),
            _ => None,
        }
    }

    /// Check if variables and parameters may have this type
    pub fn is_storable(&self) -> bool {
        matches!(self, Self::Int | Self::Double)
    }

    /// Check if arithmetic is defined on this type
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Double)
    }

    /// Check if a value of this type can drive `if`/`while`
    pub fn is_condition(&self) -> bool {
        matches!(self, Self::Int | Self::Bool)
    }

    /// Value an uninitialized variable of this type holds
    pub fn zero_value(&self) -> Option<Literal> {
        match self {
            Self::Int => Some(Literal::Int(0)),
            Self::Double => Some(Literal::Double(0.0)),
            Self::Void | Self::Bool => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "int",
            Self::Double => "double",
            Self::Void => "void",
            Self::Bool => "bool",
        };
        f.write_str(name)
    }
}
