//! Validated program structure handed to a code generator

use serde::{Deserialize, Serialize};

use crate::frontend::symbols::{Declaration, ScopeId, ScopeInfo};
use crate::types::Type;
use crate::utils::Position;

/// Name of the synthesized entry point
pub const ENTRY_NAME: &str = "_start";

/// A function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub is_const: bool,
    pub position: Position,
}

/// A function in the function table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionItem {
    pub name: String,
    pub position: Position,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body_scope: ScopeId,
}

/// The synthesized `_start` function.
///
/// It runs the top-level declarations in source order, then calls `main`
/// when the program defines one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub function: FunctionItem,
    /// Names of the top-level variables and constants, in source order
    pub initializers: Vec<String>,
    pub calls_main: bool,
}

/// Result of a successful analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// User functions in source order
    pub functions: Vec<FunctionItem>,
    pub entry: EntryPoint,
    /// The global scope with every function body and block nested below it
    pub globals: ScopeInfo,
}

impl Program {
    /// Look up a function by name, including the entry point
    pub fn function(&self, name: &str) -> Option<&FunctionItem> {
        if name == ENTRY_NAME {
            return Some(&self.entry.function);
        }
        self.functions.iter().find(|f| f.name == name)
    }

    /// All functions, the entry point last
    pub fn all_functions(&self) -> impl Iterator<Item = &FunctionItem> {
        self.functions
            .iter()
            .chain(std::iter::once(&self.entry.function))
    }

    pub fn scope(&self, id: ScopeId) -> Option<&ScopeInfo> {
        self.globals.find(id)
    }

    /// Declarations of the global scope
    pub fn global(&self, name: &str) -> Option<&Declaration> {
        self.globals.get(name)
    }

    /// Names declared at the top level, in source order
    pub fn global_names(&self) -> Vec<&str> {
        self.globals.names().collect()
    }

    /// Declarations local to a function's body scope
    pub fn locals(&self, function: &str) -> Option<&ScopeInfo> {
        let item = self.function(function)?;
        self.scope(item.body_scope)
    }
}
