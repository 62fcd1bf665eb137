//! Symbol table with nested scopes
//!
//! Open scopes form a stack; the innermost is the current one. Closing a
//! scope moves its declarations into a read-only [`ScopeInfo`] tree under
//! its parent, which is what the finished [`Program`](crate::frontend::Program)
//! exposes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Type;
use crate::utils::{CompilationError, ErrorKind, Position};

// ==================== Declarations ====================

/// Unique identifier for a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub usize);

/// What opened a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// Builtin functions
    Prelude,
    /// Top-level functions and the `_start` declarations
    Global,
    Function,
    Block,
}

/// A declared name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub position: Position,
    pub kind: DeclKind,
}

/// Kind of declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DeclKind {
    Function(FunctionDecl),
    Variable(VariableDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub param_types: Vec<Type>,
    pub return_type: Type,
    /// Scope holding the parameters; `None` for builtins
    pub body_scope: Option<ScopeId>,
    pub builtin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub ty: Type,
    pub is_const: bool,
    /// False until an initializer or assignment gives it a value; until
    /// then it holds the zero value of `ty`
    pub initialized: bool,
}

impl Declaration {
    pub fn function(name: impl Into<String>, position: Position, decl: FunctionDecl) -> Self {
        Self {
            name: name.into(),
            position,
            kind: DeclKind::Function(decl),
        }
    }

    pub fn variable(name: impl Into<String>, position: Position, decl: VariableDecl) -> Self {
        Self {
            name: name.into(),
            position,
            kind: DeclKind::Variable(decl),
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDecl> {
        match &self.kind {
            DeclKind::Function(f) => Some(f),
            DeclKind::Variable(_) => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableDecl> {
        match &self.kind {
            DeclKind::Variable(v) => Some(v),
            DeclKind::Function(_) => None,
        }
    }
}

// ==================== Scopes ====================

/// A closed scope and the scopes nested in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeInfo {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// In declaration order
    pub declarations: Vec<Declaration>,
    pub children: Vec<ScopeInfo>,
}

impl ScopeInfo {
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().map(|d| d.name.as_str())
    }

    /// Find a scope in this subtree
    pub fn find(&self, id: ScopeId) -> Option<&ScopeInfo> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// An open scope
#[derive(Debug)]
struct Scope {
    id: ScopeId,
    kind: ScopeKind,
    parent: Option<ScopeId>,
    index: HashMap<String, usize>,
    declarations: Vec<Declaration>,
    children: Vec<ScopeInfo>,
}

impl Scope {
    fn get(&self, name: &str) -> Option<&Declaration> {
        self.index.get(name).map(|&i| &self.declarations[i])
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Declaration> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.declarations[i]),
            None => None,
        }
    }

    fn into_info(self) -> ScopeInfo {
        ScopeInfo {
            id: self.id,
            kind: self.kind,
            parent: self.parent,
            declarations: self.declarations,
            children: self.children,
        }
    }
}

/// Symbol table with nested scopes
#[derive(Debug, Default)]
pub struct SymbolTable {
    open: Vec<Scope>,
    next_id: usize,
}

impl SymbolTable {
    /// An empty table with no open scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next pushed scope will get
    pub fn next_scope_id(&self) -> ScopeId {
        ScopeId(self.next_id)
    }

    /// Enter a new scope, child of the current one
    pub fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.next_id);
        self.next_id += 1;
        self.open.push(Scope {
            id,
            kind,
            parent: self.current_id(),
            index: HashMap::new(),
            declarations: Vec::new(),
            children: Vec::new(),
        });
        id
    }

    /// Exit the current scope, keeping it in its parent's tree
    pub fn pop_scope(&mut self) -> Option<ScopeId> {
        let closed = self.close_scope()?;
        let id = closed.id;
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(closed);
        }
        Some(id)
    }

    /// Exit the current scope and hand its tree to the caller
    pub fn close_scope(&mut self) -> Option<ScopeInfo> {
        self.open.pop().map(Scope::into_info)
    }

    pub fn current_id(&self) -> Option<ScopeId> {
        self.open.last().map(|s| s.id)
    }

    /// Number of open scopes
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Declare a name in the current scope
    pub fn declare(&mut self, decl: Declaration) -> Result<(), CompilationError> {
        let Some(scope) = self.open.last_mut() else {
            return Err(CompilationError::new(decl.position, ErrorKind::Recognized));
        };
        if scope.index.contains_key(&decl.name) {
            return Err(CompilationError::new(
                decl.position,
                ErrorKind::DuplicateDeclaration,
            ));
        }
        scope.index.insert(decl.name.clone(), scope.declarations.len());
        scope.declarations.push(decl);
        Ok(())
    }

    /// Look up a name, searching from the current scope outward
    pub fn lookup(&self, name: &str) -> Option<&Declaration> {
        self.open.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Mutable variant of [`lookup`](Self::lookup)
    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Declaration> {
        self.open.iter_mut().rev().find_map(|scope| scope.get_mut(name))
    }

    /// Look up a name only in the current scope
    pub fn lookup_local(&self, name: &str) -> Option<&Declaration> {
        self.open.last().and_then(|scope| scope.get(name))
    }

    pub fn is_declared_in_current_scope(&self, name: &str) -> bool {
        self.lookup_local(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_var(name: &str, line: usize) -> Declaration {
        Declaration::variable(
            name,
            Position::new(line, 1),
            VariableDecl {
                ty: Type::Int,
                is_const: false,
                initialized: true,
            },
        )
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let mut table = SymbolTable::new();
        table.push_scope(ScopeKind::Global);
        table.declare(int_var("x", 1)).unwrap();
        let err = table.declare(int_var("x", 2)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateDeclaration);
        assert_eq!(err.position, Position::new(2, 1));
    }

    #[test]
    fn test_shadowing() {
        let mut table = SymbolTable::new();
        table.push_scope(ScopeKind::Global);
        table.declare(int_var("x", 1)).unwrap();
        table.push_scope(ScopeKind::Block);
        assert!(!table.is_declared_in_current_scope("x"));
        table.declare(int_var("x", 2)).unwrap();
        assert_eq!(table.lookup("x").unwrap().position.line, 2);

        table.pop_scope();
        assert_eq!(table.lookup("x").unwrap().position.line, 1);
    }

    #[test]
    fn test_popped_scope_is_invisible_but_kept() {
        let mut table = SymbolTable::new();
        let global = table.push_scope(ScopeKind::Global);
        let block = table.push_scope(ScopeKind::Block);
        table.declare(int_var("a", 1)).unwrap();
        assert_eq!(table.pop_scope(), Some(block));
        assert!(table.lookup("a").is_none());
        assert_eq!(table.depth(), 1);

        let tree = table.close_scope().unwrap();
        assert_eq!(tree.id, global);
        let inner = tree.find(block).unwrap();
        assert_eq!(inner.parent, Some(global));
        assert_eq!(inner.names().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(table.depth(), 0);
    }

    #[test]
    fn test_lookup_mut_flips_initialized() {
        let mut table = SymbolTable::new();
        table.push_scope(ScopeKind::Global);
        let mut decl = int_var("y", 1);
        if let DeclKind::Variable(v) = &mut decl.kind {
            v.initialized = false;
        }
        table.declare(decl).unwrap();
        table.push_scope(ScopeKind::Block);

        if let Some(DeclKind::Variable(v)) = table.lookup_mut("y").map(|d| &mut d.kind) {
            v.initialized = true;
        }
        assert!(table.lookup("y").unwrap().as_variable().unwrap().initialized);
    }

    #[test]
    fn test_declare_without_scope() {
        let mut table = SymbolTable::new();
        assert!(table.declare(int_var("x", 1)).is_err());
        assert_eq!(table.pop_scope(), None);
    }
}
