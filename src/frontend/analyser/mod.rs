//! Recursive-descent analyser for C0
//!
//! One procedure per grammar production, each reading tokens through the
//! [`TokenCursor`] with at most one token of pushback and checking
//! declarations against the [`SymbolTable`] as it goes. Analysis is a single
//! pass that stops at the first error.
//!
//! The procedures are split across files with `impl Analyser` blocks:
//! - `program`: top level and function declarations
//! - `statement`: statements and variable/constant declarations
//! - `expression`: expressions, from assignment down to factors and calls

mod expression;
mod program;
mod statement;

use log::{trace, warn};

use crate::frontend::cursor::TokenCursor;
use crate::frontend::program::{FunctionItem, Program};
use crate::frontend::symbols::{Declaration, FunctionDecl, ScopeId, ScopeKind, SymbolTable};
use crate::frontend::token::{Token, TokenKind};
use crate::types::Type;
use crate::utils::{CompilationError, ErrorKind, Position};

pub use statement::Statement;

/// Result of an analysis procedure
pub type AnalyseResult<T> = std::result::Result<T, CompilationError>;

/// Analyser settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyserOptions {
    /// Declare the standard-library functions before the program
    pub prelude: bool,
}

impl Default for AnalyserOptions {
    fn default() -> Self {
        Self { prelude: true }
    }
}

/// Standard library available to every program
const BUILTINS: &[(&str, &[Type], Type)] = &[
    ("getint", &[], Type::Int),
    ("getdouble", &[], Type::Double),
    ("getchar", &[], Type::Int),
    ("putint", &[Type::Int], Type::Void),
    ("putdouble", &[Type::Double], Type::Void),
    ("putchar", &[Type::Int], Type::Void),
    ("putln", &[], Type::Void),
];

/// The function whose body is being analysed
#[derive(Debug, Clone)]
pub(crate) struct FunctionContext {
    pub name: String,
    pub return_type: Type,
}

impl FunctionContext {
    fn entry() -> Self {
        Self {
            name: crate::frontend::program::ENTRY_NAME.to_string(),
            return_type: Type::Void,
        }
    }
}

/// Type and start position of an analysed expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Operand {
    pub ty: Type,
    pub position: Position,
}

/// The analyser
pub struct Analyser {
    cursor: TokenCursor,
    symbols: SymbolTable,
    /// Functions declared so far, in source order
    functions: Vec<FunctionItem>,
    /// Top-level variables and constants, in source order
    initializers: Vec<String>,
    global_scope: ScopeId,
}

impl Analyser {
    /// Create an analyser over a token stream
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_options(tokens, AnalyserOptions::default())
    }

    pub fn with_options(tokens: Vec<Token>, options: AnalyserOptions) -> Self {
        let mut symbols = SymbolTable::new();
        symbols.push_scope(ScopeKind::Prelude);
        if options.prelude {
            for (name, params, ret) in BUILTINS {
                let builtin = FunctionDecl {
                    param_types: params.to_vec(),
                    return_type: *ret,
                    body_scope: None,
                    builtin: true,
                };
                if let Err(err) =
                    symbols.declare(Declaration::function(*name, Position::default(), builtin))
                {
                    warn!("builtin `{}` not registered: {}", name, err);
                }
            }
        }
        let global_scope = symbols.push_scope(ScopeKind::Global);

        Self {
            cursor: TokenCursor::new(tokens),
            symbols,
            functions: Vec::new(),
            initializers: Vec::new(),
            global_scope,
        }
    }

    /// Analyse the whole token stream
    pub fn analyse(mut self) -> AnalyseResult<Program> {
        self.analyse_program()?;
        self.finish()
    }

    // ==================== Helper Methods ====================

    /// Error tagged with the cursor's current position
    fn error(&self, kind: ErrorKind) -> CompilationError {
        CompilationError::new(self.cursor.current_position(), kind)
    }

    /// Error tagged with the position of the token that would be read next
    fn error_at_next(&mut self, kind: ErrorKind) -> CompilationError {
        match self.cursor.next() {
            Some(next) => {
                let position = next.position();
                next.unread();
                CompilationError::new(position, kind)
            }
            None => self.error(kind),
        }
    }

    /// Consume a token of the given kind or fail with `err` at the token
    /// found in its place
    fn expect(&mut self, kind: TokenKind, err: ErrorKind) -> AnalyseResult<Token> {
        match self.cursor.next() {
            Some(next) if next.kind() == kind => Ok(next.commit()),
            Some(next) => {
                let position = next.position();
                next.commit();
                Err(CompilationError::new(position, err))
            }
            None => Err(self.error(err)),
        }
    }

    /// Consume a token of the given kind if it comes next
    fn accept(&mut self, kind: TokenKind) -> Option<Token> {
        let next = self.cursor.next()?;
        if next.kind() == kind {
            Some(next.commit())
        } else {
            next.unread();
            None
        }
    }

    /// ty -> 'int' | 'double' | 'void'
    fn analyse_type(&mut self, allow_void: bool) -> AnalyseResult<Type> {
        let Some(next) = self.cursor.next() else {
            return Err(self.error(ErrorKind::NeedType));
        };
        let position = next.position();
        let kind = next.kind();
        next.commit();

        match Type::from_keyword(kind) {
            Some(ty) if ty.is_storable() || (allow_void && ty == Type::Void) => Ok(ty),
            _ => Err(CompilationError::new(position, ErrorKind::NeedType)),
        }
    }

    /// Run `f` inside a new scope. The scope is popped whether `f`
    /// succeeds or fails.
    fn in_scope<T>(
        &mut self,
        kind: ScopeKind,
        f: impl FnOnce(&mut Self, ScopeId) -> AnalyseResult<T>,
    ) -> AnalyseResult<T> {
        let id = self.symbols.push_scope(kind);
        trace!("enter {:?} scope {:?} (depth {})", kind, id, self.symbols.depth());
        let result = f(self, id);
        self.symbols.pop_scope();
        trace!("leave {:?} scope {:?}", kind, id);
        result
    }

    fn finish(mut self) -> AnalyseResult<Program> {
        let calls_main = self.functions.iter().any(|f| f.name == "main");
        let globals = self
            .symbols
            .close_scope()
            .ok_or_else(|| CompilationError::new(self.cursor.end_position(), ErrorKind::Recognized))?;
        debug_assert_eq!(globals.id, self.global_scope);

        let entry = FunctionItem {
            name: FunctionContext::entry().name,
            position: Position::default(),
            params: Vec::new(),
            return_type: Type::Void,
            body_scope: self.global_scope,
        };
        Ok(Program {
            functions: self.functions,
            entry: crate::frontend::program::EntryPoint {
                function: entry,
                initializers: self.initializers,
                calls_main,
            },
            globals,
        })
    }
}

/// Analyse a token stream with the default options
pub fn analyse(tokens: Vec<Token>) -> AnalyseResult<Program> {
    Analyser::new(tokens).analyse()
}
