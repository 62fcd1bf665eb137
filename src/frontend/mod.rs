//! Frontend module - Lexer, Token Cursor, Analyser, Symbol Table

pub mod analyser;
pub mod cursor;
pub mod lexer;
pub mod program;
pub mod symbols;
pub mod token;

pub use analyser::{Analyser, AnalyserOptions, Statement};
pub use program::Program;

use crate::utils::Result;
use lexer::Lexer;

/// Lex and analyse a source text with the default options
pub fn compile(source: &str) -> Result<Program> {
    compile_with(source, AnalyserOptions::default())
}

pub fn compile_with(source: &str, options: AnalyserOptions) -> Result<Program> {
    let tokens = Lexer::new(source).tokenize()?;
    log::debug!("lexed {} tokens", tokens.len());
    Ok(Analyser::with_options(tokens, options).analyse()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{Error, ErrorKind, Position};

    #[test]
    fn test_compile_reports_lexer_errors() {
        let err = compile("let x: int = 1 $ 2;").unwrap_err();
        assert!(matches!(err, Error::InvalidCharacter { found: '$', .. }));
    }

    #[test]
    fn test_compile_reports_analysis_errors() {
        let err = compile("fn main() -> void {\n  x;\n}").unwrap_err();
        assert_eq!(err.position(), Some(Position::new(2, 3)));
        match err {
            Error::Compilation(e) => assert_eq!(e.kind, ErrorKind::NeedDeclareSymbol),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
