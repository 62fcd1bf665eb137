//! Structured Feedback Module
//!
//! Machine-readable results of a `check` run:
//! - JSON error reports with fix suggestions
//! - Compilation statistics

use serde::{Deserialize, Serialize};

use crate::frontend::lexer::Lexer;
use crate::frontend::{Analyser, Program};
use crate::utils::{Error, ErrorKind, Position};

// ==================== Structured Error Report ====================

/// A structured report for one diagnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error code (e.g., "E0001")
    pub code: String,

    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    pub location: Option<Location>,

    /// Suggested fixes, most likely first
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Description of the fix
    pub message: String,

    /// Text to insert, when the fix is a single token
    pub replacement: Option<String>,

    /// Confidence in this suggestion (0.0 - 1.0)
    pub confidence: f64,
}

impl Suggestion {
    fn new(message: &str, replacement: Option<&str>, confidence: f64) -> Self {
        Self {
            message: message.to_string(),
            replacement: replacement.map(str::to_string),
            confidence,
        }
    }
}

// ==================== Compilation Feedback ====================

/// Complete result of checking one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationFeedback {
    pub success: bool,

    pub source_file: String,

    /// Errors found, at most one since analysis stops at the first
    pub diagnostics: Vec<ErrorReport>,

    pub stats: CompilationStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationStats {
    /// Number of tokens in the source
    pub token_count: usize,

    /// Number of user functions
    pub function_count: usize,

    /// Number of top-level declarations, functions included
    pub global_count: usize,

    /// Lines of code
    pub loc: usize,
}

impl CompilationStats {
    /// Statistics of a source text, before or without analysis
    pub fn for_source(source: &str, token_count: usize) -> Self {
        Self {
            token_count,
            loc: source.lines().filter(|l| !l.trim().is_empty()).count(),
            ..Self::default()
        }
    }

    /// Add the counts of an analysed program
    pub fn with_program(mut self, program: &Program) -> Self {
        self.function_count = program.functions.len();
        self.global_count = program.globals.declarations.len();
        self
    }
}

// ==================== Error Conversion ====================

impl ErrorReport {
    /// Create an error report from a front-end error
    pub fn from_error(error: &Error, file_name: &str) -> Self {
        let (code, suggestions) = error_info(error);
        let location = error.position().map(|Position { line, column }| Location {
            file: file_name.to_string(),
            line,
            column,
        });

        let mut report = Self {
            code: code.to_string(),
            severity: Severity::Error,
            message: error.to_string(),
            location,
            suggestions,
        };
        report.sort_suggestions();
        report
    }

    /// Sort suggestions by confidence (highest first)
    pub fn sort_suggestions(&mut self) {
        self.suggestions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

/// Code and suggestions for an error
fn error_info(error: &Error) -> (&'static str, Vec<Suggestion>) {
    match error {
        // ========== Lexer Errors ==========
        Error::InvalidCharacter { found, .. } => (
            "L0001",
            vec![Suggestion::new(
                &format!("Remove the character {:?}; C0 does not use it", found),
                None,
                0.6,
            )],
        ),
        Error::UnterminatedLiteral { .. } => (
            "L0002",
            vec![Suggestion::new("Close the character literal", Some("'"), 0.8)],
        ),
        Error::InvalidNumber { .. } => (
            "L0003",
            vec![Suggestion::new(
                "Integer literals must fit in 64 bits and doubles need digits after '.'",
                None,
                0.5,
            )],
        ),
        Error::Io(_) => ("L0000", vec![]),

        // ========== Analysis Errors ==========
        Error::Compilation(err) => (err.kind.code(), kind_suggestions(err.kind)),
    }
}

fn kind_suggestions(kind: ErrorKind) -> Vec<Suggestion> {
    match kind {
        ErrorKind::NeedSemicolon => vec![Suggestion::new(
            "Terminate the statement",
            Some(";"),
            0.9,
        )],
        ErrorKind::NeedColon => vec![Suggestion::new(
            "Separate the name from its type",
            Some(":"),
            0.9,
        )],
        ErrorKind::NeedBrace => vec![Suggestion::new(
            "Bodies of functions, if and while are blocks",
            Some("{"),
            0.8,
        )],
        ErrorKind::NeedArrow => vec![Suggestion::new(
            "Declare the return type after the parameters",
            Some("->"),
            0.9,
        )],
        ErrorKind::NeedType => vec![Suggestion::new(
            "Variables are 'int' or 'double'; functions may also return 'void'",
            Some("int"),
            0.6,
        )],
        ErrorKind::NeedReturn => vec![
            Suggestion::new("Add a return statement at the end of the body", None, 0.8),
            Suggestion::new("Declare the function as returning void", Some("void"), 0.4),
        ],
        ErrorKind::ConstantNeedValue => vec![
            Suggestion::new("Give the constant a value", Some("= 0"), 0.8),
            Suggestion::new("Declare it with 'let' instead", Some("let"), 0.5),
        ],
        ErrorKind::AssignToConstant => vec![Suggestion::new(
            "Declare the variable with 'let' to make it assignable",
            Some("let"),
            0.7,
        )],
        ErrorKind::DuplicateDeclaration => vec![
            Suggestion::new("Rename one of the declarations", None, 0.7),
            Suggestion::new("Move the second declaration into a nested block", None, 0.3),
        ],
        ErrorKind::NeedDeclareSymbol => vec![
            Suggestion::new("Declare the name before using it", None, 0.8),
            Suggestion::new("Check the spelling of the name", None, 0.5),
        ],
        ErrorKind::TypeMismatch => vec![Suggestion::new(
            "C0 has no implicit conversion between int and double",
            None,
            0.6,
        )],
        ErrorKind::ArgumentCount => vec![Suggestion::new(
            "Pass one argument per declared parameter",
            None,
            0.8,
        )],
        ErrorKind::NotCallable => vec![Suggestion::new(
            "Only functions can be called, and only calls can use a function name",
            None,
            0.6,
        )],
        ErrorKind::InvalidAssignment => vec![Suggestion::new(
            "The left side of '=' must be a variable name",
            None,
            0.7,
        )],
        ErrorKind::NeedParenthesis | ErrorKind::NeedIdentifier | ErrorKind::NeedExpression => {
            vec![Suggestion::new("Check the syntax near this token", None, 0.3)]
        }
        ErrorKind::Recognized => vec![Suggestion::new(
            "Only 'fn', 'let' and 'const' may appear at the top level",
            None,
            0.5,
        )],
    }
}

impl CompilationFeedback {
    /// Lex and analyse a source text, returning the report and, on
    /// success, the analysed program
    pub fn check(source: &str, file_name: &str) -> (Self, Option<Program>) {
        let tokens = match Lexer::new(source).tokenize() {
            Ok(tokens) => tokens,
            Err(err) => {
                let stats = CompilationStats::for_source(source, 0);
                return (Self::from_error(&err, file_name, stats), None);
            }
        };

        let stats = CompilationStats::for_source(source, tokens.len());
        match Analyser::new(tokens).analyse() {
            Ok(program) => {
                let stats = stats.with_program(&program);
                (Self::success(file_name.to_string(), stats), Some(program))
            }
            Err(err) => (Self::from_error(&err.into(), file_name, stats), None),
        }
    }

    /// Failed feedback holding a single error
    pub fn from_error(error: &Error, file_name: &str, stats: CompilationStats) -> Self {
        let report = ErrorReport::from_error(error, file_name);
        Self::failure(file_name.to_string(), vec![report], stats)
    }

    pub fn success(source_file: String, stats: CompilationStats) -> Self {
        Self {
            success: true,
            source_file,
            diagnostics: vec![],
            stats,
        }
    }

    pub fn failure(source_file: String, errors: Vec<ErrorReport>, stats: CompilationStats) -> Self {
        Self {
            success: false,
            source_file,
            diagnostics: errors,
            stats,
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::compile;
    use crate::utils::CompilationError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_from_compilation_error() {
        let err: Error = CompilationError::new(Position::new(4, 2), ErrorKind::NeedSemicolon).into();
        let report = ErrorReport::from_error(&err, "a.c0");
        assert_eq!(report.code, "E0005");
        assert_eq!(report.severity, Severity::Error);
        assert_eq!(report.message, "expected ';' at line 4, column 2");
        assert_eq!(
            report.location,
            Some(Location {
                file: "a.c0".to_string(),
                line: 4,
                column: 2,
            })
        );
        assert_eq!(report.suggestions[0].replacement.as_deref(), Some(";"));
    }

    #[test]
    fn test_suggestions_sorted_by_confidence() {
        let err: Error = CompilationError::new(Position::start(), ErrorKind::NeedReturn).into();
        let report = ErrorReport::from_error(&err, "a.c0");
        let confidences: Vec<_> = report.suggestions.iter().map(|s| s.confidence).collect();
        assert_eq!(confidences, vec![0.8, 0.4]);
    }

    #[test]
    fn test_io_error_has_no_location() {
        let report = ErrorReport::from_error(&Error::Io("missing".into()), "a.c0");
        assert_eq!(report.location, None);
        assert!(report.suggestions.is_empty());

        let feedback =
            CompilationFeedback::from_error(&Error::Io("missing".into()), "a.c0", CompilationStats::default());
        assert!(!feedback.success);
        assert_eq!(feedback.diagnostics, vec![report]);
    }

    #[test]
    fn test_check_keeps_token_count_on_analysis_error() {
        let (feedback, program) = CompilationFeedback::check("fn main() -> void { x; }", "a.c0");
        assert!(program.is_none());
        assert!(!feedback.success);
        assert_eq!(feedback.stats.token_count, 10);
        assert_eq!(feedback.diagnostics[0].code, "E0010");
    }

    #[test]
    fn test_check_lexer_error() {
        let (feedback, _) = CompilationFeedback::check("let x: int = 1 # 2;", "a.c0");
        assert_eq!(feedback.stats.token_count, 0);
        assert_eq!(feedback.diagnostics[0].code, "L0001");
    }

    #[test]
    fn test_check_success() {
        let (feedback, program) = CompilationFeedback::check("fn main() -> void { putln(); }", "a.c0");
        assert!(feedback.success);
        assert_eq!(feedback.stats.function_count, 1);
        assert_eq!(program.unwrap().functions[0].name, "main");
    }

    #[test]
    fn test_stats_and_json() {
        let source = "let g: int = 1;\n\nfn main() -> void { putint(g); }\n";
        let program = compile(source).unwrap();
        let stats = CompilationStats::for_source(source, 20).with_program(&program);
        assert_eq!(
            stats,
            CompilationStats {
                token_count: 20,
                function_count: 1,
                global_count: 2,
                loc: 2,
            }
        );

        let feedback = CompilationFeedback::success("a.c0".to_string(), stats);
        let value: serde_json::Value = serde_json::from_str(&feedback.to_json()).unwrap();
        assert_eq!(value["success"], serde_json::Value::Bool(true));
        assert_eq!(value["stats"]["function_count"], 1);
        assert!(value["diagnostics"].as_array().unwrap().is_empty());
    }
}
