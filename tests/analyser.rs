use c0_frontend::frontend::cursor::TokenCursor;
use c0_frontend::frontend::lexer::Lexer;
use c0_frontend::frontend::symbols::{DeclKind, ScopeKind, SymbolTable, VariableDecl};
use c0_frontend::frontend::token::TokenKind;
use c0_frontend::frontend::{compile, Analyser, Statement};
use c0_frontend::types::Type;
use c0_frontend::utils::{CompilationError, Error, ErrorKind, Position};
use pretty_assertions::assert_eq;

fn compilation_error(source: &str) -> CompilationError {
    match compile(source) {
        Err(Error::Compilation(err)) => err,
        other => panic!("expected an analysis error, got {:?}", other),
    }
}

const FIBONACCI: &str = r#"
// iterative fibonacci
const limit: int = 10;
let count: int;

fn fib(n: int) -> int {
    let a: int = 0;
    let b: int = 1;
    let t: int;
    while n > 0 {
        t = a + b;
        a = b;
        b = t;
        n = n - 1;
    }
    return a;
}

fn main() -> void {
    while count < limit {
        putint(fib(count));
        putchar(' ');
        count = count + 1;
    }
    putln();
}
"#;

#[test]
fn analyses_a_complete_program() {
    let program = compile(FIBONACCI).unwrap();

    assert_eq!(program.global_names(), vec!["limit", "count", "fib", "main"]);
    assert_eq!(program.entry.initializers, vec!["limit", "count"]);
    assert!(program.entry.calls_main);

    let fib = program.locals("fib").unwrap();
    assert_eq!(fib.kind, ScopeKind::Function);
    assert_eq!(fib.names().collect::<Vec<_>>(), vec!["n", "a", "b", "t"]);
    assert_eq!(fib.children.len(), 1);
    assert_eq!(fib.children[0].kind, ScopeKind::Block);

    let t = fib.get("t").unwrap().as_variable().unwrap();
    assert_eq!(
        t,
        &VariableDecl {
            ty: Type::Int,
            is_const: false,
            initialized: true,
        }
    );

    match &program.global("limit").unwrap().kind {
        DeclKind::Variable(var) => assert!(var.is_const),
        other => panic!("limit declared as {:?}", other),
    }
}

#[test]
fn program_serializes_to_json() {
    let program = compile(FIBONACCI).unwrap();
    let value = serde_json::to_value(&program).unwrap();
    assert_eq!(value["entry"]["function"]["name"], "_start");
    assert_eq!(value["functions"][0]["return_type"], "int");
    assert_eq!(value["globals"]["declarations"][2]["name"], "fib");
    assert_eq!(value["globals"]["declarations"][2]["kind"]["type"], "function");
}

#[test]
fn stops_at_the_first_error() {
    let err = compilation_error(
        "fn main() -> void {\n    let a: int = 1\n    let b: int = 2;\n    undeclared;\n}",
    );
    assert_eq!(err.kind, ErrorKind::NeedSemicolon);
    assert_eq!(err.position, Position::new(3, 5));
}

#[test]
fn duplicate_and_shadowed_declarations() {
    let err = compilation_error("let a: int = 1;\nconst a: int = 2;");
    assert_eq!(err, CompilationError::new(Position::new(2, 7), ErrorKind::DuplicateDeclaration));

    assert!(compile("let a: int = 1; fn main() -> void { let a: double = 1.0; { let a: int; } }").is_ok());
}

#[test]
fn constant_rules() {
    assert_eq!(compilation_error("const x: int;").kind, ErrorKind::ConstantNeedValue);
    assert_eq!(
        compilation_error("const x: int = 1; fn main() -> void { x = 2; }").kind,
        ErrorKind::AssignToConstant
    );
    assert_eq!(
        compilation_error("fn f(const p: int) -> void { p = 2; }").kind,
        ErrorKind::AssignToConstant
    );
}

#[test]
fn block_locals_do_not_escape() {
    let err = compilation_error("fn main() -> void {\n  { let inner: int = 1; }\n  putint(inner);\n}");
    assert_eq!(err, CompilationError::new(Position::new(3, 10), ErrorKind::NeedDeclareSymbol));
}

#[test]
fn missing_colon_reports_the_offending_token() {
    let err = compilation_error("fn main() -> void { let v double = 1.0; }");
    assert_eq!(err, CompilationError::new(Position::new(1, 27), ErrorKind::NeedColon));
}

#[test]
fn type_errors() {
    assert_eq!(
        compilation_error("fn f() -> double { return 1; }").kind,
        ErrorKind::TypeMismatch
    );
    assert_eq!(
        compilation_error("fn f() -> void { return 1; }").kind,
        ErrorKind::TypeMismatch
    );
    assert_eq!(
        compilation_error("fn main() -> void { if 1.5 { } }").kind,
        ErrorKind::TypeMismatch
    );
    assert!(compile("fn main() -> void { let d: double = getdouble() * 2.0; putdouble(-d); }").is_ok());
}

#[test]
fn entry_point_name_cannot_be_redefined() {
    let err = compilation_error("fn _start() -> void { let z: int = 1; } fn main() -> void { _start(); }");
    assert_eq!(err, CompilationError::new(Position::new(1, 4), ErrorKind::DuplicateDeclaration));
}

#[test]
fn top_level_statements_are_rejected() {
    let err = compilation_error("let a: int = 1;\nputint(a);");
    assert_eq!(err, CompilationError::new(Position::new(2, 1), ErrorKind::Recognized));
}

#[test]
fn lexer_errors_surface_through_compile() {
    assert!(matches!(
        compile("fn main() -> void { putchar('a); }"),
        Err(Error::UnterminatedLiteral { .. })
    ));
}

#[test]
fn analyser_from_explicit_tokens() {
    let tokens = Lexer::new("fn main() -> void { }").tokenize().unwrap();
    assert_eq!(tokens.len(), 8);
    let program = Analyser::new(tokens).analyse().unwrap();
    assert_eq!(program.all_functions().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["main", "_start"]);
}

#[test]
fn cursor_pushback_is_single_token() {
    let tokens = Lexer::new("x = 1").tokenize().unwrap();
    let mut cursor = TokenCursor::new(tokens);

    let first = cursor.next().unwrap();
    assert_eq!(first.kind(), TokenKind::Identifier);
    first.unread();
    assert_eq!(cursor.offset(), 0);

    assert_eq!(cursor.next().unwrap().commit().text, "x");
    assert_eq!(cursor.peek_kind(), Some(TokenKind::Assign));
    assert_eq!(cursor.offset(), 1);
}

#[test]
fn statements_classify_by_leading_token() {
    assert_eq!(Statement::classify(TokenKind::While), Statement::While);
    assert_eq!(Statement::classify(TokenKind::LeftBrace), Statement::Block);
    assert_eq!(Statement::classify(TokenKind::Identifier), Statement::Expr);
}

#[test]
fn symbol_table_scopes() {
    let mut table = SymbolTable::new();
    table.push_scope(ScopeKind::Global);
    assert_eq!(table.depth(), 1);
    assert!(table.lookup("x").is_none());
    table.pop_scope();
    assert_eq!(table.depth(), 0);
}
