//! Expressions
//!
//! ```text
//! expr       -> assign
//! assign     -> IDENT '=' assign | comparison
//! comparison -> additive (('=='|'!='|'<'|'>'|'<='|'>=') additive)*
//! additive   -> term (('+'|'-') term)*
//! term       -> unary (('*'|'/') unary)*
//! unary      -> '-' unary | factor
//! factor     -> UINT | DOUBLE | CHAR | IDENT | call | '(' expr ')'
//! call       -> IDENT '(' (expr (',' expr)*)? ')'
//! ```
//!
//! Telling an assignment from a plain use of a name takes the identifier
//! plus the token after it. Only that second token can be pushed back, so
//! the already-consumed identifier is handed down the precedence chain as
//! `leading` and becomes the first factor.

use super::{AnalyseResult, Analyser, Operand};
use crate::frontend::symbols::DeclKind;
use crate::frontend::token::{Token, TokenKind};
use crate::types::Type;
use crate::utils::{CompilationError, ErrorKind};

impl Analyser {
    pub(crate) fn analyse_expression(&mut self) -> AnalyseResult<Operand> {
        self.analyse_assign_expression()
    }

    // assign_expr -> IDENT '=' expr
    fn analyse_assign_expression(&mut self) -> AnalyseResult<Operand> {
        let mut leading = None;
        match self.cursor.next() {
            Some(next) if next.kind() == TokenKind::Identifier => {
                let ident = next.commit();
                if self.accept(TokenKind::Assign).is_some() {
                    return self.analyse_assignment(ident);
                }
                leading = Some(ident);
            }
            Some(next) => next.unread(),
            None => return Err(self.error(ErrorKind::NeedExpression)),
        }

        let value = self.analyse_comparison(leading)?;
        match self.cursor.next() {
            Some(next) if next.kind() == TokenKind::Assign => {
                let position = next.position();
                next.commit();
                Err(CompilationError::new(position, ErrorKind::InvalidAssignment))
            }
            Some(next) => {
                next.unread();
                Ok(value)
            }
            None => Ok(value),
        }
    }

    /// Right-hand side of `ident =`
    fn analyse_assignment(&mut self, ident: Token) -> AnalyseResult<Operand> {
        let target = match self.symbols.lookup(&ident.text).map(|d| &d.kind) {
            None => {
                return Err(CompilationError::new(
                    ident.position,
                    ErrorKind::NeedDeclareSymbol,
                ))
            }
            Some(DeclKind::Function(_)) => {
                return Err(CompilationError::new(
                    ident.position,
                    ErrorKind::InvalidAssignment,
                ))
            }
            Some(DeclKind::Variable(var)) if var.is_const => {
                return Err(CompilationError::new(
                    ident.position,
                    ErrorKind::AssignToConstant,
                ))
            }
            Some(DeclKind::Variable(var)) => var.ty,
        };

        let value = self.analyse_assign_expression()?;
        if value.ty != target {
            return Err(CompilationError::new(value.position, ErrorKind::TypeMismatch));
        }

        if let Some(DeclKind::Variable(var)) =
            self.symbols.lookup_mut(&ident.text).map(|d| &mut d.kind)
        {
            var.initialized = true;
        }
        Ok(Operand {
            ty: Type::Void,
            position: ident.position,
        })
    }

    // comparison_expr -> additive_expr (compare_op additive_expr)*
    fn analyse_comparison(&mut self, leading: Option<Token>) -> AnalyseResult<Operand> {
        let mut left = self.analyse_additive(leading)?;
        while let Some(op) = self.accept_operator(TokenKind::is_comparison) {
            let right = self.analyse_additive(None)?;
            self.check_operands(&left, &right, &op)?;
            left = Operand {
                ty: Type::Bool,
                position: left.position,
            };
        }
        Ok(left)
    }

    // additive_expr -> term (('+'|'-') term)*
    fn analyse_additive(&mut self, leading: Option<Token>) -> AnalyseResult<Operand> {
        let left = self.analyse_term(leading)?;
        while let Some(op) =
            self.accept_operator(|kind| matches!(kind, TokenKind::Plus | TokenKind::Minus))
        {
            let right = self.analyse_term(None)?;
            self.check_operands(&left, &right, &op)?;
        }
        Ok(left)
    }

    // term -> unary (('*'|'/') unary)*
    fn analyse_term(&mut self, leading: Option<Token>) -> AnalyseResult<Operand> {
        let left = self.analyse_unary(leading)?;
        while let Some(op) =
            self.accept_operator(|kind| matches!(kind, TokenKind::Mul | TokenKind::Div))
        {
            let right = self.analyse_unary(None)?;
            self.check_operands(&left, &right, &op)?;
        }
        Ok(left)
    }

    // negate_expr -> '-' expr
    fn analyse_unary(&mut self, leading: Option<Token>) -> AnalyseResult<Operand> {
        if leading.is_some() {
            return self.analyse_factor(leading);
        }
        let Some(minus) = self.accept(TokenKind::Minus) else {
            return self.analyse_factor(None);
        };

        let operand = self.analyse_unary(None)?;
        if !operand.ty.is_numeric() {
            return Err(CompilationError::new(operand.position, ErrorKind::TypeMismatch));
        }
        Ok(Operand {
            ty: operand.ty,
            position: minus.position,
        })
    }

    // factor -> literal_expr | ident_expr | call_expr | group_expr
    fn analyse_factor(&mut self, leading: Option<Token>) -> AnalyseResult<Operand> {
        let token = match leading {
            Some(token) => token,
            None => match self.cursor.next() {
                Some(next) => next.commit(),
                None => return Err(self.error(ErrorKind::NeedExpression)),
            },
        };

        let ty = match token.kind {
            TokenKind::UintLiteral | TokenKind::CharLiteral => Type::Int,
            TokenKind::DoubleLiteral => Type::Double,
            // group_expr -> '(' expr ')'
            TokenKind::LeftParen => {
                let inner = self.analyse_expression()?;
                self.expect(TokenKind::RightParen, ErrorKind::NeedParenthesis)?;
                inner.ty
            }
            TokenKind::Identifier if self.cursor.peek_kind() == Some(TokenKind::LeftParen) => {
                return self.analyse_call(token);
            }
            TokenKind::Identifier => match self.symbols.lookup(&token.text).map(|d| &d.kind) {
                Some(DeclKind::Variable(var)) => var.ty,
                Some(DeclKind::Function(_)) => {
                    return Err(CompilationError::new(token.position, ErrorKind::NotCallable))
                }
                None => {
                    return Err(CompilationError::new(
                        token.position,
                        ErrorKind::NeedDeclareSymbol,
                    ))
                }
            },
            _ => return Err(CompilationError::new(token.position, ErrorKind::NeedExpression)),
        };

        Ok(Operand {
            ty,
            position: token.position,
        })
    }

    // call_expr -> IDENT '(' call_param_list? ')'
    fn analyse_call(&mut self, ident: Token) -> AnalyseResult<Operand> {
        let (param_types, return_type) = match self.symbols.lookup(&ident.text).map(|d| &d.kind) {
            Some(DeclKind::Function(func)) => (func.param_types.clone(), func.return_type),
            Some(DeclKind::Variable(_)) => {
                return Err(CompilationError::new(ident.position, ErrorKind::NotCallable))
            }
            None => {
                return Err(CompilationError::new(
                    ident.position,
                    ErrorKind::NeedDeclareSymbol,
                ))
            }
        };
        self.expect(TokenKind::LeftParen, ErrorKind::NeedParenthesis)?;

        let mut count = 0;
        if self.accept(TokenKind::RightParen).is_none() {
            loop {
                let arg = self.analyse_expression()?;
                if let Some(expected) = param_types.get(count) {
                    if arg.ty != *expected {
                        return Err(CompilationError::new(arg.position, ErrorKind::TypeMismatch));
                    }
                }
                count += 1;

                match self.cursor.next() {
                    Some(next) if next.kind() == TokenKind::Comma => {
                        next.commit();
                    }
                    Some(next) if next.kind() == TokenKind::RightParen => {
                        next.commit();
                        break;
                    }
                    Some(next) => {
                        let position = next.position();
                        next.commit();
                        return Err(CompilationError::new(position, ErrorKind::NeedParenthesis));
                    }
                    None => return Err(self.error(ErrorKind::NeedParenthesis)),
                }
            }
        }

        if count != param_types.len() {
            return Err(CompilationError::new(ident.position, ErrorKind::ArgumentCount));
        }
        Ok(Operand {
            ty: return_type,
            position: ident.position,
        })
    }

    /// Consume the next token if it is an operator `is_op` accepts
    fn accept_operator(&mut self, is_op: impl Fn(&TokenKind) -> bool) -> Option<Token> {
        let next = self.cursor.next()?;
        if is_op(&next.kind()) {
            Some(next.commit())
        } else {
            next.unread();
            None
        }
    }

    /// Both operands of a binary operator must share one numeric type
    fn check_operands(&self, left: &Operand, right: &Operand, op: &Token) -> AnalyseResult<()> {
        if left.ty.is_numeric() && left.ty == right.ty {
            Ok(())
        } else {
            Err(CompilationError::new(op.position, ErrorKind::TypeMismatch))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::frontend::symbols::VariableDecl;
    use crate::utils::Position;
    use pretty_assertions::assert_eq;

    fn expr_type(globals: &str, expr: &str) -> Result<Type, ErrorKind> {
        let mut analyser = analyser(&format!("{} {}", globals, expr));
        let context = super::super::FunctionContext::entry();
        while analyser.cursor.peek_kind() == Some(TokenKind::Let)
            || analyser.cursor.peek_kind() == Some(TokenKind::Const)
        {
            if analyser.cursor.peek_kind() == Some(TokenKind::Let) {
                analyser.analyse_decl_variable_statement(&context).unwrap();
            } else {
                analyser.analyse_decl_const_statement(&context).unwrap();
            }
        }
        let result = analyser.analyse_expression().map(|o| o.ty).map_err(|e| e.kind);
        if result.is_ok() {
            assert!(analyser.cursor.is_at_end(), "expression left tokens behind");
        }
        result
    }

    #[test]
    fn test_literals() {
        assert_eq!(expr_type("", "42"), Ok(Type::Int));
        assert_eq!(expr_type("", "'a'"), Ok(Type::Int));
        assert_eq!(expr_type("", "2.5"), Ok(Type::Double));
        assert_eq!(expr_type("", "(((7)))"), Ok(Type::Int));
    }

    #[test]
    fn test_arithmetic_precedence_and_types() {
        assert_eq!(expr_type("", "1 + 2 * 3 - -4 / 2"), Ok(Type::Int));
        assert_eq!(expr_type("", "1.0 * (2.0 + 3.0)"), Ok(Type::Double));
        assert_eq!(expr_type("", "1 + 2.0"), Err(ErrorKind::TypeMismatch));
        assert_eq!(expr_type("", "-putln()"), Err(ErrorKind::TypeMismatch));
        assert_eq!(expr_type("", "1 +"), Err(ErrorKind::NeedExpression));
    }

    #[test]
    fn test_comparison() {
        assert_eq!(expr_type("", "1 + 1 < 3"), Ok(Type::Bool));
        assert_eq!(expr_type("", "1.5 >= 0.5"), Ok(Type::Bool));
        assert_eq!(expr_type("", "1 == 1.0"), Err(ErrorKind::TypeMismatch));
        assert_eq!(expr_type("", "1 < 2 < 3"), Err(ErrorKind::TypeMismatch));
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(expr_type("let x: double;", "x * 2.0"), Ok(Type::Double));
        assert_eq!(expr_type("", "y"), Err(ErrorKind::NeedDeclareSymbol));
        assert_eq!(expr_type("", "getint"), Err(ErrorKind::NotCallable));
    }

    #[test]
    fn test_assignment() {
        assert_eq!(expr_type("let x: int;", "x = 3"), Ok(Type::Void));
        assert_eq!(expr_type("let x: int;", "x = 3.0"), Err(ErrorKind::TypeMismatch));
        assert_eq!(expr_type("const x: int = 1;", "x = 3"), Err(ErrorKind::AssignToConstant));
        assert_eq!(expr_type("", "z = 3"), Err(ErrorKind::NeedDeclareSymbol));
        assert_eq!(expr_type("", "putln = 3"), Err(ErrorKind::InvalidAssignment));
        assert_eq!(expr_type("let x: int;", "x + 1 = 3"), Err(ErrorKind::InvalidAssignment));
        assert_eq!(expr_type("let x: int;", "(x) = 3"), Err(ErrorKind::InvalidAssignment));
        assert_eq!(expr_type("let x: int; let y: int;", "x = y = 3"), Err(ErrorKind::TypeMismatch));
    }

    #[test]
    fn test_assignment_marks_initialized() {
        let mut analyser = analyser("let x: int; x = 5");
        let context = super::super::FunctionContext::entry();
        analyser.analyse_decl_variable_statement(&context).unwrap();
        let before = analyser.symbols.lookup("x").unwrap().as_variable().unwrap().clone();
        assert!(!before.initialized);

        analyser.analyse_expression().unwrap();
        assert_eq!(
            analyser.symbols.lookup("x").unwrap().as_variable(),
            Some(&VariableDecl {
                ty: Type::Int,
                is_const: false,
                initialized: true,
            })
        );
    }

    #[test]
    fn test_calls() {
        assert_eq!(expr_type("", "getint()"), Ok(Type::Int));
        assert_eq!(expr_type("", "putint(getint() + 1)"), Ok(Type::Void));
        assert_eq!(expr_type("", "putint()"), Err(ErrorKind::ArgumentCount));
        assert_eq!(expr_type("", "putln(1)"), Err(ErrorKind::ArgumentCount));
        assert_eq!(expr_type("", "putint(1, 2)"), Err(ErrorKind::ArgumentCount));
        assert_eq!(expr_type("", "putdouble(1)"), Err(ErrorKind::TypeMismatch));
        assert_eq!(expr_type("", "putint(1"), Err(ErrorKind::NeedParenthesis));
        assert_eq!(expr_type("", "putint(1;"), Err(ErrorKind::NeedParenthesis));
        assert_eq!(expr_type("let v: int;", "v(1)"), Err(ErrorKind::NotCallable));
        assert_eq!(expr_type("", "nothing()"), Err(ErrorKind::NeedDeclareSymbol));
    }

    #[test]
    fn test_error_positions() {
        let err = analyse_source("fn main() -> void {\n  putint(1 + 2.0);\n}").unwrap_err();
        assert_eq!(err, CompilationError::new(Position::new(2, 12), ErrorKind::TypeMismatch));

        let err = analyse_source("fn main() -> void {\n  undefined = 1;\n}").unwrap_err();
        assert_eq!(err, CompilationError::new(Position::new(2, 3), ErrorKind::NeedDeclareSymbol));
    }
}
