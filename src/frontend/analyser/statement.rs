//! Statements and variable/constant declarations
//!
//! Statement procedures return whether the statement always returns from
//! the enclosing function, which the function procedure needs to reject
//! non-void bodies that can fall off the end.

use log::debug;

use super::{AnalyseResult, Analyser, FunctionContext};
use crate::frontend::symbols::{Declaration, ScopeKind, VariableDecl};
use crate::frontend::token::TokenKind;
use crate::types::Type;
use crate::utils::{CompilationError, ErrorKind, Position};

/// The statement alternatives, chosen by one token of lookahead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    If,
    While,
    Return,
    Block,
    Let,
    Const,
    Empty,
    Expr,
}

impl Statement {
    /// Classify the first token of a statement. Anything that starts no
    /// other statement starts an expression statement.
    pub fn classify(kind: TokenKind) -> Statement {
        match kind {
            TokenKind::If => Statement::If,
            TokenKind::While => Statement::While,
            TokenKind::Return => Statement::Return,
            TokenKind::LeftBrace => Statement::Block,
            TokenKind::Let => Statement::Let,
            TokenKind::Const => Statement::Const,
            TokenKind::Semicolon => Statement::Empty,
            _ => Statement::Expr,
        }
    }
}

impl Analyser {
    // stmt ->
    //       expr_stmt
    //     | decl_stmt
    //     | if_stmt
    //     | while_stmt
    //     | return_stmt
    //     | block_stmt
    //     | empty_stmt
    pub(crate) fn analyse_statement(&mut self, func: &FunctionContext) -> AnalyseResult<bool> {
        let Some(next) = self.cursor.next() else {
            return Err(self.error(ErrorKind::Recognized));
        };
        let statement = Statement::classify(next.kind());
        next.unread();

        match statement {
            Statement::If => self.analyse_if_statement(func),
            Statement::While => self.analyse_while_statement(func).map(|_| false),
            Statement::Return => self.analyse_return_statement(func).map(|_| true),
            Statement::Block => self.analyse_block_statement(func),
            Statement::Let => self.analyse_decl_variable_statement(func).map(|_| false),
            Statement::Const => self.analyse_decl_const_statement(func).map(|_| false),
            Statement::Empty => self.analyse_empty_statement().map(|_| false),
            Statement::Expr => self.analyse_expr_statement().map(|_| false),
        }
    }

    // expr_stmt -> expr ';'
    fn analyse_expr_statement(&mut self) -> AnalyseResult<()> {
        self.analyse_expression()?;
        self.expect(TokenKind::Semicolon, ErrorKind::NeedSemicolon)?;
        Ok(())
    }

    // let_decl_stmt -> 'let' IDENT ':' ty ('=' expr)? ';'
    pub(crate) fn analyse_decl_variable_statement(
        &mut self,
        func: &FunctionContext,
    ) -> AnalyseResult<String> {
        self.analyse_declaration(func, false)
    }

    // const_decl_stmt -> 'const' IDENT ':' ty '=' expr ';'
    pub(crate) fn analyse_decl_const_statement(
        &mut self,
        func: &FunctionContext,
    ) -> AnalyseResult<String> {
        self.analyse_declaration(func, true)
    }

    /// Shared body of `let` and `const`. Returns the declared name.
    fn analyse_declaration(&mut self, func: &FunctionContext, is_const: bool) -> AnalyseResult<String> {
        let keyword = if is_const { TokenKind::Const } else { TokenKind::Let };
        self.expect(keyword, ErrorKind::Recognized)?;

        let ident = self.expect(TokenKind::Identifier, ErrorKind::NeedIdentifier)?;
        if self.symbols.is_declared_in_current_scope(&ident.text) {
            return Err(CompilationError::new(
                ident.position,
                ErrorKind::DuplicateDeclaration,
            ));
        }

        self.expect(TokenKind::Colon, ErrorKind::NeedColon)?;
        let ty = self.analyse_type(false)?;

        let initialized = match self.accept(TokenKind::Assign) {
            Some(_) => {
                let value = self.analyse_expression()?;
                if value.ty != ty {
                    return Err(CompilationError::new(value.position, ErrorKind::TypeMismatch));
                }
                true
            }
            None if is_const => return Err(self.error_at_next(ErrorKind::ConstantNeedValue)),
            None => false,
        };
        self.expect(TokenKind::Semicolon, ErrorKind::NeedSemicolon)?;

        self.symbols.declare(Declaration::variable(
            ident.text.clone(),
            ident.position,
            VariableDecl {
                ty,
                is_const,
                initialized,
            },
        ))?;
        debug!(
            "declared {} `{}`: {} in `{}`",
            if is_const { "constant" } else { "variable" },
            ident.text,
            ty,
            func.name
        );
        Ok(ident.text)
    }

    // if_stmt -> 'if' expr block_stmt ('else' (block_stmt | if_stmt))?
    fn analyse_if_statement(&mut self, func: &FunctionContext) -> AnalyseResult<bool> {
        self.expect(TokenKind::If, ErrorKind::Recognized)?;
        self.analyse_condition()?;
        let then_returns = self.analyse_block_statement(func)?;

        match self.cursor.next() {
            Some(next) if next.kind() == TokenKind::Else => {
                next.commit();
            }
            Some(next) => {
                next.unread();
                return Ok(false);
            }
            None => return Ok(false),
        }

        let else_returns = if self.cursor.peek_kind() == Some(TokenKind::If) {
            self.analyse_if_statement(func)?
        } else {
            self.analyse_block_statement(func)?
        };
        Ok(then_returns && else_returns)
    }

    // while_stmt -> 'while' expr block_stmt
    fn analyse_while_statement(&mut self, func: &FunctionContext) -> AnalyseResult<()> {
        self.expect(TokenKind::While, ErrorKind::Recognized)?;
        self.analyse_condition()?;
        self.analyse_block_statement(func)?;
        Ok(())
    }

    /// Condition of `if`/`while`: a comparison or an int
    fn analyse_condition(&mut self) -> AnalyseResult<()> {
        let condition = self.analyse_expression()?;
        if !condition.ty.is_condition() {
            return Err(CompilationError::new(condition.position, ErrorKind::TypeMismatch));
        }
        Ok(())
    }

    // return_stmt -> 'return' expr? ';'
    fn analyse_return_statement(&mut self, func: &FunctionContext) -> AnalyseResult<()> {
        let keyword = self.expect(TokenKind::Return, ErrorKind::NeedReturn)?;

        if self.accept(TokenKind::Semicolon).is_some() {
            if func.return_type != Type::Void {
                return Err(CompilationError::new(keyword.position, ErrorKind::TypeMismatch));
            }
            return Ok(());
        }

        let value = self.analyse_expression()?;
        if func.return_type == Type::Void || value.ty != func.return_type {
            return Err(CompilationError::new(value.position, ErrorKind::TypeMismatch));
        }
        self.expect(TokenKind::Semicolon, ErrorKind::NeedSemicolon)?;
        Ok(())
    }

    // block_stmt -> '{' stmt* '}'
    pub(crate) fn analyse_block_statement(&mut self, func: &FunctionContext) -> AnalyseResult<bool> {
        self.expect(TokenKind::LeftBrace, ErrorKind::NeedBrace)?;
        self.in_scope(ScopeKind::Block, |this, _| {
            this.analyse_block_items(func).map(|(returns, _)| returns)
        })
    }

    /// stmt* '}' after an opening brace, in the current scope. Returns
    /// whether some statement always returns, and where the closing brace is.
    pub(crate) fn analyse_block_items(
        &mut self,
        func: &FunctionContext,
    ) -> AnalyseResult<(bool, Position)> {
        let mut returns = false;
        loop {
            match self.cursor.next() {
                Some(next) if next.kind() == TokenKind::RightBrace => {
                    let closing = next.commit();
                    return Ok((returns, closing.position));
                }
                Some(next) => next.unread(),
                None => return Err(self.error(ErrorKind::Recognized)),
            }
            returns |= self.analyse_statement(func)?;
        }
    }

    // empty_stmt -> ';'
    fn analyse_empty_statement(&mut self) -> AnalyseResult<()> {
        self.expect(TokenKind::Semicolon, ErrorKind::NeedSemicolon)?;
        Ok(())
    }
}
