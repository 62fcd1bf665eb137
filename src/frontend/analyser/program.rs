//! Top level: the program and function declarations

use log::debug;

use super::{AnalyseResult, Analyser, FunctionContext};
use crate::frontend::program::{FunctionItem, Param, ENTRY_NAME};
use crate::frontend::symbols::{Declaration, FunctionDecl, ScopeKind, VariableDecl};
use crate::frontend::token::TokenKind;
use crate::types::Type;
use crate::utils::{CompilationError, ErrorKind};

impl Analyser {
    /// program -> (decl_stmt | function)*
    pub(crate) fn analyse_program(&mut self) -> AnalyseResult<()> {
        let start = FunctionContext::entry();

        while let Some(next) = self.cursor.next() {
            match next.kind() {
                TokenKind::Fn => {
                    next.unread();
                    self.analyse_function()?;
                }
                TokenKind::Let => {
                    next.unread();
                    let name = self.analyse_decl_variable_statement(&start)?;
                    self.initializers.push(name);
                }
                TokenKind::Const => {
                    next.unread();
                    let name = self.analyse_decl_const_statement(&start)?;
                    self.initializers.push(name);
                }
                _ => {
                    let position = next.position();
                    next.unread();
                    return Err(CompilationError::new(position, ErrorKind::Recognized));
                }
            }
        }

        debug!(
            "program analysed: {} functions, {} top-level declarations",
            self.functions.len(),
            self.initializers.len()
        );
        Ok(())
    }

    /// function -> 'fn' IDENT '(' function_param_list? ')' '->' ty block_stmt
    fn analyse_function(&mut self) -> AnalyseResult<()> {
        self.expect(TokenKind::Fn, ErrorKind::Recognized)?;
        let name = self.expect(TokenKind::Identifier, ErrorKind::NeedIdentifier)?;
        // The entry point owns this name
        if name.text == ENTRY_NAME {
            return Err(CompilationError::new(
                name.position,
                ErrorKind::DuplicateDeclaration,
            ));
        }

        self.expect(TokenKind::LeftParen, ErrorKind::NeedParenthesis)?;
        let params = self.analyse_param_list()?;
        self.expect(TokenKind::Arrow, ErrorKind::NeedArrow)?;
        let return_type = self.analyse_type(true)?;

        // Declared before the body so it can call itself
        let body_scope = self.symbols.next_scope_id();
        self.symbols.declare(Declaration::function(
            name.text.clone(),
            name.position,
            FunctionDecl {
                param_types: params.iter().map(|p| p.ty).collect(),
                return_type,
                body_scope: Some(body_scope),
                builtin: false,
            },
        ))?;
        debug!("analysing function `{}` -> {}", name.text, return_type);

        let context = FunctionContext {
            name: name.text.clone(),
            return_type,
        };
        self.in_scope(ScopeKind::Function, |this, id| {
            debug_assert_eq!(id, body_scope);
            for param in &params {
                this.symbols.declare(Declaration::variable(
                    param.name.clone(),
                    param.position,
                    VariableDecl {
                        ty: param.ty,
                        is_const: param.is_const,
                        initialized: true,
                    },
                ))?;
            }

            // The body's outermost block shares the parameters' scope
            this.expect(TokenKind::LeftBrace, ErrorKind::NeedBrace)?;
            let (returns, closing) = this.analyse_block_items(&context)?;
            if return_type != Type::Void && !returns {
                return Err(CompilationError::new(closing, ErrorKind::NeedReturn));
            }
            Ok(())
        })?;

        self.functions.push(FunctionItem {
            name: name.text,
            position: name.position,
            params,
            return_type,
            body_scope,
        });
        Ok(())
    }

    /// function_param_list -> function_param (',' function_param)* ')'
    /// function_param -> 'const'? IDENT ':' ty
    fn analyse_param_list(&mut self) -> AnalyseResult<Vec<Param>> {
        let mut params = Vec::new();
        if self.accept(TokenKind::RightParen).is_some() {
            return Ok(params);
        }

        loop {
            let is_const = self.accept(TokenKind::Const).is_some();
            let name = self.expect(TokenKind::Identifier, ErrorKind::NeedIdentifier)?;
            self.expect(TokenKind::Colon, ErrorKind::NeedColon)?;
            let ty = self.analyse_type(false)?;
            params.push(Param {
                name: name.text,
                ty,
                is_const,
                position: name.position,
            });

            match self.cursor.next() {
                Some(next) if next.kind() == TokenKind::Comma => {
                    next.commit();
                }
                Some(next) if next.kind() == TokenKind::RightParen => {
                    next.commit();
                    return Ok(params);
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
}
