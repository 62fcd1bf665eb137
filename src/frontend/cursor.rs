//! Token cursor with single-token pushback
//!
//! [`TokenCursor::next`] hands out a [`Lookahead`] that mutably borrows the
//! cursor. It must be resolved with [`Lookahead::commit`] (the token stays
//! consumed) or [`Lookahead::unread`] (the token is pushed back) before the
//! cursor can be used again, so at most one token is ever pushed back and
//! `unread` can never run without a preceding `next`.

use crate::frontend::token::{Token, TokenKind};
use crate::utils::Position;

/// Cursor over a lexed token stream
#[derive(Debug, Clone)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    /// Index of the token the next call to `next` returns
    pos: usize,
    /// Set once `next` has reported end of stream
    exhausted: bool,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            exhausted: false,
        }
    }

    /// Read the next token, or `None` at end of stream
    pub fn next(&mut self) -> Option<Lookahead<'_>> {
        if self.pos >= self.tokens.len() {
            self.exhausted = true;
            return None;
        }
        self.pos += 1;
        Some(Lookahead { cursor: self })
    }

    /// Kind of the next token without consuming it
    pub fn peek_kind(&mut self) -> Option<TokenKind> {
        let lookahead = self.next()?;
        let kind = lookahead.kind();
        lookahead.unread();
        Some(kind)
    }

    /// Position errors raised now are tagged with: the start of the most
    /// recently read token, or the end of the stream once `next` has
    /// returned `None`.
    pub fn current_position(&self) -> Position {
        if self.exhausted {
            return self.end_position();
        }
        match self.pos.checked_sub(1) {
            Some(last) => self.tokens[last].position,
            None => self.tokens.first().map(|t| t.position).unwrap_or_default(),
        }
    }

    /// Position just past the last token
    pub fn end_position(&self) -> Position {
        self.tokens
            .last()
            .map(Token::end_position)
            .unwrap_or_default()
    }

    /// Number of tokens consumed so far
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A token just read from a [`TokenCursor`], not yet committed
#[derive(Debug)]
pub struct Lookahead<'a> {
    cursor: &'a mut TokenCursor,
}

impl<'a> Lookahead<'a> {
    fn token(&self) -> &Token {
        &self.cursor.tokens[self.cursor.pos - 1]
    }

    pub fn kind(&self) -> TokenKind {
        self.token().kind
    }

    pub fn position(&self) -> Position {
        self.token().position
    }

    /// Keep the token consumed
    pub fn commit(self) -> Token {
        self.token().clone()
    }

    /// Push the token back so the next `next` returns it again
    pub fn unread(self) {
        self.cursor.pos -= 1;
    }
}
