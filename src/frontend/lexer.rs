//! Lexer for C0
//!
//! Converts source code into the token stream the analyser reads through
//! a [`TokenCursor`](crate::frontend::cursor::TokenCursor).

use crate::frontend::token::{Literal, Token, TokenKind};
use crate::utils::{Error, Position, Result, Span};

/// The lexer state
pub struct Lexer {
    /// Source code as characters
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    /// Line/column of `pos`
    location: Position,
    /// Line/column of `start`
    start_location: Position,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
            location: Position::start(),
            start_location: Position::start(),
        }
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    /// Get the next character without advancing
    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.location.line += 1;
            self.location.column = 1;
        } else {
            self.location.column += 1;
        }
        Some(c)
    }

    /// Check if we've reached the end of input
    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn text(&self) -> String {
        self.source[self.start..self.pos].iter().collect()
    }

    /// Create a token spanning from start to the current position
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            self.text(),
            self.start_location,
            Span::new(self.start, self.pos),
        )
    }

    /// Skip whitespace and comments
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                // Line comment
                '/' if self.peek_next() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let kind = TokenKind::keyword_from_str(&self.text()).unwrap_or(TokenKind::Identifier);
        self.make_token(kind)
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Read a number literal (integer or double)
    fn read_number(&mut self) -> Result<Token> {
        self.skip_digits();

        let mut is_double = false;
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_double = true;
            self.advance(); // consume '.'
            self.skip_digits();

            // Exponent is only allowed after a fraction
            if matches!(self.peek(), Some('e') | Some('E')) {
                self.advance();
                if matches!(self.peek(), Some('+') | Some('-')) {
                    self.advance();
                }
                if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    return Err(Error::InvalidNumber {
                        text: self.text(),
                        position: self.start_location,
                    });
                }
                self.skip_digits();
            }
        }

        let text = self.text();
        let invalid = || Error::InvalidNumber {
            text: text.clone(),
            position: self.start_location,
        };
        if is_double {
            let value: f64 = text.parse().map_err(|_| invalid())?;
            Ok(self
                .make_token(TokenKind::DoubleLiteral)
                .with_value(Literal::Double(value)))
        } else {
            let value: i64 = text.parse().map_err(|_| invalid())?;
            Ok(self
                .make_token(TokenKind::UintLiteral)
                .with_value(Literal::Int(value)))
        }
    }

    /// Read a character literal
    fn read_char(&mut self) -> Result<Token> {
        self.advance(); // consume opening quote

        let unterminated = Error::UnterminatedLiteral {
            position: self.start_location,
        };
        let c = match self.advance() {
            Some('\\') => match self.advance() {
                Some('n') => '\n',
                Some('r') => '\r',
                Some('t') => '\t',
                Some('\\') => '\\',
                Some('\'') => '\'',
                Some('"') => '"',
                Some(other) => {
                    return Err(Error::InvalidCharacter {
                        found: other,
                        position: self.start_location,
                    })
                }
                None => return Err(unterminated),
            },
            Some('\'') | Some('\n') | None => return Err(unterminated),
            Some(c) => c,
        };

        if self.peek() != Some('\'') {
            return Err(unterminated);
        }
        self.advance();

        Ok(self
            .make_token(TokenKind::CharLiteral)
            .with_value(Literal::Int(c as i64)))
    }

    /// Get the next token, or `None` at end of input
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();
        self.start = self.pos;
        self.start_location = self.location;

        let Some(c) = self.peek() else {
            return Ok(None);
        };

        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(Some(self.read_identifier()));
        }
        if c.is_ascii_digit() {
            return self.read_number().map(Some);
        }
        if c == '\'' {
            return self.read_char().map(Some);
        }

        self.advance();
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => {
                if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '*' => TokenKind::Mul,
            '/' => TokenKind::Div,
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            '!' if self.peek() == Some('=') => {
                self.advance();
                TokenKind::Neq
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            _ => {
                return Err(Error::InvalidCharacter {
                    found: c,
                    position: self.start_location,
                })
            }
        };

        Ok(Some(self.make_token(kind)))
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        debug_assert!(self.is_at_end());
        Ok(tokens)
    }
}
