use std::fmt;

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Minus, Plus, Slash, Star,
    BangEqual, EqualEqual,

    Identifier,

    Return, Super, This,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub ttype: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(ttype: TokenType, lexeme: &str, span: Span) -> Self {
        Self {
            ttype,
            lexeme: lexeme.to_string(),
            span,
        }
    }
    pub fn identifier(name: &str, span: Span) -> Self {
        Self::new(TokenType::Identifier, name, span)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ttype, self.lexeme)
    }
}
