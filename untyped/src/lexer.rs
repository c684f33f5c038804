use thiserror::Error;

use crate::{
    ast::Span,
    classify::{Char, Class},
};

#[derive(PartialEq, Eq, Clone, Copy, derive_more::Display, Debug)]
pub enum TokenKind {
    #[display(fmt = "variable")]
    Variable,
    #[display(fmt = "\\")]
    Lambda,
    #[display(fmt = "=")]
    Equal,
    #[display(fmt = ".")]
    Dot,
    #[display(fmt = "(")]
    LParen,
    #[display(fmt = ")")]
    RParen,
    #[display(fmt = "end of input")]
    End,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

impl Token {
    fn new(kind: TokenKind, first: &Char, end: usize) -> Self {
        Self {
            kind,
            span: first.span.start..end,
            line: first.line,
            column: first.column,
        }
    }

    pub fn text<'a>(&self, source: &'a [u8]) -> &'a [u8] {
        &source[self.span.clone()]
    }
}

#[derive(PartialEq, Eq, Clone, Debug, Error)]
pub enum LexicalError {
    /// A `(*` comment reached the end of input. `span` covers the opener.
    #[error("detected unexpected eof.")]
    UnexpectedEof { span: Span },
}

impl LexicalError {
    pub fn span(&self) -> Span {
        match self {
            LexicalError::UnexpectedEof { span } => span.clone(),
        }
    }
}

/// Groups classified bytes into tokens, dropping whitespace and `(* ... *)`
/// comments. `chars` comes from [`classify`](crate::classify::classify), so it
/// ends with a [`Class::End`] and the result ends with exactly one
/// [`TokenKind::End`].
pub fn tokenize(chars: &[Char]) -> Result<Vec<Token>, LexicalError> {
    let class_at = |i: usize| chars.get(i).map_or(Class::End, |c| c.class);
    let mut tokens = Vec::new();
    let mut i = 0;
    while let Some(c) = chars.get(i) {
        let kind = match c.class {
            Class::White | Class::Asterisk => {
                i += 1;
                continue;
            }
            Class::LParen if class_at(i + 1) == Class::Asterisk => {
                let open = c.span.start..c.span.start + 2;
                i += 2;
                loop {
                    match class_at(i) {
                        Class::End => return Err(LexicalError::UnexpectedEof { span: open }),
                        Class::Asterisk if class_at(i + 1) == Class::RParen => break,
                        _ => i += 1,
                    }
                }
                i += 2;
                continue;
            }
            Class::Character => {
                let first = c;
                while class_at(i) == Class::Character {
                    i += 1;
                }
                let end = chars.get(i).map_or(first.span.end, |c| c.span.start);
                tokens.push(Token::new(TokenKind::Variable, first, end));
                continue;
            }
            Class::Lambda => TokenKind::Lambda,
            Class::Equal => TokenKind::Equal,
            Class::Dot => TokenKind::Dot,
            Class::LParen => TokenKind::LParen,
            Class::RParen => TokenKind::RParen,
            Class::End => TokenKind::End,
        };
        tokens.push(Token::new(kind, c, c.span.end));
        if kind == TokenKind::End {
            break;
        }
        i += 1;
    }
    Ok(tokens)
}
