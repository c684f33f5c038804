//! First scanning stage: maps every input byte to a primitive [`Char`].
//!
//! Nothing is grouped or discarded here; that is the job of
//! [`crate::lexer`]. Every byte maps to exactly one class, so this stage
//! cannot fail.

use crate::ast::Span;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Class {
    White,
    Character,
    Equal,
    Asterisk,
    Lambda,
    Dot,
    LParen,
    RParen,
    End,
}

/// A classified byte with its position. `line` and `column` are zero based.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Char {
    pub class: Class,
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

const TAB_WIDTH: usize = 4;

pub fn classify(source: &[u8]) -> Vec<Char> {
    let mut chars = Vec::with_capacity(source.len() + 1);
    let (mut line, mut column) = (0, 0);
    for (offset, &byte) in source.iter().enumerate() {
        let class = match byte {
            b'/' | b'\\' => Class::Lambda,
            b'=' => Class::Equal,
            b'*' => Class::Asterisk,
            b'.' => Class::Dot,
            b'(' => Class::LParen,
            b')' => Class::RParen,
            b' ' | b'\t' | b'\n' | b'\r' => Class::White,
            _ => Class::Character,
        };
        chars.push(Char {
            class,
            span: offset..offset + 1,
            line,
            column,
        });
        match byte {
            b'\t' => column += TAB_WIDTH,
            b'\n' => {
                line += 1;
                column = 0;
            }
            b'\r' => column = 0,
            _ => column += 1,
        }
    }
    chars.push(Char {
        class: Class::End,
        span: source.len()..source.len(),
        line,
        column: column + 1,
    });
    chars
}
