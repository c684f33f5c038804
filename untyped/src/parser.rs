//! Recursive-descent parser.
//!
//! ```text
//! program    := (line ('.' | EOF))*
//! line       := VARIABLE '=' expr | expr
//! expr       := atom+
//! atom       := '\' VARIABLE* '.' expr | VARIABLE | '(' expr ')'
//! ```
//!
//! Juxtaposed atoms form one flat [`Term::Seq`]. A lambda body runs until the
//! next `.`, `)` or end of input, so `\x. f x. y` is two lines.

use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{Identifier, Span, Statement, Term},
    bindings::Bindings,
    classify::classify,
    lexer::{tokenize, LexicalError, Token, TokenKind},
    subst,
};

#[derive(PartialEq, Eq, Clone, Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    UnexpectedEof(#[from] LexicalError),
    /// `line` is zero based; the message shows it one based.
    #[error("parsing error: {}", .line + 1)]
    Parsing {
        line: usize,
        span: Span,
        found: TokenKind,
    },
    #[error("parsing failed.")]
    Failed { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedEof(e) => e.span(),
            ParseError::Parsing { span, .. } | ParseError::Failed { span } => span.clone(),
        }
    }
}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

pub struct Parser<'a> {
    source: &'a [u8],
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a [u8], tokens: &'a [Token]) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    fn peek(&self) -> TokenKind {
        self.tokens.get(self.pos).map_or(TokenKind::End, |t| t.kind)
    }

    fn peek_nth(&self, n: usize) -> TokenKind {
        self.tokens.get(self.pos + n).map_or(TokenKind::End, |t| t.kind)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let tokens = self.tokens;
        let token = tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn ident(&self, token: &Token) -> Identifier {
        Rc::new(String::from_utf8_lossy(token.text(self.source)).into_owned())
    }

    fn unexpected(&self) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(token) => ParseError::Parsing {
                line: token.line,
                span: token.span.clone(),
                found: token.kind,
            },
            None => ParseError::Parsing {
                line: self.tokens.last().map_or(0, |t| t.line),
                span: self.source.len()..self.source.len(),
                found: TokenKind::End,
            },
        }
    }

    fn expr(&mut self) -> Result<Term> {
        let mut atoms = Vec::new();
        loop {
            match self.peek() {
                TokenKind::Dot | TokenKind::RParen | TokenKind::End => break,
                TokenKind::Equal => return Err(self.unexpected()),
                TokenKind::Variable | TokenKind::Lambda | TokenKind::LParen => {
                    atoms.push(self.atom()?)
                }
            }
        }
        if atoms.is_empty() {
            return Err(self.unexpected());
        }
        Ok(Term::from_body(atoms))
    }

    fn atom(&mut self) -> Result<Term> {
        let token = self.bump().ok_or_else(|| self.unexpected())?;
        match token.kind {
            TokenKind::Variable => Ok(Term::Var(self.ident(token))),
            TokenKind::Lambda => {
                let mut params = Vec::new();
                while self.peek() == TokenKind::Variable {
                    if let Some(param) = self.bump() {
                        params.push(self.ident(param));
                    }
                }
                if self.peek() != TokenKind::Dot {
                    return Err(self.unexpected());
                }
                self.pos += 1;
                let body = self.expr()?;
                Ok(Term::Lambda {
                    params,
                    body: body.into_body(),
                })
            }
            TokenKind::LParen => {
                // Reported at the opening parenthesis.
                let unclosed = |parser: &Self| {
                    let end = parser
                        .tokens
                        .get(parser.pos)
                        .map_or(token.span.end, |t| t.span.end);
                    ParseError::Parsing {
                        line: token.line,
                        span: token.span.start..end,
                        found: parser.peek(),
                    }
                };
                let inner = match self.expr() {
                    Ok(inner) => inner,
                    Err(ParseError::Parsing { .. }) if self.peek() == TokenKind::End => {
                        return Err(unclosed(self))
                    }
                    Err(e) => return Err(e),
                };
                if self.peek() != TokenKind::RParen {
                    return Err(unclosed(self));
                }
                self.pos += 1;
                Ok(inner)
            }
            _ => {
                self.pos -= 1;
                Err(self.unexpected())
            }
        }
    }

    /// Parses one statement without its terminator. A successful
    /// `name = term` records the resolved term in `bindings`. When nothing
    /// after the `=` can start a term, the line is reparsed as a plain
    /// expression; any later error is returned as is.
    pub fn parse_line(&mut self, bindings: &mut Bindings) -> Result<Statement> {
        let start = self.pos;
        if self.peek() == TokenKind::Variable && self.peek_nth(1) == TokenKind::Equal {
            if let Some(name) = self.bump().map(|t| self.ident(t)) {
                self.pos += 1;
                let rhs = self.pos;
                match self.expr() {
                    Ok(term) => {
                        let resolved = subst::resolve(&term, bindings);
                        debug!(name = %name, term = %resolved, "bound");
                        bindings.bind(name.clone(), resolved);
                        return Ok(Statement::Bind { name, term });
                    }
                    Err(_) if self.pos == rhs => self.pos = start,
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(Statement::Eval(self.expr()?))
    }

    /// Parses statements separated by `.` until the end of input.
    pub fn parse_all(&mut self, bindings: &mut Bindings) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        while self.peek() != TokenKind::End {
            statements.push(self.parse_line(bindings)?);
            match self.peek() {
                TokenKind::Dot => self.pos += 1,
                TokenKind::End => break,
                _ => {
                    let span = self.tokens.get(self.pos).map_or(0..0, |t| t.span.clone());
                    return Err(ParseError::Failed { span });
                }
            }
        }
        Ok(statements)
    }
}

/// Scans and parses a whole program, recording its bindings.
pub fn parse_program(source: &[u8], bindings: &mut Bindings) -> Result<Vec<Statement>> {
    let tokens = tokenize(&classify(source))?;
    Parser::new(source, &tokens).parse_all(bindings)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ast::build::*;

    fn parse(s: &str) -> Result<Vec<Statement>> {
        parse_program(s.as_bytes(), &mut Bindings::default())
    }

    fn parse_term(s: &str) -> Term {
        match parse(s).unwrap().as_slice() {
            [Statement::Eval(term)] => term.clone(),
            other => panic!("expected one expression, got {other:?}"),
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse_term("x"), v("x"));
        assert_eq!(parse_term("f x y."), seq([v("f"), v("x"), v("y")]));
        assert_eq!(
            parse_term(r"\x y. x."),
            lam(["x", "y"], v("x"))
        );
        assert_eq!(
            parse_term(r"(\x. x) y"),
            seq([lam(["x"], v("x")), v("y")])
        );
        assert_eq!(
            parse_term(r"/x. /y. x y."),
            lam(["x"], lam(["y"], seq([v("x"), v("y")])))
        );
        assert_eq!(
            parse_term(r"a \x. x b"),
            seq([v("a"), lam(["x"], seq([v("x"), v("b")]))])
        );
        assert_eq!(
            parse_term("(a b) c"),
            seq([seq([v("a"), v("b")]), v("c")])
        );
        assert_eq!(parse_term("((a))"), v("a"));
        assert_eq!(parse_term(r"\. a"), lam::<0>([], v("a")));
    }

    #[test]
    fn test_lambda_body_is_flat() {
        match parse_term(r"\x. (a b)") {
            Term::Lambda { body, .. } => assert_eq!(body, vec![v("a"), v("b")]),
            other => panic!("not a lambda: {other:?}"),
        }
    }

    #[test]
    fn test_multiple_lines() {
        assert_eq!(
            parse("a.\nb c.\n(* done *)\n").unwrap(),
            vec![
                Statement::Eval(v("a")),
                Statement::Eval(seq([v("b"), v("c")])),
            ]
        );
        assert_eq!(parse(r"\x. f x. y").unwrap().len(), 2);
        assert_eq!(parse("").unwrap(), vec![]);
        assert_eq!(parse("  (* nothing *) ").unwrap(), vec![]);
    }

    #[test]
    fn test_binding() {
        let mut bindings = Bindings::default();
        let statements = parse_program(br"id = \x. x. id z.", &mut bindings).unwrap();
        let id = Identifier::new("id".into());
        assert_eq!(
            statements,
            vec![
                Statement::Bind {
                    name: id.clone(),
                    term: lam(["x"], v("x")),
                },
                Statement::Eval(seq([v("id"), v("z")])),
            ]
        );
        assert_eq!(bindings.lookup(&id), Some(&lam(["x"], v("x"))));
    }

    #[test]
    fn test_binding_is_resolved() {
        let mut bindings = Bindings::default();
        parse_program(b"a = x. b = a a. a = y.", &mut bindings).unwrap();
        assert_eq!(
            bindings.lookup(&Identifier::new("b".into())),
            Some(&seq([v("x"), v("x")]))
        );
        assert_eq!(bindings.lookup(&Identifier::new("a".into())), Some(&v("y")));
    }

    #[test]
    fn test_round_trip() {
        for source in [
            r"(\x. x) y",
            r"\x y. x (y z)",
            r"\x. (\y. x) x",
            r"(a b) (\f. f f) c",
            r"\f. (\x. f (x x)) (\x. f (x x))",
        ] {
            let term = parse_term(source);
            assert_eq!(term.to_string(), source);
            assert_eq!(parse_term(&term.to_string()), term);
        }
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse("(a b"),
            Err(ParseError::Parsing { line: 0, .. })
        ));
        assert!(matches!(
            parse("a.\n(b\nc"),
            Err(ParseError::Parsing { line: 1, .. })
        ));
        assert!(matches!(
            parse("("),
            Err(ParseError::Parsing { line: 0, .. })
        ));
        assert!(matches!(
            parse("a (* b"),
            Err(ParseError::UnexpectedEof(_))
        ));
        assert!(matches!(parse("a ) b"), Err(ParseError::Failed { .. })));
        assert!(matches!(
            parse("x = ."),
            Err(ParseError::Parsing {
                found: TokenKind::Equal,
                ..
            })
        ));
        assert!(matches!(parse("a b = c"), Err(ParseError::Parsing { .. })));
        assert!(matches!(parse("a.."), Err(ParseError::Parsing { .. })));
        assert!(matches!(parse(r"\x y"), Err(ParseError::Parsing { .. })));
        assert!(matches!(parse(r"\x."), Err(ParseError::Parsing { .. })));
    }

    #[test]
    fn test_binding_errors_keep_their_position() {
        let mut bindings = Bindings::default();
        assert!(matches!(
            parse_program(b"x =\n(a", &mut bindings),
            Err(ParseError::Parsing {
                line: 1,
                span,
                found: TokenKind::End,
            }) if span.start == 4
        ));
        assert!(bindings.is_empty());
        assert_eq!(
            parse("x = \n\n(a b").unwrap_err().to_string(),
            "parsing error: 3"
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(parse("\n\n(a").unwrap_err().to_string(), "parsing error: 3");
        assert_eq!(parse("a ) b").unwrap_err().to_string(), "parsing failed.");
        assert_eq!(
            parse("(* a").unwrap_err().to_string(),
            "detected unexpected eof."
        );
    }
}
