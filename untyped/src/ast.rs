use std::rc::Rc;

pub type Identifier = Rc<String>;
pub type Span = std::ops::Range<usize>;

/// A lambda term. Each node is owned by exactly one parent; sharing only
/// happens through deep copies made by substitution.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Term {
    /// `x`
    Var(Identifier),
    /// `t t ...`: the head applied to every following element.
    Seq(Vec<Term>),
    /// `\x y. t ...`: the body is always kept as a sequence.
    Lambda {
        params: Vec<Identifier>,
        body: Vec<Term>,
    },
}

impl Term {
    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(Rc::new(name.into()))
    }

    pub fn lambda<S: Into<String>>(params: impl IntoIterator<Item = S>, body: Term) -> Self {
        Term::Lambda {
            params: params.into_iter().map(|p| Rc::new(p.into())).collect(),
            body: body.into_body(),
        }
    }

    /// Builds a term from sequence elements, collapsing a singleton.
    pub fn from_body(mut body: Vec<Term>) -> Self {
        if body.len() == 1 {
            if let Some(only) = body.pop() {
                return only;
            }
        }
        Term::Seq(body)
    }

    /// The elements this term contributes when used as a lambda body.
    pub fn into_body(self) -> Vec<Term> {
        match self {
            Term::Seq(elems) => elems,
            term => vec![term],
        }
    }

    /// Replaces a one-element sequence by its element. Returns whether it did.
    pub fn unwrap_singleton(&mut self) -> bool {
        if let Term::Seq(elems) = self {
            if elems.len() == 1 {
                if let Some(only) = elems.pop() {
                    *self = only;
                    return true;
                }
            }
        }
        false
    }
}

fn fmt_seq(elems: &[Term], f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for (i, elem) in elems.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        match elem {
            Term::Var(_) => f.write_fmt(format_args!("{elem}"))?,
            Term::Seq(_) | Term::Lambda { .. } => f.write_fmt(format_args!("({elem})"))?,
        }
    }
    Ok(())
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Var(name) => f.write_str(name),
            Term::Seq(elems) => fmt_seq(elems, f),
            Term::Lambda { params, body } => {
                f.write_str("\\")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    f.write_str(param)?;
                }
                f.write_str(". ")?;
                fmt_seq(body, f)
            }
        }
    }
}

/// One top-level formula.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Statement {
    /// `name = term`
    Bind { name: Identifier, term: Term },
    Eval(Term),
}
