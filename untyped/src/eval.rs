use std::ops::ControlFlow;

use tracing::trace;

use crate::{ast::Term, bindings::Bindings, subst};

/// Returned through every level of reduction when step mode stops after a
/// single rewrite. The term is left consistent; reducing it again from the
/// root resumes where it stopped.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Paused;

/// `Continue(modified)` once no further pause was requested, where `modified`
/// tells whether any variable was substituted.
pub type Flow = ControlFlow<Paused, bool>;

/// Reduces `term` in place, leftmost outermost, with curried partial
/// application.
///
/// Without `step` this runs until a normal form is reached (and never returns
/// for terms without one). With `step` it breaks with [`Paused`] right after
/// the first contraction that substitutes a variable. Contractions that
/// substitute nothing, such as `(\x. y) a`, are carried out without a pause.
pub fn reduce(term: &mut Term, globals: &Bindings, step: bool) -> Flow {
    Reducer { globals, step }.term(term)
}

/// Reduces `term` to normal form.
pub fn normalize(term: &mut Term, globals: &Bindings) -> bool {
    match reduce(term, globals, false) {
        ControlFlow::Continue(modified) => modified,
        ControlFlow::Break(Paused) => true,
    }
}

struct Reducer<'a> {
    globals: &'a Bindings,
    step: bool,
}

enum Contraction {
    /// Lambda consumed `arity` arguments and became `result`.
    Saturated {
        arity: usize,
        result: Term,
        substituted: bool,
    },
    /// Lambda ran out of arguments; the whole sequence became `result`.
    Partial { result: Term, substituted: bool },
}

impl<'a> Reducer<'a> {
    fn term(&self, term: &mut Term) -> Flow {
        match term {
            Term::Var(_) => ControlFlow::Continue(false),
            Term::Lambda { body, .. } => self.body(body),
            Term::Seq(_) => self.sequence(term),
        }
    }

    fn body(&self, body: &mut Vec<Term>) -> Flow {
        let mut seq = Term::Seq(std::mem::take(body));
        let flow = self.term(&mut seq);
        *body = seq.into_body();
        flow
    }

    /// Beta contraction of a sequence whose head is a lambda.
    fn contract(&self, elems: &[Term]) -> Option<Contraction> {
        let (Term::Lambda { params, body }, args) = elems.split_first()? else {
            return None;
        };
        if params.len() <= args.len() {
            let locals = subst::locals(params, args);
            let mut substituted = false;
            let body = body
                .iter()
                .map(|elem| {
                    let (elem, replaced) = subst::replace(elem, &locals, self.globals);
                    substituted |= replaced;
                    elem
                })
                .collect();
            Some(Contraction::Saturated {
                arity: params.len(),
                result: Term::from_body(body),
                substituted,
            })
        } else {
            let (given, rest) = params.split_at(args.len());
            let locals = subst::locals(given, args);
            let curried = Term::Lambda {
                params: rest.to_vec(),
                body: body.clone(),
            };
            let (result, substituted) = subst::replace(&curried, &locals, self.globals);
            Some(Contraction::Partial {
                result,
                substituted,
            })
        }
    }

    fn sequence(&self, term: &mut Term) -> Flow {
        let mut modified = false;
        loop {
            if term.unwrap_singleton() {
                let inner = self.term(term)?;
                return ControlFlow::Continue(inner || modified);
            }
            let Term::Seq(elems) = term else {
                break;
            };
            match elems.first() {
                Some(Term::Lambda { .. }) => {
                    let (partial, substituted) = match self.contract(elems) {
                        Some(Contraction::Saturated {
                            arity,
                            result,
                            substituted,
                        }) => {
                            elems.drain(..=arity);
                            elems.insert(0, result);
                            (false, substituted)
                        }
                        Some(Contraction::Partial {
                            result,
                            substituted,
                        }) => {
                            *term = result;
                            (true, substituted)
                        }
                        None => break,
                    };
                    modified |= substituted;
                    trace!(term = %term, substituted, "contracted");
                    if self.step && substituted {
                        term.unwrap_singleton();
                        return ControlFlow::Break(Paused);
                    }
                    if partial {
                        break;
                    }
                }
                Some(Term::Seq(_)) => {
                    modified |= self.term(&mut elems[0])?;
                    if !matches!(elems[0], Term::Lambda { .. }) {
                        break;
                    }
                }
                Some(Term::Var(_)) | None => break,
            }
        }
        match term {
            Term::Seq(elems) => {
                for elem in elems.iter_mut() {
                    modified |= self.term(elem)?;
                }
            }
            Term::Lambda { body, .. } => modified |= self.body(body)?,
            Term::Var(_) => {}
        }
        ControlFlow::Continue(modified)
    }
}
