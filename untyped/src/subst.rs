//! Name-based substitution.
//!
//! Parameters shadow the local map only; bound names are never renamed, so a
//! free variable of an inserted term can be captured by an enclosing lambda
//! with the same parameter name. Global bindings are not shadowed at all.

use rpds::HashTrieMap;

use crate::{
    ast::{Identifier, Term},
    bindings::Bindings,
};

/// Parameter name to the argument being substituted for it. Borrows from the
/// argument list of the application being contracted.
pub type Locals<'a> = HashTrieMap<Identifier, &'a Term>;

/// Pairs parameters with arguments. A repeated parameter name is bound to
/// its last argument.
pub fn locals<'a>(
    params: &[Identifier],
    args: impl IntoIterator<Item = &'a Term>,
) -> Locals<'a> {
    params
        .iter()
        .zip(args)
        .fold(Locals::new(), |map, (param, arg)| map.insert(param.clone(), arg))
}

/// Returns a substituted copy of `term` and whether any variable was
/// replaced. `term` itself is never modified.
pub fn replace(term: &Term, locals: &Locals<'_>, globals: &Bindings) -> (Term, bool) {
    let mut modified = false;
    let term = replace_rec(term, locals, globals, &mut modified);
    (term, modified)
}

/// Resolves the free references of a top-level term against `globals`.
pub fn resolve(term: &Term, globals: &Bindings) -> Term {
    replace(term, &Locals::new(), globals).0
}

fn replace_rec(term: &Term, locals: &Locals<'_>, globals: &Bindings, modified: &mut bool) -> Term {
    match term {
        Term::Var(name) => {
            if let Some(value) = locals.get(name) {
                *modified = true;
                (*value).clone()
            } else if let Some(value) = globals.lookup(name) {
                *modified = true;
                value.clone()
            } else {
                term.clone()
            }
        }
        Term::Seq(elems) => Term::Seq(
            elems
                .iter()
                .map(|elem| replace_rec(elem, locals, globals, modified))
                .collect(),
        ),
        Term::Lambda { params, body } => {
            let shadowed = params
                .iter()
                .fold(locals.clone(), |map, param| map.remove(param));
            let body = body
                .iter()
                .map(|elem| replace_rec(elem, &shadowed, globals, modified))
                .collect();
            Term::Lambda {
                params: params.clone(),
                body: Term::from_body(body).into_body(),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ast::build::*;

    fn ident(name: &str) -> Identifier {
        Identifier::new(name.into())
    }

    #[test]
    fn test_replace_variable() {
        let value = lam(["z"], v("z"));
        let locals = Locals::new().insert(ident("x"), &value);
        let globals = Bindings::default();

        assert_eq!(replace(&v("x"), &locals, &globals), (value.clone(), true));
        assert_eq!(replace(&v("y"), &locals, &globals), (v("y"), false));
        assert_eq!(
            replace(&seq([v("y"), v("x"), v("x")]), &locals, &globals),
            (seq([v("y"), value.clone(), value.clone()]), true)
        );
    }

    #[test]
    fn test_locals_before_globals() {
        let local = v("local");
        let locals = Locals::new().insert(ident("x"), &local);
        let mut globals = Bindings::default();
        globals.bind(ident("x"), v("global"));
        globals.bind(ident("y"), v("other"));

        assert_eq!(replace(&v("x"), &locals, &globals).0, v("local"));
        assert_eq!(replace(&v("y"), &locals, &globals).0, v("other"));
        assert_eq!(resolve(&v("x"), &globals), v("global"));
    }

    #[test]
    fn test_shadowing() {
        let value = v("V");
        let locals = Locals::new().insert(ident("x"), &value);
        let globals = Bindings::default();

        let term = lam(["x"], seq([v("x"), v("y")]));
        assert_eq!(replace(&term, &locals, &globals), (term.clone(), false));

        let term = seq([v("x"), lam(["y"], seq([v("x"), v("y")]))]);
        assert_eq!(
            replace(&term, &locals, &globals).0,
            seq([v("V"), lam(["y"], seq([v("V"), v("y")]))])
        );
    }

    #[test]
    fn test_globals_not_shadowed() {
        let mut globals = Bindings::default();
        globals.bind(ident("x"), v("foo"));
        assert_eq!(
            resolve(&lam(["x"], v("x")), &globals),
            lam(["x"], v("foo"))
        );
    }

    #[test]
    fn test_capture_is_not_avoided() {
        let value = v("y");
        let locals = Locals::new().insert(ident("x"), &value);
        assert_eq!(
            replace(&lam(["y"], v("x")), &locals, &Bindings::default()).0,
            lam(["y"], v("y"))
        );
    }

    #[test]
    fn test_purity() {
        let value = seq([v("a"), v("b")]);
        let locals = Locals::new().insert(ident("x"), &value);
        let globals = Bindings::default();
        let term = seq([v("x"), lam(["q"], v("x"))]);
        let before = term.clone();

        let first = replace(&term, &locals, &globals);
        let second = replace(&term, &locals, &globals);
        assert_eq!(term, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_repeated_parameter() {
        let (a, b) = (v("a"), v("b"));
        let params = [ident("x"), ident("x")];
        let locals = locals(&params, [&a, &b]);
        assert_eq!(locals.get(&ident("x")), Some(&&b));
        assert_eq!(locals.size(), 1);
    }
}
