use std::rc::Rc;

use rpds::HashTrieMap;

use crate::ast::{Identifier, Term};

/// Names recorded by `name = term` statements.
///
/// Entries are never changed in place: binding a name again replaces the
/// entry and later lookups see the newest term. Stored terms are only ever
/// handed out by reference and copied by substitution.
#[derive(Default, Clone, Debug)]
pub struct Bindings {
    terms: HashTrieMap<Identifier, Rc<Term>>,
}

impl Bindings {
    pub fn bind(&mut self, name: Identifier, term: Term) {
        self.terms = self.terms.insert(name, term.into());
    }

    pub fn lookup(&self, name: &Identifier) -> Option<&Term> {
        self.terms.get(name).map(Rc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.terms.size()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn clear(&mut self) {
        self.terms = HashTrieMap::new();
    }
}
