//! Term interning.

use crate::term::Term;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

/// Interned term ID (4 bytes instead of a full owned term).
///
/// IDs are local to the pool that issued them; terms must be re-anchored by
/// value when crossing between graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TermId(u32);

impl TermId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Term interner: maps terms to compact IDs and back.
///
/// Interning takes `&self`; the pool is safe to read concurrently.
#[derive(Debug, Default)]
pub struct TermPool {
    term_to_id: DashMap<Term, TermId>,
    id_to_term: DashMap<TermId, Term>,
    next_id: AtomicU32,
}

impl TermPool {
    pub fn new() -> Self {
        Self {
            term_to_id: DashMap::new(),
            id_to_term: DashMap::new(),
            next_id: AtomicU32::new(0),
        }
    }

    /// Intern a term, returning its ID.
    pub fn intern(&self, term: &Term) -> TermId {
        if let Some(id) = self.term_to_id.get(term) {
            return *id;
        }

        let id = *self
            .term_to_id
            .entry(term.clone())
            .or_insert_with(|| TermId(self.next_id.fetch_add(1, Ordering::SeqCst)));
        self.id_to_term.entry(id).or_insert_with(|| term.clone());
        id
    }

    /// Look up an existing ID for a term without inserting.
    pub fn id_of(&self, term: &Term) -> Option<TermId> {
        self.term_to_id.get(term).map(|id| *id)
    }

    /// Look up a term by ID.
    pub fn lookup(&self, id: TermId) -> Option<Term> {
        self.id_to_term.get(&id).map(|t| t.clone())
    }

    pub fn len(&self) -> usize {
        self.id_to_term.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_term.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_stable() {
        let pool = TermPool::new();
        let a = pool.intern(&Term::iri("http://example.org/a"));
        let b = pool.intern(&Term::iri("http://example.org/b"));
        let a2 = pool.intern(&Term::iri("http://example.org/a"));
        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn id_of_never_inserts() {
        let pool = TermPool::new();
        assert_eq!(pool.id_of(&Term::iri("http://example.org/a")), None);
        assert!(pool.is_empty());

        let a = pool.intern(&Term::iri("http://example.org/a"));
        assert_eq!(pool.id_of(&Term::iri("http://example.org/a")), Some(a));
    }

    #[test]
    fn lookup_round_trips() {
        let pool = TermPool::new();
        let lit = Term::typed("42", "http://www.w3.org/2001/XMLSchema#integer");
        let id = pool.intern(&lit);
        assert_eq!(pool.lookup(id), Some(lit));
        assert_eq!(pool.lookup(TermId::new(999)), None);
    }

    #[test]
    fn distinct_literal_shapes_get_distinct_ids() {
        let pool = TermPool::new();
        let plain = pool.intern(&Term::plain("true"));
        let typed = pool.intern(&Term::typed("true", "http://www.w3.org/2001/XMLSchema#boolean"));
        assert_ne!(plain, typed);
    }
}
