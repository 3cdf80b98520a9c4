//! Append-only indexed statement store.
//!
//! Statements are stored in assertion order and indexed three ways:
//!
//! - predicate -> statement ids (roaring bitmap, ascending = assertion order)
//! - (subject, predicate) -> statement ids, in assertion order
//! - class -> directly-typed instance ids (from `rdf:type` statements)
//!
//! The store never mutates or deletes; all read APIs are pure and safe to
//! call from multiple threads once loading is done.

use crate::pool::{TermId, TermPool};
use crate::term::Term;
use crate::vocab;
use ahash::{AHashMap, AHashSet};
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One asserted triple, fully interned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub subject: TermId,
    pub predicate: TermId,
    pub object: TermId,
}

#[derive(Debug)]
pub struct Graph {
    pool: TermPool,
    statements: Vec<Statement>,
    by_predicate: AHashMap<TermId, RoaringBitmap>,
    by_subject_predicate: AHashMap<(TermId, TermId), Vec<u32>>,
    instances_by_class: AHashMap<TermId, RoaringBitmap>,
    rdf_type: TermId,
    rdfs_sub_class_of: TermId,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        let pool = TermPool::new();
        let rdf_type = pool.intern(&Term::iri(vocab::rdf::TYPE));
        let rdfs_sub_class_of = pool.intern(&Term::iri(vocab::rdfs::SUB_CLASS_OF));
        Self {
            pool,
            statements: Vec::new(),
            by_predicate: AHashMap::new(),
            by_subject_predicate: AHashMap::new(),
            instances_by_class: AHashMap::new(),
            rdf_type,
            rdfs_sub_class_of,
        }
    }

    /// Number of statements stored.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Assert a triple. Duplicate assertions are stored again; the store
    /// never deduplicates.
    pub fn insert(&mut self, subject: Term, predicate: Term, object: Term) {
        let s = self.pool.intern(&subject);
        let p = self.pool.intern(&predicate);
        let o = self.pool.intern(&object);
        self.insert_ids(s, p, o);
    }

    fn insert_ids(&mut self, subject: TermId, predicate: TermId, object: TermId) {
        let stmt_id = self.statements.len() as u32;
        self.statements.push(Statement {
            subject,
            predicate,
            object,
        });
        self.by_predicate.entry(predicate).or_default().insert(stmt_id);
        self.by_subject_predicate
            .entry((subject, predicate))
            .or_default()
            .push(stmt_id);
        if predicate == self.rdf_type {
            self.instances_by_class
                .entry(object)
                .or_default()
                .insert(subject.raw());
        }
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// The owned term behind an ID.
    pub fn term(&self, id: TermId) -> Option<Term> {
        self.pool.lookup(id)
    }

    /// Re-anchor a term in this graph's identity space. Never inserts;
    /// terms this graph has not seen yield `None`.
    pub fn id_of(&self, term: &Term) -> Option<TermId> {
        self.pool.id_of(term)
    }

    pub fn iri_id(&self, iri: &str) -> Option<TermId> {
        self.pool.id_of(&Term::Iri(iri.to_string()))
    }

    // ========================================================================
    // Statement access
    // ========================================================================

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Statements carrying `predicate`, in assertion order.
    pub fn statements_with_predicate(
        &self,
        predicate: TermId,
    ) -> impl Iterator<Item = &Statement> + '_ {
        self.by_predicate
            .get(&predicate)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .map(|i| &self.statements[i as usize])
    }

    /// Objects of (subject, predicate), in assertion order.
    pub fn objects(&self, subject: TermId, predicate: TermId) -> Vec<TermId> {
        self.by_subject_predicate
            .get(&(subject, predicate))
            .map(|ids| {
                ids.iter()
                    .map(|i| self.statements[*i as usize].object)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First asserted object of (subject, predicate).
    pub fn object(&self, subject: TermId, predicate: TermId) -> Option<TermId> {
        self.by_subject_predicate
            .get(&(subject, predicate))
            .and_then(|ids| ids.first())
            .map(|i| self.statements[*i as usize].object)
    }

    pub fn has(&self, subject: TermId, predicate: TermId, object: TermId) -> bool {
        self.by_subject_predicate
            .get(&(subject, predicate))
            .map(|ids| ids.iter().any(|i| self.statements[*i as usize].object == object))
            .unwrap_or(false)
    }

    /// Lexical form of the first literal object of (subject, predicate).
    /// Resource objects are passed over.
    pub fn string_object(&self, subject: TermId, predicate: TermId) -> Option<String> {
        self.objects(subject, predicate)
            .into_iter()
            .find_map(|o| match self.pool.lookup(o) {
                Some(Term::Literal(lit)) => Some(lit.lexical),
                _ => None,
            })
    }

    /// True when (subject, predicate) carries a boolean-true literal.
    pub fn boolean_object(&self, subject: TermId, predicate: TermId) -> bool {
        self.objects(subject, predicate)
            .into_iter()
            .any(|o| match self.pool.lookup(o) {
                Some(Term::Literal(lit)) => lit.is_true(),
                _ => false,
            })
    }

    // ========================================================================
    // Types and class hierarchy
    // ========================================================================

    /// `rdf:type` objects of `node`, in assertion order.
    pub fn types_of(&self, node: TermId) -> Vec<TermId> {
        self.objects(node, self.rdf_type)
    }

    pub fn has_type(&self, node: TermId, class: TermId) -> bool {
        self.has(node, self.rdf_type, class)
    }

    /// Reflexive-transitive `rdfs:subClassOf` closure of `class`, in
    /// breadth-first discovery order starting at `class` itself.
    /// Cycles terminate through the visited set.
    pub fn superclasses_star(&self, class: TermId) -> Vec<TermId> {
        let mut order = Vec::new();
        let mut seen = AHashSet::new();
        let mut queue = VecDeque::from([class]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            for sup in self.objects(current, self.rdfs_sub_class_of) {
                queue.push_back(sup);
            }
        }
        order
    }

    /// True when some `rdf:type` of `node` is `class` or a transitive
    /// subclass of it.
    pub fn has_indirect_type(&self, node: TermId, class: TermId) -> bool {
        self.types_of(node)
            .into_iter()
            .any(|t| self.superclasses_star(t).contains(&class))
    }

    /// Directly-typed instances of `class`.
    pub fn instances_of(&self, class: TermId) -> Vec<TermId> {
        self.instances_by_class
            .get(&class)
            .map(|bm| bm.iter().map(TermId::new).collect())
            .unwrap_or_default()
    }

    /// Every term that appears as an `rdf:type` object.
    pub fn classes(&self) -> impl Iterator<Item = TermId> + '_ {
        self.instances_by_class.keys().copied()
    }
}
