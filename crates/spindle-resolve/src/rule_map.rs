//! Per-class rule accumulation.

use ahash::AHashMap;
use spindle_rdf::Term;

use crate::model::CommandWrapper;

/// Wrappers keyed by the class they apply to.
///
/// Classes are kept in first-discovery order and each class's wrappers
/// in append order. Nothing is ever deduplicated: a rule declared twice
/// runs twice, and that is the caller's business to notice.
#[derive(Debug, Default, PartialEq)]
pub struct ClassRuleMap {
    classes: Vec<Term>,
    rules: AHashMap<Term, Vec<CommandWrapper>>,
}

impl ClassRuleMap {
    pub fn new() -> Self {
        ClassRuleMap::default()
    }

    pub fn append(&mut self, class: Term, wrapper: CommandWrapper) {
        if !self.rules.contains_key(&class) {
            self.classes.push(class.clone());
        }
        self.rules.entry(class).or_default().push(wrapper);
    }

    /// Classes with at least one rule, in discovery order.
    pub fn classes(&self) -> impl Iterator<Item = &Term> {
        self.classes.iter()
    }

    pub fn rules_for(&self, class: &Term) -> &[CommandWrapper] {
        self.rules.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, &[CommandWrapper])> {
        self.classes
            .iter()
            .map(move |class| (class, self.rules_for(class)))
    }

    /// Number of classes carrying rules.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn total_rules(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }
}
