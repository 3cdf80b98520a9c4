//! Resolved-rule model types.

use std::collections::BTreeMap;

use spindle_rdf::{Graph, Term, TermId};
use spindle_sparql::{CommandSyntaxError, Query, UpdateScript};

use crate::rule_map::ClassRuleMap;
use crate::vocab;

/// Command kind as declared on the resource via `rdf:type`, before any
/// text is parsed. The declared kind routes parsing (query vs update);
/// acceptance is decided again on the parsed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawCommandKind {
    Construct,
    Ask,
    Select,
    Describe,
    Update,
    /// Typed as none of the known command classes.
    Other,
}

impl RawCommandKind {
    pub fn from_type_iri(iri: &str) -> Self {
        match iri {
            vocab::CONSTRUCT => RawCommandKind::Construct,
            vocab::ASK => RawCommandKind::Ask,
            vocab::SELECT => RawCommandKind::Select,
            vocab::DESCRIBE => RawCommandKind::Describe,
            vocab::UPDATE => RawCommandKind::Update,
            _ => RawCommandKind::Other,
        }
    }

    /// Declared kind of `node`: the first `rdf:type` naming a known
    /// command class, in assertion order.
    pub fn of(graph: &Graph, node: TermId) -> Self {
        graph
            .types_of(node)
            .into_iter()
            .filter_map(|t| graph.term(t))
            .filter_map(|t| t.as_iri().map(RawCommandKind::from_type_iri))
            .find(|k| *k != RawCommandKind::Other)
            .unwrap_or(RawCommandKind::Other)
    }

    pub fn is_query(self) -> bool {
        matches!(
            self,
            RawCommandKind::Construct
                | RawCommandKind::Ask
                | RawCommandKind::Select
                | RawCommandKind::Describe
        )
    }
}

/// A parsed, accepted command. Only these three kinds ever reach a
/// rule map; SELECT and unclassified commands are dropped during
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCommand {
    Construct(Query),
    Ask(Query),
    /// Always reduced to the script's first operation during wrapping.
    Update(UpdateScript),
}

impl ResolvedCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            ResolvedCommand::Construct(_) => "CONSTRUCT",
            ResolvedCommand::Ask(_) => "ASK",
            ResolvedCommand::Update(_) => "UPDATE",
        }
    }

    /// Executable text, scoping clause included when one was spliced in.
    pub fn render(&self) -> String {
        match self {
            ResolvedCommand::Construct(q) | ResolvedCommand::Ask(q) => q.render(),
            ResolvedCommand::Update(s) => s.render(),
        }
    }
}

/// The statement that associated a class with a command or template
/// invocation, snapshotted as owned terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDeclaration {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

/// One resolved rule: a parsed command plus the metadata the execution
/// engine needs. Built once per accepted (declaration, ancestor) pair
/// and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandWrapper {
    pub command: ResolvedCommand,
    /// The command resource or template invocation it came from.
    pub source: Term,
    /// Display text: the rendered invocation label for template-derived
    /// rules, the raw command text otherwise. The executable form lives
    /// in `command`.
    pub text: String,
    pub label: Option<String>,
    pub declaration: RuleDeclaration,
    pub this_unbound: bool,
    /// `?this` occurs, but only inside nested groups of the pattern.
    pub this_deep: bool,
    /// Explicit call-site bindings; `None` for direct commands and for
    /// invocations that bound nothing.
    pub bindings: Option<BTreeMap<String, Term>>,
}

/// A declaration whose command text failed to parse (initially or
/// after the scoping rewrite). The scan records it and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFault {
    pub class: Term,
    pub source: Term,
    pub declaration: RuleDeclaration,
    pub error: CommandSyntaxError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Splice `?this a ?targetClass .` into eligible patterns.
    pub with_scoping: bool,
    /// Accept ASK commands alongside CONSTRUCT and UPDATE.
    pub allow_ask: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            with_scoping: true,
            allow_ask: false,
        }
    }
}

/// Everything one resolution call produced.
#[derive(Debug, Default, PartialEq)]
pub struct Resolution {
    pub rules: ClassRuleMap,
    pub faults: Vec<RuleFault>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use spindle_rdf::graph_from_turtle;

    #[test]
    fn declared_kind_takes_first_recognized_type() {
        let graph = graph_from_turtle(
            r#"
            @prefix spr: <https://spindle.dev/ns#> .
            @prefix ex: <http://example.org/ns#> .
            ex:a a ex:Bookmark, spr:Update, spr:Ask .
            ex:b a ex:Bookmark .
            "#,
        )
        .unwrap();
        let a = graph.iri_id("http://example.org/ns#a").unwrap();
        let b = graph.iri_id("http://example.org/ns#b").unwrap();
        assert_eq!(RawCommandKind::of(&graph, a), RawCommandKind::Update);
        assert_eq!(RawCommandKind::of(&graph, b), RawCommandKind::Other);
    }

    #[test]
    fn default_options_scope_without_ask() {
        let opts = ResolveOptions::default();
        assert!(opts.with_scoping);
        assert!(!opts.allow_ask);
    }
}
