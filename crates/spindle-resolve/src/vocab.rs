//! The `spr:` rule vocabulary and its per-graph resolution.
//!
//! Rule graphs describe commands and templates with a small set of
//! well-known IRIs. [`RuleVocab`] anchors those IRIs in one graph's
//! identity space up front; IRIs the graph never mentions resolve to
//! `None` and every read through them comes back empty instead of
//! failing.

use spindle_rdf::vocab::rdfs;
use spindle_rdf::{Graph, TermId};

pub const NS: &str = "https://spindle.dev/ns#";

/// Default association predicate: class → rule declaration.
pub const RULE: &str = "https://spindle.dev/ns#rule";
/// Conventional alternative association predicate for constraint checks.
pub const CONSTRAINT: &str = "https://spindle.dev/ns#constraint";

// Command classes and properties.
pub const CONSTRUCT: &str = "https://spindle.dev/ns#Construct";
pub const ASK: &str = "https://spindle.dev/ns#Ask";
pub const SELECT: &str = "https://spindle.dev/ns#Select";
pub const DESCRIBE: &str = "https://spindle.dev/ns#Describe";
pub const UPDATE: &str = "https://spindle.dev/ns#Update";
pub const TEXT: &str = "https://spindle.dev/ns#text";
pub const THIS_UNBOUND: &str = "https://spindle.dev/ns#thisUnbound";

// Template metaclass and properties.
pub const TEMPLATE: &str = "https://spindle.dev/ns#Template";
pub const BODY: &str = "https://spindle.dev/ns#body";
pub const LABEL_TEMPLATE: &str = "https://spindle.dev/ns#labelTemplate";
pub const ARGUMENT: &str = "https://spindle.dev/ns#argument";
pub const PREDICATE: &str = "https://spindle.dev/ns#predicate";
pub const OPTIONAL: &str = "https://spindle.dev/ns#optional";
pub const VALUE_TYPE: &str = "https://spindle.dev/ns#valueType";

/// Vocabulary IRIs anchored in one graph's identity space.
///
/// Resolution never interns: a graph that does not mention a property
/// simply has no statements through it.
#[derive(Debug, Clone)]
pub struct RuleVocab {
    template: Option<TermId>,
    body: Option<TermId>,
    label_template: Option<TermId>,
    argument: Option<TermId>,
    arg_predicate: Option<TermId>,
    optional: Option<TermId>,
    value_type: Option<TermId>,
    text: Option<TermId>,
    this_unbound: Option<TermId>,
    comment: Option<TermId>,
}

impl RuleVocab {
    pub fn resolve(graph: &Graph) -> Self {
        RuleVocab {
            template: graph.iri_id(TEMPLATE),
            body: graph.iri_id(BODY),
            label_template: graph.iri_id(LABEL_TEMPLATE),
            argument: graph.iri_id(ARGUMENT),
            arg_predicate: graph.iri_id(PREDICATE),
            optional: graph.iri_id(OPTIONAL),
            value_type: graph.iri_id(VALUE_TYPE),
            text: graph.iri_id(TEXT),
            this_unbound: graph.iri_id(THIS_UNBOUND),
            comment: graph.iri_id(rdfs::COMMENT),
        }
    }

    pub fn template_class(&self) -> Option<TermId> {
        self.template
    }

    /// Whether `node` is typed (directly or through the subclass
    /// closure of one of its types) as `spr:Template`.
    pub fn is_template(&self, graph: &Graph, node: TermId) -> bool {
        self.template
            .map(|t| graph.has_indirect_type(node, t))
            .unwrap_or(false)
    }

    pub fn body_of(&self, graph: &Graph, template: TermId) -> Option<TermId> {
        self.body.and_then(|p| graph.object(template, p))
    }

    pub fn label_template_of(&self, graph: &Graph, template: TermId) -> Option<String> {
        self.label_template
            .and_then(|p| graph.string_object(template, p))
    }

    /// Argument resources declared directly on `template`, in
    /// declaration order.
    pub fn arguments_of(&self, graph: &Graph, template: TermId) -> Vec<TermId> {
        self.argument
            .map(|p| graph.objects(template, p))
            .unwrap_or_default()
    }

    pub fn argument_predicate_of(&self, graph: &Graph, argument: TermId) -> Option<TermId> {
        self.arg_predicate.and_then(|p| graph.object(argument, p))
    }

    pub fn argument_optional(&self, graph: &Graph, argument: TermId) -> bool {
        self.optional
            .map(|p| graph.boolean_object(argument, p))
            .unwrap_or(false)
    }

    pub fn argument_value_type(&self, graph: &Graph, argument: TermId) -> Option<TermId> {
        self.value_type.and_then(|p| graph.object(argument, p))
    }

    pub fn text_of(&self, graph: &Graph, command: TermId) -> Option<String> {
        self.text.and_then(|p| graph.string_object(command, p))
    }

    pub fn this_unbound_of(&self, graph: &Graph, command: TermId) -> bool {
        self.this_unbound
            .map(|p| graph.boolean_object(command, p))
            .unwrap_or(false)
    }

    pub fn comment_of(&self, graph: &Graph, command: TermId) -> Option<String> {
        self.comment.and_then(|p| graph.string_object(command, p))
    }
}
