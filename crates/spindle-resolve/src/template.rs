//! Template inheritance: base-template detection, ancestor closure,
//! argument declarations and call-site binding collection.
//!
//! A template is any resource classified as `spr:Template` through the
//! subclass closure of one of its types. An invocation is a resource
//! typed by a template; its explicit bindings are plain properties on
//! the invocation whose predicates match argument declarations found
//! anywhere in the ancestor closure.

use std::collections::BTreeMap;

use ahash::AHashSet;
use spindle_rdf::{local_name, Graph, Term, TermId};

use crate::vocab::RuleVocab;

/// One declared template argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDecl {
    /// Variable the binding feeds; the local name of `predicate`.
    pub var_name: String,
    /// Property invocations use to supply the value.
    pub predicate: Term,
    pub optional: bool,
    pub value_type: Option<Term>,
}

/// A template as declared: its resource, optional label pattern and
/// directly-declared arguments. Inherited arguments are reached by
/// walking the ancestor closure, not copied here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDefinition {
    pub resource: Term,
    pub label_template: Option<String>,
    pub arguments: Vec<ArgumentDecl>,
}

/// The base template of a would-be invocation: the first `rdf:type`
/// (assertion order) that classifies as a template. `None` means the
/// resource is not an invocation at all.
pub(crate) fn base_template(graph: &Graph, vocab: &RuleVocab, node: TermId) -> Option<TermId> {
    graph
        .types_of(node)
        .into_iter()
        .find(|&t| vocab.is_template(graph, t))
}

/// Reflexive-transitive super-template closure of `base`, restricted
/// to resources that classify as templates. Order is the closure
/// walk's discovery order, `base` first; cycles are handled by the
/// underlying walk.
pub(crate) fn template_ancestors(graph: &Graph, vocab: &RuleVocab, base: TermId) -> Vec<TermId> {
    graph
        .superclasses_star(base)
        .into_iter()
        .filter(|&t| vocab.is_template(graph, t))
        .collect()
}

fn argument_decl(graph: &Graph, vocab: &RuleVocab, argument: TermId) -> Option<ArgumentDecl> {
    let predicate_id = vocab.argument_predicate_of(graph, argument)?;
    let predicate = graph.term(predicate_id)?;
    let var_name = match &predicate {
        Term::Iri(iri) => local_name(iri),
        _ => return None,
    };
    Some(ArgumentDecl {
        var_name,
        predicate,
        optional: vocab.argument_optional(graph, argument),
        value_type: vocab
            .argument_value_type(graph, argument)
            .and_then(|id| graph.term(id)),
    })
}

/// Arguments declared directly on `template`, in declaration order.
/// Argument resources without a usable predicate are dropped.
pub(crate) fn own_arguments(
    graph: &Graph,
    vocab: &RuleVocab,
    template: TermId,
) -> Vec<ArgumentDecl> {
    vocab
        .arguments_of(graph, template)
        .into_iter()
        .filter_map(|arg| argument_decl(graph, vocab, arg))
        .collect()
}

/// Collect the invocation's explicit bindings, once per declaration:
/// walk every ancestor's own arguments in closure order and take the
/// first asserted call-site value per variable name. Later ancestors
/// never override an already-bound name.
pub(crate) fn collect_bindings(
    graph: &Graph,
    vocab: &RuleVocab,
    invocation: TermId,
    ancestors: &[TermId],
) -> BTreeMap<String, Term> {
    let mut bindings = BTreeMap::new();
    for &ancestor in ancestors {
        for arg in own_arguments(graph, vocab, ancestor) {
            if bindings.contains_key(&arg.var_name) {
                continue;
            }
            let Some(predicate_id) = graph.id_of(&arg.predicate) else {
                continue;
            };
            if let Some(value) = graph
                .object(invocation, predicate_id)
                .and_then(|id| graph.term(id))
            {
                bindings.insert(arg.var_name, value);
            }
        }
    }
    bindings
}

/// Whether every non-optional argument declared by `template` itself
/// is present, by name, in `bindings`.
pub(crate) fn has_required_arguments(
    graph: &Graph,
    vocab: &RuleVocab,
    template: TermId,
    bindings: &BTreeMap<String, Term>,
) -> bool {
    own_arguments(graph, vocab, template)
        .iter()
        .filter(|arg| !arg.optional)
        .all(|arg| bindings.contains_key(&arg.var_name))
}

/// Every template declared in `graph`, sorted by resource term for a
/// stable listing.
pub fn templates_in(graph: &Graph) -> Vec<TemplateDefinition> {
    let vocab = RuleVocab::resolve(graph);
    let Some(template_class) = vocab.template_class() else {
        return Vec::new();
    };
    let mut seen = AHashSet::new();
    let mut out = Vec::new();
    for class in graph.classes().collect::<Vec<_>>() {
        if !graph.superclasses_star(class).contains(&template_class) {
            continue;
        }
        for node in graph.instances_of(class) {
            if !seen.insert(node) {
                continue;
            }
            let Some(resource) = graph.term(node) else {
                continue;
            };
            out.push(TemplateDefinition {
                resource,
                label_template: vocab.label_template_of(graph, node),
                arguments: own_arguments(graph, &vocab, node),
            });
        }
    }
    out.sort_by(|a, b| a.resource.cmp(&b.resource));
    out
}
