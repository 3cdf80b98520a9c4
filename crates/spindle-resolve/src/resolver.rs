//! Rule declaration scanning.
//!
//! One pass over every `(class, predicate, object)` statement for an
//! association predicate. Objects resolve either to a directly
//! declared command or to a template invocation that expands across
//! its ancestor templates. Each accepted candidate lands in the
//! per-class rule map; command text that fails to parse is isolated
//! into `Resolution::faults` and the scan keeps going.
//!
//! The whole pass is read-only over both graphs and returns freshly
//! owned results, so concurrent calls over shared graphs are fine.

use spindle_rdf::{Graph, Statement, Term, TermId};
use spindle_sparql::CommandSyntaxError;

use crate::label;
use crate::model::{RawCommandKind, Resolution, ResolveOptions, RuleDeclaration, RuleFault};
use crate::template;
use crate::vocab::RuleVocab;
use crate::wrapper::{build_command_wrapper, CandidateCommand};

/// The declaration a candidate came from, snapshotted once per
/// statement and shared by every candidate it produces.
struct DeclarationSite {
    class: Term,
    source: Term,
    declaration: RuleDeclaration,
}

impl DeclarationSite {
    fn fault(&self, error: CommandSyntaxError) -> RuleFault {
        RuleFault {
            class: self.class.clone(),
            source: self.source.clone(),
            declaration: self.declaration.clone(),
            error,
        }
    }
}

/// Resolve every rule declared through `predicate`.
///
/// Declarations are scanned in `graph`, in assertion order. Command
/// and template definitions are resolved in `query_graph`; callers
/// that keep everything in one graph pass it twice. A predicate the
/// graph never mentions yields an empty result, not an error.
pub fn class_rule_map(
    graph: &Graph,
    query_graph: &Graph,
    predicate: &str,
    opts: ResolveOptions,
    filter: Option<&dyn Fn(&Graph, TermId) -> bool>,
) -> Resolution {
    let mut resolution = Resolution::default();
    let Some(predicate_id) = graph.iri_id(predicate) else {
        tracing::debug!(predicate, "association predicate not present in graph");
        return resolution;
    };
    let vocab = RuleVocab::resolve(query_graph);
    for statement in graph.statements_with_predicate(predicate_id) {
        let Some(object_term) = graph.term(statement.object) else {
            continue;
        };
        if !object_term.is_resource() {
            tracing::trace!(object = %object_term, "declaration object is a literal; skipped");
            continue;
        }
        if let Some(filter) = filter {
            if !filter(graph, statement.object) {
                continue;
            }
        }
        add_declaration(
            &mut resolution,
            graph,
            query_graph,
            &vocab,
            statement,
            object_term,
            opts,
        );
    }
    resolution
}

fn add_declaration(
    resolution: &mut Resolution,
    graph: &Graph,
    query_graph: &Graph,
    vocab: &RuleVocab,
    statement: &Statement,
    object_term: Term,
    opts: ResolveOptions,
) {
    let (Some(class), Some(predicate_term)) = (
        graph.term(statement.subject),
        graph.term(statement.predicate),
    ) else {
        return;
    };
    let site = DeclarationSite {
        declaration: RuleDeclaration {
            subject: class.clone(),
            predicate: predicate_term,
            object: object_term.clone(),
        },
        source: object_term.clone(),
        class,
    };

    // Definitions live in the query graph; an object it has never
    // seen has no definition to resolve.
    let Some(object_id) = query_graph.id_of(&object_term) else {
        tracing::trace!(object = %object_term, "declaration object unknown to the definitions graph; skipped");
        return;
    };

    match template::base_template(query_graph, vocab, object_id) {
        Some(base) => {
            expand_invocation(resolution, query_graph, vocab, object_id, base, &site, opts)
        }
        None => add_direct_command(resolution, query_graph, vocab, object_id, &site, opts),
    }
}

/// Expand a template invocation across its ancestor closure. Every
/// ancestor is evaluated independently: a body or argument problem on
/// one never affects its siblings.
fn expand_invocation(
    resolution: &mut Resolution,
    query_graph: &Graph,
    vocab: &RuleVocab,
    invocation: TermId,
    base: TermId,
    site: &DeclarationSite,
    opts: ResolveOptions,
) {
    let ancestors = template::template_ancestors(query_graph, vocab, base);
    let bindings = template::collect_bindings(query_graph, vocab, invocation, &ancestors);
    let mut label_memo: Option<String> = None;

    for &ancestor in &ancestors {
        let Some(body) = vocab.body_of(query_graph, ancestor) else {
            tracing::trace!(source = %site.source, "ancestor template has no body; skipped");
            continue;
        };
        let kind = RawCommandKind::of(query_graph, body);
        let accepted = matches!(kind, RawCommandKind::Construct | RawCommandKind::Update)
            || (opts.allow_ask && kind == RawCommandKind::Ask);
        if !accepted {
            tracing::trace!(source = %site.source, "template body kind not eligible; skipped");
            continue;
        }
        let Some(text) = vocab.text_of(query_graph, body) else {
            tracing::trace!(source = %site.source, "template body has no command text; skipped");
            continue;
        };
        let label = label_memo
            .get_or_insert_with(|| {
                label::invocation_label(query_graph, vocab, &ancestors, &bindings)
            })
            .clone();
        let candidate = CandidateCommand {
            kind,
            text,
            invocation_label: Some(label),
            comment: None,
            source: site.source.clone(),
            declaration: site.declaration.clone(),
            this_unbound: vocab.this_unbound_of(query_graph, body),
        };
        match build_command_wrapper(candidate, opts) {
            Ok(Some(mut wrapper)) => {
                if !template::has_required_arguments(query_graph, vocab, ancestor, &bindings) {
                    tracing::trace!(source = %site.source, "invocation misses non-optional arguments; candidate dropped");
                    continue;
                }
                if !bindings.is_empty() {
                    wrapper.bindings = Some(bindings.clone());
                }
                resolution.rules.append(site.class.clone(), wrapper);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(
                    class = %site.class,
                    source = %site.source,
                    error = %error,
                    "template body failed to parse; declaration isolated"
                );
                resolution.faults.push(site.fault(error));
            }
        }
    }
}

fn add_direct_command(
    resolution: &mut Resolution,
    query_graph: &Graph,
    vocab: &RuleVocab,
    command: TermId,
    site: &DeclarationSite,
    opts: ResolveOptions,
) {
    let kind = RawCommandKind::of(query_graph, command);
    if kind == RawCommandKind::Other {
        tracing::trace!(source = %site.source, "object declares no known command class; skipped");
        return;
    }
    let Some(text) = vocab.text_of(query_graph, command) else {
        tracing::trace!(source = %site.source, "command has no text; skipped");
        return;
    };
    let candidate = CandidateCommand {
        kind,
        text,
        invocation_label: None,
        comment: vocab.comment_of(query_graph, command),
        source: site.source.clone(),
        declaration: site.declaration.clone(),
        this_unbound: vocab.this_unbound_of(query_graph, command),
    };
    match build_command_wrapper(candidate, opts) {
        Ok(Some(wrapper)) => resolution.rules.append(site.class.clone(), wrapper),
        Ok(None) => {}
        Err(error) => {
            tracing::warn!(
                class = %site.class,
                source = %site.source,
                error = %error,
                "command failed to parse; declaration isolated"
            );
            resolution.faults.push(site.fault(error));
        }
    }
}
