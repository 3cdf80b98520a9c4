//! Command wrapper construction.
//!
//! Takes one raw command (text plus declared kind and flags) and turns
//! it into a [`CommandWrapper`], or decides not to. The declared kind
//! routes parsing; the parsed form decides acceptance. Update scripts
//! are cut to their first operation before any rewrite sees them. The
//! scoping rewrite is applied here when it is safe, and a rewrite that
//! fails to parse back is an error, never a silent fallback to the
//! unscoped command.

use spindle_rdf::Term;
use spindle_sparql::{
    insert_target_class_clause, insert_target_class_clause_update, parse_query, parse_update,
    CommandSyntaxError, QueryForm, THIS_VAR,
};

use crate::model::{
    CommandWrapper, RawCommandKind, ResolveOptions, ResolvedCommand, RuleDeclaration,
};

/// Inputs for one wrapper: everything the scanner and expander know
/// about a candidate before its text is parsed.
#[derive(Debug)]
pub(crate) struct CandidateCommand {
    pub kind: RawCommandKind,
    /// SPARQL source text.
    pub text: String,
    /// Rendered invocation label; present exactly when the candidate
    /// came through a template.
    pub invocation_label: Option<String>,
    /// `rdfs:comment` of a directly-declared command.
    pub comment: Option<String>,
    pub source: Term,
    pub declaration: RuleDeclaration,
    pub this_unbound: bool,
}

fn scoping_applies(opts: ResolveOptions, this_unbound: bool, this_deep: bool, mentions: bool) -> bool {
    !this_unbound && opts.with_scoping && !this_deep && mentions
}

/// Build a wrapper from one candidate.
///
/// `Ok(None)` is the silent-drop path: SELECT and DESCRIBE forms,
/// ASK without `allow_ask`, and resources that never declared a known
/// command class. `Err` carries unparseable text and rewrite failures;
/// the caller decides how to isolate them.
pub(crate) fn build_command_wrapper(
    candidate: CandidateCommand,
    opts: ResolveOptions,
) -> Result<Option<CommandWrapper>, CommandSyntaxError> {
    let CandidateCommand {
        kind,
        text,
        invocation_label,
        comment,
        source,
        declaration,
        this_unbound,
    } = candidate;

    let (command, this_deep) = match kind {
        RawCommandKind::Update => {
            let script = parse_update(&text)?.into_primary()?;
            let this_deep = script.var_only_in_nested_groups(THIS_VAR);
            let script = if scoping_applies(opts, this_unbound, this_deep, script.mentions_var(THIS_VAR))
            {
                let rewritten = insert_target_class_clause_update(&script)?;
                parse_update(&rewritten)?
            } else {
                script
            };
            (ResolvedCommand::Update(script), this_deep)
        }
        kind if kind.is_query() => {
            let query = parse_query(&text)?;
            let accepted = match query.form {
                QueryForm::Construct => true,
                QueryForm::Ask => opts.allow_ask,
                QueryForm::Select | QueryForm::Describe => false,
            };
            if !accepted {
                return Ok(None);
            }
            let form = query.form;
            let this_deep = query.var_only_in_nested_groups(THIS_VAR);
            let query = if scoping_applies(opts, this_unbound, this_deep, query.mentions_var(THIS_VAR))
            {
                let rewritten = insert_target_class_clause(&query)?;
                let reparsed = parse_query(&rewritten)?;
                if reparsed.form != form {
                    return Err(CommandSyntaxError::FormDrift);
                }
                reparsed
            } else {
                query
            };
            let command = match query.form {
                QueryForm::Construct => ResolvedCommand::Construct(query),
                QueryForm::Ask => ResolvedCommand::Ask(query),
                QueryForm::Select | QueryForm::Describe => return Ok(None),
            };
            (command, this_deep)
        }
        _ => return Ok(None),
    };

    let label = invocation_label.clone().or(comment);
    let display_text = invocation_label.unwrap_or(text);
    Ok(Some(CommandWrapper {
        command,
        source,
        text: display_text,
        label,
        declaration,
        this_unbound,
        this_deep,
        bindings: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(kind: RawCommandKind, text: &str) -> CandidateCommand {
        CandidateCommand {
            kind,
            text: text.to_string(),
            invocation_label: None,
            comment: None,
            source: Term::iri("http://example.org/ns#cmd"),
            declaration: RuleDeclaration {
                subject: Term::iri("http://example.org/ns#C"),
                predicate: Term::iri(crate::vocab::RULE),
                object: Term::iri("http://example.org/ns#cmd"),
            },
            this_unbound: false,
        }
    }

    fn build(kind: RawCommandKind, text: &str, opts: ResolveOptions) -> Option<CommandWrapper> {
        build_command_wrapper(candidate(kind, text), opts).unwrap()
    }

    #[test]
    fn construct_gets_the_scoping_clause() {
        let w = build(
            RawCommandKind::Construct,
            "CONSTRUCT { ?this a ex:Flagged } WHERE { ?this ex:broken true }",
            ResolveOptions::default(),
        )
        .unwrap();
        let rendered = w.command.render();
        assert!(rendered.contains("?this a ?targetClass ."));
        assert!(!w.this_deep);
        // Display text keeps the original, unscoped source.
        assert!(!w.text.contains("targetClass"));
    }

    #[test]
    fn scoping_can_be_disabled() {
        let opts = ResolveOptions {
            with_scoping: false,
            ..ResolveOptions::default()
        };
        let w = build(
            RawCommandKind::Construct,
            "CONSTRUCT { ?this a ex:Flagged } WHERE { ?this ex:broken true }",
            opts,
        )
        .unwrap();
        assert!(!w.command.render().contains("targetClass"));
    }

    #[test]
    fn this_unbound_suppresses_the_rewrite() {
        let mut c = candidate(
            RawCommandKind::Construct,
            "CONSTRUCT { ?this a ex:Flagged } WHERE { ?this ex:broken true }",
        );
        c.this_unbound = true;
        let w = build_command_wrapper(c, ResolveOptions::default())
            .unwrap()
            .unwrap();
        assert!(!w.command.render().contains("targetClass"));
        assert!(w.this_unbound);
    }

    #[test]
    fn nested_only_this_suppresses_the_rewrite() {
        let w = build(
            RawCommandKind::Construct,
            "CONSTRUCT { ?x a ex:Flagged } WHERE { ?x ex:p ?y . OPTIONAL { ?this ex:q ?y } }",
            ResolveOptions::default(),
        )
        .unwrap();
        assert!(w.this_deep);
        assert!(!w.command.render().contains("targetClass"));
    }

    #[test]
    fn queries_without_this_are_left_alone() {
        let w = build(
            RawCommandKind::Construct,
            "CONSTRUCT { ?x a ex:Flagged } WHERE { ?x ex:broken true }",
            ResolveOptions::default(),
        )
        .unwrap();
        assert!(!w.command.render().contains("targetClass"));
        assert!(!w.this_deep);
    }

    #[test]
    fn ask_is_gated_on_allow_ask() {
        let text = "ASK { ?this ex:broken true }";
        assert!(build(RawCommandKind::Ask, text, ResolveOptions::default()).is_none());
        let opts = ResolveOptions {
            allow_ask: true,
            ..ResolveOptions::default()
        };
        let w = build(RawCommandKind::Ask, text, opts).unwrap();
        assert!(matches!(w.command, ResolvedCommand::Ask(_)));
        assert!(w.command.render().contains("?this a ?targetClass ."));
    }

    #[test]
    fn select_forms_are_dropped_silently() {
        let text = "SELECT ?x WHERE { ?x ex:broken true }";
        assert!(build(RawCommandKind::Select, text, ResolveOptions::default()).is_none());
        // Declared kind does not save a form the parser rejects.
        assert!(build(RawCommandKind::Construct, text, ResolveOptions::default()).is_none());
    }

    #[test]
    fn update_keeps_only_its_scoped_first_operation() {
        let text = "DELETE { ?this ex:stale ?v } WHERE { ?this ex:stale ?v } ; \
                    INSERT DATA { ex:log ex:ran true }";
        let w = build(RawCommandKind::Update, text, ResolveOptions::default()).unwrap();
        let rendered = w.command.render();
        assert!(rendered.contains("?this a ?targetClass ."));
        assert!(!rendered.contains("INSERT DATA"));
        match &w.command {
            ResolvedCommand::Update(script) => {
                assert_eq!(script.operations.len(), 1);
                assert_eq!(script.primary().expect("operation").verb, "DELETE");
            }
            other => panic!("expected update, got {other:?}"),
        }
        // Display text keeps the full declared source.
        assert!(w.text.contains("INSERT DATA"));
    }

    #[test]
    fn malformed_text_is_an_error_not_a_skip() {
        let err = build_command_wrapper(
            candidate(RawCommandKind::Construct, "CONSTRUCT { ?x a ex:Y WHERE"),
            ResolveOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CommandSyntaxError::UnclosedGroup { .. }));
    }

    #[test]
    fn unknown_kind_is_dropped() {
        assert!(build(RawCommandKind::Other, "whatever", ResolveOptions::default()).is_none());
    }

    #[test]
    fn template_label_becomes_display_text_and_label() {
        let mut c = candidate(
            RawCommandKind::Construct,
            "CONSTRUCT { ?this a ex:Flagged } WHERE { ?this ex:broken true }",
        );
        c.invocation_label = Some("Flag broken things".to_string());
        let w = build_command_wrapper(c, ResolveOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(w.text, "Flag broken things");
        assert_eq!(w.label.as_deref(), Some("Flag broken things"));
    }
}
