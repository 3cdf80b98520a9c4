//! Invocation labels.
//!
//! A template invocation gets one label per declaration, shared by
//! every wrapper the declaration produces. The nearest ancestor
//! carrying `spr:labelTemplate` wins; its `{?var}` slots are filled
//! from the bindings. Without a label template the label falls back to
//! the base template's local name plus the bound values.

use std::collections::BTreeMap;

use spindle_rdf::{Graph, Term, TermId};

use crate::vocab::RuleVocab;

/// Substitute `{?var}` slots in a label pattern. Bound values render
/// in their short display form; unbound slots render as `?var` so a
/// half-bound invocation still reads sensibly.
pub(crate) fn render_label_template(pattern: &str, bindings: &BTreeMap<String, Term>) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(open) = rest.find("{?") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match bindings.get(name) {
                    Some(value) => out.push_str(&value.display_form()),
                    None => {
                        out.push('?');
                        out.push_str(name);
                    }
                }
                rest = &after[close + 1..];
            }
            // Unclosed slot: keep the tail verbatim.
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render the label for an invocation of the given ancestor chain.
/// `ancestors` is the template closure, base first.
pub(crate) fn invocation_label(
    graph: &Graph,
    vocab: &RuleVocab,
    ancestors: &[TermId],
    bindings: &BTreeMap<String, Term>,
) -> String {
    for &ancestor in ancestors {
        if let Some(pattern) = vocab.label_template_of(graph, ancestor) {
            return render_label_template(&pattern, bindings);
        }
    }
    let name = ancestors
        .first()
        .and_then(|&base| graph.term(base))
        .map(|t| t.display_form())
        .unwrap_or_default();
    if bindings.is_empty() {
        return name;
    }
    let args: Vec<String> = bindings
        .iter()
        .map(|(var, value)| format!("{var}={}", value.display_form()))
        .collect();
    format!("{name}({})", args.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, Term)]) -> BTreeMap<String, Term> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn slots_substitute_display_forms() {
        let b = bindings(&[
            ("city", Term::iri("http://example.org/ns#Utrecht")),
            ("limit", Term::plain("50")),
        ]);
        assert_eq!(
            render_label_template("Speed in {?city} is at most {?limit}", &b),
            "Speed in Utrecht is at most 50"
        );
    }

    #[test]
    fn unbound_slots_keep_the_variable() {
        let b = bindings(&[("limit", Term::plain("50"))]);
        assert_eq!(
            render_label_template("{?city}: {?limit}", &b),
            "?city: 50"
        );
    }

    #[test]
    fn unclosed_slot_is_left_verbatim() {
        let b = bindings(&[]);
        assert_eq!(render_label_template("broken {?city", &b), "broken {?city");
    }

    #[test]
    fn identical_inputs_render_identically() {
        let b = bindings(&[("x", Term::plain("1"))]);
        let a = render_label_template("v={?x}", &b);
        let c = render_label_template("v={?x}", &b);
        assert_eq!(a, c);
    }
}
